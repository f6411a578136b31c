//! Backend gateway.
//!
//! The backend owns correctness and persistence; this module only describes
//! the calls the attempt engine makes and an HTTP implementation of them.

mod http;
mod messages;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::TestKind;

pub use http::HttpGateway;
pub use messages::{
    AnswerMap, ApiResponse, AttemptAnswer, AttemptQuestionDto, AttemptTestDto, DetailedResultDto,
    MockTestSummary, SaveAttemptRequest, SaveScoreRequest, ScoreQuery, ScoreRecord,
};

/// Failure of a single backend call.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum GatewayError {
    #[error("could not reach the backend: {0}")]
    Transport(String),
    #[error("not authorized")]
    Unauthorized,
    #[error("not found: {0}")]
    NotFound(String),
    #[error("backend returned status {status}: {message}")]
    Status { status: u16, message: String },
    #[error("unexpected response body: {0}")]
    Decode(String),
}

/// Calls consumed by the attempt engine and the CLI shell.
#[async_trait]
pub trait Gateway: Send + Sync {
    /// Starts an attempt and returns the question set and timer length.
    async fn start_attempt(
        &self,
        kind: TestKind,
        mock_test_id: u64,
        user_id: u64,
    ) -> Result<AttemptTestDto, GatewayError>;

    /// Returns the percentage score for the given answers.
    async fn calculate_score(&self, query: &ScoreQuery) -> Result<f64, GatewayError>;

    /// Returns per-question correctness for the given answers.
    async fn detailed_results(
        &self,
        query: &ScoreQuery,
    ) -> Result<Vec<DetailedResultDto>, GatewayError>;

    async fn save_attempt(&self, request: &SaveAttemptRequest) -> Result<(), GatewayError>;

    async fn save_score(&self, request: &SaveScoreRequest) -> Result<ScoreRecord, GatewayError>;

    async fn list_tests(&self, kind: TestKind) -> Result<Vec<MockTestSummary>, GatewayError>;

    async fn user_scores(&self, user_id: u64) -> Result<Vec<ScoreRecord>, GatewayError>;
}
