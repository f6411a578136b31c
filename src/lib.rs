//! # mantra-attempt
//!
//! Terminal client for timed Mantra IAS mock-test attempts.
//!
//! An attempt is loaded from the backend, answered in the terminal against a
//! countdown, and submitted either by the user or when time runs out. Scoring
//! and persistence stay on the backend and are reached through a [`Gateway`].
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use mantra_attempt::{run_attempt, AppError, AttemptRequest, HttpGateway, Settings, TestKind};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), AppError> {
//!     let settings = Settings::from_env()?;
//!     let gateway = Arc::new(HttpGateway::from_settings(&settings)?);
//!     let request = AttemptRequest {
//!         mock_test_id: 3,
//!         kind: TestKind::Paid,
//!         user_id: settings.user_id()?,
//!     };
//!
//!     run_attempt(gateway, request, settings.bands()).await
//! }
//! ```

pub mod app;
pub mod config;
pub mod engine;
pub mod gateway;
pub mod models;
pub mod notification;
pub mod runner;
pub mod telemetry;
pub mod terminal;
mod ui;

use std::io;

use thiserror::Error;
use tracing_subscriber::util::TryInitError;

pub use app::{Action, App};
pub use config::{ConfigError, Settings};
pub use engine::{AttemptRequest, AttemptSession, AttemptStatus};
pub use gateway::{Gateway, GatewayError, HttpGateway};
pub use models::{OptionKey, Question, ScoreBands, TestKind, TestResult};
pub use runner::run_attempt;

/// Error type for the binary and the attempt runner.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Gateway(#[from] GatewayError),
    #[error("terminal error: {0}")]
    Io(#[from] io::Error),
    #[error("failed to set up logging: {0}")]
    Telemetry(#[from] TryInitError),
}
