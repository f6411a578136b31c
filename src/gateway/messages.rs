//! JSON contracts exchanged with the backend.
//!
//! Field names follow the backend's camelCase convention.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::{
    deserialize_optional_option, OptionKey, Question, QuestionId, ReviewEntry, TestKind,
};

/// Envelope used by most backend endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse<T> {
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub status: String,
    pub data: T,
}

/// Answers keyed by question id, serialized as `{"12": "A"}`.
pub type AnswerMap = BTreeMap<QuestionId, OptionKey>;

/// Attempt payload returned when a test is started.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptTestDto {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub user_id: Option<u64>,
    pub mock_test_id: u64,
    pub mock_test_name: String,
    pub timer_in_minutes: u64,
    #[serde(default)]
    pub started_at: Option<String>,
    #[serde(default)]
    pub questions: Vec<AttemptQuestionDto>,
}

/// A question without its correct option.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptQuestionDto {
    pub question_id: QuestionId,
    pub question_no: u32,
    pub question: String,
    pub option_a: String,
    pub option_b: String,
    pub option_c: String,
    pub option_d: String,
}

impl From<AttemptQuestionDto> for Question {
    fn from(dto: AttemptQuestionDto) -> Self {
        Question {
            question_id: dto.question_id,
            question_no: dto.question_no,
            text: dto.question,
            options: [dto.option_a, dto.option_b, dto.option_c, dto.option_d],
        }
    }
}

/// Per-question scoring detail, only available after submission.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailedResultDto {
    pub question_id: QuestionId,
    pub question_no: u32,
    pub question: String,
    pub option_a: String,
    pub option_b: String,
    pub option_c: String,
    pub option_d: String,
    #[serde(alias = "correctOption")]
    pub correct_answer: OptionKey,
    #[serde(default, deserialize_with = "deserialize_optional_option")]
    pub user_answer: Option<OptionKey>,
    pub is_correct: bool,
    #[serde(default)]
    pub solution_link: Option<String>,
}

impl From<DetailedResultDto> for ReviewEntry {
    fn from(dto: DetailedResultDto) -> Self {
        ReviewEntry {
            question_id: dto.question_id,
            question_no: dto.question_no,
            text: dto.question,
            options: [dto.option_a, dto.option_b, dto.option_c, dto.option_d],
            user_answer: dto.user_answer,
            correct_answer: dto.correct_answer,
            is_correct: dto.is_correct,
            solution_link: dto.solution_link.filter(|link| !link.trim().is_empty()),
        }
    }
}

/// Inputs shared by score calculation and detailed results.
#[derive(Debug, Clone)]
pub struct ScoreQuery {
    pub kind: TestKind,
    pub mock_test_id: u64,
    pub user_id: u64,
    pub answers: AnswerMap,
}

/// Selected option for one question; `None` is sent as `null`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptAnswer {
    pub question_id: QuestionId,
    pub selected_option: Option<OptionKey>,
}

/// Body of the save-attempt call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveAttemptRequest {
    pub user_id: u64,
    pub mock_test_id: u64,
    pub mock_test_name: String,
    pub mock_test_type: TestKind,
    pub answers: Vec<AttemptAnswer>,
    pub time_taken: u64,
}

/// Parameters of the save-score call, sent as query parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct SaveScoreRequest {
    pub user_id: u64,
    pub mock_test_id: u64,
    pub mock_test_title: String,
    pub score: f64,
}

/// A stored score with its server-assigned id and completion time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreRecord {
    pub id: u64,
    pub user_id: u64,
    pub mock_test_id: u64,
    pub mock_test_title: String,
    pub score: f64,
    #[serde(default)]
    pub completed_at: Option<String>,
}

/// Catalog entry for a mock test.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MockTestSummary {
    pub id: u64,
    pub name: String,
    pub timer_in_minutes: u64,
    #[serde(default)]
    pub created_at: Option<String>,
}
