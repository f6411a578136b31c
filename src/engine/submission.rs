//! The multi-step commit that ends an attempt.
//!
//! Steps run strictly in order and each waits for the previous response. A
//! failure stops the remaining steps. Losing the score computation blocks the
//! result; losing persistence after the score is known only produces a warning.

use std::fmt;

use uuid::Uuid;

use crate::gateway::{
    AnswerMap, AttemptAnswer, Gateway, GatewayError, SaveAttemptRequest, SaveScoreRequest,
    ScoreQuery, ScoreRecord,
};
use crate::models::{QuestionId, ReviewEntry, TestKind, TestResult};

/// What caused the submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitTrigger {
    Manual,
    Timeout,
}

/// One step of the commit sequence, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    ElapsedTime,
    CalculateScore,
    FetchResults,
    SaveAttempt,
    SaveScore,
}

impl Step {
    pub const ALL: [Step; 5] = [
        Step::ElapsedTime,
        Step::CalculateScore,
        Step::FetchResults,
        Step::SaveAttempt,
        Step::SaveScore,
    ];

    fn index(self) -> usize {
        match self {
            Step::ElapsedTime => 0,
            Step::CalculateScore => 1,
            Step::FetchResults => 2,
            Step::SaveAttempt => 3,
            Step::SaveScore => 4,
        }
    }

    /// Steps after which the score is known to the user.
    pub fn is_persistence(self) -> bool {
        matches!(self, Step::SaveAttempt | Step::SaveScore)
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Step::ElapsedTime => "elapsed time",
            Step::CalculateScore => "score calculation",
            Step::FetchResults => "detailed results",
            Step::SaveAttempt => "attempt save",
            Step::SaveScore => "score save",
        };
        write!(f, "{}", label)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum StepState {
    Pending,
    Ok,
    Failed(GatewayError),
}

/// Per-step record of how far a submission got.
#[derive(Debug, Clone, PartialEq)]
pub struct StepLedger {
    states: [StepState; 5],
}

impl Default for StepLedger {
    fn default() -> Self {
        Self {
            states: std::array::from_fn(|_| StepState::Pending),
        }
    }
}

impl StepLedger {
    pub fn state(&self, step: Step) -> &StepState {
        &self.states[step.index()]
    }

    /// Steps that finished successfully, in order.
    pub fn completed(&self) -> Vec<Step> {
        Step::ALL
            .into_iter()
            .filter(|step| *self.state(*step) == StepState::Ok)
            .collect()
    }

    fn mark_ok(&mut self, step: Step) {
        self.states[step.index()] = StepState::Ok;
    }

    fn mark_failed(&mut self, step: Step, error: GatewayError) {
        self.states[step.index()] = StepState::Failed(error);
    }
}

/// Snapshot of the session taken when submission begins.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionRequest {
    pub session_id: Uuid,
    pub trigger: SubmitTrigger,
    pub kind: TestKind,
    pub mock_test_id: u64,
    pub mock_test_name: String,
    pub user_id: u64,
    pub question_ids: Vec<QuestionId>,
    pub answers: AnswerMap,
    pub total_seconds: u64,
    pub remaining_seconds: u64,
}

/// The score is known but could not be stored.
#[derive(Debug, Clone, PartialEq)]
pub struct PersistenceWarning {
    pub step: Step,
    pub error: GatewayError,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmissionOutcome {
    Completed {
        result: TestResult,
        warning: Option<PersistenceWarning>,
        score_record: Option<ScoreRecord>,
    },
    Failed {
        step: Step,
        error: GatewayError,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionReport {
    pub session_id: Uuid,
    pub trigger: SubmitTrigger,
    pub elapsed_seconds: u64,
    pub ledger: StepLedger,
    pub outcome: SubmissionOutcome,
}

/// Runs the commit sequence against the backend.
#[tracing::instrument(skip_all, fields(session_id = %request.session_id, trigger = ?request.trigger))]
pub async fn run(gateway: &dyn Gateway, request: SubmissionRequest) -> SubmissionReport {
    let mut ledger = StepLedger::default();

    let elapsed_seconds = request.total_seconds.saturating_sub(request.remaining_seconds);
    ledger.mark_ok(Step::ElapsedTime);

    let query = ScoreQuery {
        kind: request.kind,
        mock_test_id: request.mock_test_id,
        user_id: request.user_id,
        answers: request.answers.clone(),
    };

    let finish = |ledger: StepLedger, outcome: SubmissionOutcome| SubmissionReport {
        session_id: request.session_id,
        trigger: request.trigger,
        elapsed_seconds,
        ledger,
        outcome,
    };

    let score = match gateway.calculate_score(&query).await {
        Ok(score) => {
            ledger.mark_ok(Step::CalculateScore);
            score
        }
        Err(error) => {
            tracing::error!(%error, "score calculation failed");
            ledger.mark_failed(Step::CalculateScore, error.clone());
            return finish(ledger, SubmissionOutcome::Failed { step: Step::CalculateScore, error });
        }
    };

    let details = match gateway.detailed_results(&query).await {
        Ok(details) => {
            ledger.mark_ok(Step::FetchResults);
            details
        }
        Err(error) => {
            tracing::error!(%error, "fetching detailed results failed");
            ledger.mark_failed(Step::FetchResults, error.clone());
            return finish(ledger, SubmissionOutcome::Failed { step: Step::FetchResults, error });
        }
    };

    let result = TestResult::new(
        score,
        request.question_ids.len(),
        details.into_iter().map(ReviewEntry::from).collect(),
    );
    tracing::info!(score, correct = result.correct_count, elapsed_seconds, "attempt scored");

    let attempt = SaveAttemptRequest {
        user_id: request.user_id,
        mock_test_id: request.mock_test_id,
        mock_test_name: request.mock_test_name.clone(),
        mock_test_type: request.kind,
        answers: request
            .question_ids
            .iter()
            .map(|question_id| AttemptAnswer {
                question_id: *question_id,
                selected_option: request.answers.get(question_id).copied(),
            })
            .collect(),
        time_taken: elapsed_seconds,
    };

    if let Err(error) = gateway.save_attempt(&attempt).await {
        tracing::warn!(%error, "score shown but the attempt was not saved");
        ledger.mark_failed(Step::SaveAttempt, error.clone());
        return finish(
            ledger,
            SubmissionOutcome::Completed {
                result,
                warning: Some(PersistenceWarning { step: Step::SaveAttempt, error }),
                score_record: None,
            },
        );
    }
    ledger.mark_ok(Step::SaveAttempt);

    let score_request = SaveScoreRequest {
        user_id: request.user_id,
        mock_test_id: request.mock_test_id,
        mock_test_title: request.mock_test_name.clone(),
        score,
    };

    match gateway.save_score(&score_request).await {
        Ok(record) => {
            ledger.mark_ok(Step::SaveScore);
            tracing::info!(score_id = record.id, "attempt submitted");
            finish(
                ledger,
                SubmissionOutcome::Completed {
                    result,
                    warning: None,
                    score_record: Some(record),
                },
            )
        }
        Err(error) => {
            tracing::warn!(%error, "score shown but not saved");
            ledger.mark_failed(Step::SaveScore, error.clone());
            finish(
                ledger,
                SubmissionOutcome::Completed {
                    result,
                    warning: Some(PersistenceWarning { step: Step::SaveScore, error }),
                    score_record: None,
                },
            )
        }
    }
}
