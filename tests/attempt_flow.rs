use std::sync::Mutex;

use async_trait::async_trait;
use crossterm::event::KeyCode;
use mantra_attempt::engine::{
    submission, AttemptRequest, AttemptSession, AttemptStatus, StartError, Step, StepState,
    SubmissionOutcome, SubmitTrigger, TickEvent,
};
use mantra_attempt::gateway::{
    AttemptQuestionDto, AttemptTestDto, DetailedResultDto, Gateway, GatewayError,
    MockTestSummary, SaveAttemptRequest, SaveScoreRequest, ScoreQuery, ScoreRecord,
};
use mantra_attempt::models::{OptionKey, ScoreBands, TestKind};
use mantra_attempt::{Action, App};

/// In-memory backend. Every question's correct option is A.
struct FakeGateway {
    question_count: u64,
    timer_in_minutes: u64,
    fail_start: bool,
    fail_score: bool,
    fail_results: bool,
    fail_save_attempt: bool,
    fail_save_score: bool,
    calls: Mutex<Vec<&'static str>>,
    saved_attempts: Mutex<Vec<SaveAttemptRequest>>,
}

impl FakeGateway {
    fn new(question_count: u64, timer_in_minutes: u64) -> Self {
        Self {
            question_count,
            timer_in_minutes,
            fail_start: false,
            fail_score: false,
            fail_results: false,
            fail_save_attempt: false,
            fail_save_score: false,
            calls: Mutex::new(Vec::new()),
            saved_attempts: Mutex::new(Vec::new()),
        }
    }

    fn record(&self, call: &'static str) {
        self.calls.lock().unwrap().push(call);
    }

    fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    fn saved_attempts(&self) -> Vec<SaveAttemptRequest> {
        self.saved_attempts.lock().unwrap().clone()
    }

    fn question(id: u64) -> AttemptQuestionDto {
        AttemptQuestionDto {
            question_id: id,
            question_no: id as u32,
            question: format!("Question {}", id),
            option_a: "first".to_string(),
            option_b: "second".to_string(),
            option_c: "third".to_string(),
            option_d: "fourth".to_string(),
        }
    }

    fn correct(query: &ScoreQuery, id: u64) -> bool {
        query.answers.get(&id) == Some(&OptionKey::A)
    }
}

#[async_trait]
impl Gateway for FakeGateway {
    async fn start_attempt(
        &self,
        _kind: TestKind,
        mock_test_id: u64,
        user_id: u64,
    ) -> Result<AttemptTestDto, GatewayError> {
        self.record("start");
        if self.fail_start {
            return Err(GatewayError::Transport("connection refused".to_string()));
        }
        Ok(AttemptTestDto {
            id: Some(1),
            user_id: Some(user_id),
            mock_test_id,
            mock_test_name: "Prelims Mock 1".to_string(),
            timer_in_minutes: self.timer_in_minutes,
            started_at: None,
            questions: (1..=self.question_count).map(Self::question).collect(),
        })
    }

    async fn calculate_score(&self, query: &ScoreQuery) -> Result<f64, GatewayError> {
        self.record("calculate_score");
        if self.fail_score {
            return Err(GatewayError::Status {
                status: 500,
                message: "scoring unavailable".to_string(),
            });
        }
        let correct = (1..=self.question_count)
            .filter(|id| Self::correct(query, *id))
            .count();
        Ok(correct as f64 * 100.0 / self.question_count as f64)
    }

    async fn detailed_results(
        &self,
        query: &ScoreQuery,
    ) -> Result<Vec<DetailedResultDto>, GatewayError> {
        self.record("detailed_results");
        if self.fail_results {
            return Err(GatewayError::NotFound("results".to_string()));
        }
        Ok((1..=self.question_count)
            .map(|id| {
                let question = Self::question(id);
                DetailedResultDto {
                    question_id: id,
                    question_no: question.question_no,
                    question: question.question,
                    option_a: question.option_a,
                    option_b: question.option_b,
                    option_c: question.option_c,
                    option_d: question.option_d,
                    correct_answer: OptionKey::A,
                    user_answer: query.answers.get(&id).copied(),
                    is_correct: Self::correct(query, id),
                    solution_link: None,
                }
            })
            .collect())
    }

    async fn save_attempt(&self, request: &SaveAttemptRequest) -> Result<(), GatewayError> {
        self.record("save_attempt");
        self.saved_attempts.lock().unwrap().push(request.clone());
        if self.fail_save_attempt {
            return Err(GatewayError::Transport("timed out".to_string()));
        }
        Ok(())
    }

    async fn save_score(&self, request: &SaveScoreRequest) -> Result<ScoreRecord, GatewayError> {
        self.record("save_score");
        if self.fail_save_score {
            return Err(GatewayError::Unauthorized);
        }
        Ok(ScoreRecord {
            id: 99,
            user_id: request.user_id,
            mock_test_id: request.mock_test_id,
            mock_test_title: request.mock_test_title.clone(),
            score: request.score,
            completed_at: Some("2026-10-18T10:00:00".to_string()),
        })
    }

    async fn list_tests(&self, _kind: TestKind) -> Result<Vec<MockTestSummary>, GatewayError> {
        Ok(Vec::new())
    }

    async fn user_scores(&self, _user_id: u64) -> Result<Vec<ScoreRecord>, GatewayError> {
        Ok(Vec::new())
    }
}

fn request() -> AttemptRequest {
    AttemptRequest {
        mock_test_id: 3,
        kind: TestKind::Paid,
        user_id: 7,
    }
}

async fn started_session(gateway: &FakeGateway) -> AttemptSession {
    let mut session = AttemptSession::new(request());
    session.start(gateway).await.expect("attempt starts");
    session
}

#[tokio::test]
async fn test_submission_calls_backend_in_order() {
    let gateway = FakeGateway::new(3, 10);
    let mut session = started_session(&gateway).await;
    session.set_answer(1, OptionKey::A).unwrap();

    let request = session.begin_submission(SubmitTrigger::Manual).unwrap();
    let report = submission::run(&gateway, request).await;

    assert!(session.finish_submission(&report));
    assert_eq!(session.status(), AttemptStatus::Completed);
    assert_eq!(
        gateway.calls(),
        vec![
            "start",
            "calculate_score",
            "detailed_results",
            "save_attempt",
            "save_score"
        ]
    );
    for step in Step::ALL {
        assert_eq!(report.ledger.state(step), &StepState::Ok);
    }
}

#[tokio::test]
async fn test_timeout_with_no_answers_submits_once() {
    let gateway = FakeGateway::new(4, 1);
    let mut session = started_session(&gateway).await;

    let mut requests = Vec::new();
    for _ in 0..60 {
        if let TickEvent::Expired(request) = session.on_tick() {
            requests.push(request);
        }
    }
    assert_eq!(requests.len(), 1);
    assert_eq!(session.on_tick(), TickEvent::Ignored);

    let request = requests.remove(0);
    assert_eq!(request.trigger, SubmitTrigger::Timeout);
    assert!(request.answers.is_empty());

    let report = submission::run(&gateway, request).await;
    assert!(session.finish_submission(&report));

    let saved = gateway.saved_attempts();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].time_taken, 60);
    assert_eq!(saved[0].answers.len(), 4);
    assert!(saved[0].answers.iter().all(|answer| answer.selected_option.is_none()));

    let SubmissionOutcome::Completed { result, .. } = report.outcome else {
        panic!("expected a completed submission");
    };
    assert_eq!(result.score_percent, 0.0);
    assert_eq!(result.unanswered_count(), 4);
}

#[tokio::test]
async fn test_partial_answers_are_reviewed_per_question() {
    let gateway = FakeGateway::new(5, 10);
    let mut session = started_session(&gateway).await;
    session.set_answer(1, OptionKey::A).unwrap();
    session.set_answer(3, OptionKey::C).unwrap();

    let request = session.begin_submission(SubmitTrigger::Manual).unwrap();
    let report = submission::run(&gateway, request).await;

    let SubmissionOutcome::Completed { result, warning, score_record } = report.outcome else {
        panic!("expected a completed submission");
    };
    assert!(warning.is_none());
    assert_eq!(score_record.map(|record| record.id), Some(99));
    assert_eq!(result.correct_count, 1);
    assert_eq!(result.total_questions, 5);

    let labels: Vec<String> = result
        .entries
        .iter()
        .map(|entry| entry.user_answer_label())
        .collect();
    assert_eq!(
        labels,
        vec!["A", "Not Answered", "C", "Not Answered", "Not Answered"]
    );

    let saved = gateway.saved_attempts();
    let selected: Vec<Option<OptionKey>> = saved[0]
        .answers
        .iter()
        .map(|answer| answer.selected_option)
        .collect();
    assert_eq!(
        selected,
        vec![Some(OptionKey::A), None, Some(OptionKey::C), None, None]
    );
}

#[tokio::test]
async fn test_double_submit_runs_one_sequence() {
    let gateway = FakeGateway::new(2, 10);
    let mut session = started_session(&gateway).await;

    let first = session.begin_submission(SubmitTrigger::Manual);
    let second = session.begin_submission(SubmitTrigger::Manual);
    assert!(first.is_some());
    assert!(second.is_none());
    assert_eq!(session.on_tick(), TickEvent::Ignored);

    let report = submission::run(&gateway, first.unwrap()).await;
    assert!(session.finish_submission(&report));
    assert!(!session.finish_submission(&report));

    let scoring_calls = gateway
        .calls()
        .into_iter()
        .filter(|call| *call == "calculate_score")
        .count();
    assert_eq!(scoring_calls, 1);
}

#[tokio::test]
async fn test_failed_save_attempt_still_shows_result() {
    let mut gateway = FakeGateway::new(2, 10);
    gateway.fail_save_attempt = true;
    let mut session = started_session(&gateway).await;

    let request = session.begin_submission(SubmitTrigger::Manual).unwrap();
    let report = submission::run(&gateway, request).await;

    assert!(session.finish_submission(&report));
    assert_eq!(session.status(), AttemptStatus::Completed);
    assert!(!gateway.calls().contains(&"save_score"));
    assert!(matches!(
        report.ledger.state(Step::SaveAttempt),
        StepState::Failed(_)
    ));
    assert_eq!(report.ledger.state(Step::SaveScore), &StepState::Pending);

    let SubmissionOutcome::Completed { warning, score_record, .. } = report.outcome else {
        panic!("expected a completed submission");
    };
    assert_eq!(warning.map(|warning| warning.step), Some(Step::SaveAttempt));
    assert!(score_record.is_none());
}

#[tokio::test]
async fn test_failed_scoring_is_terminal() {
    let mut gateway = FakeGateway::new(2, 10);
    gateway.fail_score = true;
    let mut session = started_session(&gateway).await;

    let request = session.begin_submission(SubmitTrigger::Manual).unwrap();
    let report = submission::run(&gateway, request).await;

    assert!(session.finish_submission(&report));
    assert_eq!(session.status(), AttemptStatus::Failed);
    assert_eq!(gateway.calls(), vec!["start", "calculate_score"]);
    assert!(matches!(
        report.outcome,
        SubmissionOutcome::Failed {
            step: Step::CalculateScore,
            ..
        }
    ));
}

#[tokio::test]
async fn test_failed_results_fetch_is_terminal() {
    let mut gateway = FakeGateway::new(2, 10);
    gateway.fail_results = true;
    let mut session = started_session(&gateway).await;

    let request = session.begin_submission(SubmitTrigger::Manual).unwrap();
    let report = submission::run(&gateway, request).await;

    assert!(session.finish_submission(&report));
    assert_eq!(session.status(), AttemptStatus::Failed);
    assert_eq!(
        gateway.calls(),
        vec!["start", "calculate_score", "detailed_results"]
    );
    assert_eq!(report.ledger.state(Step::CalculateScore), &StepState::Ok);
    assert!(matches!(
        report.ledger.state(Step::FetchResults),
        StepState::Failed(_)
    ));
    assert_eq!(report.ledger.state(Step::SaveAttempt), &StepState::Pending);
    assert_eq!(report.ledger.state(Step::SaveScore), &StepState::Pending);
    assert!(matches!(
        report.outcome,
        SubmissionOutcome::Failed {
            step: Step::FetchResults,
            ..
        }
    ));
}

#[tokio::test]
async fn test_failed_save_score_still_shows_result() {
    let mut gateway = FakeGateway::new(2, 10);
    gateway.fail_save_score = true;
    let mut session = started_session(&gateway).await;
    session.set_answer(2, OptionKey::A).unwrap();

    let request = session.begin_submission(SubmitTrigger::Manual).unwrap();
    let report = submission::run(&gateway, request).await;

    assert!(session.finish_submission(&report));
    assert_eq!(session.status(), AttemptStatus::Completed);
    assert_eq!(report.ledger.state(Step::SaveAttempt), &StepState::Ok);
    assert_eq!(
        report.ledger.state(Step::SaveScore),
        &StepState::Failed(GatewayError::Unauthorized)
    );

    let SubmissionOutcome::Completed { result, warning, score_record } = report.outcome else {
        panic!("expected a completed submission");
    };
    assert_eq!(warning.map(|warning| warning.step), Some(Step::SaveScore));
    assert!(score_record.is_none());
    assert_eq!(result.correct_count, 1);
}

#[tokio::test]
async fn test_oversized_timer_fails_start() {
    let gateway = FakeGateway::new(2, u64::MAX / 30);
    let mut session = AttemptSession::new(request());

    assert_eq!(
        session.start(&gateway).await,
        Err(StartError::InvalidTimer(u64::MAX / 30))
    );
    assert_eq!(session.status(), AttemptStatus::Failed);
}

#[tokio::test]
async fn test_start_failure_is_terminal() {
    let mut gateway = FakeGateway::new(2, 10);
    gateway.fail_start = true;
    let mut session = AttemptSession::new(request());

    let err = session.start(&gateway).await.unwrap_err();
    assert!(matches!(err, StartError::Gateway(GatewayError::Transport(_))));
    assert_eq!(session.status(), AttemptStatus::Failed);
    assert!(session.set_answer(1, OptionKey::A).is_err());
    assert!(session.begin_submission(SubmitTrigger::Manual).is_none());
}

#[tokio::test]
async fn test_empty_question_set_is_rejected() {
    let gateway = FakeGateway::new(0, 10);
    let mut session = AttemptSession::new(request());

    assert_eq!(session.start(&gateway).await, Err(StartError::NoQuestions));
    assert_eq!(session.status(), AttemptStatus::Failed);
}

#[tokio::test]
async fn test_app_drives_attempt_to_results() {
    let gateway = FakeGateway::new(3, 10);
    let mut app = App::new(AttemptSession::new(request()), ScoreBands::default());
    app.start(&gateway).await;
    assert_eq!(app.status(), AttemptStatus::InProgress);

    for key in [
        KeyCode::Char('a'),
        KeyCode::Right,
        KeyCode::Char('a'),
        KeyCode::Right,
        KeyCode::Char('a'),
    ] {
        assert_eq!(app.handle_key(key), Action::None);
    }

    let Action::Submit(request) = app.handle_key(KeyCode::Char('s')) else {
        panic!("expected submit");
    };
    assert_eq!(app.status(), AttemptStatus::Submitting);

    let report = submission::run(&gateway, request).await;
    app.on_submission(report);

    assert_eq!(app.status(), AttemptStatus::Completed);
    let result = app.result().expect("result");
    assert_eq!(result.score_percent, 100.0);
    assert_eq!(app.score_band().map(|band| band.label()), Some("Excellent!"));
    assert_eq!(app.handle_key(KeyCode::Char('q')), Action::Quit);
}
