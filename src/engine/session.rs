//! In-memory state of the running attempt.

use thiserror::Error;
use uuid::Uuid;

use crate::gateway::{AnswerMap, AttemptTestDto, Gateway, GatewayError};
use crate::models::{OptionKey, Question, QuestionId, TestKind};

use super::submission::{SubmissionOutcome, SubmissionReport, SubmissionRequest, SubmitTrigger};
use super::timer::{Countdown, TickOutcome};

/// Lifecycle of an attempt. `Completed` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptStatus {
    Loading,
    InProgress,
    Submitting,
    Completed,
    Failed,
}

impl AttemptStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

/// Which test to attempt, for which user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttemptRequest {
    pub mock_test_id: u64,
    pub kind: TestKind,
    pub user_id: u64,
}

#[derive(Debug, Error, PartialEq)]
pub enum StartError {
    #[error(transparent)]
    Gateway(#[from] GatewayError),
    #[error("the test has no questions")]
    NoQuestions,
    #[error("timer of {0} minutes is out of range")]
    InvalidTimer(u64),
    #[error("attempt cannot be started from status {0:?}")]
    AlreadyStarted(AttemptStatus),
}

#[derive(Debug, Error, PartialEq)]
pub enum AnswerError {
    #[error("answers are locked while the attempt is {0:?}")]
    NotInProgress(AttemptStatus),
    #[error("question {0} is not part of this attempt")]
    UnknownQuestion(QuestionId),
}

/// Selected option per question. At most one option is recorded per question.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Answers(AnswerMap);

impl Answers {
    pub fn get(&self, question_id: QuestionId) -> Option<OptionKey> {
        self.0.get(&question_id).copied()
    }

    pub fn is_answered(&self, question_id: QuestionId) -> bool {
        self.0.contains_key(&question_id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_map(&self) -> &AnswerMap {
        &self.0
    }

    fn set(&mut self, question_id: QuestionId, option: OptionKey) {
        self.0.insert(question_id, option);
    }
}

/// Tick applied to the session.
#[derive(Debug, Clone, PartialEq)]
pub enum TickEvent {
    /// The session is not running; nothing changed.
    Ignored,
    Running(u64),
    /// Time ran out; submission has begun.
    Expired(SubmissionRequest),
}

/// The active exam instance, exclusively owned by the attempt view.
#[derive(Debug, Clone)]
pub struct AttemptSession {
    session_id: Uuid,
    request: AttemptRequest,
    mock_test_name: String,
    countdown: Countdown,
    questions: Vec<Question>,
    answers: Answers,
    status: AttemptStatus,
}

impl AttemptSession {
    pub fn new(request: AttemptRequest) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            request,
            mock_test_name: String::new(),
            countdown: Countdown::new(0),
            questions: Vec::new(),
            answers: Answers::default(),
            status: AttemptStatus::Loading,
        }
    }

    /// Fetches the question set and starts the attempt. A failure is terminal
    /// and is not retried.
    pub async fn start(&mut self, gateway: &dyn Gateway) -> Result<(), StartError> {
        if self.status != AttemptStatus::Loading {
            return Err(StartError::AlreadyStarted(self.status));
        }

        tracing::info!(
            session_id = %self.session_id,
            mock_test_id = self.request.mock_test_id,
            kind = %self.request.kind,
            "starting attempt"
        );

        let result = gateway
            .start_attempt(self.request.kind, self.request.mock_test_id, self.request.user_id)
            .await
            .map_err(StartError::from)
            .and_then(|attempt| self.load(attempt));

        if let Err(err) = &result {
            self.status = AttemptStatus::Failed;
            tracing::error!(session_id = %self.session_id, error = %err, "failed to start attempt");
        }
        result
    }

    fn load(&mut self, attempt: AttemptTestDto) -> Result<(), StartError> {
        if attempt.questions.is_empty() {
            return Err(StartError::NoQuestions);
        }
        let total_seconds = attempt
            .timer_in_minutes
            .checked_mul(60)
            .ok_or(StartError::InvalidTimer(attempt.timer_in_minutes))?;

        self.mock_test_name = attempt.mock_test_name;
        self.countdown = Countdown::new(total_seconds);
        self.questions = attempt.questions.into_iter().map(Question::from).collect();
        self.answers = Answers::default();
        self.status = AttemptStatus::InProgress;

        tracing::info!(
            session_id = %self.session_id,
            questions = self.questions.len(),
            seconds = self.countdown.total(),
            "attempt in progress"
        );
        Ok(())
    }

    /// Records `option` for `question_id`, replacing any earlier choice.
    pub fn set_answer(&mut self, question_id: QuestionId, option: OptionKey) -> Result<(), AnswerError> {
        if self.status != AttemptStatus::InProgress {
            return Err(AnswerError::NotInProgress(self.status));
        }
        if !self.questions.iter().any(|q| q.question_id == question_id) {
            return Err(AnswerError::UnknownQuestion(question_id));
        }

        self.answers.set(question_id, option);
        Ok(())
    }

    /// Applies one timer tick. Only a running session counts down.
    pub fn on_tick(&mut self) -> TickEvent {
        if self.status != AttemptStatus::InProgress {
            return TickEvent::Ignored;
        }

        match self.countdown.tick() {
            TickOutcome::Running(remaining) => TickEvent::Running(remaining),
            TickOutcome::Expired => self.expire(),
            TickOutcome::Stopped => TickEvent::Ignored,
        }
    }

    /// Begins submission for a timer that is already at zero (zero-length test).
    pub fn poll_expiry(&mut self) -> Option<SubmissionRequest> {
        if self.status != AttemptStatus::InProgress || !self.countdown.take_expiry() {
            return None;
        }
        match self.expire() {
            TickEvent::Expired(request) => Some(request),
            _ => None,
        }
    }

    fn expire(&mut self) -> TickEvent {
        tracing::info!(session_id = %self.session_id, "time is up, submitting");
        match self.begin_submission(SubmitTrigger::Timeout) {
            Some(request) => TickEvent::Expired(request),
            None => TickEvent::Ignored,
        }
    }

    /// Moves to `Submitting` and snapshots everything the submission needs.
    ///
    /// Returns `None` unless the attempt is in progress, so a second trigger
    /// while a submission is in flight is a no-op.
    pub fn begin_submission(&mut self, trigger: SubmitTrigger) -> Option<SubmissionRequest> {
        if self.status != AttemptStatus::InProgress {
            tracing::debug!(session_id = %self.session_id, ?trigger, status = ?self.status, "ignoring submit trigger");
            return None;
        }

        self.status = AttemptStatus::Submitting;
        Some(SubmissionRequest {
            session_id: self.session_id,
            trigger,
            kind: self.request.kind,
            mock_test_id: self.request.mock_test_id,
            mock_test_name: self.mock_test_name.clone(),
            user_id: self.request.user_id,
            question_ids: self.questions.iter().map(|q| q.question_id).collect(),
            answers: self.answers.as_map().clone(),
            total_seconds: self.countdown.total(),
            remaining_seconds: self.countdown.remaining(),
        })
    }

    /// Applies the outcome of a submission. Returns false if no submission was
    /// in flight.
    pub fn finish_submission(&mut self, report: &SubmissionReport) -> bool {
        if self.status != AttemptStatus::Submitting || report.session_id != self.session_id {
            return false;
        }

        self.status = match report.outcome {
            SubmissionOutcome::Completed { .. } => AttemptStatus::Completed,
            SubmissionOutcome::Failed { .. } => AttemptStatus::Failed,
        };
        true
    }

    /// Marks an in-flight submission as failed when no report will arrive.
    pub fn abandon_submission(&mut self) -> bool {
        if self.status != AttemptStatus::Submitting {
            return false;
        }
        self.status = AttemptStatus::Failed;
        true
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn request(&self) -> &AttemptRequest {
        &self.request
    }

    pub fn mock_test_name(&self) -> &str {
        &self.mock_test_name
    }

    pub fn status(&self) -> AttemptStatus {
        self.status
    }

    /// Whether leaving the attempt now would lose work and should be confirmed.
    pub fn is_leave_guarded(&self) -> bool {
        matches!(self.status, AttemptStatus::InProgress | AttemptStatus::Submitting)
    }

    pub fn countdown(&self) -> &Countdown {
        &self.countdown
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn question(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }

    pub fn answers(&self) -> &Answers {
        &self.answers
    }

    /// Builds a running session directly from a start payload.
    #[cfg(test)]
    pub(crate) fn started(request: AttemptRequest, attempt: AttemptTestDto) -> Self {
        let mut session = Self::new(request);
        session.load(attempt).expect("test attempt has questions");
        session
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> AttemptRequest {
        AttemptRequest {
            mock_test_id: 3,
            kind: TestKind::Paid,
            user_id: 7,
        }
    }

    fn running(question_count: u64, minutes: u64) -> AttemptSession {
        AttemptSession::started(request(), fixtures::attempt(question_count, minutes))
    }

    #[test]
    fn test_new_session_is_loading() {
        let session = AttemptSession::new(request());
        assert_eq!(session.status(), AttemptStatus::Loading);
        assert!(!session.is_leave_guarded());
    }

    #[test]
    fn test_load_initializes_timer_and_questions() {
        let session = running(5, 2);
        assert_eq!(session.status(), AttemptStatus::InProgress);
        assert_eq!(session.countdown().total(), 120);
        assert_eq!(session.countdown().remaining(), 120);
        assert_eq!(session.questions().len(), 5);
        assert!(session.answers().is_empty());
        assert!(session.is_leave_guarded());
    }

    #[test]
    fn test_last_answer_wins() {
        let mut session = running(3, 1);
        let sequence = [
            (10, OptionKey::A),
            (20, OptionKey::B),
            (10, OptionKey::C),
            (10, OptionKey::C),
            (30, OptionKey::D),
            (20, OptionKey::A),
        ];

        for (question_id, option) in sequence {
            session.set_answer(question_id, option).unwrap();
        }

        assert_eq!(session.answers().get(10), Some(OptionKey::C));
        assert_eq!(session.answers().get(20), Some(OptionKey::A));
        assert_eq!(session.answers().get(30), Some(OptionKey::D));
        assert_eq!(session.answers().len(), 3);
    }

    #[test]
    fn test_unknown_question_is_rejected() {
        let mut session = running(2, 1);
        assert_eq!(
            session.set_answer(99, OptionKey::A),
            Err(AnswerError::UnknownQuestion(99))
        );
        assert!(session.answers().is_empty());
    }

    #[test]
    fn test_answers_are_locked_after_submission_begins() {
        let mut session = running(2, 1);
        session.set_answer(10, OptionKey::A).unwrap();

        assert!(session.begin_submission(SubmitTrigger::Manual).is_some());
        assert_eq!(
            session.set_answer(10, OptionKey::B),
            Err(AnswerError::NotInProgress(AttemptStatus::Submitting))
        );
        assert_eq!(session.answers().get(10), Some(OptionKey::A));
    }

    #[test]
    fn test_second_submit_is_ignored() {
        let mut session = running(2, 1);
        assert!(session.begin_submission(SubmitTrigger::Manual).is_some());
        assert!(session.begin_submission(SubmitTrigger::Manual).is_none());
        assert!(session.begin_submission(SubmitTrigger::Timeout).is_none());
        assert_eq!(session.status(), AttemptStatus::Submitting);
    }

    #[test]
    fn test_ticks_expire_once_and_trigger_submission() {
        let mut session = running(2, 1);
        let mut expirations = 0;

        for _ in 0..60 {
            if let TickEvent::Expired(request) = session.on_tick() {
                expirations += 1;
                assert_eq!(request.trigger, SubmitTrigger::Timeout);
                assert_eq!(request.remaining_seconds, 0);
            }
        }

        assert_eq!(expirations, 1);
        assert_eq!(session.countdown().remaining(), 0);
        assert_eq!(session.status(), AttemptStatus::Submitting);
        assert_eq!(session.on_tick(), TickEvent::Ignored);
    }

    #[test]
    fn test_ticks_ignored_after_manual_submit() {
        let mut session = running(2, 1);
        session.on_tick();
        session.begin_submission(SubmitTrigger::Manual).unwrap();

        assert_eq!(session.on_tick(), TickEvent::Ignored);
        assert_eq!(session.countdown().remaining(), 59);
    }

    #[test]
    fn test_zero_length_timer_expires_immediately() {
        let mut session = running(2, 0);
        let request = session.poll_expiry().expect("expired");
        assert_eq!(request.trigger, SubmitTrigger::Timeout);
        assert!(session.poll_expiry().is_none());
    }

    #[test]
    fn test_oversized_timer_is_rejected() {
        let minutes = u64::MAX / 30;
        let mut session = AttemptSession::new(request());

        assert_eq!(
            session.load(fixtures::attempt(1, minutes)),
            Err(StartError::InvalidTimer(minutes))
        );
        assert!(session.questions().is_empty());
        assert_eq!(session.countdown().total(), 0);
    }

    #[test]
    fn test_running_timer_has_no_pending_expiry() {
        let mut session = running(2, 1);
        assert!(session.poll_expiry().is_none());
        assert_eq!(session.status(), AttemptStatus::InProgress);
    }
}
