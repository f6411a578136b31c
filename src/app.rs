//! Attempt screen state and keyboard handling.

use crossterm::event::KeyCode;
use tokio::time::Instant;

use crate::engine::{
    navigation, AnswerSummary, AttemptSession, AttemptStatus, GridCell, Navigator,
    SubmissionOutcome, SubmissionReport, SubmissionRequest, SubmitTrigger, TickEvent,
};
use crate::gateway::Gateway;
use crate::models::{OptionKey, Question, ScoreBand, ScoreBands, TestResult};
use crate::notification::{Notification, NotificationKind};

/// What the event loop should do after an input.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    None,
    Quit,
    Submit(SubmissionRequest),
}

pub struct App {
    session: AttemptSession,
    navigator: Navigator,
    bands: ScoreBands,
    result: Option<TestResult>,
    failure: Option<String>,
    notification: Option<Notification>,
    jump_input: Option<String>,
    confirm_leave: bool,
    result_scroll: usize,
}

impl App {
    pub fn new(session: AttemptSession, bands: ScoreBands) -> Self {
        Self {
            navigator: Navigator::new(session.questions().len()),
            session,
            bands,
            result: None,
            failure: None,
            notification: None,
            jump_input: None,
            confirm_leave: false,
            result_scroll: 0,
        }
    }

    /// Starts the attempt. On failure the failure screen takes over.
    pub async fn start(&mut self, gateway: &dyn Gateway) {
        match self.session.start(gateway).await {
            Ok(()) => {
                self.navigator = Navigator::new(self.session.questions().len());
            }
            Err(err) => {
                self.failure = Some(err.to_string());
                self.notify("Failed to start test", NotificationKind::Error);
            }
        }
    }

    pub fn session(&self) -> &AttemptSession {
        &self.session
    }

    pub fn status(&self) -> AttemptStatus {
        self.session.status()
    }

    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.session.question(self.navigator.current())
    }

    pub fn current_answer(&self) -> Option<OptionKey> {
        self.current_question()
            .and_then(|question| self.session.answers().get(question.question_id))
    }

    pub fn grid(&self) -> Vec<GridCell> {
        navigation::grid(&self.session, &self.navigator)
    }

    pub fn summary(&self) -> AnswerSummary {
        navigation::summary(&self.session)
    }

    pub fn result(&self) -> Option<&TestResult> {
        self.result.as_ref()
    }

    pub fn score_band(&self) -> Option<ScoreBand> {
        self.result
            .as_ref()
            .map(|result| ScoreBand::for_score(result.score_percent, self.bands))
    }

    pub fn failure(&self) -> Option<&str> {
        self.failure.as_deref()
    }

    pub fn notification(&self) -> Option<&Notification> {
        self.notification.as_ref()
    }

    pub fn jump_input(&self) -> Option<&str> {
        self.jump_input.as_deref()
    }

    pub fn result_scroll(&self) -> usize {
        self.result_scroll
    }

    pub fn notify(&mut self, message: impl Into<String>, kind: NotificationKind) {
        self.notification = Some(Notification::new(message, kind));
    }

    pub fn dismiss_expired_notification(&mut self, now: Instant) {
        if self
            .notification
            .as_ref()
            .is_some_and(|notification| notification.is_expired(now))
        {
            self.notification = None;
        }
    }

    pub fn on_tick(&mut self) -> Action {
        match self.session.on_tick() {
            TickEvent::Expired(request) => {
                self.jump_input = None;
                self.notify("Time is up! Submitting your test...", NotificationKind::Warning);
                Action::Submit(request)
            }
            TickEvent::Running(_) | TickEvent::Ignored => Action::None,
        }
    }

    /// Submits right away if the timer is already at zero.
    pub fn poll_expiry(&mut self) -> Action {
        match self.session.poll_expiry() {
            Some(request) => Action::Submit(request),
            None => Action::None,
        }
    }

    pub fn on_submission(&mut self, report: SubmissionReport) {
        if !self.session.finish_submission(&report) {
            return;
        }

        match report.outcome {
            SubmissionOutcome::Completed {
                result, warning, ..
            } => {
                self.result = Some(result);
                self.result_scroll = 0;
                match warning {
                    Some(warning) => self.notify(
                        format!("Your score is shown, but the {} did not go through", warning.step),
                        NotificationKind::Warning,
                    ),
                    None => self.notify("Test submitted successfully!", NotificationKind::Success),
                }
            }
            SubmissionOutcome::Failed { step, error } => {
                self.failure = Some(format!("The {} failed: {}", step, error));
                self.notify("Failed to calculate score", NotificationKind::Error);
            }
        }
    }

    /// The submission task died without reporting.
    pub fn on_submission_lost(&mut self, reason: &str) {
        tracing::error!(session_id = %self.session.session_id(), reason, "submission task lost");
        if self.session.abandon_submission() {
            self.failure = Some(format!("Submission did not complete: {}", reason));
            self.notify("Failed to submit test", NotificationKind::Error);
        }
    }

    pub fn handle_key(&mut self, key: KeyCode) -> Action {
        match self.session.status() {
            AttemptStatus::Loading => self.handle_loading_key(key),
            AttemptStatus::InProgress => self.handle_attempt_key(key),
            AttemptStatus::Submitting => self.handle_guarded_quit(key),
            AttemptStatus::Completed => self.handle_result_key(key),
            AttemptStatus::Failed => self.handle_failed_key(key),
        }
    }

    fn handle_loading_key(&mut self, key: KeyCode) -> Action {
        match key {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => Action::Quit,
            _ => Action::None,
        }
    }

    fn handle_attempt_key(&mut self, key: KeyCode) -> Action {
        if self.jump_input.is_some() {
            self.handle_jump_key(key);
            return Action::None;
        }

        match key {
            KeyCode::Char(c @ ('a'..='d' | 'A'..='D')) => {
                if let (Some(option), Some(question_id)) = (
                    OptionKey::from_char(c),
                    self.current_question().map(|question| question.question_id),
                ) {
                    if let Err(err) = self.session.set_answer(question_id, option) {
                        tracing::warn!(error = %err, "answer rejected");
                    }
                }
                self.confirm_leave = false;
                Action::None
            }
            KeyCode::Left | KeyCode::Char('h') | KeyCode::Char('p') => {
                self.navigator.previous();
                self.confirm_leave = false;
                Action::None
            }
            KeyCode::Right | KeyCode::Char('l') | KeyCode::Char('n') => {
                self.navigator.next();
                self.confirm_leave = false;
                Action::None
            }
            KeyCode::Char('g') => {
                self.jump_input = Some(String::new());
                self.confirm_leave = false;
                Action::None
            }
            KeyCode::Char('s') | KeyCode::Char('S') => {
                self.confirm_leave = false;
                match self.session.begin_submission(SubmitTrigger::Manual) {
                    Some(request) => Action::Submit(request),
                    None => Action::None,
                }
            }
            _ => self.handle_guarded_quit(key),
        }
    }

    fn handle_jump_key(&mut self, key: KeyCode) {
        let Some(input) = self.jump_input.as_mut() else {
            return;
        };

        match key {
            KeyCode::Char(c) if c.is_ascii_digit() => {
                if input.len() < 4 {
                    input.push(c);
                }
            }
            KeyCode::Backspace => {
                input.pop();
            }
            KeyCode::Enter => {
                let entered = std::mem::take(input);
                self.jump_input = None;
                self.jump_to(&entered);
            }
            KeyCode::Esc => {
                self.jump_input = None;
            }
            _ => {}
        }
    }

    /// Jumps to a 1-based grid position.
    fn jump_to(&mut self, entered: &str) {
        let Ok(position) = entered.parse::<usize>() else {
            return;
        };

        let moved = position
            .checked_sub(1)
            .is_some_and(|index| self.navigator.go_to(index).is_ok());
        if !moved {
            self.notify(
                format!("There is no question at position {}", position),
                NotificationKind::Error,
            );
        }
    }

    fn handle_guarded_quit(&mut self, key: KeyCode) -> Action {
        match key {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                if !self.session.is_leave_guarded() || self.confirm_leave {
                    return Action::Quit;
                }
                self.confirm_leave = true;
                self.notify(
                    "Press q again to leave. Your answers will be lost.",
                    NotificationKind::Warning,
                );
                Action::None
            }
            _ => {
                self.confirm_leave = false;
                Action::None
            }
        }
    }

    fn handle_result_key(&mut self, key: KeyCode) -> Action {
        match key {
            KeyCode::Down | KeyCode::Char('j') => {
                self.scroll_results_down();
                Action::None
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.result_scroll = self.result_scroll.saturating_sub(1);
                Action::None
            }
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => Action::Quit,
            _ => Action::None,
        }
    }

    fn handle_failed_key(&mut self, key: KeyCode) -> Action {
        match key {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc | KeyCode::Enter => {
                Action::Quit
            }
            _ => Action::None,
        }
    }

    fn scroll_results_down(&mut self) {
        if let Some(result) = &self.result {
            let max_scroll = result.entries.len().saturating_sub(1);
            self.result_scroll = (self.result_scroll + 1).min(max_scroll);
        }
    }

    #[cfg(test)]
    pub(crate) fn session_mut(&mut self) -> &mut AttemptSession {
        &mut self.session
    }
}
