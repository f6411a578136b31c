//! Current-question tracking and the overview grid.

use thiserror::Error;

use super::session::AttemptSession;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum NavigationError {
    #[error("question index {index} is out of range (0..{len})")]
    OutOfRange { index: usize, len: usize },
}

/// Which question is displayed. Independent of timing and answers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigator {
    current: usize,
    len: usize,
}

impl Navigator {
    pub fn new(len: usize) -> Self {
        Self { current: 0, len }
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Jumps to `index`. Out-of-range input is rejected, never clamped.
    pub fn go_to(&mut self, index: usize) -> Result<(), NavigationError> {
        if index >= self.len {
            return Err(NavigationError::OutOfRange {
                index,
                len: self.len,
            });
        }
        self.current = index;
        Ok(())
    }

    /// Moves forward; stays put on the last question.
    pub fn next(&mut self) {
        if self.current + 1 < self.len {
            self.current += 1;
        }
    }

    /// Moves back; stays put on the first question.
    pub fn previous(&mut self) {
        self.current = self.current.saturating_sub(1);
    }

    pub fn is_first(&self) -> bool {
        self.current == 0
    }

    pub fn is_last(&self) -> bool {
        self.current + 1 >= self.len
    }
}

/// One cell of the question grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridCell {
    pub index: usize,
    pub question_no: u32,
    pub answered: bool,
    pub current: bool,
}

/// Answered/remaining counters shown next to the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnswerSummary {
    pub total: usize,
    pub answered: usize,
    pub remaining: usize,
}

/// Projects the session's answers onto the grid.
pub fn grid(session: &AttemptSession, navigator: &Navigator) -> Vec<GridCell> {
    session
        .questions()
        .iter()
        .enumerate()
        .map(|(index, question)| GridCell {
            index,
            question_no: question.question_no,
            answered: session.answers().is_answered(question.question_id),
            current: index == navigator.current(),
        })
        .collect()
}

pub fn summary(session: &AttemptSession) -> AnswerSummary {
    let total = session.questions().len();
    let answered = session.answers().len();
    AnswerSummary {
        total,
        answered,
        remaining: total.saturating_sub(answered),
    }
}
