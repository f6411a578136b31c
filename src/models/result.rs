//! Result of a completed attempt, as shown on the review screen.

use super::question::{OptionKey, QuestionId};

/// Default lower bound (inclusive) of the "Excellent" band.
pub const EXCELLENT_THRESHOLD: f64 = 80.0;
/// Default lower bound (inclusive) of the "Good" band.
pub const GOOD_THRESHOLD: f64 = 60.0;

/// Outcome of a single question after scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Correct,
    Incorrect,
    Unanswered,
}

/// One row of the answer review.
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewEntry {
    pub question_id: QuestionId,
    pub question_no: u32,
    pub text: String,
    pub options: [String; 4],
    pub user_answer: Option<OptionKey>,
    pub correct_answer: OptionKey,
    pub is_correct: bool,
    pub solution_link: Option<String>,
}

impl ReviewEntry {
    pub fn verdict(&self) -> Verdict {
        if self.is_correct {
            Verdict::Correct
        } else if self.user_answer.is_none() {
            Verdict::Unanswered
        } else {
            Verdict::Incorrect
        }
    }

    /// Display text for the user's answer.
    pub fn user_answer_label(&self) -> String {
        match self.user_answer {
            Some(option) => option.to_string(),
            None => "Not Answered".to_string(),
        }
    }
}

/// Immutable outcome of a successful submission.
#[derive(Debug, Clone, PartialEq)]
pub struct TestResult {
    pub score_percent: f64,
    pub correct_count: usize,
    pub total_questions: usize,
    pub entries: Vec<ReviewEntry>,
}

impl TestResult {
    /// The score comes from the backend; counts are derived from the review entries.
    pub fn new(score_percent: f64, total_questions: usize, entries: Vec<ReviewEntry>) -> Self {
        let correct_count = entries.iter().filter(|entry| entry.is_correct).count();
        Self {
            score_percent,
            correct_count,
            total_questions,
            entries,
        }
    }

    pub fn unanswered_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.verdict() == Verdict::Unanswered)
            .count()
    }
}

/// Thresholds used to band a percentage score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreBands {
    pub excellent: f64,
    pub good: f64,
}

impl Default for ScoreBands {
    fn default() -> Self {
        Self {
            excellent: EXCELLENT_THRESHOLD,
            good: GOOD_THRESHOLD,
        }
    }
}

/// Qualitative banding of a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreBand {
    Excellent,
    Good,
    NeedsImprovement,
}

impl ScoreBand {
    pub fn for_score(score_percent: f64, bands: ScoreBands) -> Self {
        if score_percent >= bands.excellent {
            ScoreBand::Excellent
        } else if score_percent >= bands.good {
            ScoreBand::Good
        } else {
            ScoreBand::NeedsImprovement
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ScoreBand::Excellent => "Excellent!",
            ScoreBand::Good => "Good Job!",
            ScoreBand::NeedsImprovement => "Keep Practicing!",
        }
    }
}
