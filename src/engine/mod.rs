//! Timed test-attempt engine.
//!
//! The session store, countdown, navigator and submission sequence are plain
//! state machines; the runner drives them from a single task.

pub mod navigation;
pub mod session;
pub mod submission;
pub mod timer;

pub use navigation::{AnswerSummary, GridCell, NavigationError, Navigator};
pub use session::{
    AnswerError, Answers, AttemptRequest, AttemptSession, AttemptStatus, StartError, TickEvent,
};
pub use submission::{
    PersistenceWarning, Step, StepLedger, StepState, SubmissionOutcome, SubmissionReport,
    SubmissionRequest, SubmitTrigger,
};
pub use timer::{format_hms, Countdown, TickOutcome, Ticker, TICK_PERIOD, WARNING_THRESHOLD_SECONDS};
