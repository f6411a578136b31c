mod question;
mod result;

pub use question::{
    deserialize_optional_option, OptionKey, ParseOptionError, Question, QuestionId, TestKind,
};
pub use result::{
    ReviewEntry, ScoreBand, ScoreBands, TestResult, Verdict, EXCELLENT_THRESHOLD, GOOD_THRESHOLD,
};
