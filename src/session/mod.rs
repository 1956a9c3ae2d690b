// src/session/mod.rs

pub mod clock;
pub mod controller;
pub mod results;

pub use clock::{Clock, Countdown, CountdownStatus, ManualClock, SystemClock, TIME_LOW_WARNING_SECS};
pub use controller::{SessionState, TestSession, TickOutcome, UnansweredPolicy};
pub use results::{
    OptionMark, QuestionReview, ResultReview, ScoreBand, VerificationState, PASSING_SCORE,
};
