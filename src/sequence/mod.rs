mod outcome;
mod step;

pub use outcome::{FailureReason, RunResult, StepOutcome, StepRecord};
pub use step::{SequenceStep, parse_spec};
