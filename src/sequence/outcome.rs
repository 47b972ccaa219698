use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::step::SequenceStep;

/// Why a step failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureReason {
    /// The action did not complete within its declared timeout.
    Timeout { limit_ms: u64 },
    /// The action ran and reported an error.
    Action(String),
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::Timeout { limit_ms } => {
                write!(f, "timed out after {limit_ms}ms")
            }
            FailureReason::Action(msg) => write!(f, "{msg}"),
        }
    }
}

/// The recorded outcome of one sequence step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepOutcome {
    Succeeded,
    Failed(FailureReason),
    /// The step never ran; the payload says why (e.g. "unknown action").
    Skipped(String),
}

impl fmt::Display for StepOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepOutcome::Succeeded => write!(f, "succeeded"),
            StepOutcome::Failed(reason) => write!(f, "failed: {reason}"),
            StepOutcome::Skipped(reason) => write!(f, "skipped: {reason}"),
        }
    }
}

/// One (step, outcome) audit entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepRecord {
    pub step: SequenceStep,
    pub outcome: StepOutcome,
    pub duration_ms: u64,
}

/// The complete, ordered outcome record for one invocation of the runner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunResult {
    pub run_id: String,
    pub records: Vec<StepRecord>,
    /// True when the run stopped early because cancellation was requested.
    pub cancelled: bool,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub duration_ms: i64,
}

impl RunResult {
    pub fn new(records: Vec<StepRecord>, cancelled: bool, started_at: DateTime<Utc>) -> Self {
        let now = Utc::now();
        Self {
            run_id: Uuid::new_v4().to_string(),
            records,
            cancelled,
            started_at,
            completed_at: now,
            duration_ms: (now - started_at).num_milliseconds(),
        }
    }

    pub fn any_failed(&self) -> bool {
        self.records
            .iter()
            .any(|r| matches!(r.outcome, StepOutcome::Failed(_)))
    }

    pub fn any_skipped(&self) -> bool {
        self.records
            .iter()
            .any(|r| matches!(r.outcome, StepOutcome::Skipped(_)))
    }

    /// Process exit code for the run: 0 all succeeded, 2 if any step was
    /// skipped, 1 if any step failed. A skip means the sequence referenced an
    /// action that does not exist, so it outranks ordinary failures.
    pub fn exit_code(&self) -> i32 {
        if self.any_skipped() {
            2
        } else if self.any_failed() {
            1
        } else {
            0
        }
    }
}
