use serde::{Deserialize, Serialize};

use crate::error::RunbookError;

/// One scheduled invocation of a named action within a run.
///
/// The optional post-delay is a best-effort wall-clock wait applied after the
/// step's outcome has been recorded, before the next step starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceStep {
    pub action: String,
    pub post_delay_ms: Option<u64>,
}

impl SequenceStep {
    pub fn new(action: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            post_delay_ms: None,
        }
    }

    pub fn with_post_delay(mut self, delay_ms: u64) -> Self {
        self.post_delay_ms = Some(delay_ms);
        self
    }
}

/// Parse a `id[,id...]` sequence spec into ordered steps.
///
/// An empty spec or an empty identifier anywhere in the list is malformed and
/// fails the whole run before any step executes. Unknown identifiers are NOT
/// rejected here; they surface as `Skipped` at execution time.
pub fn parse_spec(spec: &str) -> Result<Vec<SequenceStep>, RunbookError> {
    if spec.trim().is_empty() {
        return Err(RunbookError::MalformedSequence(
            "sequence spec is empty".into(),
        ));
    }

    spec.split(',')
        .map(|raw| {
            let id = raw.trim();
            if id.is_empty() {
                return Err(RunbookError::MalformedSequence(format!(
                    "empty action identifier in \"{spec}\""
                )));
            }
            Ok(SequenceStep::new(id))
        })
        .collect()
}
