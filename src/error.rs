use thiserror::Error;

#[derive(Debug, Error)]
pub enum RunbookError {
    #[error("Config error: {0}")]
    Config(String),

    #[error("Malformed sequence: {0}")]
    MalformedSequence(String),

    #[error("Action already registered: {0}")]
    DuplicateAction(String),
}

/// The typed failure an action invocation can produce.
#[derive(Debug, Error)]
pub enum ActionError {
    #[error("Failed to spawn command: {0}")]
    Spawn(String),

    #[error("Command exited with status {code}")]
    ExitStatus { code: i32 },

    #[error("{0}")]
    Other(String),
}
