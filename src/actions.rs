//! Shell-command action implementations.
//!
//! The runner core knows nothing about what an action does; this module is
//! the host side that turns `[[action]]` config entries into registered
//! operations. Each action runs its command through `sh -c` and maps the
//! exit status to success or a typed failure.

use tokio::process::Command;

use crate::config::RunbookConfig;
use crate::error::{ActionError, RunbookError};
use crate::registry::{ActionFn, ActionRegistry, action_fn};

/// Build an action that executes `sh -c <command>`.
pub fn shell_action(command: impl Into<String>) -> ActionFn {
    let command = command.into();
    action_fn(move || {
        let command = command.clone();
        async move {
            // A timed-out invocation is dropped mid-flight; the child must
            // not outlive it, or later steps would run in parallel with it.
            let status = Command::new("sh")
                .arg("-c")
                .arg(&command)
                .kill_on_drop(true)
                .status()
                .await
                .map_err(|e| ActionError::Spawn(e.to_string()))?;
            if status.success() {
                Ok(())
            } else {
                Err(ActionError::ExitStatus {
                    code: status.code().unwrap_or(-1),
                })
            }
        }
    })
}

/// Populate a registry from the `[[action]]` entries of the config.
/// A duplicated id in the file surfaces as [`RunbookError::DuplicateAction`].
pub fn build_registry(config: &RunbookConfig) -> Result<ActionRegistry, RunbookError> {
    let mut registry = ActionRegistry::new();
    for entry in &config.actions {
        registry.register(
            entry.id.clone(),
            shell_action(entry.command.clone()),
            entry.timeout_ms,
        )?;
    }
    Ok(registry)
}
