use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::error::{ActionError, RunbookError};

/// Boxed future returned by an action invocation.
pub type ActionFuture = Pin<Box<dyn Future<Output = Result<(), ActionError>> + Send>>;

/// A registered, named, no-argument operation. Each call produces a fresh
/// future so the same action can appear multiple times in one sequence.
pub type ActionFn = Arc<dyn Fn() -> ActionFuture + Send + Sync>;

/// An action together with its declared execution limit.
#[derive(Clone)]
pub struct RegisteredAction {
    pub op: ActionFn,
    pub timeout_ms: Option<u64>,
}

/// Registry of named actions. Read-only during a run; the embedding
/// application populates it before the runner starts.
#[derive(Default)]
pub struct ActionRegistry {
    actions: HashMap<String, RegisteredAction>,
}

impl ActionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an action under a unique identifier.
    ///
    /// Fails with [`RunbookError::DuplicateAction`] when the id is already
    /// taken, leaving the earlier registration intact. An empty id is
    /// rejected as a config error.
    pub fn register(
        &mut self,
        id: impl Into<String>,
        op: ActionFn,
        timeout_ms: Option<u64>,
    ) -> Result<(), RunbookError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(RunbookError::Config("action id must not be empty".into()));
        }
        if self.actions.contains_key(&id) {
            return Err(RunbookError::DuplicateAction(id));
        }
        self.actions.insert(id, RegisteredAction { op, timeout_ms });
        Ok(())
    }

    pub fn resolve(&self, id: &str) -> Option<&RegisteredAction> {
        self.actions.get(id)
    }

    /// Registered identifiers in sorted order, for `runbook list`.
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.actions.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

/// Wrap a plain async closure result into an [`ActionFn`].
pub fn action_fn<F, Fut>(f: F) -> ActionFn
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), ActionError>> + Send + 'static,
{
    Arc::new(move || Box::pin(f()))
}
