use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use tokio::sync::watch;
use tokio::time::{sleep, timeout};

use crate::registry::ActionRegistry;
use crate::sequence::{FailureReason, RunResult, SequenceStep, StepOutcome, StepRecord};
use crate::ui::RunProgress;

/// Requests cancellation of an in-flight run.
///
/// Cancellation is cooperative: the runner checks the paired token before
/// each step and while sleeping through a post-delay. The step currently
/// executing is always allowed to finish.
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    pub fn new() -> (Self, CancelToken) {
        let (tx, rx) = watch::channel(false);
        (Self { tx }, CancelToken { rx })
    }

    pub fn cancel(&self) {
        // Receivers may already be gone if the run finished.
        let _ = self.tx.send(true);
    }
}

/// Receiving side of a cancellation request.
#[derive(Clone)]
pub struct CancelToken {
    rx: watch::Receiver<bool>,
}

impl CancelToken {
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once cancellation is requested. Pends forever when the handle
    /// is dropped without cancelling, so it is safe to race against a sleep.
    pub async fn cancelled(&mut self) {
        loop {
            if *self.rx.borrow_and_update() {
                return;
            }
            if self.rx.changed().await.is_err() {
                std::future::pending::<()>().await;
            }
        }
    }
}

/// Executes sequences of named actions strictly in order.
pub struct ActionRunner {
    registry: Arc<ActionRegistry>,
    abort_on_failure: bool,
    default_timeout_ms: Option<u64>,
    progress: Option<RunProgress>,
}

impl ActionRunner {
    pub fn new(registry: Arc<ActionRegistry>) -> Self {
        Self {
            registry,
            abort_on_failure: false,
            default_timeout_ms: None,
            progress: None,
        }
    }

    /// Stop the run after the first failed step instead of continuing.
    pub fn abort_on_failure(mut self, enabled: bool) -> Self {
        self.abort_on_failure = enabled;
        self
    }

    /// Timeout applied to actions that declare none of their own.
    pub fn default_timeout_ms(mut self, timeout_ms: Option<u64>) -> Self {
        self.default_timeout_ms = timeout_ms;
        self
    }

    /// Attach terminal progress reporting (spinner + per-step lines).
    pub fn with_progress(mut self, progress: RunProgress) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Run the sequence, one step at a time.
    ///
    /// Per step: resolve the action (unknown id records `Skipped`), invoke it
    /// under its timeout, record the outcome, then sleep through the
    /// post-delay. Failures never abort the run unless configured to; the
    /// terminate → wait → relaunch pattern requires later steps to run even
    /// when an earlier one misbehaves.
    pub async fn run(&self, steps: &[SequenceStep], mut cancel: CancelToken) -> RunResult {
        let started_at = Utc::now();
        let mut records = Vec::with_capacity(steps.len());
        let mut cancelled = false;

        for step in steps {
            if cancel.is_cancelled() {
                cancelled = true;
                break;
            }

            if let Some(progress) = &self.progress {
                progress.step_started(&step.action);
            }

            let clock = Instant::now();
            let outcome = self.execute_step(step).await;
            let duration_ms = clock.elapsed().as_millis() as u64;

            if let Some(progress) = &self.progress {
                progress.step_finished(&step.action, &outcome);
            }

            let failed = matches!(outcome, StepOutcome::Failed(_));
            records.push(StepRecord {
                step: step.clone(),
                outcome,
                duration_ms,
            });

            if failed && self.abort_on_failure {
                break;
            }

            if let Some(delay_ms) = step.post_delay_ms
                && delay_ms > 0
            {
                tokio::select! {
                    _ = sleep(Duration::from_millis(delay_ms)) => {}
                    _ = cancel.cancelled() => {
                        cancelled = true;
                        break;
                    }
                }
            }
        }

        RunResult::new(records, cancelled, started_at)
    }

    async fn execute_step(&self, step: &SequenceStep) -> StepOutcome {
        let action = match self.registry.resolve(&step.action) {
            Some(a) => a,
            None => return StepOutcome::Skipped("unknown action".into()),
        };

        let invocation = (action.op)();
        let limit_ms = action.timeout_ms.or(self.default_timeout_ms);

        let result = match limit_ms {
            Some(ms) => match timeout(Duration::from_millis(ms), invocation).await {
                Ok(result) => result,
                Err(_) => return StepOutcome::Failed(FailureReason::Timeout { limit_ms: ms }),
            },
            None => invocation.await,
        };

        match result {
            Ok(()) => StepOutcome::Succeeded,
            Err(e) => StepOutcome::Failed(FailureReason::Action(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ActionError;
    use crate::registry::action_fn;

    fn registry_with_basics() -> ActionRegistry {
        let mut registry = ActionRegistry::new();
        registry
            .register("ok", action_fn(|| async { Ok(()) }), None)
            .unwrap();
        registry
            .register(
                "boom",
                action_fn(|| async { Err(ActionError::Other("boom".into())) }),
                None,
            )
            .unwrap();
        registry
            .register(
                "hang",
                action_fn(|| async {
                    std::future::pending::<()>().await;
                    Ok(())
                }),
                Some(50),
            )
            .unwrap();
        registry
    }

    fn runner(registry: ActionRegistry) -> ActionRunner {
        ActionRunner::new(Arc::new(registry))
    }

    #[tokio::test]
    async fn empty_sequence_yields_empty_result() {
        let runner = runner(registry_with_basics());
        let (_handle, token) = CancelHandle::new();

        let result = runner.run(&[], token).await;
        assert!(result.records.is_empty());
        assert!(!result.cancelled);
        assert_eq!(result.exit_code(), 0);
    }

    #[tokio::test]
    async fn unknown_action_is_skipped_not_fatal() {
        let runner = runner(registry_with_basics());
        let (_handle, token) = CancelHandle::new();

        let steps = vec![SequenceStep::new("no-such-action"), SequenceStep::new("ok")];
        let result = runner.run(&steps, token).await;

        assert_eq!(result.records.len(), 2);
        assert_eq!(
            result.records[0].outcome,
            StepOutcome::Skipped("unknown action".into())
        );
        assert_eq!(result.records[1].outcome, StepOutcome::Succeeded);
        assert_eq!(result.exit_code(), 2);
    }

    #[tokio::test]
    async fn sequence_honors_sleeps_and_delays() {
        let mut registry = registry_with_basics();
        registry
            .register(
                "slow",
                action_fn(|| async {
                    sleep(Duration::from_millis(100)).await;
                    Ok(())
                }),
                None,
            )
            .unwrap();
        let runner = runner(registry);
        let (_handle, token) = CancelHandle::new();

        let steps = vec![
            SequenceStep::new("ok"),
            SequenceStep::new("slow").with_post_delay(100),
            SequenceStep::new("ok"),
        ];
        let clock = Instant::now();
        let result = runner.run(&steps, token).await;

        assert!(clock.elapsed() >= Duration::from_millis(200));
        assert_eq!(result.records.len(), 3);
        assert!(
            result
                .records
                .iter()
                .all(|r| r.outcome == StepOutcome::Succeeded)
        );
        assert_eq!(result.exit_code(), 0);
    }

    #[tokio::test]
    async fn cancellation_during_post_delay_stops_before_next_step() {
        let runner = runner(registry_with_basics());
        let (handle, token) = CancelHandle::new();

        let steps = vec![
            SequenceStep::new("ok"),
            SequenceStep::new("ok").with_post_delay(5000),
            SequenceStep::new("ok"),
        ];
        let task = tokio::spawn(async move { runner.run(&steps, token).await });

        // Let the first two steps record, then cancel mid-delay.
        sleep(Duration::from_millis(100)).await;
        handle.cancel();

        let result = task.await.unwrap();
        assert_eq!(result.records.len(), 2);
        assert!(result.cancelled);
    }

    #[tokio::test]
    async fn timeout_records_failure_and_run_continues() {
        let runner = runner(registry_with_basics());
        let (_handle, token) = CancelHandle::new();

        let steps = vec![SequenceStep::new("hang"), SequenceStep::new("ok")];
        let result = runner.run(&steps, token).await;

        assert_eq!(result.records.len(), 2);
        assert_eq!(
            result.records[0].outcome,
            StepOutcome::Failed(FailureReason::Timeout { limit_ms: 50 })
        );
        assert_eq!(result.records[1].outcome, StepOutcome::Succeeded);
        assert_eq!(result.exit_code(), 1);
    }

    #[tokio::test]
    async fn failure_does_not_abort_by_default() {
        let runner = runner(registry_with_basics());
        let (_handle, token) = CancelHandle::new();

        let steps = vec![SequenceStep::new("boom"), SequenceStep::new("ok")];
        let result = runner.run(&steps, token).await;

        assert_eq!(result.records.len(), 2);
        assert_eq!(
            result.records[0].outcome,
            StepOutcome::Failed(FailureReason::Action("boom".into()))
        );
        assert_eq!(result.records[1].outcome, StepOutcome::Succeeded);
    }

    #[tokio::test]
    async fn abort_on_failure_stops_the_run() {
        let runner = runner(registry_with_basics()).abort_on_failure(true);
        let (_handle, token) = CancelHandle::new();

        let steps = vec![SequenceStep::new("boom"), SequenceStep::new("ok")];
        let result = runner.run(&steps, token).await;

        assert_eq!(result.records.len(), 1);
        assert_eq!(result.exit_code(), 1);
    }

    #[tokio::test]
    async fn default_timeout_applies_when_action_declares_none() {
        let mut registry = ActionRegistry::new();
        registry
            .register(
                "hang-untimed",
                action_fn(|| async {
                    std::future::pending::<()>().await;
                    Ok(())
                }),
                None,
            )
            .unwrap();
        let runner = runner(registry).default_timeout_ms(Some(50));
        let (_handle, token) = CancelHandle::new();

        let result = runner.run(&[SequenceStep::new("hang-untimed")], token).await;
        assert_eq!(
            result.records[0].outcome,
            StepOutcome::Failed(FailureReason::Timeout { limit_ms: 50 })
        );
    }

    #[tokio::test]
    async fn cancel_before_start_runs_nothing() {
        let runner = runner(registry_with_basics());
        let (handle, token) = CancelHandle::new();
        handle.cancel();

        let result = runner.run(&[SequenceStep::new("ok")], token).await;
        assert!(result.records.is_empty());
        assert!(result.cancelled);
    }
}
