//! Bulk dispatcher: fans one aggregated selection out into N independent
//! remote operations and reports every outcome.
//!
//! Settle-all semantics:
//! - every target's operation is invoked, whatever happens to its siblings
//! - operations run concurrently on the caller's task (no spawning, no shared
//!   batch timeout); completion order is unconstrained
//! - the batch lists one outcome per target, in input order
//! - an `Err` or a panic inside an operation becomes a `Failure` for that slot
//!   only; nothing escapes the dispatcher

pub mod report;

use std::any::Any;
use std::fmt::{Debug, Display};
use std::future::Future;
use std::panic::AssertUnwindSafe;

use futures_util::future::join_all;
use futures_util::FutureExt;
use tracing::{info, warn};
use uuid::Uuid;

pub use report::{DispatchBatch, DispatchFailure, DispatchOutcome, DispatchReport, DispatchStatus};

/// What a successful remote operation hands back.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Receipt {
    /// Identifier of the record the remote created, when it reported one.
    pub record_id: Option<String>,
}

impl Receipt {
    pub fn record(id: impl Into<String>) -> Self {
        Self {
            record_id: Some(id.into()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct BulkDispatcher {
    label: &'static str,
}

impl BulkDispatcher {
    pub fn new(label: &'static str) -> Self {
        Self { label }
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    /// Runs `op` once per target and waits for all of them to settle.
    pub async fn dispatch<T, F, Fut, E>(&self, targets: Vec<T>, op: F) -> DispatchBatch<T>
    where
        T: Clone + Debug,
        F: Fn(T) -> Fut,
        Fut: Future<Output = Result<Receipt, E>>,
        E: Display,
    {
        let outcomes = self
            .settle_all(targets, op)
            .await
            .into_iter()
            .map(|(target, result)| match result {
                Ok(receipt) => DispatchOutcome::success(target, receipt),
                Err(reason) => DispatchOutcome::failure(target, reason),
            })
            .collect();
        DispatchBatch::new(outcomes)
    }

    /// Same fan-out as [`dispatch`](Self::dispatch) for operations that
    /// return a value rather than a receipt. Each target is paired with its
    /// value or its failure reason, in input order.
    pub async fn settle_all<T, R, F, Fut, E>(
        &self,
        targets: Vec<T>,
        op: F,
    ) -> Vec<(T, Result<R, String>)>
    where
        T: Clone + Debug,
        F: Fn(T) -> Fut,
        Fut: Future<Output = Result<R, E>>,
        E: Display,
    {
        let batch_id = Uuid::new_v4();
        info!(
            dispatcher = self.label,
            %batch_id,
            targets = targets.len(),
            "Dispatching bulk operation"
        );

        let op = &op;
        let calls = targets.iter().cloned().map(|target| {
            // The async block defers `op(target)` to the first poll so a panic
            // while building the call is caught as well.
            AssertUnwindSafe(async move { op(target).await }).catch_unwind()
        });
        let settled = join_all(calls).await;

        let results: Vec<(T, Result<R, String>)> = targets
            .into_iter()
            .zip(settled)
            .map(|(target, result)| {
                let result = match result {
                    Ok(Ok(value)) => Ok(value),
                    Ok(Err(e)) => {
                        warn!(dispatcher = self.label, %batch_id, ?target, error = %e, "Dispatch item failed");
                        Err(e.to_string())
                    }
                    Err(panic) => {
                        let reason = panic_reason(panic.as_ref());
                        warn!(dispatcher = self.label, %batch_id, ?target, %reason, "Dispatch item panicked");
                        Err(reason)
                    }
                };
                (target, result)
            })
            .collect();

        let failed = results.iter().filter(|(_, result)| result.is_err()).count();
        info!(
            dispatcher = self.label,
            %batch_id,
            succeeded = results.len() - failed,
            failed,
            "Bulk operation settled"
        );
        results
    }
}

fn panic_reason(panic: &(dyn Any + Send)) -> String {
    let detail = panic
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string());
    format!("Operation aborted: {detail}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    #[tokio::test]
    async fn test_partial_failure_reports_per_item() {
        let executed = Arc::new(Mutex::new(Vec::new()));
        let dispatcher = BulkDispatcher::new("test");

        let batch = dispatcher
            .dispatch(vec!["A", "B", "C"], |target| {
                let executed = executed.clone();
                async move {
                    executed.lock().unwrap().push(target);
                    if target == "B" {
                        Err("mailbox unavailable".to_string())
                    } else {
                        Ok(Receipt::record(format!("rec-{target}")))
                    }
                }
            })
            .await;

        let report = batch.report();
        assert_eq!(report.succeeded, 2);
        assert_eq!(report.failed, 1);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].target, "B");
        assert_eq!(report.failures[0].reason, "mailbox unavailable");

        let mut ran = executed.lock().unwrap().clone();
        ran.sort();
        assert_eq!(ran, vec!["A", "B", "C"]);
    }

    #[tokio::test]
    async fn test_counts_reconcile_when_everything_fails() {
        let dispatcher = BulkDispatcher::new("test");
        let targets: Vec<u32> = (0..7).collect();
        let batch = dispatcher
            .dispatch(targets.clone(), |_| async { Err::<Receipt, _>("down") })
            .await;
        assert_eq!(batch.len(), targets.len());
        assert_eq!(batch.succeeded() + batch.failed(), targets.len());
        assert_eq!(batch.failed(), 7);
    }

    #[tokio::test(start_paused = true)]
    async fn test_output_order_matches_input_not_completion() {
        let dispatcher = BulkDispatcher::new("test");
        // First target finishes last.
        let batch = dispatcher
            .dispatch(vec![3u64, 2, 1], |delay| async move {
                tokio::time::sleep(Duration::from_millis(delay * 100)).await;
                Ok::<_, String>(Receipt::record(delay.to_string()))
            })
            .await;

        let order: Vec<u64> = batch.outcomes().iter().map(|o| o.target).collect();
        assert_eq!(order, vec![3, 2, 1]);
        assert_eq!(
            batch.outcomes()[0].record_id.as_deref(),
            Some("3")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_operations_run_concurrently() {
        let dispatcher = BulkDispatcher::new("test");
        let started = tokio::time::Instant::now();
        let batch = dispatcher
            .dispatch(vec![1, 2, 3, 4], |_| async {
                tokio::time::sleep(Duration::from_secs(1)).await;
                Ok::<_, String>(Receipt::default())
            })
            .await;
        assert_eq!(batch.succeeded(), 4);
        // Sequential execution would take 4s.
        assert!(started.elapsed() < Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_failure_does_not_cancel_siblings() {
        let dispatcher = BulkDispatcher::new("test");
        let batch = dispatcher
            .dispatch(vec![1u64, 2, 3], |n| async move {
                if n == 1 {
                    return Err("rejected".to_string());
                }
                tokio::time::sleep(Duration::from_secs(n)).await;
                Ok(Receipt::default())
            })
            .await;
        assert_eq!(batch.outcomes()[0].status, DispatchStatus::Failure);
        assert_eq!(batch.outcomes()[1].status, DispatchStatus::Success);
        assert_eq!(batch.outcomes()[2].status, DispatchStatus::Success);
    }

    #[tokio::test]
    async fn test_panicking_operation_is_a_failure() {
        let dispatcher = BulkDispatcher::new("test");
        let batch = dispatcher
            .dispatch(vec![1, 2, 3], |n| async move {
                if n == 2 {
                    panic!("serializer exploded");
                }
                Ok::<_, String>(Receipt::default())
            })
            .await;
        assert_eq!(batch.succeeded(), 2);
        let report = batch.report();
        assert_eq!(report.failures[0].target, 2);
        assert!(report.failures[0].reason.contains("serializer exploded"));
    }

    #[tokio::test]
    async fn test_settle_all_pairs_values_with_targets() {
        let dispatcher = BulkDispatcher::new("test");
        let settled = dispatcher
            .settle_all(vec!["ada", "bob", "cy"], |name| async move {
                match name {
                    "bob" => Err("agenda service down"),
                    "cy" => panic!("bad template"),
                    _ => Ok(name.to_uppercase()),
                }
            })
            .await;
        assert_eq!(settled.len(), 3);
        assert_eq!(settled[0], ("ada", Ok("ADA".to_string())));
        assert_eq!(settled[1], ("bob", Err("agenda service down".to_string())));
        assert_eq!(settled[2].0, "cy");
        assert!(settled[2].1.as_ref().unwrap_err().contains("bad template"));
    }

    #[tokio::test]
    async fn test_empty_targets_yield_empty_batch() {
        let dispatcher = BulkDispatcher::new("test");
        let batch = dispatcher
            .dispatch(Vec::<u32>::new(), |_| async { Ok::<_, String>(Receipt::default()) })
            .await;
        assert!(batch.is_empty());
        assert_eq!(batch.report().failed, 0);
    }
}
