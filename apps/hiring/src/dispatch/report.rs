use std::fmt::Display;

use serde::Serialize;

use super::Receipt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchStatus {
    Success,
    Failure,
}

/// Result for one target. `error` is present iff `status == Failure`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DispatchOutcome<T> {
    pub target: T,
    pub status: DispatchStatus,
    pub error: Option<String>,
    pub record_id: Option<String>,
}

impl<T> DispatchOutcome<T> {
    pub fn success(target: T, receipt: Receipt) -> Self {
        Self {
            target,
            status: DispatchStatus::Success,
            error: None,
            record_id: receipt.record_id,
        }
    }

    pub fn failure(target: T, reason: impl Into<String>) -> Self {
        Self {
            target,
            status: DispatchStatus::Failure,
            error: Some(reason.into()),
            record_id: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == DispatchStatus::Success
    }
}

/// Ordered outcomes, one per input target.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DispatchBatch<T> {
    outcomes: Vec<DispatchOutcome<T>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DispatchFailure<T> {
    pub target: T,
    pub reason: String,
}

/// Aggregate the completion step renders ("sent to N of M; failures: …").
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DispatchReport<T> {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub failures: Vec<DispatchFailure<T>>,
}

impl<T> DispatchBatch<T> {
    pub fn new(outcomes: Vec<DispatchOutcome<T>>) -> Self {
        Self { outcomes }
    }

    pub fn outcomes(&self) -> &[DispatchOutcome<T>] {
        &self.outcomes
    }

    pub fn into_outcomes(self) -> Vec<DispatchOutcome<T>> {
        self.outcomes
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.len() - self.succeeded()
    }

    pub fn all_succeeded(&self) -> bool {
        self.failed() == 0
    }
}

impl<T: Clone> DispatchBatch<T> {
    pub fn report(&self) -> DispatchReport<T> {
        let failures = self
            .outcomes
            .iter()
            .filter(|o| !o.is_success())
            .map(|o| DispatchFailure {
                target: o.target.clone(),
                reason: o.error.clone().unwrap_or_default(),
            })
            .collect();

        DispatchReport {
            total: self.len(),
            succeeded: self.succeeded(),
            failed: self.failed(),
            failures,
        }
    }
}

impl<T: Display> DispatchReport<T> {
    /// Toast text, e.g. "Sent to 2 of 3 candidate(s); failed: Bob (timeout)".
    pub fn summary(&self, noun: &str) -> String {
        let head = format!("Sent to {} of {} {noun}(s)", self.succeeded, self.total);
        if self.failures.is_empty() {
            return head;
        }
        let failures: Vec<String> = self
            .failures
            .iter()
            .map(|f| format!("{} ({})", f.target, f.reason))
            .collect();
        format!("{head}; failed: {}", failures.join(", "))
    }
}
