use thiserror::Error;

use crate::store::StoreError;
use crate::wizard::TransitionError;

/// Crate-level error. Per-candidate failures use it as their reason before the
/// dispatcher folds them into the batch report.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Candidate {0} is not in the loaded candidate list")]
    CandidateNotFound(String),

    #[error("Candidate {0} has no email address")]
    MissingEmail(String),

    #[error("{0}")]
    Transition(#[from] TransitionError),

    #[error("Record store error: {0}")]
    Store(#[from] StoreError),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Validation failures are shown as-is; everything else is a hard error.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            AppError::Transition(TransitionError::ValidationFailed { .. })
        )
    }
}
