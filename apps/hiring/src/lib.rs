//! Recruitment console core: candidate selection, multi-step assessment
//! wizards, concurrent per-candidate dispatch with partial-failure reporting,
//! and normalization of stored MCQ answers for scoring and review.

pub mod assessment;
pub mod codec;
pub mod config;
pub mod dispatch;
pub mod errors;
pub mod models;
pub mod selection;
pub mod state;
pub mod store;
pub mod telemetry;
pub mod wizard;
