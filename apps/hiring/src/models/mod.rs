//! Wire records exchanged with the record store. Only the fields the wizards
//! and the codec need are modelled; unknown fields are ignored.

pub mod candidate;
pub mod job;
pub mod question;

pub use candidate::Candidate;
pub use job::Job;
pub use question::{AiInterviewTemplate, McqQuestion, SubmittedAnswer};

/// Case-insensitive substring match used by every search box.
pub(crate) fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}
