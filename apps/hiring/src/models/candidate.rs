use std::fmt;

use serde::{Deserialize, Serialize};

use super::contains_ci;

/// A resume attached to a job posting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub id: String,
    pub candidate_name: String,
    /// Resumes without a parsed email exist; they load but cannot be invited.
    pub candidate_email: Option<String>,
    pub candidate_phone: Option<String>,
    pub experience_years: Option<f64>,
    #[serde(default)]
    pub skills: Vec<String>,
    pub match_score: Option<f64>,
    pub recommendation: Option<String>,
}

impl Candidate {
    /// Candidate search box: name or email.
    pub fn matches_search(&self, query: &str) -> bool {
        let query = query.trim();
        query.is_empty()
            || contains_ci(&self.candidate_name, query)
            || self.email().is_some_and(|email| contains_ci(email, query))
    }

    /// Email address, if the resume has a non-blank one.
    pub fn email(&self) -> Option<&str> {
        self.candidate_email
            .as_deref()
            .map(str::trim)
            .filter(|email| !email.is_empty())
    }
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.candidate_name)
    }
}
