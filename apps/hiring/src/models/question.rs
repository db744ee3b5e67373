use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::contains_ci;

/// A saved MCQ question. `options` and `correct` are stored loosely (see the
/// codec for how they are reconciled).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct McqQuestion {
    pub id: String,
    pub question: String,
    #[serde(default)]
    pub options: Value,
    #[serde(default, alias = "correctAnswer")]
    pub correct: Value,
    #[serde(default = "default_points")]
    pub points: u32,
    pub topic: Option<String>,
    pub difficulty: Option<String>,
    pub explanation: Option<String>,
}

fn default_points() -> u32 {
    1
}

impl McqQuestion {
    /// Question search box: text or topic.
    pub fn matches_search(&self, query: &str) -> bool {
        let query = query.trim();
        query.is_empty()
            || contains_ci(&self.question, query)
            || self.topic.as_deref().is_some_and(|t| contains_ci(t, query))
    }
}

/// One answer as submitted by a candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmittedAnswer {
    pub question_id: String,
    #[serde(default)]
    pub answer: Value,
    pub time_spent: Option<u32>,
}

/// Saved AI-avatar interview question set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiInterviewTemplate {
    pub id: String,
    pub title: String,
    pub question_type: String,
    #[serde(default)]
    pub questions: Value,
}
