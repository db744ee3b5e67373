use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::contains_ci;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: String,
    pub job_title: String,
    #[serde(default)]
    pub company_name: String,
    pub location: Option<String>,
    pub job_type: Option<String>,
    pub status: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

impl Job {
    /// Job search box: title or company.
    pub fn matches_search(&self, query: &str) -> bool {
        let query = query.trim();
        query.is_empty() || contains_ci(&self.job_title, query) || contains_ci(&self.company_name, query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_camel_case_and_ignore_extra_fields() {
        let job: Job = serde_json::from_value(json!({
            "id": "job_1",
            "jobTitle": "Backend Engineer",
            "companyName": "Acme",
            "location": "Remote",
            "createdAt": "2024-05-01T10:00:00Z",
            "_count": { "Resume": 12 }
        }))
        .unwrap();
        assert_eq!(job.job_title, "Backend Engineer");
        assert_eq!(job.company_name, "Acme");
        assert!(job.created_at.is_some());
        assert!(job.job_type.is_none());
    }

    #[test]
    fn test_matches_search_title_or_company() {
        let job: Job = serde_json::from_value(json!({
            "id": "job_1", "jobTitle": "Backend Engineer", "companyName": "Acme"
        }))
        .unwrap();
        assert!(job.matches_search("backend"));
        assert!(job.matches_search("ACME"));
        assert!(job.matches_search("  "));
        assert!(!job.matches_search("frontend"));
    }
}
