//! Per-candidate request bodies for the bulk operation endpoints.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::Candidate;

/// Minimum MCQ test duration in minutes.
pub const MIN_MCQ_DURATION: u32 = 15;
/// Minutes granted per MCQ question.
pub const MINUTES_PER_QUESTION: u32 = 2;
/// Default AI-avatar interview duration in minutes.
pub const AI_INTERVIEW_DURATION: u32 = 30;

/// POST /api/interview/send-mcq-test
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct McqTestRequest {
    pub question_ids: Vec<String>,
    pub title: String,
    pub message: String,
    pub duration: u32,
    pub job_id: String,
    pub resume_id: String,
    pub candidate_email: String,
    pub candidate_name: String,
}

/// POST /api/interview/send-ai-interview
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AiInterviewRequest {
    pub candidate_id: String,
    pub job_post_id: String,
    pub questions: Value,
    pub question_type: String,
    pub duration: u32,
    pub template_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MeetingType {
    #[default]
    Technical,
    Behavioral,
    Situational,
}

impl MeetingType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MeetingType::Technical => "TECHNICAL",
            MeetingType::Behavioral => "BEHAVIORAL",
            MeetingType::Situational => "SITUATIONAL",
        }
    }

    /// Lowercase form the agenda service expects.
    pub fn interview_type(&self) -> &'static str {
        match self {
            MeetingType::Technical => "technical",
            MeetingType::Behavioral => "behavioral",
            MeetingType::Situational => "situational",
        }
    }
}

impl fmt::Display for MeetingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// POST /api/meetings/send-meeting
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeetingRequest {
    pub job_id: String,
    pub resume_id: String,
    pub candidate_email: String,
    pub candidate_name: String,
    pub meeting_time: DateTime<Utc>,
    pub meeting_type: MeetingType,
    pub agenda: String,
}

/// POST /api/meetings/generate-agenda
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgendaRequest {
    pub interview_type: String,
    pub candidate_data: AgendaCandidate,
}

/// Resume fields the agenda service reads. Missing values go out empty.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgendaCandidate {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub skills: Vec<String>,
    pub experience_years: f64,
    pub match_score: f64,
    pub processing_method: String,
}

impl AgendaRequest {
    pub fn for_candidate(candidate: &Candidate, meeting_type: MeetingType) -> Self {
        Self {
            interview_type: meeting_type.interview_type().to_string(),
            candidate_data: AgendaCandidate {
                name: candidate.candidate_name.clone(),
                email: candidate.email().unwrap_or_default().to_string(),
                phone: candidate.candidate_phone.clone().unwrap_or_default(),
                skills: candidate.skills.clone(),
                experience_years: candidate.experience_years.unwrap_or_default(),
                match_score: candidate.match_score.unwrap_or_default(),
                processing_method: "manual".to_string(),
            },
        }
    }
}

/// 2 minutes per question, never less than 15.
pub fn mcq_duration(question_count: usize) -> u32 {
    let count = u32::try_from(question_count).unwrap_or(u32::MAX);
    count.saturating_mul(MINUTES_PER_QUESTION).max(MIN_MCQ_DURATION)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_mcq_duration_floor() {
        assert_eq!(mcq_duration(0), 15);
        assert_eq!(mcq_duration(7), 15);
        assert_eq!(mcq_duration(8), 16);
        assert_eq!(mcq_duration(30), 60);
    }

    #[test]
    fn test_meeting_request_wire_format() {
        let request = MeetingRequest {
            job_id: "job_1".to_string(),
            resume_id: "res_1".to_string(),
            candidate_email: "ada@example.com".to_string(),
            candidate_name: "Ada".to_string(),
            meeting_time: Utc.with_ymd_and_hms(2026, 11, 2, 15, 0, 0).unwrap(),
            meeting_type: MeetingType::Situational,
            agenda: "Intro".to_string(),
        };
        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(body["meetingType"], "SITUATIONAL");
        assert_eq!(body["resumeId"], "res_1");
        assert_eq!(body["meetingTime"], "2026-11-02T15:00:00Z");
    }

    #[test]
    fn test_agenda_request_from_sparse_resume() {
        let candidate: Candidate = serde_json::from_value(json!({
            "id": "res_2",
            "candidateName": "Bob",
            "candidateEmail": null,
            "skills": ["go", "sql"],
            "experienceYears": 4.5
        }))
        .unwrap();
        let body = serde_json::to_value(AgendaRequest::for_candidate(
            &candidate,
            MeetingType::Behavioral,
        ))
        .unwrap();
        assert_eq!(body["interview_type"], "behavioral");
        assert_eq!(body["candidate_data"]["name"], "Bob");
        assert_eq!(body["candidate_data"]["email"], "");
        assert_eq!(body["candidate_data"]["experience_years"], 4.5);
        assert_eq!(body["candidate_data"]["match_score"], 0.0);
        assert_eq!(body["candidate_data"]["skills"], json!(["go", "sql"]));
    }
}
