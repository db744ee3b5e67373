//! Record store client: the console's REST API, reached over HTTP.
//!
//! Reads what the wizards need (jobs, candidates for a job, saved question
//! templates) and fires the per-candidate send operations. Sends create
//! records and emails, so they are never retried here.
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

pub mod requests;

pub use requests::{
    AgendaRequest, AiInterviewRequest, McqTestRequest, MeetingRequest, MeetingType,
};

use crate::config::Config;
use crate::dispatch::Receipt;
use crate::models::{AiInterviewTemplate, Candidate, Job, McqQuestion};

const JOBS_PATH: &str = "/api/jobs";
const MCQ_TEMPLATES_PATH: &str = "/api/assessments/mcq/templates";
const AI_TEMPLATES_PATH: &str = "/api/interview/ai-templates";
const SEND_MCQ_PATH: &str = "/api/interview/send-mcq-test";
const SEND_AI_INTERVIEW_PATH: &str = "/api/interview/send-ai-interview";
const SEND_MEETING_PATH: &str = "/api/meetings/send-meeting";
const GENERATE_AGENDA_PATH: &str = "/api/meetings/generate-agenda";

/// JSON pointers tried, in order, for the id of the record a send created.
const RECEIPT_POINTERS: &[&str] = &[
    "/data/interviewId",
    "/data/meetingId",
    "/attempt/id",
    "/interview/id",
    "/data/id",
    "/id",
];

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("HTTP error: {0}")]
    Http(reqwest::Error),

    #[error("Request timed out")]
    Timeout,

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Rejected: {0}")]
    Rejected(String),

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

impl From<reqwest::Error> for StoreError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            StoreError::Timeout
        } else {
            StoreError::Http(e)
        }
    }
}

/// Everything the wizards need from the record store. `HttpRecordStore` is the
/// production implementation; tests swap in doubles.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn list_jobs(&self) -> Result<Vec<Job>, StoreError>;

    async fn list_candidates(&self, job_id: &str) -> Result<Vec<Candidate>, StoreError>;

    async fn list_mcq_questions(&self) -> Result<Vec<McqQuestion>, StoreError>;

    async fn list_ai_templates(&self) -> Result<Vec<AiInterviewTemplate>, StoreError>;

    async fn send_mcq_test(&self, request: &McqTestRequest) -> Result<Receipt, StoreError>;

    async fn send_ai_interview(&self, request: &AiInterviewRequest) -> Result<Receipt, StoreError>;

    async fn send_meeting(&self, request: &MeetingRequest) -> Result<Receipt, StoreError>;

    /// Drafts an interview agenda for one candidate. Returns the agenda text.
    async fn generate_agenda(&self, request: &AgendaRequest) -> Result<String, StoreError>;
}

#[derive(Debug, Deserialize)]
struct JobsEnvelope {
    #[serde(default)]
    jobs: Vec<Job>,
}

#[derive(Debug, Deserialize)]
struct ResumesEnvelope {
    #[serde(default)]
    resumes: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct QuestionsEnvelope {
    #[serde(default)]
    questions: Vec<McqQuestion>,
}

#[derive(Debug, Deserialize)]
struct TemplatesEnvelope {
    #[serde(default)]
    templates: Vec<AiInterviewTemplate>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
    details: Option<String>,
}

#[derive(Clone)]
pub struct HttpRecordStore {
    client: Client,
    base_url: String,
    token: String,
}

impl HttpRecordStore {
    pub fn new(
        base_url: impl Into<String>,
        token: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, StoreError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, StoreError> {
        Self::new(
            config.record_store_url.clone(),
            config.record_store_token.clone(),
            config.request_timeout(),
        )
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, StoreError> {
        debug!("GET {path}");
        let response = self
            .client
            .get(self.url(path))
            .bearer_auth(&self.token)
            .send()
            .await?;
        let body = read_body(response).await?;
        Ok(serde_json::from_value(body)?)
    }

    async fn post_json<B: Serialize + Sync>(&self, path: &str, body: &B) -> Result<Receipt, StoreError> {
        let body = self.post_value(path, body).await?;
        Ok(receipt_from(&body))
    }

    /// POSTs `body` and returns the response JSON once the remote accepted it.
    async fn post_value<B: Serialize + Sync>(&self, path: &str, body: &B) -> Result<Value, StoreError> {
        debug!("POST {path}");
        let response = self
            .client
            .post(self.url(path))
            .bearer_auth(&self.token)
            .json(body)
            .send()
            .await?;
        let body = read_body(response).await?;

        if body.get("success").and_then(Value::as_bool) == Some(false) {
            let message = body
                .get("error")
                .or_else(|| body.get("message"))
                .and_then(Value::as_str)
                .unwrap_or("remote reported failure")
                .to_string();
            warn!("POST {path} rejected: {message}");
            return Err(StoreError::Rejected(message));
        }

        Ok(body)
    }
}

#[async_trait]
impl RecordStore for HttpRecordStore {
    async fn list_jobs(&self) -> Result<Vec<Job>, StoreError> {
        Ok(self.get_json::<JobsEnvelope>(JOBS_PATH).await?.jobs)
    }

    async fn list_candidates(&self, job_id: &str) -> Result<Vec<Candidate>, StoreError> {
        let path = format!("{JOBS_PATH}/{job_id}/resumes");
        Ok(self.get_json::<ResumesEnvelope>(&path).await?.resumes)
    }

    async fn list_mcq_questions(&self) -> Result<Vec<McqQuestion>, StoreError> {
        Ok(self
            .get_json::<QuestionsEnvelope>(MCQ_TEMPLATES_PATH)
            .await?
            .questions)
    }

    async fn list_ai_templates(&self) -> Result<Vec<AiInterviewTemplate>, StoreError> {
        Ok(self
            .get_json::<TemplatesEnvelope>(AI_TEMPLATES_PATH)
            .await?
            .templates)
    }

    async fn send_mcq_test(&self, request: &McqTestRequest) -> Result<Receipt, StoreError> {
        self.post_json(SEND_MCQ_PATH, request).await
    }

    async fn send_ai_interview(&self, request: &AiInterviewRequest) -> Result<Receipt, StoreError> {
        self.post_json(SEND_AI_INTERVIEW_PATH, request).await
    }

    async fn send_meeting(&self, request: &MeetingRequest) -> Result<Receipt, StoreError> {
        self.post_json(SEND_MEETING_PATH, request).await
    }

    async fn generate_agenda(&self, request: &AgendaRequest) -> Result<String, StoreError> {
        let body = self.post_value(GENERATE_AGENDA_PATH, request).await?;
        body.get("agenda")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| StoreError::Rejected("agenda missing from response".to_string()))
    }
}

/// Reads the body as JSON, turning any non-2xx status into `StoreError::Api`
/// with the server's `error` (and `details`) when it sent them.
async fn read_body(response: Response) -> Result<Value, StoreError> {
    let status = response.status();
    let text = response.text().await?;

    if !status.is_success() {
        let message = serde_json::from_str::<ErrorBody>(&text)
            .ok()
            .and_then(|body| match (body.error, body.details) {
                (Some(error), Some(details)) => Some(format!("{error}: {details}")),
                (Some(error), None) => Some(error),
                (None, details) => details,
            })
            .or_else(|| (!text.trim().is_empty()).then(|| text.trim().to_string()))
            .unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("unknown status")
                    .to_string()
            });
        warn!("Record store returned {status}: {message}");
        return Err(StoreError::Api {
            status: status.as_u16(),
            message,
        });
    }

    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    Ok(serde_json::from_str(&text)?)
}

fn receipt_from(body: &Value) -> Receipt {
    Receipt {
        record_id: RECEIPT_POINTERS
            .iter()
            .find_map(|pointer| body.pointer(pointer).and_then(Value::as_str))
            .map(str::to_string),
    }
}
