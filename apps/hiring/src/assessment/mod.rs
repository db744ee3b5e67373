//! Assessment modalities built on the wizard core: MCQ test, meeting
//! invitation and AI-avatar interview. Each is a `Modality` payload driven by
//! the generic `ModalityWizard`, which owns a `WizardController` for the steps
//! and a `BulkDispatcher` for the final per-candidate send.
//!
//! The shared pieces live here: the job picker, the candidate pool (fetched
//! per job on entering the candidate step) and the dispatch target that pairs
//! a selected id with the candidate record it resolved to.

pub mod avatar;
pub mod mcq;
pub mod meeting;
pub mod modality;

use std::fmt;

use tracing::{debug, warn};

pub use avatar::{AvatarPayload, AvatarWizard};
pub use mcq::{McqPayload, McqWizard};
pub use meeting::{MeetingPayload, MeetingWizard};
pub use modality::{Modality, ModalityWizard};

use crate::errors::AppError;
use crate::models::{Candidate, Job};
use crate::selection::SelectionState;
use crate::store::{RecordStore, StoreError};
use crate::wizard::Loadable;

pub const SELECT_JOB_MESSAGE: &str = "Please select a job";
pub const SELECT_CANDIDATES_MESSAGE: &str = "Please select at least one candidate";

/// One slot of a bulk send. `candidate` is `None` when the selected id is not
/// in the loaded candidate list; sending to it fails for that slot only.
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchTarget {
    pub candidate_id: String,
    pub candidate: Option<Candidate>,
}

impl DispatchTarget {
    pub fn candidate(&self) -> Result<&Candidate, AppError> {
        self.candidate
            .as_ref()
            .ok_or_else(|| AppError::CandidateNotFound(self.candidate_id.clone()))
    }

    /// The resolved candidate's email; invitations cannot go out without one.
    pub fn email(&self) -> Result<&str, AppError> {
        let candidate = self.candidate()?;
        candidate
            .email()
            .ok_or_else(|| AppError::MissingEmail(candidate.candidate_name.clone()))
    }
}

impl fmt::Display for DispatchTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.candidate {
            Some(candidate) => write!(f, "{candidate}"),
            None => f.write_str(&self.candidate_id),
        }
    }
}

/// Pairs every selected id, in selection order, with its loaded record.
pub fn resolve_targets(
    selection: &SelectionState<String>,
    candidates: &[Candidate],
) -> Vec<DispatchTarget> {
    selection
        .selected()
        .map(|id| {
            let candidate = candidates.iter().find(|c| &c.id == id).cloned();
            if candidate.is_none() {
                warn!(candidate_id = %id, "Selected candidate is not in the loaded list");
            }
            DispatchTarget {
                candidate_id: id.clone(),
                candidate,
            }
        })
        .collect()
}

// ──────────────────────────────────────────────────────────────────────────────
// Job picker
// ──────────────────────────────────────────────────────────────────────────────

/// Single-choice job step.
#[derive(Debug, Clone, Default)]
pub struct JobPicker {
    jobs: Loadable<Vec<Job>>,
    search: String,
    selected: Option<Job>,
}

impl JobPicker {
    pub fn jobs(&self) -> &Loadable<Vec<Job>> {
        &self.jobs
    }

    pub fn set_jobs(&mut self, result: Result<Vec<Job>, StoreError>) {
        if let Err(e) = &result {
            warn!(error = %e, "Failed to load jobs");
        }
        self.jobs = result.into();
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn set_search(&mut self, query: impl Into<String>) {
        self.search = query.into();
    }

    /// Jobs matching the search box, in list order.
    pub fn visible(&self) -> Vec<&Job> {
        self.jobs
            .ready()
            .map(|jobs| jobs.iter().filter(|j| j.matches_search(&self.search)).collect())
            .unwrap_or_default()
    }

    pub fn selected(&self) -> &Option<Job> {
        &self.selected
    }

    /// Selects a loaded job by id. Returns false for ids not in the list.
    pub fn select(&mut self, job_id: &str) -> bool {
        let Some(job) = self
            .jobs
            .ready()
            .and_then(|jobs| jobs.iter().find(|j| j.id == job_id))
        else {
            return false;
        };
        self.selected = Some(job.clone());
        true
    }

    pub fn selected_id(&self) -> Option<&str> {
        self.selected.as_ref().map(|j| j.id.as_str())
    }
}

/// Selects `job_id` and, when it differs from the previous job, drops the
/// candidates fetched for that one.
pub fn switch_job(job: &mut JobPicker, pool: &mut CandidatePool, job_id: &str) -> bool {
    let changed = job.selected_id() != Some(job_id);
    if !job.select(job_id) {
        return false;
    }
    if changed {
        debug!(job_id, "Job changed, resetting candidate pool");
        pool.reset();
    }
    true
}

// ──────────────────────────────────────────────────────────────────────────────
// Candidate pool
// ──────────────────────────────────────────────────────────────────────────────

/// Candidates of the selected job plus the multi-select over them.
#[derive(Debug, Clone, Default)]
pub struct CandidatePool {
    candidates: Loadable<Vec<Candidate>>,
    loaded_for: Option<String>,
    selection: SelectionState<String>,
    search: String,
}

impl CandidatePool {
    pub fn candidates(&self) -> &Loadable<Vec<Candidate>> {
        &self.candidates
    }

    /// Job id the current (or in-flight) list belongs to.
    pub fn loaded_for(&self) -> Option<&str> {
        self.loaded_for.as_deref()
    }

    pub fn selection(&self) -> &SelectionState<String> {
        &self.selection
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn set_search(&mut self, query: impl Into<String>) {
        self.search = query.into();
    }

    /// True unless a list for `job_id` is loaded or loading.
    pub fn needs_load(&self, job_id: &str) -> bool {
        self.loaded_for.as_deref() != Some(job_id)
            || matches!(self.candidates, Loadable::Idle | Loadable::Failed(_))
    }

    /// Starts a fetch for `job_id`. The previous job's candidates and
    /// selection are dropped.
    pub fn begin_load(&mut self, job_id: &str) {
        if self.loaded_for.as_deref() != Some(job_id) {
            self.selection = SelectionState::new();
            self.search.clear();
        }
        self.loaded_for = Some(job_id.to_string());
        self.candidates = Loadable::Loading;
    }

    /// Applies a fetch result. Results for a job that is no longer current are
    /// dropped and false is returned.
    pub fn finish_load(&mut self, job_id: &str, result: Result<Vec<Candidate>, StoreError>) -> bool {
        if self.loaded_for.as_deref() != Some(job_id) {
            debug!(job_id, "Dropping candidate list for a stale job");
            return false;
        }
        match &result {
            Ok(candidates) => {
                self.selection
                    .set_universe(candidates.iter().map(|c| c.id.clone()));
            }
            Err(e) => warn!(job_id, error = %e, "Failed to load candidates"),
        }
        self.candidates = result.into();
        true
    }

    /// Drops everything; used when the job selection changes.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Candidates matching the search box, in list order.
    pub fn visible(&self) -> Vec<&Candidate> {
        self.candidates
            .ready()
            .map(|list| list.iter().filter(|c| c.matches_search(&self.search)).collect())
            .unwrap_or_default()
    }

    pub fn visible_ids(&self) -> Vec<String> {
        self.visible().into_iter().map(|c| c.id.clone()).collect()
    }

    /// Returns the new selected flag.
    pub fn toggle(&mut self, candidate_id: &str) -> bool {
        self.selection.toggle(candidate_id.to_string())
    }

    /// Header checkbox: selects exactly the visible rows, or clears the
    /// selection when they are all selected already.
    pub fn toggle_all_visible(&mut self) {
        let visible = self.visible_ids();
        if self.selection.is_all_selected(&visible) {
            self.selection.clear();
        } else {
            self.selection.select_all(&visible);
        }
    }

    pub fn targets(&self) -> Vec<DispatchTarget> {
        let loaded = self.candidates.ready().map(Vec::as_slice).unwrap_or_default();
        resolve_targets(&self.selection, loaded)
    }

    /// Fetches the candidates of `job_id` unless they are already present.
    pub async fn load(&mut self, store: &dyn RecordStore, job_id: &str) {
        if !self.needs_load(job_id) {
            return;
        }
        self.begin_load(job_id);
        let result = store.list_candidates(job_id).await;
        self.finish_load(job_id, result);
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! In-memory record store shared by the modality tests.

    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use serde_json::{json, Value};

    use crate::dispatch::Receipt;
    use crate::models::{AiInterviewTemplate, Candidate, Job, McqQuestion};
    use crate::store::{
        AgendaRequest, AiInterviewRequest, McqTestRequest, MeetingRequest, RecordStore,
        StoreError,
    };

    pub fn job(id: &str, title: &str) -> Job {
        serde_json::from_value(json!({"id": id, "jobTitle": title, "companyName": "Acme"})).unwrap()
    }

    pub fn candidate(id: &str, name: &str) -> Candidate {
        serde_json::from_value(json!({
            "id": id,
            "candidateName": name,
            "candidateEmail": format!("{}@example.com", name.to_lowercase()),
        }))
        .unwrap()
    }

    pub fn question(id: &str) -> McqQuestion {
        serde_json::from_value(json!({
            "id": id,
            "question": format!("Question {id}"),
            "options": ["A", "B"],
            "correct": "A",
        }))
        .unwrap()
    }

    /// Serves fixed lists and records every send. Sends to resume ids in
    /// `failing` fail with an API error, as does agenda generation for
    /// candidate names in `failing_agendas`.
    #[derive(Default)]
    pub struct FakeStore {
        pub jobs: Vec<Job>,
        pub candidates: HashMap<String, Vec<Candidate>>,
        pub questions: Vec<McqQuestion>,
        pub templates: Vec<AiInterviewTemplate>,
        pub failing: Vec<String>,
        pub failing_agendas: Vec<String>,
        pub candidate_fetches: Mutex<Vec<String>>,
        pub sent: Mutex<Vec<Value>>,
    }

    impl FakeStore {
        pub fn sent(&self) -> Vec<Value> {
            self.sent.lock().unwrap().clone()
        }

        fn record(&self, resume_id: &str, body: Value) -> Result<Receipt, StoreError> {
            if self.failing.iter().any(|id| id == resume_id) {
                return Err(StoreError::Api {
                    status: 500,
                    message: "mail server unavailable".to_string(),
                });
            }
            self.sent.lock().unwrap().push(body);
            Ok(Receipt::record(format!("rec_{resume_id}")))
        }
    }

    #[async_trait]
    impl RecordStore for FakeStore {
        async fn list_jobs(&self) -> Result<Vec<Job>, StoreError> {
            Ok(self.jobs.clone())
        }

        async fn list_candidates(&self, job_id: &str) -> Result<Vec<Candidate>, StoreError> {
            self.candidate_fetches.lock().unwrap().push(job_id.to_string());
            Ok(self.candidates.get(job_id).cloned().unwrap_or_default())
        }

        async fn list_mcq_questions(&self) -> Result<Vec<McqQuestion>, StoreError> {
            Ok(self.questions.clone())
        }

        async fn list_ai_templates(&self) -> Result<Vec<AiInterviewTemplate>, StoreError> {
            Ok(self.templates.clone())
        }

        async fn send_mcq_test(&self, request: &McqTestRequest) -> Result<Receipt, StoreError> {
            self.record(&request.resume_id, serde_json::to_value(request)?)
        }

        async fn send_ai_interview(
            &self,
            request: &AiInterviewRequest,
        ) -> Result<Receipt, StoreError> {
            self.record(&request.candidate_id, serde_json::to_value(request)?)
        }

        async fn send_meeting(&self, request: &MeetingRequest) -> Result<Receipt, StoreError> {
            self.record(&request.resume_id, serde_json::to_value(request)?)
        }

        async fn generate_agenda(&self, request: &AgendaRequest) -> Result<String, StoreError> {
            let name = &request.candidate_data.name;
            if self.failing_agendas.iter().any(|failing| failing == name) {
                return Err(StoreError::Api {
                    status: 500,
                    message: "Failed to generate agenda".to_string(),
                });
            }
            Ok(format!("Agenda for {name} ({})", request.interview_type))
        }
    }
}
