//! Meeting invitation wizard: Select Job → Select Candidates → Generate
//! Agenda → Confirm & Send.
//!
//! The agenda step can draft the agenda remotely, one call per selected
//! candidate. Drafts are joined into the single agenda every invitation
//! carries and stay editable before sending.

use anyhow::anyhow;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::info;

use super::modality::{Modality, ModalityWizard};
use super::{CandidatePool, DispatchTarget, JobPicker};
use super::{SELECT_CANDIDATES_MESSAGE, SELECT_JOB_MESSAGE};
use crate::dispatch::{DispatchBatch, DispatchOutcome, Receipt};
use crate::errors::AppError;
use crate::store::{AgendaRequest, MeetingRequest, MeetingType, RecordStore, StoreError};
use crate::wizard::steps::{at_least_one, loaded_and, non_blank, value_selected};
use crate::wizard::{Step, TransitionError};

pub const AGENDA_MESSAGE: &str = "Please enter a meeting agenda and time";
pub const AGENDA_SEPARATOR: &str = "\n\n---\n\n";

pub type MeetingWizard = ModalityWizard<MeetingPayload>;

#[derive(Debug, Clone, Default)]
pub struct MeetingPayload {
    pub job: JobPicker,
    pub candidates: CandidatePool,
    pub agenda: String,
    pub meeting_type: MeetingType,
    pub meeting_time: Option<DateTime<Utc>>,
}

/// Section used for a candidate whose draft could not be generated.
fn fallback_agenda(target: &DispatchTarget, meeting_type: MeetingType) -> String {
    format!("Meeting agenda for {target} - {meeting_type} interview")
}

#[async_trait]
impl Modality for MeetingPayload {
    type Request = MeetingRequest;

    const NAME: &'static str = "meeting";
    const CANDIDATE_STEP: usize = 1;

    fn steps() -> Vec<Step<Self>> {
        let agenda = non_blank(|p: &MeetingPayload| p.agenda.as_str());
        let time = value_selected(|p: &MeetingPayload| &p.meeting_time);
        vec![
            Step::new(
                "Select Job",
                SELECT_JOB_MESSAGE,
                value_selected(|p: &MeetingPayload| p.job.selected()),
            ),
            Step::new(
                "Select Candidates",
                SELECT_CANDIDATES_MESSAGE,
                loaded_and(
                    |p: &MeetingPayload| p.candidates.candidates(),
                    at_least_one(|p: &MeetingPayload| p.candidates.selection()),
                ),
            ),
            Step::new("Generate Agenda", AGENDA_MESSAGE, move |p: &MeetingPayload| {
                agenda(p) && time(p)
            }),
            Step::review("Confirm & Send"),
        ]
    }

    fn pool(&self) -> &CandidatePool {
        &self.candidates
    }

    fn job_and_pool(&mut self) -> (&mut JobPicker, &mut CandidatePool) {
        (&mut self.job, &mut self.candidates)
    }

    async fn load_options(&mut self, store: &dyn RecordStore) {
        let jobs = store.list_jobs().await;
        self.job.set_jobs(jobs);
    }

    fn request_for(&self, target: &DispatchTarget) -> Result<MeetingRequest, AppError> {
        let candidate = target.candidate()?;
        let candidate_email = target.email()?.to_string();
        let job = self
            .job
            .selected()
            .as_ref()
            .ok_or_else(|| anyhow!("no job selected"))?;
        let meeting_time = self
            .meeting_time
            .ok_or_else(|| anyhow!("no meeting time set"))?;

        Ok(MeetingRequest {
            job_id: job.id.clone(),
            resume_id: candidate.id.clone(),
            candidate_email,
            candidate_name: candidate.candidate_name.clone(),
            meeting_time,
            meeting_type: self.meeting_type,
            agenda: self.agenda.trim().to_string(),
        })
    }

    async fn send(store: &dyn RecordStore, request: &MeetingRequest) -> Result<Receipt, StoreError> {
        store.send_meeting(request).await
    }
}

impl MeetingWizard {
    pub fn set_agenda(&mut self, agenda: impl Into<String>) {
        self.controller.payload_mut().agenda = agenda.into();
    }

    pub fn set_meeting_time(&mut self, meeting_time: DateTime<Utc>) {
        self.controller.payload_mut().meeting_time = Some(meeting_time);
    }

    pub fn set_meeting_type(&mut self, meeting_type: MeetingType) {
        self.controller.payload_mut().meeting_type = meeting_type;
    }

    /// Drafts an agenda for every selected candidate and replaces the agenda
    /// text with the drafts, in selection order. A candidate whose draft
    /// failed gets a placeholder section and a failure in the returned batch.
    pub async fn generate_agenda(
        &mut self,
        store: &dyn RecordStore,
    ) -> Result<DispatchBatch<DispatchTarget>, AppError> {
        if !self.controller.is_open() {
            return Err(TransitionError::NotOpen.into());
        }
        let payload = self.controller.payload();
        let meeting_type = payload.meeting_type;
        let targets = payload.candidates.targets();

        let settled = self
            .dispatcher
            .settle_all(targets, |target| async move {
                let request = AgendaRequest::for_candidate(target.candidate()?, meeting_type);
                let agenda = store.generate_agenda(&request).await?;
                if agenda.trim().is_empty() {
                    return Err(AppError::Internal(anyhow!("agenda service returned no text")));
                }
                Ok::<_, AppError>(agenda.trim().to_string())
            })
            .await;

        let mut sections = Vec::with_capacity(settled.len());
        let mut outcomes = Vec::with_capacity(settled.len());
        for (target, result) in settled {
            match result {
                Ok(agenda) => {
                    sections.push(agenda);
                    outcomes.push(DispatchOutcome::success(target, Receipt::default()));
                }
                Err(reason) => {
                    sections.push(fallback_agenda(&target, meeting_type));
                    outcomes.push(DispatchOutcome::failure(target, reason));
                }
            }
        }

        if !sections.is_empty() {
            self.controller.payload_mut().agenda = sections.join(AGENDA_SEPARATOR);
        }
        let batch = DispatchBatch::new(outcomes);
        info!(
            generated = batch.succeeded(),
            failed = batch.failed(),
            "Agenda drafts settled"
        );
        Ok(batch)
    }
}
