//! AI-avatar interview wizard: Select Template → Select Job → Select
//! Candidates → Review & Send. Every selected candidate gets an interview
//! built from the same saved template.

use anyhow::anyhow;
use async_trait::async_trait;
use tracing::warn;

use super::modality::{Modality, ModalityWizard};
use super::{CandidatePool, DispatchTarget, JobPicker};
use super::{SELECT_CANDIDATES_MESSAGE, SELECT_JOB_MESSAGE};
use crate::dispatch::Receipt;
use crate::errors::AppError;
use crate::models::AiInterviewTemplate;
use crate::store::requests::AI_INTERVIEW_DURATION;
use crate::store::{AiInterviewRequest, RecordStore, StoreError};
use crate::wizard::steps::{at_least_one, loaded_and, value_selected};
use crate::wizard::{Loadable, Step};

pub const SELECT_TEMPLATE_MESSAGE: &str = "Please select a question template";

pub type AvatarWizard = ModalityWizard<AvatarPayload>;

#[derive(Debug, Clone, Default)]
pub struct AvatarPayload {
    pub templates: Loadable<Vec<AiInterviewTemplate>>,
    pub template: Option<AiInterviewTemplate>,
    pub job: JobPicker,
    pub candidates: CandidatePool,
}

impl AvatarPayload {
    pub fn set_templates(&mut self, result: Result<Vec<AiInterviewTemplate>, StoreError>) {
        if let Err(e) = &result {
            warn!(error = %e, "Failed to load AI interview templates");
        }
        self.templates = result.into();
    }

    /// Picks a loaded template by id. Returns false for unknown ids.
    pub fn select_template(&mut self, template_id: &str) -> bool {
        let Some(template) = self
            .templates
            .ready()
            .and_then(|list| list.iter().find(|t| t.id == template_id))
        else {
            return false;
        };
        self.template = Some(template.clone());
        true
    }
}

#[async_trait]
impl Modality for AvatarPayload {
    type Request = AiInterviewRequest;

    const NAME: &'static str = "ai_interview";
    const CANDIDATE_STEP: usize = 2;

    fn steps() -> Vec<Step<Self>> {
        vec![
            Step::new(
                "Select Template",
                SELECT_TEMPLATE_MESSAGE,
                value_selected(|p: &AvatarPayload| &p.template),
            ),
            Step::new(
                "Select Job",
                SELECT_JOB_MESSAGE,
                value_selected(|p: &AvatarPayload| p.job.selected()),
            ),
            Step::new(
                "Select Candidates",
                SELECT_CANDIDATES_MESSAGE,
                loaded_and(
                    |p: &AvatarPayload| p.candidates.candidates(),
                    at_least_one(|p: &AvatarPayload| p.candidates.selection()),
                ),
            ),
            Step::review("Review & Send"),
        ]
    }

    fn pool(&self) -> &CandidatePool {
        &self.candidates
    }

    fn job_and_pool(&mut self) -> (&mut JobPicker, &mut CandidatePool) {
        (&mut self.job, &mut self.candidates)
    }

    async fn load_options(&mut self, store: &dyn RecordStore) {
        let (templates, jobs) = tokio::join!(store.list_ai_templates(), store.list_jobs());
        self.set_templates(templates);
        self.job.set_jobs(jobs);
    }

    /// The interview is addressed by resume id; the remote looks up the email.
    fn request_for(&self, target: &DispatchTarget) -> Result<AiInterviewRequest, AppError> {
        let candidate = target.candidate()?;
        let job = self
            .job
            .selected()
            .as_ref()
            .ok_or_else(|| anyhow!("no job selected"))?;
        let template = self
            .template
            .as_ref()
            .ok_or_else(|| anyhow!("no template selected"))?;

        Ok(AiInterviewRequest {
            candidate_id: candidate.id.clone(),
            job_post_id: job.id.clone(),
            questions: template.questions.clone(),
            question_type: template.question_type.clone(),
            duration: AI_INTERVIEW_DURATION,
            template_id: template.id.clone(),
        })
    }

    async fn send(
        store: &dyn RecordStore,
        request: &AiInterviewRequest,
    ) -> Result<Receipt, StoreError> {
        store.send_ai_interview(request).await
    }
}

impl AvatarWizard {
    pub fn select_template(&mut self, template_id: &str) -> bool {
        self.controller.payload_mut().select_template(template_id)
    }
}
