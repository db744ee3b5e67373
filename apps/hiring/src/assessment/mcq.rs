//! MCQ test wizard: Select Questions → Select Job → Select Candidates →
//! Confirm & Send. One test invitation per selected candidate.

use anyhow::anyhow;
use async_trait::async_trait;
use tracing::warn;

use super::modality::{Modality, ModalityWizard};
use super::{CandidatePool, DispatchTarget, JobPicker};
use super::{SELECT_CANDIDATES_MESSAGE, SELECT_JOB_MESSAGE};
use crate::dispatch::Receipt;
use crate::errors::AppError;
use crate::models::McqQuestion;
use crate::selection::SelectionState;
use crate::store::requests::mcq_duration;
use crate::store::{McqTestRequest, RecordStore, StoreError};
use crate::wizard::steps::{at_least_one, loaded_and, value_selected};
use crate::wizard::{Loadable, Step};

pub const SELECT_QUESTIONS_MESSAGE: &str = "Please select at least one question";

pub type McqWizard = ModalityWizard<McqPayload>;

/// Saved questions and the multi-select over them.
#[derive(Debug, Clone, Default)]
pub struct QuestionBank {
    questions: Loadable<Vec<McqQuestion>>,
    selection: SelectionState<String>,
    search: String,
}

impl QuestionBank {
    pub fn questions(&self) -> &Loadable<Vec<McqQuestion>> {
        &self.questions
    }

    pub fn set_questions(&mut self, result: Result<Vec<McqQuestion>, StoreError>) {
        match &result {
            Ok(questions) => self
                .selection
                .set_universe(questions.iter().map(|q| q.id.clone())),
            Err(e) => warn!(error = %e, "Failed to load saved questions"),
        }
        self.questions = result.into();
    }

    pub fn selection(&self) -> &SelectionState<String> {
        &self.selection
    }

    pub fn set_search(&mut self, query: impl Into<String>) {
        self.search = query.into();
    }

    pub fn visible(&self) -> Vec<&McqQuestion> {
        self.questions
            .ready()
            .map(|list| list.iter().filter(|q| q.matches_search(&self.search)).collect())
            .unwrap_or_default()
    }

    pub fn toggle(&mut self, question_id: &str) -> bool {
        self.selection.toggle(question_id.to_string())
    }

    pub fn toggle_all_visible(&mut self) {
        let visible: Vec<String> = self.visible().into_iter().map(|q| q.id.clone()).collect();
        if self.selection.is_all_selected(&visible) {
            self.selection.clear();
        } else {
            self.selection.select_all(&visible);
        }
    }

    /// Sum of the selected questions' points.
    pub fn total_points(&self) -> u32 {
        self.questions
            .ready()
            .map(|list| {
                list.iter()
                    .filter(|q| self.selection.is_selected(&q.id))
                    .map(|q| q.points)
                    .sum()
            })
            .unwrap_or(0)
    }
}

#[derive(Debug, Clone, Default)]
pub struct McqPayload {
    pub questions: QuestionBank,
    pub job: JobPicker,
    pub candidates: CandidatePool,
}

#[async_trait]
impl Modality for McqPayload {
    type Request = McqTestRequest;

    const NAME: &'static str = "mcq";
    const CANDIDATE_STEP: usize = 2;

    fn steps() -> Vec<Step<Self>> {
        vec![
            Step::new(
                "Select Questions",
                SELECT_QUESTIONS_MESSAGE,
                loaded_and(
                    |p: &McqPayload| p.questions.questions(),
                    at_least_one(|p: &McqPayload| p.questions.selection()),
                ),
            ),
            Step::new(
                "Select Job",
                SELECT_JOB_MESSAGE,
                value_selected(|p: &McqPayload| p.job.selected()),
            ),
            Step::new(
                "Select Candidates",
                SELECT_CANDIDATES_MESSAGE,
                loaded_and(
                    |p: &McqPayload| p.candidates.candidates(),
                    at_least_one(|p: &McqPayload| p.candidates.selection()),
                ),
            ),
            Step::review("Confirm & Send"),
        ]
    }

    fn pool(&self) -> &CandidatePool {
        &self.candidates
    }

    fn job_and_pool(&mut self) -> (&mut JobPicker, &mut CandidatePool) {
        (&mut self.job, &mut self.candidates)
    }

    /// Saved questions and jobs, side by side.
    async fn load_options(&mut self, store: &dyn RecordStore) {
        let (questions, jobs) = tokio::join!(store.list_mcq_questions(), store.list_jobs());
        self.questions.set_questions(questions);
        self.job.set_jobs(jobs);
    }

    /// Invitation body for one candidate.
    fn request_for(&self, target: &DispatchTarget) -> Result<McqTestRequest, AppError> {
        let candidate = target.candidate()?;
        let candidate_email = target.email()?.to_string();
        let job = self
            .job
            .selected()
            .as_ref()
            .ok_or_else(|| anyhow!("no job selected"))?;
        let question_ids = self.questions.selection().to_vec();
        let count = question_ids.len();

        Ok(McqTestRequest {
            title: format!(
                "MCQ Assessment - {count} Questions - {}",
                candidate.candidate_name
            ),
            message: format!("MCQ Assessment for {} - {count} questions", job.job_title),
            duration: mcq_duration(count),
            question_ids,
            job_id: job.id.clone(),
            resume_id: candidate.id.clone(),
            candidate_email,
            candidate_name: candidate.candidate_name.clone(),
        })
    }

    async fn send(store: &dyn RecordStore, request: &McqTestRequest) -> Result<Receipt, StoreError> {
        store.send_mcq_test(request).await
    }
}
