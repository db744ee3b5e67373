//! The wizard flow every modality shares: open with its option lists, pick a
//! job, load that job's candidates on entering the candidate step, then send
//! one request per selected candidate through the bulk dispatcher.
//!
//! A modality only describes its payload: the steps, what it loads on open,
//! how to build one candidate's request and which store call sends it.

use async_trait::async_trait;
use tracing::info;
use uuid::Uuid;

use super::{switch_job, CandidatePool, DispatchTarget, JobPicker};
use crate::dispatch::{BulkDispatcher, DispatchBatch, Receipt};
use crate::errors::AppError;
use crate::store::{RecordStore, StoreError};
use crate::wizard::{Step, TransitionError, WizardController};

#[async_trait]
pub trait Modality: Default + Clone + Send + Sync + 'static {
    type Request: Send + Sync;

    /// Wizard and dispatcher label, also used in logs.
    const NAME: &'static str;
    /// Entering this step fetches the selected job's candidates.
    const CANDIDATE_STEP: usize;

    fn steps() -> Vec<Step<Self>>;

    fn pool(&self) -> &CandidatePool;

    fn job_and_pool(&mut self) -> (&mut JobPicker, &mut CandidatePool);

    /// Loads the lists the first steps choose from.
    async fn load_options(&mut self, store: &dyn RecordStore);

    /// Request body for one candidate. An error fails that candidate only.
    fn request_for(&self, target: &DispatchTarget) -> Result<Self::Request, AppError>;

    async fn send(store: &dyn RecordStore, request: &Self::Request) -> Result<Receipt, StoreError>;
}

pub struct ModalityWizard<P: Modality> {
    pub(super) controller: WizardController<P>,
    pub(super) dispatcher: BulkDispatcher,
}

impl<P: Modality> Default for ModalityWizard<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: Modality> ModalityWizard<P> {
    pub fn new() -> Self {
        Self {
            controller: WizardController::new(P::NAME, P::steps()),
            dispatcher: BulkDispatcher::new(P::NAME),
        }
    }

    pub fn controller(&self) -> &WizardController<P> {
        &self.controller
    }

    pub fn payload(&self) -> &P {
        self.controller.payload()
    }

    pub fn payload_mut(&mut self) -> &mut P {
        self.controller.payload_mut()
    }

    /// Opens a fresh session and loads the modality's option lists.
    pub async fn open(&mut self, store: &dyn RecordStore) -> Uuid {
        let session = self.controller.open();
        self.controller.payload_mut().load_options(store).await;
        session
    }

    pub fn close(&mut self) {
        self.controller.close();
    }

    pub fn select_job(&mut self, job_id: &str) -> bool {
        let (job, pool) = self.controller.payload_mut().job_and_pool();
        switch_job(job, pool, job_id)
    }

    /// Advances; entering the candidate step fetches the selected job's
    /// candidates.
    pub async fn next(&mut self, store: &dyn RecordStore) -> Result<usize, TransitionError> {
        let step = self.controller.next()?;
        if step == P::CANDIDATE_STEP {
            let (job, pool) = self.controller.payload_mut().job_and_pool();
            if let Some(job_id) = job.selected_id().map(str::to_string) {
                pool.load(store, &job_id).await;
            }
        }
        Ok(step)
    }

    pub fn previous(&mut self) -> bool {
        self.controller.previous()
    }

    /// Sends to every selected candidate and closes the wizard once all sends
    /// have settled, whatever their outcome.
    pub async fn send(
        &mut self,
        store: &dyn RecordStore,
    ) -> Result<DispatchBatch<DispatchTarget>, AppError> {
        let dispatcher = &self.dispatcher;
        let batch = self
            .controller
            .submit(|payload: P| async move {
                let targets = payload.pool().targets();
                dispatcher
                    .dispatch(targets, |target| {
                        let request = payload.request_for(&target);
                        async move {
                            match request {
                                Ok(request) => P::send(store, &request).await.map_err(AppError::from),
                                Err(e) => Err(e),
                            }
                        }
                    })
                    .await
            })
            .await?;

        info!(
            modality = P::NAME,
            sent = batch.succeeded(),
            failed = batch.failed(),
            "Invitations settled"
        );
        Ok(batch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assessment::testing::{candidate, job, FakeStore};
    use crate::assessment::{SELECT_CANDIDATES_MESSAGE, SELECT_JOB_MESSAGE};
    use crate::wizard::steps::{at_least_one, loaded_and, value_selected};

    /// Smallest possible modality: job, candidates, confirm. The request is
    /// the resume id and sending it always succeeds.
    #[derive(Debug, Clone, Default)]
    struct Ping {
        job: JobPicker,
        candidates: CandidatePool,
    }

    #[async_trait]
    impl Modality for Ping {
        type Request = String;
        const NAME: &'static str = "ping";
        const CANDIDATE_STEP: usize = 1;

        fn steps() -> Vec<Step<Self>> {
            vec![
                Step::new("Select Job", SELECT_JOB_MESSAGE, value_selected(|p: &Ping| p.job.selected())),
                Step::new(
                    "Select Candidates",
                    SELECT_CANDIDATES_MESSAGE,
                    loaded_and(
                        |p: &Ping| p.candidates.candidates(),
                        at_least_one(|p: &Ping| p.candidates.selection()),
                    ),
                ),
                Step::review("Confirm"),
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

        fn request_for(&self, target: &DispatchTarget) -> Result<String, AppError> {
            Ok(target.candidate()?.id.clone())
        }

        async fn send(_store: &dyn RecordStore, request: &String) -> Result<Receipt, StoreError> {
            Ok(Receipt::record(format!("ping_{request}")))
        }
    }

    fn store() -> FakeStore {
        let mut store = FakeStore {
            jobs: vec![job("job_1", "Backend Engineer"), job("job_2", "Designer")],
            ..FakeStore::default()
        };
        store.candidates.insert(
            "job_1".to_string(),
            vec![candidate("res_1", "Ada"), candidate("res_2", "Bob")],
        );
        store
    }

    #[tokio::test]
    async fn test_candidate_step_loads_once_per_job() {
        let store = store();
        let mut wizard = ModalityWizard::<Ping>::new();
        wizard.open(&store).await;
        assert!(!wizard.select_job("job_missing"));
        assert!(wizard.select_job("job_1"));
        assert_eq!(wizard.next(&store).await, Ok(1));
        wizard.previous();
        assert!(wizard.select_job("job_1"));
        wizard.next(&store).await.unwrap();
        assert_eq!(*store.candidate_fetches.lock().unwrap(), vec!["job_1".to_string()]);
        assert_eq!(wizard.payload().pool().visible().len(), 2);
    }

    #[tokio::test]
    async fn test_send_uses_the_modality_request_and_call() {
        let store = store();
        let mut wizard = ModalityWizard::<Ping>::default();
        wizard.open(&store).await;
        wizard.select_job("job_1");
        wizard.next(&store).await.unwrap();
        wizard.payload_mut().candidates.toggle("res_2");
        wizard.next(&store).await.unwrap();

        let batch = wizard.send(&store).await.unwrap();
        assert_eq!(batch.outcomes()[0].record_id.as_deref(), Some("ping_res_2"));
        assert_eq!(wizard.controller().name(), "ping");
        assert!(!wizard.controller().is_open());
    }
}
