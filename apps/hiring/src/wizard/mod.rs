//! Wizard controller: a linear multi-step flow that gates forward progress on
//! per-step validity and ends in one bulk action.
//!
//! Lifecycle:
//!   Closed --open--> Open(step 0) --next/previous--> Open(step i)
//!   Open(last) --begin_submit--> Submitting --settle--> Closed
//!   any --close--> Closed
//!
//! Every path back to `Closed` goes through `reset()`, so cancelling and
//! completing leave the same residual state. Predicates are injected per step
//! (see `steps`), never hard-coded per wizard.

pub mod steps;

use std::future::Future;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

pub use steps::Loadable;

type Predicate<P> = Box<dyn Fn(&P) -> bool + Send + Sync>;

/// One step of a wizard: a title for the step indicator, the message shown when
/// the user tries to advance too early, and the completion predicate.
pub struct Step<P> {
    title: String,
    message: String,
    is_complete: Predicate<P>,
}

impl<P> Step<P> {
    pub fn new(
        title: impl Into<String>,
        message: impl Into<String>,
        is_complete: impl Fn(&P) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            is_complete: Box::new(is_complete),
        }
    }

    /// A step that is always complete (review / confirm screens).
    pub fn review(title: impl Into<String>) -> Self {
        Self::new(title, "", |_| true)
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn is_complete(&self, payload: &P) -> bool {
        (self.is_complete)(payload)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardPhase {
    Closed,
    Open,
    Submitting,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    /// The active step's predicate does not hold. `reason` is user-facing.
    #[error("{reason}")]
    ValidationFailed { step_index: usize, reason: String },

    #[error("Wizard is not open")]
    NotOpen,

    #[error("Already on the last step")]
    AtLastStep,

    #[error("Submission is only possible from the last step")]
    NotOnLastStep,
}

/// Snapshot handed to the bulk action. `session` ties the eventual settle back
/// to the wizard session that started it.
#[derive(Debug, Clone)]
pub struct Submission<P> {
    pub session: Uuid,
    pub payload: P,
}

pub struct WizardController<P> {
    name: &'static str,
    steps: Vec<Step<P>>,
    current_step: usize,
    payload: P,
    phase: WizardPhase,
    session: Option<Uuid>,
}

impl<P: Default + Clone> WizardController<P> {
    /// Panics if `steps` is empty: a wizard without steps is a programming error.
    pub fn new(name: &'static str, steps: Vec<Step<P>>) -> Self {
        assert!(!steps.is_empty(), "wizard '{name}' needs at least one step");
        Self {
            name,
            steps,
            current_step: 0,
            payload: P::default(),
            phase: WizardPhase::Closed,
            session: None,
        }
    }

    /// Opens a fresh session on step 0. Reopening discards any previous state.
    pub fn open(&mut self) -> Uuid {
        self.reset();
        let session = Uuid::new_v4();
        self.session = Some(session);
        self.phase = WizardPhase::Open;
        info!(wizard = self.name, %session, "Wizard opened");
        session
    }

    /// Cancels (or finishes) the session. Operations already dispatched are not
    /// retracted; their settle is ignored.
    pub fn close(&mut self) {
        if self.phase != WizardPhase::Closed {
            info!(wizard = self.name, phase = ?self.phase, "Wizard closed");
        }
        self.reset();
        self.session = None;
        self.phase = WizardPhase::Closed;
    }

    /// Back to step 0 with the initial empty payload.
    pub fn reset(&mut self) {
        self.current_step = 0;
        self.payload = P::default();
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn phase(&self) -> WizardPhase {
        self.phase
    }

    pub fn is_open(&self) -> bool {
        self.phase == WizardPhase::Open
    }

    pub fn session(&self) -> Option<Uuid> {
        self.session
    }

    pub fn current_step(&self) -> usize {
        self.current_step
    }

    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    pub fn step_titles(&self) -> Vec<&str> {
        self.steps.iter().map(Step::title).collect()
    }

    pub fn is_last_step(&self) -> bool {
        self.current_step + 1 == self.steps.len()
    }

    pub fn payload(&self) -> &P {
        &self.payload
    }

    pub fn payload_mut(&mut self) -> &mut P {
        &mut self.payload
    }

    /// Drives the "Next" button's enabled state.
    pub fn can_proceed(&self) -> bool {
        self.is_open() && self.steps[self.current_step].is_complete(&self.payload)
    }

    /// Advances one step if the active step is complete. On failure the wizard
    /// stays where it is and the caller shows `reason` to the user.
    pub fn next(&mut self) -> Result<usize, TransitionError> {
        if !self.is_open() {
            return Err(TransitionError::NotOpen);
        }
        if self.is_last_step() {
            return Err(TransitionError::AtLastStep);
        }
        self.check_step(self.current_step)?;
        self.current_step += 1;
        debug!(wizard = self.name, step = self.current_step, "Wizard advanced");
        Ok(self.current_step)
    }

    /// Returns true if the wizard moved back.
    pub fn previous(&mut self) -> bool {
        if !self.is_open() || self.current_step == 0 {
            return false;
        }
        self.current_step -= 1;
        debug!(wizard = self.name, step = self.current_step, "Wizard went back");
        true
    }

    /// Checks every step, in order, against the current payload.
    pub fn validate_all(&self) -> Result<(), TransitionError> {
        (0..self.steps.len()).try_for_each(|index| self.check_step(index))
    }

    /// Starts the terminal action: all steps must hold and the wizard must be on
    /// its last step. Moves to `Submitting` and returns the payload snapshot.
    pub fn begin_submit(&mut self) -> Result<Submission<P>, TransitionError> {
        if !self.is_open() {
            return Err(TransitionError::NotOpen);
        }
        if !self.is_last_step() {
            return Err(TransitionError::NotOnLastStep);
        }
        self.validate_all()?;

        let session = self.session.ok_or(TransitionError::NotOpen)?;
        self.phase = WizardPhase::Submitting;
        info!(wizard = self.name, %session, "Wizard submitting");
        Ok(Submission {
            session,
            payload: self.payload.clone(),
        })
    }

    /// Called once the bulk action has settled. Closes the wizard if the
    /// settle belongs to the current session; returns false for stale settles
    /// (the wizard was closed or reopened meanwhile).
    pub fn settle(&mut self, session: Uuid) -> bool {
        if self.phase != WizardPhase::Submitting || self.session != Some(session) {
            debug!(wizard = self.name, %session, "Ignoring settle for a stale session");
            return false;
        }
        self.close();
        true
    }

    /// `begin_submit` → run `action` on the payload snapshot → `settle`.
    pub async fn submit<F, Fut, R>(&mut self, action: F) -> Result<R, TransitionError>
    where
        F: FnOnce(P) -> Fut,
        Fut: Future<Output = R>,
    {
        let submission = self.begin_submit()?;
        let result = action(submission.payload).await;
        self.settle(submission.session);
        Ok(result)
    }

    fn check_step(&self, index: usize) -> Result<(), TransitionError> {
        let step = &self.steps[index];
        if step.is_complete(&self.payload) {
            return Ok(());
        }
        warn!(
            wizard = self.name,
            step = index,
            title = step.title.as_str(),
            "Step validation failed"
        );
        Err(TransitionError::ValidationFailed {
            step_index: index,
            reason: step.message.clone(),
        })
    }
}
