use thiserror::Error;
use tracing::{info, warn};

use crate::remote::PersistenceFailure;
use crate::session::FormSession;
use crate::step::Step;
use crate::storage::{SessionStorage, StorageError};

/// How the user is trying to leave the flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitPathway {
    /// Closing the tab or window. Only the host's native confirmation can be
    /// shown here.
    TabClose,
    BackNavigation,
    LeaveFlow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitResolution {
    Continue,
    Save,
    Discard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardState {
    Clean,
    Dirty,
    ConfirmPending { pathway: ExitPathway },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitAttempt {
    /// Nothing to lose; the exit went ahead.
    Allowed,
    /// The host was asked to block the close with its native prompt.
    NativePrompt,
    /// The exit is on hold until `resolve` is called.
    Intercepted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitOutcome {
    Stayed,
    Saved,
    Discarded,
}

/// Hooks the host environment registers so the guard can steer exits.
pub trait ExitInterceptor {
    fn prevent_close(&mut self);
    /// Pushes a synthetic history entry so the next back press is seen.
    fn arm_back_guard(&mut self);
    fn restore_location(&mut self, step: Step);
    fn proceed(&mut self, pathway: ExitPathway);
}

#[derive(Debug, Error)]
pub enum GuardError {
    #[error("no exit is waiting for confirmation")]
    NoPendingExit,
    #[error(transparent)]
    Persistence(#[from] PersistenceFailure),
    #[error("failed to clear stored session: {0}")]
    Storage(#[from] StorageError),
}

/// Tracks whether the session holds edits the service has not confirmed and
/// holds exits until the user picks continue, save or discard.
#[derive(Debug, Default)]
pub struct UnsavedChangesGuard {
    pending: Option<ExitPathway>,
}

impl UnsavedChangesGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self, session: &FormSession) -> GuardState {
        match self.pending {
            Some(pathway) => GuardState::ConfirmPending { pathway },
            None if session.has_unsaved_changes() => GuardState::Dirty,
            None => GuardState::Clean,
        }
    }

    pub fn mount(&self, interceptor: &mut dyn ExitInterceptor) {
        interceptor.arm_back_guard();
    }

    pub fn mark_as_unsaved(&self, session: &mut FormSession, step: Step) {
        session.mark_step_unsaved(step);
    }

    /// Clears one step once the remote service has confirmed it.
    pub fn mark_as_saved(&self, session: &mut FormSession, step: Step) {
        session.mark_step_saved(step);
    }

    pub fn request_exit(
        &mut self,
        session: &FormSession,
        pathway: ExitPathway,
        interceptor: &mut dyn ExitInterceptor,
    ) -> ExitAttempt {
        if !(session.is_form_started() && session.has_unsaved_changes()) {
            interceptor.proceed(pathway);
            return ExitAttempt::Allowed;
        }

        if pathway == ExitPathway::TabClose {
            interceptor.prevent_close();
            info!("blocked tab close with unsaved changes");
            return ExitAttempt::NativePrompt;
        }

        info!(?pathway, "exit held for confirmation");
        self.pending = Some(pathway);
        ExitAttempt::Intercepted
    }

    /// Settles a held exit. `Save` hands each unsaved step to `save` in
    /// order and stops at the first failure; steps already sent stay saved.
    pub fn resolve<F>(
        &mut self,
        resolution: ExitResolution,
        session: &mut FormSession,
        storage: &dyn SessionStorage,
        interceptor: &mut dyn ExitInterceptor,
        mut save: F,
    ) -> Result<ExitOutcome, GuardError>
    where
        F: FnMut(&mut FormSession, Step) -> Result<(), PersistenceFailure>,
    {
        let pathway = self.pending.take().ok_or(GuardError::NoPendingExit)?;

        match resolution {
            ExitResolution::Continue => {
                Self::stay(session, pathway, interceptor);
                Ok(ExitOutcome::Stayed)
            }
            ExitResolution::Save => {
                for step in session.unsaved_steps() {
                    if let Err(failure) = save(session, step) {
                        warn!(step = %failure.step, message = %failure.message, "save before exit failed");
                        Self::stay(session, pathway, interceptor);
                        return Err(failure.into());
                    }
                    session.mark_step_saved(step);
                }
                interceptor.proceed(pathway);
                Ok(ExitOutcome::Saved)
            }
            ExitResolution::Discard => {
                if let Err(error) = storage.clear() {
                    self.pending = Some(pathway);
                    return Err(error.into());
                }
                session.reset_form();
                interceptor.proceed(pathway);
                Ok(ExitOutcome::Discarded)
            }
        }
    }

    fn stay(session: &FormSession, pathway: ExitPathway, interceptor: &mut dyn ExitInterceptor) {
        if pathway == ExitPathway::BackNavigation {
            interceptor.restore_location(session.current_step());
            interceptor.arm_back_guard();
        }
    }
}
