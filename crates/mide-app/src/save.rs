use anyhow::Result;
use mide_core::guard::ExitInterceptor;
use mide_core::navigation::Location;
use mide_core::session::StepPayload;
use mide_core::step::Step;
use tracing::{info, warn};

use crate::flow::{FlowError, FormFlow};
use crate::runtime;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveReceipt {
    pub step: Step,
    pub session_id: Option<String>,
    /// Whether any listener heard about the save.
    pub notified: bool,
}

impl<'a, L, I> FormFlow<'a, L, I>
where
    L: Location,
    I: ExitInterceptor,
{
    /// Persists one step through the remote service. Only that step stops
    /// counting as unsaved. Failures come back as a `PersistenceFailure`
    /// inside the error and leave the session as it was.
    pub fn save_step(&mut self, step: Step) -> Result<SaveReceipt> {
        if let Err(failure) = runtime::push_step(&self.app, &mut self.session, step) {
            warn!(%step, message = %failure.message, "step save failed");
            return Err(failure.into());
        }

        self.guard.mark_as_saved(&mut self.session, step);
        self.persist()?;

        let notified = self.notifier.emit_step_saved(
            step,
            self.session.attendee_type(),
            self.session.session_id(),
            self.session.get_step_data(step),
        );
        info!(%step, session_id = ?self.session.session_id(), "step saved");

        Ok(SaveReceipt {
            step,
            session_id: self.session.session_id().map(str::to_string),
            notified,
        })
    }

    pub fn save_current_step(&mut self) -> Result<SaveReceipt> {
        self.save_step(self.session.current_step())
    }

    /// Fetches a step previously saved under this session's id.
    pub fn load_step(&mut self, step: Step) -> Result<StepPayload> {
        let session_id = self
            .session
            .session_id()
            .map(str::to_string)
            .ok_or(FlowError::NothingToLoad { step })?;

        let payload = match runtime::pull_step(&self.app, &mut self.session, step, &session_id) {
            Ok(payload) => payload,
            Err(failure) => {
                warn!(%step, message = %failure.message, "step load failed");
                return Err(failure.into());
            }
        };

        self.persist()?;
        self.notifier.emit_step_load(
            step,
            self.session.attendee_type(),
            Some(session_id.as_str()),
        );
        Ok(payload)
    }
}
