use anyhow::Result;
use mide_core::guard::{
    ExitAttempt, ExitInterceptor, ExitOutcome, ExitPathway, ExitResolution, GuardError,
};
use mide_core::navigation::Location;

use crate::flow::FormFlow;
use crate::runtime;

impl<'a, L, I> FormFlow<'a, L, I>
where
    L: Location,
    I: ExitInterceptor,
{
    pub fn request_exit(&mut self, pathway: ExitPathway) -> ExitAttempt {
        self.guard
            .request_exit(&self.session, pathway, &mut self.interceptor)
    }

    /// Settles an intercepted exit. `Save` pushes every unsaved step; if the
    /// service refuses one, the exit stays blocked and the error is returned.
    pub fn resolve_exit(&mut self, resolution: ExitResolution) -> Result<ExitOutcome> {
        let app = self.app;
        let notifier = &mut self.notifier;
        let result = self.guard.resolve(
            resolution,
            &mut self.session,
            app.storage,
            &mut self.interceptor,
            |session, step| {
                runtime::push_step(&app, session, step)?;
                notifier.emit_step_saved(
                    step,
                    session.attendee_type(),
                    session.session_id(),
                    session.get_step_data(step),
                );
                Ok(())
            },
        );

        let outcome = match result {
            Ok(outcome) => outcome,
            Err(error) => {
                // Steps sent before the failure are confirmed; keep that.
                if matches!(error, GuardError::Persistence(_)) {
                    self.persist()?;
                }
                return Err(error.into());
            }
        };

        match outcome {
            ExitOutcome::Saved => self.persist()?,
            ExitOutcome::Discarded => {
                self.navigation.sync_to_location(&self.session);
            }
            ExitOutcome::Stayed => {}
        }

        Ok(outcome)
    }
}
