use anyhow::{Context, Result};
use mide_core::guard::{ExitInterceptor, GuardState, UnsavedChangesGuard};
use mide_core::navigation::{Location, Navigation, NavigationSynchronizer};
use mide_core::notifier::{StepEvent, StepSaveNotifier, SubscriptionId};
use mide_core::session::{FormSession, StepPayload, UpdateOrigin};
use mide_core::step::{AttendeeType, Step};
use thiserror::Error;
use tracing::info;

use crate::App;
use crate::runtime;

#[derive(Debug, Error)]
pub enum FlowError {
    #[error("no reservation has been saved yet, so step {step} cannot be loaded")]
    NothingToLoad { step: Step },
    #[error("cannot complete the reservation: incomplete steps {}", Step::join(.steps))]
    Incomplete { steps: Vec<Step> },
    #[error("cannot complete the reservation while edits are unsaved")]
    UnsavedChanges,
}

/// One user's journey through the reservation form.
///
/// The flow owns its session; hosts create one per journey and hand it the
/// location and exit hooks of their environment.
pub struct FormFlow<'a, L, I> {
    pub(crate) app: App<'a>,
    pub(crate) session: FormSession,
    pub(crate) navigation: NavigationSynchronizer<L>,
    pub(crate) guard: UnsavedChangesGuard,
    pub(crate) notifier: StepSaveNotifier,
    pub(crate) interceptor: I,
}

impl<'a> App<'a> {
    /// Rehydrates the stored session, applies the location's step and arms
    /// the back-navigation guard.
    pub fn open_flow<L, I>(&self, location: L, interceptor: I) -> Result<FormFlow<'a, L, I>>
    where
        L: Location,
        I: ExitInterceptor,
    {
        let mut session = runtime::restore_session(self);
        let mut navigation = NavigationSynchronizer::new(location);
        if navigation.activate(&mut session).is_some() {
            runtime::persist_session(self, &session)?;
        }

        let guard = UnsavedChangesGuard::new();
        let mut interceptor = interceptor;
        guard.mount(&mut interceptor);

        Ok(FormFlow {
            app: *self,
            session,
            navigation,
            guard,
            notifier: StepSaveNotifier::new(),
            interceptor,
        })
    }
}

impl<'a, L, I> FormFlow<'a, L, I>
where
    L: Location,
    I: ExitInterceptor,
{
    pub fn session(&self) -> &FormSession {
        &self.session
    }

    pub fn location(&self) -> &L {
        self.navigation.location()
    }

    pub fn location_mut(&mut self) -> &mut L {
        self.navigation.location_mut()
    }

    pub fn interceptor(&self) -> &I {
        &self.interceptor
    }

    pub fn guard_state(&self) -> GuardState {
        self.guard.state(&self.session)
    }

    pub fn is_step_valid(&self, step: Step) -> bool {
        self.session.is_step_valid(step, self.app.validator)
    }

    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(&StepEvent) + 'static,
    {
        self.notifier.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.notifier.unsubscribe(id)
    }

    pub fn select_attendee_type(&mut self, attendee_type: AttendeeType) -> Result<()> {
        self.session
            .set_attendee_type(attendee_type)
            .context("failed to select attendee type")?;
        self.persist()
    }

    pub fn edit_step(&mut self, step: Step, data: StepPayload) -> Result<()> {
        self.session
            .update_step_data(step, data, UpdateOrigin::LocalEdit);
        self.guard.mark_as_unsaved(&mut self.session, step);
        self.persist()
    }

    pub fn go_to_step(&mut self, target: Step) -> Result<Navigation> {
        let outcome = self
            .navigation
            .navigate(&mut self.session, target, self.app.validator);
        if matches!(outcome, Navigation::Moved { .. }) {
            self.persist()?;
        }
        Ok(outcome)
    }

    pub fn next_step(&mut self) -> Result<Navigation> {
        match self.session.current_step().next() {
            Some(next) => self.go_to_step(next),
            None => Ok(Navigation::Unchanged),
        }
    }

    pub fn previous_step(&mut self) -> Result<Navigation> {
        match self.session.current_step().previous() {
            Some(previous) => self.go_to_step(previous),
            None => Ok(Navigation::Unchanged),
        }
    }

    /// Reacts to the location changing underneath the flow, e.g. the back
    /// button. The location is never written back here.
    pub fn on_location_changed(&mut self) -> Result<Option<Step>> {
        let applied = self.navigation.on_location_changed(&mut self.session);
        if applied.is_some() {
            self.persist()?;
        }
        Ok(applied)
    }

    /// Finishes the journey: every step must be valid and saved.
    pub fn complete(&mut self) -> Result<Option<String>> {
        let incomplete = Step::all()
            .filter(|step| !self.is_step_valid(*step))
            .collect::<Vec<_>>();
        if !incomplete.is_empty() {
            return Err(FlowError::Incomplete { steps: incomplete }.into());
        }
        if self.session.has_unsaved_changes() {
            return Err(FlowError::UnsavedChanges.into());
        }

        let session_id = self.session.session_id().map(str::to_string);
        info!(session_id = ?session_id, "reservation completed");
        self.clear()?;
        Ok(session_id)
    }

    /// Throws the journey away without touching the remote service.
    pub fn reset(&mut self) -> Result<()> {
        info!("reservation flow reset");
        self.clear()
    }

    fn clear(&mut self) -> Result<()> {
        self.app
            .storage
            .clear()
            .context("failed to clear stored session")?;
        self.session.reset_form();
        self.navigation.sync_to_location(&self.session);
        Ok(())
    }

    pub(crate) fn persist(&self) -> Result<()> {
        runtime::persist_session(&self.app, &self.session)
    }
}
