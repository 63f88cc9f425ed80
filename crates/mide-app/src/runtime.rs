use anyhow::{Context, Result, anyhow};
use mide_core::remote::{PersistenceFailure, SaveResponse};
use mide_core::session::{FormSession, StepPayload, UpdateOrigin};
use mide_core::step::Step;
use tracing::warn;

use crate::App;

pub(crate) fn restore_session(app: &App<'_>) -> FormSession {
    match app.storage.load() {
        Ok(Some(snapshot)) => FormSession::from_snapshot(snapshot),
        Ok(None) => FormSession::new(),
        Err(error) => {
            warn!(%error, "stored session is unreadable, starting a new one");
            FormSession::new()
        }
    }
}

pub(crate) fn persist_session(app: &App<'_>, session: &FormSession) -> Result<()> {
    let updated_at = mide_core::time::now_utc_rfc3339()
        .map_err(|error| anyhow!("failed to format timestamp: {error}"))?;

    app.storage
        .save(&session.snapshot(Some(updated_at)))
        .context("failed to store session")
}

/// Sends one step to the remote service and folds the confirmed entity back
/// into the session. A rejected or failed call leaves the session untouched.
pub(crate) fn push_step(
    app: &App<'_>,
    session: &mut FormSession,
    step: Step,
) -> Result<SaveResponse, PersistenceFailure> {
    let payload = session.get_step_data(step);
    let result = app
        .remote
        .save(step, session.attendee_type(), session.session_id(), &payload);
    let response = PersistenceFailure::check(step, result)?;

    if let Some(id) = &response.id {
        session.set_session_id(id.clone());
    }
    if !response.data.is_empty() {
        session.update_step_data(step, response.data.clone(), UpdateOrigin::Remote);
    }

    Ok(response)
}

pub(crate) fn pull_step(
    app: &App<'_>,
    session: &mut FormSession,
    step: Step,
    session_id: &str,
) -> Result<StepPayload, PersistenceFailure> {
    let payload = app
        .remote
        .load(step, session_id)
        .map_err(|error| PersistenceFailure::new(step, format!("{error:#}")))?;

    session.update_step_data(step, payload.clone(), UpdateOrigin::Remote);
    Ok(payload)
}
