use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::step::{AttendeeType, Step};
use crate::validator::StepValidator;

/// Opaque structured data entered for one step.
pub type StepPayload = serde_json::Map<String, serde_json::Value>;

/// Where a step data update came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOrigin {
    /// The user edited the form locally.
    LocalEdit,
    /// The payload was confirmed or fetched by the remote service.
    Remote,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("attendee type is already set to '{current}' and cannot change to '{requested}'")]
    AttendeeTypeLocked {
        current: AttendeeType,
        requested: AttendeeType,
    },
}

/// Persisted shape of a session, written to the session storage slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    #[serde(default)]
    pub attendee_type: Option<AttendeeType>,
    pub current_step: Step,
    #[serde(default)]
    pub step_data: BTreeMap<Step, StepPayload>,
    #[serde(default)]
    pub session_id: Option<String>,
    /// Steps holding local edits the remote service has not confirmed.
    #[serde(default)]
    pub unsaved_steps: BTreeSet<Step>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// One reservation in progress: the attendee type, the active step and the
/// payload stored for each step.
#[derive(Debug, Clone, PartialEq)]
pub struct FormSession {
    attendee_type: Option<AttendeeType>,
    current_step: Step,
    step_data: BTreeMap<Step, StepPayload>,
    form_started: bool,
    unsaved_steps: BTreeSet<Step>,
    session_id: Option<String>,
}

impl Default for FormSession {
    fn default() -> Self {
        Self {
            attendee_type: None,
            current_step: Step::FIRST,
            step_data: BTreeMap::new(),
            form_started: false,
            unsaved_steps: BTreeSet::new(),
            session_id: None,
        }
    }
}

impl FormSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a session after a reload. The session counts as started
    /// whenever it carries any state at all.
    pub fn from_snapshot(snapshot: SessionSnapshot) -> Self {
        let form_started = snapshot.attendee_type.is_some()
            || !snapshot.step_data.is_empty()
            || !snapshot.unsaved_steps.is_empty();
        Self {
            attendee_type: snapshot.attendee_type,
            current_step: snapshot.current_step,
            step_data: snapshot.step_data,
            form_started,
            unsaved_steps: snapshot.unsaved_steps,
            session_id: snapshot.session_id,
        }
    }

    pub fn snapshot(&self, updated_at: Option<String>) -> SessionSnapshot {
        SessionSnapshot {
            attendee_type: self.attendee_type,
            current_step: self.current_step,
            step_data: self.step_data.clone(),
            session_id: self.session_id.clone(),
            unsaved_steps: self.unsaved_steps.clone(),
            updated_at,
        }
    }

    pub fn attendee_type(&self) -> Option<AttendeeType> {
        self.attendee_type
    }

    pub fn current_step(&self) -> Step {
        self.current_step
    }

    pub fn is_form_started(&self) -> bool {
        self.form_started
    }

    pub fn has_unsaved_changes(&self) -> bool {
        !self.unsaved_steps.is_empty()
    }

    pub fn unsaved_steps(&self) -> Vec<Step> {
        self.unsaved_steps.iter().copied().collect()
    }

    pub fn is_step_unsaved(&self, step: Step) -> bool {
        self.unsaved_steps.contains(&step)
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    pub fn set_session_id(&mut self, id: impl Into<String>) {
        self.session_id = Some(id.into());
    }

    pub fn set_attendee_type(&mut self, attendee_type: AttendeeType) -> Result<(), SessionError> {
        match self.attendee_type {
            Some(current) if current != attendee_type => {
                return Err(SessionError::AttendeeTypeLocked {
                    current,
                    requested: attendee_type,
                });
            }
            _ => {}
        }

        self.attendee_type = Some(attendee_type);
        self.form_started = true;
        Ok(())
    }

    /// Sets the active step without checking prerequisites. Returns `false`
    /// and leaves the session untouched when `number` is out of range.
    pub fn set_current_step(&mut self, number: u8) -> bool {
        let Some(step) = Step::new(number) else {
            return false;
        };
        self.current_step = step;
        true
    }

    pub fn update_step_data(&mut self, step: Step, data: StepPayload, origin: UpdateOrigin) {
        let entry = self.step_data.entry(step).or_default();
        for (key, value) in data {
            entry.insert(key, value);
        }

        self.form_started = true;
        if origin == UpdateOrigin::LocalEdit {
            self.unsaved_steps.insert(step);
        }
    }

    pub fn get_step_data(&self, step: Step) -> StepPayload {
        self.step_data.get(&step).cloned().unwrap_or_default()
    }

    pub fn has_step_data(&self, step: Step) -> bool {
        self.step_data
            .get(&step)
            .is_some_and(|payload| !payload.is_empty())
    }

    pub fn can_go_to_step(&self, step: Step) -> bool {
        step == Step::FIRST || self.missing_prerequisites(step).is_empty()
    }

    pub fn missing_prerequisites(&self, step: Step) -> Vec<Step> {
        step.prerequisites()
            .filter(|prerequisite| !self.has_step_data(*prerequisite))
            .collect()
    }

    /// The furthest step whose prerequisites are all filled in.
    pub fn highest_reachable_step(&self) -> Step {
        Step::all()
            .take_while(|step| self.can_go_to_step(*step))
            .last()
            .unwrap_or(Step::FIRST)
    }

    pub fn is_step_valid(&self, step: Step, validator: &dyn StepValidator) -> bool {
        match self.step_data.get(&step) {
            Some(payload) if !payload.is_empty() => {
                validator.is_complete(self.attendee_type, step, payload)
            }
            _ => false,
        }
    }

    pub fn completed_steps(&self) -> Vec<Step> {
        Step::all().filter(|step| self.has_step_data(*step)).collect()
    }

    pub fn highest_completed_step(&self) -> Option<Step> {
        self.completed_steps().into_iter().max()
    }

    pub fn go_to_next_step(&mut self) -> bool {
        match self.current_step.next() {
            Some(next) => self.set_current_step(next.number()),
            None => false,
        }
    }

    pub fn go_to_previous_step(&mut self) -> bool {
        match self.current_step.previous() {
            Some(previous) => self.set_current_step(previous.number()),
            None => false,
        }
    }

    pub(crate) fn mark_step_unsaved(&mut self, step: Step) {
        self.unsaved_steps.insert(step);
    }

    pub(crate) fn mark_step_saved(&mut self, step: Step) {
        self.unsaved_steps.remove(&step);
    }

    pub fn reset_form(&mut self) {
        *self = Self::default();
    }
}
