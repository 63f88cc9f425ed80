use thiserror::Error;

use crate::session::StepPayload;
use crate::step::{AttendeeType, Step};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SaveResponse {
    pub success: bool,
    /// Reservation id assigned by the service.
    pub id: Option<String>,
    /// The full stored entity after the save.
    pub data: StepPayload,
    pub errors: Vec<String>,
    pub message: Option<String>,
}

impl SaveResponse {
    pub fn saved(id: impl Into<String>, data: StepPayload) -> Self {
        Self {
            success: true,
            id: Some(id.into()),
            data,
            errors: Vec::new(),
            message: None,
        }
    }

    pub fn rejected(message: impl Into<String>, errors: Vec<String>) -> Self {
        Self {
            success: false,
            id: None,
            data: StepPayload::new(),
            errors,
            message: Some(message.into()),
        }
    }
}

/// The reservation backend as seen by the form flow.
pub trait RemoteFormService {
    fn save(
        &self,
        step: Step,
        attendee_type: Option<AttendeeType>,
        session_id: Option<&str>,
        payload: &StepPayload,
    ) -> anyhow::Result<SaveResponse>;

    fn load(&self, step: Step, session_id: &str) -> anyhow::Result<StepPayload>;
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("failed to persist step {step}: {message}")]
pub struct PersistenceFailure {
    pub step: Step,
    pub message: String,
    pub errors: Vec<String>,
}

impl PersistenceFailure {
    pub fn new(step: Step, message: impl Into<String>) -> Self {
        Self {
            step,
            message: message.into(),
            errors: Vec::new(),
        }
    }

    /// Folds a call result into a confirmed response or a failure value.
    pub fn check(step: Step, result: anyhow::Result<SaveResponse>) -> Result<SaveResponse, Self> {
        let response = result.map_err(|error| Self::new(step, format!("{error:#}")))?;
        if response.success {
            return Ok(response);
        }

        let message = response
            .message
            .clone()
            .or_else(|| response.errors.first().cloned())
            .unwrap_or_else(|| "the service rejected the step".to_string());
        Err(Self {
            step,
            message,
            errors: response.errors,
        })
    }
}
