use crate::guard::{ExitInterceptor, ExitPathway};
use crate::navigation::Location;
use crate::session::StepPayload;
use crate::step::{AttendeeType, Step};
use crate::validator::StepValidator;

/// Location double that counts outbound writes.
#[derive(Debug, Default)]
pub struct RecordingLocation {
    value: Option<String>,
    writes: usize,
}

impl RecordingLocation {
    /// Changes the value the way a back button would, without counting it
    /// as a write from the flow.
    pub fn simulate_external(&mut self, value: &str) {
        self.value = Some(value.to_string());
    }

    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl Location for RecordingLocation {
    fn step_param(&self) -> Option<String> {
        self.value.clone()
    }

    fn set_step_param(&mut self, value: &str) {
        self.writes += 1;
        self.value = Some(value.to_string());
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InterceptorCall {
    PreventClose,
    ArmBackGuard,
    RestoreLocation(Step),
    Proceed(ExitPathway),
}

#[derive(Debug, Default)]
pub struct RecordingInterceptor {
    pub calls: Vec<InterceptorCall>,
}

impl ExitInterceptor for RecordingInterceptor {
    fn prevent_close(&mut self) {
        self.calls.push(InterceptorCall::PreventClose);
    }

    fn arm_back_guard(&mut self) {
        self.calls.push(InterceptorCall::ArmBackGuard);
    }

    fn restore_location(&mut self, step: Step) {
        self.calls.push(InterceptorCall::RestoreLocation(step));
    }

    fn proceed(&mut self, pathway: ExitPathway) {
        self.calls.push(InterceptorCall::Proceed(pathway));
    }
}

pub struct RejectAll;

impl StepValidator for RejectAll {
    fn is_complete(
        &self,
        _attendee_type: Option<AttendeeType>,
        _step: Step,
        _data: &StepPayload,
    ) -> bool {
        false
    }
}
