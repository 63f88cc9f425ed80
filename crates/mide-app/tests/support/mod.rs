use std::collections::VecDeque;
use std::sync::Mutex;

use anyhow::anyhow;
use mide_core::guard::{ExitInterceptor, ExitPathway};
use mide_core::navigation::Location;
use mide_core::remote::{RemoteFormService, SaveResponse};
use mide_core::session::StepPayload;
use mide_core::step::{AttendeeType, Step};

pub fn payload(value: serde_json::Value) -> StepPayload {
    value.as_object().cloned().expect("object payload")
}

#[derive(Debug, Clone, PartialEq)]
pub enum RemoteCall {
    Save {
        step: Step,
        attendee_type: Option<AttendeeType>,
        session_id: Option<String>,
        payload: StepPayload,
    },
    Load {
        step: Step,
        session_id: String,
    },
}

#[derive(Default)]
pub struct ScriptedRemote {
    saves: Mutex<VecDeque<anyhow::Result<SaveResponse>>>,
    loads: Mutex<VecDeque<anyhow::Result<StepPayload>>>,
    calls: Mutex<Vec<RemoteCall>>,
}

impl ScriptedRemote {
    pub fn new(
        saves: Vec<anyhow::Result<SaveResponse>>,
        loads: Vec<anyhow::Result<StepPayload>>,
    ) -> Self {
        Self {
            saves: Mutex::new(saves.into()),
            loads: Mutex::new(loads.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<RemoteCall> {
        self.calls.lock().expect("calls lock").clone()
    }
}

impl RemoteFormService for ScriptedRemote {
    fn save(
        &self,
        step: Step,
        attendee_type: Option<AttendeeType>,
        session_id: Option<&str>,
        payload: &StepPayload,
    ) -> anyhow::Result<SaveResponse> {
        self.calls.lock().expect("calls lock").push(RemoteCall::Save {
            step,
            attendee_type,
            session_id: session_id.map(str::to_string),
            payload: payload.clone(),
        });

        self.saves
            .lock()
            .expect("saves lock")
            .pop_front()
            .unwrap_or_else(|| Err(anyhow!("missing scripted save")))
    }

    fn load(&self, step: Step, session_id: &str) -> anyhow::Result<StepPayload> {
        self.calls.lock().expect("calls lock").push(RemoteCall::Load {
            step,
            session_id: session_id.to_string(),
        });

        self.loads
            .lock()
            .expect("loads lock")
            .pop_front()
            .unwrap_or_else(|| Err(anyhow!("missing scripted load")))
    }
}

#[derive(Debug, Default)]
pub struct CountingLocation {
    value: Option<String>,
    pub writes: usize,
}

impl CountingLocation {
    pub fn at(value: &str) -> Self {
        Self {
            value: Some(value.to_string()),
            writes: 0,
        }
    }

    pub fn press_back_to(&mut self, value: &str) {
        self.value = Some(value.to_string());
    }
}

impl Location for CountingLocation {
    fn step_param(&self) -> Option<String> {
        self.value.clone()
    }

    fn set_step_param(&mut self, value: &str) {
        self.writes += 1;
        self.value = Some(value.to_string());
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostCall {
    PreventClose,
    ArmBackGuard,
    RestoreLocation(Step),
    Proceed(ExitPathway),
}

#[derive(Debug, Default)]
pub struct RecordingHost {
    pub calls: Vec<HostCall>,
}

impl ExitInterceptor for RecordingHost {
    fn prevent_close(&mut self) {
        self.calls.push(HostCall::PreventClose);
    }

    fn arm_back_guard(&mut self) {
        self.calls.push(HostCall::ArmBackGuard);
    }

    fn restore_location(&mut self, step: Step) {
        self.calls.push(HostCall::RestoreLocation(step));
    }

    fn proceed(&mut self, pathway: ExitPathway) {
        self.calls.push(HostCall::Proceed(pathway));
    }
}
