use tracing::debug;

use crate::session::StepPayload;
use crate::step::{AttendeeType, Step};

#[derive(Debug, Clone, PartialEq)]
pub enum StepEvent {
    Saved {
        step: Step,
        attendee_type: Option<AttendeeType>,
        session_id: Option<String>,
        data: StepPayload,
    },
    Load {
        step: Step,
        attendee_type: Option<AttendeeType>,
        session_id: Option<String>,
    },
}

impl StepEvent {
    pub fn step(&self) -> Step {
        match self {
            Self::Saved { step, .. } | Self::Load { step, .. } => *step,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(&StepEvent)>;

/// In-process bus that lets independent parts of the UI react to saved or
/// loaded steps. Delivery is synchronous and in subscription order.
#[derive(Default)]
pub struct StepSaveNotifier {
    listeners: Vec<(SubscriptionId, Listener)>,
    next_id: u64,
}

impl StepSaveNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(&StepEvent) + 'static,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(existing, _)| *existing != id);
        self.listeners.len() != before
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn emit_step_saved(
        &mut self,
        step: Step,
        attendee_type: Option<AttendeeType>,
        session_id: Option<&str>,
        data: StepPayload,
    ) -> bool {
        self.emit(StepEvent::Saved {
            step,
            attendee_type,
            session_id: session_id.map(str::to_string),
            data,
        })
    }

    pub fn emit_step_load(
        &mut self,
        step: Step,
        attendee_type: Option<AttendeeType>,
        session_id: Option<&str>,
    ) -> bool {
        self.emit(StepEvent::Load {
            step,
            attendee_type,
            session_id: session_id.map(str::to_string),
        })
    }

    fn emit(&mut self, event: StepEvent) -> bool {
        if self.listeners.is_empty() {
            debug!(step = %event.step(), "no listeners for step event");
            return false;
        }

        for (_, listener) in &mut self.listeners {
            listener(&event);
        }
        true
    }
}

impl std::fmt::Debug for StepSaveNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StepSaveNotifier")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
