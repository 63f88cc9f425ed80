use tracing::{debug, info};

use crate::session::FormSession;
use crate::step::Step;
use crate::validator::StepValidator;

pub const STEP_PARAM: &str = "step";

/// External representation of where the user is, such as a URL query.
pub trait Location {
    fn step_param(&self) -> Option<String>;
    fn set_step_param(&mut self, value: &str);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    Moved { from: Step, to: Step },
    Unchanged,
    Blocked(NavigationBlock),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationBlock {
    MissingPrerequisites { target: Step, missing: Vec<Step> },
    CurrentStepIncomplete { step: Step },
}

/// Keeps the session's active step and the external location in agreement.
///
/// Inbound changes are applied to the session without writing back;
/// outbound writes only happen when the location holds a different step.
#[derive(Debug)]
pub struct NavigationSynchronizer<L> {
    location: L,
    activated: bool,
}

impl<L: Location> NavigationSynchronizer<L> {
    pub fn new(location: L) -> Self {
        Self {
            location,
            activated: false,
        }
    }

    pub fn location(&self) -> &L {
        &self.location
    }

    pub fn location_mut(&mut self) -> &mut L {
        &mut self.location
    }

    pub fn into_location(self) -> L {
        self.location
    }

    pub fn is_activated(&self) -> bool {
        self.activated
    }

    /// First read of the location. Runs synchronously so a reload lands on
    /// the requested step before anything is shown.
    pub fn activate(&mut self, session: &mut FormSession) -> Option<Step> {
        self.activated = true;
        self.apply_location(session)
    }

    pub fn on_location_changed(&mut self, session: &mut FormSession) -> Option<Step> {
        self.apply_location(session)
    }

    /// Pushes the session's step to the location. Returns whether a write
    /// happened.
    pub fn sync_to_location(&mut self, session: &FormSession) -> bool {
        let current = session.current_step();
        if self.location_step() == Some(current) {
            return false;
        }

        self.location.set_step_param(&current.to_string());
        debug!(step = %current, "pushed step to location");
        true
    }

    /// Applies a UI-requested move after checking prerequisites, and the
    /// current step's completeness when moving forward.
    pub fn navigate(
        &mut self,
        session: &mut FormSession,
        target: Step,
        validator: &dyn StepValidator,
    ) -> Navigation {
        let from = session.current_step();
        if target == from {
            return Navigation::Unchanged;
        }

        if !session.can_go_to_step(target) {
            let missing = session.missing_prerequisites(target);
            info!(%target, ?missing, "navigation blocked by missing step data");
            return Navigation::Blocked(NavigationBlock::MissingPrerequisites { target, missing });
        }

        if target > from && !session.is_step_valid(from, validator) {
            info!(step = %from, %target, "navigation blocked by incomplete step");
            return Navigation::Blocked(NavigationBlock::CurrentStepIncomplete { step: from });
        }

        session.set_current_step(target.number());
        self.sync_to_location(session);
        Navigation::Moved { from, to: target }
    }

    fn location_step(&self) -> Option<Step> {
        self.location
            .step_param()
            .and_then(|raw| Step::parse_param(&raw))
    }

    fn apply_location(&mut self, session: &mut FormSession) -> Option<Step> {
        let raw = self.location.step_param();
        let Some(requested) = raw.as_deref().and_then(Step::parse_param) else {
            if let Some(raw) = raw {
                debug!(value = %raw, "ignoring malformed step parameter");
            }
            return None;
        };

        let target = if session.can_go_to_step(requested) {
            requested
        } else {
            let fallback = session.highest_reachable_step();
            info!(%requested, %fallback, "location step is not reachable yet");
            fallback
        };

        if target == session.current_step() {
            return None;
        }

        session.set_current_step(target.number());
        debug!(step = %target, "applied step from location");
        Some(target)
    }
}

/// A query string such as `?step=2&lang=es`, kept in memory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryLocation {
    params: Vec<(String, String)>,
}

impl QueryLocation {
    pub fn parse(raw: &str) -> Self {
        let params = raw
            .trim()
            .trim_start_matches('?')
            .split('&')
            .filter(|pair| !pair.is_empty())
            .map(|pair| match pair.split_once('=') {
                Some((key, value)) => (key.to_string(), value.to_string()),
                None => (pair.to_string(), String::new()),
            })
            .collect();
        Self { params }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.as_str())
    }

    pub fn set(&mut self, key: &str, value: &str) {
        match self.params.iter_mut().find(|(name, _)| name == key) {
            Some((_, existing)) => *existing = value.to_string(),
            None => self.params.push((key.to_string(), value.to_string())),
        }
    }

    pub fn to_query_string(&self) -> String {
        if self.params.is_empty() {
            return String::new();
        }

        let joined = self
            .params
            .iter()
            .map(|(key, value)| format!("{key}={value}"))
            .collect::<Vec<_>>()
            .join("&");
        format!("?{joined}")
    }
}

impl Location for QueryLocation {
    fn step_param(&self) -> Option<String> {
        self.get(STEP_PARAM).map(str::to_string)
    }

    fn set_step_param(&mut self, value: &str) {
        self.set(STEP_PARAM, value);
    }
}
