use std::collections::BTreeMap;

use crate::config::ValidationRule;
use crate::session::StepPayload;
use crate::step::{AttendeeType, Step};

/// Decides whether a step's data is complete enough to move past it.
pub trait StepValidator {
    fn is_complete(
        &self,
        attendee_type: Option<AttendeeType>,
        step: Step,
        data: &StepPayload,
    ) -> bool;
}

/// Treats any stored payload as complete.
#[derive(Debug, Default, Clone, Copy)]
pub struct AcceptAll;

impl StepValidator for AcceptAll {
    fn is_complete(
        &self,
        _attendee_type: Option<AttendeeType>,
        _step: Step,
        _data: &StepPayload,
    ) -> bool {
        true
    }
}

/// Requires configured fields to be present and non-blank per step,
/// optionally narrowed to one attendee type.
#[derive(Debug, Default, Clone)]
pub struct RequiredFieldsValidator {
    rules: BTreeMap<Step, Vec<RuleFields>>,
}

#[derive(Debug, Clone)]
struct RuleFields {
    attendee_type: Option<AttendeeType>,
    required: Vec<String>,
}

impl RequiredFieldsValidator {
    pub fn from_rules(rules: &[ValidationRule]) -> Self {
        let mut grouped = BTreeMap::<Step, Vec<RuleFields>>::new();
        for rule in rules {
            grouped.entry(rule.step).or_default().push(RuleFields {
                attendee_type: rule.attendee_type,
                required: rule.required.clone(),
            });
        }
        Self { rules: grouped }
    }

    pub fn missing_fields(
        &self,
        attendee_type: Option<AttendeeType>,
        step: Step,
        data: &StepPayload,
    ) -> Vec<String> {
        let Some(rules) = self.rules.get(&step) else {
            return Vec::new();
        };

        rules
            .iter()
            .filter(|rule| rule.attendee_type.is_none() || rule.attendee_type == attendee_type)
            .flat_map(|rule| rule.required.iter())
            .filter(|field| !has_value(data, field))
            .cloned()
            .collect()
    }
}

impl StepValidator for RequiredFieldsValidator {
    fn is_complete(
        &self,
        attendee_type: Option<AttendeeType>,
        step: Step,
        data: &StepPayload,
    ) -> bool {
        self.missing_fields(attendee_type, step, data).is_empty()
    }
}

fn has_value(data: &StepPayload, field: &str) -> bool {
    match data.get(field) {
        None | Some(serde_json::Value::Null) => false,
        Some(serde_json::Value::String(value)) => !value.trim().is_empty(),
        Some(serde_json::Value::Array(values)) => !values.is_empty(),
        Some(_) => true,
    }
}
