use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One of the three sequential stages of the reservation form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Step(u8);

impl Step {
    pub const FIRST: Step = Step(1);
    pub const SECOND: Step = Step(2);
    pub const LAST: Step = Step(3);

    pub fn new(number: u8) -> Option<Self> {
        (Self::FIRST.0..=Self::LAST.0)
            .contains(&number)
            .then_some(Self(number))
    }

    /// Reads a step out of a location parameter. Anything that is not an
    /// integer in range yields `None`.
    pub fn parse_param(raw: &str) -> Option<Self> {
        raw.trim().parse::<u8>().ok().and_then(Self::new)
    }

    pub fn number(self) -> u8 {
        self.0
    }

    pub fn next(self) -> Option<Self> {
        Self::new(self.0 + 1)
    }

    pub fn previous(self) -> Option<Self> {
        self.0.checked_sub(1).and_then(Self::new)
    }

    /// Steps strictly before this one.
    pub fn prerequisites(self) -> impl Iterator<Item = Step> {
        (Self::FIRST.0..self.0).map(Step)
    }

    pub fn all() -> impl Iterator<Item = Step> {
        (Self::FIRST.0..=Self::LAST.0).map(Step)
    }

    /// Comma-separated step numbers, e.g. `1, 3`.
    pub fn join(steps: &[Step]) -> String {
        steps
            .iter()
            .map(Step::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("step must be between 1 and 3, got {0}")]
pub struct StepOutOfRange(pub u8);

impl TryFrom<u8> for Step {
    type Error = StepOutOfRange;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value).ok_or(StepOutOfRange(value))
    }
}

impl From<Step> for u8 {
    fn from(step: Step) -> Self {
        step.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttendeeType {
    General,
    School,
    Company,
    SummerCourse,
}

impl AttendeeType {
    pub const ALL: [AttendeeType; 4] = [
        AttendeeType::General,
        AttendeeType::School,
        AttendeeType::Company,
        AttendeeType::SummerCourse,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::General => "general",
            Self::School => "school",
            Self::Company => "company",
            Self::SummerCourse => "summer_course",
        }
    }
}

impl fmt::Display for AttendeeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown attendee type '{0}' (expected general, school, company or summer_course)")]
pub struct UnknownAttendeeType(pub String);

impl FromStr for AttendeeType {
    type Err = UnknownAttendeeType;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase().replace('-', "_");
        match normalized.as_str() {
            "general" => Ok(Self::General),
            "school" => Ok(Self::School),
            "company" => Ok(Self::Company),
            "summer_course" | "summercourse" => Ok(Self::SummerCourse),
            _ => Err(UnknownAttendeeType(value.to_string())),
        }
    }
}
