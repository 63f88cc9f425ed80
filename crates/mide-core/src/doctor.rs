use std::fmt;
use std::path::Path;

use crate::config::{load_config, resolve_config_path};
use crate::storage::{FileSessionStorage, SessionStorage};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckState {
    Pass,
    Fail,
}

impl fmt::Display for CheckState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pass => write!(f, "PASS"),
            Self::Fail => write!(f, "FAIL"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DoctorCheck {
    pub name: String,
    pub state: CheckState,
    pub details: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DoctorReport {
    pub checks: Vec<DoctorCheck>,
}

impl DoctorReport {
    pub fn has_failures(&self) -> bool {
        self.checks
            .iter()
            .any(|check| check.state == CheckState::Fail)
    }

    pub fn summary(&self) -> String {
        let passed = self
            .checks
            .iter()
            .filter(|check| check.state == CheckState::Pass)
            .count();
        let failed = self.checks.len().saturating_sub(passed);
        format!("{passed} passed, {failed} failed")
    }
}

const CONFIG_EXISTS: &str = "config file exists";
const CONFIG_VALID: &str = "config parses and validates";
const SESSION_READABLE: &str = "session storage readable";

pub fn run_doctor() -> DoctorReport {
    match resolve_config_path() {
        Ok(config_path) => run_doctor_at(&config_path),
        Err(error) => {
            let mut checks = vec![fail_check("config path resolves", error.to_string())];
            push_skipped_checks(
                &mut checks,
                &[CONFIG_EXISTS, CONFIG_VALID, SESSION_READABLE],
                "config path could not be resolved",
            );
            DoctorReport { checks }
        }
    }
}

pub fn run_doctor_at(config_path: &Path) -> DoctorReport {
    let mut checks = Vec::new();

    if !config_path.exists() {
        checks.push(fail_check(
            CONFIG_EXISTS,
            format!("expected at {}", config_path.display()),
        ));
        push_skipped_checks(
            &mut checks,
            &[CONFIG_VALID, SESSION_READABLE],
            "config file is missing",
        );
        return DoctorReport { checks };
    }

    checks.push(pass_check(
        CONFIG_EXISTS,
        format!("found at {}", config_path.display()),
    ));

    let config = match load_config(config_path) {
        Ok(config) => config,
        Err(error) => {
            checks.push(fail_check(CONFIG_VALID, error.to_string()));
            checks.push(skipped_check(SESSION_READABLE, "config is invalid"));
            return DoctorReport { checks };
        }
    };

    checks.push(pass_check(
        CONFIG_VALID,
        format!(
            "config is valid ({} validation rules)",
            config.validation.rules.len()
        ),
    ));

    let config_dir = config_path.parent().unwrap_or_else(|| Path::new("."));
    let storage = FileSessionStorage::new(config.session_path(config_dir));
    checks.push(match storage.load() {
        Ok(Some(snapshot)) => pass_check(
            SESSION_READABLE,
            format!(
                "session at {} is on step {}",
                storage.path().display(),
                snapshot.current_step
            ),
        ),
        Ok(None) => pass_check(SESSION_READABLE, "no session stored yet"),
        Err(error) => fail_check(SESSION_READABLE, error.to_string()),
    });

    DoctorReport { checks }
}

fn pass_check(name: &str, details: impl Into<String>) -> DoctorCheck {
    DoctorCheck {
        name: name.to_string(),
        state: CheckState::Pass,
        details: details.into(),
    }
}

fn fail_check(name: &str, details: impl Into<String>) -> DoctorCheck {
    DoctorCheck {
        name: name.to_string(),
        state: CheckState::Fail,
        details: details.into(),
    }
}

fn skipped_check(name: &str, reason: &str) -> DoctorCheck {
    fail_check(name, format!("skipped because {reason}"))
}

fn push_skipped_checks(checks: &mut Vec<DoctorCheck>, names: &[&str], reason: &str) {
    checks.extend(
        names
            .iter()
            .copied()
            .map(|name| skipped_check(name, reason)),
    );
}
