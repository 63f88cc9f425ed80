use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use mide_core::remote::{RemoteFormService, SaveResponse};
use mide_core::session::StepPayload;
use mide_core::step::{AttendeeType, Step};
use mide_core::time::local_reservation_id;
use tracing::debug;

/// Reservation service backed by the local drafts directory.
///
/// Each reservation gets `<drafts_dir>/<id>/step-<n>.json`; saving a step
/// merges into what is already there and answers with the stored entity.
#[derive(Debug, Clone)]
pub struct DraftDirectoryService {
    root: PathBuf,
}

impl DraftDirectoryService {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn step_path(&self, session_id: &str, step: Step) -> PathBuf {
        self.root
            .join(session_id)
            .join(format!("step-{}.json", step.number()))
    }

    fn read_step(&self, session_id: &str, step: Step) -> Result<Option<StepPayload>> {
        let path = self.step_path(session_id, step);
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(error) if error.kind() == ErrorKind::NotFound => return Ok(None),
            Err(error) => {
                return Err(error)
                    .with_context(|| format!("failed to read draft {}", path.display()));
            }
        };

        let payload = serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse draft {}", path.display()))?;
        Ok(Some(payload))
    }

    fn write_step(&self, session_id: &str, step: Step, payload: &StepPayload) -> Result<()> {
        let path = self.step_path(session_id, step);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("failed to create drafts directory {}", parent.display())
            })?;
        }

        let serialized =
            serde_json::to_string_pretty(payload).context("failed to serialize draft")?;
        let temp_path = path.with_extension("json.tmp");
        fs::write(&temp_path, serialized)
            .with_context(|| format!("failed to write draft {}", temp_path.display()))?;
        fs::rename(&temp_path, &path)
            .with_context(|| format!("failed to replace draft {}", path.display()))?;
        Ok(())
    }
}

impl RemoteFormService for DraftDirectoryService {
    fn save(
        &self,
        step: Step,
        attendee_type: Option<AttendeeType>,
        session_id: Option<&str>,
        payload: &StepPayload,
    ) -> Result<SaveResponse> {
        if payload.is_empty() {
            return Ok(SaveResponse::rejected(
                format!("step {step} has no data to save"),
                Vec::new(),
            ));
        }
        if attendee_type.is_none() {
            return Ok(SaveResponse::rejected(
                "choose an attendee type before saving",
                vec!["attendee_type is required".to_string()],
            ));
        }

        let session_id = match session_id {
            Some(id) => id.to_string(),
            None => local_reservation_id(),
        };

        let mut stored = self.read_step(&session_id, step)?.unwrap_or_default();
        for (key, value) in payload {
            stored.insert(key.clone(), value.clone());
        }
        self.write_step(&session_id, step, &stored)?;

        debug!(%step, %session_id, "draft written");
        Ok(SaveResponse::saved(session_id, stored))
    }

    fn load(&self, step: Step, session_id: &str) -> Result<StepPayload> {
        match self.read_step(session_id, step)? {
            Some(payload) => Ok(payload),
            None => bail!("no draft of step {step} for reservation {session_id}"),
        }
    }
}
