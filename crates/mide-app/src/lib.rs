mod exit;
mod flow;
mod runtime;
mod save;

use std::path::PathBuf;

use anyhow::{Context, Result, anyhow, bail};
use mide_core::config::{MideConfig, load_config, resolve_config_path};
use mide_core::doctor::{DoctorReport, run_doctor};
use mide_core::remote::RemoteFormService;
use mide_core::storage::SessionStorage;
use mide_core::validator::StepValidator;

pub use flow::{FlowError, FormFlow};
pub use save::SaveReceipt;

/// Collaborators shared by every flow opened from this app.
#[derive(Clone, Copy)]
pub struct App<'a> {
    pub remote: &'a dyn RemoteFormService,
    pub validator: &'a dyn StepValidator,
    pub storage: &'a dyn SessionStorage,
}

#[derive(Debug, Clone)]
pub struct ReadyConfig {
    pub config: MideConfig,
    pub config_dir: PathBuf,
}

impl ReadyConfig {
    pub fn session_path(&self) -> PathBuf {
        self.config.session_path(&self.config_dir)
    }

    pub fn drafts_path(&self) -> PathBuf {
        self.config.drafts_path(&self.config_dir)
    }
}

impl<'a> App<'a> {
    pub fn new(
        remote: &'a dyn RemoteFormService,
        validator: &'a dyn StepValidator,
        storage: &'a dyn SessionStorage,
    ) -> Self {
        Self {
            remote,
            validator,
            storage,
        }
    }
}

pub fn doctor() -> Result<DoctorReport> {
    Ok(run_doctor())
}

pub fn ensure_config_ready() -> Result<ReadyConfig> {
    let config_path = resolve_config_path().context("failed to resolve config path")?;

    if !config_path.exists() {
        bail!(
            "missing config at {}\nCreate ~/.config/mide/config.toml with at least `version = 1` and retry.",
            config_path.display()
        );
    }

    let config = load_config(&config_path).map_err(|error| {
        anyhow!(
            "invalid config at {}: {error}\nFix the config and retry.",
            config_path.display()
        )
    })?;

    let config_dir = config_path
        .parent()
        .map(PathBuf::from)
        .ok_or_else(|| anyhow!("config path {} has no parent", config_path.display()))?;

    Ok(ReadyConfig { config, config_dir })
}
