use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::dispatch::SelectionPolicy;
use crate::error::{Result, SpiderError};

/// Settings for one dispatcher invocation.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct SpiderSettings {
    /// Login/session artifact written by the external login step.
    pub state_file: PathBuf,
    /// JSON task-list document.
    pub config_path: PathBuf,
    /// Fail a multi-task run when an explicitly requested task is unavailable
    /// instead of skipping it.
    pub strict_selection: bool,
    /// Item cap handed to every worker, 0 means unlimited.
    pub debug_limit: usize,
}

impl Default for SpiderSettings {
    fn default() -> Self {
        Self {
            state_file: PathBuf::from("login_state.json"),
            config_path: PathBuf::from("config.json"),
            strict_selection: false,
            debug_limit: 0,
        }
    }
}

impl SpiderSettings {
    /// Load settings from a TOML file. A missing file is not an error, the
    /// defaults are used instead.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            warn!("Settings file {:?} not found, using defaults", path);
            return Ok(Self::default());
        }

        info!("Loading settings from {:?}", path);
        let content = fs::read_to_string(path).map_err(|e| {
            SpiderError::SettingsError(format!("Failed to read settings file {:?}: {}", path, e))
        })?;
        let settings: SpiderSettings = toml::from_str(&content)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        debug!("Validating settings");
        if self.state_file.as_os_str().is_empty() {
            return Err(SpiderError::SettingsError("state_file cannot be empty".to_string()));
        }
        if self.config_path.as_os_str().is_empty() {
            return Err(SpiderError::SettingsError("config_path cannot be empty".to_string()));
        }
        Ok(())
    }

    pub fn with_state_file(mut self, state_file: impl Into<PathBuf>) -> Self {
        self.state_file = state_file.into();
        self
    }

    pub fn with_config_path(mut self, config_path: impl Into<PathBuf>) -> Self {
        self.config_path = config_path.into();
        self
    }

    pub fn with_strict_selection(mut self, strict: bool) -> Self {
        self.strict_selection = strict;
        self
    }

    pub fn selection_policy(&self) -> SelectionPolicy {
        if self.strict_selection {
            SelectionPolicy::Strict
        } else {
            SelectionPolicy::Lenient
        }
    }
}
