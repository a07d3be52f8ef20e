pub mod prompt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::error::{Result, SpiderError};

pub use prompt::{
    merge_criteria, read_prompt_file, resolve_prompts, resolve_task_prompt, PromptRead,
    PromptResolution, CRITERIA_PLACEHOLDER,
};

/// One entry of the task-list document.
///
/// Only the fields this layer needs are typed. Everything else the scraper
/// reads (keywords, price bounds, page counts...) lands in `params` and is
/// handed to the worker untouched.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct TaskDefinition {
    pub task_name: String,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_prompt_file: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_prompt_base_file: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_prompt_criteria_file: Option<PathBuf>,
    /// Filled in by prompt resolution.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_prompt_text: Option<String>,
    #[serde(flatten)]
    pub params: Map<String, Value>,
}

/// Where a task's directive text comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptSource<'a> {
    Composite { base: &'a Path, criteria: &'a Path },
    Single(&'a Path),
}

fn configured(path: &Option<PathBuf>) -> Option<&Path> {
    path.as_deref().filter(|p| !p.as_os_str().is_empty())
}

impl TaskDefinition {
    pub fn new(task_name: impl Into<String>, enabled: bool) -> Self {
        Self {
            task_name: task_name.into(),
            enabled,
            ai_prompt_file: None,
            ai_prompt_base_file: None,
            ai_prompt_criteria_file: None,
            ai_prompt_text: None,
            params: Map::new(),
        }
    }

    /// The base/criteria pair takes precedence. A lone half of the pair is
    /// ignored and the single prompt file is used instead, if any.
    pub fn prompt_source(&self) -> Option<PromptSource<'_>> {
        match (
            configured(&self.ai_prompt_base_file),
            configured(&self.ai_prompt_criteria_file),
        ) {
            (Some(base), Some(criteria)) => Some(PromptSource::Composite { base, criteria }),
            _ => configured(&self.ai_prompt_file).map(PromptSource::Single),
        }
    }

    pub fn param(&self, key: &str) -> Option<&Value> {
        self.params.get(key)
    }

    /// Full record as JSON, pass-through parameters included.
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// Fails fast when the login step has not been run yet.
pub fn ensure_session_state(state_file: &Path) -> Result<()> {
    if !state_file.exists() {
        return Err(SpiderError::MissingSessionState(state_file.to_path_buf()));
    }
    debug!("Found login state at {:?}", state_file);
    Ok(())
}

/// Loads a task list without resolving prompts.
pub fn load_config(path: impl Into<PathBuf>) -> Result<Vec<TaskDefinition>> {
    FileConfigManager::new(path).load_tasks()
}

pub struct FileConfigManager {
    config_path: PathBuf,
}

impl FileConfigManager {
    pub fn new(config_path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: config_path.into(),
        }
    }

    pub fn load_tasks(&self) -> Result<Vec<TaskDefinition>> {
        info!("Loading task configuration from {:?}", self.config_path);

        if !self.config_path.exists() {
            return Err(SpiderError::ConfigNotFound(self.config_path.clone()));
        }

        let content = fs::read_to_string(&self.config_path).map_err(|e| self.parse_error(e))?;
        let tasks: Vec<TaskDefinition> =
            serde_json::from_str(&content).map_err(|e| self.parse_error(e))?;

        self.validate_tasks(&tasks)?;

        info!(
            "Loaded {} tasks ({} enabled)",
            tasks.len(),
            tasks.iter().filter(|t| t.enabled).count()
        );
        Ok(tasks)
    }

    pub fn validate_tasks(&self, tasks: &[TaskDefinition]) -> Result<()> {
        debug!("Validating task configuration");

        let mut seen = HashSet::new();
        for (index, task) in tasks.iter().enumerate() {
            if task.task_name.trim().is_empty() {
                return Err(self.parse_error(format!("task #{} has an empty task_name", index)));
            }
            // first match wins at selection time
            if !seen.insert(task.task_name.as_str()) {
                warn!("Duplicate task name '{}', only the first entry is selectable by name", task.task_name);
            }
        }

        debug!("Task configuration validation passed");
        Ok(())
    }

    /// Load the task list and resolve every enabled task's prompt.
    pub fn load_resolved(&self) -> Result<Vec<TaskDefinition>> {
        let mut tasks = self.load_tasks()?;
        let degraded = resolve_prompts(&mut tasks)?;
        if degraded > 0 {
            warn!("{} tasks will run with an empty prompt", degraded);
        }
        Ok(tasks)
    }

    fn parse_error(&self, reason: impl ToString) -> SpiderError {
        SpiderError::ConfigParseError {
            path: self.config_path.clone(),
            reason: reason.to_string(),
        }
    }
}
