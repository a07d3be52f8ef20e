//! Directive text resolution for enabled tasks.
//!
//! A task either points at one complete prompt file, or at a base template
//! plus a criteria fragment that is spliced into the template at
//! [`CRITERIA_PLACEHOLDER`]. A missing file never fails the batch: the task
//! gets an empty prompt and a warning is logged.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::{PromptSource, TaskDefinition};
use crate::error::{Result, SpiderError};

pub const CRITERIA_PLACEHOLDER: &str = "{{CRITERIA_SECTION}}";

/// Outcome of reading one prompt file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptRead {
    Loaded(String),
    Missing(PathBuf),
}

/// What happened to a task during resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptResolution {
    Disabled,
    Unconfigured,
    Resolved,
    /// A source file was missing, the prompt is empty.
    Degraded,
}

/// Only a missing file is tolerated. Any other read failure is returned.
pub fn read_prompt_file(path: &Path) -> Result<PromptRead> {
    match fs::read_to_string(path) {
        Ok(text) => Ok(PromptRead::Loaded(text)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(PromptRead::Missing(path.to_path_buf())),
        Err(e) => Err(SpiderError::Io {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

/// Splices the criteria into the first placeholder. The criteria text is not
/// scanned again, so a placeholder inside it stays literal.
pub fn merge_criteria(base: &str, criteria: &str) -> String {
    base.replacen(CRITERIA_PLACEHOLDER, criteria, 1)
}

pub fn resolve_task_prompt(task: &mut TaskDefinition) -> Result<PromptResolution> {
    if !task.enabled {
        return Ok(PromptResolution::Disabled);
    }

    let text = match task.prompt_source() {
        None => return Ok(PromptResolution::Unconfigured),
        Some(PromptSource::Composite { base, criteria }) => match read_prompt_file(base)? {
            PromptRead::Missing(path) => Err(path),
            PromptRead::Loaded(base_text) => match read_prompt_file(criteria)? {
                PromptRead::Missing(path) => Err(path),
                PromptRead::Loaded(criteria_text) => Ok(merge_criteria(&base_text, &criteria_text)),
            },
        },
        Some(PromptSource::Single(path)) => match read_prompt_file(path)? {
            PromptRead::Missing(path) => Err(path),
            PromptRead::Loaded(text) => Ok(text),
        },
    };

    match text {
        Ok(text) => {
            debug!("Resolved prompt for task '{}' ({} bytes)", task.task_name, text.len());
            task.ai_prompt_text = Some(text);
            Ok(PromptResolution::Resolved)
        }
        Err(path) => {
            let missing = SpiderError::PromptFileMissing {
                task: task.task_name.clone(),
                path,
            };
            warn!("{}, using an empty prompt", missing);
            task.ai_prompt_text = Some(String::new());
            Ok(PromptResolution::Degraded)
        }
    }
}

/// Resolves every enabled task in place and returns how many degraded to an
/// empty prompt.
pub fn resolve_prompts(tasks: &mut [TaskDefinition]) -> Result<usize> {
    let mut degraded = 0;
    for task in tasks.iter_mut() {
        if resolve_task_prompt(task)? == PromptResolution::Degraded {
            degraded += 1;
        }
    }
    Ok(degraded)
}
