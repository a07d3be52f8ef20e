use tracing::warn;

use crate::config::TaskDefinition;
use crate::error::{Result, SpiderError};

/// How a multi-task run treats an explicitly requested task that is absent
/// or disabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionPolicy {
    /// Log a skip notice and carry on with the remaining names.
    #[default]
    Lenient,
    /// Fail the whole run before any worker starts.
    Strict,
}

/// Single-task lookup. The first task carrying the name decides: if that one
/// is disabled the lookup fails, even when a later duplicate is enabled.
pub fn find_runnable<'a>(tasks: &'a [TaskDefinition], task_name: &str) -> Result<&'a TaskDefinition> {
    match tasks.iter().find(|t| t.task_name == task_name) {
        Some(task) if task.enabled => Ok(task),
        _ => Err(SpiderError::TaskNotFoundOrDisabled(task_name.to_string())),
    }
}

/// Picks the tasks for a multi-task run, in request order for explicit names
/// and document order otherwise.
pub fn select_tasks<'a>(
    tasks: &'a [TaskDefinition],
    task_names: Option<&[String]>,
    policy: SelectionPolicy,
) -> Result<Vec<&'a TaskDefinition>> {
    let names = match task_names {
        Some(names) if !names.is_empty() => names,
        _ => return Ok(tasks.iter().filter(|t| t.enabled).collect()),
    };

    let mut selected = Vec::with_capacity(names.len());
    for name in names {
        match tasks.iter().find(|t| t.enabled && t.task_name == *name) {
            Some(task) => selected.push(task),
            None => {
                let err = SpiderError::TaskNotFoundOrDisabled(name.clone());
                match policy {
                    SelectionPolicy::Strict => return Err(err),
                    SelectionPolicy::Lenient => warn!("{}, skipping", err),
                }
            }
        }
    }
    Ok(selected)
}
