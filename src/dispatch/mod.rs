pub mod report;
pub mod selection;
pub mod worker;


use chrono::Utc;
use futures::future::join_all;
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::time::Instant;
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

use crate::config::{ensure_session_state, FileConfigManager, TaskDefinition};
use crate::error::{Result, SpiderError};
use crate::settings::SpiderSettings;

pub use report::{BatchReport, RunId, TaskOutcome, TaskReport};
pub use selection::{find_runnable, select_tasks, SelectionPolicy};
pub use worker::{FnWorker, TaskWorker};

/// Which tasks a run should execute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunRequest {
    One(String),
    Named(Vec<String>),
    AllEnabled,
}

impl RunRequest {
    /// An empty name list means every enabled task.
    pub fn from_names(names: Vec<String>) -> Self {
        if names.is_empty() {
            RunRequest::AllEnabled
        } else {
            RunRequest::Named(names)
        }
    }
}

/// Resolves the task list and runs workers over it.
///
/// Every entry point re-reads the configuration: nothing is cached between
/// runs.
pub struct TaskDispatcher {
    settings: SpiderSettings,
    config_manager: FileConfigManager,
    worker: Arc<dyn TaskWorker>,
}

impl TaskDispatcher {
    pub fn new(settings: SpiderSettings, worker: Arc<dyn TaskWorker>) -> Self {
        let config_manager = FileConfigManager::new(settings.config_path.clone());
        Self {
            settings,
            config_manager,
            worker,
        }
    }

    /// Session check, then config load and prompt resolution. All of it is
    /// synchronous and finishes before any worker starts.
    pub fn prepare(&self) -> Result<Vec<TaskDefinition>> {
        ensure_session_state(&self.settings.state_file)?;
        self.config_manager.load_resolved()
    }

    pub async fn run(&self, request: RunRequest, debug_limit: usize) -> Result<u64> {
        match request {
            RunRequest::One(task_name) => self.run_one(&task_name, debug_limit).await,
            RunRequest::Named(task_names) => self.run_many(Some(task_names.as_slice()), debug_limit).await,
            RunRequest::AllEnabled => self.run_many(None, debug_limit).await,
        }
    }

    /// Runs a single task and returns its count. An absent or disabled task
    /// and a worker error are both returned to the caller.
    pub async fn run_one(&self, task_name: &str, debug_limit: usize) -> Result<u64> {
        let tasks = self.prepare()?;
        let task = find_runnable(&tasks, task_name)?;

        info!("Running task '{}'", task.task_name);
        let count = self
            .worker
            .run(task, debug_limit)
            .await
            .map_err(|source| SpiderError::WorkerFailure {
                task: task.task_name.clone(),
                source,
            })?;

        info!("Task '{}' finished, processed {} new items", task.task_name, count);
        Ok(count)
    }

    /// Runs the requested tasks (all enabled ones when `task_names` is empty
    /// or `None`) concurrently and returns the total processed count.
    pub async fn run_many(&self, task_names: Option<&[String]>, debug_limit: usize) -> Result<u64> {
        Ok(self.run_batch(task_names, debug_limit).await?.total_processed)
    }

    /// Same as [`run_many`](Self::run_many) but returns the per-task report.
    pub async fn run_batch(&self, task_names: Option<&[String]>, debug_limit: usize) -> Result<BatchReport> {
        let tasks = self.prepare()?;
        let selected = select_tasks(&tasks, task_names, self.settings.selection_policy())?;

        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        if selected.is_empty() {
            info!("No tasks to run");
            return Ok(BatchReport::aggregate(run_id, started_at, Vec::new()));
        }

        let span = info_span!("batch", %run_id, tasks = selected.len());
        let report = async {
            info!("Dispatching {} tasks", selected.len());
            let reports = self.fan_out(&selected, debug_limit).await;
            let report = BatchReport::aggregate(run_id, started_at, reports);
            info!(
                "Batch finished: {} of {} tasks succeeded, {} new items",
                report.succeeded(),
                report.tasks.len(),
                report.total_processed
            );
            report
        }
        .instrument(span)
        .await;
        Ok(report)
    }

    /// Polls every worker on the current task and waits for all of them.
    /// Errors and panics are captured per task, one report per task in
    /// dispatch order.
    async fn fan_out(&self, selected: &[&TaskDefinition], debug_limit: usize) -> Vec<TaskReport> {
        let worker = self.worker.as_ref();
        let runs = selected.iter().map(|&task| async move {
            let started = Instant::now();
            let run = async { worker.run(task, debug_limit).await };
            let outcome = match AssertUnwindSafe(run).catch_unwind().await {
                Ok(Ok(count)) => TaskOutcome::Success(count),
                Ok(Err(e)) => TaskOutcome::Failure(e.to_string()),
                Err(panic) => TaskOutcome::Failure(panic_message(panic)),
            };
            TaskReport {
                task_name: task.task_name.clone(),
                outcome,
                elapsed: started.elapsed(),
            }
        });

        join_all(runs).await
    }
}

fn panic_message(panic: Box<dyn Any + Send>) -> String {
    let detail = if let Some(msg) = panic.downcast_ref::<&str>() {
        msg.to_string()
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic payload".to_string()
    };
    format!("worker panicked: {}", detail)
}
