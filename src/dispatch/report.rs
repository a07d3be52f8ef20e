use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Duration;
use tracing::{error, info, warn};
use uuid::Uuid;

pub type RunId = Uuid;

/// Result of one dispatched task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum TaskOutcome {
    Success(u64),
    Failure(String),
}

impl TaskOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, TaskOutcome::Failure(_))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TaskReport {
    pub task_name: String,
    pub outcome: TaskOutcome,
    pub elapsed: Duration,
}

/// Everything a multi-task run produced, tasks in dispatch order.
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub run_id: RunId,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub tasks: Vec<TaskReport>,
    pub total_processed: u64,
}

impl BatchReport {
    /// Walks the outcomes in dispatch order, logging each one and summing the
    /// successful counts. Failures contribute nothing.
    pub fn aggregate(run_id: RunId, started_at: DateTime<Utc>, tasks: Vec<TaskReport>) -> Self {
        let mut total_processed: u64 = 0;
        for report in &tasks {
            match &report.outcome {
                TaskOutcome::Failure(reason) => {
                    error!("Task '{}' failed: {}", report.task_name, reason);
                }
                TaskOutcome::Success(count) => {
                    total_processed = total_processed.checked_add(*count).unwrap_or_else(|| {
                        warn!("Processed item total overflowed at task '{}', clamping", report.task_name);
                        u64::MAX
                    });
                    info!(
                        "Task '{}' finished, processed {} new items in {:?}",
                        report.task_name, count, report.elapsed
                    );
                }
            }
        }

        Self {
            run_id,
            started_at,
            finished_at: Utc::now(),
            tasks,
            total_processed,
        }
    }

    pub fn failures(&self) -> impl Iterator<Item = &TaskReport> {
        self.tasks.iter().filter(|t| t.outcome.is_failure())
    }

    pub fn succeeded(&self) -> usize {
        self.tasks.len() - self.failures().count()
    }
}
