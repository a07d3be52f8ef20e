use async_trait::async_trait;
use std::future::Future;

use crate::config::TaskDefinition;
use crate::error::WorkerError;

/// The scraping routine behind a task.
///
/// A worker gets one resolved task and the debug limit (0 means no cap) and
/// returns how many new items it processed. It must not touch other tasks.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TaskWorker: Send + Sync {
    async fn run(&self, task: &TaskDefinition, debug_limit: usize) -> std::result::Result<u64, WorkerError>;
}

/// Adapts an async closure into a [`TaskWorker`]. The closure receives its
/// own copy of the task.
pub struct FnWorker<F> {
    f: F,
}

impl<F> FnWorker<F> {
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

#[async_trait]
impl<F, Fut> TaskWorker for FnWorker<F>
where
    F: Fn(TaskDefinition, usize) -> Fut + Send + Sync,
    Fut: Future<Output = std::result::Result<u64, WorkerError>> + Send + 'static,
{
    async fn run(&self, task: &TaskDefinition, debug_limit: usize) -> std::result::Result<u64, WorkerError> {
        (self.f)(task.clone(), debug_limit).await
    }
}
