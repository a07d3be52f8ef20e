pub mod config;
pub mod dispatch;
pub mod error;
pub mod settings;

pub use error::{Result, SpiderError, WorkerError};
pub use config::{FileConfigManager, TaskDefinition};
pub use dispatch::{BatchReport, FnWorker, RunRequest, TaskDispatcher, TaskOutcome, TaskWorker};
pub use settings::SpiderSettings;
