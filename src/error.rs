use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SpiderError>;

/// Error type returned by a worker. Workers are external collaborators, so
/// any error they produce is carried opaquely.
pub type WorkerError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Error, Debug)]
pub enum SpiderError {
    #[error("Login state file '{}' not found. Run the login step first to create it.", .0.display())]
    MissingSessionState(PathBuf),

    #[error("Configuration file '{}' not found", .0.display())]
    ConfigNotFound(PathBuf),

    #[error("Failed to read or parse configuration file '{}': {reason}", .path.display())]
    ConfigParseError { path: PathBuf, reason: String },

    #[error("Prompt file '{}' for task '{task}' is missing", .path.display())]
    PromptFileMissing { task: String, path: PathBuf },

    #[error("Task '{0}' does not exist or is disabled")]
    TaskNotFoundOrDisabled(String),

    #[error("Task '{task}' failed: {source}")]
    WorkerFailure {
        task: String,
        #[source]
        source: WorkerError,
    },

    #[error("Failed to read '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Settings error: {0}")]
    SettingsError(String),
}

impl From<toml::de::Error> for SpiderError {
    fn from(err: toml::de::Error) -> Self {
        SpiderError::SettingsError(err.to_string())
    }
}
