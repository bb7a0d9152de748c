// src/errors.rs

//! Crate-wide error type.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum VunatError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlDe(#[from] toml::de::Error),

    #[error("TOML serialisation error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unknown project: {0}")]
    ProjectNotFound(String),

    /// A command could not be launched (spawn failed or a pipe was missing).
    #[error("error in group {group}: failed to start command {command:?}: {source}")]
    StartFailure {
        group: String,
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// A started process exited unsuccessfully or could not be waited on.
    #[error("error in group {group}: process {command:?} exited with error: {reason}")]
    ProcessExitFailure {
        group: String,
        command: String,
        reason: String,
        code: Option<i32>,
    },

    #[error("run cancelled")]
    Cancelled,

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl VunatError {
    /// True when the run ended because of an external cancellation request
    /// rather than an application failure.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, VunatError::Cancelled)
    }
}

pub type Result<T> = std::result::Result<T, VunatError>;
