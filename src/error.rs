use crate::stack::AbortReason;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TgError {
    #[error("Required tools not found in PATH: {}", .0.join(", "))]
    MissingTools(Vec<String>),

    #[error("{0}")]
    ResolutionAborted(AbortReason),

    #[error("Path does not exist: {}", .0.display())]
    PathNotFound(PathBuf),

    #[error("No command selected")]
    MissingCommand,

    #[error("Parallelism must be a positive integer (got {0})")]
    InvalidParallelism(i64),

    #[error("Terragrunt command failed with exit code {code}")]
    CommandFailed { code: i32 },

    #[error("Failed to start terragrunt: {0}")]
    CommandSpawn(String),

    #[error("HCL scanning failed: {0}")]
    Scan(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Operation cancelled by user")]
    UserCancelled,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl TgError {
    /// Process exit status for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            TgError::CommandFailed { code } => *code,
            _ => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, TgError>;
