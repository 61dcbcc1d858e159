//! Error types for Cellcraft core.

use thiserror::Error;

/// Errors that can occur outside formula evaluation.
///
/// Formula failures never show up here; they become the `#ERROR` cell value.
#[derive(Error, Debug)]
pub enum CellcraftError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("Invalid task bank: {0}")]
    TaskBank(#[from] toml::de::Error),

    #[error("Duplicate task {0}")]
    DuplicateTask(String),

    #[error("Invalid task key '{0}' (expected LEVEL-TASK, e.g. 1-2)")]
    InvalidTaskKey(String),

    #[error("Unknown task {0}")]
    UnknownTask(String),

    #[error("No file path set")]
    NoFilePath,
}

pub type Result<T> = std::result::Result<T, CellcraftError>;
