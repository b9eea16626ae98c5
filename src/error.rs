use std::path::{Path, PathBuf};

pub type Result<T> = std::result::Result<T, ExtractError>;

/// Failures of the file pipeline, kept apart from the container-level `SplitError`
#[derive(thiserror::Error, Debug)]
pub enum ExtractError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid glob pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Worker task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl ExtractError {
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}
