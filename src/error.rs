use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("no classifier backend is loaded")]
    Unavailable,

    #[error("classifier inference failed: {reason}")]
    InferenceFailed { reason: String },

    #[error("classifier returned unusable output: {reason}")]
    InvalidOutput { reason: String },

    #[error("classifier worker is no longer running")]
    WorkerClosed,
}

impl From<rust_bert::RustBertError> for BackendError {
    fn from(err: rust_bert::RustBertError) -> Self {
        BackendError::InferenceFailed {
            reason: err.to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {reason}")]
    Parse { path: PathBuf, reason: String },

    #[error("invalid category table: {reason}")]
    Invalid { reason: String },
}
