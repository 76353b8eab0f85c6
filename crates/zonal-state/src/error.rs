//! Error types for the cluster object store.

use thiserror::Error;
use zonal_core::ClusterError;

/// Result type alias for state store operations.
pub type StateResult<T> = Result<T, StateError>;

/// Errors that can occur during state store operations.
#[derive(Debug, Error)]
pub enum StateError {
    #[error("failed to open database: {0}")]
    Open(String),

    #[error("transaction error: {0}")]
    Transaction(String),

    #[error("table error: {0}")]
    Table(String),

    #[error("read error: {0}")]
    Read(String),

    #[error("write error: {0}")]
    Write(String),

    #[error("serialization error: {0}")]
    Serialize(String),

    #[error("deserialization error: {0}")]
    Deserialize(String),

    #[error("snapshot error: {0}")]
    Snapshot(String),
}

impl From<StateError> for ClusterError {
    fn from(err: StateError) -> Self {
        ClusterError::Backend(err.to_string())
    }
}
