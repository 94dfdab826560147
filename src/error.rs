use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Lease {name:?} is held by another caller")]
    LockContended { name: String },

    #[error("Missing permissions: {reason}")]
    PolicyDenied { reason: String },

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Other error: {0}")]
    Other(#[from] anyhow::Error),
}

impl Error {
    pub fn is_contended(&self) -> bool {
        matches!(self, Error::LockContended { .. })
    }

    pub fn is_denied(&self) -> bool {
        matches!(self, Error::PolicyDenied { .. })
    }
}

/// Failures reported by a [`LeaseStore`](crate::storage::LeaseStore).
#[derive(Error, Debug)]
pub enum StoreError {
    /// Uniqueness constraint on the lease name was violated.
    #[error("Duplicate key {name:?} in collection {collection:?}")]
    Duplicate { collection: String, name: String },

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Store error: {0}")]
    Other(#[from] anyhow::Error),
}

impl StoreError {
    pub fn is_duplicate(&self) -> bool {
        matches!(self, StoreError::Duplicate { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;
