use thiserror::Error;

/// Storage-specific error types for the credential store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Backing medium could not be read.
    ///
    /// The store continues with an empty in-memory sequence when this occurs
    /// at load time - degraded but operational.
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    /// Attempted to add a token that already has a record.
    ///
    /// Distinct from a persistence failure: the store was not touched.
    #[error("Duplicate credential token")]
    Duplicate,

    /// In-memory mutation could not be flushed to the backing medium.
    #[error("Persist failed: {0}")]
    PersistFailed(String),
}

/// Specialized result type for storage operations.
pub type StoreResult<T> = Result<T, StoreError>;
