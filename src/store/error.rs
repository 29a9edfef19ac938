//! Store Errors
//!
//! Every failure a Store Client can surface. Absence of a key or member is never
//! an error here; it is reported as `Ok(None)` or an empty collection.

/// Result alias used by every store-facing call.
pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The store could not be reached or the connection dropped mid-call.
    #[error("store connection error: {0}")]
    Connection(String),

    /// The store rejected or failed to execute a command.
    #[error("store command failed: {0}")]
    Command(String),

    /// A stored value could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The caller stopped waiting after its configured deadline.
    #[error("store operation timed out")]
    Timeout,

    /// The caller cancelled the operation before it reached a terminal state.
    #[error("store operation cancelled")]
    Cancelled,
}

impl From<redis::RedisError> for StoreError {
    fn from(err: redis::RedisError) -> Self {
        if err.is_io_error() || err.is_connection_dropped() || err.is_connection_refusal() {
            StoreError::Connection(err.to_string())
        } else if err.is_timeout() {
            StoreError::Timeout
        } else {
            StoreError::Command(err.to_string())
        }
    }
}
