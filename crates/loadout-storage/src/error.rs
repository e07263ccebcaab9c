//! Storage and repository error types.

/// Errors from the underlying document store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Connection to the storage backend failed.
    #[error("connection error: {0}")]
    Connection(String),

    /// A storage query failed.
    #[error("query error: {0}")]
    Query(String),

    /// A storage call exceeded its deadline.
    #[error("storage timeout: {0}")]
    Timeout(String),

    /// Serialization or deserialization of stored data failed.
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Result type for document store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors from repository operations.
///
/// `InvalidKey`, `InvalidValue`, and `TooLarge` are caller input errors:
/// the request can be corrected and retried, and in a batch they exclude
/// the offending entry without aborting the rest. `Store` wraps any
/// persistence failure and is surfaced as-is; the repository never
/// retries internally. A missing document on read is not an error — the
/// read path returns `Ok(None)` for that case.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The key is empty, starts with a reserved prefix, or lacks a
    /// `group.leaf` structure.
    #[error("invalid config key: {0:?}")]
    InvalidKey(String),

    /// The value was classified as JSON-like but failed to parse.
    #[error("invalid config value: {0}")]
    InvalidValue(String),

    /// The value string exceeds the configured maximum length.
    #[error("value length {len} exceeds maximum {max}")]
    TooLarge {
        /// Length of the offending value string in bytes.
        len: usize,
        /// Configured maximum length in bytes.
        max: usize,
    },

    /// The underlying document store failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result type for repository operations.
pub type ConfigResult<T> = Result<T, ConfigError>;
