//! Error types for lead-chat.

/// Top-level error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-related errors.
///
/// Any of these disables persistence for the session; none of them is fatal.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("No store configuration provided")]
    MissingConfig,

    #[error("Store configuration has no credential key ({key})")]
    MissingCredential { key: String },

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Document store errors.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Failed to connect to store: {0}")]
    Connection(String),

    #[error("Failed to save document to {collection}: {reason}")]
    Save { collection: String, reason: String },

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Input validation errors. Reported to the visitor as a chat message, never
/// propagated.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Invalid email address: {value}")]
    InvalidEmail { value: String },

    #[error("Validation pattern unavailable: {0}")]
    PatternUnavailable(String),
}

/// Result type alias.
pub type Result<T, E = Error> = std::result::Result<T, E>;
