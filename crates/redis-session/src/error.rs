//! Error types for session store operations.

/// Error type for session store operations.
///
/// Only [`Error::InvalidConfiguration`] and the config file variants ever
/// reach callers of the façade. Everything else is a store failure that the
/// façade converts into a fallback value.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The supplied configuration does not have the expected shape.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Failed to read a config file.
    #[error("failed to read config file '{path}': {source}")]
    ReadFile {
        path: String,
        source: std::io::Error,
    },

    /// Failed to parse TOML.
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Error reported by the Redis client.
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// Error from a non-Redis store backend.
    #[error("store error: {0}")]
    Store(String),

    /// Value could not be encoded or decoded.
    #[error("codec error: {0}")]
    Codec(#[from] serde_json::Error),
}

impl Error {
    /// Whether this error is a store failure (transport, protocol or codec).
    ///
    /// Store failures never escape the façade's operation methods.
    pub fn is_store_failure(&self) -> bool {
        matches!(self, Error::Redis(_) | Error::Store(_) | Error::Codec(_))
    }
}

/// Result type for session store operations.
pub type Result<T> = std::result::Result<T, Error>;
