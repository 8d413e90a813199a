//! Configuration for the session store.
//!
//! ```toml
//! host = "localhost"
//! port = 6379
//! db = 0
//! prefix = "myapp:session:"
//! expire = 3600
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default store host.
pub const DEFAULT_HOST: &str = "localhost";

/// Default store port.
pub const DEFAULT_PORT: u16 = 6379;

/// Default database index.
pub const DEFAULT_DB: i64 = 0;

/// Default expiry in seconds (0 = entries don't expire).
pub const DEFAULT_EXPIRE: u64 = 0;

/// Configuration for a [`SessionStore`](crate::SessionStore).
///
/// Once handed to the store the configuration is read-only; build a new
/// store to change the prefix or default expiry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Store host. Ignored when `path` is set.
    pub host: String,

    /// Unix socket path of the store.
    pub path: Option<String>,

    /// Store port.
    pub port: u16,

    /// Database index.
    pub db: i64,

    /// Prepended verbatim to every logical key.
    pub prefix: String,

    /// Default time-to-live in seconds for saved values. 0 disables expiry.
    pub expire: u64,

    /// Full connection URL. Takes precedence over host, path, port and db.
    pub url: Option<String>,

    /// Connect and read/write timeout in seconds. 0 disables the timeout.
    pub timeout: Option<u64>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            path: None,
            port: DEFAULT_PORT,
            db: DEFAULT_DB,
            prefix: String::new(),
            expire: DEFAULT_EXPIRE,
            url: None,
            timeout: None,
        }
    }
}

impl SessionConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a configuration from a generic option mapping.
    ///
    /// Fails with [`Error::InvalidConfiguration`] when `value` is not an
    /// object or when a recognized option has the wrong type. Null options
    /// fall back to their defaults and unknown options are ignored.
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        let mut options = match value {
            serde_json::Value::Object(options) => options,
            other => {
                return Err(Error::InvalidConfiguration(format!(
                    "options must be a mapping, got {}",
                    value_kind(&other)
                )));
            }
        };
        options.retain(|_, v| !v.is_null());

        serde_json::from_value(serde_json::Value::Object(options))
            .map_err(|e| Error::InvalidConfiguration(e.to_string()))
    }

    /// Parse from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Set the store host.
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Connect through a unix socket instead of host and port.
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Set the store port.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the database index.
    pub fn with_db(mut self, db: i64) -> Self {
        self.db = db;
        self
    }

    /// Set the key prefix.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Set the default expiry in seconds.
    pub fn with_expire(mut self, seconds: u64) -> Self {
        self.expire = seconds;
        self
    }

    /// Use a full connection URL.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Set the connect and read/write timeout in seconds.
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout = Some(seconds);
        self
    }

    /// Timeout as a `Duration`, if one is configured. 0 means no timeout.
    pub fn timeout_duration(&self) -> Option<Duration> {
        self.timeout.filter(|&secs| secs > 0).map(Duration::from_secs)
    }

    /// Resolve the URL the store client connects to.
    pub fn connection_url(&self) -> String {
        if let Some(url) = &self.url {
            return url.clone();
        }
        match &self.path {
            Some(path) => format!("redis+unix://{}?db={}", path, self.db),
            None => format!("redis://{}:{}/{}", self.host, self.port, self.db),
        }
    }

    /// Combine the configured prefix with a logical key.
    pub fn namespaced_key(&self, key: &str) -> String {
        format!("{}{}", self.prefix, key)
    }
}

impl TryFrom<serde_json::Value> for SessionConfig {
    type Error = Error;

    fn try_from(value: serde_json::Value) -> Result<Self> {
        Self::from_value(value)
    }
}

/// Load config from a TOML file.
pub fn load_config_file(path: &Path) -> Result<SessionConfig> {
    let contents = std::fs::read_to_string(path).map_err(|e| Error::ReadFile {
        path: path.display().to_string(),
        source: e,
    })?;
    SessionConfig::from_toml(&contents)
}

fn value_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "a mapping",
    }
}
