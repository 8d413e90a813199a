//! The session store façade.

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::codec;
use crate::config::SessionConfig;
use crate::error::Result;
use crate::store::{KeyValueStore, RedisStore};

/// The default restored value: an empty mapping.
pub type SessionMap = serde_json::Map<String, serde_json::Value>;

/// Namespaced, TTL-aware session storage.
///
/// Every operation is a single round trip to the backing store. Store and
/// codec failures never escape: each operation returns its documented
/// fallback instead (`false`, the default value, or `-1`), so a missing key,
/// an unreachable store and a corrupted blob all look the same to the caller.
pub struct SessionStore<S: KeyValueStore = RedisStore> {
    config: SessionConfig,
    store: S,
}

impl SessionStore<RedisStore> {
    /// Create a session store backed by Redis.
    ///
    /// The store is not contacted here; connection problems surface as
    /// fallback values on the first operation.
    pub fn new(config: SessionConfig) -> Result<Self> {
        let store = RedisStore::open(&config)?;
        debug!(addr = %config.connection_url(), "Redis store prepared");
        Ok(Self::with_store(config, store))
    }

    /// Create a Redis-backed session store from a generic option mapping.
    ///
    /// Fails with [`Error::InvalidConfiguration`](crate::Error::InvalidConfiguration)
    /// unless `options` is a mapping.
    pub fn from_value(options: serde_json::Value) -> Result<Self> {
        Self::new(SessionConfig::from_value(options)?)
    }
}

impl<S: KeyValueStore> SessionStore<S> {
    /// Create a session store over an existing store client.
    pub fn with_store(config: SessionConfig, store: S) -> Self {
        debug!(
            prefix = %config.prefix,
            expire = config.expire,
            "Session store ready"
        );
        Self { config, store }
    }

    /// Get the configuration.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Get the underlying store client.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// The store key used for a logical key.
    pub fn namespaced_key(&self, key: &str) -> String {
        self.config.namespaced_key(key)
    }

    /// Save a value using the configured default expiry.
    ///
    /// Returns `false` if the value could not be encoded or stored.
    pub fn save<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> bool {
        self.save_inner(key, value, None)
    }

    /// Save a value that expires after `ttl` seconds.
    ///
    /// A `ttl` of 0 stores the value without expiry, overriding the
    /// configured default.
    pub fn save_with_ttl<T: Serialize + ?Sized>(&self, key: &str, value: &T, ttl: u64) -> bool {
        self.save_inner(key, value, Some(ttl))
    }

    /// Restore a value, falling back to `T::default()`.
    ///
    /// With [`SessionMap`] the fallback is the empty mapping.
    pub fn restore<T: DeserializeOwned + Default>(&self, key: &str) -> T {
        self.restore_or(key, T::default())
    }

    /// Restore a value, falling back to `default` when the key is absent,
    /// expired, unreadable, or the store fails.
    pub fn restore_or<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        match self.try_restore(key) {
            Ok(Some(value)) => value,
            Ok(None) => default,
            Err(e) => {
                warn!(key = %key, error = %e, "Restore failed, returning default");
                default
            }
        }
    }

    /// Set the expiry of an existing key, replacing any previous expiry.
    ///
    /// Returns `false` if the key does not exist or the store fails.
    pub fn expire(&self, key: &str, ttl: u64) -> bool {
        match self.store.expire(&self.namespaced_key(key), ttl) {
            Ok(applied) => applied,
            Err(e) => {
                warn!(key = %key, error = %e, "Expire failed");
                false
            }
        }
    }

    /// Remaining time-to-live in seconds.
    ///
    /// Returns -1 if the key has no expiry, does not exist, or the store fails.
    pub fn ttl(&self, key: &str) -> i64 {
        match self.store.ttl(&self.namespaced_key(key)) {
            Ok(Some(seconds)) => i64::try_from(seconds).unwrap_or(i64::MAX),
            Ok(None) => -1,
            Err(e) => {
                warn!(key = %key, error = %e, "TTL lookup failed");
                -1
            }
        }
    }

    /// Delete a key.
    ///
    /// Returns `true` whenever the store accepted the command, including
    /// when there was nothing to delete.
    pub fn remove(&self, key: &str) -> bool {
        match self.store.del(&self.namespaced_key(key)) {
            Ok(removed) => {
                debug!(key = %key, removed, "Session removed");
                true
            }
            Err(e) => {
                warn!(key = %key, error = %e, "Remove failed");
                false
            }
        }
    }

    /// Alias for [`remove`](Self::remove).
    pub fn delete(&self, key: &str) -> bool {
        self.remove(key)
    }

    /// Check whether a key exists, whatever its value.
    pub fn contains_key(&self, key: &str) -> bool {
        match self.store.exists(&self.namespaced_key(key)) {
            Ok(exists) => exists,
            Err(e) => {
                warn!(key = %key, error = %e, "Existence check failed");
                false
            }
        }
    }

    /// Check whether a key holds a value.
    ///
    /// Fetches the whole value; prefer [`contains_key`](Self::contains_key)
    /// for large entries.
    pub fn has_value(&self, key: &str) -> bool {
        match self.store.get(&self.namespaced_key(key)) {
            Ok(blob) => blob.is_some(),
            Err(e) => {
                warn!(key = %key, error = %e, "Value check failed");
                false
            }
        }
    }

    fn save_inner<T: Serialize + ?Sized>(&self, key: &str, value: &T, ttl: Option<u64>) -> bool {
        match self.try_save(key, value, ttl) {
            Ok(()) => true,
            Err(e) => {
                warn!(key = %key, error = %e, "Save failed");
                false
            }
        }
    }

    fn try_save<T: Serialize + ?Sized>(&self, key: &str, value: &T, ttl: Option<u64>) -> Result<()> {
        let store_key = self.namespaced_key(key);
        let blob = codec::encode(value)?;

        match ttl.unwrap_or(self.config.expire) {
            0 => self.store.set(&store_key, &blob),
            seconds => self.store.set_ex(&store_key, &blob, seconds),
        }
    }

    fn try_restore<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.store.get(&self.namespaced_key(key))? {
            Some(blob) => Ok(Some(codec::decode(&blob)?)),
            None => Ok(None),
        }
    }
}

impl<S: KeyValueStore + std::fmt::Debug> std::fmt::Debug for SessionStore<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("config", &self.config)
            .field("store", &self.store)
            .finish()
    }
}
