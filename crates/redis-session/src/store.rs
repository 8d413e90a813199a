//! Key-value store client seam.
//!
//! The session store talks to its backing store exclusively through the
//! [`KeyValueStore`] trait, so Redis can be swapped for [`MemoryStore`]
//! (or a test double) without touching the façade.
//!
//! [`MemoryStore`]: crate::MemoryStore

use std::time::Duration;

use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::config::SessionConfig;
use crate::error::{Error, Result};

/// Trait for key-value store backends.
///
/// Every method is a single atomic command against the store. Implementations
/// report transport and protocol problems as errors; they never retry.
///
/// # Thread Safety
///
/// All implementations must be `Send + Sync` to allow sharing across threads.
pub trait KeyValueStore: Send + Sync {
    /// Fetch a blob. Returns `Ok(None)` if the key is absent or expired.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Store a blob without expiry, clearing any previous expiry.
    fn set(&self, key: &str, blob: &[u8]) -> Result<()>;

    /// Store a blob that expires after `seconds`.
    fn set_ex(&self, key: &str, blob: &[u8], seconds: u64) -> Result<()>;

    /// Set the expiry of an existing key.
    ///
    /// Returns `false` if the key does not exist.
    fn expire(&self, key: &str, seconds: u64) -> Result<bool>;

    /// Remaining time-to-live in seconds.
    ///
    /// Returns `Ok(None)` if the key has no expiry or does not exist.
    fn ttl(&self, key: &str) -> Result<Option<u64>>;

    /// Delete a key, returning the number of keys removed.
    fn del(&self, key: &str) -> Result<u64>;

    /// Check whether a key exists.
    fn exists(&self, key: &str) -> Result<bool>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for std::sync::Arc<T> {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, blob: &[u8]) -> Result<()> {
        (**self).set(key, blob)
    }

    fn set_ex(&self, key: &str, blob: &[u8], seconds: u64) -> Result<()> {
        (**self).set_ex(key, blob, seconds)
    }

    fn expire(&self, key: &str, seconds: u64) -> Result<bool> {
        (**self).expire(key, seconds)
    }

    fn ttl(&self, key: &str) -> Result<Option<u64>> {
        (**self).ttl(key)
    }

    fn del(&self, key: &str) -> Result<u64> {
        (**self).del(key)
    }

    fn exists(&self, key: &str) -> Result<bool> {
        (**self).exists(key)
    }
}

/// Redis-backed store.
///
/// The connection is opened on first use and reused afterwards. A connection
/// that fails with an I/O error is dropped and reopened on the next command.
pub struct RedisStore {
    client: redis::Client,
    timeout: Option<Duration>,
    conn: Mutex<Option<redis::Connection>>,
}

impl RedisStore {
    /// Prepare a client for the configured address.
    ///
    /// Only the address is validated here; nothing is sent over the network
    /// until the first command.
    pub fn open(config: &SessionConfig) -> Result<Self> {
        let url = config.connection_url();
        let client = redis::Client::open(url.as_str()).map_err(|e| {
            Error::InvalidConfiguration(format!("invalid store address '{}': {}", url, e))
        })?;

        Ok(Self {
            client,
            timeout: config.timeout_duration(),
            conn: Mutex::new(None),
        })
    }

    /// Whether a connection is currently open.
    pub fn is_connected(&self) -> bool {
        self.conn.lock().is_some()
    }

    fn connect(&self) -> Result<redis::Connection> {
        debug!(timeout = ?self.timeout, "Opening store connection");
        let conn = match self.timeout {
            Some(timeout) => {
                let conn = self.client.get_connection_with_timeout(timeout)?;
                conn.set_read_timeout(Some(timeout))?;
                conn.set_write_timeout(Some(timeout))?;
                conn
            }
            None => self.client.get_connection()?,
        };
        Ok(conn)
    }

    fn query<T: redis::FromRedisValue>(&self, cmd: &redis::Cmd) -> Result<T> {
        let mut slot = self.conn.lock();
        let mut conn = match slot.take() {
            Some(conn) => conn,
            None => self.connect()?,
        };

        let result = cmd.query::<T>(&mut conn);
        match &result {
            Err(e) if e.is_io_error() || e.is_connection_dropped() => {
                debug!(error = %e, "Discarding broken store connection");
            }
            _ => *slot = Some(conn),
        }

        Ok(result?)
    }
}

impl std::fmt::Debug for RedisStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisStore")
            .field("addr", &self.client.get_connection_info().addr)
            .field("timeout", &self.timeout)
            .field("connected", &self.is_connected())
            .finish()
    }
}

impl KeyValueStore for RedisStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        trace!(key = %key, "GET");
        self.query(redis::cmd("GET").arg(key))
    }

    fn set(&self, key: &str, blob: &[u8]) -> Result<()> {
        trace!(key = %key, bytes = blob.len(), "SET");
        self.query(redis::cmd("SET").arg(key).arg(blob))
    }

    fn set_ex(&self, key: &str, blob: &[u8], seconds: u64) -> Result<()> {
        trace!(key = %key, bytes = blob.len(), seconds, "SETEX");
        self.query(redis::cmd("SETEX").arg(key).arg(seconds).arg(blob))
    }

    fn expire(&self, key: &str, seconds: u64) -> Result<bool> {
        trace!(key = %key, seconds, "EXPIRE");
        self.query(redis::cmd("EXPIRE").arg(key).arg(seconds))
    }

    fn ttl(&self, key: &str) -> Result<Option<u64>> {
        trace!(key = %key, "TTL");
        // -1: no expiry, -2: no such key
        let ttl: i64 = self.query(redis::cmd("TTL").arg(key))?;
        Ok(u64::try_from(ttl).ok())
    }

    fn del(&self, key: &str) -> Result<u64> {
        trace!(key = %key, "DEL");
        self.query(redis::cmd("DEL").arg(key))
    }

    fn exists(&self, key: &str) -> Result<bool> {
        trace!(key = %key, "EXISTS");
        self.query(redis::cmd("EXISTS").arg(key))
    }
}
