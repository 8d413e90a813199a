//! In-process store with Redis-like expiry semantics.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tracing::trace;

use crate::error::{Error, Result};
use crate::store::KeyValueStore;

#[derive(Debug, Clone)]
struct Entry {
    blob: Vec<u8>,
    /// When the entry expires (None means never).
    deadline: Option<Instant>,
}

impl Entry {
    fn is_expired(&self, now: Instant) -> bool {
        self.deadline.is_some_and(|deadline| now >= deadline)
    }
}

/// Key-value store kept in process memory.
///
/// Useful for tests and single-process deployments. Expired entries are
/// purged when they are next touched and on every write.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Entry>>,
}

impl MemoryStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live (unexpired) entries.
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.entries
            .lock()
            .values()
            .filter(|entry| !entry.is_expired(now))
            .count()
    }

    /// Check if the store holds no live entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove all entries.
    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    /// Drop every expired entry, returning how many were removed.
    pub fn purge_expired(&self) -> usize {
        Self::purge(&mut self.entries.lock())
    }

    fn purge(entries: &mut HashMap<String, Entry>) -> usize {
        let now = Instant::now();
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(now));
        let purged = before - entries.len();
        if purged > 0 {
            trace!(purged, "Purged expired entries");
        }
        purged
    }

    fn deadline(seconds: u64) -> Result<Instant> {
        Instant::now()
            .checked_add(Duration::from_secs(seconds))
            .ok_or_else(|| Error::Store(format!("invalid expire time: {}", seconds)))
    }

    fn live<'a>(entries: &'a mut HashMap<String, Entry>, key: &str) -> Option<&'a mut Entry> {
        if entries.get(key).is_some_and(|e| e.is_expired(Instant::now())) {
            entries.remove(key);
            return None;
        }
        entries.get_mut(key)
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let mut entries = self.entries.lock();
        Ok(Self::live(&mut entries, key).map(|e| e.blob.clone()))
    }

    fn set(&self, key: &str, blob: &[u8]) -> Result<()> {
        let entry = Entry {
            blob: blob.to_vec(),
            deadline: None,
        };
        let mut entries = self.entries.lock();
        Self::purge(&mut entries);
        entries.insert(key.to_string(), entry);
        Ok(())
    }

    fn set_ex(&self, key: &str, blob: &[u8], seconds: u64) -> Result<()> {
        let entry = Entry {
            blob: blob.to_vec(),
            deadline: Some(Self::deadline(seconds)?),
        };
        let mut entries = self.entries.lock();
        Self::purge(&mut entries);
        entries.insert(key.to_string(), entry);
        Ok(())
    }

    fn expire(&self, key: &str, seconds: u64) -> Result<bool> {
        let mut entries = self.entries.lock();
        if Self::live(&mut entries, key).is_none() {
            return Ok(false);
        }
        // Redis deletes the key outright for a non-positive expiry.
        if seconds == 0 {
            entries.remove(key);
        } else {
            let deadline = Self::deadline(seconds)?;
            if let Some(entry) = entries.get_mut(key) {
                entry.deadline = Some(deadline);
            }
        }
        Ok(true)
    }

    fn ttl(&self, key: &str) -> Result<Option<u64>> {
        let mut entries = self.entries.lock();
        let Some(deadline) = Self::live(&mut entries, key).and_then(|e| e.deadline) else {
            return Ok(None);
        };
        let remaining = deadline.saturating_duration_since(Instant::now());
        // Same rounding as Redis TTL.
        Ok(Some((remaining.as_millis() as u64 + 500) / 1000))
    }

    fn del(&self, key: &str) -> Result<u64> {
        let mut entries = self.entries.lock();
        let existed = Self::live(&mut entries, key).is_some();
        entries.remove(key);
        Ok(u64::from(existed))
    }

    fn exists(&self, key: &str) -> Result<bool> {
        let mut entries = self.entries.lock();
        Ok(Self::live(&mut entries, key).is_some())
    }
}
