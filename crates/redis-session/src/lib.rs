//! Namespaced, TTL-aware session storage on top of Redis.
//!
//! This crate provides a thin session layer with:
//! - Key namespacing through a configured prefix
//! - Optional default and per-call expiry
//! - Serde-based value serialization
//! - Failure containment: operations return fallback values instead of errors
//!
//! # Example
//!
//! ```rust,ignore
//! use redis_session::{SessionConfig, SessionMap, SessionStore};
//!
//! let config = SessionConfig::new()
//!     .with_prefix("myapp:session:")
//!     .with_expire(3600);
//!
//! let session = SessionStore::new(config)?;
//! session.save("user-1", &serde_json::json!({ "name": "session" }));
//! let restored: SessionMap = session.restore("user-1");
//! ```

mod client;
pub mod codec;
mod config;
mod error;
mod memory;
mod store;

pub use client::{SessionMap, SessionStore};
pub use config::{
    DEFAULT_DB, DEFAULT_EXPIRE, DEFAULT_HOST, DEFAULT_PORT, SessionConfig, load_config_file,
};
pub use error::{Error, Result};
pub use memory::MemoryStore;
pub use store::{KeyValueStore, RedisStore};
