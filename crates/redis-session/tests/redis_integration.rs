//! Integration tests against a live Redis server.
//!
//! Run with `cargo test -p redis-session -- --ignored`. The server address is
//! taken from `REDIS_URL` (default `redis://127.0.0.1:6379/0`).

use std::thread;
use std::time::Duration;

use redis_session::{SessionConfig, SessionMap, SessionStore};
use serde_json::json;

fn session(prefix: &str) -> SessionStore {
    let url = std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379/0".into());
    let config = SessionConfig::new()
        .with_url(url)
        .with_prefix(format!("redis_session_test:{}:", prefix));
    SessionStore::new(config).unwrap()
}

#[test]
#[ignore] // Run with --ignored flag - requires a running Redis
fn test_restore_without_values() {
    let session = session("empty");
    let restored: SessionMap = session.restore("name");
    assert!(restored.is_empty());
    assert!(!session.restore_or("non_existed", false));
}

#[test]
#[ignore] // Run with --ignored flag - requires a running Redis
fn test_save_and_restore() {
    let session = session("save");
    assert!(session.save("name", &json!({ "name": "session" })));

    let restored: SessionMap = session.restore("name");
    assert_eq!(serde_json::Value::Object(restored), json!({ "name": "session" }));

    session.remove("name");
}

#[test]
#[ignore] // Run with --ignored flag - requires a running Redis
fn test_key_and_value_checks() {
    let session = session("exists");
    session.save("name", &1);

    assert!(session.contains_key("name"));
    assert!(session.has_value("name"));
    assert!(!session.contains_key("no_key"));
    assert!(!session.has_value("no_key"));

    assert!(session.remove("name"));
    assert!(!session.contains_key("name"));
}

#[test]
#[ignore] // Run with --ignored flag - requires a running Redis
fn test_ttl() {
    let session = session("ttl");

    session.save_with_ttl("with_ttl", &1, 5);
    assert_eq!(session.ttl("with_ttl"), 5);

    session.save("no_ttl", &1);
    assert_eq!(session.ttl("no_ttl"), -1);

    assert!(session.expire("no_ttl", 5));
    assert_eq!(session.ttl("no_ttl"), 5);
    assert!(!session.expire("missing", 5));

    session.remove("with_ttl");
    session.remove("no_ttl");
}

#[test]
#[ignore] // Run with --ignored flag - requires a running Redis
fn test_values_expire() {
    let session = session("expiry");
    session.save_with_ttl("with_ttl", &1, 1);
    session.save("no_ttl", &1);
    session.expire("no_ttl", 1);

    thread::sleep(Duration::from_millis(1100));

    assert!(!session.has_value("with_ttl"));
    assert!(!session.has_value("no_ttl"));
}

#[test]
#[ignore] // Run with --ignored flag - requires a running Redis
fn test_prefixes_are_isolated() {
    let a = session("iso_a");
    let b = session("iso_b");

    a.save("name", &"alice");
    assert!(!b.contains_key("name"));

    a.remove("name");
}
