//! Value serialization.
//!
//! Stored blobs are UTF-8 JSON written by `serde_json`. The format is
//! self-describing, so a blob can be read back into the caller's own types
//! or into an untyped [`serde_json::Value`]. Blobs written by other clients
//! in other formats are not readable; restoring them yields the default.

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::Result;

/// Encode a value into a stored blob.
pub fn encode<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(value)?)
}

/// Decode a stored blob.
pub fn decode<T: DeserializeOwned>(blob: &[u8]) -> Result<T> {
    Ok(serde_json::from_slice(blob)?)
}
