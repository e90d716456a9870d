//! JSON encode/decode for backend payloads.
//!
//! Thin wrappers over `serde_json` that keep a short excerpt of the
//! offending body in the error, so a malformed response can be logged
//! without dumping the whole thing.

use serde::Serialize;
use serde::de::DeserializeOwned;

/// Longest body excerpt kept in a [`CodecError`].
const EXCERPT_LEN: usize = 120;

/// Error type for codec encode/decode operations.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// A value could not be serialized.
    #[error("serialization error: {0}")]
    Serialization(String),
    /// A body could not be parsed into the expected type.
    #[error("deserialization error: {reason} (body: {excerpt})")]
    Deserialization {
        /// Parser message.
        reason: String,
        /// Leading part of the body.
        excerpt: String,
    },
}

/// Encodes a payload as JSON bytes.
///
/// # Errors
///
/// Returns `CodecError::Serialization` if the value cannot be serialized.
pub fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, CodecError> {
    serde_json::to_vec(value).map_err(|e| CodecError::Serialization(e.to_string()))
}

/// Decodes a JSON body into `T`.
///
/// # Errors
///
/// Returns `CodecError::Deserialization` if the bytes are not valid JSON
/// for `T`.
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, CodecError> {
    serde_json::from_slice(bytes).map_err(|e| CodecError::Deserialization {
        reason: e.to_string(),
        excerpt: excerpt(bytes),
    })
}

/// Lossy UTF-8 prefix of `bytes`, cut on a char boundary.
fn excerpt(bytes: &[u8]) -> String {
    let text = String::from_utf8_lossy(bytes);
    let mut out: String = text.chars().take(EXCERPT_LEN).collect();
    if text.chars().count() > EXCERPT_LEN {
        out.push('…');
    }
    out
}
