//! REST client for the task-management backend.
//!
//! [`ApiClient`] issues authenticated JSON requests; the per-resource
//! modules add one method per backend operation on top of it. The
//! [`TaskBackend`] trait is the narrow seam the board core depends on,
//! implemented by the HTTP client and by [`memory::InMemoryBackend`].

pub mod backend;
pub mod client;
pub mod comments;
pub mod memory;
pub mod notifications;
pub mod projects;
pub mod tasks;
pub mod users;

pub use backend::{BoardScope, TaskBackend};
pub use client::ApiClient;

use taskboard_proto::codec::CodecError;

/// Errors that can occur when talking to the backend.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// HTTP transport error (connect, timeout, TLS, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The configured base URL or a derived endpoint URL is invalid.
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The bearer token is missing, expired or lacks permission.
    #[error("unauthorized ({status})")]
    Unauthorized {
        /// 401 or 403.
        status: u16,
    },

    /// The requested resource does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Any other non-success status code.
    #[error("API error ({status}): {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, possibly empty.
        body: String,
    },

    /// The response body did not match the expected shape.
    #[error(transparent)]
    Decode(#[from] CodecError),

    /// A request body could not be built.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}
