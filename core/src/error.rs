//! Error types for the marketplace API client.
//!
//! # Design
//! Remote API error payloads are not errors here: `MeliClient::call` returns
//! them as decoded JSON so the caller can inspect them. `ApiError` only covers
//! what the wrapper itself cannot hand back as JSON: an unknown verb, an error
//! response whose body does not decode, transport and filesystem failures.

use serde_json::Value;
use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ApiError>;

/// Errors returned by `MeliClient` and its transports.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The verb name is not in the allow-list. Raised before any I/O.
    #[error("This method `{0}` is not valid or not implemented")]
    NotImplemented(String),

    /// The server returned an error status and a body that is not JSON.
    #[error("Something is not ok: HTTP {status} {reason}")]
    ResponseError { status: u16, reason: String },

    /// A success response body could not be decoded.
    #[error("deserialization failed: {0}")]
    DeserializationError(String),

    /// A request payload could not be encoded.
    #[error("serialization failed: {0}")]
    SerializationError(String),

    /// The body decoded but lacks the shape the endpoint needs, e.g. a search
    /// call answered with an error payload. The payload is kept for the caller.
    #[error("unexpected response: {0}")]
    UnexpectedResponse(Value),

    /// The site id is not in the registry.
    #[error("unknown site id `{0}`")]
    UnknownSite(String),

    /// The HTTP round-trip itself failed (connect, DNS, I/O on the socket).
    #[error("transport error: {0}")]
    Transport(String),

    /// Reading a local file failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Client configuration is incomplete or invalid.
    #[error("invalid configuration: {0}")]
    Config(String),
}
