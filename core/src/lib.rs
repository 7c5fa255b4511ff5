//! Synchronous client core for the MercadoLibre marketplace REST API.
//!
//! # Overview
//! `MeliClient` wraps an OAuth access token and a `Transport`, and exposes a
//! handful of endpoints (user profile, categories, seller search, picture
//! upload) on top of a single verb dispatcher, `MeliClient::call`.
//!
//! # Design
//! - The transport is a trait seam. `UreqTransport` is the blocking HTTP
//!   implementation; `RecordingTransport` (feature `test-util`) replays
//!   canned responses in memory.
//! - Responses stay schema-less: `call` returns `serde_json::Value`, and
//!   `Item` / `Picture` keep every field the server sent.
//! - `Collection` holds one search page. It never fetches the next one.
//! - Token acquisition and refresh are out of scope; the caller supplies a
//!   valid token.

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod multipart;
#[cfg(any(test, feature = "test-util"))]
pub mod recording;
pub mod sites;
pub mod transport;
pub mod types;

pub use client::{MeliClient, ACCESS_TOKEN_PARAM, DEFAULT_LIMIT};
pub use config::ClientConfig;
pub use error::{ApiError, Result};
pub use http::{FilePart, HttpResponse, Params, Verb};
#[cfg(any(test, feature = "test-util"))]
pub use recording::{RecordedRequest, RecordingTransport};
pub use sites::{Site, DEFAULT_SITE_ID, SITES};
pub use transport::{Transport, UreqTransport, DEFAULT_API_URL};
pub use types::{Collection, Item, Picture};
