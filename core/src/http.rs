//! HTTP transport types shared by the client and its transports.
//!
//! # Design
//! These types describe requests and responses as plain data so the
//! dispatcher can be exercised against an in-memory transport. All fields
//! use owned types; nothing here borrows from a live connection.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::ApiError;

/// Query parameters sent with a request.
pub type Params = BTreeMap<String, String>;

/// Verb names accepted by `MeliClient::call`.
///
/// `Files` is not an HTTP method: it is a multipart `POST` carrying files
/// instead of a JSON body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    Get,
    Post,
    Put,
    Delete,
    Options,
    Files,
}

impl Verb {
    pub const ALL: [Verb; 6] = [
        Verb::Get,
        Verb::Post,
        Verb::Put,
        Verb::Delete,
        Verb::Options,
        Verb::Files,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Verb::Get => "get",
            Verb::Post => "post",
            Verb::Put => "put",
            Verb::Delete => "delete",
            Verb::Options => "options",
            Verb::Files => "files",
        }
    }
}

impl FromStr for Verb {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Verb::ALL
            .into_iter()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| ApiError::NotImplemented(s.to_string()))
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One file attached to a `files` upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePart {
    /// Multipart form field name.
    pub field: String,
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl FilePart {
    pub fn new(field: &str, file_name: &str, bytes: Vec<u8>) -> Self {
        Self {
            field: field.to_string(),
            file_name: file_name.to_string(),
            content_type: "application/octet-stream".to_string(),
            bytes,
        }
    }
}

/// An HTTP response described as plain data.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    /// Reason phrase for `status`, e.g. `"Not Found"`.
    pub reason: String,
    pub headers: Vec<(String, String)>,
    /// Raw bytes; not guaranteed to be UTF-8.
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// True for any status below 400.
    pub fn is_ok(&self) -> bool {
        self.status < 400
    }
}
