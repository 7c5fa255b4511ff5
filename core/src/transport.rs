//! The HTTP collaborator behind `MeliClient`.
//!
//! # Design
//! `Transport` is one method per primitive the dispatcher can route to. An
//! error status is not a transport failure: implementations return it as an
//! `HttpResponse` and let the client decide what it means. `Err` is reserved
//! for requests that never produced a response.
//!
//! `UreqTransport` is the blocking implementation used in production.

use std::fmt;

use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::error::ApiError;
use crate::http::{FilePart, HttpResponse, Params};
use crate::multipart;

/// Public API host.
pub const DEFAULT_API_URL: &str = "https://api.mercadolibre.com";

/// Largest response body read into memory.
pub const MAX_BODY_BYTES: u64 = 64 * 1024 * 1024;

/// Low-level request primitives. `path` is relative to the transport's base URL
/// and may already carry a query string; `params` are appended to it.
pub trait Transport {
    fn get(&self, path: &str, params: &Params) -> Result<HttpResponse, ApiError>;
    fn post(&self, path: &str, body: Option<&Value>, params: &Params) -> Result<HttpResponse, ApiError>;
    fn put(&self, path: &str, body: Option<&Value>, params: &Params) -> Result<HttpResponse, ApiError>;
    fn delete(&self, path: &str, params: &Params) -> Result<HttpResponse, ApiError>;
    fn options(&self, path: &str, params: &Params) -> Result<HttpResponse, ApiError>;
    /// Multipart `POST` of `files`.
    fn upload(&self, path: &str, files: &[FilePart], params: &Params) -> Result<HttpResponse, ApiError>;
}

/// Blocking transport over `ureq`.
#[derive(Clone)]
pub struct UreqTransport {
    base_url: String,
    agent: ureq::Agent,
}

impl fmt::Debug for UreqTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UreqTransport").field("base_url", &self.base_url).finish_non_exhaustive()
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new(DEFAULT_API_URL)
    }
}

impl UreqTransport {
    pub fn new(base_url: &str) -> Self {
        // Error statuses come back as responses, not `Err`.
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            agent,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fully qualified URL for `path`, without extra parameters.
    pub fn make_path(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{path}", self.base_url)
        } else {
            format!("{}/{path}", self.base_url)
        }
    }

    fn url(&self, path: &str, params: &Params) -> Result<Url, ApiError> {
        let mut url = Url::parse(&self.make_path(path))
            .map_err(|e| ApiError::Transport(format!("invalid URL for `{path}`: {e}")))?;
        if !params.is_empty() {
            url.query_pairs_mut().extend_pairs(params);
        }
        Ok(url)
    }

    fn json_body(body: Option<&Value>) -> Result<Option<String>, ApiError> {
        body.map(serde_json::to_string)
            .transpose()
            .map_err(|e| ApiError::SerializationError(e.to_string()))
    }
}

impl Transport for UreqTransport {
    fn get(&self, path: &str, params: &Params) -> Result<HttpResponse, ApiError> {
        let url = self.url(path, params)?;
        debug!(%path, "GET");
        into_response(self.agent.get(url.as_str()).call())
    }

    fn post(&self, path: &str, body: Option<&Value>, params: &Params) -> Result<HttpResponse, ApiError> {
        let url = self.url(path, params)?;
        debug!(%path, "POST");
        let request = self.agent.post(url.as_str());
        let result = match Self::json_body(body)? {
            Some(json) => request.content_type("application/json").send(json.as_bytes()),
            None => request.send_empty(),
        };
        into_response(result)
    }

    fn put(&self, path: &str, body: Option<&Value>, params: &Params) -> Result<HttpResponse, ApiError> {
        let url = self.url(path, params)?;
        debug!(%path, "PUT");
        let request = self.agent.put(url.as_str());
        let result = match Self::json_body(body)? {
            Some(json) => request.content_type("application/json").send(json.as_bytes()),
            None => request.send_empty(),
        };
        into_response(result)
    }

    fn delete(&self, path: &str, params: &Params) -> Result<HttpResponse, ApiError> {
        let url = self.url(path, params)?;
        debug!(%path, "DELETE");
        into_response(self.agent.delete(url.as_str()).call())
    }

    fn options(&self, path: &str, params: &Params) -> Result<HttpResponse, ApiError> {
        let url = self.url(path, params)?;
        debug!(%path, "OPTIONS");
        into_response(self.agent.options(url.as_str()).call())
    }

    fn upload(&self, path: &str, files: &[FilePart], params: &Params) -> Result<HttpResponse, ApiError> {
        let url = self.url(path, params)?;
        let body = multipart::encode(files);
        debug!(%path, files = files.len(), bytes = body.bytes.len(), "POST multipart");
        into_response(
            self.agent
                .post(url.as_str())
                .content_type(body.content_type.as_str())
                .send(&body.bytes[..]),
        )
    }
}

fn into_response(
    result: Result<ureq::http::Response<ureq::Body>, ureq::Error>,
) -> Result<HttpResponse, ApiError> {
    let mut response = result.map_err(|e| {
        warn!(error = %e, "request failed");
        ApiError::Transport(e.to_string())
    })?;

    let status = response.status();
    let headers = response
        .headers()
        .iter()
        .filter_map(|(name, value)| Some((name.as_str().to_string(), value.to_str().ok()?.to_string())))
        .collect();
    let body = response
        .body_mut()
        .with_config()
        .limit(MAX_BODY_BYTES)
        .read_to_vec()
        .map_err(|e| ApiError::Transport(e.to_string()))?;
    debug!(status = status.as_u16(), "response received");

    Ok(HttpResponse {
        status: status.as_u16(),
        reason: status.canonical_reason().unwrap_or_default().to_string(),
        headers,
        body,
    })
}
