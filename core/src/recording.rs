//! In-memory `Transport` that records requests and replays canned responses.
//!
//! Useful for exercising `MeliClient` without a network.

use std::cell::RefCell;
use std::collections::VecDeque;

use serde_json::Value;

use crate::error::ApiError;
use crate::http::{FilePart, HttpResponse, Params, Verb};
use crate::transport::Transport;

/// One request as seen by the transport.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub verb: Verb,
    pub path: String,
    pub params: Params,
    pub body: Option<Value>,
    pub files: Vec<FilePart>,
}

/// Replays queued responses in order; once the queue is empty every request
/// gets `200 OK` with body `{}`.
#[derive(Debug, Default)]
pub struct RecordingTransport {
    requests: RefCell<Vec<RecordedRequest>>,
    responses: RefCell<VecDeque<HttpResponse>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response with the canonical reason phrase for `status`.
    pub fn respond(self, status: u16, body: impl AsRef<[u8]>) -> Self {
        self.respond_with(status, reason_phrase(status), body)
    }

    pub fn respond_with(self, status: u16, reason: &str, body: impl AsRef<[u8]>) -> Self {
        self.responses.borrow_mut().push_back(HttpResponse {
            status,
            reason: reason.to_string(),
            headers: vec![("content-type".to_string(), "application/json".to_string())],
            body: body.as_ref().to_vec(),
        });
        self
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.borrow().clone()
    }

    /// The most recent request, if any.
    pub fn last(&self) -> Option<RecordedRequest> {
        self.requests.borrow().last().cloned()
    }

    fn record(
        &self,
        verb: Verb,
        path: &str,
        params: &Params,
        body: Option<&Value>,
        files: &[FilePart],
    ) -> Result<HttpResponse, ApiError> {
        self.requests.borrow_mut().push(RecordedRequest {
            verb,
            path: path.to_string(),
            params: params.clone(),
            body: body.cloned(),
            files: files.to_vec(),
        });
        Ok(self.responses.borrow_mut().pop_front().unwrap_or_else(|| HttpResponse {
            status: 200,
            reason: "OK".to_string(),
            headers: Vec::new(),
            body: b"{}".to_vec(),
        }))
    }
}

impl Transport for RecordingTransport {
    fn get(&self, path: &str, params: &Params) -> Result<HttpResponse, ApiError> {
        self.record(Verb::Get, path, params, None, &[])
    }

    fn post(&self, path: &str, body: Option<&Value>, params: &Params) -> Result<HttpResponse, ApiError> {
        self.record(Verb::Post, path, params, body, &[])
    }

    fn put(&self, path: &str, body: Option<&Value>, params: &Params) -> Result<HttpResponse, ApiError> {
        self.record(Verb::Put, path, params, body, &[])
    }

    fn delete(&self, path: &str, params: &Params) -> Result<HttpResponse, ApiError> {
        self.record(Verb::Delete, path, params, None, &[])
    }

    fn options(&self, path: &str, params: &Params) -> Result<HttpResponse, ApiError> {
        self.record(Verb::Options, path, params, None, &[])
    }

    fn upload(&self, path: &str, files: &[FilePart], params: &Params) -> Result<HttpResponse, ApiError> {
        self.record(Verb::Files, path, params, None, files)
    }
}

fn reason_phrase(status: u16) -> &'static str {
    ureq::http::StatusCode::from_u16(status)
        .ok()
        .and_then(|code| code.canonical_reason())
        .unwrap_or_default()
}
