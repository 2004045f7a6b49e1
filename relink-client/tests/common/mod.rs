//! Common test utilities for relink-client integration tests
//!
//! This module provides a recording stub transport so bindings and proxies
//! can be exercised without any real remote side.

#![allow(dead_code)]

use relink_core::{Request, Response, Transport, TransportError};
use serde_json::Value;
use std::sync::Mutex;

/// Stub transport that records every request it receives
///
/// Replies with a fixed response, or fails every call when built with
/// `failing`.
pub struct RecordingTransport {
    reply: Result<Response, TransportError>,
    requests: Mutex<Vec<Request>>,
}

impl RecordingTransport {
    /// Reply to every request with `response`
    pub fn replying(response: Response) -> Self {
        Self {
            reply: Ok(response),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Reply to every request with status 200 and `result`
    pub fn returning(result: Value) -> Self {
        Self::replying(Response::success(Some(result)))
    }

    /// Fail every request with `error`
    pub fn failing(error: TransportError) -> Self {
        Self {
            reply: Err(error),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// All requests received so far
    pub fn requests(&self) -> Vec<Request> {
        self.requests.lock().unwrap().clone()
    }

    /// Number of requests received so far
    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

impl Transport for RecordingTransport {
    fn execute(&self, request: Request) -> Result<Response, TransportError> {
        self.requests.lock().unwrap().push(request);
        self.reply.clone()
    }
}
