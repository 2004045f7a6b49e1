//! Router for remote operations
//!
//! The router maps `(target_name, operation_name)` pairs to handlers and
//! answers each `Request` with a `Response`. It is the remote counterpart of
//! a service proxy, and it implements `Transport` itself so a proxy can be
//! wired straight to it in-process.
//!
//! # Status Codes
//!
//! | Outcome                                  | Status |
//! |------------------------------------------|--------|
//! | Handler returned a value (or none)       | 200    |
//! | Handler rejected its arguments           | 400    |
//! | Undecodable request text                 | 400    |
//! | No handler for target and operation      | 404    |
//! | Handler failed otherwise                 | 500    |
//!
//! # Examples
//!
//! ```rust
//! use relink_core::{Request, Response};
//! use relink_server::{from_fn, Router};
//! use serde_json::json;
//!
//! let mut router = Router::new();
//! router.register("clock", "now", from_fn(|_| Ok(Some(json!(1700000000)))));
//!
//! let response = router.dispatch(Request::new("clock", "now", vec![]));
//! assert_eq!(response.status_code, Response::SUCCESS);
//! assert_eq!(response.result, Some(json!(1700000000)));
//! ```

use crate::handler::Handler;
use relink_core::{codec, Error, Request, Response, Result, Transport, TransportError};
use std::collections::HashMap;
use std::sync::Arc;

type OperationTable = HashMap<String, Arc<dyn Handler>>;

/// Router for remote operations
///
/// Cheaply cloneable; the handler table is shared behind an `Arc`.
#[derive(Clone)]
pub struct Router {
    /// Handlers by target name, then operation name
    handlers: Arc<HashMap<String, OperationTable>>,
}

impl Router {
    /// Create a new empty router
    pub fn new() -> Self {
        Self {
            handlers: Arc::new(HashMap::new()),
        }
    }

    /// Register a handler for an operation on a target
    ///
    /// Replaces any handler already registered for the same pair.
    pub fn register(
        &mut self,
        target: impl Into<String>,
        operation: impl Into<String>,
        handler: Box<dyn Handler>,
    ) {
        let handlers = Arc::make_mut(&mut self.handlers);
        handlers
            .entry(target.into())
            .or_default()
            .insert(operation.into(), Arc::from(handler));
    }

    /// Get the handler for an operation on a target
    pub fn get(&self, target: &str, operation: &str) -> Option<Arc<dyn Handler>> {
        self.handlers
            .get(target)
            .and_then(|operations| operations.get(operation))
            .cloned()
    }

    /// Check if an operation is registered on a target
    pub fn has_operation(&self, target: &str, operation: &str) -> bool {
        self.get(target, operation).is_some()
    }

    /// Get all registered targets
    pub fn targets(&self) -> Vec<String> {
        self.handlers.keys().cloned().collect()
    }

    /// Get all operations registered on a target
    pub fn operations(&self, target: &str) -> Vec<String> {
        self.handlers
            .get(target)
            .map(|operations| operations.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Run the handler for a request and describe the outcome as a response
    #[tracing::instrument(
        name = "relink.dispatch",
        skip(self, request),
        fields(target = %request.target_name, operation = %request.operation_name)
    )]
    pub fn dispatch(&self, request: Request) -> Response {
        let Some(handler) = self.get(&request.target_name, &request.operation_name) else {
            tracing::warn!("No handler registered");
            return Response::error(
                Response::NOT_FOUND,
                format!(
                    "No handler for {}.{}",
                    request.target_name, request.operation_name
                ),
            );
        };

        match handler.handle(request.arguments) {
            Ok(result) => {
                tracing::debug!("Handler completed");
                Response::success(result)
            }
            Err(e) => {
                let status = status_for(&e);
                tracing::error!(error = %e, status, "Handler failed");
                Response::error(status, e.to_string())
            }
        }
    }

    /// Decode a request from JSON text, dispatch it, and encode the response
    ///
    /// Undecodable text is answered with an encoded 400 response rather than
    /// an error.
    pub fn handle_text(&self, text: &str) -> Result<String> {
        let response = match codec::decode_request(text) {
            Ok(request) => self.dispatch(request),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to decode request");
                Response::error(Response::BAD_REQUEST, e.to_string())
            }
        };

        codec::encode_response(&response)
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for Router {
    fn execute(&self, request: Request) -> std::result::Result<Response, TransportError> {
        Ok(self.dispatch(request))
    }
}

fn status_for(error: &Error) -> i32 {
    match error {
        Error::InvalidParams(_) | Error::ArgumentCount { .. } => Response::BAD_REQUEST,
        Error::UnknownMethod(_) => Response::NOT_FOUND,
        _ => Response::INVOCATION_FAILED,
    }
}

/// Builder for constructing a router
pub struct RouterBuilder {
    router: Router,
}

impl RouterBuilder {
    /// Create a new router builder
    pub fn new() -> Self {
        Self {
            router: Router::new(),
        }
    }

    /// Add a handler for an operation on a target
    pub fn handler(
        mut self,
        target: impl Into<String>,
        operation: impl Into<String>,
        handler: Box<dyn Handler>,
    ) -> Self {
        self.router.register(target, operation, handler);
        self
    }

    /// Build the router
    pub fn build(self) -> Router {
        self.router
    }
}

impl Default for RouterBuilder {
    fn default() -> Self {
        Self::new()
    }
}
