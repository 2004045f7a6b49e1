//! The transport seam
//!
//! A transport is anything that can carry one `Request` to the remote side
//! and bring back its `Response`, blocking the calling thread meanwhile.
//! Framing, process boundaries, timeouts and cancellation are the
//! transport's business; whatever goes wrong is reported as a
//! `TransportError` and handed to the caller unchanged.
//!
//! # Creating Transports
//!
//! 1. **Implement `Transport`** for your own type
//! 2. **from_fn**: wrap a closure over `Request`/`Response` values
//! 3. **from_text_fn**: wrap a closure over encoded JSON text; the request and
//!    response are run through `codec`
//!
//! # Examples
//!
//! ```rust
//! use relink_core::{transport, Request, Response, Transport};
//! use serde_json::json;
//!
//! let echo = transport::from_fn(|request: Request| {
//!     Ok(Response::success(Some(json!(request.arguments.len()))))
//! });
//!
//! let response = echo.execute(Request::new("svc", "count", vec![])).unwrap();
//! assert_eq!(response.result, Some(json!(0)));
//! ```

use crate::codec;
use crate::error::TransportError;
use crate::types::{Request, Response};
use std::sync::Arc;

/// Synchronous request/response executor
pub trait Transport {
    /// Deliver the request and wait for its response
    fn execute(&self, request: Request) -> Result<Response, TransportError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn execute(&self, request: Request) -> Result<Response, TransportError> {
        (**self).execute(request)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn execute(&self, request: Request) -> Result<Response, TransportError> {
        (**self).execute(request)
    }
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn execute(&self, request: Request) -> Result<Response, TransportError> {
        (**self).execute(request)
    }
}

/// Transport backed by a closure over request values
pub struct FnTransport<F> {
    func: F,
}

impl<F> Transport for FnTransport<F>
where
    F: Fn(Request) -> Result<Response, TransportError>,
{
    fn execute(&self, request: Request) -> Result<Response, TransportError> {
        (self.func)(request)
    }
}

/// Create a transport from a closure over request values
pub fn from_fn<F>(func: F) -> FnTransport<F>
where
    F: Fn(Request) -> Result<Response, TransportError>,
{
    FnTransport { func }
}

/// Transport backed by a closure over encoded JSON text
pub struct TextTransport<F> {
    func: F,
}

impl<F> Transport for TextTransport<F>
where
    F: Fn(String) -> Result<String, TransportError>,
{
    fn execute(&self, request: Request) -> Result<Response, TransportError> {
        let text = codec::encode_request(&request)
            .map_err(|e| TransportError::Codec(e.to_string()))?;
        let reply = (self.func)(text)?;
        codec::decode_response(&reply).map_err(|e| TransportError::Codec(e.to_string()))
    }
}

/// Create a transport from a closure that sends a request as JSON text and
/// returns the response text
///
/// ```rust
/// use relink_core::{transport, Request, Transport};
///
/// let wire = transport::from_text_fn(|_request_text| {
///     Ok(r#"{"statusCode":200,"statusMessage":"OK","result":"pong"}"#.to_string())
/// });
///
/// let response = wire.execute(Request::new("", "ping", vec![])).unwrap();
/// assert_eq!(response.result, Some(serde_json::json!("pong")));
/// ```
pub fn from_text_fn<F>(func: F) -> TextTransport<F>
where
    F: Fn(String) -> Result<String, TransportError>,
{
    TextTransport { func }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_fn_transport_passes_failure_through() {
        let transport = from_fn(|_| Err(TransportError::ConnectionClosed));
        let result = transport.execute(Request::new("a", "b", vec![]));
        assert_eq!(result, Err(TransportError::ConnectionClosed));
    }

    #[test]
    fn test_text_transport_encodes_request() {
        let transport = from_text_fn(|text| {
            assert!(text.contains("\"operationName\":\"echo\""));
            Ok(r#"{"statusCode":200,"statusMessage":"OK","result":[1,2]}"#.to_string())
        });
        let response = transport.execute(Request::new("", "echo", vec![])).unwrap();
        assert_eq!(response.result, Some(json!([1, 2])));
    }

    #[test]
    fn test_text_transport_bad_reply_is_codec_error() {
        let transport = from_text_fn(|_| Ok("garbage".to_string()));
        let result = transport.execute(Request::new("", "echo", vec![]));
        assert!(matches!(result, Err(TransportError::Codec(_))));
    }

    #[test]
    fn test_blanket_impls() {
        let transport = from_fn(|_| Ok(Response::success(None)));
        let shared: Arc<dyn Transport> = Arc::new(transport);
        let boxed: Box<dyn Transport> = Box::new(Arc::clone(&shared));
        let borrowed = &boxed;
        assert!(borrowed.execute(Request::new("", "", vec![])).unwrap().is_success());
    }
}
