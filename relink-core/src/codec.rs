//! JSON codec for requests and responses
//!
//! Transports that move text or bytes use these functions to put a `Request`
//! on the wire and read a `Response` back (and the reverse on the remote
//! side). Argument values are carried as they are; the codec only frames the
//! envelope.
//!
//! All failures map to `Error::Serialization`.
//!
//! # Examples
//!
//! ```rust
//! use relink_core::{codec, Response};
//! use serde_json::json;
//!
//! let text = codec::encode_response(&Response::success(Some(json!(42)))).unwrap();
//! let decoded = codec::decode_response(&text).unwrap();
//! assert_eq!(decoded.result, Some(json!(42)));
//! ```

use crate::error::{Error, Result};
use crate::types::{Request, Response};
use serde::Serialize;

/// Encode any serializable message to a JSON string
pub fn encode<T: Serialize>(msg: &T) -> Result<String> {
    serde_json::to_string(msg).map_err(|e| Error::Serialization(e.to_string()))
}

/// Encode a request to a JSON string
pub fn encode_request(request: &Request) -> Result<String> {
    encode(request)
}

/// Decode a request from a JSON string
///
/// # Errors
///
/// Returns `Error::Serialization` if the text is not JSON or is missing
/// `targetName`/`operationName`. A missing `arguments` field decodes as an
/// empty list.
pub fn decode_request(data: &str) -> Result<Request> {
    serde_json::from_str(data).map_err(|e| Error::Serialization(e.to_string()))
}

/// Encode a response to a JSON string
pub fn encode_response(response: &Response) -> Result<String> {
    encode(response)
}

/// Decode a response from a JSON string
pub fn decode_response(data: &str) -> Result<Response> {
    serde_json::from_str(data).map_err(|e| Error::Serialization(e.to_string()))
}
