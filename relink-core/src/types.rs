//! Request and response types exchanged with a transport
//!
//! A call crosses the transport as one `Request` and comes back as one
//! `Response`. Both are transient: built for a single call, consumed, and
//! dropped. Argument values are opaque `serde_json::Value` payloads; relink
//! never looks inside them.
//!
//! # Wire Shape
//!
//! ```json
//! {
//!   "targetName": "calculator",
//!   "operationName": "add",
//!   "arguments": [
//!     {"kind": "named", "label": "a", "rawType": "i32", "value": 5},
//!     {"kind": "callback", "rawType": "Listener", "value": 17}
//!   ]
//! }
//! ```
//!
//! ```json
//! {"statusCode": 200, "statusMessage": "OK", "result": 8}
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One tagged entry of a request's argument list
///
/// Produced by a parameter handler from a live argument. The tag tells the
/// remote side how to treat the value: a named value is passed through to
/// the operation under its label, a callback is a reference the remote side
/// will call back into.
///
/// # Examples
///
/// ```rust
/// use relink_core::Argument;
/// use serde_json::json;
///
/// let arg = Argument::named("amount", "u64", json!(100));
/// assert_eq!(arg.label(), Some("amount"));
/// assert!(!arg.is_callback());
///
/// let cb = Argument::callback("Listener", json!(7));
/// assert_eq!(cb.label(), None);
/// assert_eq!(cb.raw_type(), "Listener");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Argument {
    /// A plain value labelled with its declared parameter name
    #[serde(rename_all = "camelCase")]
    Named {
        /// Declared parameter name
        label: String,
        /// Erased declared type of the parameter
        raw_type: String,
        /// The argument, unchanged
        value: Value,
    },
    /// A reference the remote side will invoke back
    #[serde(rename_all = "camelCase")]
    Callback {
        /// Erased declared type of the parameter
        raw_type: String,
        /// Opaque handle identifying the callback
        value: Value,
    },
}

impl Argument {
    /// Create a named-value entry
    pub fn named(label: impl Into<String>, raw_type: impl Into<String>, value: Value) -> Self {
        Argument::Named {
            label: label.into(),
            raw_type: raw_type.into(),
            value,
        }
    }

    /// Create a callback-reference entry
    pub fn callback(raw_type: impl Into<String>, value: Value) -> Self {
        Argument::Callback {
            raw_type: raw_type.into(),
            value,
        }
    }

    /// Label of a named entry, `None` for callbacks
    pub fn label(&self) -> Option<&str> {
        match self {
            Argument::Named { label, .. } => Some(label),
            Argument::Callback { .. } => None,
        }
    }

    /// Erased declared type
    pub fn raw_type(&self) -> &str {
        match self {
            Argument::Named { raw_type, .. } | Argument::Callback { raw_type, .. } => raw_type,
        }
    }

    /// Borrow the carried value
    pub fn value(&self) -> &Value {
        match self {
            Argument::Named { value, .. } | Argument::Callback { value, .. } => value,
        }
    }

    /// Take the carried value
    pub fn into_value(self) -> Value {
        match self {
            Argument::Named { value, .. } | Argument::Callback { value, .. } => value,
        }
    }

    /// Check if this entry is a callback reference
    pub fn is_callback(&self) -> bool {
        matches!(self, Argument::Callback { .. })
    }
}

/// A single remote call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Request {
    /// Remote object the call is addressed to (may be empty)
    pub target_name: String,
    /// Remote operation to run (may be empty)
    pub operation_name: String,
    /// Tagged arguments in declared parameter order
    #[serde(default)]
    pub arguments: Vec<Argument>,
}

impl Request {
    /// Create a new request
    pub fn new(
        target_name: impl Into<String>,
        operation_name: impl Into<String>,
        arguments: Vec<Argument>,
    ) -> Self {
        Self {
            target_name: target_name.into(),
            operation_name: operation_name.into(),
            arguments,
        }
    }
}

/// Outcome of a remote call as reported by the transport
///
/// `status_code` and `status_message` are diagnostic. The caller-visible
/// return value is `result`; a non-success code does not by itself make the
/// call fail.
///
/// # Examples
///
/// ```rust
/// use relink_core::Response;
/// use serde_json::json;
///
/// let ok = Response::success(Some(json!(42)));
/// assert!(ok.is_success());
/// assert_eq!(ok.result, Some(json!(42)));
///
/// let missing = Response::error(Response::NOT_FOUND, "No handler for calculator.sub");
/// assert!(!missing.is_success());
/// assert!(missing.result.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    /// Status code set by the remote side
    pub status_code: i32,
    /// Human-readable status
    pub status_message: String,
    /// Return value of the operation, `null` if it produced none
    #[serde(default)]
    pub result: Option<Value>,
}

impl Response {
    /// The operation ran and returned
    pub const SUCCESS: i32 = 200;
    /// The request was malformed or its arguments were rejected
    pub const BAD_REQUEST: i32 = 400;
    /// No operation is registered under the requested target and name
    pub const NOT_FOUND: i32 = 404;
    /// The operation ran and failed
    pub const INVOCATION_FAILED: i32 = 500;

    /// Create a response with every field given
    pub fn new(status_code: i32, status_message: impl Into<String>, result: Option<Value>) -> Self {
        Self {
            status_code,
            status_message: status_message.into(),
            result,
        }
    }

    /// Create a `200 OK` response
    pub fn success(result: Option<Value>) -> Self {
        Self::new(Self::SUCCESS, "OK", result)
    }

    /// Create a response with no result
    pub fn error(status_code: i32, status_message: impl Into<String>) -> Self {
        Self::new(status_code, status_message, None)
    }

    /// Check if the status code is in the 2xx range
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }
}
