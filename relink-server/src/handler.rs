//! Handler traits and types for remote operations
//!
//! A handler runs one operation on the remote side. It receives the tagged
//! arguments of a `Request` in their original order and returns the
//! operation's result, if any.
//!
//! # Creating Handlers
//!
//! 1. **from_fn**: Wrap a closure over the raw tagged arguments
//! 2. **from_typed_fn**: Wrap a closure over a deserialized parameter struct
//!
//! # Examples
//!
//! ```rust
//! use relink_server::{from_fn, from_typed_fn};
//! use serde::Deserialize;
//! use serde_json::json;
//!
//! // Raw handler
//! let count = from_fn(|args| Ok(Some(json!(args.len()))));
//!
//! // Typed handler
//! #[derive(Deserialize)]
//! struct AddParams { a: i32, b: i32 }
//!
//! let add = from_typed_fn(|params: AddParams| Ok(params.a + params.b));
//! ```

use relink_core::{Argument, Error, Result};
use serde_json::{Map, Value};
use std::sync::Arc;

/// Trait for remote operation handlers
///
/// Handlers must be `Send + Sync` so one router can serve many threads.
pub trait Handler: Send + Sync {
    /// Run the operation
    ///
    /// `Ok(None)` means the operation produced no value. Errors are turned
    /// into status codes by the router:
    /// - `Error::InvalidParams` / `Error::ArgumentCount` → 400
    /// - `Error::UnknownMethod` → 404
    /// - anything else → 500
    fn handle(&self, arguments: Vec<Argument>) -> Result<Option<Value>>;
}

/// Handler backed by a closure over tagged arguments
pub struct FnHandler<F> {
    func: F,
}

impl<F> FnHandler<F>
where
    F: Fn(Vec<Argument>) -> Result<Option<Value>> + Send + Sync,
{
    /// Create a new handler from a function
    pub fn new(func: F) -> Self {
        Self { func }
    }
}

impl<F> Handler for FnHandler<F>
where
    F: Fn(Vec<Argument>) -> Result<Option<Value>> + Send + Sync,
{
    fn handle(&self, arguments: Vec<Argument>) -> Result<Option<Value>> {
        (self.func)(arguments)
    }
}

/// Create a handler from a function over the raw tagged arguments
///
/// ```rust
/// use relink_server::from_fn;
/// use serde_json::json;
///
/// let first_label = from_fn(|args| {
///     Ok(args.first().and_then(|a| a.label()).map(|label| json!(label)))
/// });
/// ```
pub fn from_fn<F>(func: F) -> Box<dyn Handler>
where
    F: Fn(Vec<Argument>) -> Result<Option<Value>> + Send + Sync + 'static,
{
    Box::new(FnHandler::new(func))
}

/// Create a handler from a function with automatic type conversion
///
/// Named arguments are collected into a JSON object keyed by label and
/// deserialized into `P`. With no named arguments `P` is read from an empty
/// object, so all-default structs work, and otherwise from `null`, which
/// suits `()`. Callback arguments are not part of `P`; use
/// `from_fn` for operations that take them.
///
/// # Error Handling
///
/// - If the arguments can't be deserialized to `P`: `Error::InvalidParams`
/// - If the result can't be serialized to JSON: `Error::Serialization`
/// - Function errors are passed through unchanged
///
/// A result that serializes to `null` is reported as no value.
pub fn from_typed_fn<P, R, F>(func: F) -> Box<dyn Handler>
where
    P: serde::de::DeserializeOwned + 'static,
    R: serde::Serialize + 'static,
    F: Fn(P) -> Result<R> + Send + Sync + 'static,
{
    let func = Arc::new(func);

    from_fn(move |arguments: Vec<Argument>| {
        let params: P = deserialize_params(arguments)?;

        let result = func(params)?;

        let value =
            serde_json::to_value(result).map_err(|e| Error::Serialization(e.to_string()))?;
        Ok((!value.is_null()).then_some(value))
    })
}

fn deserialize_params<P: serde::de::DeserializeOwned>(arguments: Vec<Argument>) -> Result<P> {
    let fields: Map<String, Value> = arguments
        .into_iter()
        .filter_map(|arg| match arg {
            Argument::Named { label, value, .. } => Some((label, value)),
            Argument::Callback { .. } => None,
        })
        .collect();

    if fields.is_empty() {
        // Structs with all-default fields read `{}`; `()` only reads `null`.
        if let Ok(params) = serde_json::from_value(Value::Object(Map::new())) {
            return Ok(params);
        }
        return serde_json::from_value(Value::Null)
            .map_err(|e| Error::InvalidParams(e.to_string()));
    }

    serde_json::from_value(Value::Object(fields)).map_err(|e| Error::InvalidParams(e.to_string()))
}
