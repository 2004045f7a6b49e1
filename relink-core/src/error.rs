//! Error types for relink
//!
//! Errors fall into two disjoint classes:
//!
//! - **Binding-construction errors** (`BindError`, aggregated into `BindErrors`):
//!   raised once, while a proxy is being set up, when a method declaration is
//!   malformed. They indicate a programming error in the interface declaration.
//! - **Invocation errors**: raised per call. An argument-count mismatch is a
//!   caller error detected before any I/O; a `TransportError` is an
//!   infrastructure failure reported by the transport.
//!
//! Status codes carried by a successful `Response` are never turned into an
//! `Error`; they are advisory.
//!
//! # Examples
//!
//! ```rust
//! use relink_core::{BindError, Error};
//!
//! let error = BindError::parameter("Calculator", "add", 1, "No parameter annotation found.");
//! assert_eq!(
//!     error.to_string(),
//!     "No parameter annotation found. (parameter #2)\n    for method Calculator.add"
//! );
//!
//! let error: Error = error.into();
//! assert!(error.is_bind());
//! ```

use std::fmt;
use thiserror::Error;

/// Result type for relink operations
pub type Result<T> = std::result::Result<T, Error>;

/// Application-level error type for relink operations
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// One or more method declarations could not be bound
    ///
    /// Produced while a proxy is being built; every malformed method of the
    /// service is listed, not only the first one.
    #[error("{0}")]
    Bind(BindErrors),

    /// The live argument count differs from the declared parameter count
    ///
    /// Checked before any parameter handler runs and before the transport is
    /// touched.
    #[error("Argument count ({actual}) doesn't match expected count ({expected})")]
    ArgumentCount {
        /// Number of declared parameters
        expected: usize,
        /// Number of arguments supplied by the caller
        actual: usize,
    },

    /// The transport could not complete the exchange
    #[error("Transport failure: {0}")]
    Transport(#[from] TransportError),

    /// No binding is registered under this method name
    #[error("Unknown method: {0}")]
    UnknownMethod(String),

    /// Serialization or deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Arguments did not match what a handler expects
    #[error("Invalid params: {0}")]
    InvalidParams(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Short, stable name of the error variant
    ///
    /// Used as a metric attribute and as a structured logging field.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Bind(_) => "bind",
            Error::ArgumentCount { .. } => "argument_count",
            Error::Transport(_) => "transport",
            Error::UnknownMethod(_) => "unknown_method",
            Error::Serialization(_) => "serialization",
            Error::InvalidParams(_) => "invalid_params",
            Error::Internal(_) => "internal",
        }
    }

    /// True for binding-construction errors
    pub fn is_bind(&self) -> bool {
        matches!(self, Error::Bind(_))
    }

    /// True when the transport failed to deliver the call
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Transport(_))
    }
}

impl From<BindError> for Error {
    fn from(error: BindError) -> Self {
        Error::Bind(BindErrors::from(error))
    }
}

impl From<BindErrors> for Error {
    fn from(errors: BindErrors) -> Self {
        Error::Bind(errors)
    }
}

/// Communication-level failure reported by a transport
///
/// The binding never inspects these beyond logging them; they are handed to
/// the caller inside `Error::Transport` so a lost remote process can be told
/// apart from a call that legitimately returned nothing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The remote end went away
    #[error("Connection closed")]
    ConnectionClosed,

    /// Low-level I/O failure
    #[error("IO error: {0}")]
    Io(String),

    /// The transport gave up waiting for a response
    #[error("Request timeout")]
    Timeout,

    /// The call was cancelled before a response arrived
    #[error("Request cancelled")]
    Cancelled,

    /// The request or response could not be encoded for the wire
    #[error("Codec error: {0}")]
    Codec(String),

    /// Any other transport-specific failure
    #[error("{0}")]
    Other(String),
}

/// A malformed method declaration
///
/// Carries the declaring type's simple name and the method name so the
/// message points at the offending declaration. For parameter-scoped failures
/// the 1-based parameter index is appended to the message and recorded in
/// `parameter`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}\n    for method {type_name}.{method_name}")]
pub struct BindError {
    /// Formatted description, including the parameter suffix if any
    pub message: String,
    /// Simple name of the declaring type
    pub type_name: String,
    /// Name of the method being bound
    pub method_name: String,
    /// 1-based index of the offending parameter
    pub parameter: Option<usize>,
}

impl BindError {
    /// Create a method-scoped error
    pub fn method(
        type_name: impl Into<String>,
        method_name: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            message: message.into(),
            type_name: type_name.into(),
            method_name: method_name.into(),
            parameter: None,
        }
    }

    /// Create a parameter-scoped error
    ///
    /// `index` is the 0-based position of the parameter; the message shows it
    /// 1-based as `(parameter #N)`.
    pub fn parameter(
        type_name: impl Into<String>,
        method_name: impl Into<String>,
        index: usize,
        message: impl Into<String>,
    ) -> Self {
        let position = index + 1;
        Self {
            message: format!("{} (parameter #{})", message.into(), position),
            type_name: type_name.into(),
            method_name: method_name.into(),
            parameter: Some(position),
        }
    }
}

/// Every binding error found while building one service
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BindErrors(Vec<BindError>);

impl BindErrors {
    /// Create an empty collection
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Add an error
    pub fn push(&mut self, error: BindError) {
        self.0.push(error);
    }

    /// Number of collected errors
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True if nothing was collected
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over the collected errors in declaration order
    pub fn iter(&self) -> std::slice::Iter<'_, BindError> {
        self.0.iter()
    }

    /// Consume the collection
    pub fn into_inner(self) -> Vec<BindError> {
        self.0
    }
}

impl From<BindError> for BindErrors {
    fn from(error: BindError) -> Self {
        Self(vec![error])
    }
}

impl FromIterator<BindError> for BindErrors {
    fn from_iter<I: IntoIterator<Item = BindError>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a BindErrors {
    type Item = &'a BindError;
    type IntoIter = std::slice::Iter<'a, BindError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for BindErrors {
    /// A single error renders as itself; several are numbered one per block.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.as_slice() {
            [] => write!(f, "No binding errors"),
            [only] => write!(f, "{}", only),
            all => {
                write!(f, "{} malformed method declarations:", all.len())?;
                for (i, error) in all.iter().enumerate() {
                    write!(f, "\n{}. {}", i + 1, error)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for BindErrors {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_error_display() {
        let error = BindError::method("Calculator", "add", "Conflicting operation names");
        assert_eq!(
            error.to_string(),
            "Conflicting operation names\n    for method Calculator.add"
        );
        assert!(error.parameter.is_none());
    }

    #[test]
    fn test_parameter_error_is_one_based() {
        let error = BindError::parameter("Calculator", "add", 0, "No parameter annotation found.");
        assert_eq!(error.parameter, Some(1));
        assert!(error.message.ends_with("(parameter #1)"));
        assert!(error.to_string().contains("Calculator.add"));
    }

    #[test]
    fn test_argument_count_message_states_both_counts() {
        let error = Error::ArgumentCount {
            expected: 2,
            actual: 3,
        };
        assert_eq!(
            error.to_string(),
            "Argument count (3) doesn't match expected count (2)"
        );
        assert_eq!(error.kind(), "argument_count");
    }

    #[test]
    fn test_transport_error_conversion() {
        let error: Error = TransportError::ConnectionClosed.into();
        assert!(error.is_transport());
        assert!(!error.is_bind());
        assert_eq!(error.to_string(), "Transport failure: Connection closed");
    }

    #[test]
    fn test_bind_errors_single_renders_as_itself() {
        let single = BindError::method("Svc", "run", "boom");
        let errors = BindErrors::from(single.clone());
        assert_eq!(errors.to_string(), single.to_string());
    }

    #[test]
    fn test_bind_errors_multiple_are_numbered() {
        let errors: BindErrors = vec![
            BindError::parameter("Svc", "first", 0, "No parameter annotation found."),
            BindError::parameter("Svc", "second", 2, "No supported annotation found."),
        ]
        .into_iter()
        .collect();

        let display = errors.to_string();
        assert!(display.starts_with("2 malformed method declarations:"));
        assert!(display.contains("1. No parameter annotation found. (parameter #1)"));
        assert!(display.contains("2. No supported annotation found. (parameter #3)"));
        assert!(display.contains("Svc.second"));
    }

    #[test]
    fn test_bind_error_into_error() {
        let error: Error = BindError::method("Svc", "run", "boom").into();
        match error {
            Error::Bind(errors) => assert_eq!(errors.len(), 1),
            _ => panic!("Expected Bind error"),
        }
    }

    #[test]
    fn test_error_kinds_are_distinct() {
        let errors = vec![
            Error::Bind(BindErrors::new()),
            Error::ArgumentCount { expected: 0, actual: 1 },
            Error::Transport(TransportError::Timeout),
            Error::UnknownMethod("x".into()),
            Error::Serialization("x".into()),
            Error::InvalidParams("x".into()),
            Error::Internal("x".into()),
        ];
        let mut kinds: Vec<_> = errors.iter().map(Error::kind).collect();
        kinds.sort();
        kinds.dedup();
        assert_eq!(kinds.len(), errors.len());
    }
}
