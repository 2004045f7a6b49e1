//! Core types for relink remote method binding
//!
//! This crate holds everything the caller side and the remote side agree on.
//! It includes:
//!
//! - **Types**: The `Request`/`Response` pair exchanged with a transport and
//!   the tagged `Argument` entries a request carries
//! - **Declarations**: Static description tables for services, methods and
//!   parameters, read once when bindings are built
//! - **Transport**: The single synchronous `execute` seam every transport implements
//! - **Codec**: JSON encoding/decoding of requests and responses
//! - **Error handling**: Binding-construction and invocation error types
//! - **Observability**: OpenTelemetry integration for tracing, metrics and logs
//!
//! # Architecture
//!
//! Nothing here performs I/O. A transport decides how a `Request` crosses a
//! process or protocol boundary; `relink-client` builds requests from method
//! declarations, and `relink-server` turns them back into handler calls.
//!
//! # Example
//!
//! ```rust
//! use relink_core::{codec, Argument, Request};
//! use serde_json::json;
//!
//! let request = Request::new(
//!     "calculator",
//!     "add",
//!     vec![
//!         Argument::named("a", "i32", json!(5)),
//!         Argument::named("b", "i32", json!(3)),
//!     ],
//! );
//!
//! let text = codec::encode_request(&request).unwrap();
//! let decoded = codec::decode_request(&text).unwrap();
//! assert_eq!(decoded.operation_name, "add");
//! ```

pub mod codec;
pub mod declaration;
pub mod error;
pub mod observability;
pub mod transport;
pub mod types;

// Re-export the most commonly used types for convenience
pub use declaration::{MethodAttr, MethodDecl, ParamAttr, ParamDecl, ServiceAttr, ServiceDecl, TypeDecl};
pub use error::{BindError, BindErrors, Error, Result, TransportError};
pub use observability::{init_observability, shutdown_observability, ObservabilityConfig};
pub use transport::Transport;
pub use types::{Argument, Request, Response};
