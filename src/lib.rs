//! relink - transport-agnostic remote method binding
//!
//! This is the main convenience crate that re-exports all relink sub-crates.
//! Use this crate if you want a single dependency, and in particular if you
//! declare services with `#[relink::service]`: the generated code refers to
//! paths under `relink::`.
//!
//! # Architecture
//!
//! relink is organized into modular crates:
//!
//! - **relink-core**: Request/response types, declarations, transport trait,
//!   codec, errors, observability
//! - **relink-client**: Parameter handlers, method bindings, service proxies
//! - **relink-server**: Handlers and the router that answers requests
//! - **relink-macros**: The `#[service]` attribute macro
//!
//! # Quick Start
//!
//! ```rust
//! use relink::server::{from_typed_fn, RouterBuilder};
//! use relink::service;
//! use serde::Deserialize;
//!
//! #[service(target = "calculator")]
//! pub trait Calculator {
//!     #[operation("add")]
//!     fn add(&self, #[param("a")] a: i64, #[param("b")] b: i64) -> i64;
//! }
//!
//! #[derive(Deserialize)]
//! struct AddParams { a: i64, b: i64 }
//!
//! let router = RouterBuilder::new()
//!     .handler("calculator", "add", from_typed_fn(|p: AddParams| Ok(p.a + p.b)))
//!     .build();
//!
//! let calculator = CalculatorProxy::new(router).unwrap();
//! assert_eq!(calculator.add(2, 3).unwrap(), 5);
//! ```

// Re-export all public APIs from sub-crates
pub use relink_client as client;
pub use relink_core as core;
pub use relink_server as server;

pub use relink_macros::service;

// Convenience re-exports of the most commonly used types
pub use relink_client::{MethodBinding, ProxyBuilder, ServiceProxy};
pub use relink_core::{Error, Request, Response, Result, Transport};
pub use relink_server::Router;

/// Support code for `#[service]` expansions; not a public API
#[doc(hidden)]
pub mod __private {
    /// Serialize one proxy argument
    pub fn to_argument<T>(value: &T) -> crate::Result<serde_json::Value>
    where
        T: serde::Serialize + ?Sized,
    {
        serde_json::to_value(value).map_err(|e| crate::Error::Serialization(e.to_string()))
    }
}
