//! Caller side of relink: method bindings and service proxies
//!
//! This crate turns a static service declaration into something callable.
//! Every method is validated once, up front, into an immutable
//! `MethodBinding`; a call then only tags the arguments, builds a `Request`
//! and hands it to a `Transport`.
//!
//! # Core Features
//!
//! - **Parameter handlers**: One per parameter, selected from its attributes
//! - **Method bindings**: Target/operation names plus handlers, validated at build time
//! - **Service proxies**: All bindings of a service behind one transport
//! - **Configurable binding**: Policy for repeated operation-name attributes
//! - **Observability**: `tracing` spans per call and OpenTelemetry metrics
//!
//! # Quick Start
//!
//! ```rust
//! use relink_client::ServiceProxy;
//! use relink_core::{transport, MethodDecl, ParamDecl, Response, ServiceDecl, TypeDecl};
//! use serde_json::json;
//!
//! let decl = ServiceDecl::new("Greeter").target("greeter").method(
//!     MethodDecl::new("greet")
//!         .operation("greet")
//!         .param(ParamDecl::new(TypeDecl::named("String")).named("name")),
//! );
//!
//! let wire = transport::from_fn(|request| {
//!     let name = request.arguments[0].value().as_str().unwrap_or_default().to_string();
//!     Ok(Response::success(Some(json!(format!("Hello, {}", name)))))
//! });
//!
//! let proxy = ServiceProxy::new(&decl, wire).unwrap();
//! let greeting: String = proxy.request("greet", vec![json!("Ada")]).unwrap();
//! assert_eq!(greeting, "Hello, Ada");
//! ```

mod binding;
mod metrics;
mod parameter;
mod proxy;
mod proxy_builder;

pub use binding::{BindOptions, BindingBuilder, DuplicatePolicy, MethodBinding};
pub use metrics::ProxyMetrics;
pub use parameter::ParameterHandler;
pub use proxy::ServiceProxy;
pub use proxy_builder::ProxyBuilder;
