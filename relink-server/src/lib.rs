//! Remote side of relink: request dispatch
//!
//! A `Router` holds one handler per `(target_name, operation_name)` pair and
//! answers each incoming `Request` with a `Response` carrying a status code
//! and the handler's result. Any transport can feed it, either with decoded
//! requests through `dispatch` or with JSON text through `handle_text`.
//! Because `Router` implements `Transport`, a client proxy can also call it
//! directly in-process.
//!
//! # Quick Start
//!
//! ```rust
//! use relink_server::{from_typed_fn, RouterBuilder};
//! use serde::Deserialize;
//!
//! #[derive(Deserialize)]
//! struct AddParams {
//!     a: i64,
//!     b: i64,
//! }
//!
//! let router = RouterBuilder::new()
//!     .handler("calculator", "add", from_typed_fn(|p: AddParams| Ok(p.a + p.b)))
//!     .build();
//!
//! let reply = router
//!     .handle_text(r#"{"targetName":"calculator","operationName":"add","arguments":[
//!         {"kind":"named","label":"a","rawType":"i64","value":2},
//!         {"kind":"named","label":"b","rawType":"i64","value":3}]}"#)
//!     .unwrap();
//! assert!(reply.contains("\"result\":5"));
//! ```

mod handler;
mod router;

pub use handler::{from_fn, from_typed_fn, FnHandler, Handler};
pub use router::{Router, RouterBuilder};
