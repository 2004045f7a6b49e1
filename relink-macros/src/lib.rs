//! Procedural macros for relink
//!
//! # Available Macros
//!
//! ## `#[service]` - Service Declaration
//!
//! Reads a trait and generates, at compile time, the declaration table that
//! `relink-client` binds, plus a typed proxy with one method per trait method.
//! Nothing is inspected at run time; the generated code only calls into
//! `relink::core` and `relink::client`, so depend on the `relink` crate to
//! use it.
//!
//! # Examples
//!
//! ```ignore
//! use relink::service;
//!
//! #[service(target = "settings")]
//! pub trait Settings {
//!     #[operation("get")]
//!     fn get(&self, #[param("key")] key: &str) -> Option<String>;
//!
//!     #[operation("watch")]
//!     fn watch(&self, #[param("key")] key: &str, #[callback] listener: ListenerId);
//! }
//!
//! let settings = SettingsProxy::new(transport)?;
//! let theme: Option<String> = settings.get("theme")?;
//!
//! let decl = settings_declaration();
//! assert_eq!(decl.target_name(), Some("settings"));
//! ```

mod service;
mod shape;

use proc_macro::TokenStream;

/// Attribute macro for declaring a remote service
///
/// # Attributes
///
/// - `#[service]` / `#[service(target = "...")]` on the trait; the target is
///   where every call of the service is addressed
/// - `#[operation("...")]` on a method names the remote operation
/// - `#[param("...")]` on a parameter sends it as a named argument
/// - `#[callback]` on a parameter sends it as a callback reference
///
/// All of these are removed from the emitted trait. Any other attribute is
/// recorded in the declaration as unrecognized and left in place.
///
/// # Generated Items
///
/// - `<snake_trait>_declaration() -> ServiceDecl`, e.g. `settings_declaration()`
/// - `<Trait>Proxy<T>` with `new(transport)`, `from_proxy(proxy)`, `inner()`
///   and, for every method taking `self`, a method with the same parameters
///   returning `relink::core::Result<Return>`
///
/// # Types
///
/// Parameter types are recorded structurally: references are looked through,
/// slices and arrays become sequences, and generic arguments are kept.
/// Methods with type parameters or `impl Trait` arguments are declared with
/// unresolvable types and get no proxy method, so building the proxy fails
/// with a binding error naming them.
///
/// # Limitations
///
/// - The trait itself cannot have type parameters
/// - Return types must be owned and deserializable
#[proc_macro_attribute]
pub fn service(args: TokenStream, item: TokenStream) -> TokenStream {
    service::service_impl(args, item)
}
