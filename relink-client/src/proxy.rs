//! Service proxies
//!
//! A `ServiceProxy` is the caller-side face of one remote service: a
//! transport plus one `MethodBinding` per declared method, all built up front.
//! Calls look up the binding by method name and run it; nothing about the
//! declaration is inspected again.

use crate::binding::MethodBinding;
use crate::proxy_builder::ProxyBuilder;
use crate::ProxyMetrics;
use relink_core::{Error, Result, ServiceDecl, Transport};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

/// Caller-side proxy for a declared service
///
/// Safe to share between threads whenever the transport is: bindings are
/// immutable and every call owns its arguments.
pub struct ServiceProxy<T> {
    pub(crate) service_name: String,
    pub(crate) target_name: String,
    pub(crate) transport: T,
    pub(crate) bindings: HashMap<String, MethodBinding>,
    pub(crate) metrics: Option<Arc<ProxyMetrics>>,
}

impl<T: Transport> ServiceProxy<T> {
    /// Bind every method of `decl` with default options
    ///
    /// # Errors
    ///
    /// `Error::Bind` listing every malformed method.
    pub fn new(decl: &ServiceDecl, transport: T) -> Result<Self> {
        ProxyBuilder::new(decl, transport).build()
    }

    /// Start configuring a proxy for `decl`
    pub fn builder(decl: &ServiceDecl, transport: T) -> ProxyBuilder<'_, T> {
        ProxyBuilder::new(decl, transport)
    }

    /// Call a method and return its raw result
    ///
    /// # Errors
    ///
    /// - `Error::UnknownMethod` if `method` was not declared
    /// - `Error::ArgumentCount` if `arguments` does not match the declaration
    /// - `Error::Transport` if the transport failed
    pub fn call(&self, method: &str, arguments: Vec<Value>) -> Result<Option<Value>> {
        let binding = self.lookup(method)?;
        let start = Instant::now();

        let outcome = binding.execute(&self.transport, arguments);
        let duration = start.elapsed().as_secs_f64();

        if let Some(ref m) = self.metrics {
            match &outcome {
                Ok(response) if response.is_success() => m.record_call(method, "success", duration),
                Ok(response) => {
                    m.record_call(method, &format!("status_{}", response.status_code), duration)
                }
                Err(e) => {
                    m.record_call(method, "error", duration);
                    m.record_error(e.kind());
                }
            }
        }

        Ok(outcome?.result)
    }

    /// Call a method and deserialize its result
    ///
    /// A call that produced no result deserializes from `null`, so `R = ()`
    /// and `R = Option<_>` accept it.
    pub fn request<R>(&self, method: &str, arguments: Vec<Value>) -> Result<R>
    where
        R: DeserializeOwned,
    {
        let result = self.call(method, arguments)?.unwrap_or(Value::Null);
        serde_json::from_value(result).map_err(|e| {
            tracing::error!(method = %method, error = %e, "Failed to deserialize result");
            Error::Serialization(e.to_string())
        })
    }

    fn lookup(&self, method: &str) -> Result<&MethodBinding> {
        self.bindings.get(method).ok_or_else(|| {
            if let Some(ref m) = self.metrics {
                m.record_error("unknown_method");
            }
            Error::UnknownMethod(format!("{}.{}", self.service_name, method))
        })
    }
}

impl<T> ServiceProxy<T> {
    /// Binding for a declared method
    pub fn binding(&self, method: &str) -> Option<&MethodBinding> {
        self.bindings.get(method)
    }

    /// Names of all bound methods, sorted
    pub fn methods(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.bindings.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Target every call of this proxy is addressed to
    pub fn target_name(&self) -> &str {
        &self.target_name
    }

    /// Simple name of the declared service
    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    /// The underlying transport
    pub fn transport(&self) -> &T {
        &self.transport
    }
}

impl<T> std::fmt::Debug for ServiceProxy<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceProxy")
            .field("service_name", &self.service_name)
            .field("target_name", &self.target_name)
            .field("methods", &self.methods())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use relink_core::{transport, MethodDecl, ParamDecl, Response, TypeDecl};
    use serde_json::json;

    fn decl() -> ServiceDecl {
        ServiceDecl::new("Echo")
            .target("echo")
            .method(
                MethodDecl::new("say")
                    .operation("say")
                    .param(ParamDecl::new(TypeDecl::named("String")).named("text")),
            )
            .method(MethodDecl::new("clear").operation("clear"))
    }

    #[test]
    fn test_methods_sorted() {
        let proxy = ServiceProxy::new(&decl(), transport::from_fn(|_| Ok(Response::success(None))))
            .unwrap();
        assert_eq!(proxy.methods(), vec!["clear", "say"]);
        assert_eq!(proxy.target_name(), "echo");
        assert_eq!(proxy.service_name(), "Echo");
    }

    #[test]
    fn test_unknown_method() {
        let proxy = ServiceProxy::new(&decl(), transport::from_fn(|_| Ok(Response::success(None))))
            .unwrap();
        match proxy.call("shout", vec![]) {
            Err(Error::UnknownMethod(name)) => assert_eq!(name, "Echo.shout"),
            other => panic!("Expected UnknownMethod, got {:?}", other),
        }
    }

    #[test]
    fn test_request_unit_result() {
        let proxy = ServiceProxy::new(&decl(), transport::from_fn(|_| Ok(Response::success(None))))
            .unwrap();
        let () = proxy.request("clear", vec![]).unwrap();
    }

    #[test]
    fn test_request_type_mismatch() {
        let proxy = ServiceProxy::new(
            &decl(),
            transport::from_fn(|_| Ok(Response::success(Some(json!("not a number"))))),
        )
        .unwrap();
        let result: Result<i64> = proxy.request("say", vec![json!("hi")]);
        assert!(matches!(result, Err(Error::Serialization(_))));
    }
}
