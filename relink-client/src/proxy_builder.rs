//! Proxy builder for configuring binding and observability options
//!
//! The `ProxyBuilder` binds every method of a service declaration at once.
//! It allows you to:
//! - Choose how repeated operation-name attributes are handled
//! - Configure observability (OpenTelemetry)
//! - Set the service name for telemetry
//!
//! # Examples
//!
//! ```rust
//! use relink_client::{DuplicatePolicy, ProxyBuilder};
//! use relink_core::{transport, MethodDecl, Response, ServiceDecl};
//!
//! let decl = ServiceDecl::new("Clock")
//!     .target("clock")
//!     .method(MethodDecl::new("now").operation("now").operation("time"));
//!
//! let proxy = ProxyBuilder::new(&decl, transport::from_fn(|_| Ok(Response::success(None))))
//!     .duplicate_operation(DuplicatePolicy::LastWins)
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(proxy.binding("now").unwrap().operation_name(), "time");
//! ```

use crate::binding::{BindOptions, DuplicatePolicy, MethodBinding};
use crate::{ProxyMetrics, ServiceProxy};
use relink_core::{BindError, BindErrors, Error, ObservabilityConfig, Result, ServiceDecl, Transport};
use std::collections::HashMap;
use std::sync::Arc;

/// Builder for configuring and creating a ServiceProxy
pub struct ProxyBuilder<'a, T> {
    decl: &'a ServiceDecl,
    transport: T,
    options: BindOptions,
    observability_config: Option<ObservabilityConfig>,
    service_name: Option<String>,
}

impl<'a, T: Transport> ProxyBuilder<'a, T> {
    /// Create a new proxy builder
    pub fn new(decl: &'a ServiceDecl, transport: T) -> Self {
        Self {
            decl,
            transport,
            options: BindOptions::default(),
            observability_config: None,
            service_name: None,
        }
    }

    /// Replace the bind options
    pub fn bind_options(mut self, options: BindOptions) -> Self {
        self.options = options;
        self
    }

    /// Set the policy for repeated operation-name attributes
    pub fn duplicate_operation(mut self, policy: DuplicatePolicy) -> Self {
        self.options.duplicate_operation = policy;
        self
    }

    /// Enable OpenTelemetry observability with custom configuration
    pub fn with_observability(mut self, config: ObservabilityConfig) -> Self {
        self.observability_config = Some(config);
        self
    }

    /// Enable OpenTelemetry observability with default configuration
    pub fn with_default_observability(mut self) -> Self {
        self.observability_config = Some(ObservabilityConfig::default());
        self
    }

    /// Set service name for observability (used if observability is enabled)
    pub fn service_name(mut self, name: impl Into<String>) -> Self {
        self.service_name = Some(name.into());
        self
    }

    /// Bind every declared method and build the proxy
    ///
    /// # Errors
    ///
    /// - `Error::Bind` with one entry per malformed method, in declaration order
    /// - `Error::Internal` if observability could not be initialized
    pub fn build(self) -> Result<ServiceProxy<T>> {
        let bindings = self.bind_all()?;

        // Initialize observability if configured
        let metrics = if let Some(mut config) = self.observability_config {
            if let Some(name) = self.service_name {
                config.service_name = name;
            }

            relink_core::init_observability(config.clone())
                .map_err(|e| Error::Internal(format!("Failed to initialize observability: {}", e)))?;

            Some(Arc::new(ProxyMetrics::new(&config.service_name)))
        } else {
            None
        };

        if let Some(ref m) = metrics {
            m.record_bindings(bindings.len());
        }

        let target_name = self.decl.target_name().unwrap_or_default().to_string();
        tracing::info!(
            service = %self.decl.name,
            target = %target_name,
            methods = bindings.len(),
            "Service proxy created"
        );

        Ok(ServiceProxy {
            service_name: self.decl.name.clone(),
            target_name,
            transport: self.transport,
            bindings,
            metrics,
        })
    }

    fn bind_all(&self) -> Result<HashMap<String, MethodBinding>> {
        let mut bindings = HashMap::with_capacity(self.decl.methods.len());
        let mut errors = BindErrors::new();

        for method in &self.decl.methods {
            if bindings.contains_key(&method.name) {
                errors.push(BindError::method(
                    &self.decl.name,
                    &method.name,
                    "Duplicate method declaration",
                ));
                continue;
            }

            match MethodBinding::builder(self.decl, method)
                .options(self.options)
                .build()
            {
                Ok(binding) => {
                    bindings.insert(method.name.clone(), binding);
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to bind method");
                    errors.push(e);
                }
            }
        }

        if errors.is_empty() {
            Ok(bindings)
        } else {
            Err(Error::Bind(errors))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use relink_core::{transport, MethodDecl, ParamDecl, Response, TypeDecl};

    fn noop() -> impl Transport {
        transport::from_fn(|_| Ok(Response::success(None)))
    }

    #[test]
    fn test_builder_creation() {
        let decl = ServiceDecl::new("Clock");
        let builder = ProxyBuilder::new(&decl, noop());
        assert_eq!(builder.options, BindOptions::default());
        assert!(builder.observability_config.is_none());
        assert!(builder.service_name.is_none());
    }

    #[test]
    fn test_builder_with_duplicate_policy() {
        let decl = ServiceDecl::new("Clock");
        let builder = ProxyBuilder::new(&decl, noop()).duplicate_operation(DuplicatePolicy::FirstWins);
        assert_eq!(builder.options.duplicate_operation, DuplicatePolicy::FirstWins);
    }

    #[test]
    fn test_builder_with_observability() {
        let decl = ServiceDecl::new("Clock");
        let builder = ProxyBuilder::new(&decl, noop())
            .with_default_observability()
            .service_name("clock-proxy");
        assert!(builder.observability_config.is_some());
        assert_eq!(builder.service_name.as_deref(), Some("clock-proxy"));
    }

    #[test]
    fn test_build_with_export_outside_runtime_fails() {
        let decl = ServiceDecl::new("Clock").method(MethodDecl::new("now"));
        let config = ObservabilityConfig::new("clock-proxy")
            .with_metrics(false)
            .with_logs(false);

        match ProxyBuilder::new(&decl, noop()).with_observability(config).build() {
            Err(Error::Internal(msg)) => {
                assert_eq!(
                    msg,
                    "Failed to initialize observability: OTLP export requires a Tokio runtime"
                );
            }
            other => panic!("Expected Internal error, got {:?}", other.map(|p| p.methods().len())),
        }
    }

    #[test]
    fn test_build_collects_all_errors() {
        let decl = ServiceDecl::new("Broken")
            .method(MethodDecl::new("a").param(ParamDecl::new(TypeDecl::named("i32"))))
            .method(MethodDecl::new("ok"))
            .method(MethodDecl::new("b").operation("x").operation("y"));

        match ProxyBuilder::new(&decl, noop()).build() {
            Err(Error::Bind(errors)) => {
                assert_eq!(errors.len(), 2);
                let methods: Vec<_> = errors.iter().map(|e| e.method_name.as_str()).collect();
                assert_eq!(methods, vec!["a", "b"]);
            }
            other => panic!("Expected Bind error, got {:?}", other.map(|p| p.methods().len())),
        }
    }

    #[test]
    fn test_duplicate_method_declaration() {
        let decl = ServiceDecl::new("Twice")
            .method(MethodDecl::new("get"))
            .method(MethodDecl::new("get"));

        let error = ProxyBuilder::new(&decl, noop()).build().unwrap_err();
        assert!(error.is_bind());
        assert!(error.to_string().contains("Duplicate method declaration"));
    }
}
