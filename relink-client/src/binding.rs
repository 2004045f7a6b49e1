//! Method bindings
//!
//! A `MethodBinding` is the immutable, pre-validated shape of one interface
//! method: where its calls go (`target_name`, `operation_name`) and how each
//! argument is tagged (`parameter_handlers`). It is built once from the
//! method's declaration and then invoked any number of times, from any
//! number of threads.
//!
//! # Construction
//!
//! `BindingBuilder::build` runs these checks, and nothing else may fail later
//! except the argument count and the transport itself:
//!
//! 1. The target name is read from the service declaration (first wins,
//!    empty if absent)
//! 2. The operation name is read from the method's attributes (empty if
//!    absent; duplicates are handled by `DuplicatePolicy`)
//! 3. Each parameter, left to right, must have a resolvable type, at least one
//!    attribute, and a recognized attribute to select its handler
//!
//! # Invocation
//!
//! 1. The argument count is checked against the handler count
//! 2. Handlers run in parameter order, each tagging its own argument
//! 3. The request goes to the transport; its result is returned, and a
//!    transport failure comes back as `Error::Transport`
//!
//! # Examples
//!
//! ```rust
//! use relink_client::MethodBinding;
//! use relink_core::{transport, MethodDecl, ParamDecl, Response, ServiceDecl, TypeDecl};
//! use serde_json::json;
//!
//! let service = ServiceDecl::new("Calculator").target("calculator");
//! let method = MethodDecl::new("add")
//!     .operation("add")
//!     .param(ParamDecl::new(TypeDecl::named("i32")).named("a"))
//!     .param(ParamDecl::new(TypeDecl::named("i32")).named("b"));
//!
//! let binding = MethodBinding::builder(&service, &method).build().unwrap();
//!
//! let adder = transport::from_fn(|request| {
//!     let sum: i64 = request.arguments.iter().filter_map(|a| a.value().as_i64()).sum();
//!     Ok(Response::success(Some(json!(sum))))
//! });
//!
//! let result = binding.invoke(&adder, vec![json!(2), json!(3)]).unwrap();
//! assert_eq!(result, Some(json!(5)));
//! ```

use crate::parameter::ParameterHandler;
use relink_core::{
    BindError, Error, MethodAttr, MethodDecl, Request, Response, Result, ServiceDecl, Transport,
};
use serde_json::Value;

/// What to do when a method carries more than one operation-name attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicatePolicy {
    /// Fail the binding if the names differ (identical repeats are accepted)
    #[default]
    Reject,
    /// Keep the first name in declaration order
    FirstWins,
    /// Keep the last name in declaration order
    LastWins,
}

/// Options applied while building bindings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BindOptions {
    /// Policy for repeated operation-name attributes
    pub duplicate_operation: DuplicatePolicy,
}

impl BindOptions {
    /// Create the default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the duplicate operation-name policy
    pub fn with_duplicate_operation(mut self, policy: DuplicatePolicy) -> Self {
        self.duplicate_operation = policy;
        self
    }
}

/// Immutable call descriptor for one interface method
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodBinding {
    type_name: String,
    method_name: String,
    target_name: String,
    operation_name: String,
    parameter_handlers: Vec<ParameterHandler>,
}

impl MethodBinding {
    /// Start building a binding for `method`, declared on `service`
    pub fn builder<'a>(service: &'a ServiceDecl, method: &'a MethodDecl) -> BindingBuilder<'a> {
        BindingBuilder::new(service, method)
    }

    /// Simple name of the declaring service
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Name of the bound method
    pub fn method_name(&self) -> &str {
        &self.method_name
    }

    /// Remote target; empty when the service declares none
    pub fn target_name(&self) -> &str {
        &self.target_name
    }

    /// Remote operation; empty when the method declares none
    pub fn operation_name(&self) -> &str {
        &self.operation_name
    }

    /// Handlers in declared parameter order
    pub fn parameter_handlers(&self) -> &[ParameterHandler] {
        &self.parameter_handlers
    }

    /// Number of declared parameters
    pub fn parameter_count(&self) -> usize {
        self.parameter_handlers.len()
    }

    /// Build the request for one call without sending it
    ///
    /// # Errors
    ///
    /// `Error::ArgumentCount` if `arguments` does not have exactly one entry
    /// per declared parameter. No handler runs in that case.
    pub fn request(&self, arguments: Vec<Value>) -> Result<Request> {
        let expected = self.parameter_handlers.len();
        if arguments.len() != expected {
            return Err(Error::ArgumentCount {
                expected,
                actual: arguments.len(),
            });
        }

        let arguments = self
            .parameter_handlers
            .iter()
            .zip(arguments)
            .map(|(handler, value)| handler.apply(value))
            .collect();

        Ok(Request::new(
            self.target_name.clone(),
            self.operation_name.clone(),
            arguments,
        ))
    }

    /// Run one call and return the transport's full response
    ///
    /// Use this when the status code matters to the caller; `invoke` is the
    /// usual entry point.
    #[tracing::instrument(
        name = "relink.invoke",
        skip(self, transport, arguments),
        fields(target = %self.target_name, operation = %self.operation_name)
    )]
    pub fn execute<T>(&self, transport: &T, arguments: Vec<Value>) -> Result<Response>
    where
        T: Transport + ?Sized,
    {
        let request = self.request(arguments)?;

        let response = match transport.execute(request) {
            Ok(response) => response,
            Err(error) => {
                tracing::error!(
                    method = %self.method_name,
                    error = %error,
                    "Transport failed to deliver call"
                );
                return Err(Error::Transport(error));
            }
        };

        if response.is_success() {
            tracing::debug!(
                code = response.status_code,
                msg = %response.status_message,
                "Response from remote"
            );
        } else {
            tracing::warn!(
                code = response.status_code,
                msg = %response.status_message,
                "Remote reported non-success status"
            );
        }

        Ok(response)
    }

    /// Run one call and return its result
    ///
    /// `Ok(None)` means the remote operation produced no value. A failed
    /// transport is always an `Err`, never an empty result.
    pub fn invoke<T>(&self, transport: &T, arguments: Vec<Value>) -> Result<Option<Value>>
    where
        T: Transport + ?Sized,
    {
        Ok(self.execute(transport, arguments)?.result)
    }
}

/// Validates one method declaration and produces its `MethodBinding`
pub struct BindingBuilder<'a> {
    service: &'a ServiceDecl,
    method: &'a MethodDecl,
    options: BindOptions,
}

impl<'a> BindingBuilder<'a> {
    /// Create a builder for `method`, declared on `service`
    pub fn new(service: &'a ServiceDecl, method: &'a MethodDecl) -> Self {
        Self {
            service,
            method,
            options: BindOptions::default(),
        }
    }

    /// Replace the bind options
    pub fn options(mut self, options: BindOptions) -> Self {
        self.options = options;
        self
    }

    /// Validate the declaration and build the binding
    ///
    /// Parameters are checked left to right; the first malformed one is
    /// reported with its 1-based index.
    pub fn build(self) -> std::result::Result<MethodBinding, BindError> {
        let target_name = self.service.target_name().unwrap_or_default().to_string();
        let operation_name = self.parse_operation_name()?;

        let mut parameter_handlers = Vec::with_capacity(self.method.params.len());
        for (p, param) in self.method.params.iter().enumerate() {
            if !param.ty.is_resolvable() {
                return Err(self.parameter_error(
                    p,
                    format!(
                        "Parameter type must not include a type variable or wildcard: {}",
                        param.ty
                    ),
                ));
            }

            if param.attrs.is_empty() {
                return Err(self.parameter_error(p, "No parameter annotation found."));
            }

            let handler = ParameterHandler::from_attrs(&param.attrs, &param.ty.raw_type())
                .ok_or_else(|| self.parameter_error(p, "No supported annotation found."))?;
            parameter_handlers.push(handler);
        }

        tracing::debug!(
            service = %self.service.name,
            method = %self.method.name,
            target = %target_name,
            operation = %operation_name,
            parameters = parameter_handlers.len(),
            "Method bound"
        );

        Ok(MethodBinding {
            type_name: self.service.name.clone(),
            method_name: self.method.name.clone(),
            target_name,
            operation_name,
            parameter_handlers,
        })
    }

    fn parse_operation_name(&self) -> std::result::Result<String, BindError> {
        let mut names = self.method.attrs.iter().filter_map(|attr| match attr {
            MethodAttr::Operation(name) => Some(name.as_str()),
            MethodAttr::Other(_) => None,
        });

        let name = match self.options.duplicate_operation {
            DuplicatePolicy::FirstWins => names.next(),
            DuplicatePolicy::LastWins => names.last(),
            DuplicatePolicy::Reject => {
                let first = names.next();
                if let Some(first) = first {
                    if let Some(other) = names.find(|name| *name != first) {
                        return Err(self.method_error(format!(
                            "Conflicting operation names: \"{}\" and \"{}\"",
                            first, other
                        )));
                    }
                }
                first
            }
        };

        Ok(name.unwrap_or_default().to_string())
    }

    fn method_error(&self, message: impl Into<String>) -> BindError {
        BindError::method(&self.service.name, &self.method.name, message)
    }

    fn parameter_error(&self, p: usize, message: impl Into<String>) -> BindError {
        BindError::parameter(&self.service.name, &self.method.name, p, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use relink_core::{ParamAttr, ParamDecl, TypeDecl};
    use serde_json::json;

    fn service() -> ServiceDecl {
        ServiceDecl::new("Settings").target("settings")
    }

    fn int_param(label: &str) -> ParamDecl {
        ParamDecl::new(TypeDecl::named("i32")).named(label)
    }

    #[test]
    fn test_build_reads_names() {
        let method = MethodDecl::new("get").operation("getValue").param(int_param("key"));
        let binding = MethodBinding::builder(&service(), &method).build().unwrap();

        assert_eq!(binding.target_name(), "settings");
        assert_eq!(binding.operation_name(), "getValue");
        assert_eq!(binding.type_name(), "Settings");
        assert_eq!(binding.method_name(), "get");
        assert_eq!(binding.parameter_count(), 1);
    }

    #[test]
    fn test_names_default_to_empty() {
        let method = MethodDecl::new("ping");
        let binding = MethodBinding::builder(&ServiceDecl::new("Bare"), &method)
            .build()
            .unwrap();
        assert_eq!(binding.target_name(), "");
        assert_eq!(binding.operation_name(), "");
    }

    #[test]
    fn test_generic_type_is_erased() {
        let method = MethodDecl::new("put").param(
            ParamDecl::new(TypeDecl::generic("Vec", vec![TypeDecl::named("String")])).named("keys"),
        );
        let binding = MethodBinding::builder(&service(), &method).build().unwrap();
        assert_eq!(binding.parameter_handlers()[0].raw_type(), "Vec");
    }

    #[test]
    fn test_unresolvable_type_fails_with_index() {
        let method = MethodDecl::new("put")
            .param(int_param("key"))
            .param(ParamDecl::new(TypeDecl::generic("Vec", vec![TypeDecl::variable("T")])).named("v"));
        let error = MethodBinding::builder(&service(), &method).build().unwrap_err();

        assert_eq!(error.parameter, Some(2));
        assert_eq!(
            error.message,
            "Parameter type must not include a type variable or wildcard: Vec<T> (parameter #2)"
        );
        assert_eq!(error.method_name, "put");
    }

    #[test]
    fn test_type_checked_before_annotations() {
        let method = MethodDecl::new("put").param(ParamDecl::new(TypeDecl::Wildcard));
        let error = MethodBinding::builder(&service(), &method).build().unwrap_err();
        assert!(error.message.starts_with("Parameter type must not include"));
    }

    #[test]
    fn test_missing_annotation_fails() {
        let method = MethodDecl::new("put").param(ParamDecl::new(TypeDecl::named("i32")));
        let error = MethodBinding::builder(&service(), &method).build().unwrap_err();
        assert_eq!(error.message, "No parameter annotation found. (parameter #1)");
    }

    #[test]
    fn test_unrecognized_annotation_fails() {
        let method = MethodDecl::new("put")
            .param(int_param("a"))
            .param(int_param("b"))
            .param(ParamDecl::new(TypeDecl::named("i32")).attr(ParamAttr::Other("doc".into())));
        let error = MethodBinding::builder(&service(), &method).build().unwrap_err();
        assert_eq!(error.message, "No supported annotation found. (parameter #3)");
        assert!(error.to_string().ends_with("for method Settings.put"));
    }

    #[test]
    fn test_conflicting_operation_names_rejected_by_default() {
        let method = MethodDecl::new("get").operation("a").operation("b");
        let error = MethodBinding::builder(&service(), &method).build().unwrap_err();
        assert_eq!(error.message, "Conflicting operation names: \"a\" and \"b\"");
        assert!(error.parameter.is_none());
    }

    #[test]
    fn test_identical_operation_names_accepted() {
        let method = MethodDecl::new("get").operation("a").operation("a");
        let binding = MethodBinding::builder(&service(), &method).build().unwrap();
        assert_eq!(binding.operation_name(), "a");
    }

    #[test]
    fn test_duplicate_policies() {
        let method = MethodDecl::new("get").operation("a").operation("b");

        let first = MethodBinding::builder(&service(), &method)
            .options(BindOptions::new().with_duplicate_operation(DuplicatePolicy::FirstWins))
            .build()
            .unwrap();
        assert_eq!(first.operation_name(), "a");

        let last = MethodBinding::builder(&service(), &method)
            .options(BindOptions::new().with_duplicate_operation(DuplicatePolicy::LastWins))
            .build()
            .unwrap();
        assert_eq!(last.operation_name(), "b");
    }

    #[test]
    fn test_request_tags_in_order() {
        let method = MethodDecl::new("watch")
            .param(int_param("key"))
            .param(ParamDecl::new(TypeDecl::named("Listener")).callback());
        let binding = MethodBinding::builder(&service(), &method).build().unwrap();

        let request = binding.request(vec![json!(1), json!("cb-9")]).unwrap();
        assert_eq!(request.target_name, "settings");
        assert_eq!(request.operation_name, "");
        assert_eq!(
            request.arguments,
            vec![
                relink_core::Argument::named("key", "i32", json!(1)),
                relink_core::Argument::callback("Listener", json!("cb-9")),
            ]
        );
    }

    #[test]
    fn test_request_rejects_wrong_count() {
        let method = MethodDecl::new("get").param(int_param("key"));
        let binding = MethodBinding::builder(&service(), &method).build().unwrap();

        match binding.request(vec![]) {
            Err(Error::ArgumentCount { expected, actual }) => {
                assert_eq!(expected, 1);
                assert_eq!(actual, 0);
            }
            other => panic!("Expected ArgumentCount error, got {:?}", other),
        }
    }
}
