//! Static declarations of remote services
//!
//! A declaration is the metadata a binding is built from: the service's
//! type-level attributes, and per method its own attributes plus, per
//! parameter, the declared type and the attributes attached to it. Nothing
//! here is introspected at runtime; tables are written out by hand or
//! generated by `#[relink::service]`, and read exactly once when a proxy is
//! built.
//!
//! Attributes are kept as lists rather than pre-resolved fields so the binding
//! builder can apply its own rules to them (first recognized parameter
//! attribute wins, duplicate operation names are policed, unknown attributes
//! are reported).
//!
//! # Examples
//!
//! ```rust
//! use relink_core::{MethodDecl, ParamDecl, ServiceDecl, TypeDecl};
//!
//! let decl = ServiceDecl::new("Calculator")
//!     .target("calculator")
//!     .method(
//!         MethodDecl::new("add")
//!             .operation("add")
//!             .param(ParamDecl::new(TypeDecl::named("i32")).named("a"))
//!             .param(ParamDecl::new(TypeDecl::named("i32")).named("b")),
//!     );
//!
//! assert_eq!(decl.target_name(), Some("calculator"));
//! assert_eq!(decl.methods[0].params.len(), 2);
//! ```

use std::fmt;

/// Declared type of a parameter
///
/// Only concrete types can be bound. A type variable or wildcard, anywhere in
/// the type, cannot be resolved without a live instance and makes the
/// declaration unbindable.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeDecl {
    /// A plain concrete type, such as `i32` or `String`
    Named(String),
    /// A concrete type applied to type arguments, such as `Vec<String>`
    Generic {
        /// Type constructor name
        raw: String,
        /// Type arguments in declared order
        args: Vec<TypeDecl>,
    },
    /// A sequence of the element type
    Array(Box<TypeDecl>),
    /// A type variable bound by the trait or the method
    Variable(String),
    /// A wildcard or an opaque type (`impl Trait`, `_`)
    Wildcard,
}

impl TypeDecl {
    /// Create a plain concrete type
    pub fn named(name: impl Into<String>) -> Self {
        TypeDecl::Named(name.into())
    }

    /// Create a concrete type applied to type arguments
    pub fn generic(raw: impl Into<String>, args: Vec<TypeDecl>) -> Self {
        TypeDecl::Generic {
            raw: raw.into(),
            args,
        }
    }

    /// Create a sequence type
    pub fn array(element: TypeDecl) -> Self {
        TypeDecl::Array(Box::new(element))
    }

    /// Create a type variable
    pub fn variable(name: impl Into<String>) -> Self {
        TypeDecl::Variable(name.into())
    }

    /// Check that no type variable or wildcard occurs anywhere in the type
    pub fn is_resolvable(&self) -> bool {
        match self {
            TypeDecl::Named(_) => true,
            TypeDecl::Generic { args, .. } => args.iter().all(TypeDecl::is_resolvable),
            TypeDecl::Array(element) => element.is_resolvable(),
            TypeDecl::Variable(_) | TypeDecl::Wildcard => false,
        }
    }

    /// Erased type name: type arguments are dropped, sequences keep their element
    ///
    /// ```rust
    /// use relink_core::TypeDecl;
    ///
    /// let ty = TypeDecl::generic("HashMap", vec![TypeDecl::named("String"), TypeDecl::named("u32")]);
    /// assert_eq!(ty.raw_type(), "HashMap");
    /// assert_eq!(TypeDecl::array(ty).raw_type(), "[HashMap]");
    /// ```
    pub fn raw_type(&self) -> String {
        match self {
            TypeDecl::Named(name) => name.clone(),
            TypeDecl::Generic { raw, .. } => raw.clone(),
            TypeDecl::Array(element) => format!("[{}]", element.raw_type()),
            TypeDecl::Variable(name) => name.clone(),
            TypeDecl::Wildcard => "?".to_string(),
        }
    }
}

impl fmt::Display for TypeDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeDecl::Named(name) | TypeDecl::Variable(name) => write!(f, "{}", name),
            TypeDecl::Generic { raw, args } => {
                write!(f, "{}<", raw)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                write!(f, ">")
            }
            TypeDecl::Array(element) => write!(f, "[{}]", element),
            TypeDecl::Wildcard => write!(f, "?"),
        }
    }
}

/// Attribute attached to a service declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceAttr {
    /// Remote target the service's calls are addressed to
    Target(String),
    /// Any attribute relink does not interpret
    Other(String),
}

/// Attribute attached to a method declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MethodAttr {
    /// Remote operation name for the method
    Operation(String),
    /// Any attribute relink does not interpret
    Other(String),
}

/// Attribute attached to a parameter declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamAttr {
    /// The argument is sent as a value labelled with this name
    Name(String),
    /// The argument is a reference the remote side calls back into
    Callback,
    /// Any attribute relink does not interpret
    Other(String),
}

/// Declaration of one formal parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamDecl {
    /// Declared type
    pub ty: TypeDecl,
    /// Attributes in declaration order
    pub attrs: Vec<ParamAttr>,
}

impl ParamDecl {
    /// Create a parameter with no attributes
    pub fn new(ty: TypeDecl) -> Self {
        Self {
            ty,
            attrs: Vec::new(),
        }
    }

    /// Attach a parameter-name attribute
    pub fn named(self, label: impl Into<String>) -> Self {
        self.attr(ParamAttr::Name(label.into()))
    }

    /// Attach a callback attribute
    pub fn callback(self) -> Self {
        self.attr(ParamAttr::Callback)
    }

    /// Attach any attribute
    pub fn attr(mut self, attr: ParamAttr) -> Self {
        self.attrs.push(attr);
        self
    }
}

/// Declaration of one interface method
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDecl {
    /// Method name as declared on the interface
    pub name: String,
    /// Method-level attributes in declaration order
    pub attrs: Vec<MethodAttr>,
    /// Formal parameters, left to right, excluding the receiver
    pub params: Vec<ParamDecl>,
}

impl MethodDecl {
    /// Create a method with no attributes and no parameters
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attrs: Vec::new(),
            params: Vec::new(),
        }
    }

    /// Attach an operation-name attribute
    pub fn operation(self, name: impl Into<String>) -> Self {
        self.attr(MethodAttr::Operation(name.into()))
    }

    /// Attach any attribute
    pub fn attr(mut self, attr: MethodAttr) -> Self {
        self.attrs.push(attr);
        self
    }

    /// Append a parameter
    pub fn param(mut self, param: ParamDecl) -> Self {
        self.params.push(param);
        self
    }
}

/// Declaration of a remote service interface
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceDecl {
    /// Simple name of the declaring type, used in error messages
    pub name: String,
    /// Type-level attributes in declaration order
    pub attrs: Vec<ServiceAttr>,
    /// Methods in declaration order
    pub methods: Vec<MethodDecl>,
}

impl ServiceDecl {
    /// Create an empty service declaration
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attrs: Vec::new(),
            methods: Vec::new(),
        }
    }

    /// Attach a target attribute
    pub fn target(self, name: impl Into<String>) -> Self {
        self.attr(ServiceAttr::Target(name.into()))
    }

    /// Attach any attribute
    pub fn attr(mut self, attr: ServiceAttr) -> Self {
        self.attrs.push(attr);
        self
    }

    /// Append a method
    pub fn method(mut self, method: MethodDecl) -> Self {
        self.methods.push(method);
        self
    }

    /// The service's target name; the first target attribute wins
    pub fn target_name(&self) -> Option<&str> {
        self.attrs.iter().find_map(|attr| match attr {
            ServiceAttr::Target(name) => Some(name.as_str()),
            ServiceAttr::Other(_) => None,
        })
    }

    /// Look up a method declaration by name
    pub fn find_method(&self, name: &str) -> Option<&MethodDecl> {
        self.methods.iter().find(|m| m.name == name)
    }
}
