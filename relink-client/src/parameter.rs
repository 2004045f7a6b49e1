//! Per-parameter argument handlers
//!
//! Each formal parameter of a bound method owns exactly one handler, chosen
//! once from the parameter's attributes while the binding is built. At call
//! time the handler turns the live argument into its tagged request entry;
//! there is no metadata left to inspect and nothing that can fail.

use relink_core::{Argument, ParamAttr};
use serde_json::Value;

/// How one parameter's argument is represented in a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParameterHandler {
    /// Send the value labelled with its declared name
    Named {
        /// Declared parameter name
        label: String,
        /// Erased declared type
        raw_type: String,
    },
    /// Send the value as a callback reference
    Callback {
        /// Erased declared type
        raw_type: String,
    },
}

impl ParameterHandler {
    /// Select a handler from a parameter's attributes
    ///
    /// The first recognized attribute wins; unrecognized ones are skipped.
    /// Returns `None` when no attribute is recognized.
    pub fn from_attrs(attrs: &[ParamAttr], raw_type: &str) -> Option<Self> {
        attrs.iter().find_map(|attr| match attr {
            ParamAttr::Name(label) => Some(ParameterHandler::Named {
                label: label.clone(),
                raw_type: raw_type.to_string(),
            }),
            ParamAttr::Callback => Some(ParameterHandler::Callback {
                raw_type: raw_type.to_string(),
            }),
            ParamAttr::Other(_) => None,
        })
    }

    /// Turn a live argument into its request entry
    ///
    /// The value itself is never transformed, only tagged.
    pub fn apply(&self, value: Value) -> Argument {
        match self {
            ParameterHandler::Named { label, raw_type } => {
                Argument::named(label.clone(), raw_type.clone(), value)
            }
            ParameterHandler::Callback { raw_type } => Argument::callback(raw_type.clone(), value),
        }
    }

    /// Erased declared type of the parameter
    pub fn raw_type(&self) -> &str {
        match self {
            ParameterHandler::Named { raw_type, .. } | ParameterHandler::Callback { raw_type } => {
                raw_type
            }
        }
    }

    /// Check if this handler produces callback references
    pub fn is_callback(&self) -> bool {
        matches!(self, ParameterHandler::Callback { .. })
    }
}
