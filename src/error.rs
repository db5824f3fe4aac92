//! Structured failures raised at a guarded call boundary.
use serde::Serialize;
use thiserror::Error;

use crate::descriptor::Descriptor;
use crate::value::Value;

/// Marker used in place of a parameter name for return-value failures.
pub const RETURN_VALUE: &str = "return value";

/// Observed type reported for a declared parameter that was never bound.
pub const MISSING: &str = "missing";

/// A named argument failed its descriptor (after coercion, if requested).
#[derive(Debug, Error, Clone, PartialEq, Serialize)]
#[error("{message}")]
pub struct InputTypeError {
    pub name: String,
    pub observed: &'static str,
    pub expected: String,
    pub message: String,
}

/// A return value failed its descriptor (after coercion, if requested).
#[derive(Debug, Error, Clone, PartialEq, Serialize)]
#[error("{message}")]
pub struct ReturnTypeError {
    /// Always [`RETURN_VALUE`].
    pub name: &'static str,
    pub observed: &'static str,
    pub expected: String,
    pub message: String,
}

#[derive(Debug, Error, Clone, PartialEq, Serialize)]
#[serde(tag = "kind")]
pub enum TypeCheckError {
    #[error(transparent)]
    Input(#[from] InputTypeError),
    #[error(transparent)]
    Return(#[from] ReturnTypeError),
}

impl InputTypeError {
    pub fn new(name: &str, value: &Value, expected: &Descriptor) -> Self {
        Self {
            name: name.to_string(),
            observed: value.type_name(),
            expected: expected.to_string(),
            message: format!("Argument `{name}` is not of type `{expected}`."),
        }
    }

    /// A declared parameter with no bound argument.
    pub fn missing(name: &str, expected: &Descriptor) -> Self {
        Self {
            name: name.to_string(),
            observed: MISSING,
            expected: expected.to_string(),
            message: format!("Argument `{name}` is missing, expected `{expected}`."),
        }
    }
}

impl ReturnTypeError {
    pub fn new(value: &Value, expected: &Descriptor) -> Self {
        Self {
            name: RETURN_VALUE,
            observed: value.type_name(),
            expected: expected.to_string(),
            message: format!("Return value is not of type `{expected}`."),
        }
    }
}

impl TypeCheckError {
    /// Offending parameter name, or [`RETURN_VALUE`].
    pub fn name(&self) -> &str {
        match self {
            TypeCheckError::Input(e) => &e.name,
            TypeCheckError::Return(e) => e.name,
        }
    }

    pub fn observed(&self) -> &'static str {
        match self {
            TypeCheckError::Input(e) => e.observed,
            TypeCheckError::Return(e) => e.observed,
        }
    }

    pub fn expected(&self) -> &str {
        match self {
            TypeCheckError::Input(e) => &e.expected,
            TypeCheckError::Return(e) => &e.expected,
        }
    }
}
