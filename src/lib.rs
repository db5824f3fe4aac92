//! Runtime type checking for dynamic values.
//!
//! Build a [`Descriptor`] once, then ask [`is_type`] whether values conform.
//! At function boundaries, [`Accepts`] / [`Returns`] turn a failed check into
//! an [`InputTypeError`] / [`ReturnTypeError`], optionally coercing first.
pub mod value;
pub mod descriptor;
pub mod engine;
pub mod coerce;
pub mod error;
pub mod guard;
pub mod path_de;
pub mod cli;

pub use descriptor::{ContainerKind, Descriptor, DescriptorError, Primitive};
pub use engine::{find_mismatch, is_type, Mismatch, PathSegment};
pub use error::{InputTypeError, ReturnTypeError, TypeCheckError, MISSING, RETURN_VALUE};
pub use guard::{Accepts, Arguments, Guarded, Returns};
pub use value::Value;
