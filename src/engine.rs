//! Validation engine.
//!
//! `is_type` walks a descriptor tree top-down against a value and answers
//! pass/fail. It is pure and re-entrant: no state lives outside the call, so
//! one descriptor can be shared by any number of threads.
//!
//! Nominal rules:
//! - `bool` is its own type. It does **not** satisfy `int`, `float` or
//!   `Number`.
//! - `Number` is the abstract numeric interface and admits `int` and `float`,
//!   so `All(Number, int)` accepts exactly what `int` accepts.
//! - `object` admits every value.
//! - `Iterable` admits `str`, `list`, `tuple`, `set` and `dict`.
pub mod mismatch;

use crate::descriptor::{ContainerKind, Descriptor, Primitive};
use crate::value::Value;

pub use mismatch::{find_mismatch, Mismatch, PathSegment};

// ------------------------------ Primitive --------------------------------- //

impl Primitive {
    /// Nominal is-instance check.
    pub fn is_instance(self, v: &Value) -> bool {
        match self {
            Primitive::Object   => true,
            Primitive::NoneType => matches!(v, Value::None),
            Primitive::Bool     => matches!(v, Value::Bool(_)),
            Primitive::Int      => matches!(v, Value::Int(_)),
            Primitive::Float    => matches!(v, Value::Float(_)),
            Primitive::Number   => matches!(v, Value::Int(_) | Value::Float(_)),
            Primitive::Str      => matches!(v, Value::Str(_)),
            Primitive::List     => matches!(v, Value::List(_)),
            Primitive::Tuple    => matches!(v, Value::Tuple(_)),
            Primitive::Set      => matches!(v, Value::Set(_)),
            Primitive::Dict     => matches!(v, Value::Dict(_)),
            Primitive::Iterable => v.is_iterable(),
        }
    }
}

impl ContainerKind {
    /// Does `v`'s concrete container satisfy this constraint?
    pub fn admits(self, v: &Value) -> bool {
        match self {
            ContainerKind::Any => v.is_iterable(),
            kind => v.container_kind() == Some(kind),
        }
    }
}

// -------------------------------- Engine ---------------------------------- //

/// Does `value` conform to `descriptor`?
pub fn is_type(value: &Value, descriptor: &Descriptor) -> bool {
    match descriptor {
        Descriptor::Primitive(p) => p.is_instance(value),
        Descriptor::AnyOf(ts) => ts.iter().any(|t| is_type(value, t)),
        Descriptor::AllOf(ts) => ts.iter().all(|t| is_type(value, t)),
        Descriptor::DictOf { key, value: value_t } => match value.as_dict() {
            Some(m) => {
                m.keys().all(|k| is_type(k, key))
                    && m.values().all(|v| is_type(v, value_t))
            }
            None => false,
        },
        Descriptor::IterableOf { item, kind } => {
            if !kind.admits(value) { return false; }
            match value.elements() {
                Some(mut elems) => elems.all(|e| is_type(e.get(), item)),
                None => false,
            }
        }
    }
}

// ------------------------------- Tests ------------------------------------ //
