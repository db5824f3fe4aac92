//! Dynamic value tree checked by the engine.
//!
//! Values are owned and totally ordered (floats go through `OrderedFloat`)
//! so that any value can sit inside a `Set` or be used as a `Dict` key.
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use ordered_float::OrderedFloat;
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::descriptor::ContainerKind;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Value {
    None,
    Bool(bool),
    Int(i64),
    Float(OrderedFloat<f64>),
    Str(String),
    List(Vec<Value>),
    Tuple(Vec<Value>),
    Set(BTreeSet<Value>),
    Dict(BTreeMap<Value, Value>),
}

impl Value {
    pub fn float(f: f64) -> Self { Value::Float(OrderedFloat(f)) }

    /// Runtime type name, as reported in diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::None     => "NoneType",
            Value::Bool(_)  => "bool",
            Value::Int(_)   => "int",
            Value::Float(_) => "float",
            Value::Str(_)   => "str",
            Value::List(_)  => "list",
            Value::Tuple(_) => "tuple",
            Value::Set(_)   => "set",
            Value::Dict(_)  => "dict",
        }
    }

    /// Concrete sequence classification. `Dict` and `Str` iterate but are
    /// none of list/tuple/set.
    pub fn container_kind(&self) -> Option<ContainerKind> {
        match self {
            Value::List(_)  => Some(ContainerKind::List),
            Value::Tuple(_) => Some(ContainerKind::Tuple),
            Value::Set(_)   => Some(ContainerKind::Set),
            _ => None,
        }
    }

    pub fn is_iterable(&self) -> bool {
        matches!(
            self,
            Value::Str(_) | Value::List(_) | Value::Tuple(_) | Value::Set(_) | Value::Dict(_)
        )
    }

    /// Element iterator for iterables: sequence items, dict keys, or the
    /// characters of a string (each as a one-character `Str`).
    pub fn elements(&self) -> Option<Elements<'_>> {
        let it = match self {
            Value::List(xs) | Value::Tuple(xs) => Elements::Seq(xs.iter()),
            Value::Set(xs)  => Elements::Set(xs.iter()),
            Value::Dict(m)  => Elements::Keys(m.keys()),
            Value::Str(s)   => Elements::Chars(s.chars()),
            _ => return None,
        };
        Some(it)
    }

    pub fn as_dict(&self) -> Option<&BTreeMap<Value, Value>> {
        match self {
            Value::Dict(m) => Some(m),
            _ => None,
        }
    }

    /// Truthiness: empty containers, zero, `None` and `""` are false.
    pub fn truthy(&self) -> bool {
        match self {
            Value::None     => false,
            Value::Bool(b)  => *b,
            Value::Int(i)   => *i != 0,
            Value::Float(f) => f.0 != 0.0,
            Value::Str(s)   => !s.is_empty(),
            Value::List(xs) | Value::Tuple(xs) => !xs.is_empty(),
            Value::Set(xs)  => !xs.is_empty(),
            Value::Dict(m)  => !m.is_empty(),
        }
    }
}

// ------------------------------ Elements --------------------------------- //

/// Borrowing or (for strings) synthesizing iterator over a value's elements.
pub enum Elements<'a> {
    Seq(std::slice::Iter<'a, Value>),
    Set(std::collections::btree_set::Iter<'a, Value>),
    Keys(std::collections::btree_map::Keys<'a, Value, Value>),
    Chars(std::str::Chars<'a>),
}

/// Element yielded by [`Elements`]; strings produce owned one-char values.
pub enum Element<'a> {
    Borrowed(&'a Value),
    Owned(Value),
}

impl Element<'_> {
    pub fn get(&self) -> &Value {
        match self {
            Element::Borrowed(v) => *v,
            Element::Owned(v) => v,
        }
    }

    pub fn into_owned(self) -> Value {
        match self {
            Element::Borrowed(v) => v.clone(),
            Element::Owned(v) => v,
        }
    }
}

impl<'a> Iterator for Elements<'a> {
    type Item = Element<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            Elements::Seq(it)   => it.next().map(Element::Borrowed),
            Elements::Set(it)   => it.next().map(Element::Borrowed),
            Elements::Keys(it)  => it.next().map(Element::Borrowed),
            Elements::Chars(it) => it.next().map(|c| Element::Owned(Value::Str(c.to_string()))),
        }
    }
}

// ----------------------------- Conversions -------------------------------- //

impl From<bool> for Value { fn from(b: bool) -> Self { Value::Bool(b) } }
impl From<i64> for Value { fn from(i: i64) -> Self { Value::Int(i) } }
impl From<i32> for Value { fn from(i: i32) -> Self { Value::Int(i as i64) } }
impl From<f64> for Value { fn from(f: f64) -> Self { Value::float(f) } }
impl From<&str> for Value { fn from(s: &str) -> Self { Value::Str(s.to_string()) } }
impl From<String> for Value { fn from(s: String) -> Self { Value::Str(s) } }
impl From<Vec<Value>> for Value { fn from(xs: Vec<Value>) -> Self { Value::List(xs) } }

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        use serde_json::Value as J;
        match v {
            J::Null => Value::None,
            J::Bool(b) => Value::Bool(b),
            J::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                // u64 beyond i64::MAX and fractional numbers both land here
                None => Value::float(n.as_f64().unwrap_or(f64::NAN)),
            },
            J::String(s) => Value::Str(s),
            J::Array(xs) => Value::List(xs.into_iter().map(Value::from).collect()),
            J::Object(m) => Value::Dict(
                m.into_iter().map(|(k, v)| (Value::Str(k), Value::from(v))).collect()
            ),
        }
    }
}

// ------------------------------ Serialize --------------------------------- //

/// JSON-shaped output: sequences for list/tuple/set, objects for dicts.
/// Non-string dict keys are written in their printable form.
impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::None => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Int(i) => serializer.serialize_i64(*i),
            Value::Float(x) => x.serialize(serializer),
            Value::Str(s) => serializer.serialize_str(s),
            Value::List(xs) | Value::Tuple(xs) => serializer.collect_seq(xs),
            Value::Set(xs) => serializer.collect_seq(xs),
            Value::Dict(m) => {
                let mut map = serializer.serialize_map(Some(m.len()))?;
                for (k, v) in m {
                    match k {
                        Value::Str(s) => map.serialize_entry(s, v)?,
                        other => map.serialize_entry(&other.to_string(), v)?,
                    }
                }
                map.end()
            }
        }
    }
}

// ------------------------------- Display ---------------------------------- //

fn write_seq<'a>(
    f: &mut fmt::Formatter<'_>,
    items: impl Iterator<Item = &'a Value>,
) -> fmt::Result {
    for (i, x) in items.enumerate() {
        if i > 0 { write!(f, ", ")?; }
        write!(f, "{x}")?;
    }
    Ok(())
}

// exponent form outside [1e-4, 1e16), mantissa shortest, exponent signed and two digits wide
fn write_float(f: &mut fmt::Formatter<'_>, x: f64) -> fmt::Result {
    let magnitude = x.abs();
    if !x.is_finite() || x == 0.0 || (1e-4..1e16).contains(&magnitude) {
        return if x.is_finite() && x.fract() == 0.0 {
            write!(f, "{x:.1}")
        } else {
            write!(f, "{x}")
        };
    }
    let sci = format!("{x:e}");
    let (mantissa, exponent) = sci.split_once('e').unwrap_or((sci.as_str(), "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);
    let sign = if exponent < 0 { '-' } else { '+' };
    write!(f, "{mantissa}e{sign}{:02}", exponent.abs())
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::None => write!(f, "None"),
            Value::Bool(true) => write!(f, "True"),
            Value::Bool(false) => write!(f, "False"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write_float(f, x.0),
            Value::Str(s) => write!(f, "'{s}'"),
            Value::List(xs) => {
                write!(f, "[")?;
                write_seq(f, xs.iter())?;
                write!(f, "]")
            }
            Value::Tuple(xs) => {
                write!(f, "(")?;
                write_seq(f, xs.iter())?;
                if xs.len() == 1 { write!(f, ",")?; }
                write!(f, ")")
            }
            Value::Set(xs) if xs.is_empty() => write!(f, "set()"),
            Value::Set(xs) => {
                write!(f, "{{")?;
                write_seq(f, xs.iter())?;
                write!(f, "}}")
            }
            Value::Dict(m) => {
                write!(f, "{{")?;
                for (i, (k, v)) in m.iter().enumerate() {
                    if i > 0 { write!(f, ", ")?; }
                    write!(f, "{k}: {v}")?;
                }
                write!(f, "}}")
            }
        }
    }
}

// ------------------------------- Tests ------------------------------------ //
