//! Coercion: use a descriptor as a one-argument constructor.
//!
//! Callers must re-check the result with [`is_type`]; a successful coercion
//! is not a promise that the value conforms.
use std::collections::{BTreeMap, BTreeSet};

use thiserror::Error;

use crate::descriptor::{ContainerKind, Descriptor, Primitive};
use crate::engine::is_type;
use crate::value::{Element, Value};

#[derive(Debug, Error, Clone, PartialEq)]
#[error("cannot convert {observed} value {shown} to `{target}`")]
pub struct CoerceError {
    pub observed: &'static str,
    pub shown: String,
    pub target: String,
}

impl CoerceError {
    fn new(v: &Value, target: impl ToString) -> Self {
        Self {
            observed: v.type_name(),
            shown: v.to_string(),
            target: target.to_string(),
        }
    }
}

pub fn coerce(value: &Value, descriptor: &Descriptor) -> Result<Value, CoerceError> {
    match descriptor {
        Descriptor::Primitive(p) => coerce_primitive(value, *p),
        Descriptor::AnyOf(ts) => {
            if is_type(value, descriptor) {
                return Ok(value.clone());
            }
            ts.iter()
                .find_map(|t| coerce(value, t).ok().filter(|c| is_type(c, t)))
                .ok_or_else(|| CoerceError::new(value, descriptor))
        }
        Descriptor::AllOf(ts) => {
            let mut acc = value.clone();
            for t in ts {
                acc = coerce(&acc, t)?;
            }
            Ok(acc)
        }
        Descriptor::DictOf { key, value: value_t } => {
            let m = to_dict(value).ok_or_else(|| CoerceError::new(value, descriptor))?;
            let mut out = BTreeMap::new();
            for (k, v) in m {
                out.insert(coerce(&k, key)?, coerce(&v, value_t)?);
            }
            Ok(Value::Dict(out))
        }
        Descriptor::IterableOf { item, kind } => {
            let xs = to_items(value).ok_or_else(|| CoerceError::new(value, descriptor))?;
            let xs = xs.iter().map(|x| coerce(x, item)).collect::<Result<Vec<_>, _>>()?;
            let kind = match kind {
                // keep the caller's container when it already iterates
                ContainerKind::Any => value.container_kind().unwrap_or(ContainerKind::List),
                k => *k,
            };
            Ok(build(kind, xs))
        }
    }
}

fn coerce_primitive(v: &Value, p: Primitive) -> Result<Value, CoerceError> {
    let fail = || CoerceError::new(v, p);
    let out = match p {
        Primitive::Object => v.clone(),
        Primitive::NoneType => match v {
            Value::None => Value::None,
            _ => return Err(fail()),
        },
        Primitive::Bool => Value::Bool(v.truthy()),
        Primitive::Int => Value::Int(to_int(v).ok_or_else(fail)?),
        Primitive::Float => Value::float(to_float(v).ok_or_else(fail)?),
        Primitive::Number => match v {
            Value::Int(_) | Value::Float(_) => v.clone(),
            Value::Bool(b) => Value::Int(*b as i64),
            Value::Str(s) => {
                let s = s.trim();
                match s.parse::<i64>() {
                    Ok(i) => Value::Int(i),
                    Err(_) => Value::float(s.parse::<f64>().map_err(|_| fail())?),
                }
            }
            _ => return Err(fail()),
        },
        Primitive::Str => match v {
            Value::Str(_) => v.clone(),
            other => Value::Str(other.to_string()),
        },
        Primitive::List => build(ContainerKind::List, to_items(v).ok_or_else(fail)?),
        Primitive::Tuple => build(ContainerKind::Tuple, to_items(v).ok_or_else(fail)?),
        Primitive::Set => build(ContainerKind::Set, to_items(v).ok_or_else(fail)?),
        Primitive::Iterable => {
            if !v.is_iterable() { return Err(fail()); }
            v.clone()
        }
        Primitive::Dict => Value::Dict(to_dict(v).ok_or_else(fail)?),
    };
    Ok(out)
}

// ------------------------------- Scalars ---------------------------------- //

fn to_int(v: &Value) -> Option<i64> {
    match v {
        Value::Int(i) => Some(*i),
        Value::Bool(b) => Some(*b as i64),
        Value::Float(f) => {
            let t = f.0.trunc();
            // i64::MAX as f64 rounds up to 2^63, which is already out of range
            (t.is_finite() && t >= i64::MIN as f64 && t < i64::MAX as f64).then_some(t as i64)
        }
        Value::Str(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn to_float(v: &Value) -> Option<f64> {
    match v {
        Value::Float(f) => Some(f.0),
        Value::Int(i) => Some(*i as f64),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::Str(s) => s.trim().parse().ok(),
        _ => None,
    }
}

// ------------------------------ Containers -------------------------------- //

fn to_items(v: &Value) -> Option<Vec<Value>> {
    Some(v.elements()?.map(Element::into_owned).collect())
}

/// Dicts pass through; any iterable of 2-element list/tuple pairs converts.
fn to_dict(v: &Value) -> Option<BTreeMap<Value, Value>> {
    if let Value::Dict(m) = v {
        return Some(m.clone());
    }
    if matches!(v, Value::Str(_)) {
        return None;
    }
    let mut out = BTreeMap::new();
    for e in v.elements()? {
        match e.into_owned() {
            Value::List(pair) | Value::Tuple(pair) if pair.len() == 2 => {
                let mut it = pair.into_iter();
                let (k, val) = (it.next()?, it.next()?);
                out.insert(k, val);
            }
            _ => return None,
        }
    }
    Some(out)
}

fn build(kind: ContainerKind, xs: Vec<Value>) -> Value {
    match kind {
        ContainerKind::Any | ContainerKind::List => Value::List(xs),
        ContainerKind::Tuple => Value::Tuple(xs),
        ContainerKind::Set => Value::Set(xs.into_iter().collect::<BTreeSet<_>>()),
    }
}

// ------------------------------- Tests ------------------------------------ //
