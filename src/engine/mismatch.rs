//! Locate the first failing node for a failed check.
//!
//! `find_mismatch(v, d)` is `None` exactly when `is_type(v, d)` holds. When it
//! fails, the walk follows the same order as the engine and reports where it
//! first gave up.
use std::fmt;

use serde::Serialize;

use super::is_type;
use crate::descriptor::Descriptor;
use crate::value::Value;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum PathSegment {
    /// Position in a list/tuple/set/str (sets in their sorted order).
    Index(usize),
    /// Value stored under a mapping key.
    Key(Value),
    /// The mapping key itself.
    KeyOf(Value),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Mismatch {
    pub path: Vec<PathSegment>,
    pub observed: &'static str,
    pub expected: String,
}

pub fn find_mismatch(value: &Value, descriptor: &Descriptor) -> Option<Mismatch> {
    let mut path = Vec::new();
    walk(value, descriptor, &mut path)
}

fn here(value: &Value, descriptor: &Descriptor, path: &[PathSegment]) -> Mismatch {
    Mismatch {
        path: path.to_vec(),
        observed: value.type_name(),
        expected: descriptor.to_string(),
    }
}

fn walk(value: &Value, descriptor: &Descriptor, path: &mut Vec<PathSegment>) -> Option<Mismatch> {
    match descriptor {
        Descriptor::Primitive(p) => {
            (!p.is_instance(value)).then(|| here(value, descriptor, path))
        }
        // a union has no single failing branch to blame
        Descriptor::AnyOf(_) => (!is_type(value, descriptor)).then(|| here(value, descriptor, path)),
        Descriptor::AllOf(ts) => ts.iter().find_map(|t| walk(value, t, path)),
        Descriptor::DictOf { key, value: value_t } => {
            let Some(m) = value.as_dict() else {
                return Some(here(value, descriptor, path));
            };
            for k in m.keys() {
                path.push(PathSegment::KeyOf(k.clone()));
                let found = walk(k, key, path);
                path.pop();
                if found.is_some() { return found; }
            }
            for (k, v) in m {
                path.push(PathSegment::Key(k.clone()));
                let found = walk(v, value_t, path);
                path.pop();
                if found.is_some() { return found; }
            }
            None
        }
        Descriptor::IterableOf { item, kind } => {
            let elems = match value.elements() {
                Some(elems) if kind.admits(value) => elems,
                _ => return Some(here(value, descriptor, path)),
            };
            for (i, e) in elems.enumerate() {
                path.push(PathSegment::Index(i));
                let found = walk(e.get(), item, path);
                path.pop();
                if found.is_some() { return found; }
            }
            None
        }
    }
}

// ------------------------------- Display ---------------------------------- //

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Index(i) => write!(f, "[{i}]"),
            PathSegment::Key(k) => write!(f, "[{k}]"),
            PathSegment::KeyOf(k) => write!(f, ".key({k})"),
        }
    }
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "at $")?;
        for seg in &self.path {
            write!(f, "{seg}")?;
        }
        write!(f, ": expected {}, found {}", self.expected, self.observed)
    }
}
