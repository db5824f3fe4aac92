// Descriptor tree for runtime checks. Immutable once built.
pub mod repr;

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Nominal types a value can be an instance of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Primitive {
    Object,          // every value
    #[serde(rename = "none")]
    NoneType,
    Bool,
    Int,
    Float,
    Number,          // abstract numeric interface: int | float
    Str,
    List,
    Tuple,
    Set,
    Dict,
    Iterable,        // any iterable, no element constraint
}

/// Concrete container constraint for `IterableOf`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerKind {
    #[default]
    Any,
    List,
    Tuple,
    Set,
}

/// Deserialization lives in [`repr`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(into = "repr::Repr")]
pub enum Descriptor {
    Primitive(Primitive),
    AnyOf(Vec<Descriptor>),      // non-empty
    AllOf(Vec<Descriptor>),      // non-empty
    DictOf {
        key: Box<Descriptor>,
        value: Box<Descriptor>,
    },
    IterableOf {
        item: Box<Descriptor>,
        kind: ContainerKind,
    },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DescriptorError {
    #[error("`{0}` needs at least one child descriptor")]
    EmptyCombinator(&'static str),
}

// ------------------------------ Constructors ------------------------------ //

fn collect_children<I, D>(types: I, name: &'static str) -> Result<Vec<Descriptor>, DescriptorError>
where
    I: IntoIterator<Item = D>,
    D: Into<Descriptor>,
{
    let types: Vec<Descriptor> = types.into_iter().map(Into::into).collect();
    if types.is_empty() {
        return Err(DescriptorError::EmptyCombinator(name));
    }
    Ok(types)
}

impl Descriptor {
    /// Union: at least one child must match. Children are kept in order.
    pub fn any_of<I, D>(types: I) -> Result<Self, DescriptorError>
    where
        I: IntoIterator<Item = D>,
        D: Into<Descriptor>,
    {
        collect_children(types, "Any").map(Descriptor::AnyOf)
    }

    /// Intersection: every child must match.
    pub fn all_of<I, D>(types: I) -> Result<Self, DescriptorError>
    where
        I: IntoIterator<Item = D>,
        D: Into<Descriptor>,
    {
        collect_children(types, "All").map(Descriptor::AllOf)
    }

    pub fn dict(key: impl Into<Descriptor>, value: impl Into<Descriptor>) -> Self {
        Descriptor::DictOf {
            key: Box::new(key.into()),
            value: Box::new(value.into()),
        }
    }

    pub fn iterable_of(item: impl Into<Descriptor>, kind: ContainerKind) -> Self {
        Descriptor::IterableOf { item: Box::new(item.into()), kind }
    }

    pub fn iterable(item: impl Into<Descriptor>) -> Self { Self::iterable_of(item, ContainerKind::Any) }
    pub fn list(item: impl Into<Descriptor>) -> Self { Self::iterable_of(item, ContainerKind::List) }
    pub fn tuple(item: impl Into<Descriptor>) -> Self { Self::iterable_of(item, ContainerKind::Tuple) }
    pub fn set(item: impl Into<Descriptor>) -> Self { Self::iterable_of(item, ContainerKind::Set) }
}

impl From<Primitive> for Descriptor {
    fn from(p: Primitive) -> Self { Descriptor::Primitive(p) }
}

// ------------------------------- Display ---------------------------------- //

impl Primitive {
    pub fn name(self) -> &'static str {
        match self {
            Primitive::Object   => "object",
            Primitive::NoneType => "NoneType",
            Primitive::Bool     => "bool",
            Primitive::Int      => "int",
            Primitive::Float    => "float",
            Primitive::Number   => "Number",
            Primitive::Str      => "str",
            Primitive::List     => "list",
            Primitive::Tuple    => "tuple",
            Primitive::Set      => "set",
            Primitive::Dict     => "dict",
            Primitive::Iterable => "Iterable",
        }
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.name()) }
}

fn write_children(f: &mut fmt::Formatter<'_>, name: &str, types: &[Descriptor]) -> fmt::Result {
    write!(f, "{name}(")?;
    for (i, t) in types.iter().enumerate() {
        if i > 0 { write!(f, ", ")?; }
        write!(f, "{t}")?;
    }
    write!(f, ")")
}

impl fmt::Display for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Descriptor::Primitive(p) => write!(f, "{p}"),
            Descriptor::AnyOf(ts) => write_children(f, "Any", ts),
            Descriptor::AllOf(ts) => write_children(f, "All", ts),
            Descriptor::DictOf { key, value } => write!(f, "Dict({key}, {value})"),
            Descriptor::IterableOf { item, kind } => {
                let name = match kind {
                    ContainerKind::Any   => "Iterable",
                    ContainerKind::List  => "List",
                    ContainerKind::Tuple => "Tuple",
                    ContainerKind::Set   => "Set",
                };
                write!(f, "{name}({item})")
            }
        }
    }
}

// ------------------------------- Tests ------------------------------------ //
