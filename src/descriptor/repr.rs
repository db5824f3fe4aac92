//! Compact JSON form of a descriptor.
//!
//! Primitives are bare strings (`"int"`), composites are single-key objects:
//! `{"any": [..]}`, `{"all": [..]}`, `{"dict": {"key": .., "value": ..}}`,
//! `{"iterable": {"item": .., "kind": "list"}}`, and the `{"list": ..}`,
//! `{"tuple": ..}`, `{"set": ..}` shorthands.
//!
//! Deserialization goes through a visitor rather than an untagged enum so
//! that error paths (see `path_de`) point inside nested descriptors.
use std::fmt;

use serde::de::{self, IntoDeserializer, MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

use super::{ContainerKind, Descriptor, Primitive};

// ------------------------------ Serialize --------------------------------- //

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Repr {
    Primitive(Primitive),
    Composite(Composite),
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Composite {
    Any(Vec<Descriptor>),
    All(Vec<Descriptor>),
    Dict { key: Descriptor, value: Descriptor },
    Iterable { item: Descriptor, kind: ContainerKind },
    List(Descriptor),
    Tuple(Descriptor),
    Set(Descriptor),
}

impl From<Descriptor> for Repr {
    fn from(d: Descriptor) -> Self {
        let c = match d {
            Descriptor::Primitive(p) => return Repr::Primitive(p),
            Descriptor::AnyOf(ts) => Composite::Any(ts),
            Descriptor::AllOf(ts) => Composite::All(ts),
            Descriptor::DictOf { key, value } => Composite::Dict { key: *key, value: *value },
            Descriptor::IterableOf { item, kind } => match kind {
                ContainerKind::Any   => Composite::Iterable { item: *item, kind },
                ContainerKind::List  => Composite::List(*item),
                ContainerKind::Tuple => Composite::Tuple(*item),
                ContainerKind::Set   => Composite::Set(*item),
            },
        };
        Repr::Composite(c)
    }
}

// ----------------------------- Deserialize -------------------------------- //

// an identifier, not a plain enum, so `serde_path_to_error` records the key
#[derive(Deserialize)]
#[serde(field_identifier, rename_all = "lowercase")]
enum Tag { Any, All, Dict, Iterable, List, Tuple, Set }

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct DictBody {
    key: Descriptor,
    value: Descriptor,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct IterableBody {
    item: Descriptor,
    #[serde(default)]
    kind: ContainerKind,
}

struct DescriptorVisitor;

impl<'de> Visitor<'de> for DescriptorVisitor {
    type Value = Descriptor;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a primitive type name or a single-key descriptor object")
    }

    fn visit_str<E: de::Error>(self, s: &str) -> Result<Descriptor, E> {
        Primitive::deserialize(s.into_deserializer()).map(Descriptor::Primitive)
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Descriptor, A::Error> {
        let Some(tag) = map.next_key::<Tag>()? else {
            return Err(de::Error::invalid_length(0, &self));
        };
        let d = match tag {
            Tag::Any => Descriptor::any_of(map.next_value::<Vec<Descriptor>>()?).map_err(<A::Error as de::Error>::custom)?,
            Tag::All => Descriptor::all_of(map.next_value::<Vec<Descriptor>>()?).map_err(<A::Error as de::Error>::custom)?,
            Tag::Dict => {
                let DictBody { key, value } = map.next_value()?;
                Descriptor::dict(key, value)
            }
            Tag::Iterable => {
                let IterableBody { item, kind } = map.next_value()?;
                Descriptor::iterable_of(item, kind)
            }
            Tag::List => Descriptor::list(map.next_value::<Descriptor>()?),
            Tag::Tuple => Descriptor::tuple(map.next_value::<Descriptor>()?),
            Tag::Set => Descriptor::set(map.next_value::<Descriptor>()?),
        };
        if map.next_key::<de::IgnoredAny>()?.is_some() {
            return Err(de::Error::custom("a composite descriptor takes exactly one key"));
        }
        Ok(d)
    }
}

impl<'de> Deserialize<'de> for Descriptor {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(DescriptorVisitor)
    }
}
