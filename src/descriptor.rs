//! Type descriptors: the immutable schema nodes that drive codec dispatch.
//!
//! A descriptor tree is produced by the schema layer once and then shared by
//! readers and writers; children sit behind [`Arc`] handles so subtrees can
//! be reused across schemas and shared across threads. The codec walks the
//! tree while parsing or rendering, and asks it for default values when a
//! tuple on the wire is shorter than the descriptor (backward compatibility
//! with older writers).

use std::sync::Arc;

use crate::error::Error;
use crate::value::{Record, Value, Variant};
use crate::wire::kind;

/// Schema node for one logical type.
#[derive(Debug, Clone)]
pub enum Descriptor {
    Bool,
    Byte,
    Int,
    Long,
    Float,
    String,
    Tuple(Arc<[Descriptor]>),
    Message(Arc<MessageDescriptor>),
    List(Arc<Descriptor>),
    Assoc(Arc<AssocDescriptor>),
    Union(Arc<UnionDescriptor>),
}

/// A named tuple whose positional items map to named fields.
#[derive(Debug)]
pub struct MessageDescriptor {
    pub name: String,
    pub fields: Vec<Field>,
}

/// One field of a message.
#[derive(Debug)]
pub struct Field {
    pub name: String,
    pub ty: Descriptor,
}

/// Key and value types of an associative container.
#[derive(Debug)]
pub struct AssocDescriptor {
    pub key: Descriptor,
    pub value: Descriptor,
}

/// A disjoint union of tagged constructors.
#[derive(Debug)]
pub struct UnionDescriptor {
    pub name: String,
    pub cases: Vec<Case>,
}

/// One constructor of a union.
///
/// Constant cases (no fields) live at the ENUM wire type, payload cases at
/// TUPLE. The two kinds are tagged independently, in declaration order.
#[derive(Debug)]
pub struct Case {
    pub name: String,
    pub tag: u32,
    pub fields: Vec<Descriptor>,
}

impl Case {
    /// True for constructors with no payload.
    pub fn is_constant(&self) -> bool {
        self.fields.is_empty()
    }

    /// The wire type this constructor encodes at.
    pub fn wire_kind(&self) -> u8 {
        if self.is_constant() {
            kind::ENUM
        } else {
            kind::TUPLE
        }
    }
}

impl MessageDescriptor {
    pub fn new(name: impl Into<String>, fields: Vec<(&str, Descriptor)>) -> Self {
        Self {
            name: name.into(),
            fields: fields
                .into_iter()
                .map(|(name, ty)| Field {
                    name: name.to_owned(),
                    ty,
                })
                .collect(),
        }
    }
}

impl UnionDescriptor {
    /// Builds a union from `(constructor name, payload types)` pairs,
    /// assigning tags in declaration order. Constant and payload
    /// constructors are numbered independently.
    pub fn new(name: impl Into<String>, cases: Vec<(&str, Vec<Descriptor>)>) -> Self {
        let mut constant_tag = 0u32;
        let mut payload_tag = 0u32;
        let cases = cases
            .into_iter()
            .map(|(case_name, fields)| {
                let tag = if fields.is_empty() {
                    let t = constant_tag;
                    constant_tag += 1;
                    t
                } else {
                    let t = payload_tag;
                    payload_tag += 1;
                    t
                };
                Case {
                    name: case_name.to_owned(),
                    tag,
                    fields,
                }
            })
            .collect();
        Self {
            name: name.into(),
            cases,
        }
    }

    /// Selects the constructor recognized at an observed `(wire type, tag)`.
    pub fn case_for_wire(&self, wire_kind: u8, tag: u64) -> Option<&Case> {
        self.cases
            .iter()
            .find(|c| c.wire_kind() == wire_kind && u64::from(c.tag) == tag)
    }

    /// Looks up a constructor by name.
    pub fn case_named(&self, name: &str) -> Option<&Case> {
        self.cases.iter().find(|c| c.name == name)
    }

    /// The constructor a primitive wire value promotes into.
    pub fn promotion_case(&self) -> Option<&Case> {
        self.cases.iter().find(|c| !c.is_constant())
    }
}

impl Descriptor {
    /// An anonymous tuple of the given item types.
    pub fn tuple(items: Vec<Descriptor>) -> Self {
        Self::Tuple(items.into())
    }

    /// A named message with fields in declaration order.
    pub fn message(name: impl Into<String>, fields: Vec<(&str, Descriptor)>) -> Self {
        Self::Message(Arc::new(MessageDescriptor::new(name, fields)))
    }

    /// A homogeneous list with a single element type.
    pub fn list(element: Descriptor) -> Self {
        Self::List(Arc::new(element))
    }

    /// An associative container keyed by `key`.
    pub fn assoc(key: Descriptor, value: Descriptor) -> Self {
        Self::Assoc(Arc::new(AssocDescriptor { key, value }))
    }

    /// A disjoint union; see [`UnionDescriptor::new`] for tag assignment.
    pub fn union(name: impl Into<String>, cases: Vec<(&str, Vec<Descriptor>)>) -> Self {
        Self::Union(Arc::new(UnionDescriptor::new(name, cases)))
    }

    /// The logical type name, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Byte => "byte",
            Self::Int => "int",
            Self::Long => "long",
            Self::Float => "float",
            Self::String => "string",
            Self::Tuple(_) => "tuple",
            Self::Message(_) => "message",
            Self::List(_) => "list",
            Self::Assoc(_) => "assoc",
            Self::Union(_) => "union",
        }
    }

    /// The default value used when a field is missing from the wire.
    ///
    /// Containers default to empty, messages and tuples to a value built
    /// from their fields' defaults, unions to their first constant
    /// constructor. Primitives have no defined default.
    pub fn default_value(&self) -> Result<Value, Error> {
        match self {
            Self::Bool
            | Self::Byte
            | Self::Int
            | Self::Long
            | Self::Float
            | Self::String => Err(Error::UndefinedDefault),
            Self::Tuple(items) => Ok(Value::Tuple(
                items
                    .iter()
                    .map(Descriptor::default_value)
                    .collect::<Result<_, _>>()?,
            )),
            Self::Message(msg) => Ok(Value::Record(Record {
                name: msg.name.clone(),
                fields: msg
                    .fields
                    .iter()
                    .map(|f| Ok((f.name.clone(), f.ty.default_value()?)))
                    .collect::<Result<_, Error>>()?,
            })),
            Self::List(_) => Ok(Value::List(Vec::new())),
            Self::Assoc(_) => Ok(Value::Assoc(Vec::new())),
            Self::Union(u) => u
                .cases
                .iter()
                .find(|c| c.is_constant())
                .map(|c| Value::Variant(Variant::new(c.name.clone(), c.tag, Vec::new())))
                .ok_or(Error::UndefinedDefault),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn union_tags_count_per_kind() {
        // Mixed declaration order: constants and payloads number separately.
        let u = UnionDescriptor::new(
            "shape",
            vec![
                ("Empty", vec![]),
                ("Circle", vec![Descriptor::Float]),
                ("Unknown", vec![]),
                ("Rect", vec![Descriptor::Float, Descriptor::Float]),
            ],
        );
        let tags: Vec<_> = u.cases.iter().map(|c| (c.name.as_str(), c.tag)).collect();
        assert_eq!(
            tags,
            [("Empty", 0), ("Circle", 0), ("Unknown", 1), ("Rect", 1)]
        );
        assert_eq!(u.case_for_wire(kind::ENUM, 1).unwrap().name, "Unknown");
        assert_eq!(u.case_for_wire(kind::TUPLE, 1).unwrap().name, "Rect");
        assert!(u.case_for_wire(kind::TUPLE, 2).is_none());
        assert_eq!(u.promotion_case().unwrap().name, "Circle");
    }

    #[test]
    fn primitive_defaults_are_undefined() {
        for d in [
            Descriptor::Bool,
            Descriptor::Byte,
            Descriptor::Int,
            Descriptor::Long,
            Descriptor::Float,
            Descriptor::String,
        ] {
            assert!(matches!(d.default_value(), Err(Error::UndefinedDefault)));
        }
    }

    #[test]
    fn container_defaults_are_empty() {
        assert_eq!(
            Descriptor::list(Descriptor::Int).default_value().unwrap(),
            Value::List(Vec::new())
        );
        assert_eq!(
            Descriptor::assoc(Descriptor::String, Descriptor::Int)
                .default_value()
                .unwrap(),
            Value::Assoc(Vec::new())
        );
    }

    #[test]
    fn union_default_is_first_constant_case() {
        let u = Descriptor::union(
            "maybe",
            vec![("Unknown", vec![]), ("Known", vec![Descriptor::Int])],
        );
        assert_eq!(
            u.default_value().unwrap(),
            Value::Variant(Variant::new("Unknown", 0, Vec::new()))
        );

        let payload_only = Descriptor::union("wrap", vec![("Box", vec![Descriptor::Int])]);
        assert!(matches!(
            payload_only.default_value(),
            Err(Error::UndefinedDefault)
        ));
    }

    #[test]
    fn tuple_default_needs_all_fields_defaultable() {
        let ok = Descriptor::tuple(vec![
            Descriptor::list(Descriptor::Int),
            Descriptor::assoc(Descriptor::String, Descriptor::Int),
        ]);
        assert_eq!(
            ok.default_value().unwrap(),
            Value::Tuple(vec![Value::List(Vec::new()), Value::Assoc(Vec::new())])
        );

        let bad = Descriptor::tuple(vec![Descriptor::Int]);
        assert!(matches!(bad.default_value(), Err(Error::UndefinedDefault)));
    }
}
