//! # Type Descriptors
//!
//! A static description of a target record's shape: for each field, its Rust
//! name, its wire name, whether it is required, and the shape of the value it
//! holds. Descriptors stand in for runtime reflection. They are generated at
//! build time (see the `record!` macro in `lenient-decode`) and consumed by
//! the schema reflector and the attribute-path builder.
//!
//! Record-typed fields refer to their descriptor through a function pointer,
//! so a record may contain itself (through `Vec`, `Option<Box<_>>`, ...)
//! without the descriptor being infinite.

use std::collections::{BTreeMap, HashMap};

use serde_json::Value;

use crate::wire::WireType;

/// Produces the descriptor of a record type.
pub type DescriptorFn = fn() -> TypeDescriptor;

/// The shape of the value a field holds.
#[derive(Debug, Clone)]
pub enum FieldShape {
    /// A scalar JSON value of the given wire type.
    Primitive(WireType),
    /// The inner shape, or JSON `null`.
    Nullable(Box<FieldShape>),
    /// A JSON array whose elements all have the inner shape.
    Array(Box<FieldShape>),
    /// A JSON object with arbitrary keys whose values have the inner shape.
    Map(Box<FieldShape>),
    /// A nested record.
    Record(DescriptorFn),
    /// Any JSON value.
    Any,
}

impl FieldShape {
    /// Strips any number of `Nullable` wrappers.
    pub fn peeled(&self) -> &FieldShape {
        match self {
            Self::Nullable(inner) => inner.peeled(),
            other => other,
        }
    }

    /// Returns the record descriptor if this shape is a (possibly nullable) record.
    pub fn record(&self) -> Option<TypeDescriptor> {
        match self.peeled() {
            Self::Record(describe) => Some(describe()),
            _ => None,
        }
    }
}

/// One declared field of a record.
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    /// Rust field name.
    pub name: &'static str,
    /// Key used for this field in the JSON payload.
    pub wire_name: &'static str,
    /// Whether the field must be present in the payload.
    pub required: bool,
    /// Shape of the field's value.
    pub shape: FieldShape,
}

impl FieldDescriptor {
    pub fn new(name: &'static str, wire_name: &'static str, shape: FieldShape) -> Self {
        Self {
            name,
            wire_name,
            required: false,
            shape,
        }
    }

    /// Marks the field as required (or not).
    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }
}

/// The declared shape of a record type.
#[derive(Debug, Clone)]
pub struct TypeDescriptor {
    /// Type name, used for schema definitions and [`TypeOverride`](crate::TypeOverride) matching.
    pub name: &'static str,
    /// Declared fields in declaration order.
    pub fields: Vec<FieldDescriptor>,
}

impl TypeDescriptor {
    pub fn new(name: &'static str, fields: Vec<FieldDescriptor>) -> Self {
        Self { name, fields }
    }

    /// Looks up a field by its wire name.
    pub fn field(&self, wire_name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.wire_name == wire_name)
    }

    /// Wire names of all required fields, in declaration order.
    pub fn required_fields(&self) -> Vec<&'static str> {
        self.fields
            .iter()
            .filter(|f| f.required)
            .map(|f| f.wire_name)
            .collect()
    }
}

/// Types that can describe their own wire shape.
pub trait Describe {
    fn shape() -> FieldShape;
}

macro_rules! describe_primitive {
    ($wire:expr => $($ty:ty),+ $(,)?) => {
        $(
            impl Describe for $ty {
                fn shape() -> FieldShape {
                    FieldShape::Primitive($wire)
                }
            }
        )+
    };
}

describe_primitive!(WireType::String => String);
describe_primitive!(WireType::Boolean => bool);
describe_primitive!(WireType::Number => f32, f64);
describe_primitive!(
    WireType::Integer => i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize
);

impl Describe for Value {
    fn shape() -> FieldShape {
        FieldShape::Any
    }
}

impl<T: Describe> Describe for Option<T> {
    fn shape() -> FieldShape {
        FieldShape::Nullable(Box::new(T::shape()))
    }
}

impl<T: Describe> Describe for Box<T> {
    fn shape() -> FieldShape {
        T::shape()
    }
}

impl<T: Describe> Describe for Vec<T> {
    fn shape() -> FieldShape {
        FieldShape::Array(Box::new(T::shape()))
    }
}

impl<T: Describe> Describe for BTreeMap<String, T> {
    fn shape() -> FieldShape {
        FieldShape::Map(Box::new(T::shape()))
    }
}

impl<T: Describe, S> Describe for HashMap<String, T, S> {
    fn shape() -> FieldShape {
        FieldShape::Map(Box::new(T::shape()))
    }
}
