//! # Wire Types
//!
//! The JSON-level representation of a value, independent of the Rust type
//! it is decoded into. A [`TypeOverride`] lets a caller state that a named
//! record type travels on the wire as something other than an object, such as a
//! UUID newtype that serializes to a string.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::LenientError;

/// A JSON Schema primitive type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WireType {
    String,
    Number,
    Integer,
    Boolean,
    Object,
    Array,
    Null,
}

impl WireType {
    /// Returns the JSON Schema `type` keyword value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Integer => "integer",
            Self::Boolean => "boolean",
            Self::Object => "object",
            Self::Array => "array",
            Self::Null => "null",
        }
    }

    /// Classifies a parsed JSON value.
    ///
    /// Numbers without a fractional part that fit in 64 bits are reported
    /// as `Integer`; every other number is `Number`.
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(_) => Self::Boolean,
            Value::Number(n) if n.is_i64() || n.is_u64() => Self::Integer,
            Value::Number(_) => Self::Number,
            Value::String(_) => Self::String,
            Value::Array(_) => Self::Array,
            Value::Object(_) => Self::Object,
        }
    }
}

impl fmt::Display for WireType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WireType {
    type Err = LenientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "string" => Ok(Self::String),
            "number" => Ok(Self::Number),
            "integer" => Ok(Self::Integer),
            "boolean" => Ok(Self::Boolean),
            "object" => Ok(Self::Object),
            "array" => Ok(Self::Array),
            "null" => Ok(Self::Null),
            _ => Err(LenientError::UnknownWireType(s.to_string())),
        }
    }
}

/// Declares that every occurrence of a named record type is represented on
/// the wire as `wire_type` rather than as an object.
///
/// `type_name` is matched against [`TypeDescriptor::name`](crate::TypeDescriptor).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TypeOverride {
    /// Name of the record type, e.g. `"Uuid"`.
    pub type_name: String,
    /// How values of that type look on the wire.
    pub wire_type: WireType,
}

impl TypeOverride {
    pub fn new(type_name: impl Into<String>, wire_type: WireType) -> Self {
        Self {
            type_name: type_name.into(),
            wire_type,
        }
    }
}
