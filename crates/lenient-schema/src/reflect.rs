//! # Schema Reflection
//!
//! Derives a JSON Schema (Draft 2020-12) document from a record's
//! [`TypeDescriptor`]. Every record type reachable from the root becomes one
//! entry under `$defs`, and the root document is a `$ref` to the root
//! record's definition.
//!
//! ## Policies
//!
//! - A field is listed in `required` if and only if its descriptor says so.
//! - `additionalProperties: false` is emitted on record definitions only when
//!   the caller asked for additional-property detection. Otherwise unknown
//!   keys are tolerated.
//! - A [`TypeOverride`] replaces the named record's definition with a bare
//!   `{"type": <wire type>}` node, so every `$ref` to it validates as that
//!   primitive instead of an object.

use std::collections::BTreeSet;

use lenient_core::{FieldShape, RuleCategory, TypeDescriptor, TypeOverride};
use serde_json::{json, Map, Value};

/// The `$schema` dialect emitted by the reflector.
pub const SCHEMA_DIALECT: &str = "https://json-schema.org/draft/2020-12/schema";

/// A reflected schema document together with the name of its root record.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaDescription {
    root: String,
    document: Value,
}

impl SchemaDescription {
    /// Name of the root record type.
    pub fn root(&self) -> &str {
        &self.root
    }

    pub fn document(&self) -> &Value {
        &self.document
    }

    pub fn into_value(self) -> Value {
        self.document
    }

    /// The `$defs` entry for a record type.
    pub fn definition(&self, type_name: &str) -> Option<&Value> {
        self.document.get("$defs").and_then(|defs| defs.get(type_name))
    }

    /// Serialized form, as handed to a validator.
    pub fn to_json_string(&self) -> String {
        self.document.to_string()
    }
}

/// Builds [`SchemaDescription`]s from type descriptors.
#[derive(Debug, Clone, Default)]
pub struct SchemaReflector {
    deny_additional_properties: bool,
    overrides: Vec<TypeOverride>,
}

impl SchemaReflector {
    pub fn new() -> Self {
        Self::default()
    }

    /// A reflector configured for a requested rule set: additional
    /// properties are denied only if [`RuleCategory::AdditionalProperty`] is
    /// among the rules.
    pub fn for_rules(rules: &BTreeSet<RuleCategory>) -> Self {
        Self::new().deny_additional_properties(rules.contains(&RuleCategory::AdditionalProperty))
    }

    pub fn deny_additional_properties(mut self, deny: bool) -> Self {
        self.deny_additional_properties = deny;
        self
    }

    pub fn with_overrides<I>(mut self, overrides: I) -> Self
    where
        I: IntoIterator<Item = TypeOverride>,
    {
        self.overrides.extend(overrides);
        self
    }

    pub fn denies_additional_properties(&self) -> bool {
        self.deny_additional_properties
    }

    pub fn overrides(&self) -> &[TypeOverride] {
        &self.overrides
    }

    /// Reflects `descriptor` and everything reachable from it.
    pub fn reflect(&self, descriptor: &TypeDescriptor) -> SchemaDescription {
        let mut defs = Map::new();
        self.define(descriptor, &mut defs);

        for o in &self.overrides {
            if let Some(def) = defs.get_mut(&o.type_name) {
                *def = json!({ "type": o.wire_type.as_str() });
            }
        }

        SchemaDescription {
            root: descriptor.name.to_string(),
            document: json!({
                "$schema": SCHEMA_DIALECT,
                "$ref": definition_ref(descriptor.name),
                "$defs": Value::Object(defs),
            }),
        }
    }

    fn define(&self, descriptor: &TypeDescriptor, defs: &mut Map<String, Value>) {
        if defs.contains_key(descriptor.name) {
            return;
        }
        // Placeholder so a self-referencing record does not recurse forever.
        defs.insert(descriptor.name.to_string(), Value::Null);

        let mut properties = Map::new();
        for field in &descriptor.fields {
            properties.insert(field.wire_name.to_string(), self.shape_schema(&field.shape, defs));
        }

        let mut def = Map::new();
        def.insert("type".into(), json!("object"));
        def.insert("properties".into(), Value::Object(properties));

        let required = descriptor.required_fields();
        if !required.is_empty() {
            def.insert("required".into(), json!(required));
        }
        if self.deny_additional_properties {
            def.insert("additionalProperties".into(), json!(false));
        }

        defs.insert(descriptor.name.to_string(), Value::Object(def));
    }

    fn shape_schema(&self, shape: &FieldShape, defs: &mut Map<String, Value>) -> Value {
        match shape {
            FieldShape::Primitive(wire) => json!({ "type": wire.as_str() }),
            FieldShape::Nullable(inner) => {
                let mut schema = self.shape_schema(inner, defs);
                // Only inline types can widen to null; a `$ref` keeps the
                // referenced type as is.
                if let Some(Value::String(ty)) = schema.get("type").cloned() {
                    schema["type"] = json!([ty, "null"]);
                }
                schema
            }
            FieldShape::Array(inner) => json!({
                "type": "array",
                "items": self.shape_schema(inner, defs),
            }),
            FieldShape::Map(inner) => json!({
                "type": "object",
                "additionalProperties": self.shape_schema(inner, defs),
            }),
            FieldShape::Record(describe) => {
                let descriptor = describe();
                self.define(&descriptor, defs);
                json!({ "$ref": definition_ref(descriptor.name) })
            }
            FieldShape::Any => json!({}),
        }
    }
}

fn definition_ref(name: &str) -> String {
    format!("#/$defs/{name}")
}
