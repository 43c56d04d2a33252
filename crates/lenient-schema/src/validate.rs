//! # Payload Validation
//!
//! Compiles a [`SchemaDescription`] with the `jsonschema` crate and checks
//! payload bytes against it.
//!
//! Every finding is reported as a [`RawViolation`] in the human-oriented
//! form a JSON Schema validator traditionally prints:
//!
//! ```text
//! (root): id is required
//! resources.0: name is required
//! resources.0.id: Invalid type. Expected: string, given: integer
//! (root): Additional property extra is not allowed
//! ```
//!
//! The locator is the instance location in dot notation, with array indices
//! as plain numeric segments and `(root)` for the document itself. Each
//! violation also carries the location as typed [`PathSegment`]s, resolved
//! against the instance, so an array index and an all-digit object key stay
//! distinguishable. Rewriting these into canonical paths is the normalizer's
//! job.
//!
//! Bytes that are not JSON are not violations: they produce
//! [`ValidateError::InvalidPayload`] and nothing else.

use std::fmt;

use jsonschema::error::{TypeKind, ValidationErrorKind};
use lenient_core::{RuleCategory, WireType};
use serde_json::Value;
use thiserror::Error;

use crate::reflect::SchemaDescription;

/// Locator used for findings on the document itself.
pub const ROOT_LOCATOR: &str = "(root)";

/// Errors that stop validation before any violation is reported.
#[derive(Error, Debug)]
pub enum ValidateError {
    /// The payload is not a JSON document.
    #[error("payload is not a JSON document: {reason}")]
    InvalidPayload {
        /// Parser diagnostic.
        reason: String,
    },

    /// The reflected schema could not be compiled.
    #[error("failed to compile schema for {schema}: {reason}")]
    SchemaCompile {
        /// Root record of the schema.
        schema: String,
        /// Compiler diagnostic.
        reason: String,
    },
}

/// One step of an instance location.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    /// Element of an array.
    Index(usize),
    /// Member of an object, including keys that look like numbers.
    Property(String),
}

/// One finding of the underlying validator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawViolation {
    /// Dot-notation instance location, e.g. `resources.0`, or `(root)`.
    pub locator: String,
    /// The same location, step by step. Empty for the document itself.
    pub segments: Vec<PathSegment>,
    /// Rule this finding belongs to. `None` for findings no rule covers
    /// (format, enum, ... keywords), which are never reported.
    pub category: Option<RuleCategory>,
    /// Human description, e.g. `id is required`.
    pub description: String,
}

impl RawViolation {
    /// Canonical path of the location: members joined with `.`, array
    /// elements as `[N]`, the document itself as `""`.
    pub fn scope(&self) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                PathSegment::Index(i) => {
                    out.push('[');
                    out.push_str(&i.to_string());
                    out.push(']');
                }
                PathSegment::Property(name) => {
                    if !out.is_empty() {
                        out.push('.');
                    }
                    out.push_str(name);
                }
            }
        }
        out
    }
}

impl fmt::Display for RawViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.locator, self.description)
    }
}

/// Parses the first complete JSON value in `bytes`.
///
/// Anything after that value is ignored, so `{"id": 1}}` parses while `}`,
/// `{` or an empty buffer do not.
pub fn parse_payload(bytes: &[u8]) -> Result<Value, ValidateError> {
    let mut stream = serde_json::Deserializer::from_slice(bytes).into_iter::<Value>();
    match stream.next() {
        Some(Ok(value)) => Ok(value),
        Some(Err(e)) => Err(ValidateError::InvalidPayload {
            reason: e.to_string(),
        }),
        None => Err(ValidateError::InvalidPayload {
            reason: "empty payload".to_string(),
        }),
    }
}

/// A compiled schema, ready to check payloads.
///
/// `Validator` is `Send + Sync`; one instance can serve concurrent callers.
pub struct Validator {
    schema: SchemaDescription,
    compiled: jsonschema::Validator,
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Validator")
            .field("root", &self.schema.root())
            .finish()
    }
}

impl Validator {
    /// Compiles `schema` against Draft 2020-12.
    ///
    /// # Errors
    ///
    /// Returns [`ValidateError::SchemaCompile`] if the document is not a
    /// valid schema.
    pub fn new(schema: SchemaDescription) -> Result<Self, ValidateError> {
        let compiled = jsonschema::options()
            .with_draft(jsonschema::Draft::Draft202012)
            .build(schema.document())
            .map_err(|e| ValidateError::SchemaCompile {
                schema: schema.root().to_string(),
                reason: e.to_string(),
            })?;

        tracing::debug!(root = schema.root(), "compiled payload schema");
        Ok(Self { schema, compiled })
    }

    pub fn schema(&self) -> &SchemaDescription {
        &self.schema
    }

    /// Parses `payload` and reports every violation in validator order.
    ///
    /// # Errors
    ///
    /// Returns [`ValidateError::InvalidPayload`] if `payload` is not JSON.
    pub fn validate(&self, payload: &[u8]) -> Result<Vec<RawViolation>, ValidateError> {
        let instance = parse_payload(payload)?;
        Ok(self.validate_value(&instance))
    }

    /// Reports every violation of an already parsed instance.
    pub fn validate_value(&self, instance: &Value) -> Vec<RawViolation> {
        let mut violations = Vec::new();
        for error in self.compiled.iter_errors(instance) {
            let segments = instance_segments(instance, &error.instance_path.to_string());
            let locator = dotted_locator(&segments);
            match &error.kind {
                ValidationErrorKind::Required { property } => {
                    let name = match property {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    };
                    violations.push(RawViolation {
                        locator,
                        segments,
                        category: Some(RuleCategory::RequiredMissing),
                        description: format!("{name} is required"),
                    });
                }
                ValidationErrorKind::Type { kind } => {
                    let expected = match kind {
                        TypeKind::Single(ty) => ty.to_string(),
                        TypeKind::Multiple(types) => types
                            .into_iter()
                            .map(|ty| ty.to_string())
                            .collect::<Vec<_>>()
                            .join("/"),
                    };
                    violations.push(RawViolation {
                        locator,
                        segments,
                        category: Some(RuleCategory::InvalidType),
                        description: format!(
                            "Invalid type. Expected: {expected}, given: {}",
                            WireType::of(&error.instance)
                        ),
                    });
                }
                ValidationErrorKind::AdditionalProperties { unexpected } => {
                    for name in unexpected {
                        violations.push(RawViolation {
                            locator: locator.clone(),
                            segments: segments.clone(),
                            category: Some(RuleCategory::AdditionalProperty),
                            description: format!("Additional property {name} is not allowed"),
                        });
                    }
                }
                _ => violations.push(RawViolation {
                    locator,
                    segments,
                    category: None,
                    description: error.to_string(),
                }),
            }
        }

        for v in &violations {
            tracing::trace!(violation = %v, "raw schema violation");
        }
        violations
    }
}

/// Reflect-free entry point: compile `schema` and check `payload` in one go.
///
/// # Errors
///
/// A compile failure or unparseable payload.
pub fn validate(
    schema: SchemaDescription,
    payload: &[u8],
) -> Result<Vec<RawViolation>, ValidateError> {
    Validator::new(schema)?.validate(payload)
}

/// Splits a JSON Pointer (`/resources/0/id`) into segments, walking
/// `instance` alongside so a numeric token is an index only where it
/// addresses an array.
fn instance_segments(instance: &Value, pointer: &str) -> Vec<PathSegment> {
    let mut segments = Vec::new();
    if pointer.is_empty() {
        return segments;
    }
    let mut current = Some(instance);
    for token in pointer.split('/').skip(1) {
        let token = token.replace("~1", "/").replace("~0", "~");
        let (segment, next) = match current {
            Some(Value::Array(items)) => match token.parse::<usize>() {
                Ok(index) => (PathSegment::Index(index), items.get(index)),
                Err(_) => (PathSegment::Property(token), None),
            },
            Some(Value::Object(members)) => {
                let next = members.get(&token);
                (PathSegment::Property(token), next)
            }
            _ => (PathSegment::Property(token), None),
        };
        segments.push(segment);
        current = next;
    }
    segments
}

/// Dot notation of `segments` (`resources.0.id`), or [`ROOT_LOCATOR`].
fn dotted_locator(segments: &[PathSegment]) -> String {
    if segments.is_empty() {
        return ROOT_LOCATOR.to_string();
    }
    segments
        .iter()
        .map(|segment| match segment {
            PathSegment::Index(i) => i.to_string(),
            PathSegment::Property(name) => name.clone(),
        })
        .collect::<Vec<_>>()
        .join(".")
}
