//! # lenient-schema: Schema Reflection, Validation & Normalization
//!
//! Turns a record's [`TypeDescriptor`](lenient_core::TypeDescriptor) into a
//! JSON Schema document, validates payload bytes against it, and rewrites
//! the validator's findings into canonical field paths.
//!
//! ## Pipeline
//!
//! 1. [`SchemaReflector`]: descriptor → [`SchemaDescription`] (Draft 2020-12,
//!    one `$defs` entry per record type, required fields, additional-property
//!    policy, per-type wire overrides).
//! 2. [`Validator`]: compiles the description with the `jsonschema` crate and
//!    reports every [`RawViolation`], or [`ValidateError::InvalidPayload`]
//!    when the bytes are not JSON.
//! 3. [`filter_violations`]: keeps the violations whose rule was requested.
//! 4. [`normalize`]: maps each survivor to `(canonical path, code)`.
//!
//! [`SchemaCache`] shares compiled validators across calls.

pub mod cache;
pub mod filter;
pub mod normalize;
pub mod reflect;
pub mod validate;

// Re-export primary types for ergonomic imports.
pub use cache::{CacheKey, SchemaCache};
pub use filter::filter_violations;
pub use normalize::{normalize, normalize_message, NormalizedViolation};
pub use reflect::{SchemaDescription, SchemaReflector, SCHEMA_DIALECT};
pub use validate::{parse_payload, validate, PathSegment, RawViolation, ValidateError, Validator};
