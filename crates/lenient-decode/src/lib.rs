//! # lenient-decode: Tolerant Decoding into Typed Records
//!
//! Decodes untrusted JSON bytes into a typed record without ever failing on
//! a type mismatch, and separately reports what was wrong with the payload
//! as a [`ViolationMap`] keyed by canonical field path.
//!
//! ## Usage
//!
//! ```
//! use lenient_decode::{decode, record, DecodeOptions, RuleCategory};
//!
//! record! {
//!     #[derive(Debug, Default, PartialEq)]
//!     pub struct User {
//!         pub id: i64 => "id" required,
//!         pub name: String => "name" required,
//!         pub emails: Vec<String> => "emails",
//!     }
//! }
//!
//! let options = DecodeOptions::new()
//!     .with_rules([RuleCategory::RequiredMissing, RuleCategory::InvalidType]);
//! let (user, violations) = decode::<User>(br#"{"name": 42, "emails": ["a@example.com"]}"#, &options);
//!
//! assert_eq!(user.emails, vec!["a@example.com".to_string()]);
//! assert_eq!(violations.get("id").unwrap(), &["REQUIRED_ATTRIBUTE_MISSING"]);
//! assert_eq!(violations.get("name").unwrap(), &["INVALID_TYPE"]);
//! ```
//!
//! ## Pieces
//!
//! - [`Lenient`] / [`assign`]: best-effort population of a target; a value
//!   that does not fit its field is skipped, never raised.
//! - [`Record`] / [`record!`]: a struct plus its build-time type descriptor.
//! - [`decode_into`] / [`decode`]: the orchestration: before hook, lenient
//!   assignment, schema validation, filtering and normalization, after hook.
//! - [`DecodeConfig`]: serde-loadable rule and override configuration.

pub mod assign;
pub mod config;
pub mod decoder;
pub mod record;

pub use assign::{assign, assign_value, Lenient};
pub use config::DecodeConfig;
pub use decoder::{decode, decode_into, field_paths, AfterHook, BeforeHook, DecodeOptions};
pub use record::Record;

pub use lenient_core::{
    AttributeTree, Describe, DescriptorFn, FieldDescriptor, FieldShape, LenientError,
    RuleCategory, TypeDescriptor, TypeOverride, ViolationCode, ViolationMap, WireType,
    PAYLOAD_SCOPE,
};

#[doc(hidden)]
pub mod __private {
    pub use serde_json::Value;
}
