//! # lenient-core: Foundational Types for Tolerant Decoding
//!
//! This crate is the leaf of the workspace. It defines the vocabulary shared
//! by the schema and decode layers: which violations a caller can opt into,
//! how those violations are reported, what a JSON value looks like on the
//! wire, and how a target record describes its own shape.
//!
//! ## Key Types
//!
//! - [`RuleCategory`]: the closed set of field-level rules a caller may request.
//! - [`ViolationCode`]: the codes that appear in a [`ViolationMap`].
//! - [`WireType`] / [`TypeOverride`]: JSON wire representations and the
//!   per-type override a caller uses to describe opaque types.
//! - [`TypeDescriptor`] / [`FieldShape`] / [`Describe`]: a build-time type
//!   descriptor standing in for runtime reflection.
//! - [`AttributeTree`]: an arena of field occurrences that assigns every
//!   nested field (array elements included) a unique canonical path.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `lenient-*` crates.
//! - No `unsafe` code.
//! - No `.unwrap()` outside tests.

pub mod descriptor;
pub mod error;
pub mod path;
pub mod rule;
pub mod violation;
pub mod wire;

// Re-export primary types for ergonomic imports.
pub use descriptor::{Describe, DescriptorFn, FieldDescriptor, FieldShape, TypeDescriptor};
pub use error::LenientError;
pub use path::{AttributeNode, AttributeTree, FieldDeclaration, FlatEntry, NodeId};
pub use rule::{RuleCategory, ViolationCode};
pub use violation::{ViolationMap, PAYLOAD_SCOPE};
pub use wire::{TypeOverride, WireType};
