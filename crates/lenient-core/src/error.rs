//! # Error Types
//!
//! Errors raised while interpreting caller-supplied configuration: rule
//! names, wire type names, and decode configuration documents.
//!
//! Decoding itself never fails; every problem with a payload is reported as
//! data in a [`ViolationMap`](crate::ViolationMap). These errors only surface
//! from the configuration layer.

use thiserror::Error;

/// Top-level error type for configuration handling.
#[derive(Error, Debug)]
pub enum LenientError {
    /// A rule name did not match any [`RuleCategory`](crate::RuleCategory).
    #[error("unknown validation rule: {0}")]
    UnknownRule(String),

    /// A wire type name did not match any [`WireType`](crate::WireType).
    #[error("unknown wire type: {0}")]
    UnknownWireType(String),

    /// A configuration document could not be parsed.
    #[error("invalid configuration in {source_name}: {reason}")]
    Config {
        /// File path or other identifier of the configuration source.
        source_name: String,
        /// Human-readable reason for the failure.
        reason: String,
    },

    /// IO error reading a configuration file.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
