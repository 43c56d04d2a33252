//! # Violation Path Normalization
//!
//! Rewrites a validator message into a canonical field path and a violation
//! code. Three message families are recognized, tried in this order:
//!
//! | Message | Path | Code |
//! |---------|------|------|
//! | `<scope>: Additional property <name> is not allowed` | `<scope>.<name>` | `ADDITIONAL_PROPERTY` |
//! | `<scope>: <field> is required` | `<scope>.<field>` | `REQUIRED_ATTRIBUTE_MISSING` |
//! | `<scope>: Invalid type. Expected: …, given: …` | `<scope>` | `INVALID_TYPE` |
//!
//! A path never starts or ends with a dot. For a type mismatch the
//! offending value is the scope itself, so no field name is appended.
//!
//! [`normalize`] takes the scope from the violation's typed location: only
//! array elements are bracketed (`resources[0]`), while an object key that
//! happens to be all digits stays a member (`counts.2024`), as in
//! `AttributeTree`. [`normalize_message`] works on rendered text alone, so it
//! treats `(root)` as the empty scope and brackets every all-digit segment.
//!
//! Any other message is returned unchanged as both path and code.

use std::sync::OnceLock;

use lenient_core::ViolationCode;
use regex::Regex;

use crate::validate::{RawViolation, ROOT_LOCATOR};

/// A violation keyed by its canonical path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedViolation {
    pub path: String,
    pub code: String,
}

fn additional_property_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^Additional property (?P<name>.+) is not allowed$")
            .expect("additional property pattern is valid")
    })
}

fn required_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(?P<field>.+) is required$").expect("required pattern is valid"))
}

fn invalid_type_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^Invalid type\. Expected: .*, given: .*$").expect("invalid type pattern is valid")
    })
}

/// Normalizes a validator finding.
pub fn normalize(violation: &RawViolation) -> NormalizedViolation {
    let raw = violation.to_string();
    let normalized = classify(&violation.scope(), &violation.description)
        .unwrap_or_else(|| unrecognized(&raw));
    tracing::trace!(raw, path = %normalized.path, code = %normalized.code, "normalized violation");
    normalized
}

/// Normalizes a raw `"<scope>: <description>"` message.
pub fn normalize_message(raw: &str) -> NormalizedViolation {
    raw.split_once(": ")
        .and_then(|(locator, description)| classify(&canonical_scope(locator), description))
        .unwrap_or_else(|| unrecognized(raw))
}

fn classify(scope: &str, description: &str) -> Option<NormalizedViolation> {
    let (path, code) = if let Some(caps) = additional_property_pattern().captures(description) {
        (join(scope, &caps["name"]), ViolationCode::AdditionalProperty)
    } else if let Some(caps) = required_pattern().captures(description) {
        (join(scope, &caps["field"]), ViolationCode::RequiredAttributeMissing)
    } else if invalid_type_pattern().is_match(description) {
        (scope.to_string(), ViolationCode::InvalidType)
    } else {
        return None;
    };
    Some(NormalizedViolation {
        path,
        code: code.as_str().to_string(),
    })
}

fn unrecognized(raw: &str) -> NormalizedViolation {
    tracing::warn!(message = raw, "unrecognized validator message");
    NormalizedViolation {
        path: raw.to_string(),
        code: raw.to_string(),
    }
}

/// `(root)` → `""`, `resources.0.tags.1` → `resources[0].tags[1]`.
fn canonical_scope(locator: &str) -> String {
    if locator == ROOT_LOCATOR {
        return String::new();
    }

    let mut out = String::with_capacity(locator.len() + 4);
    for segment in locator.split('.') {
        if !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit()) {
            out.push('[');
            out.push_str(segment);
            out.push(']');
        } else {
            if !out.is_empty() {
                out.push('.');
            }
            out.push_str(segment);
        }
    }
    out
}

fn join(scope: &str, field: &str) -> String {
    format!("{scope}.{field}").trim_matches('.').to_string()
}
