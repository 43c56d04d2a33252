//! # Rule Categories and Violation Codes
//!
//! A caller opts into validation one [`RuleCategory`] at a time. Each rule
//! enables detection of one class of field-level violation; nothing is
//! reported for a class the caller did not request.
//!
//! [`ViolationCode`] is the reporting side: the strings that appear as
//! values in a [`ViolationMap`](crate::ViolationMap). It has one more member
//! than [`RuleCategory`], [`ViolationCode::InvalidPayload`], because a
//! payload that cannot be parsed is reported regardless of the requested
//! rules.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::LenientError;

/// Field-level validation rules a caller may request.
///
/// | Rule | Detects | Reported as |
/// |------|---------|-------------|
/// | `RequiredMissing` | a field declared required is absent | `REQUIRED_ATTRIBUTE_MISSING` |
/// | `InvalidType` | a value's wire type disagrees with its field | `INVALID_TYPE` |
/// | `AdditionalProperty` | an undeclared field is present | `ADDITIONAL_PROPERTY` |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleCategory {
    /// A declared-required field is absent from the payload.
    #[serde(alias = "required", alias = "REQUIRED_ATTRIBUTE_MISSING")]
    RequiredMissing,
    /// A value's wire type does not match the target field's declared type.
    #[serde(alias = "INVALID_TYPE")]
    InvalidType,
    /// The payload carries a field the target record does not declare.
    #[serde(alias = "additional_property_not_allowed", alias = "ADDITIONAL_PROPERTY")]
    AdditionalProperty,
}

impl RuleCategory {
    /// Returns all rule categories in canonical order.
    pub fn all() -> &'static [RuleCategory] {
        &[
            Self::RequiredMissing,
            Self::InvalidType,
            Self::AdditionalProperty,
        ]
    }

    /// Returns the snake_case identifier, matching the serde format.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RequiredMissing => "required_missing",
            Self::InvalidType => "invalid_type",
            Self::AdditionalProperty => "additional_property",
        }
    }

    /// The code reported for a violation of this rule.
    pub fn code(&self) -> ViolationCode {
        match self {
            Self::RequiredMissing => ViolationCode::RequiredAttributeMissing,
            Self::InvalidType => ViolationCode::InvalidType,
            Self::AdditionalProperty => ViolationCode::AdditionalProperty,
        }
    }
}

impl fmt::Display for RuleCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RuleCategory {
    type Err = LenientError;

    /// Accepts the snake_case identifier, the reported code, and the short
    /// aliases used by JSON Schema validators (`required`,
    /// `additional_property_not_allowed`). Matching is case-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "required_missing" | "required" | "required_attribute"
            | "required_attribute_missing" => Ok(Self::RequiredMissing),
            "invalid_type" => Ok(Self::InvalidType),
            "additional_property" | "additional_property_not_allowed" => {
                Ok(Self::AdditionalProperty)
            }
            _ => Err(LenientError::UnknownRule(s.to_string())),
        }
    }
}

/// Codes that appear in a [`ViolationMap`](crate::ViolationMap).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ViolationCode {
    /// A declared-required field is absent.
    RequiredAttributeMissing,
    /// A value's wire type disagrees with its field.
    InvalidType,
    /// An undeclared field is present.
    AdditionalProperty,
    /// The payload bytes are not a JSON document.
    InvalidPayload,
}

impl ViolationCode {
    /// Returns the reported string form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RequiredAttributeMissing => "REQUIRED_ATTRIBUTE_MISSING",
            Self::InvalidType => "INVALID_TYPE",
            Self::AdditionalProperty => "ADDITIONAL_PROPERTY",
            Self::InvalidPayload => "INVALID_PAYLOAD",
        }
    }

    /// The rule that produces this code. `InvalidPayload` has none.
    pub fn rule(&self) -> Option<RuleCategory> {
        match self {
            Self::RequiredAttributeMissing => Some(RuleCategory::RequiredMissing),
            Self::InvalidType => Some(RuleCategory::InvalidType),
            Self::AdditionalProperty => Some(RuleCategory::AdditionalProperty),
            Self::InvalidPayload => None,
        }
    }
}

impl fmt::Display for ViolationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<RuleCategory> for ViolationCode {
    fn from(rule: RuleCategory) -> Self {
        rule.code()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rule_round_trips_through_as_str() {
        for rule in RuleCategory::all() {
            assert_eq!(rule.as_str().parse::<RuleCategory>().unwrap(), *rule);
        }
    }

    #[test]
    fn rule_parses_aliases() {
        assert_eq!(
            "required".parse::<RuleCategory>().unwrap(),
            RuleCategory::RequiredMissing
        );
        assert_eq!(
            "REQUIRED_ATTRIBUTE_MISSING".parse::<RuleCategory>().unwrap(),
            RuleCategory::RequiredMissing
        );
        assert_eq!(
            "additional_property_not_allowed".parse::<RuleCategory>().unwrap(),
            RuleCategory::AdditionalProperty
        );
        assert_eq!(
            " Invalid_Type ".parse::<RuleCategory>().unwrap(),
            RuleCategory::InvalidType
        );
    }

    #[test]
    fn rule_rejects_unknown_names() {
        let err = "must_be_even".parse::<RuleCategory>().unwrap_err();
        assert!(matches!(err, LenientError::UnknownRule(ref s) if s == "must_be_even"));
    }

    #[test]
    fn rule_deserializes_from_aliases() {
        let rules: Vec<RuleCategory> =
            serde_json::from_str(r#"["required", "INVALID_TYPE", "additional_property"]"#)
                .unwrap();
        assert_eq!(rules, RuleCategory::all());
    }

    #[test]
    fn codes_serialize_in_screaming_case() {
        let json = serde_json::to_string(&ViolationCode::RequiredAttributeMissing).unwrap();
        assert_eq!(json, r#""REQUIRED_ATTRIBUTE_MISSING""#);
        assert_eq!(ViolationCode::InvalidPayload.to_string(), "INVALID_PAYLOAD");
    }

    #[test]
    fn code_and_rule_agree() {
        for rule in RuleCategory::all() {
            assert_eq!(rule.code().rule(), Some(*rule));
        }
        assert_eq!(ViolationCode::InvalidPayload.rule(), None);
    }
}
