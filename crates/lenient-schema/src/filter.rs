//! Keeps only the violations a caller asked for.

use std::collections::BTreeSet;

use lenient_core::RuleCategory;

use crate::validate::RawViolation;

/// Returns the violations whose category is in `rules`, in their original
/// order. Uncategorized findings are always dropped.
pub fn filter_violations(
    violations: Vec<RawViolation>,
    rules: &BTreeSet<RuleCategory>,
) -> Vec<RawViolation> {
    violations
        .into_iter()
        .filter(|v| v.category.is_some_and(|c| rules.contains(&c)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(locator: &str, category: Option<RuleCategory>) -> RawViolation {
        RawViolation {
            locator: locator.into(),
            segments: Vec::new(),
            category,
            description: "irrelevant".into(),
        }
    }

    #[test]
    fn keeps_requested_categories_in_order() {
        let violations = vec![
            raw("b", Some(RuleCategory::InvalidType)),
            raw("(root)", Some(RuleCategory::AdditionalProperty)),
            raw("a", Some(RuleCategory::InvalidType)),
            raw("(root)", Some(RuleCategory::RequiredMissing)),
        ];
        let rules = BTreeSet::from([RuleCategory::InvalidType, RuleCategory::RequiredMissing]);
        let kept: Vec<String> = filter_violations(violations, &rules)
            .into_iter()
            .map(|v| v.locator)
            .collect();
        assert_eq!(kept, vec!["b", "a", "(root)"]);
    }

    #[test]
    fn drops_uncategorized_findings() {
        let rules: BTreeSet<_> = RuleCategory::all().iter().copied().collect();
        assert!(filter_violations(vec![raw("x", None)], &rules).is_empty());
    }

    #[test]
    fn empty_rule_set_keeps_nothing() {
        let violations = vec![raw("x", Some(RuleCategory::InvalidType))];
        assert!(filter_violations(violations, &BTreeSet::new()).is_empty());
    }
}
