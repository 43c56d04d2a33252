//! # Decoder
//!
//! The public entry point. [`decode_into`] runs, in order:
//!
//! 1. the before hook, which may rewrite the payload bytes;
//! 2. lenient assignment of the payload into the target, unconditionally;
//! 3. nothing else if the payload is empty or no rule was requested;
//! 4. schema reflection and validation, where unparseable bytes or an
//!    uncompilable schema yield `{"_": ["INVALID_PAYLOAD"]}`;
//! 5. rule filtering and path normalization of the findings;
//! 6. the after hook, which may rewrite or replace the report.
//!
//! Decoding never returns an error and never panics. Each call builds its
//! own intermediate state; only compiled schemas are shared, through
//! [`SchemaCache::global`].

use std::any::{Any, TypeId};
use std::borrow::Cow;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use lenient_core::{AttributeTree, RuleCategory, TypeOverride, ViolationMap};
use lenient_schema::{
    filter_violations, normalize, parse_payload, SchemaCache, SchemaReflector, ValidateError,
    Validator,
};
use serde_json::Value;

use crate::assign::assign_value;
use crate::record::Record;

/// Rewrites payload bytes before decoding. Receives the bytes and the target.
pub type BeforeHook = Arc<dyn Fn(&[u8], &dyn Any) -> Vec<u8> + Send + Sync>;

/// Transforms the final report.
pub type AfterHook = Arc<dyn Fn(ViolationMap) -> ViolationMap + Send + Sync>;

/// Per-call decode settings.
#[derive(Clone)]
pub struct DecodeOptions {
    /// Rules to check. Empty means no validation at all.
    pub rules: BTreeSet<RuleCategory>,
    /// Wire representations for opaque record types.
    pub overrides: Vec<TypeOverride>,
    pub before_hook: Option<BeforeHook>,
    pub after_hook: Option<AfterHook>,
    /// Share compiled schemas through the process-wide cache.
    pub cache_schemas: bool,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            rules: BTreeSet::new(),
            overrides: Vec::new(),
            before_hook: None,
            after_hook: None,
            cache_schemas: true,
        }
    }
}

impl fmt::Debug for DecodeOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecodeOptions")
            .field("rules", &self.rules)
            .field("overrides", &self.overrides)
            .field("before_hook", &self.before_hook.is_some())
            .field("after_hook", &self.after_hook.is_some())
            .field("cache_schemas", &self.cache_schemas)
            .finish()
    }
}

impl DecodeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rules<I>(mut self, rules: I) -> Self
    where
        I: IntoIterator<Item = RuleCategory>,
    {
        self.rules.extend(rules);
        self
    }

    pub fn with_rule(mut self, rule: RuleCategory) -> Self {
        self.rules.insert(rule);
        self
    }

    /// Requests every rule.
    pub fn with_all_rules(self) -> Self {
        self.with_rules(RuleCategory::all().iter().copied())
    }

    pub fn with_overrides<I>(mut self, overrides: I) -> Self
    where
        I: IntoIterator<Item = TypeOverride>,
    {
        self.overrides.extend(overrides);
        self
    }

    pub fn with_override(mut self, o: TypeOverride) -> Self {
        self.overrides.push(o);
        self
    }

    pub fn with_before_hook<F>(mut self, hook: F) -> Self
    where
        F: Fn(&[u8], &dyn Any) -> Vec<u8> + Send + Sync + 'static,
    {
        self.before_hook = Some(Arc::new(hook));
        self
    }

    pub fn with_after_hook<F>(mut self, hook: F) -> Self
    where
        F: Fn(ViolationMap) -> ViolationMap + Send + Sync + 'static,
    {
        self.after_hook = Some(Arc::new(hook));
        self
    }

    pub fn cache_schemas(mut self, enabled: bool) -> Self {
        self.cache_schemas = enabled;
        self
    }

    fn finish(&self, violations: ViolationMap) -> ViolationMap {
        match &self.after_hook {
            Some(hook) => hook(violations),
            None => violations,
        }
    }
}

/// Decodes `payload` into `target` and reports violations of the requested rules.
///
/// `target` is populated in place, best effort, whatever the report says.
pub fn decode_into<T: Record>(payload: &[u8], target: &mut T, options: &DecodeOptions) -> ViolationMap {
    let payload: Cow<'_, [u8]> = match &options.before_hook {
        Some(hook) => Cow::Owned(hook(payload, &*target as &dyn Any)),
        None => Cow::Borrowed(payload),
    };

    let parsed = parse_payload(&payload);
    if let Ok(value) = &parsed {
        assign_value(value, target);
    }

    if payload.is_empty() || options.rules.is_empty() {
        return options.finish(ViolationMap::new());
    }

    let instance = match parsed {
        Ok(value) => value,
        Err(e) => {
            tracing::debug!(error = %e, "payload rejected");
            return options.finish(ViolationMap::invalid_payload());
        }
    };

    let validator = match validator_for::<T>(options) {
        Ok(validator) => validator,
        Err(e) => {
            tracing::debug!(error = %e, "schema rejected");
            return options.finish(ViolationMap::invalid_payload());
        }
    };

    let mut violations = ViolationMap::new();
    for raw in filter_violations(validator.validate_value(&instance), &options.rules) {
        let normalized = normalize(&raw);
        violations.insert(normalized.path, normalized.code);
    }

    options.finish(violations)
}

/// Decodes `payload` into a fresh `T::default()`.
pub fn decode<T: Record>(payload: &[u8], options: &DecodeOptions) -> (T, ViolationMap) {
    let mut target = T::default();
    let violations = decode_into(payload, &mut target, options);
    (target, violations)
}

/// Canonical paths of every field occurrence of `T` in `payload`, array
/// elements included. Unparseable bytes yield the declared top-level shape.
pub fn field_paths<T: Record>(payload: &[u8]) -> Vec<String> {
    let value = parse_payload(payload).unwrap_or(Value::Null);
    let tree = AttributeTree::from_descriptor(&T::descriptor(), &value);
    tree.paths().into_iter().map(str::to_string).collect()
}

fn validator_for<T: Record>(options: &DecodeOptions) -> Result<Arc<Validator>, ValidateError> {
    let reflector =
        SchemaReflector::for_rules(&options.rules).with_overrides(options.overrides.iter().cloned());
    if options.cache_schemas {
        SchemaCache::global().get_or_compile(TypeId::of::<T>(), T::descriptor, &reflector)
    } else {
        Validator::new(reflector.reflect(&T::descriptor())).map(Arc::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lenient_core::WireType;

    crate::record! {
        #[derive(Debug, Default, Clone, PartialEq)]
        struct Person {
            id: String => "id" required,
            name: Option<String> => "name" required,
            email: String => "email",
        }
    }

    fn strict() -> DecodeOptions {
        DecodeOptions::new().with_rules([RuleCategory::InvalidType, RuleCategory::RequiredMissing])
    }

    #[test]
    fn target_is_populated_even_when_violations_are_found() {
        let mut p = Person::default();
        let violations = decode_into(br#"{"id": 7, "email": "ada@example.com"}"#, &mut p, &strict());
        assert_eq!(p.email, "ada@example.com");
        assert_eq!(p.id, "");
        assert_eq!(violations.get("id").unwrap(), &["INVALID_TYPE"]);
        assert_eq!(violations.get("name").unwrap(), &["REQUIRED_ATTRIBUTE_MISSING"]);
    }

    #[test]
    fn no_rules_means_no_schema_work() {
        let (p, violations) = decode::<Person>(br#"{"id": "x", "bogus": 1}"#, &DecodeOptions::new());
        assert!(violations.is_empty());
        assert_eq!(p.id, "x");
    }

    #[test]
    fn cached_and_uncached_decoding_agree() {
        let payload = br#"{"id": 1, "name": 2}"#;
        let (_, cached) = decode::<Person>(payload, &strict());
        let (_, fresh) = decode::<Person>(payload, &strict().cache_schemas(false));
        assert_eq!(cached, fresh);
        assert_eq!(cached.len(), 2);
    }

    #[test]
    fn before_hook_sees_the_target() {
        let options = strict().with_before_hook(|bytes, target| {
            assert!(target.downcast_ref::<Person>().is_some());
            bytes.to_vec()
        });
        let (p, _) = decode::<Person>(br#"{"id": "a", "name": "b"}"#, &options);
        assert_eq!(p.name.as_deref(), Some("b"));
    }

    #[test]
    fn options_debug_hides_hooks() {
        let options = strict()
            .with_override(TypeOverride::new("Person", WireType::String))
            .with_after_hook(|m| m);
        let rendered = format!("{options:?}");
        assert!(rendered.contains("after_hook: true"));
        assert!(rendered.contains("before_hook: false"));
    }

    #[test]
    fn field_paths_follow_payload_arrays() {
        crate::record! {
            #[derive(Debug, Default)]
            struct Mailbox {
                emails: Vec<String> => "emails",
            }
        }
        assert_eq!(
            field_paths::<Mailbox>(br#"{"emails": ["a", "b"]}"#),
            vec!["emails", "emails[0]", "emails[1]"]
        );
        assert_eq!(field_paths::<Mailbox>(b"{"), vec!["emails"]);
    }
}
