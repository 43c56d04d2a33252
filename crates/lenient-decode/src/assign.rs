//! # Lenient Assignment
//!
//! Best-effort population of a target from a parsed payload. Each field is
//! tried on its own: a value whose wire type fits is stored, a value that
//! does not is skipped and the field keeps whatever it held before. Nothing
//! here returns an error or panics.
//!
//! A container whose own wire type fits is always kept, even when some of
//! its contents are not: an `Option` of a record with one bad field is still
//! `Some`, holding the fields that did fit. [`Lenient::fits`] answers the
//! outer question; the `bool` each assignment returns only says whether
//! everything offered was taken.
//!
//! Detecting and reporting mismatches is the validator's job.

use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;

use lenient_core::WireType;
use lenient_schema::parse_payload;
use serde_json::{Map, Value};

/// Types that can absorb a JSON value without failing.
pub trait Lenient {
    /// Stores as much of `value` as fits. Returns `false` if any part of it
    /// was skipped. A scalar that does not fit leaves `self` untouched.
    fn assign_lenient(&mut self, value: &Value) -> bool;

    /// Whether `value` has a wire shape this type can hold at all, whatever
    /// happens to its nested parts.
    fn fits(value: &Value) -> bool
    where
        Self: Sized;
}

/// Populates `target` from raw payload bytes.
///
/// Malformed or empty bytes leave `target` unmodified and return `false`.
pub fn assign<T: Lenient + ?Sized>(payload: &[u8], target: &mut T) -> bool {
    match parse_payload(payload) {
        Ok(value) => assign_value(&value, target),
        Err(e) => {
            tracing::debug!(error = %e, "payload not assignable, target left as is");
            false
        }
    }
}

/// Populates `target` from an already parsed payload.
pub fn assign_value<T: Lenient + ?Sized>(value: &Value, target: &mut T) -> bool {
    target.assign_lenient(value)
}

/// Assigns the member `wire_name` of `object` to `slot`.
///
/// An absent member is not a failure; a member that does not fit is skipped
/// and logged.
pub fn assign_field<T: Lenient + ?Sized>(
    slot: &mut T,
    wire_name: &str,
    object: &Map<String, Value>,
) -> bool {
    let Some(value) = object.get(wire_name) else {
        return true;
    };
    let taken = slot.assign_lenient(value);
    if !taken {
        tracing::debug!(
            field = wire_name,
            given = %WireType::of(value),
            "skipped value that does not fit its field"
        );
    }
    taken
}

impl Lenient for String {
    fn assign_lenient(&mut self, value: &Value) -> bool {
        match value {
            Value::String(s) => {
                self.clone_from(s);
                true
            }
            _ => false,
        }
    }

    fn fits(value: &Value) -> bool {
        value.is_string()
    }
}

impl Lenient for bool {
    fn assign_lenient(&mut self, value: &Value) -> bool {
        match value {
            Value::Bool(b) => {
                *self = *b;
                true
            }
            _ => false,
        }
    }

    fn fits(value: &Value) -> bool {
        value.is_boolean()
    }
}

/// `value` as an integer of type `T`, if it is one and in range.
fn integer<T>(value: &Value) -> Option<T>
where
    T: TryFrom<i64> + TryFrom<u64>,
{
    let Value::Number(n) = value else {
        return None;
    };
    n.as_i64()
        .and_then(|i| T::try_from(i).ok())
        .or_else(|| n.as_u64().and_then(|u| T::try_from(u).ok()))
}

macro_rules! lenient_integer {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl Lenient for $ty {
                fn assign_lenient(&mut self, value: &Value) -> bool {
                    match integer::<$ty>(value) {
                        Some(v) => {
                            *self = v;
                            true
                        }
                        None => false,
                    }
                }

                fn fits(value: &Value) -> bool {
                    integer::<$ty>(value).is_some()
                }
            }
        )+
    };
}

lenient_integer!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

impl Lenient for f64 {
    fn assign_lenient(&mut self, value: &Value) -> bool {
        match value.as_f64() {
            Some(v) => {
                *self = v;
                true
            }
            None => false,
        }
    }

    fn fits(value: &Value) -> bool {
        value.is_number()
    }
}

impl Lenient for f32 {
    fn assign_lenient(&mut self, value: &Value) -> bool {
        match value.as_f64() {
            Some(v) => {
                *self = v as f32;
                true
            }
            None => false,
        }
    }

    fn fits(value: &Value) -> bool {
        value.is_number()
    }
}

impl Lenient for Value {
    fn assign_lenient(&mut self, value: &Value) -> bool {
        self.clone_from(value);
        true
    }

    fn fits(_: &Value) -> bool {
        true
    }
}

impl<T: Lenient> Lenient for Box<T> {
    fn assign_lenient(&mut self, value: &Value) -> bool {
        (**self).assign_lenient(value)
    }

    fn fits(value: &Value) -> bool {
        T::fits(value)
    }
}

/// `null` clears the option. A value that fits `T` becomes `Some`, holding
/// whatever parts of it were taken; anything else leaves the option as is.
impl<T: Lenient + Default> Lenient for Option<T> {
    fn assign_lenient(&mut self, value: &Value) -> bool {
        if value.is_null() {
            *self = None;
            return true;
        }
        if !T::fits(value) {
            return false;
        }
        let mut inner = T::default();
        let taken = inner.assign_lenient(value);
        *self = Some(inner);
        taken
    }

    fn fits(value: &Value) -> bool {
        value.is_null() || T::fits(value)
    }
}

/// Elements that do not fit keep their default value so indices still line
/// up with the payload.
impl<T: Lenient + Default> Lenient for Vec<T> {
    fn assign_lenient(&mut self, value: &Value) -> bool {
        let Value::Array(items) = value else {
            return false;
        };
        let mut all_taken = true;
        let mut out = Vec::with_capacity(items.len());
        for item in items {
            let mut element = T::default();
            all_taken &= element.assign_lenient(item);
            out.push(element);
        }
        *self = out;
        all_taken
    }

    fn fits(value: &Value) -> bool {
        value.is_array()
    }
}

/// Entries whose wire type does not fit are left out; the rest are kept,
/// partially assigned if need be.
impl<T: Lenient + Default> Lenient for BTreeMap<String, T> {
    fn assign_lenient(&mut self, value: &Value) -> bool {
        let Value::Object(entries) = value else {
            return false;
        };
        let mut all_taken = true;
        self.clear();
        for (key, item) in entries {
            if !T::fits(item) {
                all_taken = false;
                continue;
            }
            let mut element = T::default();
            all_taken &= element.assign_lenient(item);
            self.insert(key.clone(), element);
        }
        all_taken
    }

    fn fits(value: &Value) -> bool {
        value.is_object()
    }
}

impl<T: Lenient + Default, S: BuildHasher> Lenient for HashMap<String, T, S> {
    fn assign_lenient(&mut self, value: &Value) -> bool {
        let Value::Object(entries) = value else {
            return false;
        };
        let mut all_taken = true;
        self.clear();
        for (key, item) in entries {
            if !T::fits(item) {
                all_taken = false;
                continue;
            }
            let mut element = T::default();
            all_taken &= element.assign_lenient(item);
            self.insert(key.clone(), element);
        }
        all_taken
    }

    fn fits(value: &Value) -> bool {
        value.is_object()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn scalars_take_matching_values() {
        let mut s = String::from("old");
        assert!(s.assign_lenient(&json!("new")));
        assert_eq!(s, "new");

        let mut b = false;
        assert!(b.assign_lenient(&json!(true)));
        assert!(b);

        let mut f = 0.0f64;
        assert!(f.assign_lenient(&json!(2)));
        assert_eq!(f, 2.0);
    }

    #[test]
    fn mismatched_scalars_keep_prior_value() {
        let mut s = String::from("old");
        assert!(!s.assign_lenient(&json!(2)));
        assert_eq!(s, "old");

        let mut n = 7i32;
        assert!(!n.assign_lenient(&json!("seven")));
        assert!(!n.assign_lenient(&json!(1.5)));
        assert_eq!(n, 7);
    }

    #[test]
    fn integers_respect_their_range() {
        let mut small = 0u8;
        assert!(!small.assign_lenient(&json!(300)));
        assert!(!small.assign_lenient(&json!(-1)));
        assert!(small.assign_lenient(&json!(255)));
        assert_eq!(small, 255);

        let mut big = 0u64;
        assert!(big.assign_lenient(&json!(u64::MAX)));
        assert_eq!(big, u64::MAX);
    }

    #[test]
    fn options_accept_null_and_inner_values() {
        let mut name: Option<String> = Some("x".into());
        assert!(name.assign_lenient(&json!(null)));
        assert_eq!(name, None);
        assert!(name.assign_lenient(&json!("ada")));
        assert_eq!(name.as_deref(), Some("ada"));
        assert!(!name.assign_lenient(&json!(3)));
        assert_eq!(name.as_deref(), Some("ada"));
    }

    #[test]
    fn vectors_default_unfit_elements() {
        let mut emails: Vec<String> = vec![];
        assert!(!emails.assign_lenient(&json!(["a@example.com", 0, "b@example.com"])));
        assert_eq!(emails, vec!["a@example.com", "", "b@example.com"]);
    }

    #[test]
    fn optional_containers_keep_what_fit() {
        let mut emails: Option<Vec<String>> = None;
        assert!(!emails.assign_lenient(&json!(["a@example.com", 1])));
        assert_eq!(emails, Some(vec!["a@example.com".to_string(), String::new()]));

        assert!(!emails.assign_lenient(&json!("a@example.com")));
        assert_eq!(emails.as_ref().map(Vec::len), Some(2));
    }

    #[test]
    fn fits_checks_only_the_outer_wire_type() {
        assert!(<Vec<u8>>::fits(&json!([300])));
        assert!(!<Vec<u8>>::fits(&json!({})));
        assert!(!u8::fits(&json!(300)));
        assert!(<Option<String>>::fits(&json!(null)));
        assert!(!<Option<String>>::fits(&json!(1)));
        assert!(<BTreeMap<String, bool>>::fits(&json!({"on": 1})));
        assert!(Value::fits(&json!(1.5)));
    }

    #[test]
    fn vectors_reject_non_arrays() {
        let mut ids = vec![1i64];
        assert!(!ids.assign_lenient(&json!({"0": 1})));
        assert_eq!(ids, vec![1]);
    }

    #[test]
    fn maps_drop_unfit_entries() {
        let mut counts: BTreeMap<String, u32> = BTreeMap::new();
        assert!(!counts.assign_lenient(&json!({"a": 1, "b": "two"})));
        assert_eq!(counts.len(), 1);
        assert_eq!(counts["a"], 1);

        let mut grouped: BTreeMap<String, Vec<u8>> = BTreeMap::new();
        assert!(!grouped.assign_lenient(&json!({"a": [1, "x"], "b": 2})));
        assert_eq!(grouped.len(), 1);
        assert_eq!(grouped["a"], vec![1, 0]);

        let mut hashed: HashMap<String, bool> = HashMap::new();
        assert!(hashed.assign_lenient(&json!({"on": true})));
        assert_eq!(hashed.get("on"), Some(&true));
    }

    #[test]
    fn raw_values_take_anything() {
        let mut v = Value::Null;
        assert!(v.assign_lenient(&json!({"k": [1, 2]})));
        assert_eq!(v, json!({"k": [1, 2]}));
    }

    #[test]
    fn malformed_bytes_leave_target_alone() {
        let mut s = String::from("keep");
        for bytes in [&b"{"[..], b"}", b"-", b""] {
            assert!(!assign(bytes, &mut s));
            assert_eq!(s, "keep");
        }
        assert!(assign(br#""fresh""#, &mut s));
        assert_eq!(s, "fresh");
    }

    #[test]
    fn absent_fields_are_not_failures() {
        let object = json!({"present": "x"});
        let object = object.as_object().unwrap();
        let mut slot = String::from("unchanged");
        assert!(assign_field(&mut slot, "absent", object));
        assert_eq!(slot, "unchanged");
        assert!(!assign_field(&mut slot, "present", json!({"present": 1}).as_object().unwrap()));
        assert_eq!(slot, "unchanged");
        assert!(assign_field(&mut slot, "present", object));
        assert_eq!(slot, "x");
    }
}
