//! # Violation Map
//!
//! The report returned by a decode: canonical field path → ordered list of
//! violation codes. An empty map means the payload was checked and nothing
//! was found, not that it was skipped.
//!
//! The key [`PAYLOAD_SCOPE`] (`"_"`) is reserved for payload-level failures
//! and is never used for a field.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::rule::ViolationCode;

/// Key under which payload-level failures are reported.
pub const PAYLOAD_SCOPE: &str = "_";

/// Canonical field path → violation codes, ordered by path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ViolationMap {
    entries: BTreeMap<String, Vec<String>>,
}

impl ViolationMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// The single-entry report for bytes that are not a JSON document.
    pub fn invalid_payload() -> Self {
        let mut map = Self::new();
        map.insert(PAYLOAD_SCOPE, ViolationCode::InvalidPayload.as_str());
        map
    }

    /// Appends `code` to the list for `path`. A code already recorded for
    /// the path is not repeated.
    pub fn insert(&mut self, path: impl Into<String>, code: impl Into<String>) {
        let codes = self.entries.entry(path.into()).or_default();
        let code = code.into();
        if !codes.contains(&code) {
            codes.push(code);
        }
    }

    pub fn get(&self, path: &str) -> Option<&[String]> {
        self.entries.get(path).map(|codes| codes.as_slice())
    }

    pub fn contains(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }

    /// Removes every code recorded for `path`.
    pub fn remove(&mut self, path: &str) -> Option<Vec<String>> {
        self.entries.remove(path)
    }

    /// True when the report carries the payload-level failure entry.
    pub fn is_invalid_payload(&self) -> bool {
        self.contains(PAYLOAD_SCOPE)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(|k| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn into_inner(self) -> BTreeMap<String, Vec<String>> {
        self.entries
    }

    /// Indented JSON rendering of the report.
    pub fn to_pretty_json(&self) -> String {
        serde_json::to_string_pretty(&self.entries).unwrap_or_default()
    }
}

impl From<BTreeMap<String, Vec<String>>> for ViolationMap {
    fn from(entries: BTreeMap<String, Vec<String>>) -> Self {
        Self { entries }
    }
}

impl<P, C> FromIterator<(P, C)> for ViolationMap
where
    P: Into<String>,
    C: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (P, C)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (path, code) in iter {
            map.insert(path, code);
        }
        map
    }
}

impl IntoIterator for ViolationMap {
    type Item = (String, Vec<String>);
    type IntoIter = std::collections::btree_map::IntoIter<String, Vec<String>>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
