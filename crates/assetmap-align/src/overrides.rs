//! Curated source → target name mappings.
//!
//! Overrides are configuration data: one asset-class map per network and one
//! attribute map per source asset class, loaded from JSON.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// `source name → target name`, iterated in key order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OverrideMap(BTreeMap<String, String>);

impl OverrideMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, source: impl Into<String>, target: impl Into<String>) {
        self.0.insert(source.into(), target.into());
    }

    pub fn get(&self, source: &str) -> Option<&str> {
        self.0.get(source).map(String::as_str)
    }

    pub fn contains_key(&self, source: &str) -> bool {
        self.0.contains_key(source)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>, T: Into<String>> FromIterator<(S, T)> for OverrideMap {
    fn from_iter<I: IntoIterator<Item = (S, T)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(s, t)| (s.into(), t.into()))
                .collect(),
        )
    }
}

/// All overrides for one network.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkOverrides {
    /// Source asset class → target asset class.
    #[serde(default)]
    pub asset_classes: OverrideMap,
    /// Source asset class → (source attribute → target attribute).
    #[serde(default)]
    pub attributes: BTreeMap<String, OverrideMap>,
}

impl NetworkOverrides {
    /// Attribute overrides for a source asset class (empty if none curated).
    pub fn attributes_for(&self, source_class: &str) -> OverrideMap {
        self.attributes
            .get(source_class)
            .cloned()
            .unwrap_or_default()
    }
}
