use super::Validator;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::path::Path;
use tracing::warn;

/// A named, inheritable bundle of permissions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionPreset {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Presets this one inherits from, in declaration order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extends: Vec<String>,
}

impl PermissionPreset {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            extends: Vec::new(),
        }
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn extends<I, S>(mut self, parents: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extends.extend(parents.into_iter().map(Into::into));
        self
    }
}

/// Deduplicated permissions reachable from a list of grants.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PermissionSet(BTreeSet<String>);

impl PermissionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, permission: &str) -> bool {
        self.0.contains(permission)
    }

    /// Returns `false` if the permission was already present.
    pub fn insert(&mut self, permission: impl Into<String>) -> bool {
        self.0.insert(permission.into())
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for PermissionSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl IntoIterator for PermissionSet {
    type Item = String;
    type IntoIter = std::collections::btree_set::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Immutable registry of presets and their inheritance edges.
///
/// The `extends` graph is not validated and may contain cycles or refer to
/// unknown presets.
#[derive(Debug, Clone, Default)]
pub struct PresetGraph {
    presets: Vec<PermissionPreset>,
    index: HashMap<String, usize>,
}

impl PresetGraph {
    /// When several presets share a name, the first one wins.
    pub fn new(presets: Vec<PermissionPreset>) -> Self {
        let mut index = HashMap::with_capacity(presets.len());
        for (position, preset) in presets.iter().enumerate() {
            if index.contains_key(&preset.name) {
                warn!(preset = %preset.name, "duplicate preset ignored");
                continue;
            }
            index.insert(preset.name.clone(), position);
        }
        Self { presets, index }
    }

    /// Parses a JSON array of presets.
    pub fn from_json(json: &str) -> Result<Self> {
        let presets: Vec<PermissionPreset> = serde_json::from_str(json)?;
        Ok(Self::new(presets))
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// All presets in registration order.
    pub fn list(&self) -> &[PermissionPreset] {
        &self.presets
    }

    pub fn get(&self, name: &str) -> Option<&PermissionPreset> {
        self.index.get(name).map(|&position| &self.presets[position])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Expand `granted` through the `extends` edges.
    ///
    /// Names without a registered preset are dropped, and their inheritance
    /// is not followed. A name already in the result is never revisited, so
    /// cyclic graphs terminate.
    pub fn expand<I, S>(&self, granted: I) -> PermissionSet
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut expanded = PermissionSet::new();
        let mut pending: Vec<String> = granted
            .into_iter()
            .map(|name| name.as_ref().to_string())
            .collect();
        // Depth-first, visiting names in the order they were given
        pending.reverse();

        while let Some(name) = pending.pop() {
            if expanded.contains(&name) {
                continue;
            }
            let Some(preset) = self.get(&name) else {
                continue;
            };
            pending.extend(preset.extends.iter().rev().cloned());
            expanded.insert(name);
        }

        expanded
    }

    /// A validator bound to the expansion of `granted`.
    pub fn take<I, S>(&self, granted: I) -> Validator
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Validator::new(self.expand(granted))
    }
}
