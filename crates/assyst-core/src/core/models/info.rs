use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Metadata attached to a [`Structure`](super::structure::Structure).
///
/// The identity slots (`uuid`, `seed`, `lineage`) and the provenance tag
/// (`perturbation`) are typed, everything else a sampler or relaxer wants to record
/// (space group, relaxation settings, ...) lives in `extra` and is flattened into the
/// same JSON object on serialization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Info {
    /// Identifier of the structure in its current state.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    /// Identifier of the earliest ancestor. Set once, never overwritten.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<String>,
    /// Previous identifiers, oldest first.
    ///
    /// Stored as an immutable shared slice: cloning a structure shares it, and every
    /// identity change replaces it with a new slice instead of appending in place, so
    /// siblings branched from one parent never see each other's entries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lineage: Option<Arc<[String]>>,
    /// `+`-joined identity strings of the perturbations applied so far.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub perturbation: Option<String>,
    /// Free-form metadata.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl Info {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that the perturbation identified by `label` was applied.
    pub fn tag_perturbation(&mut self, label: &str) {
        match &mut self.perturbation {
            Some(tag) => {
                tag.push('+');
                tag.push_str(label);
            }
            None => self.perturbation = Some(label.to_string()),
        }
    }

    pub fn lineage(&self) -> &[String] {
        self.lineage.as_deref().unwrap_or(&[])
    }

    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.extra.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) {
        self.extra.insert(key.into(), value.into());
    }

    /// Merges free-form metadata from `other`, overwriting existing keys.
    pub fn update(&mut self, other: BTreeMap<String, serde_json::Value>) {
        self.extra.extend(other);
    }
}
