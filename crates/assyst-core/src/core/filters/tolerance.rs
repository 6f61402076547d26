//! Minimum-distance specifications shared by the distance filter and the sampler.

use super::distance::{DistanceFilter, Radii};
use crate::core::utils::elements;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ToleranceError {
    #[error("Unknown tolerance preset '{0}' (expected metallic, atomic, molecular or vdW)")]
    UnknownPreset(String),
}

/// Named radius sets, each a fixed multiple of a tabulated element radius.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TolerancePreset {
    Metallic,
    Atomic,
    Molecular,
    #[serde(rename = "vdW")]
    Vdw,
}

impl TolerancePreset {
    /// Radius of `element` under this preset, or `None` for elements without table data.
    pub fn radius(self, element: &str) -> Option<f64> {
        let r = elements::radii(element)?;
        Some(match self {
            Self::Metallic => 0.5 * r.metallic.unwrap_or(r.covalent),
            Self::Atomic => 0.5 * r.covalent,
            Self::Molecular => 1.2 * r.covalent,
            Self::Vdw => 0.5 * r.vdw,
        })
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Metallic => "metallic",
            Self::Atomic => "atomic",
            Self::Molecular => "molecular",
            Self::Vdw => "vdW",
        }
    }
}

impl fmt::Display for TolerancePreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TolerancePreset {
    type Err = ToleranceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "metallic" => Ok(Self::Metallic),
            "atomic" => Ok(Self::Atomic),
            "molecular" => Ok(Self::Molecular),
            "vdW" => Ok(Self::Vdw),
            other => Err(ToleranceError::UnknownPreset(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToleranceEntry {
    pub a: String,
    pub b: String,
    pub distance: f64,
}

/// Minimum allowed distance per unordered element pair.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToleranceMatrix {
    pub entries: Vec<ToleranceEntry>,
}

impl ToleranceMatrix {
    /// Builds `r(a) + r(b)` for every unordered pair of `elements`, self pairs included.
    pub fn from_radii<'a>(
        elements: impl IntoIterator<Item = &'a str>,
        radius: impl Fn(&str) -> f64,
    ) -> Self {
        let elements: Vec<&str> = elements.into_iter().collect();
        let mut entries = Vec::new();
        for (i, a) in elements.iter().enumerate() {
            for b in &elements[i..] {
                entries.push(ToleranceEntry {
                    a: a.to_string(),
                    b: b.to_string(),
                    distance: radius(a) + radius(b),
                });
            }
        }
        Self { entries }
    }

    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|e| (e.a == a && e.b == b) || (e.a == b && e.b == a))
            .map(|e| e.distance)
    }

    /// Sets the distance for a pair, replacing an existing entry.
    pub fn set(&mut self, a: &str, b: &str, distance: f64) {
        match self
            .entries
            .iter_mut()
            .find(|e| (e.a == a && e.b == b) || (e.a == b && e.b == a))
        {
            Some(entry) => entry.distance = distance,
            None => self.entries.push(ToleranceEntry {
                a: a.to_string(),
                b: b.to_string(),
                distance,
            }),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Any accepted way of stating minimum distances for the sampler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Tolerance {
    Preset(TolerancePreset),
    Radii(BTreeMap<String, f64>),
    Matrix(ToleranceMatrix),
    Distance(DistanceFilter),
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::Preset(TolerancePreset::Metallic)
    }
}

impl Tolerance {
    /// Resolves to a tolerance matrix over `elements`.
    ///
    /// An empty radius map means "no constraint" and resolves to `None`.
    pub fn resolve(&self, elements: &[&str]) -> Option<ToleranceMatrix> {
        match self {
            Self::Preset(preset) => Radii::Preset(*preset).to_tolerance_matrix(elements),
            Self::Radii(radii) => Radii::Explicit(radii.clone()).to_tolerance_matrix(elements),
            Self::Matrix(matrix) => Some(matrix.clone()),
            Self::Distance(filter) => filter.to_tolerance_matrix(elements),
        }
    }
}

impl From<TolerancePreset> for Tolerance {
    fn from(preset: TolerancePreset) -> Self {
        Self::Preset(preset)
    }
}

impl FromStr for Tolerance {
    type Err = ToleranceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(Self::Preset)
    }
}
