//! Stoichiometry algebra.
//!
//! A [`Formulas`] value is an ordered list of stoichiometries (element symbol → atom
//! count) from which the sampler is asked to build structures. Lists are built from
//! integer ranges and combined with concatenation, inner and outer products.

use indexmap::IndexMap;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::ops::{Add, Range};
use thiserror::Error;

/// Element symbol → atom count, in insertion order.
pub type Stoichiometry = IndexMap<String, u32>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FormulaError {
    #[error("Cannot take the {operation} of formulas sharing elements: {shared:?}")]
    NotDisjoint {
        operation: &'static str,
        shared: Vec<String>,
    },
    #[error("Range step must be positive")]
    ZeroStep,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Formulas(Vec<Stoichiometry>);

impl Formulas {
    pub fn new(stoichiometries: Vec<Stoichiometry>) -> Self {
        Self(stoichiometries)
    }

    /// `{element: 1}, ..., {element: stop - 1}`.
    pub fn up_to(element: &str, stop: u32) -> Self {
        Self::range(element, 1..stop)
    }

    /// One single-element stoichiometry per count in `counts`. Zero counts are kept.
    pub fn range(element: &str, counts: Range<u32>) -> Self {
        Self(counts.map(|n| single(element, n)).collect())
    }

    pub fn range_step(element: &str, counts: Range<u32>, step: usize) -> Result<Self, FormulaError> {
        if step == 0 {
            return Err(FormulaError::ZeroStep);
        }
        Ok(Self(
            counts.step_by(step).map(|n| single(element, n)).collect(),
        ))
    }

    /// Outer product of `range(element, counts)` over all `elements`.
    pub fn range_product(elements: &[&str], counts: Range<u32>) -> Result<Self, FormulaError> {
        Self::range_product_step(elements, counts, 1)
    }

    /// Outer product of `range_step(element, counts, step)` over all `elements`.
    pub fn range_product_step(
        elements: &[&str],
        counts: Range<u32>,
        step: usize,
    ) -> Result<Self, FormulaError> {
        let mut product = Formulas(vec![Stoichiometry::new()]);
        for element in elements {
            product = product.outer_product(&Self::range_step(element, counts.clone(), step)?)?;
        }
        Ok(product)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Stoichiometry> {
        self.0.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Stoichiometry> {
        self.0.iter()
    }

    /// All elements appearing anywhere in the list, including those with zero counts.
    pub fn elements(&self) -> BTreeSet<&str> {
        self.0
            .iter()
            .flat_map(|s| s.keys().map(String::as_str))
            .collect()
    }

    pub fn concat(&self, other: &Formulas) -> Formulas {
        Formulas(self.0.iter().chain(other.0.iter()).cloned().collect())
    }

    /// Merges stoichiometries pairwise.
    ///
    /// The result is as long as the shorter operand; surplus entries of the longer one
    /// are dropped.
    pub fn inner_product(&self, other: &Formulas) -> Result<Formulas, FormulaError> {
        self.check_disjoint(other, "inner product")?;
        Ok(Formulas(
            self.0
                .iter()
                .zip(other.0.iter())
                .map(|(a, b)| merge(a, b))
                .collect(),
        ))
    }

    /// Merges every stoichiometry of `self` with every one of `other`, iterating `other`
    /// fastest.
    pub fn outer_product(&self, other: &Formulas) -> Result<Formulas, FormulaError> {
        self.check_disjoint(other, "outer product")?;
        Ok(Formulas(
            self.0
                .iter()
                .cartesian_product(other.0.iter())
                .map(|(a, b)| merge(a, b))
                .collect(),
        ))
    }

    /// Keeps stoichiometries whose total atom count lies in `[min_atoms, max_atoms]`.
    pub fn trim(&self, min_atoms: u32, max_atoms: Option<u32>) -> Formulas {
        Formulas(
            self.0
                .iter()
                .filter(|s| {
                    let n = total_atoms(s);
                    n >= min_atoms && max_atoms.is_none_or(|max| n <= max)
                })
                .cloned()
                .collect(),
        )
    }

    fn check_disjoint(&self, other: &Formulas, operation: &'static str) -> Result<(), FormulaError> {
        let mine = self.elements();
        let theirs = other.elements();
        let shared: Vec<String> = mine
            .intersection(&theirs)
            .map(|e| e.to_string())
            .collect();
        if shared.is_empty() {
            Ok(())
        } else {
            Err(FormulaError::NotDisjoint { operation, shared })
        }
    }
}

fn single(element: &str, count: u32) -> Stoichiometry {
    let mut s = Stoichiometry::with_capacity(1);
    s.insert(element.to_string(), count);
    s
}

fn merge(a: &Stoichiometry, b: &Stoichiometry) -> Stoichiometry {
    a.iter()
        .chain(b.iter())
        .map(|(e, &n)| (e.clone(), n))
        .collect()
}

pub fn total_atoms(stoichiometry: &Stoichiometry) -> u32 {
    stoichiometry.values().sum()
}

/// Compact label such as `Cu2Ag1`, in insertion order.
pub fn label(stoichiometry: &Stoichiometry) -> String {
    stoichiometry
        .iter()
        .map(|(element, count)| format!("{element}{count}"))
        .collect()
}

impl Add for Formulas {
    type Output = Formulas;

    fn add(mut self, other: Formulas) -> Formulas {
        self.0.extend(other.0);
        self
    }
}

impl<'a> IntoIterator for &'a Formulas {
    type Item = &'a Stoichiometry;
    type IntoIter = std::slice::Iter<'a, Stoichiometry>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl IntoIterator for Formulas {
    type Item = Stoichiometry;
    type IntoIter = std::vec::IntoIter<Stoichiometry>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl FromIterator<Stoichiometry> for Formulas {
    fn from_iter<T: IntoIterator<Item = Stoichiometry>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stoich(pairs: &[(&str, u32)]) -> Stoichiometry {
        pairs.iter().map(|(e, n)| (e.to_string(), *n)).collect()
    }

    #[test]
    fn up_to_starts_at_one() {
        let f = Formulas::up_to("Cu", 3);
        assert_eq!(
            f,
            Formulas::new(vec![stoich(&[("Cu", 1)]), stoich(&[("Cu", 2)])])
        );
    }

    #[test]
    fn range_keeps_zero_counts() {
        let f = Formulas::range("Cu", 0..2);
        assert_eq!(f.get(0), Some(&stoich(&[("Cu", 0)])));
        assert_eq!(f.len(), 2);
    }

    #[test]
    fn range_step_strides_and_rejects_zero() {
        let f = Formulas::range_step("Cu", 1..8, 3).unwrap();
        let counts: Vec<u32> = f.iter().map(|s| s["Cu"]).collect();
        assert_eq!(counts, vec![1, 4, 7]);
        assert_eq!(
            Formulas::range_step("Cu", 1..8, 0).unwrap_err(),
            FormulaError::ZeroStep
        );
    }

    #[test]
    fn concatenation_of_contiguous_ranges() {
        let whole = Formulas::range("Cu", 1..5);
        let split = Formulas::range("Cu", 1..3) + Formulas::range("Cu", 3..5);
        assert_eq!(whole, split);
        assert_eq!(
            whole,
            Formulas::range("Cu", 1..3).concat(&Formulas::range("Cu", 3..5))
        );
    }

    #[test]
    fn inner_product_zips_stoichiometries() {
        let f = Formulas::up_to("Cu", 3)
            .inner_product(&Formulas::up_to("Ag", 3))
            .unwrap();
        assert_eq!(
            f,
            Formulas::new(vec![
                stoich(&[("Cu", 1), ("Ag", 1)]),
                stoich(&[("Cu", 2), ("Ag", 2)]),
            ])
        );
    }

    #[test]
    fn inner_product_truncates_to_shorter_operand() {
        // Mismatched lengths are not an error; the longer list is cut short.
        let f = Formulas::up_to("Cu", 5)
            .inner_product(&Formulas::up_to("Ag", 3))
            .unwrap();
        assert_eq!(f.len(), 2);
    }

    #[test]
    fn outer_product_covers_all_combinations_in_order() {
        let f = Formulas::up_to("Cu", 3)
            .outer_product(&Formulas::up_to("Ag", 3))
            .unwrap();
        assert_eq!(
            f,
            Formulas::new(vec![
                stoich(&[("Cu", 1), ("Ag", 1)]),
                stoich(&[("Cu", 1), ("Ag", 2)]),
                stoich(&[("Cu", 2), ("Ag", 1)]),
                stoich(&[("Cu", 2), ("Ag", 2)]),
            ])
        );
    }

    #[test]
    fn products_require_disjoint_elements() {
        let cu = Formulas::up_to("Cu", 3);
        let cu_ag = cu.outer_product(&Formulas::up_to("Ag", 2)).unwrap();

        assert_eq!(
            cu.inner_product(&cu_ag).unwrap_err(),
            FormulaError::NotDisjoint {
                operation: "inner product",
                shared: vec!["Cu".to_string()],
            }
        );
        assert!(matches!(
            cu.outer_product(&cu),
            Err(FormulaError::NotDisjoint {
                operation: "outer product",
                ..
            })
        ));
    }

    #[test]
    fn range_product_matches_explicit_outer_product() {
        let f = Formulas::range_product(&["Cu", "Ag"], 1..3).unwrap();
        let expected = Formulas::range("Cu", 1..3)
            .outer_product(&Formulas::range("Ag", 1..3))
            .unwrap();
        assert_eq!(f, expected);
        assert!(Formulas::range_product(&["Cu", "Cu"], 1..3).is_err());
    }

    #[test]
    fn range_product_strides_every_element() {
        let f = Formulas::range_product_step(&["Cu", "Ag"], 0..5, 2).unwrap();
        let expected = Formulas::range_step("Cu", 0..5, 2)
            .unwrap()
            .outer_product(&Formulas::range_step("Ag", 0..5, 2).unwrap())
            .unwrap();
        assert_eq!(f, expected);
        assert_eq!(f.len(), 9);
        assert!(f.iter().all(|s| s.values().all(|n| n % 2 == 0)));
        assert_eq!(
            Formulas::range_product_step(&["Cu"], 0..5, 0).unwrap_err(),
            FormulaError::ZeroStep
        );
    }

    #[test]
    fn trim_keeps_inclusive_bounds() {
        let f = Formulas::range("Cu", 1..3).trim(1, Some(2));
        assert_eq!(f, Formulas::range("Cu", 1..3));

        let f = Formulas::range_product(&["Cu", "Ag"], 0..3)
            .unwrap()
            .trim(2, Some(3));
        assert!(f.iter().all(|s| (2..=3).contains(&total_atoms(s))));
        assert_eq!(f.len(), 5);

        assert_eq!(Formulas::range("Cu", 0..10).trim(8, None).len(), 2);
    }

    #[test]
    fn elements_include_every_symbol() {
        let f = Formulas::up_to("Cu", 2) + Formulas::range("Ag", 0..1);
        assert_eq!(f.elements().into_iter().collect::<Vec<_>>(), vec!["Ag", "Cu"]);
    }

    #[test]
    fn equality_ignores_key_order() {
        let a = Formulas::new(vec![stoich(&[("Cu", 1), ("Ag", 2)])]);
        let b = Formulas::new(vec![stoich(&[("Ag", 2), ("Cu", 1)])]);
        assert_eq!(a, b);
    }

    #[test]
    fn label_follows_insertion_order() {
        assert_eq!(label(&stoich(&[("Cu", 2), ("Ag", 1)])), "Cu2Ag1");
    }

    #[test]
    fn json_form_is_a_list_of_maps() {
        let f = Formulas::up_to("Cu", 2);
        let json = serde_json::to_string(&f).unwrap();
        assert_eq!(json, r#"[{"Cu":1}]"#);
        assert_eq!(serde_json::from_str::<Formulas>(&json).unwrap(), f);
    }
}
