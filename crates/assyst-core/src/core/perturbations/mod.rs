//! # Perturbations Module
//!
//! Randomized, reproducible transformations of structures.
//!
//! Every stochastic perturbation owns exactly one [`RngHandle`]. The handle is part of
//! the serialized form, so storing a perturbation and loading it again resumes the
//! random sequence where it stopped.
//!
//! - [`rattle`] - Gaussian displacement of atoms, optionally scaled per element
//! - [`stretch`] - Random strain of the cell
//! - [`composite`] - Series of perturbations and random choice between two
//! - [`functions`] - The in-place primitives, without tagging or identity changes
//!
//! Leaf perturbations record themselves in `info.perturbation` and give the structure a
//! new identity before transforming it.

pub mod composite;
pub mod functions;
pub mod rattle;
pub mod rng;
pub mod stretch;

use crate::core::lineage::assign_new_identity;
use crate::core::models::structure::Structure;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Add;

pub use composite::{RandomChoice, Series};
pub use functions::PerturbationError;
pub use rattle::{ElementScaledRattle, Rattle};
pub use rng::{RngHandle, RngState};
pub use stretch::Stretch;

/// Something that turns one structure into a new one.
pub trait Perturb {
    fn perturb(&mut self, structure: Structure) -> Result<Structure, PerturbationError>;

    /// Whether [`perturb`](Perturb::perturb) gives its output a new identity itself.
    ///
    /// When `false`, the pipeline driver assigns one after each successful call.
    fn assigns_identity(&self) -> bool {
        true
    }
}

/// Plain functions can be used as perturbations; they never manage identities.
impl<F> Perturb for F
where
    F: FnMut(Structure) -> Result<Structure, PerturbationError>,
{
    fn perturb(&mut self, structure: Structure) -> Result<Structure, PerturbationError> {
        self(structure)
    }

    fn assigns_identity(&self) -> bool {
        false
    }
}

/// Common preamble of leaf perturbations: optional supercell, tag, new identity.
fn prepare(
    structure: Structure,
    label: &str,
    create_supercells: bool,
) -> Result<Structure, PerturbationError> {
    let mut structure = if create_supercells && structure.len() == 1 {
        structure.repeat([2, 2, 2])?
    } else {
        structure
    };
    structure.info_mut().tag_perturbation(label);
    assign_new_identity(&mut structure);
    Ok(structure)
}

/// A float parameter in a perturbation label, printed like Python's `repr`: shortest
/// round-trip digits, exponents signed with at least two digits (`1e-05`, `1e+16`).
struct Param(f64);

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_nan() {
            return f.write_str("nan");
        }
        let repr = format!("{:?}", self.0);
        match repr.split_once('e') {
            Some((mantissa, exponent)) => {
                let (sign, digits) = match exponent.strip_prefix('-') {
                    Some(digits) => ('-', digits),
                    None => ('+', exponent),
                };
                write!(f, "{mantissa}e{sign}{digits:0>2}")
            }
            None => f.write_str(&repr),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Perturbation {
    Rattle(Rattle),
    ElementScaledRattle(ElementScaledRattle),
    Stretch(Stretch),
    Series(Series),
    RandomChoice(RandomChoice),
}

impl Perturb for Perturbation {
    fn perturb(&mut self, structure: Structure) -> Result<Structure, PerturbationError> {
        match self {
            Perturbation::Rattle(p) => p.perturb(structure),
            Perturbation::ElementScaledRattle(p) => p.perturb(structure),
            Perturbation::Stretch(p) => p.perturb(structure),
            Perturbation::Series(p) => p.perturb(structure),
            Perturbation::RandomChoice(p) => p.perturb(structure),
        }
    }
}

impl fmt::Display for Perturbation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Perturbation::Rattle(p) => fmt::Display::fmt(p, f),
            Perturbation::ElementScaledRattle(p) => fmt::Display::fmt(p, f),
            Perturbation::Stretch(p) => fmt::Display::fmt(p, f),
            Perturbation::Series(p) => fmt::Display::fmt(p, f),
            Perturbation::RandomChoice(p) => fmt::Display::fmt(p, f),
        }
    }
}

impl Perturbation {
    fn into_members(self) -> Vec<Perturbation> {
        match self {
            Perturbation::Series(series) => series.perturbations,
            other => vec![other],
        }
    }
}

/// `a + b` applies `a`, then `b`. Series operands are flattened.
impl<T: Into<Perturbation>> Add<T> for Perturbation {
    type Output = Perturbation;

    fn add(self, other: T) -> Perturbation {
        let mut members = self.into_members();
        members.extend(other.into().into_members());
        Perturbation::Series(Series::new(members))
    }
}

macro_rules! impl_from_perturbation {
    ($($variant:ident),* $(,)?) => {
        $(
            impl From<$variant> for Perturbation {
                fn from(p: $variant) -> Self {
                    Perturbation::$variant(p)
                }
            }
        )*
    };
}

impl_from_perturbation!(Rattle, ElementScaledRattle, Stretch, Series, RandomChoice);

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::{Matrix3, Point3};
    use std::collections::BTreeMap;

    fn cubic() -> Structure {
        Structure::periodic(
            ["Cu", "Ag"],
            vec![Point3::new(0.0, 0.0, 0.0), Point3::new(1.5, 1.5, 1.5)],
            Matrix3::from_diagonal_element(3.0),
        )
        .unwrap()
    }

    fn every_variant() -> Vec<Perturbation> {
        let reference = BTreeMap::from([("Cu".to_string(), 2.5), ("Ag".to_string(), 2.9)]);
        vec![
            Rattle::new(0.1).with_seed(1).into(),
            ElementScaledRattle::new(0.05, reference)
                .unwrap()
                .with_seed(2)
                .into(),
            Stretch::new(0.05, 0.05).with_seed(3).into(),
            Perturbation::from(Rattle::new(0.1).with_seed(4))
                + Stretch::new(0.1, 0.1).with_seed(5),
            RandomChoice::new(
                Rattle::new(0.2).with_seed(6),
                Stretch::new(0.02, 0.03).with_seed(7),
                0.4,
            )
            .with_seed(8)
            .into(),
        ]
    }

    #[test]
    fn add_builds_flat_series() {
        let p = Perturbation::from(Rattle::new(0.1))
            + Stretch::new(0.05, 0.05)
            + Rattle::new(0.2);
        match &p {
            Perturbation::Series(series) => assert_eq!(series.perturbations.len(), 3),
            other => panic!("expected a series, got {other:?}"),
        }
        assert_eq!(
            p.to_string(),
            "rattle(0.1)+stretch(hydro=0.05, shear=0.05)+rattle(0.2)"
        );
    }

    #[test]
    fn label_parameters_print_like_python_floats() {
        let cases = [
            (0.1, "0.1"),
            (1.0, "1.0"),
            (0.0001, "0.0001"),
            (1e-5, "1e-05"),
            (2.5e-7, "2.5e-07"),
            (1e16, "1e+16"),
            (1e100, "1e+100"),
            (f64::INFINITY, "inf"),
            (f64::NAN, "nan"),
        ];
        for (value, expected) in cases {
            assert_eq!(Param(value).to_string(), expected);
        }
    }

    #[test]
    fn json_round_trip_preserves_parameters() {
        for p in every_variant() {
            let json = serde_json::to_string(&p).unwrap();
            let back: Perturbation = serde_json::from_str(&json).unwrap();
            assert_eq!(back, p, "{json}");
        }
    }

    #[test]
    fn resumed_perturbation_reproduces_next_output() {
        for mut original in every_variant() {
            // advance the generators before taking the checkpoint
            original.perturb(cubic()).unwrap();
            let json = serde_json::to_string(&original).unwrap();
            let mut resumed: Perturbation = serde_json::from_str(&json).unwrap();

            for _ in 0..3 {
                let expected = original.perturb(cubic()).unwrap();
                let actual = resumed.perturb(cubic()).unwrap();
                assert_eq!(actual.positions(), expected.positions(), "{original}");
                assert_eq!(actual.cell(), expected.cell(), "{original}");
                assert_eq!(actual.info().perturbation, expected.info().perturbation);
            }
        }
    }

    #[test]
    fn json_is_internally_tagged() {
        let json = serde_json::to_value(Perturbation::from(Stretch::new(0.1, 0.2))).unwrap();
        assert_eq!(json["type"], "stretch");
        assert_eq!(json["hydro"], 0.1);
        assert!(json["rng"]["seed"].is_array());
    }

    #[test]
    fn missing_generator_state_falls_back_to_entropy() {
        let p: Perturbation =
            serde_json::from_str(r#"{"type": "rattle", "sigma": 0.1}"#).unwrap();
        assert_eq!(p, Perturbation::from(Rattle::new(0.1)));
    }

    #[test]
    fn closures_do_not_assign_identity() {
        let mut identity = |s: Structure| Ok::<_, PerturbationError>(s);
        assert!(!identity.assigns_identity());
        assert!(Perturbation::from(Rattle::new(0.1)).assigns_identity());

        let out = identity.perturb(cubic()).unwrap();
        assert!(out.info().uuid.is_none());
    }
}
