use super::info::Info;
use crate::core::utils::geometry;
use nalgebra::{Matrix3, Point3, Vector3};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum StructureError {
    #[error("Got {symbols} species symbols but {positions} positions")]
    LengthMismatch { symbols: usize, positions: usize },
    #[error("Got {forces} force vectors for {atoms} atoms")]
    ForcesMismatch { forces: usize, atoms: usize },
    #[error("Operation '{0}' requires a cell")]
    MissingCell(&'static str),
    #[error("Cannot keep fractional coordinates in a singular cell")]
    SingularCell,
}

/// An atomic structure: species, Cartesian positions, an optional periodic cell and
/// the results of an external calculation, plus free-form [`Info`] metadata.
///
/// Energy and forces are never computed here. An external relaxer or calculator
/// attaches them with [`Structure::set_calculation`], and any change to positions or
/// cell discards them again.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "StructureData", into = "StructureData")]
pub struct Structure {
    symbols: Vec<String>,
    positions: Vec<Point3<f64>>,
    cell: Option<Matrix3<f64>>,
    pbc: [bool; 3],
    energy: Option<f64>,
    forces: Option<Vec<Vector3<f64>>>,
    info: Info,
}

impl Structure {
    /// Creates a non-periodic structure without a cell.
    pub fn new<S>(
        symbols: impl IntoIterator<Item = S>,
        positions: Vec<Point3<f64>>,
    ) -> Result<Self, StructureError>
    where
        S: Into<String>,
    {
        let symbols: Vec<String> = symbols.into_iter().map(Into::into).collect();
        if symbols.len() != positions.len() {
            return Err(StructureError::LengthMismatch {
                symbols: symbols.len(),
                positions: positions.len(),
            });
        }
        Ok(Self {
            symbols,
            positions,
            cell: None,
            pbc: [false; 3],
            energy: None,
            forces: None,
            info: Info::default(),
        })
    }

    /// Creates a structure that is periodic along all three lattice vectors.
    pub fn periodic<S>(
        symbols: impl IntoIterator<Item = S>,
        positions: Vec<Point3<f64>>,
        cell: Matrix3<f64>,
    ) -> Result<Self, StructureError>
    where
        S: Into<String>,
    {
        let mut structure = Self::new(symbols, positions)?;
        structure.cell = Some(cell);
        structure.pbc = [true; 3];
        Ok(structure)
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    /// Distinct species in order of first appearance.
    pub fn elements(&self) -> Vec<&str> {
        let mut elements: Vec<&str> = Vec::new();
        for symbol in &self.symbols {
            if !elements.contains(&symbol.as_str()) {
                elements.push(symbol);
            }
        }
        elements
    }

    pub fn positions(&self) -> &[Point3<f64>] {
        &self.positions
    }

    /// Mutable access to the positions. Attached energy and forces are discarded.
    pub fn positions_mut(&mut self) -> &mut [Point3<f64>] {
        self.clear_calculation();
        &mut self.positions
    }

    pub fn cell(&self) -> Option<&Matrix3<f64>> {
        self.cell.as_ref()
    }

    pub fn pbc(&self) -> [bool; 3] {
        self.pbc
    }

    pub fn set_pbc(&mut self, pbc: [bool; 3]) {
        self.pbc = pbc;
    }

    /// Replaces the cell. With `scale_atoms` the fractional coordinates are kept, so
    /// atoms move with the cell; otherwise Cartesian positions stay put.
    ///
    /// Scaling from a singular cell fails and leaves the structure untouched. Without a
    /// previous cell there is nothing to scale. Attached energy and forces are discarded.
    pub fn set_cell(
        &mut self,
        cell: Matrix3<f64>,
        scale_atoms: bool,
    ) -> Result<(), StructureError> {
        if scale_atoms && self.cell.is_some() {
            let fractional = self
                .fractional_positions()
                .ok_or(StructureError::SingularCell)?;
            self.positions = fractional
                .iter()
                .map(|f| geometry::to_cartesian(&cell, f))
                .collect();
        }
        self.cell = Some(cell);
        self.clear_calculation();
        Ok(())
    }

    /// Fractional coordinates, or `None` without a (non-singular) cell.
    pub fn fractional_positions(&self) -> Option<Vec<Vector3<f64>>> {
        let cell = self.cell.as_ref()?;
        self.positions
            .iter()
            .map(|p| geometry::to_fractional(cell, p))
            .collect()
    }

    pub fn cell_lengths(&self) -> Option<[f64; 3]> {
        self.cell.as_ref().map(geometry::cell_lengths)
    }

    pub fn volume(&self) -> Option<f64> {
        self.cell.as_ref().map(geometry::cell_volume)
    }

    pub fn energy(&self) -> Option<f64> {
        self.energy
    }

    pub fn forces(&self) -> Option<&[Vector3<f64>]> {
        self.forces.as_deref()
    }

    /// Attaches the results of an external calculation.
    pub fn set_calculation(
        &mut self,
        energy: f64,
        forces: Vec<Vector3<f64>>,
    ) -> Result<(), StructureError> {
        self.set_forces(forces)?;
        self.set_energy(energy);
        Ok(())
    }

    pub fn set_energy(&mut self, energy: f64) {
        self.energy = Some(energy);
    }

    pub fn set_forces(&mut self, forces: Vec<Vector3<f64>>) -> Result<(), StructureError> {
        if forces.len() != self.len() {
            return Err(StructureError::ForcesMismatch {
                forces: forces.len(),
                atoms: self.len(),
            });
        }
        self.forces = Some(forces);
        Ok(())
    }

    pub fn clear_calculation(&mut self) {
        self.energy = None;
        self.forces = None;
    }

    pub fn info(&self) -> &Info {
        &self.info
    }

    pub fn info_mut(&mut self) -> &mut Info {
        &mut self.info
    }

    /// Builds a supercell by repeating the structure `repetitions[k]` times along
    /// lattice vector `k`.
    ///
    /// Atoms are ordered image by image, the original atoms first. Metadata is kept,
    /// calculation results are not.
    pub fn repeat(&self, repetitions: [usize; 3]) -> Result<Structure, StructureError> {
        let cell = self.cell.ok_or(StructureError::MissingCell("repeat"))?;
        let images = repetitions.iter().product::<usize>();
        let mut symbols = Vec::with_capacity(self.len() * images);
        let mut positions = Vec::with_capacity(self.len() * images);

        for i in 0..repetitions[0] {
            for j in 0..repetitions[1] {
                for k in 0..repetitions[2] {
                    let shift = cell.row(0).transpose() * i as f64
                        + cell.row(1).transpose() * j as f64
                        + cell.row(2).transpose() * k as f64;
                    symbols.extend(self.symbols.iter().cloned());
                    positions.extend(self.positions.iter().map(|p| p + shift));
                }
            }
        }

        let mut supercell = cell;
        for (axis, &n) in repetitions.iter().enumerate() {
            supercell.row_mut(axis).scale_mut(n as f64);
        }

        Ok(Structure {
            symbols,
            positions,
            cell: Some(supercell),
            pbc: self.pbc,
            energy: None,
            forces: None,
            info: self.info.clone(),
        })
    }
}

/// Serialized form of a [`Structure`], with plain arrays and lattice vectors as rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StructureData {
    symbols: Vec<String>,
    positions: Vec<[f64; 3]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    cell: Option<[[f64; 3]; 3]>,
    #[serde(default)]
    pbc: [bool; 3],
    #[serde(default, skip_serializing_if = "Option::is_none")]
    energy: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    forces: Option<Vec<[f64; 3]>>,
    #[serde(default)]
    info: Info,
}

impl TryFrom<StructureData> for Structure {
    type Error = StructureError;

    fn try_from(data: StructureData) -> Result<Self, Self::Error> {
        let positions = data.positions.iter().map(|p| Point3::from(*p)).collect();
        let mut structure = Structure::new(data.symbols, positions)?;
        structure.cell = data
            .cell
            .map(|rows| Matrix3::from_fn(|r, c| rows[r][c]));
        structure.pbc = data.pbc;
        structure.info = data.info;
        if let Some(forces) = data.forces {
            structure.set_forces(forces.iter().map(|f| Vector3::from(*f)).collect())?;
        }
        if let Some(energy) = data.energy {
            structure.set_energy(energy);
        }
        Ok(structure)
    }
}

impl From<Structure> for StructureData {
    fn from(structure: Structure) -> Self {
        Self {
            positions: structure.positions.iter().map(|p| [p.x, p.y, p.z]).collect(),
            cell: structure
                .cell
                .map(|m| std::array::from_fn(|r| std::array::from_fn(|c| m[(r, c)]))),
            pbc: structure.pbc,
            energy: structure.energy,
            forces: structure
                .forces
                .map(|forces| forces.iter().map(|f| [f.x, f.y, f.z]).collect()),
            symbols: structure.symbols,
            info: structure.info,
        }
    }
}
