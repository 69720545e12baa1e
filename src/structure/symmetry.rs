/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Space-group detection and standardized cells
//!
//! Wraps `moyo`: the structure is handed over with fractional positions and one
//! species number per kind name, and the standardized conventional and
//! primitive cells come back in the Cartesian frame of the input.

use super::errors::{Result, StructureError};
use super::structure::StructureDescriptor;
use super::vector::Vector3D;
use log::debug;
use moyo::base::{AngleTolerance, Cell, Lattice};
use moyo::data::Setting;
use moyo::MoyoDataset;
use nalgebra::{Matrix3, Vector3};

/// Symmetry tolerance in Angstroms
pub const SYMPREC: f64 = 1e-3;

/// Space group and standardized cells of a structure
#[derive(Debug, Clone, PartialEq)]
pub struct Symmetry {
    /// International space-group number
    pub space_group: i32,
    /// Standardized conventional cell vectors in Angstroms
    pub conventional: [Vector3D; 3],
    /// Standardized primitive cell vectors in Angstroms
    pub primitive: [Vector3D; 3],
    /// Number of sites in the primitive cell
    pub primitive_sites: usize,
}

fn to_columns(cell: &[Vector3D; 3]) -> Matrix3<f64> {
    Matrix3::from_columns(&[
        Vector3::new(cell[0].x, cell[0].y, cell[0].z),
        Vector3::new(cell[1].x, cell[1].y, cell[1].z),
        Vector3::new(cell[2].x, cell[2].y, cell[2].z),
    ])
}

fn from_columns(basis: &Matrix3<f64>) -> [Vector3D; 3] {
    std::array::from_fn(|i| {
        let column = basis.column(i);
        Vector3D::new(column[0], column[1], column[2])
    })
}

impl Symmetry {
    /// Detect the space group of a bulk structure
    pub fn analyze(structure: &StructureDescriptor) -> Result<Self> {
        structure.validate()?;

        let basis = to_columns(structure.cell());
        let inverse = basis
            .try_inverse()
            .ok_or_else(|| StructureError::DegenerateCell(structure.volume()))?;

        let mut kinds: Vec<&str> = Vec::new();
        let mut positions = Vec::with_capacity(structure.sites().len());
        let mut numbers = Vec::with_capacity(structure.sites().len());
        for site in structure.sites() {
            let p = site.position();
            positions.push(inverse * Vector3::new(p.x, p.y, p.z));
            let kind = match kinds.iter().position(|&k| k == site.kind_name()) {
                Some(index) => index,
                None => {
                    kinds.push(site.kind_name());
                    kinds.len() - 1
                }
            };
            numbers.push(kind as i32 + 1);
        }

        // moyo takes lattice vectors as rows
        let cell = Cell::new(Lattice::new(basis.transpose()), positions, numbers);
        // no basis rotation: the k-points must stay in the frame of the input
        let dataset = MoyoDataset::new(&cell, SYMPREC, AngleTolerance::Default, Setting::Spglib, false)
            .map_err(|err| StructureError::Symmetry(format!("{:?}", err)))?;
        debug!(
            "Space group {} (Hall number {}) for {}",
            dataset.number,
            dataset.hall_number,
            structure.label()
        );

        Ok(Self {
            space_group: dataset.number,
            conventional: from_columns(&dataset.std_cell.lattice.basis),
            primitive: from_columns(&dataset.prim_std_cell.lattice.basis),
            primitive_sites: dataset.prim_std_cell.positions.len(),
        })
    }

    /// Whether the input cell is already a primitive cell
    ///
    /// Compares cell volumes, so any choice of primitive vectors counts.
    pub fn is_primitive(&self, structure: &StructureDescriptor) -> bool {
        let primitive_volume = self.primitive[0]
            .dot(&self.primitive[1].cross(&self.primitive[2]))
            .abs();
        (structure.volume() - primitive_volume).abs() < 1e-6 * primitive_volume.max(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn cubic(a: f64) -> [Vector3D; 3] {
        [
            Vector3D::new(a, 0.0, 0.0),
            Vector3D::new(0.0, a, 0.0),
            Vector3D::new(0.0, 0.0, a),
        ]
    }

    #[test]
    fn test_conventional_fcc_cell() {
        let a = 3.61;
        let mut cu = StructureDescriptor::new(cubic(a));
        for p in [[0.0, 0.0, 0.0], [0.5, 0.5, 0.0], [0.5, 0.0, 0.5], [0.0, 0.5, 0.5]] {
            cu.append_atom(Vector3D::new(p[0] * a, p[1] * a, p[2] * a), "Cu")
                .unwrap();
        }

        let symmetry = Symmetry::analyze(&cu).unwrap();
        assert_eq!(symmetry.space_group, 225);
        assert_eq!(symmetry.primitive_sites, 1);
        assert!(!symmetry.is_primitive(&cu));
        let volume = symmetry.primitive[0]
            .dot(&symmetry.primitive[1].cross(&symmetry.primitive[2]))
            .abs();
        assert_relative_eq!(volume, a * a * a / 4.0, epsilon = 1e-6);
    }

    #[test]
    fn test_bcc_with_two_kinds_is_simple_cubic() {
        let a = 2.87;
        let mut structure = StructureDescriptor::new(cubic(a));
        structure.append_atom(Vector3D::origin(), "Fe").unwrap();
        structure
            .append_atom(Vector3D::new(0.5 * a, 0.5 * a, 0.5 * a), "Co")
            .unwrap();

        let symmetry = Symmetry::analyze(&structure).unwrap();
        assert_eq!(symmetry.space_group, 221);
        assert!(symmetry.is_primitive(&structure));
    }
}
