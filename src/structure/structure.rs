/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Crystal structure representation and its translation into KKR geometry keywords

use super::errors::{Result, StructureError};
use super::site::Site;
use super::vector::Vector3D;
use crate::utils::constants::ANG_TO_BOHR;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

fn default_pbc() -> [bool; 3] {
    [true, true, true]
}

/// StructureDescriptor holds the lattice and sites of a periodic crystal
///
/// Lattice vectors and positions are Cartesian and in Angstroms, as they come
/// from structure databases. The KKR representation is derived on demand by
/// [`StructureDescriptor::kkr_geometry`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructureDescriptor {
    /// Lattice vectors (rows) in Angstroms
    cell: [Vector3D; 3],
    /// Occupied sites
    #[serde(default)]
    sites: Vec<Site>,
    /// Periodic boundary flags along the three lattice vectors
    #[serde(default = "default_pbc")]
    pbc: [bool; 3],
    /// Free-form label
    #[serde(default)]
    label: String,
}

/// Geometry keywords of the KKR inputcard
///
/// Lengths are in units of `alat`, which itself is in Bohr radii.
#[derive(Debug, Clone, PartialEq)]
pub struct KkrGeometry {
    /// Lattice constant in Bohr radii (`ALATBASIS`)
    pub alat: f64,
    /// Bravais vectors in units of alat (`BRAVAIS`)
    pub bravais: [[f64; 3]; 3],
    /// Number of sites in the unit cell (`NAEZ`)
    pub naez: usize,
    /// Nuclear charges, one per site (`ZATOM`)
    pub zatom: Vec<f64>,
    /// Cartesian site positions in units of alat (`RBASIS`)
    pub rbasis: Vec<[f64; 3]>,
}

impl StructureDescriptor {
    /// Create a new structure with the given lattice vectors and no sites
    pub fn new(cell: [Vector3D; 3]) -> Self {
        Self {
            cell,
            sites: Vec::new(),
            pbc: default_pbc(),
            label: String::new(),
        }
    }

    /// Create a new structure with a label
    pub fn with_label(cell: [Vector3D; 3], label: &str) -> Self {
        let mut structure = Self::new(cell);
        structure.label = label.to_string();
        structure
    }

    /// Load a structure from a JSON file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }

    /// Set the periodic boundary flags
    pub fn set_pbc(&mut self, pbc: [bool; 3]) {
        self.pbc = pbc;
    }

    /// Append an atom at a Cartesian position (Angstroms)
    pub fn append_atom(&mut self, position: Vector3D, symbol: &str) -> Result<usize> {
        self.append_site(Site::new(symbol, position)?)
    }

    /// Append a site, returning its index
    pub fn append_site(&mut self, site: Site) -> Result<usize> {
        if let Some(existing) = self
            .sites
            .iter()
            .position(|s| s.position().distance(site.position()) < 1e-8)
        {
            return Err(StructureError::InvalidStructure(format!(
                "site {} overlaps with site {}",
                site, existing
            )));
        }
        self.sites.push(site);
        Ok(self.sites.len() - 1)
    }

    /// Get the lattice vectors
    pub fn cell(&self) -> &[Vector3D; 3] {
        &self.cell
    }

    /// Get the sites
    pub fn sites(&self) -> &[Site] {
        &self.sites
    }

    /// Get the periodic boundary flags
    pub fn pbc(&self) -> [bool; 3] {
        self.pbc
    }

    /// Get the label
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Whether the structure is periodic in all three directions
    pub fn is_bulk(&self) -> bool {
        self.pbc.iter().all(|&p| p)
    }

    /// Cell volume in cubic Angstroms
    pub fn volume(&self) -> f64 {
        self.cell[0].dot(&self.cell[1].cross(&self.cell[2])).abs()
    }

    /// Check that the structure can be handed to the KKR codes
    pub fn validate(&self) -> Result<()> {
        if !self.is_bulk() {
            return Err(StructureError::NotBulk(self.pbc));
        }
        let volume = self.volume();
        if volume < 1e-10 {
            return Err(StructureError::DegenerateCell(volume));
        }
        if self.sites.is_empty() {
            return Err(StructureError::InvalidStructure(
                "structure has no sites".to_string(),
            ));
        }
        for site in &self.sites {
            site.atomic_number()?;
        }
        Ok(())
    }

    /// Derive the KKR geometry keywords
    ///
    /// The lattice constant is the length of the longest Bravais vector in
    /// Bohr radii; Bravais vectors and positions are then expressed in units
    /// of it.
    pub fn kkr_geometry(&self) -> Result<KkrGeometry> {
        self.validate()?;

        let bravais_bohr: Vec<Vector3D> = self.cell.iter().map(|v| v.scale(ANG_TO_BOHR)).collect();
        let alat = bravais_bohr
            .iter()
            .map(Vector3D::length)
            .fold(0.0_f64, f64::max);

        let mut bravais = [[0.0; 3]; 3];
        for (row, vector) in bravais.iter_mut().zip(&bravais_bohr) {
            *row = vector.scale(1.0 / alat).to_array();
        }

        let mut zatom = Vec::with_capacity(self.sites.len());
        let mut rbasis = Vec::with_capacity(self.sites.len());
        for site in &self.sites {
            zatom.push(site.atomic_number()? as f64);
            rbasis.push(site.position().scale(ANG_TO_BOHR / alat).to_array());
        }

        Ok(KkrGeometry {
            alat,
            bravais,
            naez: self.sites.len(),
            zatom,
            rbasis,
        })
    }
}

/// Reciprocal vectors of a cell, without the factor 2π
///
/// `b_i · a_j = δ_ij`; the result is in inverse units of the cell vectors.
pub fn reciprocal_vectors(cell: &[Vector3D; 3]) -> Result<[Vector3D; 3]> {
    let volume = cell[0].dot(&cell[1].cross(&cell[2]));
    if volume.abs() < 1e-10 {
        return Err(StructureError::DegenerateCell(volume));
    }
    Ok([
        cell[1].cross(&cell[2]).scale(1.0 / volume),
        cell[2].cross(&cell[0]).scale(1.0 / volume),
        cell[0].cross(&cell[1]).scale(1.0 / volume),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn fcc_cu() -> StructureDescriptor {
        let alat = 6.83;
        let a = 0.5 * alat * 0.52917721067;
        let mut cu = StructureDescriptor::with_label(
            [
                Vector3D::new(a, a, 0.0),
                Vector3D::new(a, 0.0, a),
                Vector3D::new(0.0, a, a),
            ],
            "Cu bulk",
        );
        cu.append_atom(Vector3D::origin(), "Cu").unwrap();
        cu
    }

    #[test]
    fn test_kkr_geometry_fcc() {
        let geometry = fcc_cu().kkr_geometry().unwrap();

        // alat is the length of a Bravais vector: 6.83/sqrt(2)
        assert_relative_eq!(geometry.alat, 6.83 / 2.0_f64.sqrt(), epsilon = 1e-9);
        assert_eq!(geometry.naez, 1);
        assert_eq!(geometry.zatom, vec![29.0]);
        assert_relative_eq!(geometry.bravais[0][0], 1.0 / 2.0_f64.sqrt(), epsilon = 1e-9);
        assert_relative_eq!(geometry.bravais[2][2], 1.0 / 2.0_f64.sqrt(), epsilon = 1e-9);
        assert_eq!(geometry.rbasis[0], [0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_positions_in_alat_units() {
        let mut structure = StructureDescriptor::new([
            Vector3D::new(2.0, 0.0, 0.0),
            Vector3D::new(0.0, 2.0, 0.0),
            Vector3D::new(0.0, 0.0, 2.0),
        ]);
        structure.append_atom(Vector3D::origin(), "Fe").unwrap();
        structure.append_atom(Vector3D::new(1.0, 1.0, 1.0), "Fe").unwrap();

        let geometry = structure.kkr_geometry().unwrap();
        assert_relative_eq!(geometry.rbasis[1][0], 0.5, epsilon = 1e-12);
        assert_relative_eq!(geometry.bravais[1][1], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_overlapping_sites_rejected() {
        let mut cu = fcc_cu();
        assert!(cu.append_atom(Vector3D::origin(), "Cu").is_err());
    }

    #[test]
    fn test_non_bulk_rejected() {
        let mut cu = fcc_cu();
        cu.set_pbc([true, true, false]);
        assert!(matches!(cu.kkr_geometry(), Err(StructureError::NotBulk(_))));
    }

    #[test]
    fn test_empty_structure_rejected() {
        let structure = StructureDescriptor::new([
            Vector3D::new(1.0, 0.0, 0.0),
            Vector3D::new(0.0, 1.0, 0.0),
            Vector3D::new(0.0, 0.0, 1.0),
        ]);
        assert!(structure.validate().is_err());
    }

    #[test]
    fn test_reciprocal_vectors_are_dual() {
        let cell = *fcc_cu().cell();
        let b = reciprocal_vectors(&cell).unwrap();
        for (i, bi) in b.iter().enumerate() {
            for (j, aj) in cell.iter().enumerate() {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert_relative_eq!(bi.dot(aj), expected, epsilon = 1e-12);
            }
        }
    }
}
