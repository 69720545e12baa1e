/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Explicit k-point paths for band-structure (qdos) runs
//!
//! The KKR code reads the path from `qvec.dat` as Cartesian vectors in units of
//! 2π/alat.

use super::errors::{Result, StructureError};
use super::special_points::BravaisLattice;
use super::structure::{reciprocal_vectors, StructureDescriptor};
use super::symmetry::Symmetry;
use super::vector::Vector3D;
use crate::utils::constants::ANG_TO_BOHR;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

/// Whether a structure was given in its primitive cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CellType {
    PrimitiveUnitCell,
    ConventionalUnitCell,
}

/// An explicit list of k-points with labels at the special points
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct KpointsPath {
    /// k-points in units of 2π/alat
    points: Vec<Vector3D>,
    /// (index into `points`, label) of the special points
    #[serde(default)]
    labels: Vec<(usize, String)>,
}

impl KpointsPath {
    /// Create a path from explicit points and labels
    pub fn new(points: Vec<Vector3D>, labels: Vec<(usize, String)>) -> Result<Self> {
        if let Some((index, label)) = labels.iter().find(|(i, _)| *i >= points.len()) {
            return Err(StructureError::InvalidStructure(format!(
                "label {} points at k-point {} but the path has {} points",
                label,
                index,
                points.len()
            )));
        }
        Ok(Self { points, labels })
    }

    /// Interpolate linearly between special points
    ///
    /// `points_per_segment` points are generated for every segment, the end
    /// point of a segment being the start of the next one.
    pub fn from_special_points(
        special: &[(&str, Vector3D)],
        points_per_segment: usize,
    ) -> Result<Self> {
        Self::from_lines(&[special.to_vec()], points_per_segment)
    }

    /// Interpolate along several continuous lines
    ///
    /// Consecutive lines are joined by a jump: the last point of one line and
    /// the first point of the next are both kept.
    pub fn from_lines(lines: &[Vec<(&str, Vector3D)>], points_per_segment: usize) -> Result<Self> {
        if lines.is_empty() || lines.iter().any(|l| l.len() < 2) || points_per_segment == 0 {
            return Err(StructureError::InvalidStructure(
                "a k-path needs at least two special points per line and one point per segment"
                    .to_string(),
            ));
        }

        let mut points = Vec::new();
        let mut labels = Vec::new();
        for line in lines {
            for window in line.windows(2) {
                let (start_label, start) = window[0];
                let end = window[1].1;
                labels.push((points.len(), start_label.to_string()));
                for i in 0..points_per_segment {
                    let t = i as f64 / points_per_segment as f64;
                    points.push(start + (end - start) * t);
                }
            }
            let (last_label, last) = line[line.len() - 1];
            labels.push((points.len(), last_label.to_string()));
            points.push(last);
        }

        Ok(Self { points, labels })
    }

    /// High-symmetry path of the structure's Brillouin zone
    pub fn from_structure(structure: &StructureDescriptor, points_per_segment: usize) -> Result<Self> {
        Ok(ExplicitPath::new(structure, points_per_segment)?.kpoints)
    }

    /// Get the k-points
    pub fn points(&self) -> &[Vector3D] {
        &self.points
    }

    /// Get the labelled special points
    pub fn labels(&self) -> &[(usize, String)] {
        &self.labels
    }

    /// Number of k-points
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the path has no points
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Render the content of `qvec.dat`
    pub fn to_qvec(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}", self.points.len());
        for p in &self.points {
            let _ = writeln!(out, "{:16.8} {:16.8} {:16.8}", p.x, p.y, p.z);
        }
        out
    }
}

/// A generated high-symmetry path together with what it was derived from
#[derive(Debug, Clone, PartialEq)]
pub struct ExplicitPath {
    pub kpoints: KpointsPath,
    pub space_group: i32,
    pub lattice: BravaisLattice,
    pub cell_type: CellType,
}

impl ExplicitPath {
    /// Detect the lattice with `moyo` and walk its special points
    ///
    /// Points are Cartesian in units of 2π/alat of the input structure, in the
    /// frame of its lattice vectors.
    pub fn new(structure: &StructureDescriptor, points_per_segment: usize) -> Result<Self> {
        let symmetry = Symmetry::analyze(structure)?;
        let lattice = BravaisLattice::detect(&symmetry)?;

        let alat = structure.kkr_geometry()?.alat / ANG_TO_BOHR;
        let b = reciprocal_vectors(&symmetry.primitive)?;
        let special: Vec<(&str, Vector3D)> = lattice
            .special_points(&symmetry)
            .into_iter()
            .map(|(label, f)| (label, (b[0] * f[0] + b[1] * f[1] + b[2] * f[2]) * alat))
            .collect();

        let mut lines = Vec::with_capacity(lattice.path().len());
        for line in lattice.path() {
            let mut points = Vec::with_capacity(line.len());
            for label in line.iter() {
                let Some(&point) = special.iter().find(|(name, _)| name == label) else {
                    return Err(StructureError::InvalidStructure(format!(
                        "{} path refers to unknown point {}",
                        lattice, label
                    )));
                };
                points.push(point);
            }
            lines.push(points);
        }
        let kpoints = KpointsPath::from_lines(&lines, points_per_segment)?;

        let cell_type = if symmetry.is_primitive(structure) {
            CellType::PrimitiveUnitCell
        } else {
            warn!(
                "Structure {} is not a primitive cell, the band structure is folded",
                structure.label()
            );
            CellType::ConventionalUnitCell
        };
        info!(
            "Generated {} k-points along the {} path of space group {}",
            kpoints.len(),
            lattice,
            symmetry.space_group
        );

        Ok(Self {
            kpoints,
            space_group: symmetry.space_group,
            lattice,
            cell_type,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_interpolation() {
        let path = KpointsPath::from_special_points(
            &[("GAMMA", Vector3D::origin()), ("X", Vector3D::new(1.0, 0.0, 0.0))],
            4,
        )
        .unwrap();
        assert_eq!(path.len(), 5);
        assert_relative_eq!(path.points()[2].x, 0.5, epsilon = 1e-12);
        assert_eq!(path.labels(), &[(0, "GAMMA".to_string()), (4, "X".to_string())]);
    }

    #[test]
    fn test_qvec_rendering() {
        let path = KpointsPath::new(vec![Vector3D::origin(), Vector3D::new(0.5, 0.0, 0.0)], vec![])
            .unwrap();
        let text = path.to_qvec();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("2"));
        assert_eq!(lines.count(), 2);
    }

    #[test]
    fn test_label_out_of_range() {
        assert!(KpointsPath::new(vec![Vector3D::origin()], vec![(3, "X".to_string())]).is_err());
    }

    fn cubic(a: f64) -> [Vector3D; 3] {
        [
            Vector3D::new(a, 0.0, 0.0),
            Vector3D::new(0.0, a, 0.0),
            Vector3D::new(0.0, 0.0, a),
        ]
    }

    fn point<'a>(path: &'a KpointsPath, label: &str) -> &'a Vector3D {
        let (index, _) = path.labels().iter().find(|(_, l)| l == label).unwrap();
        &path.points()[*index]
    }

    #[test]
    fn test_lines_keep_both_ends_of_a_jump() {
        let x = Vector3D::new(0.5, 0.0, 0.0);
        let m = Vector3D::new(0.5, 0.5, 0.0);
        let path = KpointsPath::from_lines(
            &[vec![("GAMMA", Vector3D::origin()), ("X", x)], vec![("M", m), ("GAMMA", Vector3D::origin())]],
            2,
        )
        .unwrap();
        assert_eq!(path.len(), 6);
        let labels: Vec<&str> = path.labels().iter().map(|(_, l)| l.as_str()).collect();
        assert_eq!(labels, ["GAMMA", "X", "M", "GAMMA"]);
        assert_eq!(path.points()[2], x);
        assert_eq!(path.points()[3], m);
    }

    #[test]
    fn test_simple_cubic_path() {
        let mut structure = StructureDescriptor::new(cubic(3.0));
        structure.append_atom(Vector3D::origin(), "Po").unwrap();
        let explicit = ExplicitPath::new(&structure, 10).unwrap();
        assert_eq!(explicit.lattice, BravaisLattice::Cub);
        assert_eq!(explicit.cell_type, CellType::PrimitiveUnitCell);

        // alat is the cubic lattice constant, X = (0, 1/2, 0) 2π/a
        let x = point(&explicit.kpoints, "X");
        assert_relative_eq!(x.length(), 0.5, epsilon = 1e-6);
        let r = point(&explicit.kpoints, "R");
        assert_relative_eq!(r.length(), 0.75_f64.sqrt(), epsilon = 1e-6);
        // two lines: Γ-X-M-Γ-R-X (5 segments) and M-R
        assert_eq!(explicit.kpoints.len(), 5 * 10 + 1 + 10 + 1);
    }

    #[test]
    fn test_fcc_special_points() {
        let a = 3.61;
        let h = a / 2.0;
        let mut cu = StructureDescriptor::new([
            Vector3D::new(0.0, h, h),
            Vector3D::new(h, 0.0, h),
            Vector3D::new(h, h, 0.0),
        ]);
        cu.append_atom(Vector3D::origin(), "Cu").unwrap();
        let explicit = ExplicitPath::new(&cu, 20).unwrap();
        assert_eq!(explicit.space_group, 225);
        assert_eq!(explicit.lattice, BravaisLattice::Fcc);

        // alat is a/√2 here, so |X| = 2π/a becomes 1/√2 in units of 2π/alat
        let scale = (a / 2.0_f64.sqrt()) / a;
        let x = point(&explicit.kpoints, "X");
        let zeros = x.to_array().iter().filter(|c| c.abs() < 1e-6).count();
        assert_eq!(zeros, 2);
        assert_relative_eq!(x.length(), scale, epsilon = 1e-6);

        // L lies along a body diagonal at √3/2 · 2π/a
        let l = point(&explicit.kpoints, "L");
        assert_relative_eq!(l.x.abs(), l.y.abs(), epsilon = 1e-6);
        assert_relative_eq!(l.y.abs(), l.z.abs(), epsilon = 1e-6);
        assert_relative_eq!(l.length(), 0.75_f64.sqrt() * scale, epsilon = 1e-6);
    }

    #[test]
    fn test_conventional_cell_is_flagged() {
        let a = 3.61;
        let mut cu = StructureDescriptor::new(cubic(a));
        for p in [[0.0, 0.0, 0.0], [0.5, 0.5, 0.0], [0.5, 0.0, 0.5], [0.0, 0.5, 0.5]] {
            cu.append_atom(Vector3D::new(p[0] * a, p[1] * a, p[2] * a), "Cu")
                .unwrap();
        }
        let explicit = ExplicitPath::new(&cu, 10).unwrap();
        assert_eq!(explicit.lattice, BravaisLattice::Fcc);
        assert_eq!(explicit.cell_type, CellType::ConventionalUnitCell);
        // X of the fcc zone is 2π/a away, alat = a
        assert_relative_eq!(point(&explicit.kpoints, "X").length(), 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_hexagonal_path() {
        let (a, c) = (2.51, 4.07);
        let mut co = StructureDescriptor::new([
            Vector3D::new(a, 0.0, 0.0),
            Vector3D::new(-a / 2.0, a * 3.0_f64.sqrt() / 2.0, 0.0),
            Vector3D::new(0.0, 0.0, c),
        ]);
        // hcp sites at (1/3, 2/3, 1/4) and (2/3, 1/3, 3/4)
        co.append_atom(Vector3D::new(0.0, a / 3.0_f64.sqrt(), c / 4.0), "Co")
            .unwrap();
        co.append_atom(Vector3D::new(a / 2.0, a / (2.0 * 3.0_f64.sqrt()), 0.75 * c), "Co")
            .unwrap();
        let explicit = ExplicitPath::new(&co, 10).unwrap();
        assert_eq!(explicit.space_group, 194);
        assert_eq!(explicit.lattice, BravaisLattice::Hex);

        // A = c*/2 along z, in units of 2π/alat with alat = c
        let point_a = point(&explicit.kpoints, "A");
        assert_relative_eq!(point_a.z.abs(), 0.5, epsilon = 1e-6);
        assert_relative_eq!(point_a.x, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_low_symmetry_lattice_has_no_path() {
        let mut structure = StructureDescriptor::new([
            Vector3D::new(3.0, 0.0, 0.0),
            Vector3D::new(0.4, 3.5, 0.0),
            Vector3D::new(0.3, 0.2, 4.1),
        ]);
        structure.append_atom(Vector3D::origin(), "Fe").unwrap();
        structure
            .append_atom(Vector3D::new(0.7, 1.1, 1.9), "Co")
            .unwrap();
        assert!(matches!(
            ExplicitPath::new(&structure, 10),
            Err(StructureError::UnsupportedLattice { .. })
        ));
    }
}
