/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! High-symmetry points and paths of the Brillouin zone
//!
//! Coordinates follow Setyawan and Curtarolo, Comp. Mat. Sci. 49, 299 (2010),
//! and are fractions of the reciprocal vectors of the standardized primitive
//! cell. Γ is labelled `GAMMA`, Σ `SIGMA`.

use super::errors::{Result, StructureError};
use super::symmetry::Symmetry;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Bravais lattice types with a special-point table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BravaisLattice {
    Cub,
    Fcc,
    Bcc,
    Tet,
    /// body-centred tetragonal, c < a
    Bct1,
    /// body-centred tetragonal, c > a
    Bct2,
    Orc,
    Hex,
    /// rhombohedral, α < 90°
    Rhl1,
    /// rhombohedral, α > 90°
    Rhl2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Centering {
    Primitive,
    Face,
    Body,
    Base,
    Rhombohedral,
}

fn centering(space_group: i32) -> Centering {
    match space_group {
        22 | 42 | 43 | 69 | 70 | 196 | 202 | 203 | 209 | 210 | 216 | 219 | 225..=228 => {
            Centering::Face
        }
        23 | 24 | 44..=46 | 71..=74 | 79 | 80 | 82 | 87 | 88 | 97 | 98 | 107..=110 | 119..=122
        | 139..=142 | 197 | 199 | 204 | 206 | 211 | 214 | 217 | 220 | 229 | 230 => Centering::Body,
        5 | 8 | 9 | 12 | 15 | 20 | 21 | 35..=41 | 63..=68 => Centering::Base,
        146 | 148 | 155 | 160 | 161 | 166 | 167 => Centering::Rhombohedral,
        _ => Centering::Primitive,
    }
}

type Point = (&'static str, [f64; 3]);

impl BravaisLattice {
    /// Lattice type of a standardized structure
    pub fn detect(symmetry: &Symmetry) -> Result<Self> {
        let space_group = symmetry.space_group;
        let unsupported = |lattice: &'static str| -> Result<Self> {
            Err(StructureError::UnsupportedLattice { space_group, lattice })
        };
        let centering = centering(space_group);

        match space_group {
            195..=230 => Ok(match centering {
                Centering::Face => BravaisLattice::Fcc,
                Centering::Body => BravaisLattice::Bcc,
                _ => BravaisLattice::Cub,
            }),
            143..=194 if centering == Centering::Rhombohedral => {
                if rhombohedral_angle(symmetry) < 0.5 * std::f64::consts::PI {
                    Ok(BravaisLattice::Rhl1)
                } else {
                    Ok(BravaisLattice::Rhl2)
                }
            }
            143..=194 => Ok(BravaisLattice::Hex),
            75..=142 if centering == Centering::Body => {
                let (a, c) = (symmetry.conventional[0].length(), symmetry.conventional[2].length());
                Ok(if c < a {
                    BravaisLattice::Bct1
                } else {
                    BravaisLattice::Bct2
                })
            }
            75..=142 => Ok(BravaisLattice::Tet),
            16..=74 => match centering {
                Centering::Primitive => Ok(BravaisLattice::Orc),
                Centering::Face => unsupported("face-centred orthorhombic"),
                Centering::Body => unsupported("body-centred orthorhombic"),
                _ => unsupported("base-centred orthorhombic"),
            },
            3..=15 => unsupported("monoclinic"),
            _ => unsupported("triclinic"),
        }
    }

    /// Special points in fractions of the primitive reciprocal vectors
    pub fn special_points(self, symmetry: &Symmetry) -> Vec<Point> {
        let gamma = ("GAMMA", [0.0, 0.0, 0.0]);
        match self {
            BravaisLattice::Cub => vec![
                gamma,
                ("M", [0.5, 0.5, 0.0]),
                ("R", [0.5, 0.5, 0.5]),
                ("X", [0.0, 0.5, 0.0]),
            ],
            BravaisLattice::Fcc => vec![
                gamma,
                ("K", [0.375, 0.375, 0.75]),
                ("L", [0.5, 0.5, 0.5]),
                ("U", [0.625, 0.25, 0.625]),
                ("W", [0.5, 0.25, 0.75]),
                ("X", [0.5, 0.0, 0.5]),
            ],
            BravaisLattice::Bcc => vec![
                gamma,
                ("H", [0.5, -0.5, 0.5]),
                ("P", [0.25, 0.25, 0.25]),
                ("N", [0.0, 0.0, 0.5]),
            ],
            BravaisLattice::Tet => vec![
                gamma,
                ("A", [0.5, 0.5, 0.5]),
                ("M", [0.5, 0.5, 0.0]),
                ("R", [0.0, 0.5, 0.5]),
                ("X", [0.0, 0.5, 0.0]),
                ("Z", [0.0, 0.0, 0.5]),
            ],
            BravaisLattice::Bct1 => {
                let (a, c) = conventional_ac(symmetry);
                let eta = (1.0 + c * c / (a * a)) / 4.0;
                vec![
                    gamma,
                    ("M", [-0.5, 0.5, 0.5]),
                    ("N", [0.0, 0.5, 0.0]),
                    ("P", [0.25, 0.25, 0.25]),
                    ("X", [0.0, 0.0, 0.5]),
                    ("Z", [eta, eta, -eta]),
                    ("Z1", [-eta, 1.0 - eta, eta]),
                ]
            }
            BravaisLattice::Bct2 => {
                let (a, c) = conventional_ac(symmetry);
                let eta = (1.0 + a * a / (c * c)) / 4.0;
                let zeta = a * a / (2.0 * c * c);
                vec![
                    gamma,
                    ("N", [0.0, 0.5, 0.0]),
                    ("P", [0.25, 0.25, 0.25]),
                    ("SIGMA", [-eta, eta, eta]),
                    ("SIGMA1", [eta, 1.0 - eta, -eta]),
                    ("X", [0.0, 0.0, 0.5]),
                    ("Y", [-zeta, zeta, 0.5]),
                    ("Y1", [0.5, 0.5, -zeta]),
                    ("Z", [0.5, 0.5, -0.5]),
                ]
            }
            BravaisLattice::Orc => vec![
                gamma,
                ("R", [0.5, 0.5, 0.5]),
                ("S", [0.5, 0.5, 0.0]),
                ("T", [0.0, 0.5, 0.5]),
                ("U", [0.5, 0.0, 0.5]),
                ("X", [0.5, 0.0, 0.0]),
                ("Y", [0.0, 0.5, 0.0]),
                ("Z", [0.0, 0.0, 0.5]),
            ],
            BravaisLattice::Hex => vec![
                gamma,
                ("A", [0.0, 0.0, 0.5]),
                ("H", [1.0 / 3.0, 1.0 / 3.0, 0.5]),
                ("K", [1.0 / 3.0, 1.0 / 3.0, 0.0]),
                ("L", [0.5, 0.0, 0.5]),
                ("M", [0.5, 0.0, 0.0]),
            ],
            BravaisLattice::Rhl1 => {
                let cos_alpha = rhombohedral_angle(symmetry).cos();
                let eta = (1.0 + 4.0 * cos_alpha) / (2.0 + 4.0 * cos_alpha);
                let nu = 0.75 - eta / 2.0;
                vec![
                    gamma,
                    ("B", [eta, 0.5, 1.0 - eta]),
                    ("B1", [0.5, 1.0 - eta, eta - 1.0]),
                    ("F", [0.5, 0.5, 0.0]),
                    ("L", [0.5, 0.0, 0.0]),
                    ("L1", [0.0, 0.0, -0.5]),
                    ("P", [eta, nu, nu]),
                    ("P1", [1.0 - nu, 1.0 - nu, 1.0 - eta]),
                    ("P2", [nu, nu, eta - 1.0]),
                    ("Q", [1.0 - nu, nu, 0.0]),
                    ("X", [nu, 0.0, -nu]),
                    ("Z", [0.5, 0.5, 0.5]),
                ]
            }
            BravaisLattice::Rhl2 => {
                let half = rhombohedral_angle(symmetry) / 2.0;
                let eta = 1.0 / (2.0 * half.tan().powi(2));
                let nu = 0.75 - eta / 2.0;
                vec![
                    gamma,
                    ("F", [0.5, -0.5, 0.0]),
                    ("L", [0.5, 0.0, 0.0]),
                    ("P", [1.0 - nu, -nu, 1.0 - nu]),
                    ("P1", [nu, nu - 1.0, nu - 1.0]),
                    ("Q", [eta, eta, eta]),
                    ("Q1", [1.0 - eta, -eta, -eta]),
                    ("Z", [0.5, -0.5, 0.5]),
                ]
            }
        }
    }

    /// Continuous lines of the path, each a sequence of special-point labels
    pub fn path(self) -> &'static [&'static [&'static str]] {
        match self {
            BravaisLattice::Cub => &[&["GAMMA", "X", "M", "GAMMA", "R", "X"], &["M", "R"]],
            BravaisLattice::Fcc => &[
                &["GAMMA", "X", "W", "K", "GAMMA", "L", "U", "W", "L", "K"],
                &["U", "X"],
            ],
            BravaisLattice::Bcc => &[&["GAMMA", "H", "N", "GAMMA", "P", "H"], &["P", "N"]],
            BravaisLattice::Tet => &[
                &["GAMMA", "X", "M", "GAMMA", "Z", "R", "A", "Z"],
                &["X", "R"],
                &["M", "A"],
            ],
            BravaisLattice::Bct1 => &[
                &["GAMMA", "X", "M", "GAMMA", "Z", "P", "N", "Z1", "M"],
                &["X", "P"],
            ],
            BravaisLattice::Bct2 => &[
                &["GAMMA", "X", "Y", "SIGMA", "GAMMA", "Z", "SIGMA1", "N", "P", "Y1", "Z"],
                &["X", "P"],
            ],
            BravaisLattice::Orc => &[
                &["GAMMA", "X", "S", "Y", "GAMMA", "Z", "U", "R", "T", "Z"],
                &["Y", "T"],
                &["U", "X"],
                &["S", "R"],
            ],
            BravaisLattice::Hex => &[
                &["GAMMA", "M", "K", "GAMMA", "A", "L", "H", "A"],
                &["L", "M"],
                &["K", "H"],
            ],
            BravaisLattice::Rhl1 => &[
                &["GAMMA", "L", "B1"],
                &["B", "Z", "GAMMA", "X"],
                &["Q", "F", "P1", "Z"],
                &["L", "P"],
            ],
            BravaisLattice::Rhl2 => &[&["GAMMA", "P", "Z", "Q", "GAMMA", "F", "P1", "Q1", "L", "Z"]],
        }
    }
}

impl fmt::Display for BravaisLattice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BravaisLattice::Cub => "CUB",
            BravaisLattice::Fcc => "FCC",
            BravaisLattice::Bcc => "BCC",
            BravaisLattice::Tet => "TET",
            BravaisLattice::Bct1 => "BCT1",
            BravaisLattice::Bct2 => "BCT2",
            BravaisLattice::Orc => "ORC",
            BravaisLattice::Hex => "HEX",
            BravaisLattice::Rhl1 => "RHL1",
            BravaisLattice::Rhl2 => "RHL2",
        };
        write!(f, "{}", name)
    }
}

fn conventional_ac(symmetry: &Symmetry) -> (f64, f64) {
    (symmetry.conventional[0].length(), symmetry.conventional[2].length())
}

/// Angle between two primitive vectors of a rhombohedral cell, in radians
fn rhombohedral_angle(symmetry: &Symmetry) -> f64 {
    let [a, b, _] = &symmetry.primitive;
    (a.dot(b) / (a.length() * b.length())).clamp(-1.0, 1.0).acos()
}
