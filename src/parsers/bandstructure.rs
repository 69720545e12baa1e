/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Assembly of the Bloch spectral function from `qdos.*` files
//!
//! A band-structure run writes the k-points it used to `qvec.dat` (one header
//! line, then one k-point per row) and one `qdos.<atom>.<spin>.dat` file per
//! atom and spin. Every qdos row holds `Re E, Im E, kx, ky, kz` followed by the
//! density columns; rows are grouped by energy, one block of all k-points per
//! energy. The per-file densities are summed and reshaped into `A[k, E]`.

use super::errors::{ParserError, Result};
use crate::utils::constants::RY_TO_EV;
use crate::utils::ry_to_ev;
use crate::utils::table::load_table;
use log::{debug, info};
use ndarray::{s, Array1, Array2};
use num_complex::Complex64;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// File holding the k-points of a band-structure run
pub const QVEC_FILE: &str = "qvec.dat";
/// Prefix of the per-atom density files
pub const QDOS_PREFIX: &str = "qdos.";

/// First density column in a qdos row
const DOS_COLUMN: usize = 5;

/// Band-structure data of one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BandStructureData {
    /// Spectral function `A[k, E]` in states per eV
    pub bloch_spectral_function: Array2<f64>,
    /// k-points in units of 2π/alat, one per row
    pub kpoints: Array2<f64>,
    /// Energies relative to the Fermi energy, in eV
    pub energy_points: Array1<f64>,
    /// Raw contour energies in Ry
    pub contour: Vec<Complex64>,
    /// Labels of special k-points as (index, name)
    pub labels: Vec<(usize, String)>,
}

impl BandStructureData {
    /// Number of k-points
    pub fn num_kpoints(&self) -> usize {
        self.kpoints.nrows()
    }

    /// Number of energy points
    pub fn num_energies(&self) -> usize {
        self.energy_points.len()
    }
}

fn read_table(path: &Path, skip_rows: usize) -> Result<Array2<f64>> {
    let text = fs::read_to_string(path)?;
    load_table(&text, skip_rows).map_err(|source| ParserError::Table {
        file: path.display().to_string(),
        source,
    })
}

/// All `qdos.*` files of a folder, sorted by name
pub fn qdos_files<P: AsRef<Path>>(folder: P) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = fs::read_dir(folder.as_ref())?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with(QDOS_PREFIX))
        })
        .collect();
    files.sort();
    Ok(files)
}

/// Parse a retrieved band-structure folder
///
/// `fermi_energy` is in Ry; `labels` are copied onto the result.
pub fn parse_bandstructure<P: AsRef<Path>>(
    folder: P,
    fermi_energy: f64,
    labels: &[(usize, String)],
) -> Result<BandStructureData> {
    let folder = folder.as_ref();

    let qvec_path = folder.join(QVEC_FILE);
    if !qvec_path.exists() {
        return Err(ParserError::MissingFile(qvec_path));
    }
    let qvec = read_table(&qvec_path, 1)?;
    if qvec.ncols() < 3 || qvec.nrows() == 0 {
        return Err(ParserError::Inconsistent(format!(
            "{} has shape {:?}",
            QVEC_FILE,
            qvec.shape()
        )));
    }
    let kpoints = qvec.slice(s![.., 0..3]).to_owned();
    let nk = kpoints.nrows();

    let files = qdos_files(folder)?;
    if files.is_empty() {
        return Err(ParserError::NoQdosFiles(folder.to_path_buf()));
    }
    debug!("Reading {} qdos files from {}", files.len(), folder.display());

    let tables = files
        .par_iter()
        .map(|path| read_table(path, 0))
        .collect::<Result<Vec<_>>>()?;

    let mut total = tables[0].clone();
    if total.ncols() <= DOS_COLUMN {
        return Err(ParserError::Inconsistent(format!(
            "qdos files need more than {} columns, found {}",
            DOS_COLUMN,
            total.ncols()
        )));
    }
    for (table, path) in tables.iter().zip(&files).skip(1) {
        if table.shape() != total.shape() {
            return Err(ParserError::Inconsistent(format!(
                "{} has shape {:?}, expected {:?}",
                path.display(),
                table.shape(),
                total.shape()
            )));
        }
        let mut dos = total.slice_mut(s![.., DOS_COLUMN..]);
        dos += &table.slice(s![.., DOS_COLUMN..]);
    }

    if total.nrows() % nk != 0 {
        return Err(ParserError::Inconsistent(format!(
            "{} qdos rows are not a multiple of {} k-points",
            total.nrows(),
            nk
        )));
    }
    let ne = total.nrows() / nk;

    let contour: Vec<Complex64> = (0..ne)
        .map(|ie| Complex64::new(total[[ie * nk, 0]], total[[ie * nk, 1]]))
        .collect();
    let energy_points = contour
        .iter()
        .map(|e| ry_to_ev(e.re - fermi_energy))
        .collect::<Array1<f64>>();
    let bloch_spectral_function =
        Array2::from_shape_fn((nk, ne), |(ik, ie)| total[[ie * nk + ik, DOS_COLUMN]] / RY_TO_EV);

    info!(
        "Band structure assembled: {} k-points x {} energies from {} files",
        nk,
        ne,
        files.len()
    );

    Ok(BandStructureData {
        bloch_spectral_function,
        kpoints,
        energy_points,
        contour,
        labels: labels.to_vec(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use tempfile::TempDir;

    fn write_qdos(dir: &Path, name: &str, scale: f64) {
        let mut text = String::new();
        for (ie, e) in [0.5, 0.6].iter().enumerate() {
            for ik in 0..2 {
                let dos = scale * (1 + ie * 2 + ik) as f64;
                text.push_str(&format!(
                    "{} 0.001 {} 0.0 0.0 {} {}\n",
                    e,
                    ik as f64 * 0.5,
                    dos,
                    dos
                ));
            }
        }
        fs::write(dir.join(name), text).unwrap();
    }

    #[test]
    fn test_parse_bandstructure_sums_files() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(QVEC_FILE), "2\n0.0 0.0 0.0\n0.5 0.0 0.0\n").unwrap();
        write_qdos(dir.path(), "qdos.01.1.dat", 1.0);
        write_qdos(dir.path(), "qdos.02.1.dat", 2.0);

        let labels = vec![(0, "GAMMA".to_string()), (1, "X".to_string())];
        let data = parse_bandstructure(dir.path(), 0.5, &labels).unwrap();

        assert_eq!(data.num_kpoints(), 2);
        assert_eq!(data.num_energies(), 2);
        assert_relative_eq!(data.energy_points[0], 0.0);
        assert_relative_eq!(data.energy_points[1], 0.1 * RY_TO_EV, epsilon = 1e-9);
        // k = 1, second energy block: (1 + 2 + 1) * (1 + 2)
        assert_relative_eq!(data.bloch_spectral_function[[1, 1]], 12.0 / RY_TO_EV);
        assert_eq!(data.labels, labels);
    }

    #[test]
    fn test_missing_qvec() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            parse_bandstructure(dir.path(), 0.0, &[]),
            Err(ParserError::MissingFile(_))
        ));
    }

    #[test]
    fn test_no_qdos_files() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(QVEC_FILE), "1\n0.0 0.0 0.0\n").unwrap();
        assert!(matches!(
            parse_bandstructure(dir.path(), 0.0, &[]),
            Err(ParserError::NoQdosFiles(_))
        ));
    }
}
