/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Parser for the main KKR output files

use super::errors::{ParserError, Result};
use crate::utils::table::{all_values_after, last_value_after};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Main stdout of the KKR code
pub const KKR_STDOUT: &str = "out_kkr";
/// Per-iteration log of the KKR code
pub const KKR_OUTPUT_LOG: &str = "output.000.txt";

/// Structured results of a KKR run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KkrOutput {
    /// Fermi energy in Ry
    pub fermi_energy: Option<f64>,
    /// Number of spin channels
    pub nspin: Option<i64>,
    /// Last rms error of the potential
    pub convergence_value: Option<f64>,
    /// rms error of every iteration, in order
    pub convergence_values_all_iterations: Vec<f64>,
    /// Last charge neutrality value
    pub charge_neutrality: Option<f64>,
    /// Total energy in Ry
    pub total_energy_ry: Option<f64>,
    /// Number of iterations performed in this run
    pub number_of_iterations: usize,
    /// Everything the parser could not find
    pub parser_errors: Vec<String>,
}

impl KkrOutput {
    /// Parse the text of the KKR output files
    ///
    /// `stdout` is `out_kkr`, `log` is `output.000.txt` when it was retrieved.
    pub fn from_text(stdout: &str, log: Option<&str>) -> Self {
        let sources: Vec<&str> = std::iter::once(stdout).chain(log).collect();
        let find_last = |label: &str| sources.iter().rev().find_map(|t| last_value_after(t, label));

        let convergence_values_all_iterations = sources
            .iter()
            .map(|t| all_values_after(t, "rms-error"))
            .find(|v| !v.is_empty())
            .unwrap_or_default();

        let mut output = KkrOutput {
            fermi_energy: find_last("E FERMI"),
            nspin: find_last("NSPIN").map(|v| v.round() as i64),
            convergence_value: convergence_values_all_iterations.last().copied(),
            number_of_iterations: convergence_values_all_iterations.len(),
            convergence_values_all_iterations,
            charge_neutrality: find_last("charge neutrality"),
            total_energy_ry: find_last("TOTAL ENERGY in ryd."),
            parser_errors: Vec::new(),
        };

        if output.fermi_energy.is_none() {
            output.parser_errors.push("Fermi energy not found".to_string());
        }
        if output.nspin.is_none() {
            output.parser_errors.push("NSPIN not found".to_string());
        }
        if output.convergence_value.is_none() {
            output.parser_errors.push("rms-error not found".to_string());
        }
        output
    }

    /// Parse a retrieved KKR folder
    pub fn from_folder<P: AsRef<Path>>(folder: P) -> Result<Self> {
        let folder = folder.as_ref();
        let stdout_path = folder.join(KKR_STDOUT);
        if !stdout_path.exists() {
            return Err(ParserError::MissingFile(stdout_path));
        }
        let stdout = fs::read_to_string(&stdout_path)?;
        let log = match fs::read_to_string(folder.join(KKR_OUTPUT_LOG)) {
            Ok(text) => Some(text),
            Err(_) => {
                debug!("No {} in {}", KKR_OUTPUT_LOG, folder.display());
                None
            }
        };

        let output = Self::from_text(&stdout, log.as_deref());
        if !output.parser_errors.is_empty() {
            warn!("KKR parser errors: {:?}", output.parser_errors);
        }
        Ok(output)
    }
}
