/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Parser for Voronoi preprocessing outputs

use super::errors::{ParserError, Result};
use crate::utils::table::last_value_after;
use log::warn;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Stdout of the Voronoi code
pub const VORONOI_STDOUT: &str = "out_voronoi";

/// Structured results of a Voronoi run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VoronoiOutput {
    /// Bottom of the energy contour chosen by the Voronoi step, in Ry
    pub emin: Option<f64>,
    /// Number of atoms in the reference cluster of each site
    pub cluster_sizes: Vec<usize>,
    /// Everything the parser could not find
    pub parser_errors: Vec<String>,
}

impl VoronoiOutput {
    /// Parse the Voronoi stdout
    pub fn from_text(stdout: &str) -> Self {
        let emin = last_value_after(stdout, "EMIN");
        let cluster_sizes = stdout
            .lines()
            .filter(|line| line.contains("atoms in cluster"))
            .filter_map(|line| line.split_whitespace().find_map(|t| t.parse::<usize>().ok()))
            .collect();

        let mut parser_errors = Vec::new();
        if emin.is_none() {
            parser_errors.push("EMIN not found".to_string());
        }
        VoronoiOutput {
            emin,
            cluster_sizes,
            parser_errors,
        }
    }

    /// Parse a retrieved Voronoi folder
    pub fn from_folder<P: AsRef<Path>>(folder: P) -> Result<Self> {
        let path = folder.as_ref().join(VORONOI_STDOUT);
        if !path.exists() {
            return Err(ParserError::MissingFile(path));
        }
        let output = Self::from_text(&fs::read_to_string(path)?);
        if !output.parser_errors.is_empty() {
            warn!("Voronoi parser errors: {:?}", output.parser_errors);
        }
        Ok(output)
    }
}
