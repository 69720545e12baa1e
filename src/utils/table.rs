/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Whitespace-delimited numeric text helpers
//!
//! The KKR codes write their tabular output (`qvec.dat`, `qdos.*`) as plain
//! columns of numbers. These helpers load such files into `ndarray` tables and
//! pick labelled values out of free-form log files.

use super::errors::{Result, UtilsError};
use ndarray::Array2;

/// Load a whitespace-delimited numeric table, skipping `skip_rows` header lines
///
/// Blank lines and lines starting with `#` are ignored.
pub fn load_table(text: &str, skip_rows: usize) -> Result<Array2<f64>> {
    let mut values = Vec::new();
    let mut ncols = None;
    let mut nrows = 0;

    for (i, line) in text.lines().enumerate().skip(skip_rows) {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let row = parse_row(trimmed, i + 1)?;
        match ncols {
            None => ncols = Some(row.len()),
            Some(expected) if expected != row.len() => {
                return Err(UtilsError::RaggedTable {
                    line: i + 1,
                    found: row.len(),
                    expected,
                })
            }
            Some(_) => {}
        }
        values.extend(row);
        nrows += 1;
    }

    let ncols = ncols.unwrap_or(0);
    Ok(Array2::from_shape_vec((nrows, ncols), values)?)
}

/// Parse every token of a line as a float (Fortran `D` exponents accepted)
pub fn parse_row(line: &str, line_number: usize) -> Result<Vec<f64>> {
    line.split_whitespace()
        .map(|token| parse_float(token, line_number))
        .collect()
}

/// Parse a single float token
pub fn parse_float(token: &str, line_number: usize) -> Result<f64> {
    token
        .replace(['D', 'd'], "E")
        .parse::<f64>()
        .map_err(|_| UtilsError::Number {
            token: token.to_string(),
            line: line_number,
        })
}

/// Return the last number on the last line containing `label`
///
/// Log files repeat labels once per iteration, so the final occurrence is the
/// converged one.
pub fn last_value_after(text: &str, label: &str) -> Option<f64> {
    text.lines()
        .filter(|line| line.contains(label))
        .filter_map(|line| {
            let tail = &line[line.find(label)? + label.len()..];
            tail.split(|c: char| c.is_whitespace() || c == '=' || c == ':' || c == ',')
                .filter(|t| !t.is_empty())
                .filter_map(|t| parse_float(t, 0).ok())
                .last()
        })
        .last()
}

/// Collect the last number after `label` for every line that contains it
pub fn all_values_after(text: &str, label: &str) -> Vec<f64> {
    text.lines()
        .filter_map(|line| {
            let tail = &line[line.find(label)? + label.len()..];
            tail.split(|c: char| c.is_whitespace() || c == '=' || c == ':' || c == ',')
                .filter(|t| !t.is_empty())
                .filter_map(|t| parse_float(t, 0).ok())
                .last()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_table_with_header() {
        let text = "3\n0.0 0.0 0.0\n0.5 0.0 0.0\n\n1.0 0.0 0.0\n";
        let table = load_table(text, 1).unwrap();
        assert_eq!(table.shape(), &[3, 3]);
        assert_eq!(table[[1, 0]], 0.5);
    }

    #[test]
    fn test_ragged_table() {
        let text = "1.0 2.0\n3.0\n";
        assert!(matches!(
            load_table(text, 0),
            Err(UtilsError::RaggedTable { line: 2, .. })
        ));
    }

    #[test]
    fn test_fortran_exponent() {
        assert_eq!(parse_float("1.5D-02", 1).unwrap(), 0.015);
    }

    #[test]
    fn test_last_value_after() {
        let text = "ITERATION 1 average rms-error : 2.0D-02\n\
                    ITERATION 2 average rms-error : 3.5D-04\n";
        assert_eq!(last_value_after(text, "rms-error"), Some(3.5e-4));
        assert_eq!(all_values_after(text, "rms-error"), vec![2.0e-2, 3.5e-4]);
        assert_eq!(last_value_after(text, "E FERMI"), None);
    }
}
