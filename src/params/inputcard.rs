/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Reading and writing the flat-text `inputcard`
//!
//! Scalars are written as `KEY= value`, Bravais vectors and run options as a
//! bare keyword followed by rows, and per-site data as a `<KEY>` block with one
//! row per site. Booleans are Fortran `T`/`F`.

use super::errors::{ParamError, Result};
use super::keywords::{self, Layout};
use super::parameter_set::ParameterSet;
use super::value::{ParamValue, ValueKind};
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

/// Format a float the way the KKR codes read it back without loss
pub fn format_float(x: f64) -> String {
    if x != 0.0 && (x.abs() < 1e-4 || x.abs() >= 1e8) {
        format!("{:.12E}", x)
    } else {
        format!("{:.12}", x)
    }
}

fn format_bool(b: bool) -> &'static str {
    if b {
        "T"
    } else {
        "F"
    }
}

fn format_inline(value: &ParamValue) -> String {
    match value {
        ParamValue::Bool(b) => format_bool(*b).to_string(),
        ParamValue::Int(i) => i.to_string(),
        ParamValue::Float(x) => format_float(*x),
        ParamValue::Text(s) => s.clone(),
        ParamValue::IntArray(v) => v.iter().map(|i| i.to_string()).collect::<Vec<_>>().join(" "),
        ParamValue::FloatArray(v) => v.iter().map(|x| format_float(*x)).collect::<Vec<_>>().join(" "),
        ParamValue::TextArray(v) => v.join(" "),
        ParamValue::Matrix(rows) => rows
            .iter()
            .flatten()
            .map(|x| format_float(*x))
            .collect::<Vec<_>>()
            .join(" "),
    }
}

fn format_rows(value: &ParamValue) -> Vec<String> {
    match value {
        ParamValue::Matrix(rows) => rows
            .iter()
            .map(|row| {
                row.iter()
                    .map(|x| format!("{:>20}", format_float(*x)))
                    .collect::<String>()
            })
            .collect(),
        ParamValue::FloatArray(v) => v.iter().map(|x| format!("{:>20}", format_float(*x))).collect(),
        ParamValue::IntArray(v) => v.iter().map(|i| format!("{:>8}", i)).collect(),
        ParamValue::TextArray(v) => vec![v.iter().map(|s| format!("{:<8}", s)).collect::<String>()],
        other => vec![format_inline(other)],
    }
}

/// Render a parameter set as inputcard text
pub fn render(params: &ParameterSet) -> String {
    let mut out = String::new();
    for (name, value) in params.iter() {
        // schema names are the only keys a ParameterSet can hold
        let layout = keywords::lookup(name).map_or(Layout::Inline, |spec| spec.layout);
        match layout {
            Layout::Inline => {
                let _ = writeln!(out, "{}= {}", name, format_inline(value));
            }
            Layout::Rows | Layout::SiteBlock => {
                let _ = writeln!(out, "{}", name);
                for row in format_rows(value) {
                    let _ = writeln!(out, "{}", row.trim_end());
                }
            }
        }
    }
    out
}

/// Write a parameter set to an inputcard file
pub fn write_inputcard<P: AsRef<Path>>(params: &ParameterSet, path: P) -> Result<()> {
    fs::write(path, render(params))?;
    Ok(())
}

fn parse_f64(token: &str, line: usize) -> Result<f64> {
    token
        .replace(['D', 'd'], "E")
        .parse::<f64>()
        .map_err(|_| ParamError::Inputcard {
            line,
            message: format!("cannot read '{}' as float", token),
        })
}

fn parse_token(token: &str, kind: ValueKind, line: usize) -> Result<ParamValue> {
    let err = || ParamError::Inputcard {
        line,
        message: format!("cannot read '{}' as {}", token, kind),
    };
    match kind {
        ValueKind::Bool => match token.trim_matches('.').to_uppercase().as_str() {
            "T" | "TRUE" => Ok(ParamValue::Bool(true)),
            "F" | "FALSE" => Ok(ParamValue::Bool(false)),
            _ => Err(err()),
        },
        ValueKind::Int => token.parse::<i64>().map(ParamValue::Int).map_err(|_| err()),
        ValueKind::Float => parse_f64(token, line).map(ParamValue::Float),
        _ => Ok(ParamValue::Text(token.to_string())),
    }
}

fn parse_value(text: &str, kind: ValueKind, line: usize) -> Result<ParamValue> {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    let floats = |tokens: &[&str]| -> Result<Vec<f64>> {
        tokens.iter().map(|t| parse_f64(t, line)).collect()
    };
    match kind {
        ValueKind::IntArray => tokens
            .iter()
            .map(|t| {
                t.parse::<i64>().map_err(|_| ParamError::Inputcard {
                    line,
                    message: format!("cannot read '{}' as integer", t),
                })
            })
            .collect::<Result<Vec<_>>>()
            .map(ParamValue::IntArray),
        ValueKind::FloatArray => floats(&tokens).map(ParamValue::FloatArray),
        ValueKind::Matrix => floats(&tokens).map(|v| ParamValue::Matrix(vec![v])),
        ValueKind::TextArray => Ok(ParamValue::TextArray(
            tokens.iter().map(|t| t.to_string()).collect(),
        )),
        ValueKind::Text => Ok(ParamValue::Text(text.trim().to_string())),
        scalar => match tokens.as_slice() {
            [token] => parse_token(token, scalar, line),
            _ => Err(ParamError::Inputcard {
                line,
                message: format!("expected a single {} but found '{}'", scalar, text.trim()),
            }),
        },
    }
}

fn is_data_row(line: &str) -> bool {
    line.trim_start()
        .chars()
        .next()
        .map_or(false, |c| c.is_ascii_digit() || c == '-' || c == '+' || c == '.')
}

/// Parse inputcard text back into a parameter set
///
/// Comment lines (`#`) and keywords that are not in the schema are skipped so
/// that hand-edited cards from other tools can still be read.
pub fn parse(text: &str) -> Result<ParameterSet> {
    let lines: Vec<&str> = text.lines().collect();
    let mut entries: Vec<(&'static str, ParamValue)> = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        let line_number = i + 1;
        let line = lines[i].trim();
        i += 1;
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if let Some((key, rest)) = line.split_once('=') {
            if let Some(spec) = keywords::lookup(key) {
                entries.push((spec.name, parse_value(rest, spec.kind, line_number)?));
            }
            continue;
        }

        let Some(spec) = keywords::lookup(line) else {
            continue;
        };
        match spec.kind {
            ValueKind::TextArray => {
                let row = lines.get(i).copied().unwrap_or("");
                i += 1;
                entries.push((spec.name, parse_value(row, spec.kind, line_number + 1)?));
            }
            kind => {
                let mut rows: Vec<Vec<f64>> = Vec::new();
                while i < lines.len() && is_data_row(lines[i]) {
                    rows.push(
                        lines[i]
                            .split_whitespace()
                            .map(|t| parse_f64(t, i + 1))
                            .collect::<Result<_>>()?,
                    );
                    i += 1;
                }
                let value = match kind {
                    ValueKind::Matrix => ParamValue::Matrix(rows),
                    _ => ParamValue::FloatArray(rows.into_iter().flatten().collect()),
                };
                entries.push((spec.name, value));
            }
        }
    }

    ParameterSet::from_map(entries)
}

/// Read an inputcard file into a parameter set
pub fn read_inputcard<P: AsRef<Path>>(path: P) -> Result<ParameterSet> {
    parse(&fs::read_to_string(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_float() {
        assert_eq!(format_float(1.5), "1.500000000000");
        assert_eq!(format_float(0.0), "0.000000000000");
        assert_eq!(format_float(1e-7), "1.000000000000E-7");
    }

    #[test]
    fn test_render_layouts() {
        let params = ParameterSet::from_map([
            ("LMAX", ParamValue::Int(2)),
            ("CARTESIAN", ParamValue::Bool(true)),
            (
                "BRAVAIS",
                ParamValue::Matrix(vec![
                    vec![0.5, 0.5, 0.0],
                    vec![0.5, 0.0, 0.5],
                    vec![0.0, 0.5, 0.5],
                ]),
            ),
            ("ZATOM", ParamValue::FloatArray(vec![29.0])),
            ("RUNOPT", ParamValue::TextArray(vec!["qdos".into()])),
        ])
        .unwrap();
        let text = render(&params);
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "BRAVAIS");
        assert_eq!(lines[1].split_whitespace().count(), 3);
        assert_eq!(lines[4], "CARTESIAN= T");
        assert_eq!(lines[5], "<ZATOM>");
        assert_eq!(lines[7], "LMAX= 2");
        assert_eq!(lines[8], "RUNOPT");
        assert_eq!(lines[9], "qdos");
    }

    #[test]
    fn test_parse_reads_written_card() {
        let text = "\
ALATBASIS= 4.829
BRAVAIS
 0.7 0.7 0.0
 0.7 0.0 0.7
 0.0 0.7 0.7
NAEZ= 1
CARTESIAN= T
<RBASIS>
 0.0 0.0 0.0
<ZATOM>
 29.0
LMAX= 2
BZDIVIDE= 40 40 40
QBOUND= 1.0D-07
RUNOPT
qdos    
UNKNOWN= 3
";
        let params = parse(text).unwrap();
        assert_eq!(params.get_f64("ALATBASIS"), Some(4.829));
        assert_eq!(params.get_i64("NAEZ"), Some(1));
        assert_eq!(params.get("CARTESIAN"), Some(&ParamValue::Bool(true)));
        assert_eq!(
            params.get("RBASIS"),
            Some(&ParamValue::Matrix(vec![vec![0.0, 0.0, 0.0]]))
        );
        assert_eq!(params.get("ZATOM"), Some(&ParamValue::FloatArray(vec![29.0])));
        assert_eq!(params.get("BZDIVIDE"), Some(&ParamValue::IntArray(vec![40, 40, 40])));
        assert_eq!(params.get_f64("QBOUND"), Some(1e-7));
        assert_eq!(
            params.get("RUNOPT"),
            Some(&ParamValue::TextArray(vec!["qdos".into()]))
        );
        if let Some(ParamValue::Matrix(rows)) = params.get("BRAVAIS") {
            assert_eq!(rows.len(), 3);
        } else {
            panic!("BRAVAIS not parsed as a matrix");
        }
    }

    #[test]
    fn test_parse_bad_scalar() {
        let err = parse("LMAX= two\n").unwrap_err();
        assert!(matches!(err, ParamError::Inputcard { line: 1, .. }));
    }
}
