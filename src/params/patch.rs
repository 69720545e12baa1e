/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Parameter patches applied between workflow steps
//!
//! A band-structure run reuses the parameters of a converged calculation but
//! replaces the energy contour by a straight line around the Fermi level.

use super::errors::Result;
use super::keywords::KeyScope;
use super::parameter_set::ParameterSet;
use super::value::ParamValue;
use crate::utils::ev_to_ry;
use serde::{Deserialize, Serialize};

/// Energy window of a band-structure run, relative to the Fermi level
///
/// `EMIN` and `EMAX` are distances from the Fermi energy in eV. Keys are
/// accepted in upper or lower case; `nepts` is accepted for `NPT2`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EnergyWindow {
    #[serde(rename = "EMIN", alias = "emin", default = "EnergyWindow::default_emin")]
    pub emin: f64,
    #[serde(rename = "EMAX", alias = "emax", default = "EnergyWindow::default_emax")]
    pub emax: f64,
    #[serde(
        rename = "NPT2",
        alias = "npt2",
        alias = "nepts",
        default = "EnergyWindow::default_npt2"
    )]
    pub npt2: i64,
    #[serde(rename = "TEMPR", alias = "tempr", default = "EnergyWindow::default_tempr")]
    pub tempr: f64,
    #[serde(
        rename = "RCLUSTZ",
        alias = "rclustz",
        default = "EnergyWindow::default_rclustz"
    )]
    pub rclustz: f64,
}

impl EnergyWindow {
    fn default_emin() -> f64 {
        13.0
    }
    fn default_emax() -> f64 {
        15.0
    }
    fn default_npt2() -> i64 {
        200
    }
    fn default_tempr() -> f64 {
        50.0
    }
    fn default_rclustz() -> f64 {
        2.3
    }

    /// Contour end points in Ry for a Fermi energy given in Ry
    ///
    /// `EMIN = (E_f - W_min) / RY_TO_EV` and `EMAX = (E_f + W_max) / RY_TO_EV`.
    pub fn bounds(&self, fermi_energy: f64) -> (f64, f64) {
        (
            ev_to_ry(fermi_energy - self.emin),
            ev_to_ry(fermi_energy + self.emax),
        )
    }
}

impl Default for EnergyWindow {
    fn default() -> Self {
        Self {
            emin: Self::default_emin(),
            emax: Self::default_emax(),
            npt2: Self::default_npt2(),
            tempr: Self::default_tempr(),
            rclustz: Self::default_rclustz(),
        }
    }
}

/// Produce a new parameter set with a straight-line contour around `fermi_energy`
///
/// The base set is left untouched. The result is validated against the
/// calculation-scope mandatory keys and all problems are reported at once.
pub fn patch_energy_window(
    base: &ParameterSet,
    window: &EnergyWindow,
    fermi_energy: f64,
) -> Result<ParameterSet> {
    let (emin, emax) = window.bounds(fermi_energy);
    let patched = base.with_values([
        ("NPT2", ParamValue::Int(window.npt2)),
        ("IEMXD", ParamValue::Int(window.npt2)),
        ("EMIN", ParamValue::Float(emin)),
        ("EMAX", ParamValue::Float(emax)),
        ("TEMPR", ParamValue::Float(window.tempr)),
        ("RCLUSTZ", ParamValue::Float(window.rclustz)),
        ("NPT1", ParamValue::Int(0)),
        ("NPT3", ParamValue::Int(0)),
        ("NPOL", ParamValue::Int(0)),
    ])?;
    patched.validate(KeyScope::Calculation)?;
    Ok(patched)
}

/// Add a run option (e.g. `qdos`) without duplicating existing ones
pub fn with_run_option(base: &ParameterSet, option: &str) -> Result<ParameterSet> {
    let mut options = base
        .get("RUNOPT")
        .and_then(ParamValue::as_text_list)
        .unwrap_or_default();
    if !options.iter().any(|o| o.eq_ignore_ascii_case(option)) {
        options.push(option.to_string());
    }
    base.with_value("RUNOPT", ParamValue::TextArray(options))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_window_bounds() {
        let window = EnergyWindow {
            emin: 13.0,
            emax: 13.0,
            ..Default::default()
        };
        let (emin, emax) = window.bounds(0.5);
        assert_relative_eq!(emin, (0.5 - 13.0) / 13.6056980659, epsilon = 1e-15);
        assert_relative_eq!(emax, (0.5 + 13.0) / 13.6056980659, epsilon = 1e-15);
    }

    #[test]
    fn test_window_aliases() {
        let window: EnergyWindow =
            serde_json::from_str(r#"{"emin": 20, "nepts": 100, "EMAX": 13}"#).unwrap();
        assert_eq!(window.emin, 20.0);
        assert_eq!(window.emax, 13.0);
        assert_eq!(window.npt2, 100);
        assert_eq!(window.tempr, 50.0);
        assert!(serde_json::from_str::<EnergyWindow>(r#"{"EMINN": 1}"#).is_err());
    }

    #[test]
    fn test_run_option_not_duplicated() {
        let set = with_run_option(&ParameterSet::new(), "qdos").unwrap();
        let set = with_run_option(&set, "QDOS").unwrap();
        assert_eq!(
            set.get("RUNOPT"),
            Some(&ParamValue::TextArray(vec!["qdos".to_string()]))
        );
    }
}
