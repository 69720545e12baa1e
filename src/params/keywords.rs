/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! The known-keyword schema of the KKR/Voronoi inputcard
//!
//! Every keyword a [`ParameterSet`](super::ParameterSet) may hold is listed
//! here, in the order it is written to the inputcard. Lengths are in units of
//! the lattice constant (itself in Bohr radii) and energies in Rydberg unless
//! noted.

use super::value::{ParamValue, ValueKind};
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// How a keyword is laid out in the inputcard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// `KEY= value`
    Inline,
    /// `KEY` on its own line followed by one row per entry
    Rows,
    /// `<KEY>` on its own line followed by one row per site
    SiteBlock,
}

/// Which keywords a missing-key check should consider
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyScope {
    /// Every mandatory keyword
    Full,
    /// Mandatory keywords except the ones derived from the structure
    Calculation,
}

/// Description of one inputcard keyword
#[derive(Debug, Clone)]
pub struct KeywordSpec {
    pub name: &'static str,
    pub kind: ValueKind,
    pub layout: Layout,
    pub mandatory: bool,
    /// Filled in from the structure by the calculation plugins
    pub from_structure: bool,
    pub description: &'static str,
}

const fn key(
    name: &'static str,
    kind: ValueKind,
    layout: Layout,
    mandatory: bool,
    from_structure: bool,
    description: &'static str,
) -> KeywordSpec {
    KeywordSpec {
        name,
        kind,
        layout,
        mandatory,
        from_structure,
        description,
    }
}

use Layout::{Inline, Rows, SiteBlock};
use ValueKind::{Bool, Float, FloatArray, Int, IntArray, Matrix, TextArray};

/// All known keywords, in inputcard order
pub static KEYWORDS: &[KeywordSpec] = &[
    // Lattice and basis
    key("ALATBASIS", Float, Inline, true, true, "Lattice constant in Bohr radii"),
    key("BRAVAIS", Matrix, Rows, true, true, "Bravais vectors in units of ALATBASIS"),
    key("NAEZ", Int, Inline, true, true, "Number of sites in the unit cell"),
    key("CARTESIAN", Bool, Inline, true, true, "RBASIS given in Cartesian coordinates"),
    key("<RBASIS>", Matrix, SiteBlock, true, true, "Site positions in units of ALATBASIS"),
    key("<ZATOM>", FloatArray, SiteBlock, true, true, "Nuclear charge of every site"),
    key("INTERFACE", Bool, Inline, false, false, "2D (layered) geometry"),
    // Accuracy
    key("LMAX", Int, Inline, true, false, "Angular momentum cutoff"),
    key("NSPIN", Int, Inline, true, false, "Number of spin directions (1 or 2)"),
    key("RMAX", Float, Inline, true, false, "Ewald sum cutoff in real space"),
    key("GMAX", Float, Inline, true, false, "Ewald sum cutoff in reciprocal space"),
    key("RCLUSTZ", Float, Inline, true, false, "Radius of the screening cluster (alat units)"),
    key("RCLUSTXY", Float, Inline, false, false, "In-plane radius of the screening cluster"),
    key("BZDIVIDE", IntArray, Inline, true, false, "k-mesh divisions along each reciprocal vector"),
    // Energy contour
    key("EMIN", Float, Inline, true, false, "Lower end of the energy contour (Ry)"),
    key("EMAX", Float, Inline, true, false, "Upper end of the energy contour (Ry)"),
    key("TEMPR", Float, Inline, true, false, "Electronic smearing temperature (K)"),
    key("NPOL", Int, Inline, true, false, "Number of Matsubara poles"),
    key("NPT1", Int, Inline, true, false, "Contour points on the first vertical segment"),
    key("NPT2", Int, Inline, true, false, "Contour points on the horizontal segment"),
    key("NPT3", Int, Inline, true, false, "Contour points on the second vertical segment"),
    key("IEMXD", Int, Inline, false, false, "Dimension of the energy mesh arrays"),
    // Self-consistency
    key("NSTEPS", Int, Inline, false, false, "Number of self-consistency iterations per run"),
    key("IMIX", Int, Inline, false, false, "Mixing scheme (0 straight, 3/4/5 Broyden)"),
    key("STRMIX", Float, Inline, false, false, "Straight mixing factor"),
    key("BRYMIX", Float, Inline, false, false, "Broyden mixing factor"),
    key("QBOUND", Float, Inline, false, false, "rms convergence bound"),
    // Physics switches
    key("INS", Int, Inline, false, false, "Full-potential (1) or ASA (0)"),
    key("KSHAPE", Int, Inline, false, false, "Shape function mode"),
    key("KVREL", Int, Inline, false, false, "Relativistic treatment"),
    key("KEXCOR", Int, Inline, false, false, "Exchange-correlation functional"),
    key("HFIELD", Float, Inline, false, false, "External magnetic field (Ry)"),
    key("LINIPOL", Bool, Inline, false, false, "Initial spin polarization"),
    key("RUNOPT", TextArray, Rows, false, false, "Run options, e.g. qdos"),
    key("TESTOPT", TextArray, Rows, false, false, "Test options"),
];

static INDEX: Lazy<HashMap<&'static str, usize>> = Lazy::new(|| {
    KEYWORDS
        .iter()
        .enumerate()
        .map(|(i, spec)| (spec.name, i))
        .collect()
});

/// Default values used to backfill missing mandatory keywords
static DEFAULTS: Lazy<Vec<(&'static str, ParamValue)>> = Lazy::new(|| {
    vec![
        ("RCLUSTZ", ParamValue::Float(1.5)),
        ("BZDIVIDE", ParamValue::IntArray(vec![40, 40, 40])),
        ("EMIN", ParamValue::Float(-0.4)),
        ("EMAX", ParamValue::Float(1.0)),
        ("TEMPR", ParamValue::Float(800.0)),
        ("NPOL", ParamValue::Int(7)),
        ("NPT1", ParamValue::Int(3)),
        ("NPT2", ParamValue::Int(20)),
        ("NPT3", ParamValue::Int(3)),
    ]
});

/// Normalize a user-supplied key (`rbasis`, `<RBASIS>`) to its schema name
pub fn canonical_name(key: &str) -> Option<&'static str> {
    let upper = key.trim().to_uppercase();
    if let Some(&i) = INDEX.get(upper.as_str()) {
        return Some(KEYWORDS[i].name);
    }
    let bracketed = format!("<{}>", upper.trim_start_matches('<').trim_end_matches('>'));
    INDEX.get(bracketed.as_str()).map(|&i| KEYWORDS[i].name)
}

/// Look up a keyword by any accepted spelling
pub fn lookup(key: &str) -> Option<&'static KeywordSpec> {
    canonical_name(key).and_then(|name| INDEX.get(name).map(|&i| &KEYWORDS[i]))
}

/// Mandatory keywords for the given scope, in inputcard order
pub fn mandatory_keys(scope: KeyScope) -> impl Iterator<Item = &'static KeywordSpec> {
    KEYWORDS
        .iter()
        .filter(move |spec| spec.mandatory && (scope == KeyScope::Full || !spec.from_structure))
}

/// Default value of a keyword, if it has one
pub fn default_value(name: &str) -> Option<&'static ParamValue> {
    DEFAULTS.iter().find(|(k, _)| *k == name).map(|(_, v)| v)
}

/// Position of a keyword in the inputcard
pub fn order(name: &str) -> usize {
    INDEX.get(name).copied().unwrap_or(usize::MAX)
}
