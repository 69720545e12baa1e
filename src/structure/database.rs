/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Element table used to translate species symbols into nuclear charges
//!
//! KKR wants the nuclear charge (`ZATOM`) of every site. Index 0 is the empty
//! sphere / vacancy, written as `X`.

use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Element symbols indexed by atomic number
pub const ELEMENTS: [&str; 119] = [
    "X", "H", "He", "Li", "Be", "B", "C", "N", "O", "F", "Ne", "Na", "Mg", "Al", "Si", "P", "S",
    "Cl", "Ar", "K", "Ca", "Sc", "Ti", "V", "Cr", "Mn", "Fe", "Co", "Ni", "Cu", "Zn", "Ga", "Ge",
    "As", "Se", "Br", "Kr", "Rb", "Sr", "Y", "Zr", "Nb", "Mo", "Tc", "Ru", "Rh", "Pd", "Ag", "Cd",
    "In", "Sn", "Sb", "Te", "I", "Xe", "Cs", "Ba", "La", "Ce", "Pr", "Nd", "Pm", "Sm", "Eu", "Gd",
    "Tb", "Dy", "Ho", "Er", "Tm", "Yb", "Lu", "Hf", "Ta", "W", "Re", "Os", "Ir", "Pt", "Au", "Hg",
    "Tl", "Pb", "Bi", "Po", "At", "Rn", "Fr", "Ra", "Ac", "Th", "Pa", "U", "Np", "Pu", "Am", "Cm",
    "Bk", "Cf", "Es", "Fm", "Md", "No", "Lr", "Rf", "Db", "Sg", "Bh", "Hs", "Mt", "Ds", "Rg", "Cn",
    "Nh", "Fl", "Mc", "Lv", "Ts", "Og",
];

static SYMBOL_TO_Z: Lazy<HashMap<String, u32>> = Lazy::new(|| {
    ELEMENTS
        .iter()
        .enumerate()
        .map(|(z, symbol)| (symbol.to_lowercase(), z as u32))
        .collect()
});

/// Provides the element symbol for an atomic number (0 is the empty sphere)
pub fn element_symbol(atomic_number: u32) -> Option<&'static str> {
    ELEMENTS.get(atomic_number as usize).copied()
}

/// Returns the atomic number for an element symbol
///
/// This function is case-insensitive and will handle both "Fe" and "FE"
pub fn atomic_number_from_symbol(symbol: &str) -> Option<u32> {
    SYMBOL_TO_Z.get(&symbol.trim().to_lowercase()).copied()
}
