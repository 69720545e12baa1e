/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Unit conversion utilities

use super::constants;

/// Convert from Angstroms to Bohr radii
pub fn angstrom_to_bohr(angstrom: f64) -> f64 {
    angstrom * constants::ANG_TO_BOHR
}

/// Convert from Bohr radii to Angstroms
pub fn bohr_to_angstrom(bohr: f64) -> f64 {
    bohr * constants::BOHR_RADIUS
}

/// Convert energy from Rydberg to eV
pub fn ry_to_ev(ry: f64) -> f64 {
    ry * constants::RY_TO_EV
}

/// Convert energy from eV to Rydberg
pub fn ev_to_ry(ev: f64) -> f64 {
    ev / constants::RY_TO_EV
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_unit_conversions() {
        let angstrom = 1.0;
        let bohr = angstrom_to_bohr(angstrom);
        assert_relative_eq!(bohr, 1.8897261254578281, epsilon = 1e-12);
        assert_relative_eq!(bohr_to_angstrom(bohr), angstrom, epsilon = 1e-10);

        let ev = 13.6056980659;
        assert_relative_eq!(ev_to_ry(ev), 1.0, epsilon = 1e-12);
        assert_relative_eq!(ry_to_ev(ev_to_ry(10.0)), 10.0, epsilon = 1e-10);
    }
}
