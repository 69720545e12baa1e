/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

use approx::assert_relative_eq;
use kkr_rs::utils::table::{all_values_after, last_value_after, load_table};
use kkr_rs::utils::{angstrom_to_bohr, bohr_to_angstrom, constants, ev_to_ry, ry_to_ev, UtilsError};

#[test]
fn test_unit_conversions() {
    // Test Angstrom ↔ Bohr conversions
    let angstrom_value = 2.5;
    let bohr_value = angstrom_to_bohr(angstrom_value);
    assert_relative_eq!(bohr_to_angstrom(bohr_value), angstrom_value, epsilon = 1e-10);
    assert_relative_eq!(
        bohr_value,
        angstrom_value / constants::BOHR_RADIUS,
        epsilon = 1e-10
    );

    // Test eV ↔ Rydberg conversions
    let ev_value = 27.211;
    assert_relative_eq!(ry_to_ev(ev_to_ry(ev_value)), ev_value, epsilon = 1e-10);
    assert_relative_eq!(ev_to_ry(constants::RY_TO_EV), 1.0, epsilon = 1e-12);
}

#[test]
fn test_qvec_style_table() {
    let text = "# k-points\n3\n 0.0 0.0 0.0\n 0.25D0 0.0 0.0\n 0.5 0.0 0.0\n";
    // The count line comes after the comment, so skip two raw lines
    let table = load_table(text, 2).unwrap();
    assert_eq!(table.shape(), &[3, 3]);
    assert_relative_eq!(table[[1, 0]], 0.25);
}

#[test]
fn test_bad_token_reports_line() {
    match load_table("1.0 2.0\n1.0 abc\n", 0) {
        Err(UtilsError::Number { token, line }) => {
            assert_eq!(token, "abc");
            assert_eq!(line, 2);
        }
        other => panic!("expected a number error, got {:?}", other),
    }
}

#[test]
fn test_labelled_values() {
    let log = " charge neutrality in unit cell =    1.2D-02\n\
                 some other line\n\
                 charge neutrality in unit cell =   -3.0D-04\n";
    assert_eq!(
        all_values_after(log, "charge neutrality"),
        vec![1.2e-2, -3.0e-4]
    );
    assert_eq!(last_value_after(log, "charge neutrality"), Some(-3.0e-4));
    assert_eq!(last_value_after(log, "E FERMI"), None);
}
