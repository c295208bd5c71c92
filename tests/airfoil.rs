use approx::assert_abs_diff_eq;

use bladeprep::airfoil::{self, Airfoil, GeometryError};
use bladeprep::geom::{MarkerKind, Point};

/// NACA 4-digit half thickness with the closed trailing edge term, so the
/// contour ends exactly at y = 0.
fn half_thickness(x: f64, t: f64) -> f64 {
    5.0 * t
        * (0.2969 * x.sqrt() - 0.1260 * x - 0.3516 * x.powi(2) + 0.2843 * x.powi(3)
            - 0.1036 * x.powi(4))
}

/// Symmetric airfoil sampled on a uniform chordwise grid, in canonical
/// order: trailing edge over the upper surface to the nose and back.
fn symmetric_airfoil(t: f64) -> Airfoil {
    let n = 20usize;
    let mut foil = Airfoil::new();
    let mut index = 0;
    for i in (0..=n).rev() {
        let x = i as f64 / n as f64;
        foil.add_coordinate(Point::new(index, x, half_thickness(x, t)));
        index += 1;
    }
    for i in 1..=n {
        let x = i as f64 / n as f64;
        foil.add_coordinate(Point::new(index, x, -half_thickness(x, t)));
        index += 1;
    }
    foil.normalize().unwrap();
    let thickness = foil.max_thickness().unwrap() / foil.chord_length().unwrap();
    foil.set_relative_thickness(thickness);
    foil
}

fn assert_normalized_invariants(foil: &Airfoil) {
    // contiguous indices
    for (i, c) in foil.coordinates().iter().enumerate() {
        assert_eq!(c.index, i);
    }
    // exactly one nose point, carrying the LE marker
    let noses: Vec<_> = foil
        .coordinates()
        .iter()
        .filter(|c| c.x.abs() <= 1e-9)
        .collect();
    assert_eq!(noses.len(), 1);
    let le = foil.marker(MarkerKind::Le).expect("LE marker");
    assert_eq!(le.index, noses[0].index);
    // exactly one trailing edge corner per side, top before bottom
    let te_upper: Vec<_> = foil.coordinates().iter().filter(|c| c.is_te_upper).collect();
    let te_lower: Vec<_> = foil.coordinates().iter().filter(|c| c.is_te_lower).collect();
    assert_eq!(te_upper.len(), 1);
    assert_eq!(te_lower.len(), 1);
    assert!(te_upper[0].x >= 1.0 - 1e-9);
    assert!(te_lower[0].x >= 1.0 - 1e-9);
    assert!(te_upper[0].index < te_lower[0].index);
    // surface flag follows the LE marker
    for c in foil.coordinates() {
        assert_eq!(c.is_upper, c.index <= le.index);
    }
}

#[test]
fn test_normalize_establishes_invariants() {
    let foil = symmetric_airfoil(0.24);
    assert!(foil.is_normalized());
    assert_normalized_invariants(&foil);
}

#[test]
fn test_normalize_is_idempotent() {
    let foil = symmetric_airfoil(0.24);
    let mut again = foil.clone();
    again.normalize().unwrap();
    assert_eq!(foil.coordinates(), again.coordinates());
    assert_eq!(foil.markers(), again.markers());
}

#[test]
fn test_normalize_inserts_missing_nose_point() {
    let xs = [1.0, 0.75, 0.5, 0.25, 0.05];
    let mut foil = Airfoil::new();
    let mut index = 0;
    for &x in &xs {
        foil.add_coordinate(Point::new(index, x, half_thickness(x, 0.2)));
        index += 1;
    }
    for &x in xs.iter().rev().skip(1) {
        foil.add_coordinate(Point::new(index, x, -half_thickness(x, 0.2)));
        index += 1;
    }
    foil.normalize().unwrap();
    assert_normalized_invariants(&foil);
    // one more point than supplied
    assert_eq!(foil.coordinates().len(), 10);
    assert_abs_diff_eq!(foil.leading_edge().unwrap().y, 0.0);
}

#[test]
fn test_normalize_reverses_clockwise_contour() {
    let n = 10usize;
    let mut foil = Airfoil::new();
    let mut index = 0;
    // lower surface first: this contour runs clockwise
    for i in (0..=n).rev() {
        let x = i as f64 / n as f64;
        foil.add_coordinate(Point::new(index, x, -half_thickness(x, 0.2)));
        index += 1;
    }
    for i in 1..=n {
        let x = i as f64 / n as f64;
        foil.add_coordinate(Point::new(index, x, half_thickness(x, 0.2)));
        index += 1;
    }
    foil.normalize().unwrap();
    assert_normalized_invariants(&foil);
    // after reversal the first point sits on the upper surface
    assert!(foil.coordinates()[1].y > 0.0);
}

#[test]
fn test_chord_length_of_unit_contour() {
    let foil = symmetric_airfoil(0.24);
    assert_abs_diff_eq!(foil.chord_length().unwrap(), 1.0, epsilon = 1e-12);
}

#[test]
fn test_max_thickness_of_symmetric_contour() {
    let foil = symmetric_airfoil(0.24);
    // maximum of the sampled grid sits at x = 0.30
    let expected = 2.0 * half_thickness(0.30, 0.24);
    assert_abs_diff_eq!(foil.max_thickness().unwrap(), expected, epsilon = 1e-12);
}

#[test]
fn test_separate_surfaces_ordering_and_padding() {
    let foil = symmetric_airfoil(0.2);
    let (upper, lower) = foil.separate_surfaces().unwrap();
    assert_abs_diff_eq!(upper.first().unwrap()[0], 1.0);
    assert_abs_diff_eq!(upper.last().unwrap()[0], 0.0);
    assert_abs_diff_eq!(lower.first().unwrap()[0], 0.0);
    assert_abs_diff_eq!(lower.last().unwrap()[0], 1.0);
    for pair in upper.windows(2) {
        assert!(pair[0][0] > pair[1][0]);
    }
    for pair in lower.windows(2) {
        assert!(pair[0][0] < pair[1][0]);
    }
}

#[test]
fn test_markers_missing_on_raw_airfoil() {
    let foil = Airfoil::new();
    assert!(matches!(
        foil.leading_edge(),
        Err(GeometryError::MarkerMissing(MarkerKind::Le))
    ));
    assert!(matches!(
        foil.trailing_edge(),
        Err(GeometryError::MarkerMissing(MarkerKind::Te))
    ));
}

#[test]
fn test_unit_scaling_reproduces_canonical_contour() {
    let mut foil = symmetric_airfoil(0.24);
    foil.apply_scaling(1.0, 1.0, 1.0);
    assert_eq!(foil.coordinates(), foil.scaled_coordinates());
}

#[test]
fn test_scaling_overwrites_previous_scaled_contour() {
    let mut foil = symmetric_airfoil(0.24);
    foil.apply_scaling(3.0, 3.0, 7.0);
    foil.apply_scaling(2.0, 2.0, 5.0);
    let te = &foil.scaled_coordinates()[0];
    assert_abs_diff_eq!(te.x, 2.0, epsilon = 1e-12);
    assert_abs_diff_eq!(te.z, 5.0, epsilon = 1e-12);
}

#[test]
fn test_twist_rotates_about_pivot() {
    let mut foil = symmetric_airfoil(0.24);
    foil.apply_scaling(1.0, 1.0, 1.0);
    foil.apply_twist_around(90.0, 0.0, 0.0);
    // the upper trailing edge point (1, 0) moves to (0, 1)
    let te = &foil.scaled_coordinates()[0];
    assert_abs_diff_eq!(te.x, 0.0, epsilon = 1e-12);
    assert_abs_diff_eq!(te.y, 1.0, epsilon = 1e-12);
}

#[test]
fn test_twist_around_quarter_chord_pivot_location() {
    let mut foil = symmetric_airfoil(0.24);
    foil.apply_scaling(1.0, 1.0, 1.0);
    foil.apply_twist_around_quarter_chord(180.0, 0.0).unwrap();
    // the nose (0, 0) mirrors through the quarter-chord point to (0.5, 0)
    let le_index = foil.marker(MarkerKind::Le).unwrap().index;
    let nose = &foil.scaled_coordinates()[le_index];
    assert_abs_diff_eq!(nose.x, 0.5, epsilon = 1e-12);
    assert_abs_diff_eq!(nose.y, 0.0, epsilon = 1e-12);
}

#[test]
fn test_twist_without_scaled_contour_fails() {
    let mut foil = symmetric_airfoil(0.24);
    assert!(matches!(
        foil.apply_twist_around_quarter_chord(5.0, 0.0),
        Err(GeometryError::NotFound(_))
    ));
}

#[test]
fn test_translation_shifts_scaled_contour() {
    let mut foil = symmetric_airfoil(0.24);
    foil.apply_scaling(1.0, 1.0, 1.0);
    foil.apply_translation_xy(-0.25, 0.1);
    let te = &foil.scaled_coordinates()[0];
    assert_abs_diff_eq!(te.x, 0.75, epsilon = 1e-12);
    assert_abs_diff_eq!(te.y, 0.1, epsilon = 1e-12);
}

#[test]
fn test_interpolation_at_input_thickness_reproduces_input() {
    let a = symmetric_airfoil(0.24);
    let b = symmetric_airfoil(0.18);
    for input in [&a, &b] {
        let blended =
            airfoil::interpolate_between(&a, &b, input.relative_thickness_percent()).unwrap();
        let (up_in, lo_in) = input.separate_surfaces().unwrap();
        let (up_out, lo_out) = blended.separate_surfaces().unwrap();
        assert_eq!(up_in.len(), up_out.len());
        assert_eq!(lo_in.len(), lo_out.len());
        for (p, q) in up_in.iter().zip(up_out.iter()) {
            assert_abs_diff_eq!(p[0], q[0], epsilon = 1e-9);
            assert_abs_diff_eq!(p[1], q[1], epsilon = 1e-9);
        }
        for (p, q) in lo_in.iter().zip(lo_out.iter()) {
            assert_abs_diff_eq!(p[0], q[0], epsilon = 1e-9);
            assert_abs_diff_eq!(p[1], q[1], epsilon = 1e-9);
        }
    }
}

#[test]
fn test_interpolation_midpoint_thickness() {
    let a = symmetric_airfoil(0.24);
    let b = symmetric_airfoil(0.18);
    let target = (a.relative_thickness_percent() + b.relative_thickness_percent()) / 2.0;
    let blended = airfoil::interpolate_between(&a, &b, target).unwrap();
    let expected = (a.max_thickness().unwrap() + b.max_thickness().unwrap()) / 2.0;
    assert_abs_diff_eq!(blended.max_thickness().unwrap(), expected, epsilon = 1e-3);
    assert_abs_diff_eq!(blended.relative_thickness_percent(), target, epsilon = 1e-12);
}

#[test]
fn test_interpolation_result_is_normalization_compliant() {
    let a = symmetric_airfoil(0.24);
    let b = symmetric_airfoil(0.18);
    let blended = airfoil::interpolate_between(&a, &b, 21.0).unwrap();
    assert_normalized_invariants(&blended);
}

#[test]
fn test_interpolation_outside_bracket_fails() {
    let a = symmetric_airfoil(0.24);
    let b = symmetric_airfoil(0.18);
    assert!(matches!(
        airfoil::interpolate_between(&a, &b, 30.0),
        Err(GeometryError::OutOfRange { .. })
    ));
    assert!(matches!(
        airfoil::interpolate_between(&a, &b, 10.0),
        Err(GeometryError::OutOfRange { .. })
    ));
}
