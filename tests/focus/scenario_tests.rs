//! End-to-end focusing of a Gaussian bunch through a 10 cm lens.

use apl_focus_rs::focus::plasma_lens_current;
use apl_focus_rs::{
    analyze_bunch, calculate_apl_strength, AplError, Beamline, Drift, LinearTracker, Propagator,
};

use crate::test_helpers::{approx_eq, waist_bunch, TARGET_ENERGY};

const APL_START: f64 = 0.05;
const APL_LENGTH: f64 = 0.1;
const FOCAL_PLANE: f64 = 1.0;
const APL_RADIUS: f64 = 2e-3;

#[test]
fn test_focusing_reduces_beam_size() {
    let bunch = waist_bunch(10_000, 42);
    let solution =
        calculate_apl_strength(&bunch, APL_START, APL_LENGTH, FOCAL_PLANE, Some(APL_RADIUS), true)
            .unwrap();
    assert!(solution.k_opt > 0.0);

    let before_lens = LinearTracker::new()
        .propagate(&Beamline::new(vec![Drift::new(APL_START).into()]), bunch.clone())
        .unwrap();
    let sigma_before = analyze_bunch(before_lens.last().unwrap()).unwrap().sigma_x;

    let focused = solution.focused_bunch.unwrap();
    let at_focus = analyze_bunch(&focused).unwrap();
    assert!(at_focus.sigma_x < sigma_before);
    assert!(approx_eq(at_focus.prop_distance, FOCAL_PLANE, 1e-12));
    assert!(approx_eq(at_focus.sigma_x, solution.objective_value, 1e-18));
}

#[test]
fn test_current_uses_input_bunch_energy() {
    let bunch = waist_bunch(2_000, 5);
    let solution =
        calculate_apl_strength(&bunch, APL_START, APL_LENGTH, FOCAL_PLANE, Some(APL_RADIUS), false)
            .unwrap();

    let avg_ene = analyze_bunch(&bunch).unwrap().avg_ene;
    assert!(approx_eq(avg_ene, TARGET_ENERGY, 0.05));

    let current = solution.current.unwrap();
    assert!(current > 0.0);
    assert_eq!(current, plasma_lens_current(solution.k_opt, APL_RADIUS, avg_ene));
    assert!(solution.focused_bunch.is_none());
}

#[test]
fn test_no_radius_no_current() {
    let bunch = waist_bunch(2_000, 5);
    let solution =
        calculate_apl_strength(&bunch, APL_START, APL_LENGTH, FOCAL_PLANE, None, false).unwrap();
    assert!(solution.current.is_none());
}

#[test]
fn test_input_bunch_is_unmodified() {
    let bunch = waist_bunch(2_000, 9);
    let original = bunch.clone();
    calculate_apl_strength(&bunch, APL_START, APL_LENGTH, FOCAL_PLANE, Some(APL_RADIUS), true)
        .unwrap();
    assert_eq!(bunch, original);
}

#[test]
fn test_solve_is_deterministic() {
    let bunch = waist_bunch(2_000, 9);
    let first =
        calculate_apl_strength(&bunch, APL_START, APL_LENGTH, FOCAL_PLANE, None, false).unwrap();
    let second =
        calculate_apl_strength(&bunch, APL_START, APL_LENGTH, FOCAL_PLANE, None, false).unwrap();
    assert_eq!(first.k_opt.to_bits(), second.k_opt.to_bits());
    assert_eq!(first.func_evals, second.func_evals);
}

#[test]
fn test_focal_plane_at_lens_exit() {
    let bunch = waist_bunch(2_000, 13);
    let solution = calculate_apl_strength(
        &bunch,
        APL_START,
        APL_LENGTH,
        APL_START + APL_LENGTH,
        None,
        true,
    )
    .unwrap();
    assert!(solution.k_opt.is_finite());
    assert!(solution.k_opt > 0.0);
    assert!(solution.focused_bunch.is_some());
}

#[test]
fn test_focal_plane_at_lens_exit_with_rounded_positions() {
    // 0.15 - 0.1 - 0.05 rounds to a tiny negative trailing drift.
    let bunch = waist_bunch(2_000, 13);
    let solution = calculate_apl_strength(&bunch, 0.05, 0.1, 0.15, None, true).unwrap();
    assert!(solution.k_opt.is_finite());
    assert!(solution.k_opt > 0.0);

    let focused = solution.focused_bunch.unwrap();
    assert!(approx_eq(focused.prop_distance, 0.15, 1e-12));
}

#[test]
fn test_focal_plane_inside_lens_is_propagation_failure() {
    let bunch = waist_bunch(500, 13);
    let result = calculate_apl_strength(&bunch, APL_START, APL_LENGTH, 0.1, None, false);
    match result {
        Err(AplError::PropagationFailure(msg)) => assert!(msg.contains("Drift")),
        other => panic!("Expected PropagationFailure, got {:?}", other.map(|s| s.k_opt)),
    }
}
