//! Thin-lens comparisons of the focusing solver.

use approx::assert_relative_eq;
use apl_focus_rs::{
    analyze_bunch, Beamline, Drift, FocusConfig, FocusStrengthSolver, LinearTracker, PlasmaLens,
    Propagator, ScalarMethod,
};

use crate::test_helpers::{thin_lens_optimum, waist_bunch};

const DRIFT1: f64 = 0.05;
const THIN_LENS: f64 = 1e-4;
const FOCAL_PLANE: f64 = 1.0;

fn drift2() -> f64 {
    FOCAL_PLANE - DRIFT1 - THIN_LENS
}

#[test]
fn test_thin_lens_strength_matches_analytic_value() {
    let bunch = waist_bunch(20_000, 42);
    let expected = thin_lens_optimum(
        &bunch,
        DRIFT1 + 0.5 * THIN_LENS,
        drift2() + 0.5 * THIN_LENS,
        THIN_LENS,
    );
    assert!(expected > 0.0 && expected < 1e5);

    let solution = FocusStrengthSolver::linear()
        .solve(&bunch, DRIFT1, THIN_LENS, drift2(), None, false)
        .unwrap();

    assert_relative_eq!(solution.k_opt, expected, max_relative = 0.01);
}

#[test]
fn test_bounded_and_bracketing_methods_agree() {
    let bunch = waist_bunch(5_000, 3);

    let brent = FocusStrengthSolver::linear()
        .solve(&bunch, DRIFT1, THIN_LENS, drift2(), None, false)
        .unwrap();
    let bounded = FocusStrengthSolver::with_config(
        LinearTracker::new(),
        FocusConfig::default().with_method(ScalarMethod::Bounded),
    )
    .solve(&bunch, DRIFT1, THIN_LENS, drift2(), None, false)
    .unwrap();

    assert_relative_eq!(brent.k_opt, bounded.k_opt, max_relative = 0.01);
}

#[test]
fn test_optimum_is_a_local_minimum() {
    let bunch = waist_bunch(5_000, 11);
    let solver = FocusStrengthSolver::linear();
    let solution = solver
        .solve(&bunch, DRIFT1, 0.1, FOCAL_PLANE - DRIFT1 - 0.1, None, false)
        .unwrap();
    let k = solution.k_opt;

    let sigma_at = |k: f64| {
        let beamline = Beamline::new(vec![
            Drift::new(DRIFT1).into(),
            PlasmaLens::new(0.1, k).into(),
            Drift::new(FOCAL_PLANE - DRIFT1 - 0.1).into(),
        ]);
        let states = LinearTracker::new().propagate(&beamline, bunch.clone()).unwrap();
        analyze_bunch(states.last().unwrap()).unwrap().sigma_x
    };

    assert_relative_eq!(sigma_at(k), solution.objective_value, max_relative = 1e-12);
    assert!(sigma_at(k * 0.99) > solution.objective_value);
    assert!(sigma_at(k * 1.01) > solution.objective_value);
}

#[test]
fn test_bounded_method_on_thick_lens_with_narrowed_domain() {
    let bunch = waist_bunch(5_000, 7);
    let drift2 = FOCAL_PLANE - DRIFT1 - 0.1;

    let brent = FocusStrengthSolver::linear()
        .solve(&bunch, DRIFT1, 0.1, drift2, None, false)
        .unwrap();
    let bounded = FocusStrengthSolver::with_config(
        LinearTracker::new(),
        FocusConfig::default()
            .with_method(ScalarMethod::Bounded)
            .with_bounds(0.0, 100.0),
    )
    .solve(&bunch, DRIFT1, 0.1, drift2, None, false)
    .unwrap();

    assert!(brent.k_opt > 0.0 && brent.k_opt < 100.0);
    assert_relative_eq!(brent.k_opt, bounded.k_opt, max_relative = 0.01);
    assert_relative_eq!(
        brent.objective_value,
        bounded.objective_value,
        max_relative = 0.01
    );
}
