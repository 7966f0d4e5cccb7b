//! Basic example of optimising the focusing strength of an active plasma lens
//! so that a bunch is focused at a particular plane.
//!
//! Run with `RUST_LOG=info cargo run --release --example optimise_apl_focus`.

use apl_focus_rs::bunch_generation::{get_gaussian_bunch_from_twiss, GaussianBunchSpec};
use apl_focus_rs::export::write_bunch_json;
use apl_focus_rs::{
    analyze_bunch, calculate_apl_strength, Beamline, Drift, LinearTracker, PlasmaLens, Propagator,
};
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    // Set up simplistic beam parameters
    let target_energy = 127.0; // beta*gamma
    let norm_emitt = 1e-6;
    let spot_size = 1e-6;

    // And a simple APL
    let r0 = 2e-3; // APL radius, in m
    let z0 = 0.05; // Start position of APL
    let l = 0.1; // APL length
    let zf = 1.0; // Desired focal plane

    // Generate a bunch
    let spec = GaussianBunchSpec {
        s_t: 20.0,
        q_tot: 10.0,
        n_part: 100_000,
        ..GaussianBunchSpec::waist(spot_size, norm_emitt, target_energy)
    };
    let bunch = get_gaussian_bunch_from_twiss(&spec, &mut rand::thread_rng())?;

    // Find the focusing strength required
    let solution = calculate_apl_strength(&bunch, z0, l, zf, Some(r0), true)?;
    println!("{}", solution);

    if let Some(ref focused) = solution.focused_bunch {
        println!("{}", analyze_bunch(focused)?);
    }

    // Propagate the bunch to a plane just before the focus
    let dz = 100e-6;
    let beamline = Beamline::new(vec![
        Drift::new(z0).with_n_out(5).into(),
        PlasmaLens::new(l, solution.k_opt).with_n_out(25).into(),
        Drift::new(zf - l - z0 - dz).with_n_out(5).into(),
    ]);
    let states = LinearTracker::new()
        .with_out_initial(true)
        .propagate(&beamline, bunch)?;
    let before_focus = states.last().ok_or("tracking returned no states")?;

    println!("{} microns before focus:", dz * 1e6);
    println!("{}", analyze_bunch(before_focus)?);

    let path = write_bunch_json(before_focus, ".", "bunch_test")?;
    println!("Saved bunch to {}", path.display());

    Ok(())
}
