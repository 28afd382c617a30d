//! Evolves a Plummer cluster and logs how well leap-frog holds the total energy.
//!
//! ```text
//! RUST_LOG=info cargo run --release --example plummer_cluster -- 2000 1000
//! ```
use std::env;

use log::info;
use rs_nbody::simulation::Simulation;
use rs_nbody::utils::{NBodyError, SimulationConfig};

const REPORT_EVERY: usize = 100;

fn main() -> Result<(), NBodyError> {
    env_logger::init();

    let mut args = env::args().skip(1);
    let particle_count = args.next().and_then(|s| s.parse().ok()).unwrap_or(2_000);
    let steps: usize = args.next().and_then(|s| s.parse().ok()).unwrap_or(1_000);

    let config = SimulationConfig::new(Some(particle_count), None, Some(0.01), None, None, None);
    let mut sim = Simulation::new(config)?;
    let e0 = sim.energy();
    info!("N = {}, E0 = {:.6}", particle_count, e0);

    let mut done = 0;
    while done < steps {
        let chunk = REPORT_EVERY.min(steps - done);
        sim.simulate(chunk)?;
        done += chunk;
        let e = sim.energy();
        info!("t = {:.3}  E = {:.6}  dE/E0 = {:+.3e}", sim.time(), e, (e - e0) / e0);
    }

    let com = sim.system().center_of_mass();
    println!(
        "t = {:.3}: relative energy drift {:.3e}, centre of mass ({:.2e}, {:.2e}, {:.2e})",
        sim.time(),
        ((sim.energy() - e0) / e0).abs(),
        com[0],
        com[1],
        com[2]
    );
    Ok(())
}
