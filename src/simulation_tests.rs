use crate::acceleration::BackendKind;
use crate::simulation::Simulation;
use crate::utils::{NBodyError, SimulationConfig};

fn small_config() -> SimulationConfig {
    SimulationConfig::new(Some(100), Some(1e-3), Some(0.05), Some(12), Some(BackendKind::NaiveLoop), None)
}

#[test]
fn test_new_simulation() {
    let sim = Simulation::new(small_config()).expect("Failed to create simulation");
    assert_eq!(sim.positions().dim(), (100, 3));
    assert_eq!(sim.velocities().dim(), (100, 3));
    assert_eq!(sim.positions_f32().len(), 300);
    assert_eq!(sim.time(), 0.0);
    assert_eq!(sim.config().particle_count, 100);
}

#[test]
fn test_step_updates_state() {
    let mut sim = Simulation::new(small_config()).expect("Failed to create simulation");
    let initial_positions = sim.positions().to_owned();
    let initial_velocities = sim.velocities().to_owned();

    sim.step().expect("Step failed");
    assert!(sim.positions() != initial_positions);
    assert!(sim.velocities() != initial_velocities);
    assert!((sim.time() - 1e-3).abs() < 1e-15);
}

#[test]
fn test_simulate_conserves_energy() {
    let mut sim = Simulation::new(small_config()).expect("Failed to create simulation");
    let e0 = sim.energy();
    sim.simulate(200).expect("Simulation failed");
    let drift = ((sim.energy() - e0) / e0).abs();
    assert!(drift < 1e-3, "relative energy drift {:e}", drift);
}

#[test]
fn test_reset_restores_initial_state() {
    let mut sim = Simulation::new(small_config()).expect("Failed to create simulation");
    let initial = sim.system().clone();

    sim.simulate(20).expect("Simulation failed");
    sim.reset().expect("Reset failed");
    assert_eq!(sim.system(), &initial);

    // Resetting twice changes nothing.
    sim.reset().expect("Reset failed");
    assert_eq!(sim.system(), &initial);
}

#[test]
fn test_same_seed_same_session() {
    let a = Simulation::new(small_config()).expect("Failed to create simulation");
    let b = Simulation::new(small_config()).expect("Failed to create simulation");
    assert_eq!(a.system(), b.system());

    let mut other = small_config();
    other.seed = 13;
    let c = Simulation::new(other).expect("Failed to create simulation");
    assert_ne!(a.system(), c.system());
}

#[test]
fn test_invalid_config_is_rejected() {
    let mut config = small_config();
    config.particle_count = 0;
    assert!(matches!(Simulation::new(config), Err(NBodyError::InvalidParticleCount(0))));

    let mut config = small_config();
    config.dt = 0.0;
    assert!(matches!(Simulation::new(config), Err(NBodyError::InvalidTimeStep(_))));

    let mut config = small_config();
    config.softening = -1.0;
    assert!(matches!(Simulation::new(config), Err(NBodyError::InvalidSoftening(_))));
}

#[test]
fn test_default_config() {
    let config = SimulationConfig::default();
    assert_eq!(config.particle_count, 20_000);
    assert_eq!(config.backend, BackendKind::ParallelJit);
    assert!(config.validate().is_ok());
}
