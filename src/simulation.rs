//! A simulation session: the particle state, its integrator and the seeded generator
//! that produced it.
//!
//! This is the surface a renderer drives. Each frame it reads [`Simulation::positions`]
//! (or [`Simulation::positions_f32`] for upload) and calls [`Simulation::step`];
//! [`Simulation::reset`] resamples the initial cluster from the configured seed.
//!
//! # Example
//!
//! ```
//! use rs_nbody::acceleration::BackendKind;
//! use rs_nbody::simulation::Simulation;
//! use rs_nbody::utils::SimulationConfig;
//!
//! let config = SimulationConfig::new(Some(200), Some(1e-3), None, None, Some(BackendKind::NaiveLoop), None);
//! let mut sim = Simulation::new(config).expect("Failed to create simulation");
//! let initial = sim.positions().to_owned();
//!
//! sim.simulate(10).expect("Simulation failed");
//! assert!((sim.time() - 0.01).abs() < 1e-12);
//!
//! sim.reset().expect("Reset failed");
//! assert_eq!(sim.positions(), initial);
//! ```
use log::info;
use ndarray::ArrayView2;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::acceleration::ForceLaw;
use crate::initial_conditions::sample_plummer;
use crate::integrators::LeapFrog;
use crate::particles::ParticleSystem;
use crate::utils::{NBodyError, SimulationConfig};

pub struct Simulation {
    config: SimulationConfig,
    system: ParticleSystem,
    integrator: LeapFrog,
}

impl Simulation {
    /// Validates `config`, creates and warms up its backend, and samples a Plummer
    /// sphere from `config.seed`.
    pub fn new(config: SimulationConfig) -> Result<Self, NBodyError> {
        config.validate()?;
        let backend = config.backend.create()?;
        backend.warm_up()?;

        let system = sample(&config)?;
        let law = ForceLaw::new(config.softening, system.mass().clone());
        let integrator = LeapFrog::new(config.dt, law, backend)?;
        info!(
            "Simulation of {} particles ready (dt = {}, softening = {}, backend = {})",
            config.particle_count, config.dt, config.softening, config.backend
        );
        Ok(Self { config, system, integrator })
    }

    /// Advances the state by one time step.
    pub fn step(&mut self) -> Result<(), NBodyError> {
        self.integrator.step(&mut self.system)
    }

    /// Advances the state by `steps` time steps.
    pub fn simulate(&mut self, steps: usize) -> Result<(), NBodyError> {
        self.integrator.integrate(&mut self.system, steps)
    }

    /// Resamples the initial cluster. The seed is reused, so every reset restores the same
    /// state the session started from.
    pub fn reset(&mut self) -> Result<(), NBodyError> {
        self.system = sample(&self.config)?;
        info!("Simulation reset at seed {}", self.config.seed);
        Ok(())
    }

    pub fn positions(&self) -> ArrayView2<'_, f64> {
        self.system.positions()
    }

    pub fn velocities(&self) -> ArrayView2<'_, f64> {
        self.system.velocities()
    }

    pub fn positions_f32(&self) -> Vec<f32> {
        self.system.positions_f32()
    }

    pub fn time(&self) -> f64 {
        self.system.time()
    }

    /// Total energy under the configured softening.
    pub fn energy(&self) -> f64 {
        self.system.total_energy(self.config.softening)
    }

    pub fn system(&self) -> &ParticleSystem {
        &self.system
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }
}

fn sample(config: &SimulationConfig) -> Result<ParticleSystem, NBodyError> {
    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
    sample_plummer(&mut rng, config.particle_count, config.max_rejection_rounds)
}
