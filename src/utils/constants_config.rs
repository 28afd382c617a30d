// src/utils/constants_config.rs
use crate::acceleration::BackendKind;
use crate::utils::{
    DEFAULT_SIMULATION_CONFIG,
    errors::NBodyError
};

/// Runtime parameters of a simulation session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationConfig {
    pub particle_count: usize,
    pub dt: f64,
    pub softening: f64,
    pub seed: u64,
    pub backend: BackendKind,
    pub max_rejection_rounds: usize,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        DEFAULT_SIMULATION_CONFIG
    }
}

impl SimulationConfig {
    pub fn new(
        particle_count: Option<usize>,
        dt: Option<f64>,
        softening: Option<f64>,
        seed: Option<u64>,
        backend: Option<BackendKind>,
        max_rejection_rounds: Option<usize>,
    ) -> Self {
        let default = DEFAULT_SIMULATION_CONFIG;
        Self {
            particle_count: particle_count.unwrap_or(default.particle_count),
            dt: dt.unwrap_or(default.dt),
            softening: softening.unwrap_or(default.softening),
            seed: seed.unwrap_or(default.seed),
            backend: backend.unwrap_or(default.backend),
            max_rejection_rounds: max_rejection_rounds.unwrap_or(default.max_rejection_rounds),
        }
    }

    /// Checks every field, returning the first offending one.
    pub fn validate(&self) -> Result<(), NBodyError> {
        if self.particle_count == 0 { return Err(NBodyError::InvalidParticleCount(self.particle_count)); }
        if !self.dt.is_finite() || self.dt == 0.0 { return Err(NBodyError::InvalidTimeStep(self.dt)); }
        if !self.softening.is_finite() || self.softening < 0.0 { return Err(NBodyError::InvalidSoftening(self.softening)); }
        if self.max_rejection_rounds == 0 {
            return Err(NBodyError::CalculationError("max_rejection_rounds must be positive".to_string()));
        }
        Ok(())
    }
}
