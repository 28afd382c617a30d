//! Drift-kick-drift leap-frog.
//!
//! Each step costs one force evaluation and is symplectic and time reversible: stepping
//! with `-h` after `h` retraces the trajectory up to rounding.
//!
//! # Example
//!
//! ```
//! use ndarray::array;
//! use rs_nbody::acceleration::{ForceLaw, Mass, NaiveLoop};
//! use rs_nbody::integrators::LeapFrog;
//! use rs_nbody::particles::ParticleSystem;
//!
//! // Two unit masses on a circular orbit of period 4π.
//! let mut system = ParticleSystem::new(
//!     array![[-1.0, 0.0, 0.0], [1.0, 0.0, 0.0]],
//!     array![[0.0, -0.5, 0.0], [0.0, 0.5, 0.0]],
//!     Mass::Uniform(1.0),
//! ).expect("Failed to create system");
//!
//! let leapfrog = LeapFrog::new(1e-3, ForceLaw::unit(), Box::new(NaiveLoop)).expect("valid dt");
//! leapfrog.integrate_until(&mut system, 2.0 * std::f64::consts::PI).expect("integration failed");
//!
//! // Half an orbit later the pair has swapped sides.
//! assert!((system.positions()[[0, 0]] - 1.0).abs() < 1e-4);
//! ```
use log::debug;

use crate::acceleration::{AccelerationBackend, ForceLaw};
use crate::particles::ParticleSystem;
use crate::utils::NBodyError;

pub struct LeapFrog {
    dt: f64,
    force_law: ForceLaw,
    backend: Box<dyn AccelerationBackend>,
}

impl LeapFrog {
    /// # Errors
    ///
    /// `InvalidTimeStep` for a zero or non-finite `dt`; `InvalidSoftening` for a bad
    /// softening length.
    pub fn new(dt: f64, force_law: ForceLaw, backend: Box<dyn AccelerationBackend>) -> Result<Self, NBodyError> {
        check_step(dt)?;
        if !force_law.softening.is_finite() || force_law.softening < 0.0 {
            return Err(NBodyError::InvalidSoftening(force_law.softening));
        }
        Ok(Self { dt, force_law, backend })
    }

    pub fn dt(&self) -> f64 {
        self.dt
    }

    pub fn force_law(&self) -> &ForceLaw {
        &self.force_law
    }

    pub fn backend(&self) -> &dyn AccelerationBackend {
        self.backend.as_ref()
    }

    /// `positions += velocities · h`
    pub fn drift(&self, system: &mut ParticleSystem, h: f64) {
        system.positions.scaled_add(h, &system.velocities);
    }

    /// `velocities += a(positions) · h`
    pub fn kick(&self, system: &mut ParticleSystem, h: f64) -> Result<(), NBodyError> {
        let acceleration = self.backend.acceleration(system.positions.view(), &self.force_law)?;
        system.velocities.scaled_add(h, &acceleration);
        Ok(())
    }

    /// One step of the configured size.
    pub fn step(&self, system: &mut ParticleSystem) -> Result<(), NBodyError> {
        self.step_by(system, self.dt)
    }

    /// One drift-kick-drift cycle of size `h`, which may be negative.
    pub fn step_by(&self, system: &mut ParticleSystem, h: f64) -> Result<(), NBodyError> {
        check_step(h)?;
        self.drift(system, 0.5 * h);
        self.kick(system, h)?;
        self.drift(system, 0.5 * h);
        system.time += h;
        Ok(())
    }

    /// Runs `steps` whole steps.
    pub fn integrate(&self, system: &mut ParticleSystem, steps: usize) -> Result<(), NBodyError> {
        for _ in 0..steps {
            self.step(system)?;
        }
        Ok(())
    }

    /// Advances the system by exactly `duration`: whole steps while they fit, then one
    /// shorter step for the remainder. Returns the number of force evaluations.
    ///
    /// # Errors
    ///
    /// `CalculationError` if `duration` is not finite or runs against the sign of `dt`.
    pub fn integrate_until(&self, system: &mut ParticleSystem, duration: f64) -> Result<usize, NBodyError> {
        if !duration.is_finite() || duration * self.dt < 0.0 {
            return Err(NBodyError::CalculationError(format!(
                "cannot integrate over {} with time step {}",
                duration, self.dt
            )));
        }
        let whole = (duration / self.dt).floor() as usize;
        self.integrate(system, whole)?;

        let remainder = duration - whole as f64 * self.dt;
        let mut evaluations = whole;
        if remainder.abs() > f64::EPSILON * duration.abs() {
            self.step_by(system, remainder)?;
            evaluations += 1;
        }
        debug!(
            "Integrated {} with {} force evaluations ({})",
            duration,
            evaluations,
            self.backend.name()
        );
        Ok(evaluations)
    }
}

fn check_step(h: f64) -> Result<(), NBodyError> {
    if !h.is_finite() || h == 0.0 {
        return Err(NBodyError::InvalidTimeStep(h));
    }
    Ok(())
}
