//! State of an N-body system: positions, velocities, masses and the elapsed time.
//!
//! The arrays are structure-of-arrays (N, 3) `ndarray` matrices. The particle count is
//! fixed at construction; every setter checks the shape again so that positions and
//! velocities always describe the same N particles.
//!
//! # Example
//!
//! ```
//! use ndarray::array;
//! use rs_nbody::acceleration::Mass;
//! use rs_nbody::particles::ParticleSystem;
//!
//! let system = ParticleSystem::new(
//!     array![[-1.0, 0.0, 0.0], [1.0, 0.0, 0.0]],
//!     array![[0.0, -0.5, 0.0], [0.0, 0.5, 0.0]],
//!     Mass::Uniform(1.0),
//! ).expect("Failed to create system");
//!
//! assert_eq!(system.len(), 2);
//! // Two unit masses at distance 2: W = -1/2, K = 2 · ½ · 0.25.
//! assert!((system.potential_energy(0.0) + 0.5).abs() < 1e-12);
//! assert!((system.kinetic_energy() - 0.25).abs() < 1e-12);
//! ```
use ndarray::{Array1, Array2, ArrayView2};

use crate::acceleration::Mass;
use crate::utils::{axis_means, norm3, row_difference, NBodyError};

#[derive(Debug, Clone, PartialEq)]
pub struct ParticleSystem {
    pub(crate) positions: Array2<f64>,
    pub(crate) velocities: Array2<f64>,
    mass: Mass,
    pub(crate) time: f64,
}

impl ParticleSystem {
    /// Creates a system at `time = 0`.
    ///
    /// # Errors
    ///
    /// `ShapeMismatch` if either array is not (N, 3), if the two row counts differ, or if a
    /// per-particle mass vector does not have N entries.
    pub fn new(positions: Array2<f64>, velocities: Array2<f64>, mass: Mass) -> Result<Self, NBodyError> {
        check_columns(&positions.view(), "positions")?;
        check_columns(&velocities.view(), "velocities")?;
        check_rows(positions.nrows(), &velocities.view())?;
        mass.validate(positions.nrows())?;
        Ok(Self { positions, velocities, mass, time: 0.0 })
    }

    pub fn len(&self) -> usize {
        self.positions.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn positions(&self) -> ArrayView2<'_, f64> {
        self.positions.view()
    }

    pub fn velocities(&self) -> ArrayView2<'_, f64> {
        self.velocities.view()
    }

    pub fn mass(&self) -> &Mass {
        &self.mass
    }

    /// Simulated time elapsed since the system was sampled.
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Replaces the positions, keeping N fixed.
    pub fn set_positions(&mut self, positions: Array2<f64>) -> Result<(), NBodyError> {
        check_columns(&positions.view(), "positions")?;
        check_rows(self.len(), &positions.view())?;
        self.positions = positions;
        Ok(())
    }

    /// Replaces the velocities, keeping N fixed.
    pub fn set_velocities(&mut self, velocities: Array2<f64>) -> Result<(), NBodyError> {
        check_columns(&velocities.view(), "velocities")?;
        check_rows(self.len(), &velocities.view())?;
        self.velocities = velocities;
        Ok(())
    }

    /// `K = ½ Σ m_i |v_i|²`
    pub fn kinetic_energy(&self) -> f64 {
        self.velocities
            .rows()
            .into_iter()
            .enumerate()
            .map(|(i, v)| 0.5 * self.mass.of(i) * v.dot(&v))
            .sum()
    }

    /// Potential energy of the softened force law.
    ///
    /// The pair force `m_i m_j r / (r + ε)³` derives from `−m_i m_j (r + ε/2) / (r + ε)²`,
    /// which is `−m_i m_j / r` when unsoftened. Coincident unsoftened pairs contribute
    /// nothing, as in the force kernels.
    pub fn potential_energy(&self, softening: f64) -> f64 {
        let positions = self.positions.view();
        let n = self.len();
        let mut energy = 0.0;
        for i in 0..n {
            let mut row = 0.0;
            for j in (i + 1)..n {
                let r = norm3(row_difference(&positions, i, j));
                let d = r + softening;
                if d > 0.0 {
                    row += self.mass.of(j) * (r + 0.5 * softening) / (d * d);
                }
            }
            energy -= self.mass.of(i) * row;
        }
        energy
    }

    pub fn total_energy(&self, softening: f64) -> f64 {
        self.kinetic_energy() + self.potential_energy(softening)
    }

    /// Mass-weighted mean position.
    pub fn center_of_mass(&self) -> Array1<f64> {
        self.weighted_mean(&self.positions)
    }

    /// Mass-weighted mean velocity (total momentum over total mass).
    pub fn mean_velocity(&self) -> Array1<f64> {
        self.weighted_mean(&self.velocities)
    }

    /// Positions narrowed to f32 and flattened row by row, for upload to a renderer.
    pub fn positions_f32(&self) -> Vec<f32> {
        self.positions.iter().map(|&x| x as f32).collect()
    }

    fn weighted_mean(&self, values: &Array2<f64>) -> Array1<f64> {
        match &self.mass {
            Mass::Uniform(_) => axis_means(&values.view()),
            Mass::PerParticle(masses) => {
                let total: f64 = masses.iter().sum();
                if total == 0.0 {
                    return Array1::zeros(3);
                }
                let weights = Array1::from(masses.clone());
                weights.dot(values) / total
            }
        }
    }
}

fn check_columns(values: &ArrayView2<f64>, what: &str) -> Result<(), NBodyError> {
    if values.ncols() != 3 {
        return Err(NBodyError::ShapeMismatch {
            expected: format!("{} of shape (N, 3)", what),
            found: format!("{:?}", values.shape()),
        });
    }
    Ok(())
}

fn check_rows(n: usize, values: &ArrayView2<f64>) -> Result<(), NBodyError> {
    if values.nrows() != n {
        return Err(NBodyError::ShapeMismatch {
            expected: format!("({}, 3)", n),
            found: format!("{:?}", values.shape()),
        });
    }
    Ok(())
}
