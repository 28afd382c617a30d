use crate::utils::NBodyError;

/// Mass model of a particle system.
#[derive(Debug, Clone, PartialEq)]
pub enum Mass {
    /// Every particle has the same mass; applied once as a scalar after the pairwise sum.
    Uniform(f64),
    /// One mass per particle; weighs each pair term.
    PerParticle(Vec<f64>),
}

impl Mass {
    /// Weight of source particle `j` inside the pairwise sum.
    #[inline]
    pub fn pair_weight(&self, j: usize) -> f64 {
        match self {
            Mass::Uniform(_) => 1.0,
            Mass::PerParticle(masses) => masses[j],
        }
    }

    /// Factor applied to the finished sum.
    #[inline]
    pub fn scale(&self) -> f64 {
        match self {
            Mass::Uniform(m) => *m,
            Mass::PerParticle(_) => 1.0,
        }
    }

    /// Mass of particle `i`.
    pub fn of(&self, i: usize) -> f64 {
        match self {
            Mass::Uniform(m) => *m,
            Mass::PerParticle(masses) => masses[i],
        }
    }

    pub fn total(&self, n: usize) -> f64 {
        match self {
            Mass::Uniform(m) => *m * n as f64,
            Mass::PerParticle(masses) => masses.iter().sum(),
        }
    }

    pub fn validate(&self, n: usize) -> Result<(), NBodyError> {
        match self {
            Mass::PerParticle(masses) if masses.len() != n => Err(NBodyError::ShapeMismatch {
                expected: format!("{} masses", n),
                found: format!("{} masses", masses.len()),
            }),
            _ => Ok(()),
        }
    }
}

/// Softening length and mass model shared by every backend.
#[derive(Debug, Clone, PartialEq)]
pub struct ForceLaw {
    pub softening: f64,
    pub mass: Mass,
}

impl Default for ForceLaw {
    fn default() -> Self {
        Self::unit()
    }
}

impl ForceLaw {
    /// Unit masses, no softening: the law used for validation and benchmarks.
    pub fn unit() -> Self {
        Self { softening: 0.0, mass: Mass::Uniform(1.0) }
    }

    pub fn new(softening: f64, mass: Mass) -> Self {
        Self { softening, mass }
    }

    pub fn validate(&self, n: usize) -> Result<(), NBodyError> {
        if !self.softening.is_finite() || self.softening < 0.0 {
            return Err(NBodyError::InvalidSoftening(self.softening));
        }
        self.mass.validate(n)
    }
}
