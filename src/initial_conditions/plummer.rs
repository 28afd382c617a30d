//! Plummer-sphere initial conditions in N-body units (G = M = 1, a = 1).
//!
//! # Example
//!
//! ```
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha8Rng;
//! use rs_nbody::initial_conditions::sample_plummer;
//!
//! let mut rng = ChaCha8Rng::seed_from_u64(7897);
//! let system = sample_plummer(&mut rng, 500, 1_000).expect("Failed to sample");
//!
//! assert_eq!(system.len(), 500);
//! assert!(system.center_of_mass().iter().all(|c| c.abs() < 1e-9));
//! ```
use std::f64::consts::PI;

use ndarray::Array2;
use rand::Rng;

use super::RejectionSampler;
use crate::acceleration::Mass;
use crate::particles::ParticleSystem;
use crate::utils::{norm3, subtract_axis_means, NBodyError};

/// Normalisation of the speed-ratio density so that it integrates to one on (0, 1).
const PQ_NORMALISATION: f64 = 512.0 / (7.0 * PI);

/// Inverts the cumulative mass `M(r) = r³ / (1 + r²)^{3/2}` at `u ∈ [0, 1)`.
pub fn plummer_radius(u: f64) -> f64 {
    u.cbrt() / (1.0 - u.powf(2.0 / 3.0)).sqrt()
}

/// Fraction of the total mass inside radius `r`.
pub fn plummer_cumulative_mass(r: f64) -> f64 {
    let r2 = r * r;
    r2 * r / (1.0 + r2).powf(1.5)
}

/// `v_esc(r) = sqrt(2 / sqrt(1 + r²))`
pub fn escape_velocity(r: f64) -> f64 {
    (2.0 / (1.0 + r * r).sqrt()).sqrt()
}

/// Density of `q = v / v_esc`: `p(q) ∝ q² (1 − q²)^{7/2}` on (0, 1), zero elsewhere.
pub fn pq(q: f64) -> f64 {
    if q <= 0.0 || q >= 1.0 {
        return 0.0;
    }
    PQ_NORMALISATION * q * q * (1.0 - q * q).powf(3.5)
}

/// Maximum of [`pq`], reached at `q = sqrt(2/9)`.
pub fn pq_max() -> f64 {
    pq((2.0_f64 / 9.0).sqrt())
}

/// Draws `n` radii by inversion sampling.
pub fn sample_radii<R: Rng + ?Sized>(rng: &mut R, n: usize) -> Vec<f64> {
    (0..n).map(|_| plummer_radius(rng.random::<f64>())).collect()
}

/// Isotropic directions scaled to the given moduli, one row per modulus.
pub fn isotropic_vectors<R: Rng + ?Sized>(rng: &mut R, moduli: &[f64]) -> Array2<f64> {
    let mut vectors = Array2::zeros((moduli.len(), 3));
    for (mut row, &modulus) in vectors.rows_mut().into_iter().zip(moduli) {
        let phi = 2.0 * PI * rng.random::<f64>();
        let theta = (2.0 * rng.random::<f64>() - 1.0).acos();
        row[0] = modulus * phi.cos() * theta.sin();
        row[1] = modulus * phi.sin() * theta.sin();
        row[2] = modulus * theta.cos();
    }
    vectors
}

/// Samples speed ratios `q` from [`pq`] by rejection.
pub fn sample_speed_ratios<R: Rng + ?Sized>(rng: &mut R, n: usize, max_rounds: usize) -> Result<Vec<f64>, NBodyError> {
    let sampler = RejectionSampler::new(pq, pq_max(), max_rounds)?;
    Ok(sampler.sample(rng, n)?.into_iter().map(|draw| draw.q).collect())
}

/// Samples an equilibrium Plummer sphere of `n` equal-mass particles.
///
/// Positions and velocities both come from `rng`, so the same seed reproduces the whole
/// state. The returned system is in its centre-of-mass frame and has `Mass::Uniform(1/n)`.
///
/// # Errors
///
/// `InvalidParticleCount` for `n == 0`; `SamplingExhausted` if the speed sampler runs
/// out of rounds.
pub fn sample_plummer<R: Rng + ?Sized>(rng: &mut R, n: usize, max_rounds: usize) -> Result<ParticleSystem, NBodyError> {
    if n == 0 {
        return Err(NBodyError::InvalidParticleCount(n));
    }

    let radii = sample_radii(rng, n);
    let mut positions = isotropic_vectors(rng, &radii);
    subtract_axis_means(&mut positions);

    let speeds: Vec<f64> = sample_speed_ratios(rng, n, max_rounds)?
        .into_iter()
        .zip(positions.rows())
        .map(|(q, r)| q * escape_velocity(norm3([r[0], r[1], r[2]])))
        .collect();
    let mut velocities = isotropic_vectors(rng, &speeds);
    subtract_axis_means(&mut velocities);

    ParticleSystem::new(positions, velocities, Mass::Uniform(1.0 / n as f64))
}

/// `n` positions drawn uniformly from the unit cube `[0, 1)³`.
pub fn uniform_cube<R: Rng + ?Sized>(rng: &mut R, n: usize) -> Array2<f64> {
    Array2::from_shape_simple_fn((n, 3), || rng.random::<f64>())
}
