use log::debug;
use rand::Rng;

use crate::utils::NBodyError;

/// One accepted candidate: the sample `q` and the uniform height `y` it was tested with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Draw {
    pub q: f64,
    pub y: f64,
}

/// Rejection sampler for a density on `[0, 1)` bounded above by `upper`.
///
/// Every round draws as many candidates as were requested in total; a candidate
/// `(q, y)` with `q ~ U[0, 1)` and `y ~ U[0, upper)` is kept iff `y < pdf(q)`. The loop
/// stops once enough candidates are kept, or fails after `max_rounds` rounds.
pub struct RejectionSampler<F>
where
    F: Fn(f64) -> f64,
{
    pdf: F,
    upper: f64,
    max_rounds: usize,
}

impl<F> RejectionSampler<F>
where
    F: Fn(f64) -> f64,
{
    /// # Errors
    ///
    /// `CalculationError` if `upper` is not a positive finite number.
    pub fn new(pdf: F, upper: f64, max_rounds: usize) -> Result<Self, NBodyError> {
        if !upper.is_finite() || upper <= 0.0 {
            return Err(NBodyError::CalculationError(format!(
                "rejection envelope must be positive and finite, got {}",
                upper
            )));
        }
        Ok(Self { pdf, upper, max_rounds })
    }

    pub fn upper(&self) -> f64 {
        self.upper
    }

    /// Draws exactly `n` accepted samples.
    ///
    /// # Errors
    ///
    /// `SamplingExhausted` if fewer than `n` candidates were accepted after `max_rounds`
    /// rounds.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R, n: usize) -> Result<Vec<Draw>, NBodyError> {
        let mut accepted = Vec::with_capacity(n);
        let mut rounds = 0;
        while accepted.len() < n {
            if rounds == self.max_rounds {
                return Err(NBodyError::SamplingExhausted {
                    accepted: accepted.len(),
                    requested: n,
                    rounds,
                });
            }
            rounds += 1;
            for _ in 0..n {
                let q = rng.random::<f64>();
                let y = rng.random::<f64>() * self.upper;
                if y < (self.pdf)(q) {
                    accepted.push(Draw { q, y });
                }
            }
        }
        accepted.truncate(n);
        debug!("Rejection sampling accepted {} samples in {} rounds", n, rounds);
        Ok(accepted)
    }
}
