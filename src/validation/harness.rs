use std::time::{Duration, Instant};

use log::{debug, error, info, warn};
use ndarray::ArrayView2;
use rand::Rng;

use crate::acceleration::{AccelerationBackend, BackendKind, Broadcast, ForceLaw};
use crate::initial_conditions::uniform_cube;
use crate::utils::{allclose, median, NBodyError, DEFAULT_ATOL, DEFAULT_RTOL};

/// Tolerance band `|a − b| <= atol + rtol · |b|`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerance {
    pub rtol: f64,
    pub atol: f64,
}

impl Default for Tolerance {
    fn default() -> Self {
        Self { rtol: DEFAULT_RTOL, atol: DEFAULT_ATOL }
    }
}

/// A backend that agreed with the reference, and by how much it deviated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Agreement {
    pub backend: &'static str,
    pub max_abs_delta: f64,
}

/// Timings of one backend at one particle count.
#[derive(Debug, Clone, PartialEq)]
pub struct BenchmarkReport {
    pub backend: &'static str,
    pub particles: usize,
    pub durations: Vec<Duration>,
    pub median: Duration,
}

/// Runs `candidate` and `reference` on the same input and checks they agree.
///
/// # Errors
///
/// `BackendMismatch` naming the element furthest outside the band, or any error either
/// backend returns.
pub fn compare(
    candidate: &dyn AccelerationBackend,
    reference: &dyn AccelerationBackend,
    positions: ArrayView2<f64>,
    law: &ForceLaw,
    tolerance: Tolerance,
) -> Result<Agreement, NBodyError> {
    let actual = candidate.acceleration(positions, law)?;
    let expected = reference.acceleration(positions, law)?;

    let report = allclose(&actual.view(), &expected.view(), tolerance.rtol, tolerance.atol);
    match report.worst {
        None => Ok(Agreement {
            backend: candidate.name(),
            max_abs_delta: report.max_abs_delta,
        }),
        Some((index, axis, actual, expected)) => {
            error!(
                "{} disagrees with {}: particle {} axis {}: {} vs {}",
                candidate.name(),
                reference.name(),
                index,
                axis,
                actual,
                expected
            );
            Err(NBodyError::BackendMismatch {
                backend: candidate.name(),
                index,
                axis,
                actual,
                expected,
                max_abs_delta: report.max_abs_delta,
            })
        }
    }
}

/// Checks every registered backend against the broadcast reference.
///
/// Backends that cannot run on this machine are skipped with a warning; the first
/// disagreement or evaluation error is returned.
pub fn validate_all(positions: ArrayView2<f64>, law: &ForceLaw, tolerance: Tolerance) -> Result<Vec<Agreement>, NBodyError> {
    let reference = Broadcast;
    let mut agreements = Vec::with_capacity(BackendKind::ALL.len());
    for kind in BackendKind::ALL {
        let backend = match kind.create() {
            Ok(backend) => backend,
            Err(NBodyError::BackendUnavailable { backend, reason }) => {
                warn!("Skipping {}: {}", backend, reason);
                continue;
            }
            Err(e) => return Err(e),
        };
        let agreement = compare(backend.as_ref(), &reference, positions, law, tolerance)?;
        info!("{} agrees with the reference (max abs delta {:e})", agreement.backend, agreement.max_abs_delta);
        agreements.push(agreement);
    }
    Ok(agreements)
}

/// Creates the backend named by `kind` and times it; see [`benchmark_backend`].
pub fn benchmark<R: Rng + ?Sized>(
    kind: BackendKind,
    n: usize,
    repetitions: usize,
    rng: &mut R,
) -> Result<BenchmarkReport, NBodyError> {
    let backend = kind.create()?;
    benchmark_backend(backend.as_ref(), n, repetitions, rng)
}

/// Warms the backend up, then times `repetitions` evaluations of the unit law, each on
/// fresh uniform positions in the unit cube. The timed region ends when the result is
/// back in host memory.
///
/// # Errors
///
/// `InvalidParticleCount` for `n == 0`, `CalculationError` for zero repetitions, or any
/// error the backend returns.
pub fn benchmark_backend<R: Rng + ?Sized>(
    backend: &dyn AccelerationBackend,
    n: usize,
    repetitions: usize,
    rng: &mut R,
) -> Result<BenchmarkReport, NBodyError> {
    if n == 0 {
        return Err(NBodyError::InvalidParticleCount(n));
    }
    if repetitions == 0 {
        return Err(NBodyError::CalculationError("at least one repetition is required".to_string()));
    }
    backend.warm_up()?;

    let law = ForceLaw::unit();
    let mut durations = Vec::with_capacity(repetitions);
    for run in 0..repetitions {
        let positions = uniform_cube(rng, n);
        let start = Instant::now();
        backend.acceleration(positions.view(), &law)?;
        let elapsed = start.elapsed();
        debug!("{} run {} with N = {}: {:?}", backend.name(), run, n, elapsed);
        durations.push(elapsed);
    }

    let seconds: Vec<f64> = durations.iter().map(Duration::as_secs_f64).collect();
    let median = median(&seconds)
        .map(Duration::from_secs_f64)
        .ok_or_else(|| NBodyError::CalculationError("no timings recorded".to_string()))?;
    Ok(BenchmarkReport { backend: backend.name(), particles: n, durations, median })
}
