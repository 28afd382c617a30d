//! Interchangeable strategies for the all-pairs gravitational acceleration.
//!
//! Every backend implements [`AccelerationBackend`] and evaluates
//!
//! ```text
//! a_i = Σ_{j≠i} m_j (r_j − r_i) / (|r_j − r_i| + ε)³
//! ```
//!
//! for an (N, 3) position array. They differ only in how the O(N²) work is laid out:
//!
//! | [`BackendKind`] | strategy | precision |
//! |---|---|---|
//! | `naive-loop` | serial double loop, self term skipped | f64 |
//! | `vectorized-broadcast` | full (N, N, 3) difference tensor, zero distances set to ∞ | f64 |
//! | `parallel-jit` | rayon over the outer index, one output row per task | f64 |
//! | `autodiff-vectorized-map` | per-index kernel mapped over particles, NaN-aware sum | f32 |
//! | `gpu-kernel` | WGSL compute shader, one invocation per particle | f32 |
//!
//! # Example
//!
//! ```
//! use ndarray::array;
//! use rs_nbody::acceleration::{AccelerationBackend, BackendKind, ForceLaw};
//!
//! let positions = array![[-1.0, 0.0, 0.0], [1.0, 0.0, 0.0]];
//! let backend = BackendKind::NaiveLoop.create().expect("naive loop is always available");
//! let acc = backend.acceleration(positions.view(), &ForceLaw::unit()).expect("valid input");
//!
//! // Unit masses two units apart pull on each other with 1/4.
//! assert!((acc[[0, 0]] - 0.25).abs() < 1e-12);
//! assert!((acc[[1, 0]] + 0.25).abs() < 1e-12);
//! ```
use std::fmt;
use std::str::FromStr;

use log::info;
use ndarray::{Array2, ArrayView2};

use crate::utils::{norm3, row_difference, NBodyError, WARM_UP_PARTICLES};

mod force_law;
mod naive;
mod broadcast;
#[cfg(feature = "parallel")]
mod parallel;
mod vectorized_map;
#[cfg(feature = "gpu")]
mod gpu;

pub use force_law::*;
pub use naive::*;
pub use broadcast::*;
#[cfg(feature = "parallel")]
pub use parallel::*;
pub use vectorized_map::*;
#[cfg(feature = "gpu")]
pub use gpu::*;

#[cfg(test)]
mod acceleration_tests;

/// A strategy for evaluating the acceleration field of a particle configuration.
///
/// Implementations are pure: the output depends only on `positions` and `law`, and the
/// only side effect is allocating the returned array.
pub trait AccelerationBackend: Send + Sync {
    /// The registry entry this backend was created from.
    fn kind(&self) -> BackendKind;

    /// Accelerations of shape (N, 3) for positions of shape (N, 3).
    ///
    /// # Errors
    ///
    /// `ShapeMismatch` if `positions` is not (N, 3) or a per-particle mass vector has the
    /// wrong length; `InvalidSoftening` for a negative softening length.
    fn acceleration(&self, positions: ArrayView2<f64>, law: &ForceLaw) -> Result<Array2<f64>, NBodyError>;

    /// Pays any first-call cost (thread-pool start-up, shader compilation) up front.
    fn warm_up(&self) -> Result<(), NBodyError> {
        Ok(())
    }

    fn name(&self) -> &'static str {
        self.kind().name()
    }
}

/// The closed set of registered backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendKind {
    NaiveLoop,
    Broadcast,
    ParallelJit,
    VectorizedMap,
    GpuKernel,
}

impl BackendKind {
    pub const ALL: [BackendKind; 5] = [
        BackendKind::NaiveLoop,
        BackendKind::Broadcast,
        BackendKind::ParallelJit,
        BackendKind::VectorizedMap,
        BackendKind::GpuKernel,
    ];

    /// Registry key, as accepted by [`FromStr`].
    pub fn name(self) -> &'static str {
        match self {
            BackendKind::NaiveLoop => "naive-loop",
            BackendKind::Broadcast => "vectorized-broadcast",
            BackendKind::ParallelJit => "parallel-jit",
            BackendKind::VectorizedMap => "autodiff-vectorized-map",
            BackendKind::GpuKernel => "gpu-kernel",
        }
    }

    pub fn registered_names() -> Vec<&'static str> {
        Self::ALL.iter().map(|kind| kind.name()).collect()
    }

    /// Instantiates the backend.
    ///
    /// # Errors
    ///
    /// `BackendUnavailable` when the backend's cargo feature is disabled or, for the GPU
    /// kernel, when no adapter or device can be acquired.
    pub fn create(self) -> Result<Box<dyn AccelerationBackend>, NBodyError> {
        let backend: Box<dyn AccelerationBackend> = match self {
            BackendKind::NaiveLoop => Box::new(NaiveLoop),
            BackendKind::Broadcast => Box::new(Broadcast),
            BackendKind::VectorizedMap => Box::new(VectorizedMap),
            #[cfg(feature = "parallel")]
            BackendKind::ParallelJit => Box::new(ParallelJit::new()),
            #[cfg(not(feature = "parallel"))]
            BackendKind::ParallelJit => return Err(self.disabled("parallel")),
            #[cfg(feature = "gpu")]
            BackendKind::GpuKernel => Box::new(GpuKernel::new()?),
            #[cfg(not(feature = "gpu"))]
            BackendKind::GpuKernel => return Err(self.disabled("gpu")),
        };
        info!("Created acceleration backend {}", self);
        Ok(backend)
    }

    #[allow(dead_code)]
    fn disabled(self, feature: &str) -> NBodyError {
        NBodyError::BackendUnavailable {
            backend: self.name(),
            reason: format!("crate built without the `{}` feature", feature),
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BackendKind {
    type Err = NBodyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BackendKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| NBodyError::UnknownBackend {
                requested: s.to_string(),
                registered: BackendKind::registered_names(),
            })
    }
}

/// Checks the call contract shared by all backends and returns N.
pub fn validate_input(positions: &ArrayView2<f64>, law: &ForceLaw) -> Result<usize, NBodyError> {
    if positions.ncols() != 3 {
        return Err(NBodyError::ShapeMismatch {
            expected: "(N, 3)".to_string(),
            found: format!("{:?}", positions.shape()),
        });
    }
    let n = positions.nrows();
    law.validate(n)?;
    Ok(n)
}

/// `1 / (r + ε)³`, or zero when the denominator vanishes (coincident, unsoftened).
#[inline]
pub(crate) fn inverse_cube(distance: f64, softening: f64) -> f64 {
    let d = distance + softening;
    let cube = d * d * d;
    if cube > 0.0 { 1.0 / cube } else { 0.0 }
}

/// Acceleration on particle `i`: the inner loop over `j` shared by the CPU kernels.
#[inline]
pub(crate) fn particle_acceleration(positions: &ArrayView2<f64>, i: usize, law: &ForceLaw) -> [f64; 3] {
    let mut sum = [0.0; 3];
    for j in 0..positions.nrows() {
        if i == j {
            continue;
        }
        let diff = row_difference(positions, i, j);
        let w = law.mass.pair_weight(j) * inverse_cube(norm3(diff), law.softening);
        sum[0] += diff[0] * w;
        sum[1] += diff[1] * w;
        sum[2] += diff[2] * w;
    }
    let scale = law.mass.scale();
    [sum[0] * scale, sum[1] * scale, sum[2] * scale]
}

/// Deterministic, well-separated positions for warm-up passes.
pub(crate) fn warm_up_positions() -> Array2<f64> {
    // Additive recurrence on the golden ratio, one stride per axis.
    const STRIDES: [f64; 3] = [0.618_033_988_749_895, 0.754_877_666_246_693, 0.569_840_290_998_053];
    Array2::from_shape_fn((WARM_UP_PARTICLES, 3), |(i, axis)| ((i + 1) as f64 * STRIDES[axis]).fract())
}
