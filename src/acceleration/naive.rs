use ndarray::{Array2, ArrayView2};

use super::{particle_acceleration, validate_input, AccelerationBackend, BackendKind, ForceLaw};
use crate::utils::NBodyError;

/// Serial O(N²) double loop with the self term skipped explicitly.
///
/// Slow, but the easiest to audit; it is the ground truth for the orbit tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct NaiveLoop;

impl AccelerationBackend for NaiveLoop {
    fn kind(&self) -> BackendKind {
        BackendKind::NaiveLoop
    }

    fn acceleration(&self, positions: ArrayView2<f64>, law: &ForceLaw) -> Result<Array2<f64>, NBodyError> {
        let n = validate_input(&positions, law)?;
        let mut acceleration = Array2::zeros((n, 3));
        for i in 0..n {
            let a = particle_acceleration(&positions, i, law);
            acceleration[[i, 0]] = a[0];
            acceleration[[i, 1]] = a[1];
            acceleration[[i, 2]] = a[2];
        }
        Ok(acceleration)
    }
}
