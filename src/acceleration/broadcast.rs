use log::debug;
use ndarray::{Array1, Array2, Array3, ArrayView2, Axis};

use super::{validate_input, AccelerationBackend, BackendKind, ForceLaw, Mass};
use crate::utils::{NBodyError, BROADCAST_MAX_BYTES};

/// Whole-array evaluation through `ndarray` broadcasting.
///
/// Materialises the (N, N, 3) difference tensor `d[i, j] = r_j − r_i` and the (N, N)
/// matrix of cubed distances. Zero entries of that matrix (the diagonal, and coincident
/// particles when unsoftened) are replaced with `+∞` before dividing, which turns their
/// contribution into `0` instead of `NaN`.
///
/// Memory grows as 32·N² bytes, so this is a validation reference rather than a backend
/// for large systems. Inputs whose difference tensor would exceed
/// [`BROADCAST_MAX_BYTES`] are refused with a `CalculationError` (about N = 6 600).
#[derive(Debug, Clone, Copy, Default)]
pub struct Broadcast;

impl AccelerationBackend for Broadcast {
    fn kind(&self) -> BackendKind {
        BackendKind::Broadcast
    }

    fn acceleration(&self, positions: ArrayView2<f64>, law: &ForceLaw) -> Result<Array2<f64>, NBodyError> {
        let n = validate_input(&positions, law)?;
        let tensor_bytes = n
            .checked_mul(n)
            .and_then(|nn| nn.checked_mul(3 * std::mem::size_of::<f64>()))
            .filter(|&bytes| bytes <= BROADCAST_MAX_BYTES)
            .ok_or_else(|| {
                NBodyError::CalculationError(format!(
                    "{} particles need an (N, N, 3) tensor larger than {} bytes",
                    n, BROADCAST_MAX_BYTES
                ))
            })?;
        debug!("broadcast tensor for {} particles: {} bytes", n, tensor_bytes);

        let sources = positions.insert_axis(Axis(0)); // (1, N, 3)
        let targets = positions.insert_axis(Axis(1)); // (N, 1, 3)
        let differences: Array3<f64> = &sources - &targets;

        let mut distance_cubed = differences.map_axis(Axis(2), |d| {
            let r = d.dot(&d).sqrt() + law.softening;
            r * r * r
        });
        distance_cubed.mapv_inplace(|c| if c == 0.0 { f64::INFINITY } else { c });

        let mut weights = distance_cubed.mapv(f64::recip);
        if let Mass::PerParticle(masses) = &law.mass {
            weights *= &Array1::from(masses.clone());
        }

        let mut acceleration = (differences * &weights.insert_axis(Axis(2))).sum_axis(Axis(1));
        acceleration *= law.mass.scale();
        Ok(acceleration)
    }
}
