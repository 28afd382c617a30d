use ndarray::{Array1, Array2, ArrayView2, Axis};

use super::{validate_input, AccelerationBackend, BackendKind, ForceLaw, Mass};
use crate::utils::{axis_means, NBodyError};

/// A per-particle kernel mapped over the particle index, in single precision.
///
/// The kernel for particle `i` computes the whole row of differences `r_j − r_i`,
/// including `j = i`. It does not mask the self term: with no softening that term is
/// `0 / 0 = NaN`, and the reduction is a NaN-aware sum that drops it (coincident
/// particles are dropped the same way).
///
/// Positions are centred on their mean in f64 before narrowing to f32, so an offset
/// cluster keeps the precision of its pairwise differences.
#[derive(Debug, Clone, Copy, Default)]
pub struct VectorizedMap;

impl AccelerationBackend for VectorizedMap {
    fn kind(&self) -> BackendKind {
        BackendKind::VectorizedMap
    }

    fn acceleration(&self, positions: ArrayView2<f64>, law: &ForceLaw) -> Result<Array2<f64>, NBodyError> {
        let n = validate_input(&positions, law)?;
        let centroid = axis_means(&positions);
        let positions32 = Array2::from_shape_fn((n, 3), |(i, k)| (positions[[i, k]] - centroid[k]) as f32);
        let weights: Option<Array1<f32>> = match &law.mass {
            Mass::Uniform(_) => None,
            Mass::PerParticle(masses) => Some(masses.iter().map(|&m| m as f32).collect()),
        };
        let softening = law.softening as f32;

        let kernel = |i: usize| -> Array1<f32> {
            let differences = &positions32 - &positions32.row(i);
            let distance_cubed = differences.map_axis(Axis(1), |d| {
                let r = d.dot(&d).sqrt() + softening;
                r * r * r
            });
            let mut terms = differences / &distance_cubed.insert_axis(Axis(1));
            if let Some(weights) = &weights {
                terms *= &weights.view().insert_axis(Axis(1));
            }
            nansum_rows(&terms)
        };

        let mut flat = Vec::with_capacity(n * 3);
        for row in (0..n).map(kernel) {
            flat.extend(row.iter().map(|&a| a as f64));
        }
        let mut acceleration = Array2::from_shape_vec((n, 3), flat)?;
        acceleration *= law.mass.scale();
        Ok(acceleration)
    }
}

/// Column sums that skip NaN entries.
fn nansum_rows(terms: &Array2<f32>) -> Array1<f32> {
    terms.fold_axis(Axis(0), 0.0, |acc, &x| if x.is_nan() { *acc } else { acc + x })
}
