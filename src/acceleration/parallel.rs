use log::debug;
use ndarray::{Array2, ArrayView2};
use rayon::prelude::*;

use super::{particle_acceleration, validate_input, warm_up_positions, AccelerationBackend, BackendKind, ForceLaw};
use crate::utils::NBodyError;

/// The naive kernel with its outer loop spread over the rayon thread pool.
///
/// Each task owns exactly one output row and reads the shared position view; there is
/// no shared mutable state, and the end of the parallel iterator is the completion
/// barrier. The inner loop over sources stays sequential per task.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParallelJit;

impl ParallelJit {
    pub fn new() -> Self {
        ParallelJit
    }
}

impl AccelerationBackend for ParallelJit {
    fn kind(&self) -> BackendKind {
        BackendKind::ParallelJit
    }

    fn acceleration(&self, positions: ArrayView2<f64>, law: &ForceLaw) -> Result<Array2<f64>, NBodyError> {
        let n = validate_input(&positions, law)?;
        let mut rows = vec![0.0; n * 3];
        rows.par_chunks_mut(3)
            .enumerate()
            .for_each(|(i, row)| {
                row.copy_from_slice(&particle_acceleration(&positions, i, law));
            });
        Ok(Array2::from_shape_vec((n, 3), rows)?)
    }

    /// Starts the global thread pool and runs one small evaluation, so the first timed
    /// call does not include pool start-up.
    fn warm_up(&self) -> Result<(), NBodyError> {
        let threads = rayon::current_num_threads();
        let positions = warm_up_positions();
        self.acceleration(positions.view(), &ForceLaw::unit())?;
        debug!("parallel-jit warmed up on {} threads", threads);
        Ok(())
    }
}
