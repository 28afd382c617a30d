use ndarray::{Array1, Array2, ArrayView2, Axis};

/// Euclidean norm of a 3-vector.
#[inline]
pub fn norm3(v: [f64; 3]) -> f64 {
    (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt()
}

/// `r_j - r_i` for two rows of an (N, 3) array.
#[inline]
pub fn row_difference(positions: &ArrayView2<f64>, i: usize, j: usize) -> [f64; 3] {
    [
        positions[[j, 0]] - positions[[i, 0]],
        positions[[j, 1]] - positions[[i, 1]],
        positions[[j, 2]] - positions[[i, 2]],
    ]
}

/// Per-axis mean of an (N, 3) array. Returns zeros for an empty array.
pub fn axis_means(values: &ArrayView2<f64>) -> Array1<f64> {
    values
        .mean_axis(Axis(0))
        .unwrap_or_else(|| Array1::zeros(values.ncols()))
}

/// Subtracts the per-axis mean in place, so that every column sums to ~0.
pub fn subtract_axis_means(values: &mut Array2<f64>) {
    let means = axis_means(&values.view());
    *values -= &means;
}

/// Median of a set of samples (mean of the two middle values for even lengths).
/// Returns `None` for an empty slice or one containing NaN.
pub fn median(samples: &[f64]) -> Option<f64> {
    if samples.is_empty() || samples.iter().any(|s| s.is_nan()) {
        return None;
    }
    let mut sorted = samples.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Result of an element-wise `allclose` comparison.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CloseReport {
    /// Largest `|actual - expected|` over all elements.
    pub max_abs_delta: f64,
    /// Element `(row, column, actual, expected)` furthest outside the band, if any.
    pub worst: Option<(usize, usize, f64, f64)>,
}

impl CloseReport {
    pub fn is_close(&self) -> bool {
        self.worst.is_none()
    }
}

/// Element-wise `|actual - expected| <= atol + rtol * |expected|`.
///
/// NaN never compares close. Arrays of different shapes are never close.
pub fn allclose(actual: &ArrayView2<f64>, expected: &ArrayView2<f64>, rtol: f64, atol: f64) -> CloseReport {
    let mut report = CloseReport { max_abs_delta: 0.0, worst: None };
    if actual.dim() != expected.dim() {
        report.max_abs_delta = f64::INFINITY;
        report.worst = Some((actual.nrows().min(expected.nrows()), 0, f64::NAN, f64::NAN));
        return report;
    }
    let mut worst_ratio = 0.0;
    for ((idx, &a), &e) in actual.indexed_iter().zip(expected.iter()) {
        let delta = (a - e).abs();
        let band = atol + rtol * e.abs();
        if delta > report.max_abs_delta || delta.is_nan() {
            report.max_abs_delta = if delta.is_nan() { f64::INFINITY } else { delta };
        }
        if !(delta <= band) {
            let ratio = if delta.is_nan() { f64::INFINITY } else { delta / band };
            if report.worst.is_none() || ratio > worst_ratio {
                worst_ratio = ratio;
                report.worst = Some((idx.0, idx.1, a, e));
            }
        }
    }
    report
}
