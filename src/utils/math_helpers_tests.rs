use ndarray::{array, Array2};

use crate::assert_float_eq;
use crate::utils::{allclose, axis_means, median, norm3, row_difference, subtract_axis_means};

#[test]
fn test_norm3() {
    assert_float_eq(norm3([3.0, 4.0, 12.0]), 13.0, 1e-12, None);
    assert_float_eq(norm3([0.0, 0.0, 0.0]), 0.0, 1e-12, None);
}

#[test]
fn test_row_difference_points_from_i_to_j() {
    let positions = array![[1.0, 2.0, 3.0], [4.0, 0.0, -1.0]];
    assert_eq!(row_difference(&positions.view(), 0, 1), [3.0, -2.0, -4.0]);
    assert_eq!(row_difference(&positions.view(), 1, 0), [-3.0, 2.0, 4.0]);
}

#[test]
fn test_subtract_axis_means_centres_columns() {
    let mut values = array![[1.0, 10.0, -2.0], [3.0, 20.0, 2.0], [5.0, 60.0, 6.0]];
    subtract_axis_means(&mut values);

    let means = axis_means(&values.view());
    for &m in means.iter() {
        assert!(m.abs() < 1e-12, "column mean {} not removed", m);
    }
    // Offsets inside each column are unchanged.
    assert_float_eq(values[[2, 0]] - values[[0, 0]], 4.0, 1e-12, None);
}

#[test]
fn test_axis_means_of_empty_array() {
    let empty = Array2::<f64>::zeros((0, 3));
    assert_eq!(axis_means(&empty.view()), array![0.0, 0.0, 0.0]);
}

#[test]
fn test_median() {
    assert_eq!(median(&[3.0, 1.0, 2.0]), Some(2.0));
    assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), Some(2.5));
    assert_eq!(median(&[]), None);
    assert_eq!(median(&[1.0, f64::NAN]), None);
}

#[test]
fn test_allclose_uses_relative_and_absolute_band() {
    let expected = array![[100.0, 0.0, 1.0]];
    // 100 ± (1e-5 + 0.1), 0 ± 1e-5, 1 ± (1e-5 + 1e-3)
    let actual = array![[100.09, 5e-6, 1.0009]];
    let report = allclose(&actual.view(), &expected.view(), 1e-3, 1e-5);
    assert!(report.is_close(), "{:?}", report);
    assert_float_eq(report.max_abs_delta, 0.09, 1e-9, None);
}

#[test]
fn test_allclose_reports_worst_element() {
    let expected = array![[1.0, 1.0, 1.0], [1.0, 1.0, 1.0]];
    let actual = array![[1.01, 1.0, 1.0], [1.0, 1.0, 1.5]];
    let report = allclose(&actual.view(), &expected.view(), 1e-3, 1e-5);
    assert!(!report.is_close());
    assert_eq!(report.worst, Some((1, 2, 1.5, 1.0)));
    assert_float_eq(report.max_abs_delta, 0.5, 1e-12, None);
}

#[test]
fn test_allclose_rejects_nan_and_shape_mismatch() {
    let expected = array![[1.0, 2.0, 3.0]];
    let with_nan = array![[1.0, f64::NAN, 3.0]];
    assert!(!allclose(&with_nan.view(), &expected.view(), 1e-3, 1e-5).is_close());

    let wider = array![[1.0, 2.0, 3.0, 4.0]];
    assert!(!allclose(&wider.view(), &expected.view(), 1e-3, 1e-5).is_close());
}
