pub mod utils;
pub mod acceleration;
pub mod particles;
pub mod initial_conditions;
pub mod integrators;
pub mod simulation;
pub mod validation;

#[cfg(test)]
mod simulation_tests;

use ndarray::ArrayView2;

/// ### General helper function
/// - Asserts that two floating point numbers are approximately equal.
///
/// ### Arguments
///
/// * `a` - The first floating point number.
/// * `b` - The second floating point number.
/// * `epsilon` - The maximum difference between `a` and `b` for them to be considered equal.
/// * `optional_message` - An optional message to display if the assertion fails.
///
pub fn assert_float_eq(a: f64, b: f64, epsilon: f64, optional_message: Option<&str>) {
    match optional_message {
        Some(message) => assert!((a - b).abs() < epsilon, "a: {:?},\nb: {:?},\nepsilon: {:?},\n message: {:?}", a, b, epsilon, message),
        None => assert!((a - b).abs() < epsilon, "Expected {} to be approximately equal to {} (epsilon: {})", a, b, epsilon),
    }
}

/// ### General helper function
/// - Asserts that two (N, 3) arrays agree element-wise within `atol + rtol * |expected|`.
///
/// ### Arguments
///
/// * `actual` - The array under test.
/// * `expected` - The reference array.
/// * `rtol` - Relative tolerance, scaled by the magnitude of `expected`.
/// * `atol` - Absolute tolerance.
/// * `optional_message` - An optional message to display if the assertion fails.
///
pub fn assert_allclose(actual: &ArrayView2<f64>, expected: &ArrayView2<f64>, rtol: f64, atol: f64, optional_message: Option<&str>) {
    let report = utils::allclose(actual, expected, rtol, atol);
    if let Some((row, column, a, e)) = report.worst {
        match optional_message {
            Some(message) => panic!(
                "{}: element ({}, {}) is {:?}, expected {:?} (rtol: {:?}, atol: {:?}, max abs delta: {:e})",
                message, row, column, a, e, rtol, atol, report.max_abs_delta
            ),
            None => panic!(
                "Element ({}, {}) is {:?}, expected {:?} (rtol: {:?}, atol: {:?}, max abs delta: {:e})",
                row, column, a, e, rtol, atol, report.max_abs_delta
            ),
        }
    }
}
