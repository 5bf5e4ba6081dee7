/////////////////////////////////////////////////////////////////////////////////////////////\
//
// Shared numeric helpers for design matrices and posterior draw summaries.
//
// Created on: 12 Oct 2026
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! # Utilities
//!
//! Small helpers shared by the input, inference, and prediction modules:
//! index conversions, row selection on faer matrices, dot products, and the
//! empirical quantile rule used for credible intervals.

use faer::Mat;
use num_traits::ToPrimitive;

#[must_use]
pub fn usize_to_f64(value: usize) -> f64 {
    f64::from(u32::try_from(value).unwrap_or(u32::MAX))
}

#[must_use]
pub fn select_rows(matrix: &Mat<f64>, indices: &[usize]) -> Mat<f64> {
    Mat::from_fn(indices.len(), matrix.ncols(), |i, j| {
        matrix[(indices[i], j)]
    })
}

/// Dot product of `matrix[row, :]` with `coef[coef_row, :]`.
///
/// Columns where the design entry is exactly zero contribute nothing, so a
/// missing coefficient only reaches the rows that load on it.
#[must_use]
pub fn dot_rows(matrix: &Mat<f64>, row: usize, coef: &Mat<f64>, coef_row: usize) -> f64 {
    (0..matrix.ncols())
        .filter(|col| matrix[(row, *col)] != 0.0)
        .map(|col| matrix[(row, col)] * coef[(coef_row, col)])
        .sum()
}

/// Empirical quantile of already-sorted values.
///
/// Linear interpolation between order statistics at position `p * (n - 1)`
/// (Hyndman-Fan type 7). Returns `NaN` for an empty slice.
#[must_use]
pub fn percentile(sorted_values: &[f64], probability: f64) -> f64 {
    if sorted_values.is_empty() {
        return f64::NAN;
    }

    let clamped = probability.clamp(0.0, 1.0);
    let last = sorted_values.len() - 1;
    let position = clamped * usize_to_f64(last);
    let lower = position.floor().to_usize().unwrap_or(0);
    let upper = position.ceil().to_usize().unwrap_or(last).min(last);

    if lower == upper {
        sorted_values[lower]
    } else {
        let weight = position - usize_to_f64(lower);
        (1.0 - weight).mul_add(sorted_values[lower], weight * sorted_values[upper])
    }
}

/// Mean and sample standard deviation (`n - 1` denominator).
///
/// The mean is `NaN` for an empty slice and the standard deviation is `NaN`
/// for fewer than two values.
#[must_use]
pub fn mean_and_sample_sd(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (f64::NAN, f64::NAN);
    }
    let n = usize_to_f64(values.len());
    let mean = values.iter().sum::<f64>() / n;
    if values.len() < 2 {
        return (mean, f64::NAN);
    }
    let sum_sq = values
        .iter()
        .map(|value| {
            let centered = value - mean;
            centered * centered
        })
        .sum::<f64>();
    (mean, (sum_sq / (n - 1.0)).max(0.0).sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn percentile_interpolates_between_order_statistics() {
        let sorted = [1.0, 2.0, 3.0, 4.0];
        assert_relative_eq!(percentile(&sorted, 0.25), 1.75);
        assert_relative_eq!(percentile(&sorted, 0.75), 3.25);
        assert_relative_eq!(percentile(&sorted, 0.5), 2.5);
        assert_relative_eq!(percentile(&sorted, 0.0), 1.0);
        assert_relative_eq!(percentile(&sorted, 1.0), 4.0);
    }

    #[test]
    fn percentile_of_empty_slice_is_nan() {
        assert!(percentile(&[], 0.5).is_nan());
    }

    #[test]
    fn sample_sd_uses_n_minus_one() {
        let (mean, sd) = mean_and_sample_sd(&[1.0, 2.0, 3.0, 4.0]);
        assert_relative_eq!(mean, 2.5);
        assert_relative_eq!(sd, (5.0_f64 / 3.0).sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn sample_sd_is_nan_for_single_value() {
        let (mean, sd) = mean_and_sample_sd(&[3.0]);
        assert_relative_eq!(mean, 3.0);
        assert!(sd.is_nan());
    }

    #[test]
    fn select_rows_keeps_requested_order() {
        let matrix = Mat::from_fn(3, 2, |i, j| usize_to_f64(10 * i + j));
        let picked = select_rows(&matrix, &[2, 0]);
        assert_eq!(picked.nrows(), 2);
        assert_relative_eq!(picked[(0, 1)], 21.0);
        assert_relative_eq!(picked[(1, 0)], 0.0);
    }

    #[test]
    fn dot_rows_multiplies_matching_columns() {
        let design = Mat::from_fn(1, 3, |_, j| usize_to_f64(j + 1));
        let coef = Mat::from_fn(2, 3, |i, _| usize_to_f64(i + 1));
        assert_relative_eq!(dot_rows(&design, 0, &coef, 1), 12.0);
    }

    #[test]
    fn dot_rows_ignores_missing_coefficients_outside_the_row() {
        let design = Mat::from_fn(2, 2, |i, j| if i == j { 1.0 } else { 0.0 });
        let coef = Mat::from_fn(1, 2, |_, j| if j == 1 { f64::NAN } else { 0.5 });
        assert_relative_eq!(dot_rows(&design, 0, &coef, 0), 0.5);
        assert!(dot_rows(&design, 1, &coef, 0).is_nan());
    }
}
