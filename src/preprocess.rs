use faer::Mat;

use crate::utils::mean_and_sample_sd;

/// Centering and scaling applied to a covariate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Standardization {
    pub mean: f64,
    pub sd: f64,
}

impl Standardization {
    #[must_use]
    pub fn apply(self, value: f64) -> f64 {
        (value - self.mean) / self.sd
    }
}

/// Standardize values by their mean and sample standard deviation.
///
/// Returns `None` when there are fewer than two values or the values do not
/// vary.
#[must_use]
pub fn standardize(values: &[f64]) -> Option<(Vec<f64>, Standardization)> {
    let (mean, sd) = mean_and_sample_sd(values);
    if !sd.is_finite() || sd <= 0.0 {
        return None;
    }
    let scaling = Standardization { mean, sd };
    Some((values.iter().map(|v| scaling.apply(*v)).collect(), scaling))
}

#[must_use]
pub fn column_has_variation(x: &Mat<f64>, column: usize, tolerance: f64) -> bool {
    if column >= x.ncols() || x.nrows() < 2 {
        return false;
    }
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for row in 0..x.nrows() {
        let value = x[(row, column)];
        min = min.min(value);
        max = max.max(value);
    }
    (max - min).abs() > tolerance.abs()
}

/// Indices of columns that are constant, skipping any listed in `ignore`.
#[must_use]
pub fn constant_columns(x: &Mat<f64>, tolerance: f64, ignore: &[usize]) -> Vec<usize> {
    (0..x.ncols())
        .filter(|col| !ignore.contains(col) && !column_has_variation(x, *col, tolerance))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn standardize_centers_and_scales() {
        let (scaled, scaling) = standardize(&[2000.0, 2001.0, 2002.0]).expect("varying input");
        assert_relative_eq!(scaling.mean, 2001.0);
        assert_relative_eq!(scaling.sd, 1.0);
        assert_relative_eq!(scaled[0], -1.0);
        assert_relative_eq!(scaled[2], 1.0);
    }

    #[test]
    fn standardize_rejects_constant_values() {
        assert!(standardize(&[2010.0, 2010.0]).is_none());
        assert!(standardize(&[2010.0]).is_none());
    }

    #[test]
    fn constant_columns_skips_ignored_indices() {
        let x = Mat::from_fn(3, 3, |row, col| match col {
            0 | 2 => 1.0,
            _ => f64::from(u32::try_from(row).unwrap_or(0)),
        });
        assert_eq!(constant_columns(&x, 1e-12, &[0]), vec![2]);
    }
}
