//! # Model inputs
//!
//! Defines a labeled numeric matrix used for both design matrices (rows are
//! observations) and posterior draw matrices (rows are retained draws). Column
//! labels are the only thing that ties a draw column to a design column, so
//! they must be present and unique.
//!
//! # Examples
//!
//! ```
//! use faer::Mat;
//! use smallarea_posterior::LabeledMatrix;
//!
//! let design = LabeledMatrix::new(
//!     vec!["(Intercept)".to_string(), "year_std".to_string()],
//!     Mat::from_fn(3, 2, |i, j| if j == 0 { 1.0 } else { f64::from(u32::try_from(i).unwrap_or(0)) }),
//! );
//! assert!(design.is_ok());
//! ```
//!
//! ```
//! use faer::Mat;
//! use smallarea_posterior::LabeledMatrix;
//!
//! let design = LabeledMatrix::new(
//!     vec!["a".to_string(), "a".to_string()],
//!     Mat::from_fn(3, 2, |_i, _j| 1.0),
//! );
//! assert!(design.is_err());
//! ```

use std::collections::HashSet;
use std::io::Read;

use faer::Mat;
use thiserror::Error;

use crate::utils::select_rows;

pub mod covariates;

pub use covariates::{
    CovariateRecord, Factor, FixedDesignSpec, build_fixed_design, build_random_design,
    read_covariates_csv,
};

/// Errors returned when constructing or loading model inputs.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InputError {
    #[error("matrix has {columns} columns but {labels} labels")]
    LabelCountMismatch { labels: usize, columns: usize },
    #[error("column label `{0}` appears more than once")]
    DuplicateLabel(String),
    #[error("column labels must be non-empty")]
    EmptyLabel,
    #[error("invalid number `{value}` at row {row}, column `{column}`")]
    InvalidNumber {
        row: usize,
        column: String,
        value: String,
    },
    #[error("failed to read CSV: {0}")]
    Csv(String),
    #[error("failed to read {path}: {message}")]
    Io { path: String, message: String },
    #[error("covariate table has no rows")]
    EmptyCovariates,
    #[error("covariate `{0}` is constant and cannot be standardized")]
    ConstantCovariate(&'static str),
    #[error("random-effect design requires at least one factor")]
    EmptyFactorList,
}

impl From<csv::Error> for InputError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err.to_string())
    }
}

/// Numeric matrix with one unique label per column.
#[derive(Debug, Clone)]
pub struct LabeledMatrix {
    labels: Vec<String>,
    values: Mat<f64>,
}

/// Observation-by-coefficient matrix.
pub type DesignMatrix = LabeledMatrix;

/// Draw-by-coefficient matrix, one row per retained MCMC iteration.
pub type DrawMatrix = LabeledMatrix;

impl LabeledMatrix {
    /// # Errors
    ///
    /// Returns `InputError` if labels do not match the column count, are blank,
    /// or repeat.
    pub fn new(labels: Vec<String>, values: Mat<f64>) -> Result<Self, InputError> {
        if labels.len() != values.ncols() {
            return Err(InputError::LabelCountMismatch {
                labels: labels.len(),
                columns: values.ncols(),
            });
        }
        let mut seen = HashSet::with_capacity(labels.len());
        for label in &labels {
            if label.trim().is_empty() {
                return Err(InputError::EmptyLabel);
            }
            if !seen.insert(label.as_str()) {
                return Err(InputError::DuplicateLabel(label.clone()));
            }
        }
        Ok(Self { labels, values })
    }

    /// Build from row-major values.
    ///
    /// # Errors
    ///
    /// Returns `InputError` if any row length differs from the label count or
    /// the labels are invalid.
    pub fn from_rows<S: Into<String>>(
        labels: impl IntoIterator<Item = S>,
        rows: &[Vec<f64>],
    ) -> Result<Self, InputError> {
        let labels: Vec<String> = labels.into_iter().map(Into::into).collect();
        if let Some(bad) = rows.iter().find(|row| row.len() != labels.len()) {
            return Err(InputError::LabelCountMismatch {
                labels: labels.len(),
                columns: bad.len(),
            });
        }
        let values = Mat::from_fn(rows.len(), labels.len(), |i, j| rows[i][j]);
        Self::new(labels, values)
    }

    /// Load a matrix from CSV: the header row holds the labels, every other
    /// row is one matrix row. `NA`, `NaN`, and empty cells are read as `NaN`.
    ///
    /// # Errors
    ///
    /// Returns `InputError` on malformed CSV, unparseable cells, or invalid labels.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self, InputError> {
        let mut csv_reader = csv::ReaderBuilder::new().has_headers(true).from_reader(reader);
        let labels: Vec<String> = csv_reader
            .headers()?
            .iter()
            .map(|label| label.trim().to_string())
            .collect();

        let mut rows = Vec::new();
        for (row_index, record) in csv_reader.records().enumerate() {
            let record = record?;
            let row = record
                .iter()
                .zip(&labels)
                .map(|(cell, label)| {
                    parse_cell(cell).ok_or_else(|| InputError::InvalidNumber {
                        row: row_index,
                        column: label.clone(),
                        value: cell.to_string(),
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            rows.push(row);
        }

        Self::from_rows(labels, &rows)
    }

    #[must_use]
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    #[must_use]
    pub const fn values(&self) -> &Mat<f64> {
        &self.values
    }

    #[must_use]
    pub fn nrows(&self) -> usize {
        self.values.nrows()
    }

    #[must_use]
    pub fn ncols(&self) -> usize {
        self.values.ncols()
    }

    /// Keep only the given rows, in the given order.
    #[must_use]
    pub fn select_rows(&self, indices: &[usize]) -> Self {
        Self {
            labels: self.labels.clone(),
            values: select_rows(&self.values, indices),
        }
    }
}

fn parse_cell(cell: &str) -> Option<f64> {
    let trimmed = cell.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("na") || trimmed.eq_ignore_ascii_case("nan")
    {
        return Some(f64::NAN);
    }
    trimmed.parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn new_rejects_label_count_mismatch() {
        let err = LabeledMatrix::new(vec!["a".into()], Mat::from_fn(2, 2, |_i, _j| 1.0))
            .expect_err("label count mismatch should fail");
        assert_eq!(
            err,
            InputError::LabelCountMismatch {
                labels: 1,
                columns: 2
            }
        );
    }

    #[test]
    fn new_rejects_duplicate_labels() {
        let err = LabeledMatrix::new(
            vec!["a".into(), "a".into()],
            Mat::from_fn(1, 2, |_i, _j| 1.0),
        )
        .expect_err("duplicate labels should fail");
        assert_eq!(err, InputError::DuplicateLabel("a".into()));
    }

    #[test]
    fn new_rejects_blank_labels() {
        let err = LabeledMatrix::new(vec!["  ".into()], Mat::from_fn(1, 1, |_i, _j| 1.0))
            .expect_err("blank label should fail");
        assert_eq!(err, InputError::EmptyLabel);
    }

    #[test]
    fn from_rows_rejects_ragged_rows() {
        let err = LabeledMatrix::from_rows(["a", "b"], &[vec![1.0, 2.0], vec![1.0]])
            .expect_err("ragged rows should fail");
        assert!(matches!(err, InputError::LabelCountMismatch { .. }));
    }

    #[test]
    fn csv_reader_reads_labels_and_missing_values() {
        let data = "b,a\n1.5,NA\n2.5,3\n";
        let matrix = LabeledMatrix::from_csv_reader(data.as_bytes()).expect("csv should parse");
        assert_eq!(matrix.labels(), ["b".to_string(), "a".to_string()]);
        assert_eq!(matrix.nrows(), 2);
        assert_relative_eq!(matrix.values()[(1, 0)], 2.5);
        assert!(matrix.values()[(0, 1)].is_nan());
    }

    #[test]
    fn csv_reader_reports_bad_cells() {
        let data = "a\nfoo\n";
        let err = LabeledMatrix::from_csv_reader(data.as_bytes()).expect_err("bad cell");
        assert_eq!(
            err,
            InputError::InvalidNumber {
                row: 0,
                column: "a".into(),
                value: "foo".into()
            }
        );
    }

    #[test]
    fn select_rows_preserves_labels() {
        let matrix =
            LabeledMatrix::from_rows(["x"], &[vec![1.0], vec![2.0], vec![3.0]]).expect("valid");
        let picked = matrix.select_rows(&[2, 1]);
        assert_eq!(picked.labels(), matrix.labels());
        assert_relative_eq!(picked.values()[(0, 0)], 3.0);
    }
}
