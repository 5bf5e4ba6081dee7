//! Covariate tables and design-matrix construction.
//!
//! Observations are district-year-cause cells. The fixed-effect design uses
//! treatment contrasts (first sorted level as reference) the way a
//! `model.matrix` call would; random-effect designs are one-hot indicators over
//! combinations of factors.

use std::collections::BTreeSet;
use std::io::Read;

use faer::Mat;
use serde::{Deserialize, Serialize};

use super::{DesignMatrix, InputError, LabeledMatrix};
use crate::preprocess::{constant_columns, standardize};

pub const INTERCEPT_LABEL: &str = "(Intercept)";
pub const YEAR_LABEL: &str = "year_std";

/// One observation row of the covariate table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CovariateRecord {
    pub year: i32,
    pub division: String,
    pub district: String,
    pub cause: String,
}

/// Categorical keys available for random-effect designs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Factor {
    Year,
    Division,
    District,
    Cause,
}

impl Factor {
    fn level(self, record: &CovariateRecord) -> String {
        match self {
            Self::Year => record.year.to_string(),
            Self::Division => record.division.clone(),
            Self::District => record.district.clone(),
            Self::Cause => record.cause.clone(),
        }
    }
}

/// Terms included in the fixed-effect design.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedDesignSpec {
    pub intercept: bool,
    pub year_trend: bool,
    pub division: bool,
    pub cause: bool,
    /// Cause-specific year slopes (`cause<Level>:year_std`).
    pub cause_by_year: bool,
}

impl Default for FixedDesignSpec {
    fn default() -> Self {
        Self {
            intercept: true,
            year_trend: true,
            division: false,
            cause: false,
            cause_by_year: false,
        }
    }
}

/// # Errors
///
/// Returns `InputError` if the CSV is malformed or a row cannot be deserialized.
pub fn read_covariates_csv<R: Read>(reader: R) -> Result<Vec<CovariateRecord>, InputError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);
    csv_reader
        .deserialize::<CovariateRecord>()
        .map(|record| record.map_err(InputError::from))
        .collect()
}

/// Build the fixed-effect design matrix.
///
/// Column order: intercept, `year_std`, division contrasts, cause contrasts,
/// cause-by-year interactions.
///
/// # Errors
///
/// Returns `InputError` if there are no records or the year cannot be
/// standardized while a year term is requested.
pub fn build_fixed_design(
    records: &[CovariateRecord],
    spec: FixedDesignSpec,
) -> Result<DesignMatrix, InputError> {
    if records.is_empty() {
        return Err(InputError::EmptyCovariates);
    }

    let years: Vec<f64> = records.iter().map(|r| f64::from(r.year)).collect();
    let year_std = if spec.year_trend || spec.cause_by_year {
        let (scaled, scaling) =
            standardize(&years).ok_or(InputError::ConstantCovariate("year"))?;
        log::debug!(
            "standardized year with mean {:.3} and sd {:.3}",
            scaling.mean,
            scaling.sd
        );
        scaled
    } else {
        Vec::new()
    };

    let mut labels: Vec<String> = Vec::new();
    let mut columns: Vec<Vec<f64>> = Vec::new();

    if spec.intercept {
        labels.push(INTERCEPT_LABEL.to_string());
        columns.push(vec![1.0; records.len()]);
    }
    if spec.year_trend {
        labels.push(YEAR_LABEL.to_string());
        columns.push(year_std.clone());
    }
    if spec.division {
        for level in contrast_levels(records, Factor::Division) {
            labels.push(format!("division{level}"));
            columns.push(indicator(records, Factor::Division, &level));
        }
    }
    let cause_levels = contrast_levels(records, Factor::Cause);
    if spec.cause {
        for level in &cause_levels {
            labels.push(format!("cause{level}"));
            columns.push(indicator(records, Factor::Cause, level));
        }
    }
    if spec.cause_by_year {
        for level in &cause_levels {
            labels.push(format!("cause{level}:{YEAR_LABEL}"));
            let slope = indicator(records, Factor::Cause, level)
                .into_iter()
                .zip(&year_std)
                .map(|(flag, year)| flag * year)
                .collect();
            columns.push(slope);
        }
    }

    let values = Mat::from_fn(records.len(), columns.len(), |i, j| columns[j][i]);
    let ignore = if spec.intercept { vec![0] } else { Vec::new() };
    for col in constant_columns(&values, 1e-12, &ignore) {
        log::warn!("fixed design column `{}` does not vary", labels[col]);
    }

    LabeledMatrix::new(labels, values)
}

/// Build a one-hot design with one column per observed combination of
/// `factors`. Levels are joined with `:` and sorted.
///
/// # Errors
///
/// Returns `InputError` if `factors` is empty or there are no records.
pub fn build_random_design(
    records: &[CovariateRecord],
    factors: &[Factor],
) -> Result<DesignMatrix, InputError> {
    if factors.is_empty() {
        return Err(InputError::EmptyFactorList);
    }
    if records.is_empty() {
        return Err(InputError::EmptyCovariates);
    }

    let keys: Vec<String> = records
        .iter()
        .map(|record| combined_level(record, factors))
        .collect();
    let labels: Vec<String> = keys
        .iter()
        .cloned()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let values = Mat::from_fn(records.len(), labels.len(), |i, j| {
        if keys[i] == labels[j] { 1.0 } else { 0.0 }
    });
    LabeledMatrix::new(labels, values)
}

fn combined_level(record: &CovariateRecord, factors: &[Factor]) -> String {
    factors
        .iter()
        .map(|factor| factor.level(record))
        .collect::<Vec<_>>()
        .join(":")
}

/// Sorted levels of `factor` excluding the reference (first) level.
fn contrast_levels(records: &[CovariateRecord], factor: Factor) -> Vec<String> {
    records
        .iter()
        .map(|record| factor.level(record))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .skip(1)
        .collect()
}

fn indicator(records: &[CovariateRecord], factor: Factor, level: &str) -> Vec<f64> {
    records
        .iter()
        .map(|record| if factor.level(record) == level { 1.0 } else { 0.0 })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn record(year: i32, division: &str, district: &str, cause: &str) -> CovariateRecord {
        CovariateRecord {
            year,
            division: division.into(),
            district: district.into(),
            cause: cause.into(),
        }
    }

    fn sample_records() -> Vec<CovariateRecord> {
        vec![
            record(2010, "Dhaka", "Gazipur", "Injury"),
            record(2011, "Dhaka", "Gazipur", "Infection"),
            record(2012, "Khulna", "Jessore", "Injury"),
            record(2013, "Khulna", "Jessore", "Other"),
        ]
    }

    #[test]
    fn read_covariates_parses_rows() {
        let data = "year,division,district,cause\n2010, Dhaka ,Gazipur,Injury\n";
        let records = read_covariates_csv(data.as_bytes()).expect("csv should parse");
        assert_eq!(records, vec![record(2010, "Dhaka", "Gazipur", "Injury")]);
    }

    #[test]
    fn fixed_design_uses_treatment_contrasts() {
        let spec = FixedDesignSpec {
            division: true,
            cause: true,
            cause_by_year: true,
            ..FixedDesignSpec::default()
        };
        let design = build_fixed_design(&sample_records(), spec).expect("design");
        assert_eq!(
            design.labels(),
            [
                "(Intercept)",
                "year_std",
                "divisionKhulna",
                "causeInjury",
                "causeOther",
                "causeInjury:year_std",
                "causeOther:year_std",
            ]
        );
        assert_eq!(design.nrows(), 4);
        assert_relative_eq!(design.values()[(2, 2)], 1.0);
        assert_relative_eq!(design.values()[(1, 3)], 0.0);
        let year_std_row0 = design.values()[(0, 1)];
        assert_relative_eq!(design.values()[(0, 5)], year_std_row0);
        assert_relative_eq!(design.values()[(1, 5)], 0.0);
    }

    #[test]
    fn fixed_design_rejects_constant_year() {
        let records = vec![
            record(2010, "Dhaka", "Gazipur", "Injury"),
            record(2010, "Dhaka", "Gazipur", "Other"),
        ];
        let err = build_fixed_design(&records, FixedDesignSpec::default())
            .expect_err("constant year should fail");
        assert_eq!(err, InputError::ConstantCovariate("year"));
    }

    #[test]
    fn fixed_design_rejects_empty_records() {
        let err = build_fixed_design(&[], FixedDesignSpec::default()).expect_err("empty");
        assert_eq!(err, InputError::EmptyCovariates);
    }

    #[test]
    fn random_design_is_one_hot_over_combinations() {
        let design = build_random_design(&sample_records(), &[Factor::Cause, Factor::District])
            .expect("design");
        assert_eq!(
            design.labels(),
            [
                "Infection:Gazipur",
                "Injury:Gazipur",
                "Injury:Jessore",
                "Other:Jessore",
            ]
        );
        for row in 0..design.nrows() {
            let total: f64 = (0..design.ncols()).map(|col| design.values()[(row, col)]).sum();
            assert_relative_eq!(total, 1.0);
        }
        assert_relative_eq!(design.values()[(2, 2)], 1.0);
    }

    #[test]
    fn random_design_requires_factors() {
        let err = build_random_design(&sample_records(), &[]).expect_err("no factors");
        assert_eq!(err, InputError::EmptyFactorList);
    }
}
