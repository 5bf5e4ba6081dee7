/////////////////////////////////////////////////////////////////////////////////////////////\
//
// Merging prediction summaries back into observation tables, CSV output, and
// terminal rendering.
//
// Created on: 14 Oct 2026
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! # Prediction reports
//!
//! Attaches the response-scale summary columns (`mean`, `sd`, `lower`, `upper`)
//! to the covariate rows they were computed for, writes them as CSV, and
//! renders short summary tables with `comfy_table`.

use std::io::Write;

use comfy_table::{Cell, CellAlignment, ContentArrangement, Table, presets::UTF8_FULL_CONDENSED};
use serde::Serialize;

use super::summary::PredictionSummary;
use super::types::{InputShapeError, PredictionError};
use crate::input::{CovariateRecord, InputError};

/// A covariate row with its posterior predictive summary attached.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionRecord {
    pub year: i32,
    pub division: String,
    pub district: String,
    pub cause: String,
    pub mean: f64,
    pub sd: f64,
    pub lower: f64,
    pub upper: f64,
}

/// Pair each covariate row with its response-scale summary.
///
/// # Errors
///
/// Returns `PredictionError` if the row counts differ.
pub fn merge_with_covariates(
    records: &[CovariateRecord],
    summary: &PredictionSummary,
) -> Result<Vec<PredictionRecord>, PredictionError> {
    if records.len() != summary.len() {
        return Err(InputShapeError::ObservationCountMismatch {
            effect: "covariates".to_string(),
            expected: summary.len(),
            found: records.len(),
        }
        .into());
    }

    Ok(records
        .iter()
        .zip(&summary.response)
        .map(|(record, row)| PredictionRecord {
            year: record.year,
            division: record.division.clone(),
            district: record.district.clone(),
            cause: record.cause.clone(),
            mean: row.mean,
            sd: row.sd,
            lower: row.lower,
            upper: row.upper,
        })
        .collect())
}

/// # Errors
///
/// Returns `PredictionError` if writing fails.
pub fn write_prediction_csv<W: Write>(
    writer: W,
    rows: &[PredictionRecord],
) -> Result<(), PredictionError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for row in rows {
        csv_writer.serialize(row).map_err(InputError::from)?;
    }
    csv_writer
        .flush()
        .map_err(|err| InputError::Csv(err.to_string()))?;
    Ok(())
}

/// Render response-scale summaries, one row per label.
#[must_use]
pub fn render_summary_table(labels: &[String], summary: &PredictionSummary) -> String {
    let interval = format!("{:.0}%", summary.interval_level * 100.0);
    let lower = format!("lower {interval}");
    let upper = format!("upper {interval}");
    let mut table = make_table(&["observation", "mean", "sd", &lower, &upper, "missing"]);

    for (index, row) in summary.response.iter().enumerate() {
        let label = labels
            .get(index)
            .cloned()
            .unwrap_or_else(|| index.to_string());
        let missing = summary.missing_draws.get(index).copied().unwrap_or(0);
        table.add_row(vec![
            Cell::new(label),
            numeric_cell(row.mean),
            numeric_cell(row.sd),
            numeric_cell(row.lower),
            numeric_cell(row.upper),
            Cell::new(missing).set_alignment(CellAlignment::Right),
        ]);
    }

    table.to_string()
}

fn make_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(headers.iter().map(|h| Cell::new(*h)).collect::<Vec<_>>());
    table
}

fn numeric_cell(value: f64) -> Cell {
    let text = if value.is_nan() {
        "NA".to_string()
    } else {
        format!("{value:.4}")
    };
    Cell::new(text).set_alignment(CellAlignment::Right)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prediction::summary::ObservationSummary;
    use crate::prediction::types::Transform;

    fn summary() -> PredictionSummary {
        let row = ObservationSummary {
            mean: 2.5,
            sd: 1.25,
            lower: 1.75,
            upper: f64::NAN,
        };
        PredictionSummary {
            link: vec![row],
            response: vec![row],
            missing_draws: vec![3],
            draw_count: 4,
            interval_level: 0.5,
            transform: Transform::Identity,
        }
    }

    fn record() -> CovariateRecord {
        CovariateRecord {
            year: 2012,
            division: "Dhaka".into(),
            district: "Gazipur".into(),
            cause: "Injury".into(),
        }
    }

    #[test]
    fn merge_rejects_row_count_mismatch() {
        let err = merge_with_covariates(&[record(), record()], &summary()).expect_err("mismatch");
        assert_eq!(
            err,
            PredictionError::InputShape(InputShapeError::ObservationCountMismatch {
                effect: "covariates".into(),
                expected: 1,
                found: 2
            })
        );
    }

    #[test]
    fn csv_output_has_covariate_and_summary_columns() {
        let rows = merge_with_covariates(&[record()], &summary()).expect("merge");
        let mut buffer = Vec::new();
        write_prediction_csv(&mut buffer, &rows).expect("write");
        let text = String::from_utf8(buffer).expect("utf8");
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("year,division,district,cause,mean,sd,lower,upper")
        );
        assert_eq!(lines.next(), Some("2012,Dhaka,Gazipur,Injury,2.5,1.25,1.75,NaN"));
    }

    #[test]
    fn table_lists_every_observation() {
        let rendered = render_summary_table(&["Gazipur 2012".to_string()], &summary());
        assert!(rendered.contains("Gazipur 2012"));
        assert!(rendered.contains("lower 50%"));
        assert!(rendered.contains("NA"));
    }
}
