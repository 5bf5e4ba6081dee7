//! Label-based alignment of draw columns to design columns.

use std::collections::HashMap;

use faer::Mat;

use super::types::InputShapeError;
use crate::input::DrawMatrix;

/// Reorder the columns of `draws` so that column `j` holds the coefficient
/// for `design_labels[j]`.
///
/// The label sets must be identical: a draw matrix with extra, missing, or
/// renamed coefficients is rejected rather than subset.
///
/// # Errors
///
/// Returns `InputShapeError` naming `effect` on a column-count or label mismatch.
pub fn align_draws(
    effect: &str,
    design_labels: &[String],
    draws: &DrawMatrix,
) -> Result<Mat<f64>, InputShapeError> {
    if design_labels.len() != draws.ncols() {
        return Err(InputShapeError::ColumnCountMismatch {
            effect: effect.to_string(),
            design_cols: design_labels.len(),
            draw_cols: draws.ncols(),
        });
    }

    let positions: HashMap<&str, usize> = draws
        .labels()
        .iter()
        .enumerate()
        .map(|(index, label)| (label.as_str(), index))
        .collect();

    let order = design_labels
        .iter()
        .map(|label| {
            positions
                .get(label.as_str())
                .copied()
                .ok_or_else(|| InputShapeError::UnmatchedLabel {
                    effect: effect.to_string(),
                    label: label.clone(),
                })
        })
        .collect::<Result<Vec<_>, _>>()?;

    if order.iter().enumerate().any(|(target, source)| target != *source) {
        log::debug!("reordering draw columns for effect `{effect}` to match design");
    }

    let values = draws.values();
    Ok(Mat::from_fn(values.nrows(), order.len(), |row, col| {
        values[(row, order[col])]
    }))
}
