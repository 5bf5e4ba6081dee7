//! Predictive draws: the linear predictor of every observation under every
//! retained posterior draw.

use faer::Mat;
use rayon::prelude::*;

use super::align::align_draws;
use super::effects::{EffectGroup, PredictionInputs};
use super::types::{InputShapeError, MissingDataError, PredictionError, PredictionOptions};
use crate::utils::dot_rows;

/// Observation-by-draw matrix of linear predictors.
#[derive(Debug, Clone)]
pub struct PredictiveDraws {
    values: Mat<f64>,
}

impl PredictiveDraws {
    #[must_use]
    pub const fn new(values: Mat<f64>) -> Self {
        Self { values }
    }

    #[must_use]
    pub const fn values(&self) -> &Mat<f64> {
        &self.values
    }

    #[must_use]
    pub fn observation_count(&self) -> usize {
        self.values.nrows()
    }

    #[must_use]
    pub fn draw_count(&self) -> usize {
        self.values.ncols()
    }

    /// Draws for one observation, in draw order. `index` must be below
    /// `observation_count()`.
    pub(crate) fn observation(&self, index: usize) -> Vec<f64> {
        (0..self.values.ncols())
            .map(|draw| self.values[(index, draw)])
            .collect()
    }
}

/// A group's design matrix with its block draws aligned and summed.
struct AlignedTerm<'a> {
    design: &'a Mat<f64>,
    coefficients: Mat<f64>,
}

/// Compute `fixed_design @ fixed_draws[s] + sum over groups and blocks of
/// random_design @ draws[s]` for every retained draw `s`.
///
/// # Errors
///
/// Returns `PredictionError` if options are invalid, a group has no blocks or
/// no retained draws, or any design/draw dimension or label disagrees.
pub fn compute_predictive_draws(
    inputs: &PredictionInputs,
    options: &PredictionOptions,
) -> Result<PredictiveDraws, PredictionError> {
    options.validate()?;

    let observations = inputs.observation_count();
    let total_draws = inputs
        .fixed
        .blocks
        .first()
        .map(|block| block.draws.nrows())
        .ok_or_else(|| MissingDataError::EmptyGroup(inputs.fixed.name.clone()))?;
    if total_draws == 0 {
        return Err(MissingDataError::NoRetainedDraws(inputs.fixed.name.clone()).into());
    }
    options.retention.validate(total_draws)?;
    let retained = options.retention.retained_indices(total_draws);
    if !options.retention.keeps_all() {
        log::info!(
            "retaining {} of {total_draws} draws (burn-in {}, thin {})",
            options.retention.retained_draws(total_draws),
            options.retention.burn_in,
            options.retention.thin
        );
    }

    let terms = inputs
        .groups()
        .map(|group| align_group(group, observations, total_draws, &retained))
        .collect::<Result<Vec<_>, _>>()?;

    log::debug!(
        "computing linear predictors for {observations} observations over {} draws ({} effect groups)",
        retained.len(),
        terms.len()
    );

    let columns: Vec<Vec<f64>> = if options.parallel {
        (0..retained.len())
            .into_par_iter()
            .map(|draw| linear_predictor(&terms, observations, draw))
            .collect()
    } else {
        (0..retained.len())
            .map(|draw| linear_predictor(&terms, observations, draw))
            .collect()
    };

    let values = Mat::from_fn(observations, columns.len(), |row, draw| columns[draw][row]);
    log::info!(
        "computed predictive draws for {observations} observations x {} draws",
        columns.len()
    );
    Ok(PredictiveDraws::new(values))
}

fn align_group<'a>(
    group: &'a EffectGroup,
    observations: usize,
    total_draws: usize,
    retained: &[usize],
) -> Result<AlignedTerm<'a>, PredictionError> {
    if group.design.nrows() != observations {
        return Err(InputShapeError::ObservationCountMismatch {
            effect: group.name.clone(),
            expected: observations,
            found: group.design.nrows(),
        }
        .into());
    }
    if group.blocks.is_empty() {
        return Err(MissingDataError::EmptyGroup(group.name.clone()).into());
    }

    let mut coefficients = Mat::<f64>::zeros(retained.len(), group.design.ncols());
    for block in &group.blocks {
        if block.draws.nrows() != total_draws {
            return Err(InputShapeError::DrawCountMismatch {
                effect: block.name.clone(),
                expected: total_draws,
                found: block.draws.nrows(),
            }
            .into());
        }
        let kept = block.draws.select_rows(retained);
        let aligned = align_draws(&block.name, group.design.labels(), &kept)?;
        for draw in 0..aligned.nrows() {
            for col in 0..aligned.ncols() {
                coefficients[(draw, col)] += aligned[(draw, col)];
            }
        }
    }

    Ok(AlignedTerm {
        design: group.design.values(),
        coefficients,
    })
}

fn linear_predictor(terms: &[AlignedTerm<'_>], observations: usize, draw: usize) -> Vec<f64> {
    (0..observations)
        .map(|row| {
            terms
                .iter()
                .map(|term| dot_rows(term.design, row, &term.coefficients, draw))
                .sum()
        })
        .collect()
}
