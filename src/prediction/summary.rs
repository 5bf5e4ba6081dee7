//! Per-observation posterior predictive summaries.

use rayon::prelude::*;

use super::effects::PredictionInputs;
use super::predictive::{PredictiveDraws, compute_predictive_draws};
use super::types::{PredictionError, PredictionOptions, Transform};
use crate::utils::{mean_and_sample_sd, percentile, usize_to_f64};

/// Point estimate, dispersion, and credible interval for one observation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObservationSummary {
    pub mean: f64,
    pub sd: f64,
    pub lower: f64,
    pub upper: f64,
}

impl ObservationSummary {
    const MISSING: Self = Self {
        mean: f64::NAN,
        sd: f64::NAN,
        lower: f64::NAN,
        upper: f64::NAN,
    };

    /// Map mean and bounds through the inverse link; `sd` is left as is.
    #[must_use]
    pub fn back_transform(self, transform: Transform) -> Self {
        Self {
            mean: transform.inverse(self.mean),
            sd: self.sd,
            lower: transform.inverse(self.lower),
            upper: transform.inverse(self.upper),
        }
    }
}

/// Summaries for every observation, in observation order.
#[derive(Debug, Clone, Default)]
pub struct PredictionSummary {
    /// Linear-predictor scale.
    pub link: Vec<ObservationSummary>,
    /// Response scale after applying `transform`.
    pub response: Vec<ObservationSummary>,
    /// Number of `NaN` draws skipped per observation.
    pub missing_draws: Vec<usize>,
    pub draw_count: usize,
    pub interval_level: f64,
    pub transform: Transform,
}

impl PredictionSummary {
    #[must_use]
    pub fn len(&self) -> usize {
        self.link.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.link.is_empty()
    }
}

/// Compute predictive draws and summarize them in one call.
///
/// # Errors
///
/// Returns `PredictionError` if inputs are structurally invalid; see
/// [`compute_predictive_draws`].
pub fn predict(
    inputs: &PredictionInputs,
    options: &PredictionOptions,
) -> Result<PredictionSummary, PredictionError> {
    let draws = compute_predictive_draws(inputs, options)?;
    summarize_predictive_draws(&draws, options)
}

/// Reduce each observation's draws to mean, sample sd, and the central
/// `interval_level` credible interval, then apply the inverse link.
///
/// `NaN` draws are skipped. When an observation's missing fraction exceeds
/// `missing_tolerance`, its interval bounds are `NaN`.
///
/// # Errors
///
/// Returns `PredictionError` if the options are invalid.
pub fn summarize_predictive_draws(
    draws: &PredictiveDraws,
    options: &PredictionOptions,
) -> Result<PredictionSummary, PredictionError> {
    options.validate()?;

    let observations = draws.observation_count();
    let summarize = |row: usize| summarize_observation(&draws.observation(row), options);
    let rows: Vec<(ObservationSummary, usize)> = if options.parallel {
        (0..observations).into_par_iter().map(summarize).collect()
    } else {
        (0..observations).map(summarize).collect()
    };

    let flagged = rows
        .iter()
        .filter(|(summary, _)| summary.lower.is_nan())
        .count();
    if flagged > 0 {
        log::warn!(
            "{flagged} of {observations} observations have no interval: too many missing draws"
        );
    }

    let (link, missing_draws): (Vec<_>, Vec<_>) = rows.into_iter().unzip();
    let response = link
        .iter()
        .map(|summary| summary.back_transform(options.transform))
        .collect();

    log::info!(
        "summarized {observations} observations at {:.0}% interval level",
        options.interval_level * 100.0
    );

    Ok(PredictionSummary {
        link,
        response,
        missing_draws,
        draw_count: draws.draw_count(),
        interval_level: options.interval_level,
        transform: options.transform,
    })
}

fn summarize_observation(values: &[f64], options: &PredictionOptions) -> (ObservationSummary, usize) {
    let mut present: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
    let missing = values.len() - present.len();
    if present.is_empty() {
        return (ObservationSummary::MISSING, missing);
    }

    let (mean, sd) = mean_and_sample_sd(&present);
    let missing_fraction = usize_to_f64(missing) / usize_to_f64(values.len());
    if missing_fraction > options.missing_tolerance {
        return (
            ObservationSummary {
                mean,
                sd,
                lower: f64::NAN,
                upper: f64::NAN,
            },
            missing,
        );
    }

    present.sort_by(f64::total_cmp);
    let (lower_p, upper_p) = options.interval_probabilities();
    (
        ObservationSummary {
            mean,
            sd,
            lower: percentile(&present, lower_p),
            upper: percentile(&present, upper_p),
        },
        missing,
    )
}
