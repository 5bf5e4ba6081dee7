//! Posterior predictive summaries from MCMC draws.
//!
//! Fixed- and random-effect coefficient draws are aligned to their design
//! matrices by column label, combined into one linear predictor per
//! observation and draw, and reduced to a mean, standard deviation, and
//! empirical credible interval per observation. Under a log link the mean and
//! interval bounds are exponentiated.

pub mod align;
pub mod diagnostics;
pub mod effects;
pub mod posterior;
pub mod predictive;
pub mod report;
pub mod summary;
pub mod types;

pub use align::align_draws;
pub use diagnostics::{autocorrelation, effective_sample_size};
pub use effects::{DrawBlock, EffectGroup, FIXED_EFFECT, PredictionInputs, RandomEffectSpec};
pub use posterior::PosteriorDraws;
pub use predictive::{PredictiveDraws, compute_predictive_draws};
pub use report::{
    PredictionRecord, merge_with_covariates, render_summary_table, write_prediction_csv,
};
pub use summary::{ObservationSummary, PredictionSummary, predict, summarize_predictive_draws};
pub use types::{
    InputShapeError, MissingDataError, PredictionError, PredictionOptions, Transform,
};
