#![forbid(unsafe_code)]

//! # `smallarea_posterior`
//!
//! Posterior predictive summaries for small-area demographic models fitted by
//! MCMC: mortality rates by district, division, cause, and year.
//!
//! The sampler itself lives upstream. This crate takes its exported draws,
//! builds the design matrices they multiply, and turns them into
//! per-observation means, standard deviations, and credible intervals ready to
//! merge back into the observation table.
//!
//! ```
//! use faer::Mat;
//! use smallarea_posterior::{
//!     DesignMatrix, DrawMatrix, EffectGroup, PredictionInputs, PredictionOptions, predict,
//! };
//!
//! let design = DesignMatrix::new(vec!["(Intercept)".into()], Mat::from_fn(3, 1, |_i, _j| 1.0))
//!     .expect("valid design");
//! let draws = DrawMatrix::from_rows(["(Intercept)"], &[vec![1.0], vec![2.0], vec![3.0], vec![4.0]])
//!     .expect("valid draws");
//! let inputs = PredictionInputs::new(EffectGroup::fixed(design, draws));
//! let options = PredictionOptions { interval_level: 0.5, ..PredictionOptions::default() };
//!
//! let summary = predict(&inputs, &options).expect("prediction");
//! assert!((summary.response[0].mean - 2.5).abs() < 1e-12);
//! assert!((summary.response[0].lower - 1.75).abs() < 1e-12);
//! ```

pub mod inference;
pub mod input;
pub mod prediction;
pub mod preprocess;
pub mod utils;

pub use inference::{InferenceError, RetentionSchedule};
pub use input::{
    CovariateRecord, DesignMatrix, DrawMatrix, Factor, FixedDesignSpec, InputError,
    LabeledMatrix, build_fixed_design, build_random_design, read_covariates_csv,
};
pub use preprocess::{Standardization, column_has_variation, constant_columns, standardize};

pub use prediction::{
    DrawBlock, EffectGroup, FIXED_EFFECT, InputShapeError, MissingDataError, ObservationSummary,
    PosteriorDraws, PredictionError, PredictionInputs, PredictionOptions, PredictionRecord,
    PredictionSummary, PredictiveDraws, RandomEffectSpec, Transform, align_draws,
    autocorrelation, compute_predictive_draws, effective_sample_size, merge_with_covariates,
    predict, render_summary_table, summarize_predictive_draws, write_prediction_csv,
};
