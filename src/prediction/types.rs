//! Core public types for posterior prediction.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::inference::{InferenceError, RetentionSchedule};
use crate::input::InputError;

/// Design/draw dimension or label mismatches. Identifies the offending effect.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InputShapeError {
    #[error("effect `{effect}`: design has {design_cols} columns but draws have {draw_cols}")]
    ColumnCountMismatch {
        effect: String,
        design_cols: usize,
        draw_cols: usize,
    },
    #[error("effect `{effect}`: design column `{label}` has no matching draw column")]
    UnmatchedLabel { effect: String, label: String },
    #[error("effect `{effect}`: design has {found} rows; expected {expected} observations")]
    ObservationCountMismatch {
        effect: String,
        expected: usize,
        found: usize,
    },
    #[error("effect `{effect}`: found {found} draws; expected {expected}")]
    DrawCountMismatch {
        effect: String,
        expected: usize,
        found: usize,
    },
}

/// Required upstream artifacts that are absent.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MissingDataError {
    #[error("posterior draws for effect `{0}` are missing")]
    Effect(String),
    #[error("effect group `{0}` has no draw blocks")]
    EmptyGroup(String),
    #[error("effect `{0}` has no retained draws")]
    NoRetainedDraws(String),
}

/// Errors returned by prediction configuration, validation, and computation.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PredictionError {
    #[error(transparent)]
    InvalidInput(#[from] InputError),
    #[error(transparent)]
    InvalidSchedule(#[from] InferenceError),
    #[error(transparent)]
    InputShape(#[from] InputShapeError),
    #[error(transparent)]
    MissingData(#[from] MissingDataError),
    #[error("interval level must lie strictly between 0 and 1; found {0}")]
    InvalidIntervalLevel(f64),
    #[error("missing-value tolerance must lie in [0, 1]; found {0}")]
    InvalidMissingTolerance(f64),
    #[error("invalid prediction configuration: {0}")]
    InvalidConfig(String),
}

/// Link applied to the modeled response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transform {
    /// Summaries are reported on the linear-predictor scale.
    #[default]
    Identity,
    /// Mean and interval bounds are exponentiated; the standard deviation is
    /// reported on the linear-predictor scale.
    Log,
}

impl Transform {
    #[must_use]
    pub fn inverse(self, value: f64) -> f64 {
        match self {
            Self::Identity => value,
            Self::Log => value.exp(),
        }
    }
}

/// Configuration for predictive summaries.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PredictionOptions {
    /// Credible interval coverage in `(0, 1)`.
    pub interval_level: f64,
    pub transform: Transform,
    /// Largest fraction of missing draws an observation may have before its
    /// interval bounds are reported as `NaN`.
    pub missing_tolerance: f64,
    /// Evaluate draws and observations on the rayon thread pool.
    pub parallel: bool,
    pub retention: RetentionSchedule,
}

impl Default for PredictionOptions {
    fn default() -> Self {
        Self {
            interval_level: 0.95,
            transform: Transform::Identity,
            missing_tolerance: 1.0,
            parallel: false,
            retention: RetentionSchedule::default(),
        }
    }
}

impl PredictionOptions {
    /// # Errors
    ///
    /// Returns `PredictionError` if the interval level or tolerance is out of range.
    pub fn validate(self) -> Result<(), PredictionError> {
        if !(self.interval_level > 0.0 && self.interval_level < 1.0) {
            return Err(PredictionError::InvalidIntervalLevel(self.interval_level));
        }
        if !(0.0..=1.0).contains(&self.missing_tolerance) {
            return Err(PredictionError::InvalidMissingTolerance(
                self.missing_tolerance,
            ));
        }
        if self.retention.thin == 0 {
            return Err(InferenceError::InvalidThinning.into());
        }
        Ok(())
    }

    /// Parse options from TOML. Missing keys take their defaults.
    ///
    /// # Errors
    ///
    /// Returns `PredictionError` if the TOML is malformed, names unknown keys,
    /// or describes invalid options.
    pub fn from_toml_str(source: &str) -> Result<Self, PredictionError> {
        let options: Self =
            toml::from_str(source).map_err(|err| PredictionError::InvalidConfig(err.to_string()))?;
        options.validate()?;
        Ok(options)
    }

    /// Lower and upper quantile probabilities of the credible interval.
    #[must_use]
    pub fn interval_probabilities(self) -> (f64, f64) {
        let alpha = 1.0 - self.interval_level;
        (alpha / 2.0, 1.0 - alpha / 2.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn default_options_are_valid() {
        assert!(PredictionOptions::default().validate().is_ok());
    }

    #[test]
    fn validate_rejects_interval_level_bounds() {
        for level in [0.0, 1.0, -0.1, f64::NAN] {
            let options = PredictionOptions {
                interval_level: level,
                ..PredictionOptions::default()
            };
            assert!(matches!(
                options.validate(),
                Err(PredictionError::InvalidIntervalLevel(_))
            ));
        }
    }

    #[test]
    fn validate_rejects_tolerance_out_of_range() {
        let options = PredictionOptions {
            missing_tolerance: 1.5,
            ..PredictionOptions::default()
        };
        assert_eq!(
            options.validate(),
            Err(PredictionError::InvalidMissingTolerance(1.5))
        );
    }

    #[test]
    fn toml_overrides_defaults() {
        let options = PredictionOptions::from_toml_str(
            r#"
            interval_level = 0.9
            transform = "log"

            [retention]
            burn_in = 100
            thin = 2
            "#,
        )
        .expect("toml should parse");
        assert_relative_eq!(options.interval_level, 0.9);
        assert_eq!(options.transform, Transform::Log);
        assert_relative_eq!(options.missing_tolerance, 1.0);
        assert_eq!(
            options.retention,
            RetentionSchedule {
                burn_in: 100,
                thin: 2
            }
        );
    }

    #[test]
    fn toml_rejects_unknown_keys() {
        let err = PredictionOptions::from_toml_str("level = 0.9").expect_err("unknown key");
        assert!(matches!(err, PredictionError::InvalidConfig(_)));
    }

    #[test]
    fn toml_rejects_unknown_transform() {
        let err =
            PredictionOptions::from_toml_str(r#"transform = "logit""#).expect_err("bad transform");
        assert!(matches!(err, PredictionError::InvalidConfig(_)));
    }

    #[test]
    fn interval_probabilities_are_symmetric() {
        let options = PredictionOptions {
            interval_level: 0.5,
            ..PredictionOptions::default()
        };
        let (lower, upper) = options.interval_probabilities();
        assert_relative_eq!(lower, 0.25);
        assert_relative_eq!(upper, 0.75);
    }

    #[test]
    fn log_transform_exponentiates() {
        assert_relative_eq!(Transform::Log.inverse(0.0), 1.0);
        assert_relative_eq!(Transform::Identity.inverse(2.5), 2.5);
    }
}
