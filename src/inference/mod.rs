//! Retention of MCMC draws produced by an upstream sampler.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors for draw retention schedules.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum InferenceError {
    #[error("thinning interval must be positive")]
    InvalidThinning,
    #[error("burn-in ({burn_in}) must be smaller than the number of draws ({draws})")]
    BurnInExceedsDraws { burn_in: usize, draws: usize },
}

/// Burn-in and thinning applied to stored draws before prediction.
///
/// The default keeps every draw, which is the right choice when the sampler
/// already discarded its own warm-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RetentionSchedule {
    pub burn_in: usize,
    pub thin: usize,
}

impl Default for RetentionSchedule {
    fn default() -> Self {
        Self {
            burn_in: 0,
            thin: 1,
        }
    }
}

impl RetentionSchedule {
    /// # Errors
    ///
    /// Returns `InferenceError` if the schedule keeps no draws out of `draws`.
    pub const fn validate(self, draws: usize) -> Result<(), InferenceError> {
        if self.thin == 0 {
            return Err(InferenceError::InvalidThinning);
        }
        if self.burn_in >= draws {
            return Err(InferenceError::BurnInExceedsDraws {
                burn_in: self.burn_in,
                draws,
            });
        }
        Ok(())
    }

    /// Number of draws kept out of `draws`.
    #[must_use]
    pub const fn retained_draws(self, draws: usize) -> usize {
        if self.thin == 0 || self.burn_in >= draws {
            0
        } else {
            (draws - self.burn_in).div_ceil(self.thin)
        }
    }

    /// Row indices kept out of `draws`, in chain order.
    #[must_use]
    pub fn retained_indices(self, draws: usize) -> Vec<usize> {
        if self.thin == 0 {
            return Vec::new();
        }
        (self.burn_in..draws).step_by(self.thin).collect()
    }

    #[must_use]
    pub const fn keeps_all(self) -> bool {
        self.burn_in == 0 && self.thin == 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schedule_validation_rejects_zero_thinning() {
        let schedule = RetentionSchedule {
            thin: 0,
            ..RetentionSchedule::default()
        };
        assert_eq!(schedule.validate(10), Err(InferenceError::InvalidThinning));
    }

    #[test]
    fn schedule_validation_rejects_burn_in_past_end() {
        let schedule = RetentionSchedule {
            burn_in: 10,
            thin: 1,
        };
        assert_eq!(
            schedule.validate(10),
            Err(InferenceError::BurnInExceedsDraws {
                burn_in: 10,
                draws: 10
            })
        );
    }

    #[test]
    fn retained_indices_skip_burn_in_and_thin() {
        let schedule = RetentionSchedule {
            burn_in: 2,
            thin: 3,
        };
        assert_eq!(schedule.retained_indices(10), vec![2, 5, 8]);
        assert_eq!(schedule.retained_draws(10), 3);
    }

    #[test]
    fn default_schedule_keeps_everything() {
        let schedule = RetentionSchedule::default();
        assert!(schedule.keeps_all());
        assert_eq!(schedule.retained_indices(4), vec![0, 1, 2, 3]);
        assert_eq!(schedule.retained_draws(4), 4);
    }
}
