//! Chain diagnostics for predictive draws.
//!
//! The effective sample size uses Geyer's initial monotone sequence: lag
//! autocorrelations are paired as `rho[2k] + rho[2k + 1]`, summed while the
//! pair sums stay positive, and each pair is capped by the one before it.

use super::predictive::PredictiveDraws;
use crate::utils::usize_to_f64;

/// Centered chain with its lag-0 sum of squares.
struct CenteredChain {
    deviations: Vec<f64>,
    sum_sq: f64,
}

impl CenteredChain {
    fn new(series: &[f64]) -> Option<Self> {
        if series.is_empty() {
            return None;
        }
        let mean = series.iter().sum::<f64>() / usize_to_f64(series.len());
        let deviations: Vec<f64> = series.iter().map(|value| value - mean).collect();
        let sum_sq = deviations.iter().map(|d| d * d).sum::<f64>();
        (sum_sq > 0.0).then_some(Self { deviations, sum_sq })
    }

    fn len(&self) -> usize {
        self.deviations.len()
    }

    fn rho(&self, lag: usize) -> f64 {
        if lag >= self.len() {
            return 0.0;
        }
        let cross: f64 = self
            .deviations
            .iter()
            .zip(&self.deviations[lag..])
            .map(|(a, b)| a * b)
            .sum();
        cross / self.sum_sq
    }

    /// Integrated autocorrelation time, floored at one.
    fn integrated_time(&self) -> f64 {
        let mut tau = -1.0;
        let mut previous = f64::INFINITY;
        let mut lag = 0;
        while lag + 1 < self.len() {
            let pair = self.rho(lag) + self.rho(lag + 1);
            if pair <= 0.0 {
                break;
            }
            let pair = pair.min(previous);
            tau = 2.0f64.mul_add(pair, tau);
            previous = pair;
            lag += 2;
        }
        tau.max(1.0)
    }
}

/// Lag-`k` autocorrelation of a draw sequence. Zero for empty or constant
/// input and for lags past the end.
#[must_use]
pub fn autocorrelation(series: &[f64], lag: usize) -> f64 {
    CenteredChain::new(series).map_or(0.0, |chain| chain.rho(lag))
}

/// Effective sample size of a draw sequence, never above its length.
#[must_use]
pub fn effective_sample_size(series: &[f64]) -> f64 {
    let n = usize_to_f64(series.len());
    CenteredChain::new(series).map_or(n, |chain| n / chain.integrated_time())
}

impl PredictiveDraws {
    /// Effective sample size of each observation's draws in chain order.
    /// Missing draws are dropped first, so a row with missing draws reports a
    /// size no larger than its count of present draws.
    #[must_use]
    pub fn effective_sample_sizes(&self) -> Vec<f64> {
        (0..self.observation_count())
            .map(|row| {
                let present: Vec<f64> = self
                    .observation(row)
                    .into_iter()
                    .filter(|value| !value.is_nan())
                    .collect();
                let size = effective_sample_size(&present);
                if size < 0.1 * usize_to_f64(present.len()) {
                    log::warn!(
                        "observation {row}: effective sample size {size:.1} from {} draws",
                        present.len()
                    );
                }
                size
            })
            .collect()
    }
}
