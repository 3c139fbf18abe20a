// =============================================================================
// Stochastic Oscillator (%D line)
// =============================================================================
//
//   %K_t = 100 * (close_t - lowest_low_k) / (highest_high_k - lowest_low_k)
//   %D_t = SMA(%K, d_period)
//
// Only the smoothed %D line is exposed.  The first defined %D index is
// `k_period + d_period - 2`.
//
// A flat look-back range (highest high == lowest low) forces the close onto
// the range as well, giving 0 / 0; that %K is undefined and poisons the %D
// windows that contain it.
// =============================================================================

use super::series::{rolling_max, rolling_mean, rolling_min, saturating_ratio, IndicatorSeries};

/// Raw %K line, aligned with the input bars.
pub fn percent_k(highs: &[f64], lows: &[f64], closes: &[f64], k_period: usize) -> Vec<f64> {
    let lowest = rolling_min(lows, k_period);
    let highest = rolling_max(highs, k_period);

    closes
        .iter()
        .zip(lowest.iter().zip(&highest))
        .map(|(&close, (&lo, &hi))| 100.0 * saturating_ratio(close - lo, hi - lo, 1.0))
        .collect()
}

/// Smoothed %D line of the stochastic oscillator.
pub fn calculate_stochastic(
    highs: &[f64],
    lows: &[f64],
    closes: &[f64],
    k_period: usize,
    d_period: usize,
) -> IndicatorSeries {
    rolling_mean(&percent_k(highs, lows, closes, k_period), d_period).into()
}
