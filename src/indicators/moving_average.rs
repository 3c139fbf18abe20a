// =============================================================================
// Simple & Exponential Moving Averages
// =============================================================================
//
// SMA_t = mean(close_{t-period+1..=t})          (undefined for t < period - 1)
//
// multiplier = 2 / (period + 1)
// EMA_0      = close_0
// EMA_t      = close_t * multiplier + EMA_{t-1} * (1 - multiplier)
//
// The EMA is seeded with the first close rather than an SMA warm-up, so it is
// defined from index 0.
// =============================================================================

use super::series::{ema, rolling_mean, IndicatorSeries};

/// SMA of `closes` over `period`, aligned with the input.
pub fn calculate_sma(closes: &[f64], period: usize) -> IndicatorSeries {
    rolling_mean(closes, period).into()
}

/// EMA of `closes` over `period`, aligned with the input.
pub fn calculate_ema(closes: &[f64], period: usize) -> IndicatorSeries {
    ema(closes, period).into()
}
