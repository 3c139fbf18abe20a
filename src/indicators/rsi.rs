// =============================================================================
// Relative Strength Index (RSI) — simple-average variant
// =============================================================================
//
// RSI measures the speed and magnitude of recent price changes to evaluate
// whether an instrument is overbought or oversold.
//
// Step 1 — delta_t = close_t - close_{t-1}   (undefined at t = 0)
// Step 2 — gain_t  = max(delta_t, 0),  loss_t = max(-delta_t, 0)
// Step 3 — avg_gain / avg_loss = rolling mean of gain / loss over `period`
// Step 4 — RS  = avg_gain / avg_loss
//          RSI = 100 - 100 / (1 + RS)
//
// The averages are plain rolling means, not Wilder's smoothing, and need
// `period` deltas, so the first `period` values are undefined.
// =============================================================================

use super::series::{rolling_mean, IndicatorSeries};

/// Upper bound of the RSI scale.
const RSI_MAX: f64 = 100.0;

/// Compute the RSI series for `closes`, aligned with the input.
///
/// # Edge cases
/// - `period == 0` or fewer than `period + 1` closes => all undefined.
/// - Average loss of zero with a positive average gain saturates to 100.
/// - Average loss and average gain both zero (flat window) => undefined.
pub fn calculate_rsi(closes: &[f64], period: usize) -> IndicatorSeries {
    let n = closes.len();
    let mut gains = vec![f64::NAN; n];
    let mut losses = vec![f64::NAN; n];

    for i in 1..n {
        let delta = closes[i] - closes[i - 1];
        if delta.is_finite() {
            gains[i] = delta.max(0.0);
            losses[i] = (-delta).max(0.0);
        }
    }

    let avg_gain = rolling_mean(&gains, period);
    let avg_loss = rolling_mean(&losses, period);

    avg_gain
        .iter()
        .zip(&avg_loss)
        .map(|(&gain, &loss)| rsi_from_averages(gain, loss))
        .collect::<Vec<_>>()
        .into()
}

// =============================================================================
// Internal helpers
// =============================================================================

/// Convert average gain / average loss into an RSI value in [0, 100].
fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if !avg_gain.is_finite() || !avg_loss.is_finite() {
        return f64::NAN;
    }
    if avg_loss == 0.0 {
        // Infinite RS: saturate, unless there was no movement at all.
        return if avg_gain > 0.0 { RSI_MAX } else { f64::NAN };
    }
    let rs = avg_gain / avg_loss;
    RSI_MAX - RSI_MAX / (1.0 + rs)
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    // ---- calculate_rsi ---------------------------------------------------

    #[test]
    fn rsi_empty_input() {
        assert!(calculate_rsi(&[], 14).is_empty());
    }

    #[test]
    fn rsi_period_zero() {
        let rsi = calculate_rsi(&[1.0, 2.0, 3.0], 0);
        assert_eq!(rsi.len(), 3);
        assert_eq!(rsi.defined_count(), 0);
    }

    #[test]
    fn rsi_insufficient_data() {
        // 14 closes => 13 deltas < 14.
        let closes: Vec<f64> = (1..=14).map(|x| x as f64).collect();
        assert_eq!(calculate_rsi(&closes, 14).defined_count(), 0);
    }

    #[test]
    fn rsi_undefined_prefix_is_period() {
        let closes: Vec<f64> = (0..30).map(|i| 100.0 + (i as f64 * 0.7).sin()).collect();
        let rsi = calculate_rsi(&closes, 14);
        assert_eq!(rsi.len(), 30);
        assert_eq!(rsi.first_defined(), Some(14));
        assert_eq!(rsi.defined_count(), 16);
    }

    #[test]
    fn rsi_all_gains_saturates() {
        let closes: Vec<f64> = (1..=30).map(|x| x as f64).collect();
        let rsi = calculate_rsi(&closes, 14);
        for &v in &rsi.values()[14..] {
            assert_eq!(v, 100.0);
        }
    }

    #[test]
    fn rsi_all_losses() {
        let closes: Vec<f64> = (1..=30).rev().map(|x| x as f64).collect();
        let rsi = calculate_rsi(&closes, 14);
        for &v in &rsi.values()[14..] {
            assert!(v.abs() < 1e-10, "expected 0.0, got {v}");
        }
    }

    #[test]
    fn rsi_flat_market_is_undefined() {
        let rsi = calculate_rsi(&[100.0; 30], 14);
        assert_eq!(rsi.defined_count(), 0);
        assert!(rsi.values().iter().all(|v| v.is_nan()));
    }

    #[test]
    fn rsi_known_value() {
        // Deltas: +1, -1, +2, -1 => avg gain 0.75, avg loss 0.5 over 4.
        let closes = vec![10.0, 11.0, 10.0, 12.0, 11.0];
        let rsi = calculate_rsi(&closes, 4);
        let expected = 100.0 - 100.0 / (1.0 + 0.75 / 0.5);
        assert!((rsi.values()[4] - expected).abs() < 1e-10);
    }

    #[test]
    fn rsi_range_check() {
        let closes = vec![
            44.34, 44.09, 44.15, 43.61, 44.33, 44.83, 45.10, 45.42, 45.84, 46.08,
            45.89, 46.03, 44.18, 44.22, 44.57, 43.42, 42.66, 43.13,
        ];
        let rsi = calculate_rsi(&closes, 14);
        assert!(rsi.defined_count() > 0);
        for v in rsi.values().iter().filter(|v| v.is_finite()) {
            assert!((0.0..=100.0).contains(v), "RSI {v} out of range");
        }
    }
}
