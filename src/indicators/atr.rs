// =============================================================================
// Average True Range (ATR) — simple rolling mean
// =============================================================================
//
// ATR measures market volatility by decomposing the entire range of a bar.
//
// True Range (TR) for each bar:
//   TR = max(H - L, |H - prevClose|, |L - prevClose|)
//
// The first bar has no previous close, so TR_0 is undefined.  ATR is the
// plain rolling mean of TR over `period` bars (default 14), which puts the
// first defined ATR at index `period`.
// =============================================================================

use super::series::{rolling_mean, IndicatorSeries};

/// Per-bar true range; index 0 is undefined.
///
/// `highs`, `lows` and `closes` must have equal length.
pub fn true_range(highs: &[f64], lows: &[f64], closes: &[f64]) -> Vec<f64> {
    let n = closes.len();
    let mut tr = vec![f64::NAN; n];
    for i in 1..n {
        let prev_close = closes[i - 1];
        let hl = highs[i] - lows[i];
        let hc = (highs[i] - prev_close).abs();
        let lc = (lows[i] - prev_close).abs();
        // f64::max ignores a NaN operand, so check definedness explicitly.
        if hl.is_finite() && hc.is_finite() && lc.is_finite() {
            tr[i] = hl.max(hc).max(lc);
        }
    }
    tr
}

/// Compute the ATR series, aligned with the input bars.
pub fn calculate_atr(highs: &[f64], lows: &[f64], closes: &[f64], period: usize) -> IndicatorSeries {
    rolling_mean(&true_range(highs, lows, closes), period).into()
}
