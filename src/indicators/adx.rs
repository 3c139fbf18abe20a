// =============================================================================
// Average Directional Index (ADX)
// =============================================================================
//
// ADX quantifies trend **strength** regardless of direction.
//
// Calculation pipeline:
//   1. +DM_t = max(high_t - high_{t-1}, 0)
//      -DM_t = max(low_{t-1} - low_t, 0)          (both undefined at t = 0)
//   2. Smooth +DM and -DM with a rolling mean over `period`.
//   3. +DI = 100 * smoothed(+DM) / ATR(period)
//      -DI = 100 * smoothed(-DM) / ATR(period)
//   4. DX  = 100 * |+DI - -DI| / (+DI + -DI)
//   5. ADX = rolling mean of DX over `adx_period`.
//
// Each directional move is clamped on its own; there is no "larger move
// wins" comparison between +DM and -DM.
//
// Undefined prefix: DM and TR start at 1, the smoothed series at `period`,
// so the first defined ADX is at `period + adx_period - 1`.
//
// Interpretation:
//   ADX > 25  => trending market
//   ADX < 20  => ranging / choppy market
// =============================================================================

use super::atr::calculate_atr;
use super::series::{rolling_mean, saturating_ratio, IndicatorSeries};

/// Intermediate ADX stages, each aligned with the input bars.
#[derive(Debug, Clone, PartialEq)]
pub struct DirectionalIndex {
    pub plus_di: Vec<f64>,
    pub minus_di: Vec<f64>,
    pub dx: Vec<f64>,
}

/// Raw directional movement `(+DM, -DM)`; index 0 is undefined.
pub fn directional_movement(highs: &[f64], lows: &[f64]) -> (Vec<f64>, Vec<f64>) {
    let n = highs.len();
    let mut plus_dm = vec![f64::NAN; n];
    let mut minus_dm = vec![f64::NAN; n];

    for i in 1..n {
        let up_move = highs[i] - highs[i - 1];
        let down_move = lows[i - 1] - lows[i];
        if up_move.is_finite() {
            plus_dm[i] = up_move.max(0.0);
        }
        if down_move.is_finite() {
            minus_dm[i] = down_move.max(0.0);
        }
    }

    (plus_dm, minus_dm)
}

/// Compute +DI, -DI and DX.
pub fn directional_index(
    highs: &[f64],
    lows: &[f64],
    closes: &[f64],
    period: usize,
) -> DirectionalIndex {
    let (plus_dm, minus_dm) = directional_movement(highs, lows);
    let smooth_plus = rolling_mean(&plus_dm, period);
    let smooth_minus = rolling_mean(&minus_dm, period);
    let atr = calculate_atr(highs, lows, closes, period);

    let plus_di: Vec<f64> = smooth_plus
        .iter()
        .zip(atr.values())
        .map(|(&dm, &tr)| 100.0 * saturating_ratio(dm, tr, 1.0))
        .collect();
    let minus_di: Vec<f64> = smooth_minus
        .iter()
        .zip(atr.values())
        .map(|(&dm, &tr)| 100.0 * saturating_ratio(dm, tr, 1.0))
        .collect();
    let dx = plus_di
        .iter()
        .zip(&minus_di)
        .map(|(&p, &m)| 100.0 * saturating_ratio((p - m).abs(), p + m, 1.0))
        .collect();

    DirectionalIndex {
        plus_di,
        minus_di,
        dx,
    }
}

/// Compute the ADX series, aligned with the input bars.
pub fn calculate_adx(
    highs: &[f64],
    lows: &[f64],
    closes: &[f64],
    period: usize,
    adx_period: usize,
) -> IndicatorSeries {
    let di = directional_index(highs, lows, closes, period);
    rolling_mean(&di.dx, adx_period).into()
}
