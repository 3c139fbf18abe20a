// =============================================================================
// Bollinger Bands
// =============================================================================
//
// Bollinger Bands consist of a middle band (SMA), an upper band (SMA + k*σ),
// and a lower band (SMA - k*σ), where σ is the rolling population standard
// deviation over the same window.  A flat window has σ = 0 and both bands
// collapse onto the SMA.
// =============================================================================

use serde::Serialize;

use super::series::{rolling_mean, rolling_std, IndicatorSeries};

/// Upper and lower Bollinger bands aligned with the input closes.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BandPair {
    pub upper: IndicatorSeries,
    pub lower: IndicatorSeries,
}

/// Calculate Bollinger Bands for `closes`.
///
/// Both bands share the SMA's undefined prefix of `period - 1` values.
pub fn calculate_bollinger(closes: &[f64], period: usize, num_std: f64) -> BandPair {
    let middle = rolling_mean(closes, period);
    let std_dev = rolling_std(closes, period);

    let (upper, lower) = middle
        .iter()
        .zip(&std_dev)
        .map(|(&m, &s)| (m + num_std * s, m - num_std * s))
        .unzip::<_, _, Vec<f64>, Vec<f64>>();

    BandPair {
        upper: upper.into(),
        lower: lower.into(),
    }
}
