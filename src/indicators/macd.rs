// =============================================================================
// MACD Histogram
// =============================================================================
//
//   MACD line   = EMA(fast) - EMA(slow)
//   Signal line = EMA(signal) of the MACD line
//   Histogram   = MACD line - Signal line
//
// The exposed value is the histogram, not the MACD line.  Every EMA here is
// seeded with its first input, so the histogram is defined from index 0.
// =============================================================================

use super::series::{ema, IndicatorSeries};

/// The three MACD components, each aligned with the input closes.
#[derive(Debug, Clone, PartialEq)]
pub struct MacdComponents {
    pub line: Vec<f64>,
    pub signal: Vec<f64>,
    pub histogram: Vec<f64>,
}

/// Compute MACD line, signal line and histogram.
pub fn macd_components(closes: &[f64], fast: usize, slow: usize, signal: usize) -> MacdComponents {
    let fast_ema = ema(closes, fast);
    let slow_ema = ema(closes, slow);

    let line: Vec<f64> = fast_ema.iter().zip(&slow_ema).map(|(f, s)| f - s).collect();
    let signal_line = ema(&line, signal);
    let histogram = line.iter().zip(&signal_line).map(|(m, s)| m - s).collect();

    MacdComponents {
        line,
        signal: signal_line,
        histogram,
    }
}

/// The MACD histogram (MACD line minus signal line).
pub fn calculate_macd(closes: &[f64], fast: usize, slow: usize, signal: usize) -> IndicatorSeries {
    macd_components(closes, fast, slow, signal).histogram.into()
}
