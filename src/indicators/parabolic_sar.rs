// =============================================================================
// Parabolic SAR — Stop And Reverse
// =============================================================================
//
// A two-state recurrence over (trend, extreme point, acceleration factor,
// SAR).  Each value depends on the previous one, so the series is produced by
// a strict left-to-right scan.
//
// Initial state (bar 0):
//   sar = close_0, trend = Up, ep = high_0, af = af_start
//
// Step (bar i >= 1):
//   sar = sar + af * (ep - sar)
//   Up:   new high above ep  => ep = high, af = min(af + af_step, af_max)
//         low below sar      => flip to Down, ep = low,  af = af_start, sar = ep
//   Down: new low below ep   => ep = low,  af = min(af + af_step, af_max)
//         high above sar     => flip to Up,   ep = high, af = af_start, sar = ep
//
// The extreme-point update happens before the reversal check, and the flip
// overwrites the formula value with the new extreme point.
// =============================================================================

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::trace;

use super::series::IndicatorSeries;

/// Acceleration-factor schedule.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SarParams {
    pub af_start: f64,
    pub af_step: f64,
    pub af_max: f64,
}

impl Default for SarParams {
    fn default() -> Self {
        Self {
            af_start: 0.02,
            af_step: 0.02,
            af_max: 0.2,
        }
    }
}

/// Direction the SAR is currently trailing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Trend {
    Up,
    Down,
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Up => write!(f, "Up"),
            Self::Down => write!(f, "Down"),
        }
    }
}

/// Full Parabolic SAR state after some number of bars.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SarState {
    pub trend: Trend,
    /// Extreme point: highest high in an uptrend, lowest low in a downtrend.
    pub ep: f64,
    /// Acceleration factor.
    pub af: f64,
    pub sar: f64,
}

impl SarState {
    /// State at bar 0.  Returns `None` when the bar's high or close is
    /// undefined.
    pub fn seed(high: f64, close: f64, params: &SarParams) -> Option<Self> {
        if !high.is_finite() || !close.is_finite() {
            return None;
        }
        Some(Self {
            trend: Trend::Up,
            ep: high,
            af: params.af_start,
            sar: close,
        })
    }

    /// Advance by one bar and return the new SAR value.
    ///
    /// A bar with an undefined high or low leaves the state untouched and
    /// returns NaN.
    pub fn step(&mut self, high: f64, low: f64, params: &SarParams) -> f64 {
        if !high.is_finite() || !low.is_finite() {
            return f64::NAN;
        }

        self.sar += self.af * (self.ep - self.sar);

        match self.trend {
            Trend::Up => {
                if high > self.ep {
                    self.ep = high;
                    self.af = (self.af + params.af_step).min(params.af_max);
                }
                if low < self.sar {
                    self.reverse(Trend::Down, low, params);
                }
            }
            Trend::Down => {
                if low < self.ep {
                    self.ep = low;
                    self.af = (self.af + params.af_step).min(params.af_max);
                }
                if high > self.sar {
                    self.reverse(Trend::Up, high, params);
                }
            }
        }

        self.sar
    }

    fn reverse(&mut self, trend: Trend, ep: f64, params: &SarParams) {
        trace!(from = %self.trend, to = %trend, sar = self.sar, ep, "SAR reversal");
        self.trend = trend;
        self.ep = ep;
        self.af = params.af_start;
        self.sar = ep;
    }
}

/// Scan the bars and return the SAR series together with the final state.
///
/// The state is `None` only when no bar could seed the recurrence (empty
/// input or undefined prices on every bar before a seed was found).  Bars
/// preceding the seed are undefined.
pub fn calculate_parabolic_sar(
    highs: &[f64],
    lows: &[f64],
    closes: &[f64],
    params: &SarParams,
) -> (IndicatorSeries, Option<SarState>) {
    let mut result = Vec::with_capacity(closes.len());
    let mut state: Option<SarState> = None;

    for i in 0..closes.len() {
        let value = match state.as_mut() {
            Some(s) => s.step(highs[i], lows[i], params),
            None => match SarState::seed(highs[i], closes[i], params) {
                Some(seeded) => {
                    state = Some(seeded);
                    seeded.sar
                }
                None => f64::NAN,
            },
        };
        result.push(value);
    }

    (result.into(), state)
}
