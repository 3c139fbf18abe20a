// =============================================================================
// Series Primitives
// =============================================================================
//
// Leaf transforms every indicator is composed from.  All of them return a
// vector aligned index-for-index with the input, using NaN as the undefined
// marker.
//
// Boundary rule for windowed transforms: index i is defined only when all of
// input[i-window+1..=i] are defined.  The divisor is always `window`; partial
// windows are never averaged.
// =============================================================================

use serde::{Serialize, Serializer};

// =============================================================================
// IndicatorSeries
// =============================================================================

/// An indicator's output, aligned with the price series it was computed from.
///
/// Undefined elements are stored as NaN and serialise to JSON `null`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndicatorSeries(Vec<f64>);

impl IndicatorSeries {
    pub fn new(values: Vec<f64>) -> Self {
        Self(values)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn values(&self) -> &[f64] {
        &self.0
    }

    /// The value at `index`, or `None` when undefined or out of range.
    pub fn get(&self, index: usize) -> Option<f64> {
        self.0.get(index).copied().filter(|v| v.is_finite())
    }

    /// Index of the first defined value.
    pub fn first_defined(&self) -> Option<usize> {
        self.0.iter().position(|v| v.is_finite())
    }

    pub fn defined_count(&self) -> usize {
        self.0.iter().filter(|v| v.is_finite()).count()
    }

    /// Up to `n` leading elements as options, for log output.
    pub fn head(&self, n: usize) -> Vec<Option<f64>> {
        self.0
            .iter()
            .take(n)
            .map(|v| v.is_finite().then_some(*v))
            .collect()
    }
}

impl From<Vec<f64>> for IndicatorSeries {
    fn from(values: Vec<f64>) -> Self {
        Self::new(values)
    }
}

impl Serialize for IndicatorSeries {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.0.iter().map(|v| v.is_finite().then_some(*v)))
    }
}

// =============================================================================
// Windowed primitives
// =============================================================================

/// Simple (equal-weight) rolling mean.
pub fn rolling_mean(values: &[f64], window: usize) -> Vec<f64> {
    rolling(values, window, |slice| {
        slice.iter().sum::<f64>() / window as f64
    })
}

/// Rolling population standard deviation (divisor `window`).
pub fn rolling_std(values: &[f64], window: usize) -> Vec<f64> {
    rolling(values, window, |slice| {
        let mean = slice.iter().sum::<f64>() / window as f64;
        let variance = slice.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / window as f64;
        variance.sqrt()
    })
}

pub fn rolling_min(values: &[f64], window: usize) -> Vec<f64> {
    rolling(values, window, |slice| {
        slice.iter().copied().fold(f64::INFINITY, f64::min)
    })
}

pub fn rolling_max(values: &[f64], window: usize) -> Vec<f64> {
    rolling(values, window, |slice| {
        slice.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    })
}

/// Apply `reduce` to every full, fully-defined window.
fn rolling(values: &[f64], window: usize, reduce: impl Fn(&[f64]) -> f64) -> Vec<f64> {
    let mut result = vec![f64::NAN; values.len()];
    if window == 0 || values.len() < window {
        return result;
    }

    for (offset, slice) in values.windows(window).enumerate() {
        if slice.iter().all(|v| v.is_finite()) {
            result[offset + window - 1] = reduce(slice);
        }
    }
    result
}

// =============================================================================
// Exponential moving average
// =============================================================================

/// Exponential moving average with `alpha = 2 / (window + 1)`.
///
/// Seeded with the first element of the input (no SMA warm-up), so every
/// index is defined.  An undefined input yields an undefined output at that
/// index and leaves the recurrence untouched.
pub fn ema(values: &[f64], window: usize) -> Vec<f64> {
    if window == 0 {
        return vec![f64::NAN; values.len()];
    }

    let alpha = 2.0 / (window as f64 + 1.0);
    let mut prev: Option<f64> = None;

    values
        .iter()
        .map(|&value| {
            if !value.is_finite() {
                return f64::NAN;
            }
            let next = match prev {
                None => value,
                Some(p) => alpha * value + (1.0 - alpha) * p,
            };
            prev = Some(next);
            next
        })
        .collect()
}

// =============================================================================
// Division guard
// =============================================================================

/// `num / den` under the engine-wide zero-denominator rule.
///
/// - `den == 0` and `num > 0` saturates to `bound`.
/// - `0 / 0` is undefined (NaN).
/// - Any undefined operand gives an undefined result.
pub fn saturating_ratio(num: f64, den: f64, bound: f64) -> f64 {
    if !num.is_finite() || !den.is_finite() {
        return f64::NAN;
    }
    if den == 0.0 {
        return if num > 0.0 { bound } else { f64::NAN };
    }
    num / den
}
