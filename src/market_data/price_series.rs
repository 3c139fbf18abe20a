use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Data types
// ---------------------------------------------------------------------------

/// A single daily OHLCV bar.
///
/// Prices the provider did not report are `None`; they are never coerced to
/// zero.  Present prices are guaranteed finite once the bar is part of a
/// [`PriceSeries`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub volume: u64,
}

#[cfg(test)]
impl PricePoint {
    /// Fully populated bar.
    pub fn new(date: NaiveDate, open: f64, high: f64, low: f64, close: f64, volume: u64) -> Self {
        Self {
            date,
            open: Some(open),
            high: Some(high),
            low: Some(low),
            close: Some(close),
            volume,
        }
    }
}

/// Reasons a sequence of bars cannot form a [`PriceSeries`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SeriesError {
    #[error("bar {index} dated {date} precedes the previous bar dated {previous}")]
    OutOfOrder {
        index: usize,
        date: NaiveDate,
        previous: NaiveDate,
    },

    #[error("bar {index} dated {date} has a non-finite {field} price")]
    NonFinite {
        index: usize,
        date: NaiveDate,
        field: &'static str,
    },
}

// ---------------------------------------------------------------------------
// PriceSeries -- validated, date-ordered bars
// ---------------------------------------------------------------------------

/// An ordered, validated sequence of daily bars.
///
/// Dates never go backwards.  Duplicate dates and calendar gaps are kept as
/// delivered; the series is not resampled.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PriceSeries {
    points: Vec<PricePoint>,
}

impl PriceSeries {
    /// Validate `points` and wrap them.
    pub fn new(points: Vec<PricePoint>) -> Result<Self, SeriesError> {
        for (index, point) in points.iter().enumerate() {
            let fields = [
                ("open", point.open),
                ("high", point.high),
                ("low", point.low),
                ("close", point.close),
            ];
            for (field, value) in fields {
                if matches!(value, Some(v) if !v.is_finite()) {
                    return Err(SeriesError::NonFinite {
                        index,
                        date: point.date,
                        field,
                    });
                }
            }

            if index > 0 {
                let previous = points[index - 1].date;
                if point.date < previous {
                    return Err(SeriesError::OutOfOrder {
                        index,
                        date: point.date,
                        previous,
                    });
                }
            }
        }

        Ok(Self { points })
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    /// High prices, absent values mapped to the undefined marker (NaN).
    pub fn highs(&self) -> Vec<f64> {
        self.column(|p| p.high)
    }

    /// Low prices, absent values mapped to the undefined marker (NaN).
    pub fn lows(&self) -> Vec<f64> {
        self.column(|p| p.low)
    }

    /// Close prices, absent values mapped to the undefined marker (NaN).
    pub fn closes(&self) -> Vec<f64> {
        self.column(|p| p.close)
    }

    pub fn volumes(&self) -> Vec<u64> {
        self.points.iter().map(|p| p.volume).collect()
    }

    fn column(&self, field: impl Fn(&PricePoint) -> Option<f64>) -> Vec<f64> {
        self.points
            .iter()
            .map(|p| field(p).unwrap_or(f64::NAN))
            .collect()
    }
}
