// =============================================================================
// Technical Indicators Module
// =============================================================================
//
// Pure, side-effect-free implementations of the indicators in the `tech`
// report.  Every function takes price columns as slices and returns a series
// aligned index-for-index with its input, using NaN as the undefined marker.

pub mod adx;
pub mod atr;
pub mod bollinger;
pub mod macd;
pub mod moving_average;
pub mod parabolic_sar;
pub mod rsi;
pub mod series;
pub mod stochastic;

pub use bollinger::BandPair;
pub use parabolic_sar::{SarParams, SarState};
pub use series::IndicatorSeries;
