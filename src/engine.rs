// =============================================================================
// Indicator Engine — one pass over a price series
// =============================================================================
//
// Computes every indicator of the `tech` report from a validated
// `PriceSeries`.  The engine is synchronous and pure: it reads the series,
// never mutates it, and keeps no state between calls.
//
// Intermediate values are reported through an `IndicatorSink` passed in by
// the caller rather than logged from inside the calculations.
// =============================================================================

use serde::Serialize;
use tracing::debug;

use crate::config::IndicatorParams;
use crate::indicators::{
    adx, atr, bollinger, macd, moving_average, parabolic_sar, rsi, stochastic, BandPair,
    IndicatorSeries, SarState,
};
use crate::market_data::PriceSeries;

/// Number of leading values each sink event carries.
const TRACE_HEAD: usize = 5;

// =============================================================================
// Sinks
// =============================================================================

/// Receives every computed series, in computation order.
pub trait IndicatorSink {
    fn record(&self, name: &str, series: &IndicatorSeries);
}

/// Emits a structured `tracing` event per series with its first few values.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl IndicatorSink for TracingSink {
    fn record(&self, name: &str, series: &IndicatorSeries) {
        debug!(
            indicator = name,
            len = series.len(),
            defined = series.defined_count(),
            first_defined = ?series.first_defined(),
            head = ?series.head(TRACE_HEAD),
            last = ?series.len().checked_sub(1).and_then(|i| series.get(i)),
            "indicator computed"
        );
    }
}

/// Discards everything.
#[cfg(test)]
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

#[cfg(test)]
impl IndicatorSink for NullSink {
    fn record(&self, _name: &str, _series: &IndicatorSeries) {}
}

// =============================================================================
// IndicatorSet
// =============================================================================

/// All indicators of one computation, each aligned with the input series.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndicatorSet {
    pub sma: IndicatorSeries,
    pub ema: IndicatorSeries,
    pub rsi: IndicatorSeries,
    pub volume: Vec<u64>,
    pub bollinger_bands: BandPair,
    pub macd: IndicatorSeries,
    pub stochastic: IndicatorSeries,
    pub atr: IndicatorSeries,
    #[serde(rename = "parabolicSAR")]
    pub parabolic_sar: IndicatorSeries,
    pub adx: IndicatorSeries,
    /// Final Parabolic SAR state, for callers that continue the recurrence.
    #[serde(skip)]
    pub sar_state: Option<SarState>,
}

impl IndicatorSet {
    /// `true` when computed from an empty series.
    pub fn is_empty(&self) -> bool {
        self.sma.is_empty()
    }
}

// =============================================================================
// Engine
// =============================================================================

/// Compute every indicator for `series`.
///
/// An empty series short-circuits to an empty set.  Indicators whose window
/// exceeds the series length come back all-undefined without affecting the
/// others.
pub fn compute(series: &PriceSeries, params: &IndicatorParams, sink: &dyn IndicatorSink) -> IndicatorSet {
    if series.is_empty() {
        debug!("empty price series, skipping indicator computation");
        return IndicatorSet::default();
    }

    let highs = series.highs();
    let lows = series.lows();
    let closes = series.closes();

    let sma = moving_average::calculate_sma(&closes, params.sma_window);
    sink.record("sma", &sma);

    let ema = moving_average::calculate_ema(&closes, params.ema_window);
    sink.record("ema", &ema);

    let rsi = rsi::calculate_rsi(&closes, params.rsi_window);
    sink.record("rsi", &rsi);

    let bollinger_bands =
        bollinger::calculate_bollinger(&closes, params.bollinger_window, params.bollinger_num_std);
    sink.record("bollinger_upper", &bollinger_bands.upper);
    sink.record("bollinger_lower", &bollinger_bands.lower);

    let macd = macd::calculate_macd(&closes, params.macd_fast, params.macd_slow, params.macd_signal);
    sink.record("macd", &macd);

    let stochastic = stochastic::calculate_stochastic(
        &highs,
        &lows,
        &closes,
        params.stochastic_k,
        params.stochastic_d,
    );
    sink.record("stochastic", &stochastic);

    let atr = atr::calculate_atr(&highs, &lows, &closes, params.atr_window);
    sink.record("atr", &atr);

    let (parabolic_sar, sar_state) =
        parabolic_sar::calculate_parabolic_sar(&highs, &lows, &closes, &params.sar);
    sink.record("parabolic_sar", &parabolic_sar);
    if let Some(state) = &sar_state {
        debug!(trend = %state.trend, ep = state.ep, af = state.af, sar = state.sar, "parabolic SAR final state");
    }

    let adx = adx::calculate_adx(&highs, &lows, &closes, params.adx_window, params.adx_window);
    sink.record("adx", &adx);

    IndicatorSet {
        sma,
        ema,
        rsi,
        volume: series.volumes(),
        bollinger_bands,
        macd,
        stochastic,
        atr,
        parabolic_sar,
        adx,
        sar_state,
    }
}
