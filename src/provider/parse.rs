// =============================================================================
// Yahoo Finance response parsing
// =============================================================================
//
// Pure functions from raw JSON bodies to domain types, kept apart from the
// HTTP client so they can be exercised without network access.
// =============================================================================

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate};
use serde_json::Value;
use tracing::{debug, warn};

use crate::market_data::{ChartData, Dividend, NewsItem, PricePoint, PriceSeries, TickerMeta};

/// Parse a `/v8/finance/chart` response.
///
/// Bar dates are shifted by the exchange's GMT offset so that each bar lands
/// on its trading day.  Missing OHLC values stay `None`; a missing volume is
/// recorded as 0.
pub fn parse_chart(body: &Value) -> Result<ChartData> {
    let chart = body.get("chart").context("chart response missing 'chart'")?;
    if let Some(err) = chart.get("error").filter(|e| !e.is_null()) {
        anyhow::bail!("chart request rejected: {}", provider_error(err));
    }

    let result = chart
        .get("result")
        .and_then(Value::as_array)
        .and_then(|r| r.first())
        .context("chart response has no result")?;

    let meta_raw = result.get("meta").context("chart result missing 'meta'")?;
    let gmt_offset = meta_raw.get("gmtoffset").and_then(Value::as_i64).unwrap_or(0);
    let meta = TickerMeta {
        symbol: meta_raw
            .get("symbol")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        currency: meta_raw.get("currency").and_then(Value::as_str).map(str::to_string),
        exchange_name: meta_raw
            .get("exchangeName")
            .and_then(Value::as_str)
            .map(str::to_string),
        regular_market_price: meta_raw.get("regularMarketPrice").and_then(Value::as_f64),
        fifty_two_week_high: meta_raw.get("fiftyTwoWeekHigh").and_then(Value::as_f64),
        fifty_two_week_low: meta_raw.get("fiftyTwoWeekLow").and_then(Value::as_f64),
    };

    // A symbol with no trading history returns no timestamp array at all.
    // Entries stay positional so each one keeps its OHLC columns.
    let timestamps: Vec<Option<i64>> = result
        .get("timestamp")
        .and_then(Value::as_array)
        .map(|ts| ts.iter().map(Value::as_i64).collect())
        .unwrap_or_default();

    let quote = result
        .pointer("/indicators/quote/0")
        .cloned()
        .unwrap_or(Value::Null);
    let column = |name: &str| -> Vec<Option<f64>> {
        quote
            .get(name)
            .and_then(Value::as_array)
            .map(|vals| vals.iter().map(Value::as_f64).collect())
            .unwrap_or_default()
    };
    let opens = column("open");
    let highs = column("high");
    let lows = column("low");
    let closes = column("close");
    let volumes: Vec<Option<u64>> = quote
        .get("volume")
        .and_then(Value::as_array)
        .map(|vals| vals.iter().map(Value::as_u64).collect())
        .unwrap_or_default();

    let mut points = Vec::with_capacity(timestamps.len());
    for (i, &ts) in timestamps.iter().enumerate() {
        let Some(ts) = ts else {
            warn!(index = i, "skipping bar with non-integer timestamp");
            continue;
        };
        let Some(date) = trading_date(ts, gmt_offset) else {
            warn!(timestamp = ts, "skipping bar with out-of-range timestamp");
            continue;
        };
        let at = |col: &[Option<f64>]| col.get(i).copied().flatten();
        let volume = volumes.get(i).copied().flatten().unwrap_or_else(|| {
            debug!(%date, "bar has no volume, recording 0");
            0
        });
        points.push(PricePoint {
            date,
            open: at(&opens),
            high: at(&highs),
            low: at(&lows),
            close: at(&closes),
            volume,
        });
    }

    let series = PriceSeries::new(points).context("chart bars do not form a valid series")?;

    let mut dividends: Vec<Dividend> = result
        .pointer("/events/dividends")
        .and_then(Value::as_object)
        .map(|events| {
            events
                .values()
                .filter_map(|ev| {
                    let amount = ev.get("amount").and_then(Value::as_f64)?;
                    let ts = ev.get("date").and_then(Value::as_i64)?;
                    Some(Dividend {
                        date: trading_date(ts, gmt_offset)?,
                        amount,
                    })
                })
                .collect()
        })
        .unwrap_or_default();
    dividends.sort_by_key(|d| d.date);

    Ok(ChartData {
        meta,
        series,
        dividends,
    })
}

/// Extract the first result of a `/v10/finance/quoteSummary` response.
pub fn parse_quote_summary(body: &Value) -> Result<Value> {
    let summary = body
        .get("quoteSummary")
        .context("quote summary response missing 'quoteSummary'")?;
    if let Some(err) = summary.get("error").filter(|e| !e.is_null()) {
        anyhow::bail!("quote summary request rejected: {}", provider_error(err));
    }
    summary
        .get("result")
        .and_then(Value::as_array)
        .and_then(|r| r.first())
        .cloned()
        .context("quote summary response has no result")
}

/// Parse the `news` array of a `/v1/finance/search` response.
pub fn parse_news(body: &Value, limit: usize) -> Vec<NewsItem> {
    body.get("news")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| serde_json::from_value::<NewsItem>(item.clone()).ok())
                .take(limit)
                .collect()
        })
        .unwrap_or_default()
}

/// Read a quote-summary field, which Yahoo wraps as `{"raw": .., "fmt": ..}`.
pub fn raw_number(module: &Value, field: &str) -> Option<f64> {
    let value = module.get(field)?;
    value
        .get("raw")
        .and_then(Value::as_f64)
        .or_else(|| value.as_f64())
}

fn trading_date(timestamp: i64, gmt_offset: i64) -> Option<NaiveDate> {
    DateTime::from_timestamp(timestamp + gmt_offset, 0).map(|dt| dt.date_naive())
}

fn provider_error(err: &Value) -> String {
    err.get("description")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| err.to_string())
}
