use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::PriceSeries;

/// Raw instrument metadata returned alongside a chart request.
///
/// Consumed verbatim by the price report; the indicator engine never reads it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TickerMeta {
    pub symbol: String,
    pub currency: Option<String>,
    pub exchange_name: Option<String>,
    pub regular_market_price: Option<f64>,
    pub fifty_two_week_high: Option<f64>,
    pub fifty_two_week_low: Option<f64>,
}

/// A single cash dividend event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dividend {
    pub date: NaiveDate,
    pub amount: f64,
}

/// Everything a chart request yields: metadata, daily bars and (optionally)
/// dividend events, oldest first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChartData {
    pub meta: TickerMeta,
    pub series: PriceSeries,
    pub dividends: Vec<Dividend>,
}

/// A headline returned by the provider's search endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsItem {
    pub title: String,
    pub publisher: Option<String>,
    pub link: Option<String>,
    pub provider_publish_time: Option<i64>,
}
