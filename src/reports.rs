// =============================================================================
// Reports — per-ticker JSON payloads
// =============================================================================
//
// `run_report` is the boundary of the crate: it fetches what the requested
// report needs, builds the payload and always returns a JSON object.  Any
// failure is logged and turned into `{}`.
//
// The builders below are pure so they can be tested against fixtures.
// =============================================================================

use serde_json::{json, Map, Value};
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::engine::{self, IndicatorSet, TracingSink};
use crate::market_data::{ChartData, Dividend, NewsItem};
use crate::provider::parse::raw_number;
use crate::provider::YahooClient;
use crate::types::ReportKind;

/// Chart range used for the latest-quote report.
const PRICE_RANGE: &str = "5d";
/// Chart range used to collect the full dividend history.
const DIVIDEND_RANGE: &str = "max";

const FUNDAMENTAL_MODULES: [&str; 3] = ["summaryDetail", "defaultKeyStatistics", "financialData"];
const EARNINGS_MODULES: [&str; 1] = ["earnings"];

/// Produce the `kind` report for `symbol`.
pub async fn run_report(kind: ReportKind, symbol: &str, client: &YahooClient, config: &AppConfig) -> Value {
    let result = match kind {
        ReportKind::Price => client
            .get_chart(symbol, PRICE_RANGE, false)
            .await
            .map(|chart| price_report(symbol, &chart)),
        ReportKind::Fundamentals => client
            .get_quote_summary(symbol, &FUNDAMENTAL_MODULES)
            .await
            .map(|summary| fundamentals_report(symbol, &summary)),
        ReportKind::Tech => client
            .get_chart(symbol, &config.provider.lookback_range, false)
            .await
            .map(|chart| {
                let set = engine::compute(&chart.series, &config.indicators, &TracingSink);
                tech_report(symbol, &set)
            }),
        ReportKind::News => client
            .get_news(symbol, config.provider.news_count)
            .await
            .map(|news| news_report(symbol, &news)),
        ReportKind::Dividends => client
            .get_chart(symbol, DIVIDEND_RANGE, true)
            .await
            .map(|chart| dividends_report(symbol, &chart.dividends)),
        ReportKind::Earnings => client
            .get_quote_summary(symbol, &EARNINGS_MODULES)
            .await
            .map(|summary| earnings_report(symbol, &summary)),
    };

    match result {
        Ok(report) => {
            info!(%kind, symbol, empty = is_empty_object(&report), "report built");
            report
        }
        Err(e) => {
            warn!(%kind, symbol, error = %format!("{e:#}"), "report failed, returning empty result");
            empty()
        }
    }
}

// =============================================================================
// Builders
// =============================================================================

/// Latest bar of the chart plus 52-week range.
pub fn price_report(symbol: &str, chart: &ChartData) -> Value {
    let Some(latest) = chart.series.points().iter().rev().find(|p| p.close.is_some()) else {
        return empty();
    };

    let (change, change_percent) = match (latest.close, latest.open) {
        (Some(close), Some(open)) if open != 0.0 => {
            (Some(close - open), Some((close - open) / open * 100.0))
        }
        (Some(close), Some(open)) => (Some(close - open), None),
        _ => (None, None),
    };

    json!({
        "symbol": symbol,
        "price": latest.close,
        "change": change,
        "changePercent": change_percent,
        "open": latest.open,
        "high": latest.high,
        "low": latest.low,
        "volume": latest.volume,
        "fiftyTwoWeekHigh": chart.meta.fifty_two_week_high,
        "fiftyTwoWeekLow": chart.meta.fifty_two_week_low,
    })
}

/// Key ratios and analyst targets; absent values are `"N/A"`.
pub fn fundamentals_report(symbol: &str, summary: &Value) -> Value {
    let detail = &summary["summaryDetail"];
    let stats = &summary["defaultKeyStatistics"];
    let financial = &summary["financialData"];

    let field = |value: Option<f64>| value.map_or_else(|| json!("N/A"), |v| json!(v));

    json!({
        "symbol": symbol,
        "data": {
            "marketCap": field(raw_number(detail, "marketCap")),
            "peRatio": field(raw_number(detail, "trailingPE")),
            "eps": field(raw_number(stats, "trailingEps")),
            "profitMargin": field(
                raw_number(financial, "profitMargins").or_else(|| raw_number(stats, "profitMargins"))
            ),
            "recommendation": field(raw_number(financial, "recommendationMean")),
            "currentPrice": field(raw_number(financial, "currentPrice")),
            "targetHigh": field(raw_number(financial, "targetHighPrice")),
            "targetLow": field(raw_number(financial, "targetLowPrice")),
            "targetMean": field(raw_number(financial, "targetMeanPrice")),
        }
    })
}

/// Indicator payload; `{}` when there was nothing to compute.
pub fn tech_report(symbol: &str, set: &IndicatorSet) -> Value {
    if set.is_empty() {
        warn!(symbol, "no price data available");
        return empty();
    }

    let mut report = Map::new();
    report.insert("symbol".to_string(), json!(symbol));
    match serde_json::to_value(set) {
        Ok(Value::Object(fields)) => report.extend(fields),
        Ok(other) => {
            warn!(symbol, kind = ?other, "indicator set did not serialise to an object");
            return empty();
        }
        Err(e) => {
            warn!(symbol, error = %e, "failed to serialise indicator set");
            return empty();
        }
    }
    Value::Object(report)
}

pub fn news_report(symbol: &str, news: &[NewsItem]) -> Value {
    json!({ "symbol": symbol, "news": news })
}

pub fn dividends_report(symbol: &str, dividends: &[Dividend]) -> Value {
    if dividends.is_empty() {
        return json!({
            "symbol": symbol,
            "message": format!("{symbol} has no dividend data"),
        });
    }

    let rows: Vec<Value> = dividends
        .iter()
        .map(|d| json!({ "date": d.date.format("%Y-%m-%d").to_string(), "amount": d.amount }))
        .collect();
    json!({ "symbol": symbol, "dividends": rows })
}

/// Quarterly reported vs. estimated EPS; `{}` when the provider has none.
pub fn earnings_report(symbol: &str, summary: &Value) -> Value {
    let Some(quarters) = summary
        .pointer("/earnings/earningsChart/quarterly")
        .and_then(Value::as_array)
        .filter(|q| !q.is_empty())
    else {
        return empty();
    };

    let rows: Vec<Value> = quarters
        .iter()
        .map(|q| {
            json!({
                "date": q.get("date").and_then(Value::as_str),
                "actualEPS": raw_number(q, "actual"),
                "estimatedEPS": raw_number(q, "estimate"),
            })
        })
        .collect();
    json!({ "symbol": symbol, "earnings": rows })
}

fn empty() -> Value {
    Value::Object(Map::new())
}

fn is_empty_object(value: &Value) -> bool {
    value.as_object().is_some_and(Map::is_empty)
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    use crate::config::IndicatorParams;
    use crate::engine::NullSink;
    use crate::market_data::{PricePoint, PriceSeries, TickerMeta};

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
    }

    fn chart(points: Vec<PricePoint>) -> ChartData {
        ChartData {
            meta: TickerMeta {
                symbol: "ACME".to_string(),
                fifty_two_week_high: Some(150.0),
                fifty_two_week_low: Some(90.0),
                ..TickerMeta::default()
            },
            series: PriceSeries::new(points).unwrap(),
            dividends: Vec::new(),
        }
    }

    // ---- price -----------------------------------------------------------

    #[test]
    fn price_uses_latest_bar() {
        let data = chart(vec![
            PricePoint::new(day(1), 100.0, 102.0, 99.0, 101.0, 10),
            PricePoint::new(day(2), 100.0, 112.0, 98.0, 110.0, 20),
        ]);
        let report = price_report("ACME", &data);
        assert_eq!(report["symbol"], "ACME");
        assert_eq!(report["price"], 110.0);
        assert_eq!(report["change"], 10.0);
        assert_eq!(report["changePercent"], 10.0);
        assert_eq!(report["volume"], 20);
        assert_eq!(report["fiftyTwoWeekHigh"], 150.0);
    }

    #[test]
    fn price_skips_trailing_bar_without_close() {
        let mut open_bar = PricePoint::new(day(2), 105.0, 106.0, 104.0, 0.0, 0);
        open_bar.close = None;
        let data = chart(vec![PricePoint::new(day(1), 100.0, 102.0, 99.0, 101.0, 10), open_bar]);
        assert_eq!(price_report("ACME", &data)["price"], 101.0);
    }

    #[test]
    fn price_empty_chart() {
        assert_eq!(price_report("ACME", &chart(Vec::new())), json!({}));
    }

    // ---- fundamentals ----------------------------------------------------

    #[test]
    fn fundamentals_fill_missing_with_na() {
        let summary = json!({
            "summaryDetail": { "marketCap": { "raw": 2.5e12, "fmt": "2.5T" }, "trailingPE": { "raw": 28.4 } },
            "defaultKeyStatistics": { "trailingEps": { "raw": 6.1 }, "profitMargins": { "raw": 0.25 } },
            "financialData": { "currentPrice": { "raw": 173.2 }, "recommendationMean": { "raw": 2.0 } }
        });
        let report = fundamentals_report("ACME", &summary);
        let data = &report["data"];
        assert_eq!(data["marketCap"], 2.5e12);
        assert_eq!(data["peRatio"], 28.4);
        assert_eq!(data["eps"], 6.1);
        assert_eq!(data["profitMargin"], 0.25);
        assert_eq!(data["currentPrice"], 173.2);
        assert_eq!(data["targetHigh"], "N/A");
        assert_eq!(data["targetMean"], "N/A");
    }

    // ---- tech ------------------------------------------------------------

    #[test]
    fn tech_empty_series_is_empty_object() {
        let set = engine::compute(&PriceSeries::default(), &IndicatorParams::default(), &NullSink);
        assert_eq!(tech_report("ACME", &set), json!({}));
    }

    #[test]
    fn tech_report_shape() {
        let points = (1..=30)
            .map(|d| {
                let c = 100.0 + d as f64;
                PricePoint::new(day(d), c, c + 1.0, c - 1.0, c, 100)
            })
            .collect();
        let data = chart(points);
        let set = engine::compute(&data.series, &IndicatorParams::default(), &NullSink);
        let report = tech_report("ACME", &set);

        assert_eq!(report["symbol"], "ACME");
        assert_eq!(report["sma"].as_array().unwrap().len(), 30);
        assert!(report["sma"][18].is_null());
        assert!(report["sma"][19].is_number());
        assert!(report["parabolicSAR"][0].is_number());
        assert_eq!(report["volume"][0], 100);
        assert!(report["bollingerBands"]["lower"].is_array());
    }

    // ---- news / dividends / earnings ---------------------------------------

    #[test]
    fn news_wraps_items() {
        let news = vec![NewsItem {
            title: "Headline".to_string(),
            publisher: Some("Wire".to_string()),
            link: None,
            provider_publish_time: Some(1_700_000_000),
        }];
        let report = news_report("ACME", &news);
        assert_eq!(report["news"][0]["title"], "Headline");
        assert_eq!(report["news"][0]["providerPublishTime"], 1_700_000_000);
    }

    #[test]
    fn dividends_listed_with_iso_dates() {
        let report = dividends_report(
            "ACME",
            &[Dividend {
                date: day(3),
                amount: 0.24,
            }],
        );
        assert_eq!(report["dividends"][0]["date"], "2024-05-03");
        assert_eq!(report["dividends"][0]["amount"], 0.24);
    }

    #[test]
    fn dividends_absent_message() {
        let report = dividends_report("ACME", &[]);
        assert_eq!(report["message"], "ACME has no dividend data");
        assert!(report.get("dividends").is_none());
    }

    #[test]
    fn earnings_quarters() {
        let summary = json!({
            "earnings": { "earningsChart": { "quarterly": [
                { "date": "1Q2024", "actual": { "raw": 1.53 }, "estimate": { "raw": 1.5 } },
                { "date": "2Q2024", "estimate": { "raw": 1.35 } }
            ] } }
        });
        let report = earnings_report("ACME", &summary);
        let rows = report["earnings"].as_array().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["actualEPS"], 1.53);
        assert!(rows[1]["actualEPS"].is_null());
        assert_eq!(rows[1]["estimatedEPS"], 1.35);
    }

    #[test]
    fn earnings_missing_is_empty_object() {
        assert_eq!(earnings_report("ACME", &json!({})), json!({}));
    }

    // ---- run_report against a local provider -------------------------------

    use axum::routing::get;
    use axum::{Json, Router};

    use crate::provider::{stub, YahooClient};

    /// 2024-01-02 14:30 UTC.
    const FIRST_BAR: i64 = 1_704_205_800;
    const DAY_SECS: i64 = 86_400;

    fn chart_body(timestamps: Vec<i64>) -> Value {
        let closes: Vec<f64> = (0..timestamps.len()).map(|i| 100.0 + i as f64).collect();
        let highs: Vec<f64> = closes.iter().map(|c| c + 1.0).collect();
        let lows: Vec<f64> = closes.iter().map(|c| c - 1.0).collect();
        let volumes: Vec<u64> = vec![500; timestamps.len()];
        json!({
            "chart": {
                "result": [{
                    "meta": { "symbol": "ACME", "gmtoffset": 0 },
                    "timestamp": timestamps,
                    "indicators": {
                        "quote": [{
                            "open": closes, "high": highs, "low": lows,
                            "close": closes, "volume": volumes
                        }]
                    }
                }],
                "error": null
            }
        })
    }

    async fn tech_against(body: Value) -> Value {
        let app = Router::new().route(
            "/v8/finance/chart/:symbol",
            get(move || {
                let body = body.clone();
                async move { Json(body) }
            }),
        );
        let base = stub::spawn(app).await;

        let mut config = AppConfig::default();
        config.provider = stub::config(&base, 0);
        let client = YahooClient::new(&config.provider).unwrap();
        run_report(ReportKind::Tech, "ACME", &client, &config).await
    }

    #[tokio::test]
    async fn tech_run_builds_full_key_set() {
        let timestamps = (0..30).map(|i| FIRST_BAR + i * DAY_SECS).collect();
        let report = tech_against(chart_body(timestamps)).await;

        assert_eq!(report["symbol"], "ACME");
        for key in [
            "sma",
            "ema",
            "rsi",
            "volume",
            "bollingerBands",
            "macd",
            "stochastic",
            "atr",
            "parabolicSAR",
            "adx",
        ] {
            assert!(report.get(key).is_some(), "missing {key}");
        }
        assert_eq!(report["sma"].as_array().unwrap().len(), 30);
    }

    #[tokio::test]
    async fn tech_run_malformed_chart_is_empty_object() {
        let report = tech_against(json!({ "chart": { "unexpected": true } })).await;
        assert_eq!(report, json!({}));
    }

    #[tokio::test]
    async fn tech_run_out_of_order_chart_is_empty_object() {
        let timestamps = vec![FIRST_BAR + 2 * DAY_SECS, FIRST_BAR, FIRST_BAR + DAY_SECS];
        let report = tech_against(chart_body(timestamps)).await;
        assert_eq!(report, json!({}));
    }

    #[tokio::test]
    async fn provider_unreachable_is_empty_object() {
        // Nothing listens on the discard port.
        let mut config = AppConfig::default();
        config.provider = stub::config("http://127.0.0.1:9", 0);
        let client = YahooClient::new(&config.provider).unwrap();
        let report = run_report(ReportKind::Price, "ACME", &client, &config).await;
        assert_eq!(report, json!({}));
    }
}
