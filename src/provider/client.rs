// =============================================================================
// Yahoo Finance REST Client — public, unauthenticated endpoints
// =============================================================================
//
// Transient failures (connect errors, timeouts, HTTP 429 and 5xx) are retried
// with exponential backoff: the n-th retry waits `base_delay * 2^(n-1)`.
// =============================================================================

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::{StatusCode, Url};
use serde_json::Value;
use tracing::{debug, instrument, warn};

use super::parse::{parse_chart, parse_news, parse_quote_summary};
use crate::config::ProviderConfig;
use crate::market_data::{ChartData, NewsItem};

/// Browser-like agent; the chart endpoints reject requests without one.
const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) tickerscope/1.0";

/// Yahoo Finance client with retrying GET requests.
#[derive(Clone)]
pub struct YahooClient {
    base_url: String,
    search_base_url: String,
    retries: u32,
    retry_base_delay: Duration,
    client: reqwest::Client,
}

impl YahooClient {
    // -------------------------------------------------------------------------
    // Construction
    // -------------------------------------------------------------------------

    pub fn new(config: &ProviderConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("failed to build reqwest client")?;

        debug!(base_url = %config.base_url, "YahooClient initialised");

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            search_base_url: config.search_base_url.trim_end_matches('/').to_string(),
            retries: config.retries,
            retry_base_delay: Duration::from_millis(config.retry_base_delay_ms),
            client,
        })
    }

    // -------------------------------------------------------------------------
    // Endpoints
    // -------------------------------------------------------------------------

    /// GET /v8/finance/chart/{symbol} with daily bars over `range`.
    #[instrument(skip(self), name = "yahoo::get_chart")]
    pub async fn get_chart(&self, symbol: &str, range: &str, with_dividends: bool) -> Result<ChartData> {
        let mut query = vec![("range", range), ("interval", "1d")];
        if with_dividends {
            query.push(("events", "div"));
        }
        let url = endpoint(&self.base_url, &["v8", "finance", "chart", symbol], &query)?;

        let body = self.get_json(&url).await?;
        let data = parse_chart(&body)?;
        debug!(symbol, bars = data.series.len(), dividends = data.dividends.len(), "chart fetched");
        Ok(data)
    }

    /// GET /v10/finance/quoteSummary/{symbol} for the given `modules`.
    #[instrument(skip(self), name = "yahoo::get_quote_summary")]
    pub async fn get_quote_summary(&self, symbol: &str, modules: &[&str]) -> Result<Value> {
        let modules = modules.join(",");
        let url = endpoint(
            &self.base_url,
            &["v10", "finance", "quoteSummary", symbol],
            &[("modules", modules.as_str())],
        )?;
        let body = self.get_json(&url).await?;
        parse_quote_summary(&body)
    }

    /// GET /v1/finance/search for the most recent `count` headlines.
    #[instrument(skip(self), name = "yahoo::get_news")]
    pub async fn get_news(&self, symbol: &str, count: usize) -> Result<Vec<NewsItem>> {
        let count_param = count.to_string();
        let url = endpoint(
            &self.search_base_url,
            &["v1", "finance", "search"],
            &[("q", symbol), ("quotesCount", "0"), ("newsCount", count_param.as_str())],
        )?;
        let body = self.get_json(&url).await?;
        Ok(parse_news(&body, count))
    }

    // -------------------------------------------------------------------------
    // Transport
    // -------------------------------------------------------------------------

    async fn get_json(&self, url: &Url) -> Result<Value> {
        let mut attempt: u32 = 0;
        loop {
            let can_retry = attempt < self.retries;

            let resp = match self.client.get(url.clone()).send().await {
                Ok(resp) => resp,
                Err(e) if can_retry && (e.is_connect() || e.is_timeout()) => {
                    attempt += 1;
                    warn!(%url, attempt, error = %e, "request failed, retrying");
                    tokio::time::sleep(self.backoff(attempt)).await;
                    continue;
                }
                Err(e) => return Err(e).with_context(|| format!("GET {url} failed")),
            };

            let status = resp.status();
            if can_retry && is_transient(status) {
                attempt += 1;
                warn!(%url, attempt, %status, "transient status, retrying");
                tokio::time::sleep(self.backoff(attempt)).await;
                continue;
            }

            if !status.is_success() {
                let text = resp.text().await.unwrap_or_default();
                anyhow::bail!("GET {} returned {}: {}", url, status, text);
            }

            return resp
                .json()
                .await
                .with_context(|| format!("failed to parse response from {url}"));
        }
    }

    /// Delay before retry number `attempt` (1-based).
    fn backoff(&self, attempt: u32) -> Duration {
        self.retry_base_delay * 2u32.saturating_pow(attempt.saturating_sub(1))
    }
}

/// Join `segments` onto `base` and append `query`.  Each segment and pair is
/// percent-encoded, so caller-supplied symbols cannot alter the request.
fn endpoint(base: &str, segments: &[&str], query: &[(&str, &str)]) -> Result<Url> {
    let mut url = Url::parse(base).with_context(|| format!("invalid provider base URL '{base}'"))?;
    url.path_segments_mut()
        .map_err(|_| anyhow::anyhow!("provider base URL '{base}' cannot carry a path"))?
        .pop_if_empty()
        .extend(segments);
    url.query_pairs_mut().extend_pairs(query);
    Ok(url)
}

fn is_transient(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_doubles() {
        let config = ProviderConfig {
            retry_base_delay_ms: 100,
            ..ProviderConfig::default()
        };
        let client = YahooClient::new(&config).unwrap();
        assert_eq!(client.backoff(1), Duration::from_millis(100));
        assert_eq!(client.backoff(2), Duration::from_millis(200));
        assert_eq!(client.backoff(3), Duration::from_millis(400));
    }

    #[test]
    fn transient_statuses() {
        assert!(is_transient(StatusCode::TOO_MANY_REQUESTS));
        assert!(is_transient(StatusCode::BAD_GATEWAY));
        assert!(!is_transient(StatusCode::NOT_FOUND));
        assert!(!is_transient(StatusCode::OK));
    }

    #[test]
    fn trailing_slash_trimmed() {
        let config = ProviderConfig {
            base_url: "http://localhost:9/".to_string(),
            ..ProviderConfig::default()
        };
        let client = YahooClient::new(&config).unwrap();
        assert_eq!(client.base_url, "http://localhost:9");
    }

    // ---- against a local stub -------------------------------------------

    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use axum::extract::{Path, Query};
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::json;

    use crate::provider::stub;

    type Seen = Arc<Mutex<Vec<(String, HashMap<String, String>)>>>;

    /// Route answering `status_for(hit_number)` and counting hits.
    fn scripted(status_for: fn(usize) -> StatusCode) -> (Router, Arc<AtomicUsize>) {
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        let app = Router::new().route(
            "/flaky",
            get(move || {
                let counter = counter.clone();
                async move {
                    let status = status_for(counter.fetch_add(1, Ordering::SeqCst));
                    (status, Json(json!({ "ok": status.is_success() })))
                }
            }),
        );
        (app, hits)
    }

    async fn client_for(app: Router, retries: u32) -> (YahooClient, String) {
        let base = stub::spawn(app).await;
        (YahooClient::new(&stub::config(&base, retries)).unwrap(), base)
    }

    fn flaky_url(base: &str) -> Url {
        endpoint(base, &["flaky"], &[]).unwrap()
    }

    #[tokio::test]
    async fn transient_status_is_retried_until_success() {
        let (app, hits) = scripted(|n| {
            if n == 0 {
                StatusCode::SERVICE_UNAVAILABLE
            } else {
                StatusCode::OK
            }
        });
        let (client, base) = client_for(app, 3).await;

        let body = client.get_json(&flaky_url(&base)).await.unwrap();
        assert_eq!(body["ok"], true);
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn persistent_failure_gives_up_after_retries() {
        let (app, hits) = scripted(|_| StatusCode::SERVICE_UNAVAILABLE);
        let (client, base) = client_for(app, 2).await;

        let err = client.get_json(&flaky_url(&base)).await.unwrap_err();
        assert!(err.to_string().contains("503"));
        assert_eq!(hits.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn client_error_is_not_retried() {
        let (app, hits) = scripted(|_| StatusCode::NOT_FOUND);
        let (client, base) = client_for(app, 3).await;

        let err = client.get_json(&flaky_url(&base)).await.unwrap_err();
        assert!(err.to_string().contains("404"));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn symbols_cannot_rewrite_the_request() {
        let seen: Seen = Arc::default();
        let chart_seen = seen.clone();
        let news_seen = seen.clone();
        let app = Router::new()
            .route(
                "/v8/finance/chart/:symbol",
                get(move |Path(symbol): Path<String>, Query(q): Query<HashMap<String, String>>| {
                    let seen = chart_seen.clone();
                    async move {
                        seen.lock().unwrap().push((symbol, q));
                        Json(json!({
                            "chart": {
                                "result": [{ "meta": { "symbol": "X" }, "indicators": { "quote": [{}] } }],
                                "error": null
                            }
                        }))
                    }
                }),
            )
            .route(
                "/v1/finance/search",
                get(move |Query(q): Query<HashMap<String, String>>| {
                    let seen = news_seen.clone();
                    async move {
                        seen.lock().unwrap().push(("search".to_string(), q));
                        Json(json!({ "news": [] }))
                    }
                }),
            );
        let (client, _) = client_for(app, 0).await;

        client.get_chart("AAPL?RANGE=1D#", "1y", false).await.unwrap();
        client.get_chart("A/B", "5d", true).await.unwrap();
        client.get_news("A&B", 5).await.unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 3);

        let (symbol, q) = &seen[0];
        assert_eq!(symbol, "AAPL?RANGE=1D#");
        assert_eq!(q["range"], "1y");
        assert_eq!(q["interval"], "1d");
        assert!(!q.contains_key("RANGE"));

        let (symbol, q) = &seen[1];
        assert_eq!(symbol, "A/B");
        assert_eq!(q["range"], "5d");
        assert_eq!(q["events"], "div");

        let (_, q) = &seen[2];
        assert_eq!(q["q"], "A&B");
        assert_eq!(q["newsCount"], "5");
        assert!(!q.contains_key("B"));
    }
}
