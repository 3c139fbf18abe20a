// =============================================================================
// Configuration — indicator windows, provider and server settings
// =============================================================================
//
// Every tunable lives here.  All fields carry `#[serde(default)]` so that a
// partial or older config file still loads; a missing file falls back to the
// defaults with a warning.
//
// Persistence uses an atomic tmp + rename pattern to prevent corruption on
// crash.
// =============================================================================

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::indicators::SarParams;

// =============================================================================
// Default-value helpers (required by serde `default = "..."` attribute)
// =============================================================================

fn default_sma_window() -> usize {
    20
}

fn default_ema_window() -> usize {
    20
}

fn default_rsi_window() -> usize {
    14
}

fn default_bollinger_window() -> usize {
    20
}

fn default_bollinger_num_std() -> f64 {
    2.0
}

fn default_macd_fast() -> usize {
    12
}

fn default_macd_slow() -> usize {
    26
}

fn default_macd_signal() -> usize {
    9
}

fn default_stochastic_k() -> usize {
    14
}

fn default_stochastic_d() -> usize {
    3
}

fn default_atr_window() -> usize {
    14
}

fn default_adx_window() -> usize {
    14
}

fn default_base_url() -> String {
    "https://query1.finance.yahoo.com".to_string()
}

fn default_search_base_url() -> String {
    "https://query2.finance.yahoo.com".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_retries() -> u32 {
    3
}

fn default_retry_base_delay_ms() -> u64 {
    200
}

fn default_lookback_range() -> String {
    "1y".to_string()
}

fn default_news_count() -> usize {
    5
}

fn default_bind_addr() -> String {
    "0.0.0.0:3001".to_string()
}

fn default_requests_per_minute() -> u32 {
    30
}

// =============================================================================
// IndicatorParams
// =============================================================================

/// Windows and factors for every indicator in the `tech` report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorParams {
    #[serde(default = "default_sma_window")]
    pub sma_window: usize,

    #[serde(default = "default_ema_window")]
    pub ema_window: usize,

    #[serde(default = "default_rsi_window")]
    pub rsi_window: usize,

    #[serde(default = "default_bollinger_window")]
    pub bollinger_window: usize,

    /// Band distance from the SMA in standard deviations.
    #[serde(default = "default_bollinger_num_std")]
    pub bollinger_num_std: f64,

    #[serde(default = "default_macd_fast")]
    pub macd_fast: usize,

    #[serde(default = "default_macd_slow")]
    pub macd_slow: usize,

    #[serde(default = "default_macd_signal")]
    pub macd_signal: usize,

    /// Look-back for the %K high/low range.
    #[serde(default = "default_stochastic_k")]
    pub stochastic_k: usize,

    /// Smoothing window turning %K into %D.
    #[serde(default = "default_stochastic_d")]
    pub stochastic_d: usize,

    #[serde(default = "default_atr_window")]
    pub atr_window: usize,

    /// Parabolic SAR acceleration schedule.
    #[serde(default)]
    pub sar: SarParams,

    /// Window for the DM smoothing, the DI's ATR and the final DX average.
    #[serde(default = "default_adx_window")]
    pub adx_window: usize,
}

impl Default for IndicatorParams {
    fn default() -> Self {
        Self {
            sma_window: default_sma_window(),
            ema_window: default_ema_window(),
            rsi_window: default_rsi_window(),
            bollinger_window: default_bollinger_window(),
            bollinger_num_std: default_bollinger_num_std(),
            macd_fast: default_macd_fast(),
            macd_slow: default_macd_slow(),
            macd_signal: default_macd_signal(),
            stochastic_k: default_stochastic_k(),
            stochastic_d: default_stochastic_d(),
            atr_window: default_atr_window(),
            sar: SarParams::default(),
            adx_window: default_adx_window(),
        }
    }
}

// =============================================================================
// ProviderConfig
// =============================================================================

/// Market-data provider endpoints and request policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Base URL for chart and quote-summary requests.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Base URL for the news search endpoint.
    #[serde(default = "default_search_base_url")]
    pub search_base_url: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Retries after the first attempt for transient failures.
    #[serde(default = "default_retries")]
    pub retries: u32,

    /// Delay before the first retry; doubles on each further attempt.
    #[serde(default = "default_retry_base_delay_ms")]
    pub retry_base_delay_ms: u64,

    /// Chart range used by the `tech` report (e.g. "1y", "6mo").
    #[serde(default = "default_lookback_range")]
    pub lookback_range: String,

    #[serde(default = "default_news_count")]
    pub news_count: usize,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            search_base_url: default_search_base_url(),
            timeout_secs: default_timeout_secs(),
            retries: default_retries(),
            retry_base_delay_ms: default_retry_base_delay_ms(),
            lookback_range: default_lookback_range(),
            news_count: default_news_count(),
        }
    }
}

// =============================================================================
// ServerConfig
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Report requests accepted per minute across all clients.
    #[serde(default = "default_requests_per_minute")]
    pub requests_per_minute: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            requests_per_minute: default_requests_per_minute(),
        }
    }
}

// =============================================================================
// AppConfig
// =============================================================================

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub indicators: IndicatorParams,

    #[serde(default)]
    pub provider: ProviderConfig,

    #[serde(default)]
    pub server: ServerConfig,
}

impl AppConfig {
    /// Load configuration from a JSON file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config from {}", path.display()))?;

        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse config from {}", path.display()))?;

        info!(
            path = %path.display(),
            lookback = %config.provider.lookback_range,
            "config loaded"
        );

        Ok(config)
    }

    /// Load from `path`, falling back to defaults when the file is missing or
    /// unreadable, then apply environment overrides.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let mut config = Self::load(path).unwrap_or_else(|e| {
            warn!(error = %e, "failed to load config, using defaults");
            Self::default()
        });
        config.apply_env_overrides();
        config
    }

    /// Environment overrides: `TICKERSCOPE_BIND_ADDR`,
    /// `TICKERSCOPE_YAHOO_BASE_URL`.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(addr) = std::env::var("TICKERSCOPE_BIND_ADDR") {
            if !addr.trim().is_empty() {
                self.server.bind_addr = addr.trim().to_string();
            }
        }
        if let Ok(url) = std::env::var("TICKERSCOPE_YAHOO_BASE_URL") {
            if !url.trim().is_empty() {
                self.provider.base_url = url.trim().trim_end_matches('/').to_string();
            }
        }
    }

    /// Persist the configuration to `path` using an atomic write (write to
    /// `.tmp`, then rename).
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        let content =
            serde_json::to_string_pretty(self).context("failed to serialise config to JSON")?;

        let tmp_path = path.with_extension("json.tmp");

        std::fs::write(&tmp_path, &content)
            .with_context(|| format!("failed to write tmp config to {}", tmp_path.display()))?;

        std::fs::rename(&tmp_path, path)
            .with_context(|| format!("failed to rename tmp config to {}", path.display()))?;

        info!(path = %path.display(), "config saved (atomic)");
        Ok(())
    }
}
