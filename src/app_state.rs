// =============================================================================
// Shared server state
// =============================================================================

use std::time::Instant;

use anyhow::Result;

use crate::api::rate_limit::RateLimitTracker;
use crate::config::AppConfig;
use crate::provider::YahooClient;

/// State shared by every HTTP handler (wrapped in an `Arc`).
pub struct AppState {
    pub config: AppConfig,
    pub client: YahooClient,
    pub rate_limit: RateLimitTracker,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(config: AppConfig) -> Result<Self> {
        let client = YahooClient::new(&config.provider)?;
        let rate_limit = RateLimitTracker::new(config.server.requests_per_minute);
        Ok(Self {
            config,
            client,
            rate_limit,
            started_at: Instant::now(),
        })
    }
}
