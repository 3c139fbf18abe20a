// =============================================================================
// Local provider stub for tests
// =============================================================================
//
// Serves an axum router on an ephemeral loopback port so the client can be
// driven end to end without leaving the machine.
// =============================================================================

use axum::Router;

use crate::config::ProviderConfig;

/// Serve `app` on `127.0.0.1:0` and return its base URL.
pub async fn spawn(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

/// Provider settings pointed at `base_url`, with fast retries.
pub fn config(base_url: &str, retries: u32) -> ProviderConfig {
    ProviderConfig {
        base_url: base_url.to_string(),
        search_base_url: base_url.to_string(),
        timeout_secs: 5,
        retries,
        retry_base_delay_ms: 1,
        ..ProviderConfig::default()
    }
}
