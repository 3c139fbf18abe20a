// =============================================================================
// TickerScope — Main Entry Point
// =============================================================================
//
// One-shot report commands print JSON to stdout; `serve` exposes the same
// reports over HTTP.  Logs go to stderr so stdout stays machine-readable.
// =============================================================================

// ── Module declarations ──────────────────────────────────────────────────────
mod api;
mod app_state;
mod config;
mod engine;
mod indicators;
mod market_data;
mod provider;
mod reports;
mod types;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::app_state::AppState;
use crate::config::AppConfig;
use crate::types::{normalize_symbol, ReportKind};

#[derive(Parser, Debug)]
#[command(name = "tickerscope", version, about = "Stock quotes, fundamentals and technical indicators")]
struct Cli {
    /// Path to the JSON configuration file.
    #[arg(long, env = "TICKERSCOPE_CONFIG", default_value = "tickerscope.json")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Latest price, day change and 52-week range.
    Price { symbol: String },
    /// Valuation and profitability metrics.
    Fundamentals { symbol: String },
    /// Full technical indicator set over the configured lookback.
    Tech { symbol: String },
    /// Recent headlines.
    News { symbol: String },
    /// Dividend history.
    Dividends { symbol: String },
    /// Quarterly EPS, actual versus estimate.
    Earnings { symbol: String },
    /// Run the HTTP API.
    Serve {
        /// Overrides `server.bind_addr` from the config file.
        #[arg(long)]
        bind: Option<String>,
    },
    /// Write the default configuration to `--config`.
    InitConfig,
}

impl Command {
    fn report(&self) -> Option<(ReportKind, &str)> {
        match self {
            Self::Price { symbol } => Some((ReportKind::Price, symbol.as_str())),
            Self::Fundamentals { symbol } => Some((ReportKind::Fundamentals, symbol.as_str())),
            Self::Tech { symbol } => Some((ReportKind::Tech, symbol.as_str())),
            Self::News { symbol } => Some((ReportKind::News, symbol.as_str())),
            Self::Dividends { symbol } => Some((ReportKind::Dividends, symbol.as_str())),
            Self::Earnings { symbol } => Some((ReportKind::Earnings, symbol.as_str())),
            Self::Serve { .. } | Self::InitConfig => None,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // ── 1. Environment & logging ─────────────────────────────────────────
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Some((kind, symbol)) = cli.command.report() {
        let config = AppConfig::load_or_default(&cli.config);
        return print_report(kind, symbol, config).await;
    }

    match cli.command {
        Command::InitConfig => {
            AppConfig::default().save(&cli.config)?;
            info!(path = %cli.config.display(), "default config written");
            Ok(())
        }
        Command::Serve { bind } => {
            let mut config = AppConfig::load_or_default(&cli.config);
            if let Some(bind) = bind {
                config.server.bind_addr = bind;
            }
            serve(config).await
        }
        _ => Ok(()),
    }
}

// =============================================================================
// One-shot reports
// =============================================================================

async fn print_report(kind: ReportKind, symbol: &str, config: AppConfig) -> Result<()> {
    let symbol = normalize_symbol(symbol);
    let client = provider::YahooClient::new(&config.provider)?;
    let report = reports::run_report(kind, &symbol, &client, &config).await;
    let out = serde_json::to_string_pretty(&report).context("failed to serialise report")?;
    println!("{out}");
    Ok(())
}

// =============================================================================
// HTTP server
// =============================================================================

async fn serve(config: AppConfig) -> Result<()> {
    info!("╔══════════════════════════════════════════════════════════╗");
    info!("║        TickerScope API — Starting Up                     ║");
    info!("╚══════════════════════════════════════════════════════════╝");

    let bind_addr = config.server.bind_addr.clone();
    let state = Arc::new(AppState::new(config)?);

    // ── Rate-limit window reset (every 60s) ──────────────────────────────
    let limiter_state = state.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(tokio::time::Duration::from_secs(60));
        interval.tick().await;
        loop {
            interval.tick().await;
            limiter_state.rate_limit.reset_window();
        }
    });

    let app = api::rest::router(state);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind API server on {bind_addr}"))?;
    info!(addr = %bind_addr, "API server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("API server failed")?;

    info!("API server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
