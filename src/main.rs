// =============================================================================
// Elliott Wave Predictor — Main Entry Point
// =============================================================================
//
// Builds one immutable prediction service (Yahoo Finance history + plotters
// charts) and serves it over HTTP until Ctrl+C.
// =============================================================================

// ── Module declarations ──────────────────────────────────────────────────────
mod api;
mod chart;
mod error;
mod indicators;
mod market_data;
mod pivot;
mod prediction;
mod runtime_config;
mod types;
mod waves;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::chart::PlottersRenderer;
use crate::market_data::YahooFinanceClient;
use crate::prediction::PredictionService;
use crate::runtime_config::ServiceConfig;

const DEFAULT_CONFIG_PATH: &str = "predictor_config.json";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Environment & config ──────────────────────────────────────────
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Elliott Wave Predictor starting up");

    let config_path =
        std::env::var("PREDICTOR_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.into());
    let mut config = ServiceConfig::load(&config_path).unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        ServiceConfig::default()
    });

    if let Ok(addr) = std::env::var("PREDICTOR_BIND_ADDR") {
        config.bind_addr = addr;
    }
    config.validate().context("invalid service configuration")?;

    info!(
        lookback_days = config.lookback_days,
        rsi_period = config.rsi_period,
        chart = %format!("{}x{}", config.chart_width, config.chart_height),
        "configuration ready"
    );

    // ── 2. Build the service (once, immutable) ───────────────────────────
    let provider = YahooFinanceClient::new(
        config.provider_base_url.clone(),
        Duration::from_secs(config.request_timeout_secs),
    )?;
    let renderer = PlottersRenderer::new(config.chart_width, config.chart_height);
    let service = Arc::new(
        PredictionService::new(provider, renderer)
            .with_defaults(config.lookback_days, config.rsi_period),
    );

    // ── 3. Serve ─────────────────────────────────────────────────────────
    let app = api::rest::router(service);
    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;
    info!(addr = %config.bind_addr, "API server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(tokio::signal::ctrl_c()))
        .await
        .context("API server failed")?;

    info!("Elliott Wave Predictor shut down complete.");
    Ok(())
}

/// Resolves once `signal` fires. If the handler cannot be installed the
/// server keeps running instead of shutting down straight away.
async fn shutdown_signal<F>(signal: F)
where
    F: Future<Output = std::io::Result<()>>,
{
    match signal.await {
        Ok(()) => warn!("Shutdown signal received — stopping gracefully"),
        Err(e) => {
            warn!(error = %e, "failed to listen for shutdown signal, running until killed");
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn shutdown_completes_on_signal() {
        let done =
            tokio::time::timeout(Duration::from_millis(100), shutdown_signal(async { Ok(()) }))
                .await;
        assert!(done.is_ok());
    }

    #[tokio::test]
    async fn shutdown_waits_when_signal_handler_fails() {
        let failed = async { Err(std::io::Error::new(std::io::ErrorKind::Other, "no handler")) };
        let done = tokio::time::timeout(Duration::from_millis(50), shutdown_signal(failed)).await;
        assert!(done.is_err());
    }
}
