// =============================================================================
// Service Configuration — JSON file with per-field defaults
// =============================================================================
//
// Every field carries `#[serde(default = ...)]` so a partial (or empty) file
// still loads, and a missing file falls back to `ServiceConfig::default()` at
// the call site with a warning.
//
// The configuration is read once at startup; the prediction service built
// from it is immutable afterwards.
// =============================================================================

use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::chart::plotters_renderer::{DEFAULT_HEIGHT, DEFAULT_WIDTH};
use crate::indicators::rsi::DEFAULT_RSI_PERIOD;
use crate::market_data::yahoo::DEFAULT_BASE_URL;
use crate::prediction::{DEFAULT_LOOKBACK_DAYS, MAX_LOOKBACK_DAYS};

// =============================================================================
// Default-value helpers (required by serde `default = "..."` attribute)
// =============================================================================

fn default_bind_addr() -> String {
    "0.0.0.0:5000".to_string()
}

fn default_lookback_days() -> u32 {
    DEFAULT_LOOKBACK_DAYS
}

fn default_rsi_period() -> usize {
    DEFAULT_RSI_PERIOD
}

fn default_provider_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_chart_width() -> u32 {
    DEFAULT_WIDTH
}

fn default_chart_height() -> u32 {
    DEFAULT_HEIGHT
}

// =============================================================================
// ServiceConfig
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Address the HTTP server binds to.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Calendar days of history fetched when a request does not say.
    #[serde(default = "default_lookback_days")]
    pub lookback_days: u32,

    /// RSI look-back used when a request does not say.
    #[serde(default = "default_rsi_period")]
    pub rsi_period: usize,

    /// Yahoo Finance chart endpoint.
    #[serde(default = "default_provider_base_url")]
    pub provider_base_url: String,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    #[serde(default = "default_chart_width")]
    pub chart_width: u32,

    #[serde(default = "default_chart_height")]
    pub chart_height: u32,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            lookback_days: default_lookback_days(),
            rsi_period: default_rsi_period(),
            provider_base_url: default_provider_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
            chart_width: default_chart_width(),
            chart_height: default_chart_height(),
        }
    }
}

impl ServiceConfig {
    /// Load configuration from a JSON file at `path`.
    ///
    /// Returns an error when the file is missing or malformed so the caller
    /// can fall back to defaults with a warning.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read service config from {}", path.display()))?;

        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse service config from {}", path.display()))?;

        info!(
            path = %path.display(),
            bind_addr = %config.bind_addr,
            rsi_period = config.rsi_period,
            lookback_days = config.lookback_days,
            "service config loaded"
        );

        Ok(config)
    }

    /// Reject values the pipeline cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.rsi_period == 0 {
            bail!("rsi_period must be at least 1");
        }
        if self.lookback_days == 0 || self.lookback_days > MAX_LOOKBACK_DAYS {
            bail!(
                "lookback_days must be between 1 and {MAX_LOOKBACK_DAYS} (got {})",
                self.lookback_days
            );
        }
        if self.chart_width == 0 || self.chart_height == 0 {
            bail!(
                "chart size must be non-zero (got {}x{})",
                self.chart_width,
                self.chart_height
            );
        }
        if self.request_timeout_secs == 0 {
            bail!("request_timeout_secs must be at least 1");
        }
        Ok(())
    }
}
