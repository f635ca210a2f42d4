//! Configuration management for the dashboard client

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{DashboardError, Result};
use crate::types::Period;

/// What a poll tick does when an earlier `latest` request is still in flight
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OverlapPolicy {
    /// Issue the request; drop any response older than one already applied
    #[default]
    Supersede,
    /// Issue nothing while a request is outstanding
    Skip,
    /// Apply every response in arrival order (last resolved wins)
    Unguarded,
}

impl FromStr for OverlapPolicy {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "supersede" => Ok(OverlapPolicy::Supersede),
            "skip" => Ok(OverlapPolicy::Skip),
            "unguarded" => Ok(OverlapPolicy::Unguarded),
            other => Err(DashboardError::Config(format!("unknown overlap policy '{other}'"))),
        }
    }
}

/// Dashboard client configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// API base, e.g. `http://localhost:5000/api/crypto`
    pub api_base: String,

    /// Log level used when RUST_LOG is unset
    pub log_level: String,

    /// Recurring `latest` poll
    pub poll_interval_ms: u64,

    /// Candle count requested per `klines` call
    pub klines_limit: u32,

    pub default_period: Period,
    pub overlap_policy: OverlapPolicy,

    /// Per-request timeout (0 = platform default, no timeout)
    pub request_timeout_secs: u64,

    /// Headline price color pulse
    pub pulse_ms: u64,

    /// Error toast visibility
    pub toast_ms: u64,

    /// Where the binary writes the rendered page, if anywhere
    pub output_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base: "http://localhost:5000/api/crypto".to_string(),
            log_level: "info".to_string(),
            poll_interval_ms: 1000,
            klines_limit: 100,
            default_period: Period::OneMinute,
            overlap_policy: OverlapPolicy::Supersede,
            request_timeout_secs: 10,
            pulse_ms: 1000,
            toast_ms: 5000,
            output_path: None,
        }
    }
}

impl Config {
    /// Load configuration from process environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from any key lookup; unset keys keep their defaults
    pub fn from_lookup<F>(var: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let config = Self {
            api_base: var("DASHBOARD_API_BASE")
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or(defaults.api_base),

            log_level: var("LOG_LEVEL").unwrap_or(defaults.log_level),

            poll_interval_ms: var("POLL_INTERVAL_MS")
                .map(|v| v.parse().unwrap_or(defaults.poll_interval_ms))
                .unwrap_or(defaults.poll_interval_ms),

            klines_limit: var("KLINES_LIMIT")
                .map(|v| v.parse().unwrap_or(defaults.klines_limit))
                .unwrap_or(defaults.klines_limit),

            // Unknown period or policy names are errors
            default_period: match var("DEFAULT_PERIOD") {
                Some(v) => v.parse()?,
                None => defaults.default_period,
            },

            overlap_policy: match var("OVERLAP_POLICY") {
                Some(v) => v.parse()?,
                None => defaults.overlap_policy,
            },

            request_timeout_secs: var("REQUEST_TIMEOUT_SECS")
                .map(|v| v.parse().unwrap_or(defaults.request_timeout_secs))
                .unwrap_or(defaults.request_timeout_secs),

            pulse_ms: var("PULSE_MS")
                .map(|v| v.parse().unwrap_or(defaults.pulse_ms))
                .unwrap_or(defaults.pulse_ms),

            toast_ms: var("TOAST_MS")
                .map(|v| v.parse().unwrap_or(defaults.toast_ms))
                .unwrap_or(defaults.toast_ms),

            output_path: var("DASHBOARD_OUTPUT")
                .filter(|v| !v.is_empty())
                .map(PathBuf::from),
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if !(self.api_base.starts_with("http://") || self.api_base.starts_with("https://")) {
            return Err(DashboardError::Config(format!(
                "api_base must be an http(s) URL, got '{}'",
                self.api_base
            )));
        }
        if self.poll_interval_ms == 0 {
            return Err(DashboardError::Config("poll_interval_ms must be positive".into()));
        }
        if self.klines_limit == 0 || self.klines_limit > 1000 {
            return Err(DashboardError::Config("klines_limit must be 1-1000".into()));
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request_timeout_secs > 0).then(|| Duration::from_secs(self.request_timeout_secs))
    }

    pub fn pulse(&self) -> Duration {
        Duration::from_millis(self.pulse_ms)
    }

    pub fn toast(&self) -> Duration {
        Duration::from_millis(self.toast_ms)
    }
}
