//! Error types for the dashboard client
//!
//! Uses thiserror for ergonomic error definitions.
//! A missing analytics sub-report is never an error: projections render
//! their empty state instead.

use thiserror::Error;

/// Custom Result type using our Error
pub type Result<T> = std::result::Result<T, DashboardError>;

/// Dashboard client errors
#[derive(Error, Debug)]
pub enum DashboardError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Request rejected or backend unreachable
    #[error("Network error: {0}")]
    Network(String),

    /// Backend answered with `success: false` (or a bare HTTP failure)
    #[error("API error: {0}")]
    Api(String),

    /// JSON parsing errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Unknown candle granularity
    #[error("Invalid period: {0}")]
    InvalidPeriod(String),

    /// Unparseable input binding command
    #[error("Invalid command: {0}")]
    InvalidCommand(String),
}

impl DashboardError {
    /// Message shown on the status surface and in toasts
    pub fn user_message(&self) -> String {
        match self {
            DashboardError::Api(msg) | DashboardError::Network(msg) => msg.clone(),
            other => other.to_string(),
        }
    }
}

impl From<reqwest::Error> for DashboardError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            DashboardError::Api(format!("Malformed response: {err}"))
        } else {
            DashboardError::Network(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = DashboardError::Api("timeout".to_string());
        assert_eq!(err.to_string(), "API error: timeout");
        assert_eq!(err.user_message(), "timeout");
    }

    #[test]
    fn test_error_conversion() {
        let json_err = serde_json::from_str::<i32>("invalid").unwrap_err();
        let err: DashboardError = json_err.into();
        assert!(matches!(err, DashboardError::Json(_)));
        assert!(err.user_message().starts_with("JSON error"));
    }
}
