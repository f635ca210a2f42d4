//! Wire types for the analytics API
//!
//! The backend contract is "any field may be missing": every analytics
//! sub-report decodes to `None` when it is absent, null or malformed, so a
//! partial payload never fails the whole snapshot.

use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::de::{self, DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{DashboardError, Result};

/// Interpret a JSON value as a finite number (numeric strings included)
pub fn as_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    number.filter(|n| n.is_finite())
}

/// Field-level deserializers that never fail the surrounding struct
mod lenient {
    use super::{Candle, DeserializeOwned, Deserializer, Value, as_number};
    use serde::Deserialize;

    pub fn number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(as_number(&value))
    }

    pub fn timestamp<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(as_number(&value).map(|n| n as i64))
    }

    pub fn report<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned,
    {
        let value = Value::deserialize(deserializer)?;
        if value.is_null() {
            return Ok(None);
        }
        Ok(serde_json::from_value(value).ok())
    }

    pub fn or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned + Default,
    {
        Ok(report(deserializer)?.unwrap_or_default())
    }

    pub fn candles<'de, D>(deserializer: D) -> Result<Vec<Candle>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let Value::Array(rows) = Value::deserialize(deserializer)? else {
            return Ok(Vec::new());
        };
        let total = rows.len();
        let candles: Vec<Candle> = rows
            .into_iter()
            .filter_map(|row| serde_json::from_value(row).ok())
            .collect();
        if candles.len() < total {
            tracing::debug!(dropped = total - candles.len(), "Skipped malformed candle rows");
        }
        Ok(candles)
    }
}

// ============================================================================
// Envelope
// ============================================================================

/// Response envelope shared by `/latest` and `/klines`
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    #[serde(default)]
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> Envelope<T> {
    /// Convert the envelope into the payload or an API error
    pub fn into_result(self) -> Result<T> {
        if self.success {
            self.data
                .ok_or_else(|| DashboardError::Api("Response missing data".to_string()))
        } else {
            Err(DashboardError::Api(
                self.error.unwrap_or_else(|| "Unknown error".to_string()),
            ))
        }
    }
}

/// Service status from `/status`
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct BackendStatus {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub status: String,
    #[serde(default, deserialize_with = "lenient::timestamp")]
    pub last_update: Option<i64>,
    #[serde(default)]
    pub has_data: bool,
}

// ============================================================================
// Snapshot
// ============================================================================

/// The latest fetched price + analysis + candle bundle
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct Snapshot {
    #[serde(default, deserialize_with = "lenient::number")]
    pub current_price: Option<f64>,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub analysis: Analysis,
    #[serde(default, deserialize_with = "lenient::candles")]
    pub klines: Vec<Candle>,
    /// Server time of the snapshot (epoch ms)
    #[serde(default, deserialize_with = "lenient::timestamp")]
    pub timestamp: Option<i64>,
}

/// One OHLC bucket: `[timestampMs, open, high, low, close, ...]`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candle {
    pub timestamp_ms: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl<'de> Deserialize<'de> for Candle {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let row = Vec::<Value>::deserialize(deserializer)?;
        if row.len() < 5 {
            return Err(de::Error::invalid_length(row.len(), &"at least 5 candle fields"));
        }
        let field = |idx: usize| -> std::result::Result<f64, D::Error> {
            as_number(&row[idx])
                .ok_or_else(|| de::Error::custom(format!("candle field {idx} is not numeric")))
        };
        Ok(Candle {
            timestamp_ms: field(0)? as i64,
            open: field(1)?,
            high: field(2)?,
            low: field(3)?,
            close: field(4)?,
        })
    }
}

/// Candle series as served by `/klines`; malformed rows are dropped
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Candles(pub Vec<Candle>);

impl<'de> Deserialize<'de> for Candles {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        lenient::candles(deserializer).map(Candles)
    }
}

// ============================================================================
// Analysis sub-reports
// ============================================================================

/// Server-computed technical analysis; every sub-report is optional
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct Analysis {
    #[serde(default, deserialize_with = "lenient::report")]
    pub moving_averages: Option<IndexMap<String, MovingAverage>>,
    #[serde(default, deserialize_with = "lenient::report")]
    pub fibonacci_retracements: Option<FibonacciRetracements>,
    #[serde(default, deserialize_with = "lenient::report")]
    pub pivot_points: Option<PivotPoints>,
    #[serde(default, deserialize_with = "lenient::report")]
    pub trend_lines: Option<TrendLines>,
    #[serde(default, deserialize_with = "lenient::report")]
    pub support_resistance: Option<SupportResistance>,
    #[serde(default, deserialize_with = "lenient::report")]
    pub optimized_levels: Option<OptimizedLevels>,
}

/// Side of the current price a level sits on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Zone {
    Support,
    Resistance,
}

impl Zone {
    /// Classify a derived level against the current price
    pub fn classify(level: f64, current_price: f64) -> Self {
        if level > current_price {
            Zone::Resistance
        } else {
            Zone::Support
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Zone::Support => "support",
            Zone::Resistance => "resistance",
        }
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct MovingAverage {
    #[serde(default, deserialize_with = "lenient::number")]
    pub value: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub distance_percent: Option<f64>,
    #[serde(default, deserialize_with = "lenient::report")]
    pub support_resistance: Option<Zone>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct FibonacciRetracements {
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub levels: IndexMap<String, FibonacciLevel>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct FibonacciLevel {
    #[serde(default, deserialize_with = "lenient::number")]
    pub price: Option<f64>,
}

/// A map value that may be a number, a numeric string, or garbage
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LevelPrice(pub Option<f64>);

impl<'de> Deserialize<'de> for LevelPrice {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        lenient::number(deserializer).map(LevelPrice)
    }
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct PivotPoints {
    #[serde(default, deserialize_with = "lenient::number")]
    pub pivot: Option<f64>,
    #[serde(default, deserialize_with = "lenient::report")]
    pub resistance_levels: Option<IndexMap<String, LevelPrice>>,
    #[serde(default, deserialize_with = "lenient::report")]
    pub support_levels: Option<IndexMap<String, LevelPrice>>,
}

impl PivotPoints {
    /// True when the server sent an empty pivot object
    pub fn is_empty(&self) -> bool {
        self.pivot.is_none()
            && self.resistance_levels.as_ref().is_none_or(IndexMap::is_empty)
            && self.support_levels.as_ref().is_none_or(IndexMap::is_empty)
    }
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct TrendLines {
    #[serde(default, deserialize_with = "lenient::report")]
    pub support_trend: Option<TrendOrError>,
    #[serde(default, deserialize_with = "lenient::report")]
    pub resistance_trend: Option<TrendOrError>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum TrendOrError {
    Failed {
        error: String,
    },
    Trend {
        #[serde(default, deserialize_with = "lenient::number")]
        current_price: Option<f64>,
        #[serde(default)]
        trend_direction: Option<String>,
    },
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct SupportResistance {
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub resistance_levels: Vec<Level>,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub support_levels: Vec<Level>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct Level {
    #[serde(default, deserialize_with = "lenient::number")]
    pub price: Option<f64>,
    #[serde(default)]
    pub strength: Option<Strength>,
}

/// Level strength, served either as a count or a label
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Strength {
    Number(f64),
    Text(String),
}

impl fmt::Display for Strength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strength::Number(n) if n.fract() == 0.0 => write!(f, "{n:.0}"),
            Strength::Number(n) => write!(f, "{n}"),
            Strength::Text(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct OptimizedLevels {
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub psychological_levels: Vec<DistLevel>,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub round_numbers: Vec<DistLevel>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct DistLevel {
    #[serde(default, deserialize_with = "lenient::number")]
    pub price: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub distance_percent: Option<f64>,
}

// ============================================================================
// Period
// ============================================================================

/// Candle granularity requested from the backend
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Period {
    #[default]
    OneMinute,
    FiveMinutes,
    FifteenMinutes,
    ThirtyMinutes,
    OneHour,
    FourHours,
    OneDay,
}

impl Period {
    /// All selectable periods, in button order
    pub const ALL: [Period; 7] = [
        Period::OneMinute,
        Period::FiveMinutes,
        Period::FifteenMinutes,
        Period::ThirtyMinutes,
        Period::OneHour,
        Period::FourHours,
        Period::OneDay,
    ];

    /// Wire value for the `granularity` query parameter
    pub fn as_str(self) -> &'static str {
        match self {
            Period::OneMinute => "1m",
            Period::FiveMinutes => "5m",
            Period::FifteenMinutes => "15m",
            Period::ThirtyMinutes => "30m",
            Period::OneHour => "1h",
            Period::FourHours => "4h",
            Period::OneDay => "1d",
        }
    }

    /// Human label for the button
    pub fn label(self) -> &'static str {
        match self {
            Period::OneMinute => "1 minute",
            Period::FiveMinutes => "5 minutes",
            Period::FifteenMinutes => "15 minutes",
            Period::ThirtyMinutes => "30 minutes",
            Period::OneHour => "1 hour",
            Period::FourHours => "4 hours",
            Period::OneDay => "1 day",
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Period {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self> {
        // Exchange granularities use upper-case H/D
        let wanted = s.trim().to_ascii_lowercase();
        Period::ALL
            .into_iter()
            .find(|p| p.as_str() == wanted)
            .ok_or_else(|| DashboardError::InvalidPeriod(s.to_string()))
    }
}
