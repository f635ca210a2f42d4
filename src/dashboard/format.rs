//! Formatting utilities shared by every projection

use chrono::{DateTime, Local};
use serde_json::Value;

use crate::types::as_number;

/// Placeholder for anything that is not a finite number
pub const PLACEHOLDER: &str = "--";

/// Anything a price cell may be handed
pub trait PriceInput {
    fn as_price(&self) -> Option<f64>;
}

impl PriceInput for f64 {
    fn as_price(&self) -> Option<f64> {
        self.is_finite().then_some(*self)
    }
}

impl PriceInput for Option<f64> {
    fn as_price(&self) -> Option<f64> {
        self.and_then(|v| v.as_price())
    }
}

impl PriceInput for &str {
    fn as_price(&self) -> Option<f64> {
        self.trim().parse::<f64>().ok().and_then(|v| v.as_price())
    }
}

impl PriceInput for &Value {
    fn as_price(&self) -> Option<f64> {
        as_number(self)
    }
}

/// `1234.5` -> `"1,234.50"`, non-numeric -> `"--"`
pub fn format_price<P: PriceInput>(value: P) -> String {
    match value.as_price() {
        Some(price) => group_thousands(&format!("{price:.2}")),
        None => PLACEHOLDER.to_string(),
    }
}

/// `0.1234` -> `"0.12%"`
pub fn format_percent(value: Option<f64>) -> String {
    match value.filter(|v| v.is_finite()) {
        Some(pct) => format!("{pct:.2}%"),
        None => PLACEHOLDER.to_string(),
    }
}

/// `5.0` -> `"+5.00"`, `-5.0` -> `"-5.00"`
pub fn format_signed(value: f64) -> String {
    let sign = if value >= 0.0 { "+" } else { "" };
    format!("{sign}{value:.2}")
}

/// `5.0` -> `"+5.00%"`
pub fn format_signed_percent(value: f64) -> String {
    format!("{}%", format_signed(value))
}

/// |level - price| / price * 100; `None` when the price is zero or unknown
pub fn distance_percent(level: f64, current_price: Option<f64>) -> Option<f64> {
    let price = current_price.filter(|p| p.is_finite() && *p != 0.0)?;
    Some(((level - price) / price * 100.0).abs())
}

/// Insert thousands separators into an already-rounded decimal string
fn group_thousands(formatted: &str) -> String {
    let (sign, unsigned) = match formatted.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", formatted),
    };
    let (int_part, frac_part) = unsigned.split_once('.').unwrap_or((unsigned, ""));

    let mut grouped = String::with_capacity(formatted.len() + int_part.len() / 3);
    for (idx, ch) in int_part.chars().enumerate() {
        if idx > 0 && (int_part.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if frac_part.is_empty() {
        format!("{sign}{grouped}")
    } else {
        format!("{sign}{grouped}.{frac_part}")
    }
}

/// Epoch-ms timestamp in the local timezone; every time on the page uses it
pub fn local_time(timestamp_ms: i64) -> Option<DateTime<Local>> {
    DateTime::from_timestamp_millis(timestamp_ms).map(|t| t.with_timezone(&Local))
}

/// Local `HH:MM:SS` for a server timestamp (epoch ms), or now when absent
pub fn format_clock(timestamp_ms: Option<i64>) -> String {
    timestamp_ms
        .and_then(local_time)
        .unwrap_or_else(Local::now)
        .format("%H:%M:%S")
        .to_string()
}

/// Escape text for insertion into markup
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
