//! Chart projection
//!
//! Builds a complete Plotly-style figure (candlestick trace plus optional
//! horizontal reference lines) from the current snapshot. The figure is
//! always handed over whole; there is no incremental update path.

use serde::Serialize;

use crate::dashboard::format::local_time;
use crate::types::{Candle, Period, Snapshot};

/// Moving averages drawn as reference lines
pub const MA_OVERLAY_LABELS: [&str; 2] = ["MA20", "MA50"];

/// Fibonacci labels drawn as reference lines (extensions are skipped)
pub const FIB_OVERLAY_PREFIX: &str = "Fib_";

const MA_COLORS: [&str; 2] = ["#d29922", "#a371f7"];
const FIB_COLOR: &str = "#58a6ff";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Figure {
    pub data: Vec<Trace>,
    pub layout: Layout,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Trace {
    Candlestick {
        name: String,
        x: Vec<String>,
        open: Vec<f64>,
        high: Vec<f64>,
        low: Vec<f64>,
        close: Vec<f64>,
    },
    Scatter {
        name: String,
        mode: &'static str,
        x: Vec<String>,
        y: Vec<f64>,
        line: Line,
    },
}

impl Trace {
    pub fn name(&self) -> &str {
        match self {
            Trace::Candlestick { name, .. } | Trace::Scatter { name, .. } => name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Line {
    pub color: &'static str,
    pub width: f64,
    pub dash: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layout {
    pub title: String,
    pub showlegend: bool,
    pub xaxis: Axis,
    pub yaxis: Axis,
    pub paper_bgcolor: &'static str,
    pub plot_bgcolor: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Axis {
    pub title: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rangeslider: Option<RangeSlider>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RangeSlider {
    pub visible: bool,
}

/// Chart x-axis label (local time) for an epoch-ms timestamp
fn axis_time(timestamp_ms: i64) -> String {
    local_time(timestamp_ms)
        .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| timestamp_ms.to_string())
}

fn candlestick(klines: &[Candle]) -> Trace {
    Trace::Candlestick {
        name: "ETH/USDT".to_string(),
        x: klines.iter().map(|c| axis_time(c.timestamp_ms)).collect(),
        open: klines.iter().map(|c| c.open).collect(),
        high: klines.iter().map(|c| c.high).collect(),
        low: klines.iter().map(|c| c.low).collect(),
        close: klines.iter().map(|c| c.close).collect(),
    }
}

/// Horizontal line across the visible candle range
fn reference_line(name: &str, price: f64, span: &(String, String), line: Line) -> Trace {
    Trace::Scatter {
        name: name.to_string(),
        mode: "lines",
        x: vec![span.0.clone(), span.1.clone()],
        y: vec![price, price],
        line,
    }
}

/// Build the full figure for the current snapshot
pub fn build_figure(snapshot: &Snapshot, period: Period, show_ma: bool, show_fib: bool) -> Figure {
    let klines = &snapshot.klines;
    let mut data = vec![candlestick(klines)];

    // Reference lines need at least one candle to span
    let span = match (klines.first(), klines.last()) {
        (Some(first), Some(last)) => Some((axis_time(first.timestamp_ms), axis_time(last.timestamp_ms))),
        _ => None,
    };

    if let Some(span) = &span {
        if show_ma {
            if let Some(mas) = &snapshot.analysis.moving_averages {
                for (label, color) in MA_OVERLAY_LABELS.iter().zip(MA_COLORS) {
                    if let Some(value) = mas.get(*label).and_then(|ma| ma.value) {
                        let line = Line { color, width: 1.5, dash: "solid" };
                        data.push(reference_line(label, value, span, line));
                    }
                }
            }
        }

        if show_fib {
            if let Some(fib) = &snapshot.analysis.fibonacci_retracements {
                for (label, level) in &fib.levels {
                    if !label.starts_with(FIB_OVERLAY_PREFIX) {
                        continue;
                    }
                    if let Some(price) = level.price {
                        let line = Line { color: FIB_COLOR, width: 1.0, dash: "dash" };
                        data.push(reference_line(label, price, span, line));
                    }
                }
            }
        }
    }

    Figure {
        data,
        layout: Layout {
            title: format!("ETH/USDT · {}", period.label()),
            showlegend: true,
            xaxis: Axis {
                title: "Time",
                rangeslider: Some(RangeSlider { visible: false }),
            },
            yaxis: Axis {
                title: "Price (USDT)",
                rangeslider: None,
            },
            paper_bgcolor: "#161b22",
            plot_bgcolor: "#0d1117",
        },
    }
}
