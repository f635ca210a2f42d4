//! Analytics projections
//!
//! One pure function per analytics category: snapshot in, list markup out.
//! A missing sub-report renders a single "no data" row. Lists the server
//! already classifies (moving averages, pivot levels, support/resistance)
//! keep the server's side; derived levels are classified against the
//! current price.

use std::fmt::Write as _;

use crate::dashboard::format::{distance_percent, escape_html, format_percent, format_price};
use crate::surface::Region;
use crate::types::{DistLevel, Level, Snapshot, TrendOrError, Zone};

/// A projection renders one region from the snapshot
pub type Projection = fn(&Snapshot) -> String;

/// Every analytics projection with the region it owns
pub const PROJECTIONS: [(Region, Projection); 8] = [
    (Region::MovingAverages, moving_averages),
    (Region::Fibonacci, fibonacci),
    (Region::PivotPoints, pivot_points),
    (Region::TrendLines, trend_lines),
    (Region::Resistance, resistance_levels),
    (Region::Support, support_levels),
    (Region::Psychological, psychological_levels),
    (Region::RoundNumbers, round_numbers),
];

pub const NO_DATA: &str = r#"<div class="level-item no-data">No data</div>"#;

/// One rendered row
struct LevelRow {
    label: String,
    price: Option<f64>,
    distance: Option<f64>,
    class: &'static str,
    note: Option<String>,
}

impl LevelRow {
    /// Row for a level whose side is decided by the caller
    fn new(label: impl Into<String>, price: Option<f64>, zone: Zone, current: Option<f64>) -> Self {
        Self {
            label: label.into(),
            price,
            distance: price.and_then(|p| distance_percent(p, current)),
            class: zone.as_str(),
            note: None,
        }
    }

    /// Row for a derived level: side from comparison with the current price
    fn derived(label: impl Into<String>, price: Option<f64>, current: Option<f64>) -> Self {
        let zone = match (price, current) {
            (Some(p), Some(c)) => Zone::classify(p, c),
            _ => Zone::Support,
        };
        Self::new(label, price, zone, current)
    }

    fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    fn write(&self, out: &mut String) {
        let _ = write!(
            out,
            r#"<div class="level-item {}"><span class="level-label">{}</span><span class="level-price">{}</span><span class="level-distance">{}</span>"#,
            self.class,
            escape_html(&self.label),
            format_price(self.price),
            format_percent(self.distance),
        );
        if let Some(note) = &self.note {
            let _ = write!(out, r#"<span class="level-note">{}</span>"#, escape_html(note));
        }
        out.push_str("</div>");
    }
}

fn render_rows(rows: &[LevelRow]) -> String {
    if rows.is_empty() {
        return NO_DATA.to_string();
    }
    let mut out = String::new();
    for row in rows {
        row.write(&mut out);
    }
    out
}

pub fn moving_averages(snapshot: &Snapshot) -> String {
    let Some(mas) = &snapshot.analysis.moving_averages else {
        return NO_DATA.to_string();
    };
    let current = snapshot.current_price;

    let rows: Vec<LevelRow> = mas
        .iter()
        .map(|(label, ma)| {
            let mut row = match ma.support_resistance {
                Some(zone) => LevelRow::new(label.as_str(), ma.value, zone, current),
                None => LevelRow::derived(label.as_str(), ma.value, current),
            };
            // Server distance only when no local price is known
            if row.distance.is_none() {
                row.distance = ma.distance_percent.map(f64::abs);
            }
            row
        })
        .collect();
    render_rows(&rows)
}

pub fn fibonacci(snapshot: &Snapshot) -> String {
    let Some(fib) = &snapshot.analysis.fibonacci_retracements else {
        return NO_DATA.to_string();
    };
    let current = snapshot.current_price;

    let rows: Vec<LevelRow> = fib
        .levels
        .iter()
        .map(|(label, level)| LevelRow::derived(label.as_str(), level.price, current))
        .collect();
    render_rows(&rows)
}

pub fn pivot_points(snapshot: &Snapshot) -> String {
    let Some(pivots) = snapshot.analysis.pivot_points.as_ref().filter(|p| !p.is_empty()) else {
        return NO_DATA.to_string();
    };
    let current = snapshot.current_price;

    let mut rows = Vec::new();
    for (label, price) in pivots.resistance_levels.iter().flatten() {
        rows.push(LevelRow::new(label.as_str(), price.0, Zone::Resistance, current));
    }
    if let Some(pivot) = pivots.pivot {
        let mut row = LevelRow::derived("Pivot", Some(pivot), current);
        row.class = "pivot";
        rows.push(row);
    }
    for (label, price) in pivots.support_levels.iter().flatten() {
        rows.push(LevelRow::new(label.as_str(), price.0, Zone::Support, current));
    }
    render_rows(&rows)
}

pub fn trend_lines(snapshot: &Snapshot) -> String {
    let Some(trends) = &snapshot.analysis.trend_lines else {
        return NO_DATA.to_string();
    };
    let current = snapshot.current_price;

    let lines = [
        ("Support Trend", Zone::Support, &trends.support_trend),
        ("Resistance Trend", Zone::Resistance, &trends.resistance_trend),
    ];

    let mut rows = Vec::new();
    for (label, zone, trend) in lines {
        match trend {
            Some(TrendOrError::Trend { current_price, trend_direction }) => {
                let direction = trend_direction.as_deref().unwrap_or("flat");
                rows.push(LevelRow::new(label, *current_price, zone, current).with_note(direction));
            }
            Some(TrendOrError::Failed { error }) => {
                let mut row = LevelRow::new(label, None, zone, current).with_note(error.as_str());
                row.class = "error";
                rows.push(row);
            }
            None => {}
        }
    }
    render_rows(&rows)
}

fn strength_rows(levels: &[Level], prefix: char, zone: Zone, current: Option<f64>) -> Vec<LevelRow> {
    levels
        .iter()
        .enumerate()
        .map(|(idx, level)| {
            let row = LevelRow::new(format!("{prefix}{}", idx + 1), level.price, zone, current);
            match &level.strength {
                Some(strength) => row.with_note(format!("strength {strength}")),
                None => row,
            }
        })
        .collect()
}

pub fn resistance_levels(snapshot: &Snapshot) -> String {
    let Some(sr) = &snapshot.analysis.support_resistance else {
        return NO_DATA.to_string();
    };
    render_rows(&strength_rows(
        &sr.resistance_levels,
        'R',
        Zone::Resistance,
        snapshot.current_price,
    ))
}

pub fn support_levels(snapshot: &Snapshot) -> String {
    let Some(sr) = &snapshot.analysis.support_resistance else {
        return NO_DATA.to_string();
    };
    render_rows(&strength_rows(&sr.support_levels, 'S', Zone::Support, snapshot.current_price))
}

fn distance_rows(levels: &[DistLevel], current: Option<f64>) -> Vec<LevelRow> {
    levels
        .iter()
        .map(|level| {
            let label = format_price(level.price);
            let mut row = LevelRow::derived(label, level.price, current);
            // Fall back to the server's figure when no local price is known
            if row.distance.is_none() {
                row.distance = level.distance_percent.map(f64::abs);
            }
            row
        })
        .collect()
}

pub fn psychological_levels(snapshot: &Snapshot) -> String {
    let Some(optimized) = &snapshot.analysis.optimized_levels else {
        return NO_DATA.to_string();
    };
    render_rows(&distance_rows(&optimized.psychological_levels, snapshot.current_price))
}

pub fn round_numbers(snapshot: &Snapshot) -> String {
    let Some(optimized) = &snapshot.analysis.optimized_levels else {
        return NO_DATA.to_string();
    };
    render_rows(&distance_rows(&optimized.round_numbers, snapshot.current_price))
}

/// Absolute and relative move between two headline prices
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceChange {
    pub change: f64,
    pub percent: f64,
}

impl PriceChange {
    /// `None` when there is nothing to show (unknown, unchanged or zero base)
    pub fn between(previous: Option<f64>, current: Option<f64>) -> Option<Self> {
        let (old, new) = (previous?, current?);
        if old == 0.0 || (new - old).abs() < f64::EPSILON {
            return None;
        }
        let change = new - old;
        Some(Self {
            change,
            percent: change / old * 100.0,
        })
    }

    pub fn is_positive(&self) -> bool {
        self.change >= 0.0
    }
}
