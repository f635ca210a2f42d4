//! Page markup
//!
//! Renders the dashboard body from a [`MemoryDocument`]: header with price
//! and connection status, the period button group and overlay checkboxes,
//! the chart container and one card per analytics list.

use std::fmt::Write as _;

use crate::surface::{MemoryDocument, Overlay, Region, Surface};
use crate::types::Period;

/// Analytics cards in page order
const CARDS: [(Region, &str); 8] = [
    (Region::MovingAverages, "Moving Averages"),
    (Region::Fibonacci, "Fibonacci Retracements"),
    (Region::PivotPoints, "Pivot Points"),
    (Region::TrendLines, "Trend Lines"),
    (Region::Resistance, "Resistance Levels"),
    (Region::Support, "Support Levels"),
    (Region::Psychological, "Psychological Levels"),
    (Region::RoundNumbers, "Round Numbers"),
];

/// One region element with its current class, visibility and content
fn element(doc: &MemoryDocument, tag: &str, region: Region) -> String {
    let hidden = if doc.is_visible(region) { "" } else { r#" style="display:none""# };
    format!(
        r#"<{tag} id="{id}" class="{class}"{hidden}>{content}</{tag}>"#,
        id = region.element_id(),
        class = doc.class(region),
        content = doc.content(region),
    )
}

fn period_buttons(active: Period) -> String {
    let mut out = String::new();
    for period in Period::ALL {
        let class = if period == active { "period-btn active" } else { "period-btn" };
        let _ = write!(
            out,
            r#"<button class="{class}" data-period="{period}">{period}</button>"#
        );
    }
    out
}

fn overlay_toggle(doc: &MemoryDocument, overlay: Overlay, label: &str) -> String {
    let checked = if doc.is_checked(overlay) { " checked" } else { "" };
    format!(
        r#"<label class="overlay-toggle"><input type="checkbox" id="{id}"{checked} disabled> {label}</label>"#,
        id = overlay.element_id(),
    )
}

/// Page body for the current document state
pub fn body(doc: &MemoryDocument) -> String {
    let mut cards = String::new();
    for (region, title) in CARDS {
        let _ = write!(
            cards,
            r#"
            <div class="card">
                <div class="card-header"><span class="card-title">{title}</span></div>
                {list}
            </div>"#,
            list = element(doc, "div", region),
        );
    }

    format!(
        r#"
    {loading}
    <div class="container">
        <header>
            <div class="price-block">
                <h1>ETH/USDT</h1>
                {price}
                {change}
            </div>
            <div class="header-status">
                {dot}
                {status}
                <span class="last-update-label">Last update: {last_update}</span>
            </div>
        </header>

        <div class="controls">
            <div class="period-group">{buttons}</div>
            <div class="overlay-group">{ma}{fib}</div>
        </div>

        <div class="card chart-card">
            <div id="priceChart" class="price-chart"></div>
        </div>

        <div class="grid">{cards}
        </div>
    </div>
    <div id="{toast_id}" class="{toast_class}"{toast_hidden}>{message}</div>
"#,
        loading = element(doc, "div", Region::LoadingOverlay),
        price = element(doc, "div", Region::CurrentPrice),
        change = element(doc, "div", Region::PriceChange),
        dot = element(doc, "span", Region::StatusDot),
        status = element(doc, "span", Region::StatusText),
        last_update = element(doc, "span", Region::LastUpdate),
        buttons = period_buttons(doc.active_period()),
        ma = overlay_toggle(doc, Overlay::MovingAverages, "Moving Averages"),
        fib = overlay_toggle(doc, Overlay::Fibonacci, "Fibonacci"),
        toast_id = Region::ErrorToast.element_id(),
        toast_class = doc.class(Region::ErrorToast),
        toast_hidden = if doc.is_visible(Region::ErrorToast) { "" } else { r#" style="display:none""# },
        message = element(doc, "span", Region::ErrorMessage),
    )
}
