//! Dashboard rendering
//!
//! Pure projections from the snapshot to display content, plus the page
//! writer that serializes a [`MemoryDocument`] into a standalone HTML file.
//!
//! # Layout
//! - `format.rs`: number, percent and clock formatting
//! - `projections.rs`: one list projection per analytics category
//! - `chart.rs`: candlestick figure with MA / Fibonacci reference lines
//! - `html.rs`, `css.rs`, `js.rs`: page markup, styles and chart bootstrap

pub mod chart;
mod css;
pub mod format;
mod html;
mod js;
pub mod projections;

use std::time::Duration;

pub use format::escape_html;

use crate::surface::MemoryDocument;

/// Figure JSON safe to embed inside a `<script>` element
fn figure_json(doc: &MemoryDocument) -> String {
    doc.chart()
        .and_then(|figure| serde_json::to_string(&figure).ok())
        .map_or_else(|| "null".to_string(), |json| json.replace("</", "<\\/"))
}

/// Generate the complete page for the document's current state
///
/// A non-zero `refresh` makes the page reload itself on that interval.
pub fn render_page(doc: &MemoryDocument, refresh: Duration) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>ETH/USDT Dashboard</title>
    <script src="{plotly}"></script>
    <style>
{css}
    </style>
</head>
<body data-refresh-ms="{refresh_ms}">
{html}
    <script type="application/json" id="figureData">{figure}</script>
    <script>
{js}
    </script>
</body>
</html>"#,
        plotly = js::PLOTLY_CDN,
        css = css::STYLES,
        refresh_ms = refresh.as_millis(),
        html = html::body(doc),
        figure = figure_json(doc),
        js = js::SCRIPT,
    )
}
