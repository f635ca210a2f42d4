//! ETH Dashboard - polling client for server-computed technical analysis
//!
//! Fetches price, analysis and candles from the analytics API and projects
//! them onto a display surface.
//!
//! # Architecture
//! - `client`: HTTP feed for `/latest`, `/klines` and `/status`
//! - `store`: current snapshot, active period and request sequencing
//! - `controller`: initial load, poll ticks, period and overlay bindings
//! - `poller`: fixed-interval poll loop
//! - `dashboard`: list projections, chart figure and the page writer
//! - `surface` / `status`: view layer and connection/toast/pulse state
//!
//! # Refresh model
//! - `latest` every poll interval replaces the whole snapshot
//! - `klines` on period change replaces only the candle series
//! - overlay toggles redraw the chart from the stored snapshot

// Clippy configuration for display/analysis code patterns
#![allow(clippy::cast_precision_loss)] // Float casts OK for display
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::doc_markdown)] // Doc style flexibility

pub mod bindings;
pub mod client;
pub mod config;
pub mod controller;
pub mod dashboard;
pub mod error;
pub mod poller;
pub mod status;
pub mod store;
pub mod surface;
pub mod types;

#[cfg(test)]
mod testing;

pub use bindings::Command;
pub use client::{ApiClient, Feed};
pub use config::{Config, OverlapPolicy};
pub use controller::Dashboard;
pub use dashboard::render_page;
pub use error::{DashboardError, Result};
pub use poller::PollHandle;
pub use surface::{MemoryDocument, Overlay, Region, Surface};
pub use types::*;
