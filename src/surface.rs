//! Display surface the dashboard renders into
//!
//! A [`Surface`] is the host's view layer: regions addressed by element id,
//! the period button group, the two overlay checkboxes and the chart
//! container. [`MemoryDocument`] keeps everything in memory and can be
//! serialized into a standalone page (see `dashboard::render_page`).

use std::collections::HashMap;

use parking_lot::Mutex;

use crate::dashboard::chart::Figure;
use crate::dashboard::escape_html;
use crate::types::Period;

/// Element regions written by the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Region {
    CurrentPrice,
    PriceChange,
    StatusDot,
    StatusText,
    LastUpdate,
    LoadingOverlay,
    ErrorToast,
    ErrorMessage,
    MovingAverages,
    Fibonacci,
    PivotPoints,
    TrendLines,
    Resistance,
    Support,
    Psychological,
    RoundNumbers,
}

impl Region {
    pub const ALL: [Region; 16] = [
        Region::CurrentPrice,
        Region::PriceChange,
        Region::StatusDot,
        Region::StatusText,
        Region::LastUpdate,
        Region::LoadingOverlay,
        Region::ErrorToast,
        Region::ErrorMessage,
        Region::MovingAverages,
        Region::Fibonacci,
        Region::PivotPoints,
        Region::TrendLines,
        Region::Resistance,
        Region::Support,
        Region::Psychological,
        Region::RoundNumbers,
    ];

    /// DOM element id
    pub fn element_id(self) -> &'static str {
        match self {
            Region::CurrentPrice => "currentPrice",
            Region::PriceChange => "priceChange",
            Region::StatusDot => "statusDot",
            Region::StatusText => "statusText",
            Region::LastUpdate => "lastUpdate",
            Region::LoadingOverlay => "loadingOverlay",
            Region::ErrorToast => "errorToast",
            Region::ErrorMessage => "errorMessage",
            Region::MovingAverages => "maList",
            Region::Fibonacci => "fibList",
            Region::PivotPoints => "pivotList",
            Region::TrendLines => "trendList",
            Region::Resistance => "resistanceList",
            Region::Support => "supportList",
            Region::Psychological => "psychologicalList",
            Region::RoundNumbers => "roundNumberList",
        }
    }

    /// Class list the page starts with
    pub fn base_class(self) -> &'static str {
        match self {
            Region::CurrentPrice => "current-price",
            Region::PriceChange => "price-change",
            Region::StatusDot => "status-dot",
            Region::StatusText => "status-text",
            Region::LastUpdate => "last-update",
            Region::LoadingOverlay => "loading-overlay",
            Region::ErrorToast => "error-toast",
            Region::ErrorMessage => "error-message",
            _ => "level-list",
        }
    }
}

/// Chart overlay checkboxes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Overlay {
    MovingAverages,
    Fibonacci,
}

impl Overlay {
    pub fn element_id(self) -> &'static str {
        match self {
            Overlay::MovingAverages => "showMA",
            Overlay::Fibonacci => "showFib",
        }
    }
}

/// Host view layer
///
/// Every write is a full overwrite of the addressed element.
pub trait Surface: Send + Sync {
    /// Replace the element's content with escaped text
    fn set_text(&self, region: Region, text: &str);

    /// Replace the element's content with trusted markup
    fn set_html(&self, region: Region, html: &str);

    /// Replace the element's class list
    fn set_class(&self, region: Region, class: &str);

    fn set_visible(&self, region: Region, visible: bool);

    /// Mark one period button active and deactivate its siblings
    fn set_active_period(&self, period: Period);

    fn is_checked(&self, overlay: Overlay) -> bool;

    fn set_checked(&self, overlay: Overlay, checked: bool);

    /// Hand a complete figure to the charting library (full replace)
    fn replace_chart(&self, figure: &Figure);
}

#[derive(Debug, Clone)]
struct Element {
    html: String,
    class: String,
    visible: bool,
}

#[derive(Debug)]
struct DocumentState {
    elements: HashMap<Region, Element>,
    active_period: Period,
    checked: HashMap<Overlay, bool>,
    chart: Option<Figure>,
    chart_renders: usize,
}

/// In-memory surface
#[derive(Debug)]
pub struct MemoryDocument {
    state: Mutex<DocumentState>,
}

impl Default for MemoryDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDocument {
    /// Fresh page: loading overlay up, toast hidden, both overlays checked
    pub fn new() -> Self {
        let elements = Region::ALL
            .into_iter()
            .map(|region| {
                let element = Element {
                    html: String::new(),
                    class: region.base_class().to_string(),
                    visible: region != Region::ErrorToast,
                };
                (region, element)
            })
            .collect();

        let checked = [(Overlay::MovingAverages, true), (Overlay::Fibonacci, true)]
            .into_iter()
            .collect();

        Self {
            state: Mutex::new(DocumentState {
                elements,
                active_period: Period::default(),
                checked,
                chart: None,
                chart_renders: 0,
            }),
        }
    }

    /// Current markup of a region
    pub fn content(&self, region: Region) -> String {
        self.state
            .lock()
            .elements
            .get(&region)
            .map(|e| e.html.clone())
            .unwrap_or_default()
    }

    pub fn class(&self, region: Region) -> String {
        self.state
            .lock()
            .elements
            .get(&region)
            .map(|e| e.class.clone())
            .unwrap_or_default()
    }

    pub fn is_visible(&self, region: Region) -> bool {
        self.state.lock().elements.get(&region).is_some_and(|e| e.visible)
    }

    pub fn active_period(&self) -> Period {
        self.state.lock().active_period
    }

    /// Last figure handed to the chart
    pub fn chart(&self) -> Option<Figure> {
        self.state.lock().chart.clone()
    }

    /// Number of full chart replaces so far
    pub fn chart_renders(&self) -> usize {
        self.state.lock().chart_renders
    }

    fn update(&self, region: Region, apply: impl FnOnce(&mut Element)) {
        let mut state = self.state.lock();
        if let Some(element) = state.elements.get_mut(&region) {
            apply(element);
        }
    }
}

impl Surface for MemoryDocument {
    fn set_text(&self, region: Region, text: &str) {
        let html = escape_html(text);
        self.update(region, |e| e.html = html);
    }

    fn set_html(&self, region: Region, html: &str) {
        self.update(region, |e| e.html = html.to_string());
    }

    fn set_class(&self, region: Region, class: &str) {
        self.update(region, |e| e.class = class.to_string());
    }

    fn set_visible(&self, region: Region, visible: bool) {
        self.update(region, |e| e.visible = visible);
    }

    fn set_active_period(&self, period: Period) {
        self.state.lock().active_period = period;
    }

    fn is_checked(&self, overlay: Overlay) -> bool {
        self.state.lock().checked.get(&overlay).copied().unwrap_or(false)
    }

    fn set_checked(&self, overlay: Overlay, checked: bool) {
        self.state.lock().checked.insert(overlay, checked);
    }

    fn replace_chart(&self, figure: &Figure) {
        let mut state = self.state.lock();
        state.chart = Some(figure.clone());
        state.chart_renders += 1;
    }
}
