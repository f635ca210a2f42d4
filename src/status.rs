//! Status and notification surface
//!
//! Connection indicator, loading overlay, error toast and the headline
//! price pulse. Toasts and pulses revert themselves on a timer; a newer
//! toast or pulse cancels the pending revert of an older one. The loading
//! overlay stays up while any request holds a [`LoadingGuard`].

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use parking_lot::Mutex;

use crate::surface::{Region, Surface};

/// Connection state shown by the status dot
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionStatus {
    Connecting,
    Connected,
    /// Initial load failed
    Error(String),
    /// A recurring poll failed; the timer keeps running
    UpdateFailed,
}

impl ConnectionStatus {
    pub fn dot_class(&self) -> &'static str {
        match self {
            ConnectionStatus::Connecting => "status-dot connecting",
            ConnectionStatus::Connected => "status-dot connected",
            ConnectionStatus::Error(_) | ConnectionStatus::UpdateFailed => "status-dot error",
        }
    }

    pub fn text(&self) -> String {
        match self {
            ConnectionStatus::Connecting => "Connecting...".to_string(),
            ConnectionStatus::Connected => "Connected".to_string(),
            ConnectionStatus::Error(msg) => format!("Connection error: {msg}"),
            ConnectionStatus::UpdateFailed => "Update failed".to_string(),
        }
    }
}

/// Headline color after a price move
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pulse {
    Up,
    Down,
}

/// Writes status, loading, toast and pulse state to the surface
pub struct Notifier<S> {
    surface: Arc<S>,
    toast_for: Duration,
    pulse_for: Duration,
    toast_generation: Arc<AtomicU64>,
    pulse_generation: Arc<AtomicU64>,
    in_flight: Arc<Mutex<usize>>,
}

impl<S: Surface + 'static> Notifier<S> {
    pub fn new(surface: Arc<S>, toast_for: Duration, pulse_for: Duration) -> Self {
        Self {
            surface,
            toast_for,
            pulse_for,
            toast_generation: Arc::new(AtomicU64::new(0)),
            pulse_generation: Arc::new(AtomicU64::new(0)),
            in_flight: Arc::new(Mutex::new(0)),
        }
    }

    pub fn set_status(&self, status: &ConnectionStatus) {
        self.surface.set_class(Region::StatusDot, status.dot_class());
        self.surface.set_text(Region::StatusText, &status.text());
    }

    /// Show the loading overlay until the returned guard is dropped
    pub fn loading(&self) -> LoadingGuard<S> {
        let mut in_flight = self.in_flight.lock();
        *in_flight += 1;
        self.surface.set_visible(Region::LoadingOverlay, true);
        LoadingGuard {
            surface: Arc::clone(&self.surface),
            in_flight: Arc::clone(&self.in_flight),
        }
    }

    /// Show the error toast, hiding it again after the toast duration
    pub fn toast(&self, message: &str) {
        self.surface.set_text(Region::ErrorMessage, message);
        self.surface.set_visible(Region::ErrorToast, true);

        let generation = self.toast_generation.fetch_add(1, Ordering::SeqCst) + 1;
        let latest = Arc::clone(&self.toast_generation);
        let surface = Arc::clone(&self.surface);
        let delay = self.toast_for;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if latest.load(Ordering::SeqCst) == generation {
                surface.set_visible(Region::ErrorToast, false);
            }
        });
    }

    /// Color the headline price, reverting after the pulse duration
    pub fn pulse(&self, direction: Pulse) {
        let base = Region::CurrentPrice.base_class();
        let class = match direction {
            Pulse::Up => format!("{base} positive"),
            Pulse::Down => format!("{base} negative"),
        };
        self.surface.set_class(Region::CurrentPrice, &class);

        let generation = self.pulse_generation.fetch_add(1, Ordering::SeqCst) + 1;
        let latest = Arc::clone(&self.pulse_generation);
        let surface = Arc::clone(&self.surface);
        let delay = self.pulse_for;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if latest.load(Ordering::SeqCst) == generation {
                surface.set_class(Region::CurrentPrice, base);
            }
        });
    }
}

/// One outstanding request; the overlay hides when the last guard drops
pub struct LoadingGuard<S: Surface> {
    surface: Arc<S>,
    in_flight: Arc<Mutex<usize>>,
}

impl<S: Surface> Drop for LoadingGuard<S> {
    fn drop(&mut self) {
        let mut in_flight = self.in_flight.lock();
        *in_flight = in_flight.saturating_sub(1);
        if *in_flight == 0 {
            self.surface.set_visible(Region::LoadingOverlay, false);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::MemoryDocument;

    fn notifier() -> (Arc<MemoryDocument>, Notifier<MemoryDocument>) {
        let doc = Arc::new(MemoryDocument::new());
        let notifier = Notifier::new(Arc::clone(&doc), Duration::from_secs(5), Duration::from_secs(1));
        (doc, notifier)
    }

    #[test]
    fn test_status_rendering() {
        let (doc, notifier) = notifier();

        notifier.set_status(&ConnectionStatus::Connecting);
        assert_eq!(doc.class(Region::StatusDot), "status-dot connecting");
        assert_eq!(doc.content(Region::StatusText), "Connecting...");

        notifier.set_status(&ConnectionStatus::Error("timeout".into()));
        assert_eq!(doc.class(Region::StatusDot), "status-dot error");
        assert_eq!(doc.content(Region::StatusText), "Connection error: timeout");

        notifier.set_status(&ConnectionStatus::UpdateFailed);
        assert_eq!(doc.content(Region::StatusText), "Update failed");
    }

    #[tokio::test(start_paused = true)]
    async fn test_toast_hides_after_duration() {
        let (doc, notifier) = notifier();

        notifier.toast("timeout");
        assert!(doc.is_visible(Region::ErrorToast));
        assert_eq!(doc.content(Region::ErrorMessage), "timeout");

        tokio::time::sleep(Duration::from_millis(4900)).await;
        assert!(doc.is_visible(Region::ErrorToast));

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(!doc.is_visible(Region::ErrorToast));
    }

    #[tokio::test(start_paused = true)]
    async fn test_newer_pulse_keeps_its_color() {
        let (doc, notifier) = notifier();

        notifier.pulse(Pulse::Up);
        tokio::time::sleep(Duration::from_millis(600)).await;
        notifier.pulse(Pulse::Down);

        // First pulse's revert fires at 1000ms but is stale
        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(doc.class(Region::CurrentPrice), "current-price negative");

        // Second pulse reverts at 1600ms
        tokio::time::sleep(Duration::from_millis(400)).await;
        assert_eq!(doc.class(Region::CurrentPrice), "current-price negative");

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(doc.class(Region::CurrentPrice), "current-price");
    }

    #[test]
    fn test_loading_held_until_last_guard() {
        let (doc, notifier) = notifier();

        let first = notifier.loading();
        let second = notifier.loading();
        assert!(doc.is_visible(Region::LoadingOverlay));

        drop(first);
        assert!(doc.is_visible(Region::LoadingOverlay));

        drop(second);
        assert!(!doc.is_visible(Region::LoadingOverlay));

        drop(notifier.loading());
        assert!(!doc.is_visible(Region::LoadingOverlay));
    }
}
