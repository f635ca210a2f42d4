//! Dashboard controller
//!
//! Owns the application state and wires the data fetcher, the render
//! pipeline and the status surface together. All operations take `&self`;
//! the state lock is never held across an await, and a snapshot is applied
//! and rendered under the same lock so two responses cannot interleave
//! their writes.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, error, info, warn};

use crate::bindings::Command;
use crate::client::Feed;
use crate::config::Config;
use crate::dashboard::chart::build_figure;
use crate::dashboard::format::{format_clock, format_price, format_signed, format_signed_percent};
use crate::dashboard::projections::{PROJECTIONS, PriceChange};
use crate::error::{DashboardError, Result};
use crate::poller::{self, PollHandle};
use crate::status::{ConnectionStatus, Notifier, Pulse};
use crate::store::AppState;
use crate::surface::{Overlay, Region, Surface};
use crate::types::{BackendStatus, Period, Snapshot};

/// What became of one `latest` request
#[derive(Debug)]
pub enum LatestOutcome {
    /// Snapshot stored and rendered
    Applied,
    /// Response arrived after a newer one and was dropped
    Stale,
    /// Tick issued nothing because a request was in flight
    Skipped,
    Failed(DashboardError),
}

/// Single controller owning the snapshot store and UI state
pub struct Dashboard<F, S> {
    feed: F,
    surface: Arc<S>,
    notifier: Notifier<S>,
    config: Config,
    state: Mutex<AppState>,
}

impl<F, S> Dashboard<F, S>
where
    F: Feed + 'static,
    S: Surface + 'static,
{
    pub fn new(feed: F, surface: Arc<S>, config: Config) -> Self {
        let notifier = Notifier::new(Arc::clone(&surface), config.toast(), config.pulse());
        let state = Mutex::new(AppState::new(config.default_period));
        Self {
            feed,
            surface,
            notifier,
            config,
            state,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn feed(&self) -> &F {
        &self.feed
    }

    /// Copy of the current snapshot
    pub fn snapshot(&self) -> Snapshot {
        self.state.lock().store.snapshot().clone()
    }

    pub fn period(&self) -> Period {
        self.state.lock().store.period()
    }

    /// Initial load: one `latest`, then the candle series for the period
    ///
    /// A failure of either request is shown as a toast as well as on the
    /// status dot.
    pub async fn start(&self) -> Result<()> {
        info!(period = %self.period(), "Loading initial snapshot");
        let _loading = self.notifier.loading();
        self.notifier.set_status(&ConnectionStatus::Connecting);
        self.surface.set_active_period(self.period());

        let result = match self.fetch_latest().await {
            LatestOutcome::Failed(err) => Err(err),
            _ => self.refresh_klines().await,
        };

        if let Err(err) = &result {
            error!(error = %err, "Initial load failed");
            let message = err.user_message();
            self.notifier.set_status(&ConnectionStatus::Error(message.clone()));
            self.notifier.toast(&message);
        }
        result
    }

    /// One recurring poll; failures only touch the status text
    pub async fn poll_tick(&self) {
        if let LatestOutcome::Failed(err) = self.fetch_latest().await {
            warn!(error = %err, "Snapshot update failed");
            self.notifier.set_status(&ConnectionStatus::UpdateFailed);
        }
    }

    /// Fetch `latest` and apply it if the overlap policy allows
    pub async fn fetch_latest(&self) -> LatestOutcome {
        let policy = self.config.overlap_policy;
        let Some(seq) = self.state.lock().requests.begin(policy) else {
            debug!("Previous snapshot request still in flight, skipping tick");
            return LatestOutcome::Skipped;
        };

        let loading = self.notifier.loading();
        let result = self.feed.latest().await;
        drop(loading);

        let mut state = self.state.lock();
        let current = state.requests.finish(seq, result.is_ok(), policy);
        match result {
            Ok(snapshot) if current => {
                let previous = state.store.replace(snapshot);
                let period = state.store.period();
                self.render_snapshot(state.store.snapshot(), previous, period);
                debug!(seq, price = ?state.store.snapshot().current_price, "Snapshot applied");
                LatestOutcome::Applied
            }
            Ok(_) => {
                debug!(seq, "Discarding stale snapshot");
                LatestOutcome::Stale
            }
            Err(err) if current => LatestOutcome::Failed(err),
            Err(err) => {
                debug!(seq, error = %err, "Ignoring failure of superseded request");
                LatestOutcome::Stale
            }
        }
    }

    /// Fetch candles for the active period and redraw the chart
    ///
    /// Only `klines` is replaced; price and analysis stay until the next poll.
    pub async fn refresh_klines(&self) -> Result<()> {
        let period = self.period();
        let limit = self.config.klines_limit;
        debug!(%period, limit, "Fetching candles");

        let loading = self.notifier.loading();
        let result = self.feed.klines(period, limit).await;
        drop(loading);

        match result {
            Ok(klines) => {
                let mut state = self.state.lock();
                if state.store.period() != period {
                    debug!(%period, "Discarding candles for a replaced period");
                    return Ok(());
                }
                let count = klines.len();
                state.store.replace_klines(klines);
                self.render_chart(state.store.snapshot(), period);
                debug!(%period, count, "Candles applied");
                Ok(())
            }
            Err(err) => {
                warn!(%period, error = %err, "Candle update failed");
                self.notifier.set_status(&ConnectionStatus::UpdateFailed);
                Err(err)
            }
        }
    }

    /// Period button: exclusive selection, then one candle refetch
    pub async fn select_period(&self, period: Period) -> Result<()> {
        self.state.lock().store.set_period(period);
        self.surface.set_active_period(period);
        info!(%period, "Period changed");
        self.refresh_klines().await
    }

    /// Overlay checkbox: redraw the chart, no network
    pub fn set_overlay(&self, overlay: Overlay, enabled: bool) {
        self.surface.set_checked(overlay, enabled);
        let state = self.state.lock();
        self.render_chart(state.store.snapshot(), state.store.period());
        debug!(?overlay, enabled, "Overlay toggled");
    }

    /// Dispatch one input binding
    pub async fn handle(&self, command: Command) -> Result<()> {
        match command {
            Command::SelectPeriod(period) => self.select_period(period).await,
            Command::SetOverlay(overlay, enabled) => {
                self.set_overlay(overlay, enabled);
                Ok(())
            }
            Command::Refresh => {
                self.poll_tick().await;
                Ok(())
            }
            Command::Quit => Ok(()),
        }
    }

    /// Probe the backend's `/status` endpoint
    pub async fn check_backend(&self) -> Result<BackendStatus> {
        let status = self.feed.status().await?;
        if status.success && status.has_data {
            info!(status = %status.status, last_update = ?status.last_update, "Backend reachable");
        } else {
            warn!(status = %status.status, has_data = status.has_data, "Backend reachable but has no data yet");
        }
        Ok(status)
    }

    /// Start the recurring poll; dropping the handle stops it
    pub fn start_polling(self: &Arc<Self>) -> PollHandle {
        poller::spawn(Arc::clone(self), self.config.poll_interval())
    }

    fn render_snapshot(&self, snapshot: &Snapshot, previous: Option<f64>, period: Period) {
        self.surface
            .set_text(Region::CurrentPrice, &format_price(snapshot.current_price));

        if let Some(change) = PriceChange::between(previous, snapshot.current_price) {
            let text = format!(
                "{} ({})",
                format_signed(change.change),
                format_signed_percent(change.percent)
            );
            self.surface.set_text(Region::PriceChange, &text);
            let (class, pulse) = if change.is_positive() {
                ("price-change positive", Pulse::Up)
            } else {
                ("price-change negative", Pulse::Down)
            };
            self.surface.set_class(Region::PriceChange, class);
            self.notifier.pulse(pulse);
        }

        for (region, project) in PROJECTIONS {
            self.surface.set_html(region, &project(snapshot));
        }

        self.surface
            .set_text(Region::LastUpdate, &format_clock(snapshot.timestamp));
        self.render_chart(snapshot, period);
        self.notifier.set_status(&ConnectionStatus::Connected);
    }

    fn render_chart(&self, snapshot: &Snapshot, period: Period) {
        let figure = build_figure(
            snapshot,
            period,
            self.surface.is_checked(Overlay::MovingAverages),
            self.surface.is_checked(Overlay::Fibonacci),
        );
        self.surface.replace_chart(&figure);
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::config::OverlapPolicy;
    use crate::dashboard::projections::NO_DATA;
    use crate::surface::MemoryDocument;
    use crate::testing::{ScriptedFeed, candles, priced};

    fn dashboard(feed: ScriptedFeed, policy: OverlapPolicy) -> (Arc<MemoryDocument>, Dashboard<ScriptedFeed, MemoryDocument>) {
        let doc = Arc::new(MemoryDocument::new());
        let config = Config {
            overlap_policy: policy,
            ..Config::default()
        };
        (Arc::clone(&doc), Dashboard::new(feed, doc, config))
    }

    #[tokio::test(start_paused = true)]
    async fn test_initial_load_success() {
        let feed = ScriptedFeed::new();
        feed.push_latest(Duration::ZERO, Ok(priced(2450.5)));
        feed.push_klines(Duration::ZERO, Ok(candles(3)));
        let (doc, dashboard) = dashboard(feed, OverlapPolicy::Supersede);

        dashboard.start().await.unwrap();

        assert!(!doc.is_visible(Region::LoadingOverlay));
        assert_eq!(doc.class(Region::StatusDot), "status-dot connected");
        assert_eq!(doc.content(Region::CurrentPrice), "2,450.50");
        assert_ne!(doc.content(Region::MovingAverages), NO_DATA);
        assert_eq!(doc.content(Region::TrendLines), NO_DATA);
        assert_eq!(doc.content(Region::LastUpdate).len(), 8);
        // No previous price yet
        assert_eq!(doc.content(Region::PriceChange), "");

        let feed = &dashboard.feed;
        assert_eq!(feed.latest_calls(), 1);
        assert_eq!(feed.klines_calls(), vec![(Period::OneMinute, 100)]);
        assert_eq!(dashboard.snapshot().klines.len(), 3);

        let figure = doc.chart().unwrap();
        assert_eq!(figure.data.len(), 2, "candles + MA20 line");
    }

    #[tokio::test(start_paused = true)]
    async fn test_initial_load_failure_shows_toast() {
        let feed = ScriptedFeed::new();
        feed.push_latest(Duration::ZERO, Err(DashboardError::Api("timeout".into())));
        let (doc, dashboard) = dashboard(feed, OverlapPolicy::Supersede);

        let err = dashboard.start().await.unwrap_err();
        assert!(matches!(err, DashboardError::Api(_)));

        assert_eq!(doc.class(Region::StatusDot), "status-dot error");
        assert!(doc.content(Region::StatusText).contains("timeout"));
        assert!(doc.is_visible(Region::ErrorToast));
        assert!(doc.content(Region::ErrorMessage).contains("timeout"));
        assert!(!doc.is_visible(Region::LoadingOverlay));

        assert_eq!(dashboard.snapshot(), Snapshot::default());
        assert!(dashboard.feed.klines_calls().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_initial_candle_failure_shows_toast() {
        let feed = ScriptedFeed::new();
        feed.push_latest(Duration::ZERO, Ok(priced(100.0)));
        feed.push_klines(Duration::ZERO, Err(DashboardError::Api("timeout".into())));
        let (doc, dashboard) = dashboard(feed, OverlapPolicy::Supersede);

        assert!(dashboard.start().await.is_err());

        assert_eq!(doc.content(Region::StatusText), "Connection error: timeout");
        assert!(doc.is_visible(Region::ErrorToast));
        assert!(!doc.is_visible(Region::LoadingOverlay));
        // The snapshot itself was applied
        assert_eq!(dashboard.snapshot().current_price, Some(100.0));
    }

    #[tokio::test(start_paused = true)]
    async fn test_loading_shown_during_candle_fetch() {
        let feed = ScriptedFeed::new();
        feed.push_klines(Duration::from_millis(500), Ok(candles(3)));
        let (doc, dashboard) = dashboard(feed, OverlapPolicy::Supersede);
        doc.set_visible(Region::LoadingOverlay, false);

        let (result, during) = futures::join!(dashboard.select_period(Period::OneHour), async {
            tokio::time::sleep(Duration::from_millis(100)).await;
            doc.is_visible(Region::LoadingOverlay)
        });
        result.unwrap();

        assert!(during);
        assert!(!doc.is_visible(Region::LoadingOverlay));
    }

    #[tokio::test(start_paused = true)]
    async fn test_loading_shown_during_poll() {
        let feed = ScriptedFeed::new();
        feed.push_latest(Duration::from_millis(300), Ok(priced(10.0)));
        let (doc, dashboard) = dashboard(feed, OverlapPolicy::Supersede);
        doc.set_visible(Region::LoadingOverlay, false);

        let ((), during) = futures::join!(dashboard.poll_tick(), async {
            tokio::time::sleep(Duration::from_millis(100)).await;
            doc.is_visible(Region::LoadingOverlay)
        });

        assert!(during);
        assert!(!doc.is_visible(Region::LoadingOverlay));
    }

    #[tokio::test(start_paused = true)]
    async fn test_poll_failure_keeps_snapshot() {
        let feed = ScriptedFeed::new();
        feed.push_latest(Duration::ZERO, Ok(priced(100.0)));
        feed.push_klines(Duration::ZERO, Ok(candles(2)));
        feed.push_latest(Duration::ZERO, Err(DashboardError::Api("timeout".into())));
        let (doc, dashboard) = dashboard(feed, OverlapPolicy::Supersede);

        dashboard.start().await.unwrap();
        dashboard.poll_tick().await;

        assert_eq!(doc.content(Region::StatusText), "Update failed");
        assert_eq!(doc.class(Region::StatusDot), "status-dot error");
        assert!(!doc.is_visible(Region::ErrorToast), "poll failures do not toast");
        assert_eq!(dashboard.snapshot().current_price, Some(100.0));
        assert_eq!(doc.content(Region::CurrentPrice), "100.00");
    }

    #[tokio::test(start_paused = true)]
    async fn test_poll_recovers_status() {
        let feed = ScriptedFeed::new();
        feed.push_latest(Duration::ZERO, Ok(priced(100.0)));
        feed.push_klines(Duration::ZERO, Ok(candles(2)));
        feed.push_latest(Duration::ZERO, Err(DashboardError::Network("refused".into())));
        feed.push_latest(Duration::ZERO, Ok(priced(101.0)));
        let (doc, dashboard) = dashboard(feed, OverlapPolicy::Supersede);

        dashboard.start().await.unwrap();
        dashboard.poll_tick().await;
        dashboard.poll_tick().await;

        assert_eq!(doc.content(Region::StatusText), "Connected");
        assert_eq!(doc.content(Region::CurrentPrice), "101.00");
    }

    #[tokio::test(start_paused = true)]
    async fn test_price_change_pulse() {
        let feed = ScriptedFeed::new();
        feed.push_latest(Duration::ZERO, Ok(priced(100.0)));
        feed.push_klines(Duration::ZERO, Ok(candles(2)));
        feed.push_latest(Duration::ZERO, Ok(priced(105.0)));
        let (doc, dashboard) = dashboard(feed, OverlapPolicy::Supersede);

        dashboard.start().await.unwrap();
        dashboard.poll_tick().await;

        assert_eq!(doc.content(Region::PriceChange), "+5.00 (+5.00%)");
        assert_eq!(doc.class(Region::PriceChange), "price-change positive");
        assert_eq!(doc.class(Region::CurrentPrice), "current-price positive");

        tokio::time::sleep(Duration::from_millis(999)).await;
        assert_eq!(doc.class(Region::CurrentPrice), "current-price positive");

        tokio::time::sleep(Duration::from_millis(2)).await;
        assert_eq!(doc.class(Region::CurrentPrice), "current-price");
        // The change text itself stays
        assert_eq!(doc.content(Region::PriceChange), "+5.00 (+5.00%)");
    }

    #[tokio::test(start_paused = true)]
    async fn test_price_drop_is_negative() {
        let feed = ScriptedFeed::new();
        feed.push_latest(Duration::ZERO, Ok(priced(200.0)));
        feed.push_klines(Duration::ZERO, Ok(candles(2)));
        feed.push_latest(Duration::ZERO, Ok(priced(190.0)));
        let (doc, dashboard) = dashboard(feed, OverlapPolicy::Supersede);

        dashboard.start().await.unwrap();
        dashboard.poll_tick().await;

        assert_eq!(doc.content(Region::PriceChange), "-10.00 (-5.00%)");
        assert_eq!(doc.class(Region::CurrentPrice), "current-price negative");
    }

    #[tokio::test(start_paused = true)]
    async fn test_period_change_refetches_candles_only() {
        let feed = ScriptedFeed::new();
        feed.push_latest(Duration::ZERO, Ok(priced(100.0)));
        feed.push_klines(Duration::ZERO, Ok(candles(2)));
        feed.push_klines(Duration::ZERO, Ok(candles(5)));
        let (doc, dashboard) = dashboard(feed, OverlapPolicy::Supersede);

        dashboard.start().await.unwrap();
        let before = dashboard.snapshot();

        dashboard.select_period(Period::OneHour).await.unwrap();

        let feed = &dashboard.feed;
        assert_eq!(feed.latest_calls(), 1);
        assert_eq!(
            feed.klines_calls(),
            vec![(Period::OneMinute, 100), (Period::OneHour, 100)]
        );

        let after = dashboard.snapshot();
        assert_eq!(after.current_price, before.current_price);
        assert_eq!(after.analysis, before.analysis);
        assert_eq!(after.klines.len(), 5);

        assert_eq!(doc.active_period(), Period::OneHour);
        assert_eq!(doc.chart().unwrap().layout.title, "ETH/USDT · 1 hour");
    }

    #[tokio::test(start_paused = true)]
    async fn test_candles_for_replaced_period_are_dropped() {
        let feed = ScriptedFeed::new();
        feed.push_klines(Duration::from_millis(500), Ok(candles(7)));
        feed.push_klines(Duration::from_millis(10), Ok(candles(4)));
        let (_doc, dashboard) = dashboard(feed, OverlapPolicy::Supersede);

        let (slow, fast) = futures::join!(dashboard.select_period(Period::OneHour), async {
            tokio::time::sleep(Duration::from_millis(1)).await;
            dashboard.select_period(Period::FourHours).await
        });
        slow.unwrap();
        fast.unwrap();

        assert_eq!(dashboard.period(), Period::FourHours);
        assert_eq!(dashboard.snapshot().klines.len(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_candle_failure_marks_update_failed() {
        let feed = ScriptedFeed::new();
        feed.push_klines(Duration::ZERO, Err(DashboardError::Network("refused".into())));
        let (doc, dashboard) = dashboard(feed, OverlapPolicy::Supersede);

        assert!(dashboard.select_period(Period::OneDay).await.is_err());
        assert_eq!(doc.content(Region::StatusText), "Update failed");
    }

    #[tokio::test(start_paused = true)]
    async fn test_overlay_toggle_redraws_chart_only() {
        let feed = ScriptedFeed::new();
        feed.push_latest(Duration::ZERO, Ok(priced(100.0)));
        feed.push_klines(Duration::ZERO, Ok(candles(2)));
        let (doc, dashboard) = dashboard(feed, OverlapPolicy::Supersede);
        dashboard.start().await.unwrap();
        let renders = doc.chart_renders();

        dashboard.set_overlay(Overlay::MovingAverages, false);

        assert_eq!(doc.chart_renders(), renders + 1);
        assert!(!doc.is_checked(Overlay::MovingAverages));
        assert_eq!(doc.chart().unwrap().data.len(), 1);
        assert_eq!(dashboard.feed.latest_calls(), 1);
        assert_eq!(dashboard.feed.klines_calls().len(), 1);

        dashboard
            .handle(Command::SetOverlay(Overlay::MovingAverages, true))
            .await
            .unwrap();
        assert_eq!(doc.chart().unwrap().data.len(), 2);
    }

    /// Two overlapping polls; the second is issued later but resolves first
    async fn overlapping_polls(policy: OverlapPolicy) -> Dashboard<ScriptedFeed, MemoryDocument> {
        let feed = ScriptedFeed::new();
        feed.push_latest(Duration::from_millis(1500), Ok(priced(1.0)));
        feed.push_latest(Duration::from_millis(100), Ok(priced(2.0)));
        let (_doc, dashboard) = dashboard(feed, policy);

        futures::join!(dashboard.poll_tick(), async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            dashboard.poll_tick().await;
        });
        dashboard
    }

    #[tokio::test(start_paused = true)]
    async fn test_unguarded_last_resolved_wins() {
        let dashboard = overlapping_polls(OverlapPolicy::Unguarded).await;
        // Chronologically older data overwrites the newer snapshot
        assert_eq!(dashboard.snapshot().current_price, Some(1.0));
        assert_eq!(dashboard.feed.latest_calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_supersede_keeps_newest_request() {
        let dashboard = overlapping_polls(OverlapPolicy::Supersede).await;
        assert_eq!(dashboard.snapshot().current_price, Some(2.0));
        assert_eq!(dashboard.feed.latest_calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_skip_never_issues_overlapping_request() {
        let dashboard = overlapping_polls(OverlapPolicy::Skip).await;
        assert_eq!(dashboard.snapshot().current_price, Some(1.0));
        assert_eq!(dashboard.feed.latest_calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_command_polls() {
        let feed = ScriptedFeed::new();
        feed.push_latest(Duration::ZERO, Ok(priced(42.0)));
        let (_doc, dashboard) = dashboard(feed, OverlapPolicy::Supersede);

        dashboard.handle(Command::Refresh).await.unwrap();
        assert_eq!(dashboard.snapshot().current_price, Some(42.0));
    }

    #[tokio::test(start_paused = true)]
    async fn test_check_backend() {
        let feed = ScriptedFeed::new();
        let (_doc, dashboard) = dashboard(feed, OverlapPolicy::Supersede);
        let status = dashboard.check_backend().await.unwrap();
        assert_eq!(status.status, "running");
    }
}
