//! Recurring `latest` poll
//!
//! Fixed-period ticks, first one a full period after start. Each tick runs
//! as its own task so a slow response never delays the next tick; whether
//! overlapping responses are applied is up to the controller's overlap
//! policy.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info};

use crate::client::Feed;
use crate::controller::Dashboard;
use crate::surface::Surface;

/// Owns the poll loop; stopping or dropping it cancels the timer
#[derive(Debug)]
pub struct PollHandle {
    task: Option<JoinHandle<()>>,
}

impl PollHandle {
    /// Cancel the timer. In-flight requests still complete.
    pub fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            info!("Polling stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Spawn the poll loop for `dashboard`
pub fn spawn<F, S>(dashboard: Arc<Dashboard<F, S>>, every: Duration) -> PollHandle
where
    F: Feed + 'static,
    S: Surface + 'static,
{
    info!(interval = ?every, "Polling started");
    let task = tokio::spawn(async move {
        let mut ticker = time::interval_at(time::Instant::now() + every, every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            debug!("Poll tick");
            let dashboard = Arc::clone(&dashboard);
            tokio::spawn(async move { dashboard.poll_tick().await });
        }
    });
    PollHandle { task: Some(task) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::surface::MemoryDocument;
    use crate::testing::ScriptedFeed;

    fn dashboard() -> Arc<Dashboard<ScriptedFeed, MemoryDocument>> {
        let doc = Arc::new(MemoryDocument::new());
        Arc::new(Dashboard::new(ScriptedFeed::new(), doc, Config::default()))
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticks_every_interval() {
        let dashboard = dashboard();
        let handle = dashboard.start_polling();
        assert!(handle.is_running());

        time::sleep(Duration::from_millis(999)).await;
        assert_eq!(dashboard.feed().latest_calls(), 0, "first tick after one period");

        time::sleep(Duration::from_millis(2501)).await;
        assert_eq!(dashboard.feed().latest_calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_stops_polling() {
        let dashboard = dashboard();
        let handle = dashboard.start_polling();

        time::sleep(Duration::from_millis(1500)).await;
        assert_eq!(dashboard.feed().latest_calls(), 1);

        drop(handle);
        time::sleep(Duration::from_secs(5)).await;
        assert_eq!(dashboard.feed().latest_calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_is_idempotent() {
        let dashboard = dashboard();
        let mut handle = dashboard.start_polling();

        handle.stop();
        handle.stop();
        assert!(!handle.is_running());

        time::sleep(Duration::from_secs(3)).await;
        assert_eq!(dashboard.feed().latest_calls(), 0);
    }
}
