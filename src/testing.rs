//! Scripted feed for controller and poller tests

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use indexmap::IndexMap;
use parking_lot::Mutex;

use crate::client::Feed;
use crate::error::Result;
use crate::types::{Analysis, BackendStatus, Candle, MovingAverage, Period, Snapshot};

type Script<T> = Mutex<VecDeque<(Duration, Result<T>)>>;

/// Feed that replays queued responses after a per-response delay
///
/// When the `latest` queue runs dry it answers with `priced(0.0)`; an empty
/// `klines` queue answers with an empty series.
#[derive(Default)]
pub struct ScriptedFeed {
    latest: Script<Snapshot>,
    klines: Script<Vec<Candle>>,
    latest_calls: AtomicUsize,
    klines_calls: Mutex<Vec<(Period, u32)>>,
}

impl ScriptedFeed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_latest(&self, delay: Duration, response: Result<Snapshot>) {
        self.latest.lock().push_back((delay, response));
    }

    pub fn push_klines(&self, delay: Duration, response: Result<Vec<Candle>>) {
        self.klines.lock().push_back((delay, response));
    }

    pub fn latest_calls(&self) -> usize {
        self.latest_calls.load(Ordering::SeqCst)
    }

    pub fn klines_calls(&self) -> Vec<(Period, u32)> {
        self.klines_calls.lock().clone()
    }
}

#[async_trait]
impl Feed for ScriptedFeed {
    async fn latest(&self) -> Result<Snapshot> {
        self.latest_calls.fetch_add(1, Ordering::SeqCst);
        let next = self.latest.lock().pop_front();
        let (delay, response) = next.unwrap_or_else(|| (Duration::ZERO, Ok(priced(0.0))));
        tokio::time::sleep(delay).await;
        response
    }

    async fn klines(&self, period: Period, limit: u32) -> Result<Vec<Candle>> {
        self.klines_calls.lock().push((period, limit));
        let next = self.klines.lock().pop_front();
        let (delay, response) = next.unwrap_or_else(|| (Duration::ZERO, Ok(Vec::new())));
        tokio::time::sleep(delay).await;
        response
    }

    async fn status(&self) -> Result<BackendStatus> {
        Ok(BackendStatus {
            success: true,
            status: "running".to_string(),
            last_update: Some(1_700_000_000_000),
            has_data: true,
        })
    }
}

/// `count` one-minute candles starting at a fixed epoch
pub fn candles(count: usize) -> Vec<Candle> {
    (0..count)
        .map(|i| {
            let base = 100.0 + i as f64;
            Candle {
                timestamp_ms: 1_700_000_000_000 + i as i64 * 60_000,
                open: base,
                high: base + 2.0,
                low: base - 1.0,
                close: base + 1.0,
            }
        })
        .collect()
}

/// Snapshot at `price` with a single MA20 report and two candles
pub fn priced(price: f64) -> Snapshot {
    let mut moving_averages = IndexMap::new();
    moving_averages.insert(
        "MA20".to_string(),
        MovingAverage {
            value: Some(price - 1.0),
            distance_percent: None,
            support_resistance: None,
        },
    );
    Snapshot {
        current_price: Some(price),
        analysis: Analysis {
            moving_averages: Some(moving_averages),
            ..Analysis::default()
        },
        klines: candles(2),
        timestamp: Some(1_700_000_000_000),
    }
}
