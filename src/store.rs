//! Snapshot store and request bookkeeping
//!
//! `AppState` is the controller's single piece of mutable state: the
//! current snapshot, the active period, and the ledger that decides whether
//! a `latest` response may still be applied.

use crate::config::OverlapPolicy;
use crate::types::{Candle, Period, Snapshot};

/// Holds the current snapshot and period selection
#[derive(Debug, Default)]
pub struct SnapshotStore {
    snapshot: Snapshot,
    loaded: bool,
    period: Period,
}

impl SnapshotStore {
    pub fn new(period: Period) -> Self {
        Self {
            period,
            ..Self::default()
        }
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    /// Whether a `latest` snapshot has ever been applied
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn period(&self) -> Period {
        self.period
    }

    pub fn set_period(&mut self, period: Period) {
        self.period = period;
    }

    /// Replace the whole snapshot, returning the previous headline price
    pub fn replace(&mut self, snapshot: Snapshot) -> Option<f64> {
        let previous = self.loaded.then_some(self.snapshot.current_price).flatten();
        self.snapshot = snapshot;
        self.loaded = true;
        previous
    }

    /// Replace only the candle series; price and analysis stay as they are
    pub fn replace_klines(&mut self, klines: Vec<Candle>) {
        self.snapshot.klines = klines;
    }
}

/// Sequence numbers for `latest` requests
#[derive(Debug, Default)]
pub struct RequestLedger {
    issued: u64,
    newest_applied: u64,
    outstanding: usize,
}

impl RequestLedger {
    /// Register a new request; `None` means the tick should issue nothing
    pub fn begin(&mut self, policy: OverlapPolicy) -> Option<u64> {
        if policy == OverlapPolicy::Skip && self.outstanding > 0 {
            return None;
        }
        self.issued += 1;
        self.outstanding += 1;
        Some(self.issued)
    }

    /// Settle a request; returns whether its outcome should reach the UI
    pub fn finish(&mut self, seq: u64, succeeded: bool, policy: OverlapPolicy) -> bool {
        self.outstanding = self.outstanding.saturating_sub(1);

        let current = match policy {
            OverlapPolicy::Supersede => seq > self.newest_applied,
            OverlapPolicy::Skip | OverlapPolicy::Unguarded => true,
        };
        if current && succeeded {
            self.newest_applied = self.newest_applied.max(seq);
        }
        current
    }

    pub fn outstanding(&self) -> usize {
        self.outstanding
    }
}

/// Everything the controller mutates
#[derive(Debug, Default)]
pub struct AppState {
    pub store: SnapshotStore,
    pub requests: RequestLedger,
}

impl AppState {
    pub fn new(period: Period) -> Self {
        Self {
            store: SnapshotStore::new(period),
            requests: RequestLedger::default(),
        }
    }
}
