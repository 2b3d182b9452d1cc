//! Periodic plot refresh, driven from the UI thread.
//!
//! eframe calls `update` whenever it repaints. The refresher decides whether a
//! new snapshot of the history is due and how long egui should wait before the
//! next repaint. Ticks are rescheduled relative to the last refresh, so a slow
//! frame delays the next tick instead of queuing extra ones.

use std::time::{Duration, Instant};

use crate::data::history::{HistorySnapshot, HistoryStore};

/// Minimum time between two plot refreshes.
pub const REFRESH_INTERVAL: Duration = Duration::from_millis(50);

/// Drop-if-behind tick source.
#[derive(Debug, Clone)]
pub struct RefreshTimer {
    interval: Duration,
    last: Option<Instant>,
}

impl Default for RefreshTimer {
    fn default() -> Self {
        Self::new(REFRESH_INTERVAL)
    }
}

impl RefreshTimer {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Returns `true` if a tick is due at `now`, and starts the next period from `now`.
    pub fn poll(&mut self, now: Instant) -> bool {
        let due = match self.last {
            None => true,
            Some(last) => now.saturating_duration_since(last) >= self.interval,
        };
        if due {
            self.last = Some(now);
        }
        due
    }

    /// Time left until the next tick is due.
    pub fn remaining(&self, now: Instant) -> Duration {
        match self.last {
            None => Duration::ZERO,
            Some(last) => self
                .interval
                .saturating_sub(now.saturating_duration_since(last)),
        }
    }
}

/// Holds the snapshot the plot draws from, refreshed on each timer tick.
#[derive(Debug, Default)]
pub struct DisplayRefresher {
    timer: RefreshTimer,
    snapshot: HistorySnapshot,
    ticks: u64,
}

impl DisplayRefresher {
    pub fn new(interval: Duration) -> Self {
        Self {
            timer: RefreshTimer::new(interval),
            ..Default::default()
        }
    }

    /// Take a fresh snapshot from `store` if a tick is due. Returns whether it did.
    pub fn refresh(&mut self, store: &HistoryStore, now: Instant) -> bool {
        if !self.timer.poll(now) {
            return false;
        }
        self.snapshot = store.snapshot_all();
        self.ticks += 1;
        true
    }

    pub fn snapshot(&self) -> &HistorySnapshot {
        &self.snapshot
    }

    /// Number of refreshes performed so far.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Delay to pass to `request_repaint_after`.
    pub fn next_repaint(&self, now: Instant) -> Duration {
        self.timer.remaining(now)
    }
}
