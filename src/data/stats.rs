//! Counters describing what the line reader has seen so far.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use chrono::{DateTime, Local};

/// Live counters, updated by the reader thread and read by the UI.
#[derive(Default)]
pub struct ReaderStats {
    samples: AtomicU64,
    parse_errors: AtomicU64,
    timeouts: AtomicU64,
    io_errors: AtomicU64,
    last_sample_at: Mutex<Option<DateTime<Local>>>,
}

/// Point-in-time copy of [`ReaderStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub samples: u64,
    pub parse_errors: u64,
    pub timeouts: u64,
    pub io_errors: u64,
    pub last_sample_at: Option<DateTime<Local>>,
}

impl StatsSnapshot {
    /// Lines that were received but did not produce a sample.
    pub fn dropped_lines(&self) -> u64 {
        self.parse_errors
    }

    /// Fraction of parsed lines that were dropped, in `0.0..=1.0`.
    pub fn drop_rate(&self) -> f64 {
        let total = self.samples + self.parse_errors;
        if total == 0 {
            0.0
        } else {
            self.parse_errors as f64 / total as f64
        }
    }
}

impl ReaderStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_sample(&self) {
        self.samples.fetch_add(1, Ordering::Relaxed);
        let mut last = self.last_sample_at.lock().unwrap_or_else(|e| e.into_inner());
        *last = Some(Local::now());
    }

    pub fn record_parse_error(&self) {
        self.parse_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_timeout(&self) {
        self.timeouts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_io_error(&self) {
        self.io_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            samples: self.samples.load(Ordering::Relaxed),
            parse_errors: self.parse_errors.load(Ordering::Relaxed),
            timeouts: self.timeouts.load(Ordering::Relaxed),
            io_errors: self.io_errors.load(Ordering::Relaxed),
            last_sample_at: *self.last_sample_at.lock().unwrap_or_else(|e| e.into_inner()),
        }
    }
}
