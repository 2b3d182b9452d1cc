//! Bounded per-channel sample history shared between the reader and the UI.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

use super::sample::Sample;

/// Number of samples kept per channel.
pub const HISTORY_CAPACITY: usize = 200;

/// The two plotted channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    Brake,
    Throttle,
}

impl Channel {
    pub const ALL: [Channel; 2] = [Channel::Brake, Channel::Throttle];

    /// Legend label.
    pub fn label(&self) -> &'static str {
        match self {
            Channel::Brake => "Brake (clutch)",
            Channel::Throttle => "Throttle (gas)",
        }
    }
}

/// A ring of the most recent values for one channel.
#[derive(Debug, Clone)]
pub struct HistoryBuffer {
    values: VecDeque<i32>,
    capacity: usize,
}

impl HistoryBuffer {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            values: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Push a value, evicting the oldest one once the buffer is full.
    pub fn push(&mut self, value: i32) {
        if self.capacity == 0 {
            return;
        }
        if self.values.len() == self.capacity {
            self.values.pop_front();
        }
        self.values.push_back(value);
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn to_vec(&self) -> Vec<i32> {
        self.values.iter().copied().collect()
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }
}

struct Channels {
    brake: HistoryBuffer,
    throttle: HistoryBuffer,
}

impl Channels {
    fn get_mut(&mut self, channel: Channel) -> &mut HistoryBuffer {
        match channel {
            Channel::Brake => &mut self.brake,
            Channel::Throttle => &mut self.throttle,
        }
    }

    fn get(&self, channel: Channel) -> &HistoryBuffer {
        match channel {
            Channel::Brake => &self.brake,
            Channel::Throttle => &self.throttle,
        }
    }
}

/// Copy of both channels taken under a single lock.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistorySnapshot {
    pub brake: Vec<i32>,
    pub throttle: Vec<i32>,
}

impl HistorySnapshot {
    pub fn channel(&self, channel: Channel) -> &[i32] {
        match channel {
            Channel::Brake => &self.brake,
            Channel::Throttle => &self.throttle,
        }
    }

    /// `(index, value)` pairs ready for plotting.
    pub fn points(&self, channel: Channel) -> Vec<[f64; 2]> {
        self.channel(channel)
            .iter()
            .enumerate()
            .map(|(i, &v)| [i as f64, v as f64])
            .collect()
    }

    pub fn len(&self) -> usize {
        self.brake.len().max(self.throttle.len())
    }

    pub fn is_empty(&self) -> bool {
        self.brake.is_empty() && self.throttle.is_empty()
    }
}

/// Thread-safe store for the brake and throttle histories.
///
/// Both channels live behind one mutex, so a sample appended with
/// [`append_sample`](Self::append_sample) is never observed half-written by
/// [`snapshot_all`](Self::snapshot_all).
pub struct HistoryStore {
    inner: Mutex<Channels>,
}

impl Default for HistoryStore {
    fn default() -> Self {
        Self::with_capacity(HISTORY_CAPACITY)
    }
}

impl HistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(Channels {
                brake: HistoryBuffer::with_capacity(capacity),
                throttle: HistoryBuffer::with_capacity(capacity),
            }),
        }
    }

    // A panicking writer cannot leave a buffer in a broken state, so a
    // poisoned lock is still safe to use.
    fn lock(&self) -> MutexGuard<'_, Channels> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Append one value to a single channel.
    pub fn append(&self, channel: Channel, value: i32) {
        self.lock().get_mut(channel).push(value);
    }

    /// Append both values of a sample atomically.
    pub fn append_sample(&self, sample: Sample) {
        let mut ch = self.lock();
        ch.brake.push(sample.brake);
        ch.throttle.push(sample.throttle);
    }

    pub fn snapshot(&self, channel: Channel) -> Vec<i32> {
        self.lock().get(channel).to_vec()
    }

    pub fn snapshot_all(&self) -> HistorySnapshot {
        let ch = self.lock();
        HistorySnapshot {
            brake: ch.brake.to_vec(),
            throttle: ch.throttle.to_vec(),
        }
    }

    pub fn len(&self, channel: Channel) -> usize {
        self.lock().get(channel).len()
    }

    pub fn is_empty(&self) -> bool {
        let ch = self.lock();
        ch.brake.is_empty() && ch.throttle.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.lock().brake.capacity()
    }

    pub fn clear(&self) {
        let mut ch = self.lock();
        ch.brake.clear();
        ch.throttle.clear();
    }
}
