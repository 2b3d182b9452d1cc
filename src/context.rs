//! Shared state of the acquisition pipeline.
//!
//! [`PipelineContext`] is created once by the application root and handed to
//! the reader thread as an `Arc`. It owns the history store, the running flag,
//! the device handle and the reader statistics.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, TryLockError};
use std::thread::JoinHandle;

use log::{error, info, warn};
use thiserror::Error;

use crate::data::history::HistoryStore;
use crate::data::stats::ReaderStats;
use crate::source::device::{ConnectionError, LineDevice};
use crate::source::line_source::LineSource;

/// Result of the connection attempt made at startup. Never re-evaluated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionState {
    Connected { port: String },
    Disconnected { reason: String },
}

impl ConnectionState {
    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectionState::Connected { .. })
    }

    /// Status label shown in the window.
    pub fn label(&self) -> &'static str {
        if self.is_connected() {
            "connected"
        } else {
            "not connected"
        }
    }
}

/// Application lifecycle.
///
/// `Starting → ConnectionAttempt → {Connected, Disconnected} → Running → Closing → Terminated`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Starting,
    ConnectionAttempt,
    Connected,
    Disconnected,
    Running,
    Closing,
    Terminated,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Failure of a configuration round-trip.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("device is not connected")]
    NotConnected,
    #[error("no reply within the read timeout")]
    Timeout,
    #[error("serial I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

pub struct PipelineContext {
    pub history: HistoryStore,
    pub stats: ReaderStats,
    running: AtomicBool,
    device: Mutex<Option<Box<dyn LineDevice>>>,
    connection: ConnectionState,
    phase: Mutex<Phase>,
}

impl PipelineContext {
    /// Build the context and attempt to open the device with `open`.
    ///
    /// A failed open leaves the context in [`Phase::Disconnected`] with empty
    /// history; the error is logged here and kept in [`ConnectionState`].
    pub fn connect<F>(open: F) -> Arc<Self>
    where
        F: FnOnce() -> Result<Box<dyn LineDevice>, ConnectionError>,
    {
        let phase = Mutex::new(Phase::Starting);
        transition(&phase, Phase::ConnectionAttempt);
        let (device, connection) = match open() {
            Ok(dev) => {
                let port = dev.name().to_string();
                (Some(dev), ConnectionState::Connected { port })
            }
            Err(e) => {
                error!("{e}");
                (None, ConnectionState::Disconnected { reason: e.to_string() })
            }
        };
        transition(
            &phase,
            if connection.is_connected() {
                Phase::Connected
            } else {
                Phase::Disconnected
            },
        );
        Arc::new(Self {
            history: HistoryStore::new(),
            stats: ReaderStats::new(),
            running: AtomicBool::new(true),
            device: Mutex::new(device),
            connection,
            phase,
        })
    }

    /// Context around an already opened device.
    pub fn with_device(device: Box<dyn LineDevice>) -> Arc<Self> {
        Self::connect(move || Ok(device))
    }

    /// Enter `Running`, spawning the reader thread if the device is open.
    ///
    /// Returns `None` when disconnected; no reader is started in that case.
    pub fn start(self: &Arc<Self>) -> Option<JoinHandle<()>> {
        let connected = self.connection.is_connected();
        self.set_phase(Phase::Running);
        if !connected {
            warn!("Data collection disabled: {}", self.connection_reason());
            return None;
        }
        match LineSource::new(Arc::clone(self)).spawn() {
            Ok(handle) => Some(handle),
            Err(e) => {
                error!("Failed to start reader thread: {e}");
                None
            }
        }
    }

    /// Stop the reader and close the device. Idempotent.
    ///
    /// The phase stays at `Closing` while another thread holds the device;
    /// it becomes `Terminated` once the handle is dropped.
    pub fn shutdown(&self) {
        if matches!(self.phase(), Phase::Closing | Phase::Terminated) {
            return;
        }
        self.set_phase(Phase::Closing);
        self.running.store(false, Ordering::SeqCst);
        // If the reader is mid-read it holds the lock; it drops the device itself on exit.
        match self.device.try_lock() {
            Ok(mut guard) => self.release(&mut guard),
            Err(TryLockError::Poisoned(e)) => self.release(&mut e.into_inner()),
            Err(TryLockError::WouldBlock) => {}
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn connection(&self) -> &ConnectionState {
        &self.connection
    }

    fn connection_reason(&self) -> &str {
        match &self.connection {
            ConnectionState::Connected { port } => port,
            ConnectionState::Disconnected { reason } => reason,
        }
    }

    pub fn phase(&self) -> Phase {
        *self.phase.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn set_phase(&self, next: Phase) {
        transition(&self.phase, next);
    }

    /// Lock the device slot. `None` inside means the device is closed.
    pub(crate) fn device(&self) -> MutexGuard<'_, Option<Box<dyn LineDevice>>> {
        self.device.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Close the device from the reader side.
    pub(crate) fn close_device(&self) {
        self.release(&mut self.device());
    }

    /// Drop the handle in `slot` and finish a pending shutdown.
    fn release(&self, slot: &mut Option<Box<dyn LineDevice>>) {
        drop(slot.take());
        if self.phase() == Phase::Closing {
            self.set_phase(Phase::Terminated);
        }
    }

    /// Whether a device handle is currently held.
    pub fn device_open(&self) -> bool {
        self.device().is_some()
    }

    /// Send `cmd` followed by `\n` and wait for one line of reply.
    ///
    /// The reply is returned with trailing whitespace removed. Blocks for up to
    /// the read timeout, plus however long the reader holds the device.
    ///
    /// On a timeout, reply bytes already received stay buffered in the device
    /// and reach the reader as its next line, where they count as a dropped line.
    pub fn send_command(&self, cmd: &str) -> Result<String, CommandError> {
        let mut guard = self.device();
        let dev = guard.as_mut().ok_or(CommandError::NotConnected)?;
        dev.write_line(cmd)?;
        let reply = match dev.read_line() {
            Ok(raw) => Ok(String::from_utf8_lossy(&raw).trim_end().to_string()),
            Err(e) if e.kind() == std::io::ErrorKind::TimedOut => Err(CommandError::Timeout),
            Err(e) => Err(e.into()),
        };
        // A shutdown that arrived during the round-trip could not take the device.
        if !self.is_running() {
            self.release(&mut guard);
        }
        reply
    }
}

fn transition(phase: &Mutex<Phase>, next: Phase) {
    let mut phase = phase.lock().unwrap_or_else(|e| e.into_inner());
    if *phase != next {
        info!("{} -> {}", *phase, next);
        *phase = next;
    }
}
