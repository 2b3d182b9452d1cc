//! Controllers for device interaction that must not block the UI thread.
//!
//! A configuration round-trip waits for a reply line, so it runs on a
//! short-lived worker thread and the reply is picked up by polling.

use std::sync::mpsc::{channel, Receiver, Sender, TryRecvError};
use std::sync::Arc;
use std::thread;

use log::{debug, warn};

use crate::context::{CommandError, PipelineContext};

/// Outcome of one command round-trip.
#[derive(Debug)]
pub struct CommandReply {
    pub command: String,
    pub result: Result<String, CommandError>,
}

impl CommandReply {
    /// Text for the status bar. A missing reply reads as empty, like the device's silence.
    pub fn summary(&self) -> String {
        match &self.result {
            Ok(reply) if reply.is_empty() => format!("{} → (empty reply)", self.command),
            Ok(reply) => format!("{} → {}", self.command, reply),
            Err(e) => format!("{} failed: {}", self.command, e),
        }
    }
}

/// Sends commands through [`PipelineContext::send_command`], one at a time.
pub struct CommandController {
    ctx: Arc<PipelineContext>,
    tx: Sender<CommandReply>,
    rx: Receiver<CommandReply>,
    in_flight: bool,
}

impl CommandController {
    pub fn new(ctx: Arc<PipelineContext>) -> Self {
        let (tx, rx) = channel();
        Self {
            ctx,
            tx,
            rx,
            in_flight: false,
        }
    }

    /// Whether a command is waiting for its reply.
    pub fn busy(&self) -> bool {
        self.in_flight
    }

    /// Start a round-trip for `command`. Returns `false` if one is already running.
    pub fn send(&mut self, command: impl Into<String>) -> bool {
        if self.in_flight {
            return false;
        }
        let command = command.into();
        let ctx = Arc::clone(&self.ctx);
        let tx = self.tx.clone();
        debug!("Sending command {command:?}");
        let spawned = thread::Builder::new()
            .name("command".into())
            .spawn(move || {
                let result = ctx.send_command(&command);
                // Receiver gone means the UI already closed.
                let _ = tx.send(CommandReply { command, result });
            });
        match spawned {
            Ok(_) => {
                self.in_flight = true;
                true
            }
            Err(e) => {
                warn!("Failed to spawn command thread: {e}");
                false
            }
        }
    }

    /// Collect a finished reply, if any.
    pub fn poll(&mut self) -> Option<CommandReply> {
        match self.rx.try_recv() {
            Ok(reply) => {
                self.in_flight = false;
                Some(reply)
            }
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }
}
