//! Background reader that turns device lines into history samples.

use std::io;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use log::{debug, info, trace};
use thiserror::Error;

use crate::context::PipelineContext;
use crate::data::sample::{parse_bytes, ParseError, Sample};

use super::device::{LineDevice, MAX_LINE_LEN};

/// Pause between two read attempts.
pub const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Why one read attempt did not yield a sample.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("dropped line: {0}")]
    Parse(#[from] ParseError),
    #[error("read timed out")]
    Timeout,
    #[error("line exceeded {MAX_LINE_LEN} bytes and was discarded")]
    Overlong,
    #[error("read failed: {0}")]
    Io(io::Error),
    #[error("device closed")]
    Closed,
}

impl From<io::Error> for SourceError {
    fn from(e: io::Error) -> Self {
        match e.kind() {
            io::ErrorKind::TimedOut => SourceError::Timeout,
            io::ErrorKind::InvalidData => SourceError::Overlong,
            _ => SourceError::Io(e),
        }
    }
}

/// Read and parse a single line from `device`.
pub fn read_sample(device: &mut dyn LineDevice) -> Result<Sample, SourceError> {
    let raw = device.read_line()?;
    Ok(parse_bytes(&raw)?)
}

pub struct LineSource {
    ctx: Arc<PipelineContext>,
    interval: Duration,
}

impl LineSource {
    pub fn new(ctx: Arc<PipelineContext>) -> Self {
        Self {
            ctx,
            interval: POLL_INTERVAL,
        }
    }

    /// Override the pause between reads.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// One read attempt: read, parse, append on success and update the counters.
    ///
    /// The device lock is held only for the read itself.
    pub fn step(&self) -> Result<Sample, SourceError> {
        let result = {
            let mut guard = self.ctx.device();
            match guard.as_mut() {
                Some(dev) => read_sample(&mut **dev),
                None => Err(SourceError::Closed),
            }
        };
        match &result {
            Ok(sample) => {
                self.ctx.history.append_sample(*sample);
                self.ctx.stats.record_sample();
            }
            Err(e @ (SourceError::Parse(_) | SourceError::Overlong)) => {
                trace!("{e}");
                self.ctx.stats.record_parse_error();
            }
            Err(SourceError::Timeout) => self.ctx.stats.record_timeout(),
            Err(SourceError::Io(e)) => {
                debug!("Serial read error: {e}");
                self.ctx.stats.record_io_error();
            }
            Err(SourceError::Closed) => {}
        }
        result
    }

    /// Run until the running flag clears or the device is closed.
    ///
    /// Every error other than a closed device is counted and ignored.
    pub fn run(self) {
        info!("Line source started");
        while self.ctx.is_running() {
            if let Err(SourceError::Closed) = self.step() {
                break;
            }
            thread::sleep(self.interval);
        }
        self.ctx.close_device();
        info!("Line source stopped");
    }

    /// Run [`run`](Self::run) on a dedicated thread.
    pub fn spawn(self) -> io::Result<JoinHandle<()>> {
        thread::Builder::new()
            .name("line-source".into())
            .spawn(move || self.run())
    }
}
