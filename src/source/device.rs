//! Line-oriented device access: the real serial port and the trait the reader
//! loop is written against.

use std::io::{self, BufRead, BufReader, Read, Write};
use std::time::Duration;

use log::{debug, info};
use thiserror::Error;

/// Fixed link speed of the pedal controller.
pub const BAUD_RATE: u32 = 115_200;

/// Upper bound for a single blocking read.
pub const READ_TIMEOUT: Duration = Duration::from_secs(1);

/// Longest accepted line, terminator excluded. A record is at most `"1023\t1023\r"`.
pub const MAX_LINE_LEN: usize = 256;

/// A device that exchanges newline-terminated text records.
pub trait LineDevice: Send {
    /// Block until one full line is available (or the read timeout expires).
    ///
    /// Returns the raw line bytes without the trailing `\n`. A timeout is
    /// reported as [`io::ErrorKind::TimedOut`]; any bytes received before it
    /// are kept and completed by the next call. A line longer than
    /// [`MAX_LINE_LEN`] is discarded and reported as [`io::ErrorKind::InvalidData`].
    fn read_line(&mut self) -> io::Result<Vec<u8>>;

    /// Send one line; the `\n` terminator is appended here.
    fn write_line(&mut self, line: &str) -> io::Result<()>;

    /// Human-readable name (port path, "simulator", ...).
    fn name(&self) -> &str;
}

/// Failure to open the serial device at startup.
#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("cannot open port {port}: {source}")]
    Open {
        port: String,
        #[source]
        source: serialport::Error,
    },
    #[error("no serial port configured")]
    NoPort,
}

/// Accumulates bytes across reads and hands out complete lines.
///
/// Shared by every [`LineDevice`] implementation that reads from a byte stream.
pub struct LineFramer<R> {
    reader: BufReader<R>,
    pending: Vec<u8>,
}

impl<R: io::Read> LineFramer<R> {
    pub fn new(inner: R) -> Self {
        Self {
            reader: BufReader::new(inner),
            pending: Vec::new(),
        }
    }

    pub fn get_mut(&mut self) -> &mut R {
        self.reader.get_mut()
    }

    /// Read until `\n`; partial data survives an error and is reused next time.
    ///
    /// At most [`MAX_LINE_LEN`] bytes are buffered. Past that the partial line
    /// is dropped and the rest of it arrives as the next line.
    pub fn next_line(&mut self) -> io::Result<Vec<u8>> {
        let budget = (MAX_LINE_LEN + 1 - self.pending.len()) as u64;
        let n = self
            .reader
            .by_ref()
            .take(budget)
            .read_until(b'\n', &mut self.pending)?;
        if self.pending.last() == Some(&b'\n') {
            self.pending.pop();
            return Ok(std::mem::take(&mut self.pending));
        }
        if self.pending.len() > MAX_LINE_LEN {
            self.pending.clear();
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("line longer than {MAX_LINE_LEN} bytes"),
            ));
        }
        if n == 0 && self.pending.is_empty() {
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "device closed"));
        }
        // EOF without a terminator: hand out the dangling partial line as-is.
        Ok(std::mem::take(&mut self.pending))
    }
}

/// A [`LineDevice`] backed by a real serial port.
pub struct SerialDevice {
    port_name: String,
    framer: LineFramer<Box<dyn serialport::SerialPort>>,
}

impl SerialDevice {
    /// Open `port_name` at [`BAUD_RATE`] with [`READ_TIMEOUT`].
    pub fn open(port_name: &str) -> Result<Self, ConnectionError> {
        if port_name.trim().is_empty() {
            return Err(ConnectionError::NoPort);
        }
        let port = serialport::new(port_name, BAUD_RATE)
            .timeout(READ_TIMEOUT)
            .open()
            .map_err(|source| ConnectionError::Open {
                port: port_name.to_string(),
                source,
            })?;
        info!("Opened {port_name} @ {BAUD_RATE} baud");
        Ok(Self {
            port_name: port_name.to_string(),
            framer: LineFramer::new(port),
        })
    }
}

impl LineDevice for SerialDevice {
    fn read_line(&mut self) -> io::Result<Vec<u8>> {
        self.framer.next_line()
    }

    fn write_line(&mut self, line: &str) -> io::Result<()> {
        let port = self.framer.get_mut();
        port.write_all(line.as_bytes())?;
        port.write_all(b"\n")?;
        port.flush()
    }

    fn name(&self) -> &str {
        &self.port_name
    }
}

impl Drop for SerialDevice {
    fn drop(&mut self) {
        debug!("Closing {}", self.port_name);
    }
}

/// Names of the serial ports visible to the OS.
pub fn available_ports() -> Vec<String> {
    match serialport::available_ports() {
        Ok(ports) => ports.into_iter().map(|p| p.port_name).collect(),
        Err(e) => {
            debug!("Listing serial ports failed: {e}");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    /// Reader that yields scripted chunks, then a timeout for each `None`.
    struct Chunks(VecDeque<Option<&'static [u8]>>);

    impl io::Read for Chunks {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            match self.0.pop_front() {
                Some(Some(chunk)) => {
                    buf[..chunk.len()].copy_from_slice(chunk);
                    Ok(chunk.len())
                }
                Some(None) => Err(io::Error::new(io::ErrorKind::TimedOut, "timeout")),
                None => Ok(0),
            }
        }
    }

    #[test]
    fn partial_line_survives_timeout() {
        let mut framer = LineFramer::new(Chunks(VecDeque::from(vec![
            Some(&b"51"[..]),
            None,
            Some(&b"2\t300\r\n"[..]),
        ])));
        let err = framer.next_line().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::TimedOut);
        assert_eq!(framer.next_line().unwrap(), b"512\t300\r".to_vec());
    }

    #[test]
    fn overlong_line_is_discarded() {
        static NOISE: [u8; 600] = [b'\r'; 600];
        let mut framer = LineFramer::new(Chunks(VecDeque::from(vec![
            Some(&NOISE[..]),
            None,
            Some(&b"\n"[..]),
            Some(&b"3\t4\n"[..]),
        ])));
        for _ in 0..2 {
            assert_eq!(framer.next_line().unwrap_err().kind(), io::ErrorKind::InvalidData);
            assert!(framer.pending.is_empty());
        }
        assert_eq!(framer.next_line().unwrap_err().kind(), io::ErrorKind::TimedOut);
        assert!(framer.pending.len() <= MAX_LINE_LEN);

        let tail = framer.next_line().unwrap();
        assert_eq!(tail.len(), 600 - 2 * (MAX_LINE_LEN + 1));
        assert_eq!(framer.next_line().unwrap(), b"3\t4".to_vec());
    }

    #[test]
    fn line_at_the_limit_is_kept() {
        static LINE: [u8; MAX_LINE_LEN + 1] = {
            let mut l = [b'7'; MAX_LINE_LEN + 1];
            l[MAX_LINE_LEN] = b'\n';
            l
        };
        let mut framer = LineFramer::new(Chunks(VecDeque::from(vec![Some(&LINE[..])])));
        assert_eq!(framer.next_line().unwrap().len(), MAX_LINE_LEN);
    }

    #[test]
    fn eof_reported_once_drained() {
        let mut framer = LineFramer::new(Chunks(VecDeque::from(vec![Some(&b"1\t2\n"[..])])));
        assert_eq!(framer.next_line().unwrap(), b"1\t2".to_vec());
        assert_eq!(
            framer.next_line().unwrap_err().kind(),
            io::ErrorKind::UnexpectedEof
        );
    }

    #[test]
    fn empty_port_name_is_rejected() {
        assert!(matches!(SerialDevice::open("  "), Err(ConnectionError::NoPort)));
    }
}
