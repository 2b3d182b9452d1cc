use std::collections::VecDeque;
use std::io;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use pedalplot::LineDevice;

/// Device that replays scripted lines and then reports timeouts forever.
pub struct ScriptedDevice {
    lines: VecDeque<io::Result<Vec<u8>>>,
    pub written: Arc<Mutex<Vec<String>>>,
}

impl ScriptedDevice {
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<[u8]>,
    {
        Self {
            lines: lines.into_iter().map(|l| Ok(l.as_ref().to_vec())).collect(),
            written: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn push_error(&mut self, kind: io::ErrorKind) {
        self.lines.push_back(Err(io::Error::new(kind, "scripted")));
    }
}

impl LineDevice for ScriptedDevice {
    fn read_line(&mut self) -> io::Result<Vec<u8>> {
        match self.lines.pop_front() {
            Some(line) => line,
            None => Err(io::Error::new(io::ErrorKind::TimedOut, "idle")),
        }
    }

    fn write_line(&mut self, line: &str) -> io::Result<()> {
        self.written.lock().unwrap().push(line.to_string());
        Ok(())
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

/// Poll `cond` every few milliseconds until it holds or two seconds pass.
pub fn wait_until(mut cond: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(2);
    while Instant::now() < deadline {
        if cond() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    cond()
}
