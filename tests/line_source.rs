mod common;

use std::collections::VecDeque;
use std::io;
use std::sync::mpsc;
use std::time::Duration;

use common::{wait_until, ScriptedDevice};
use pedalplot::context::{ConnectionState, Phase};
use pedalplot::controllers::CommandController;
use pedalplot::data::sample::parse_line;
use pedalplot::source::device::LineFramer;
use pedalplot::source::ConnectionError;
use pedalplot::{CommandError, LineDevice, LineSource, ParseError, PipelineContext, Sample, SourceError};

fn failed_pipeline() -> std::sync::Arc<PipelineContext> {
    PipelineContext::connect(|| Err(ConnectionError::NoPort))
}

/// Device whose reads block until the test lets them go.
struct GatedDevice {
    entered: mpsc::Sender<()>,
    release: mpsc::Receiver<()>,
}

impl LineDevice for GatedDevice {
    fn read_line(&mut self) -> io::Result<Vec<u8>> {
        let _ = self.entered.send(());
        let _ = self.release.recv_timeout(Duration::from_secs(2));
        Err(io::Error::new(io::ErrorKind::TimedOut, "gated"))
    }

    fn write_line(&mut self, _line: &str) -> io::Result<()> {
        Ok(())
    }

    fn name(&self) -> &str {
        "gated"
    }
}

/// Byte stream served in chunks; `None` is a read timeout.
struct Chunks(VecDeque<Option<&'static [u8]>>);

impl io::Read for Chunks {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.0.pop_front() {
            Some(Some(chunk)) => {
                buf[..chunk.len()].copy_from_slice(chunk);
                Ok(chunk.len())
            }
            Some(None) | None => Err(io::Error::new(io::ErrorKind::TimedOut, "idle")),
        }
    }
}

struct FramedDevice(LineFramer<Chunks>);

impl FramedDevice {
    fn new(chunks: Vec<Option<&'static [u8]>>) -> Self {
        Self(LineFramer::new(Chunks(chunks.into())))
    }
}

impl LineDevice for FramedDevice {
    fn read_line(&mut self) -> io::Result<Vec<u8>> {
        self.0.next_line()
    }

    fn write_line(&mut self, _line: &str) -> io::Result<()> {
        Ok(())
    }

    fn name(&self) -> &str {
        "framed"
    }
}

#[test]
fn tab_separated_line_parses() {
    assert_eq!(parse_line("512\t300\n"), Ok(Sample::new(512, 300)));
}

#[test]
fn malformed_lines_are_rejected() {
    assert!(matches!(parse_line("garbage\n"), Err(ParseError::MissingDelimiter(_))));
    assert!(matches!(parse_line("12\tX\n"), Err(ParseError::InvalidNumber { .. })));
    assert_eq!(parse_line(""), Err(ParseError::Empty));
}

#[test]
fn good_line_lands_in_both_buffers() {
    let ctx = PipelineContext::with_device(Box::new(ScriptedDevice::new(["512\t300"])));
    let source = LineSource::new(ctx.clone());
    assert_eq!(source.step().unwrap(), Sample::new(512, 300));
    let snap = ctx.history.snapshot_all();
    assert_eq!(snap.brake, vec![512]);
    assert_eq!(snap.throttle, vec![300]);
}

#[test]
fn bad_lines_do_not_touch_history() {
    let ctx = PipelineContext::with_device(Box::new(ScriptedDevice::new(vec![
        b"garbage".to_vec(),
        b"12\tX".to_vec(),
        Vec::new(),
        vec![0xfe, 0xff],
    ])));
    let source = LineSource::new(ctx.clone());
    for _ in 0..4 {
        assert!(matches!(source.step(), Err(SourceError::Parse(_))));
    }
    assert!(ctx.history.is_empty());
    assert_eq!(ctx.stats.snapshot().parse_errors, 4);
}

#[test]
fn end_to_end_sequence_skips_bad_record() {
    let ctx = PipelineContext::with_device(Box::new(ScriptedDevice::new([
        "100\t200", "101\t201\r", "bad", "102\t202",
    ])));
    let source = LineSource::new(ctx.clone());
    let results: Vec<_> = (0..4).map(|_| source.step()).collect();
    assert!(results[2].is_err());
    let snap = ctx.history.snapshot_all();
    assert_eq!(snap.brake, vec![100, 101, 102]);
    assert_eq!(snap.throttle, vec![200, 201, 202]);
}

#[test]
fn io_errors_are_counted_and_survived() {
    let mut dev = ScriptedDevice::new(Vec::<&str>::new());
    dev.push_error(io::ErrorKind::BrokenPipe);
    dev.push_error(io::ErrorKind::TimedOut);
    let ctx = PipelineContext::with_device(Box::new(dev));
    let source = LineSource::new(ctx.clone());
    assert!(matches!(source.step(), Err(SourceError::Io(_))));
    assert!(matches!(source.step(), Err(SourceError::Timeout)));
    let stats = ctx.stats.snapshot();
    assert_eq!(stats.io_errors, 1);
    assert_eq!(stats.timeouts, 1);
    assert_eq!(stats.samples, 0);
}

#[test]
fn overlong_lines_count_as_dropped() {
    static NOISE: [u8; 1024] = [b'\r'; 1024];
    let ctx = PipelineContext::with_device(Box::new(FramedDevice::new(vec![
        Some(&NOISE[..]),
        Some(&b"\n5\t6\n"[..]),
    ])));
    let source = LineSource::new(ctx.clone());
    for _ in 0..3 {
        assert!(matches!(source.step(), Err(SourceError::Overlong)));
    }
    // The tail of the noise is whitespace only.
    assert!(matches!(source.step(), Err(SourceError::Parse(ParseError::Empty))));
    assert_eq!(source.step().unwrap(), Sample::new(5, 6));

    let stats = ctx.stats.snapshot();
    assert_eq!(stats.dropped_lines(), 4);
    assert_eq!(stats.io_errors, 0);
}

#[test]
fn reader_thread_collects_until_shutdown() {
    let ctx = PipelineContext::with_device(Box::new(ScriptedDevice::new([
        "100\t200", "101\t201", "bad", "102\t202",
    ])));
    assert_eq!(ctx.phase(), Phase::Connected);

    let handle = ctx.start().expect("reader should start when connected");
    assert_eq!(ctx.phase(), Phase::Running);
    assert!(wait_until(|| ctx.stats.snapshot().samples == 3));

    ctx.shutdown();
    handle.join().unwrap();
    assert_eq!(ctx.phase(), Phase::Terminated);
    assert!(!ctx.is_running());
    assert!(!ctx.device_open());
    assert_eq!(ctx.history.snapshot(pedalplot::Channel::Brake), vec![100, 101, 102]);
}

#[test]
fn shutdown_waits_for_reader_to_release_device() {
    let (entered_tx, entered_rx) = mpsc::channel();
    let (release_tx, release_rx) = mpsc::channel();
    let ctx = PipelineContext::with_device(Box::new(GatedDevice {
        entered: entered_tx,
        release: release_rx,
    }));
    let handle = ctx.start().unwrap();
    entered_rx.recv_timeout(Duration::from_secs(2)).unwrap();

    ctx.shutdown();
    assert!(!ctx.is_running());
    assert_eq!(ctx.phase(), Phase::Closing);

    release_tx.send(()).unwrap();
    handle.join().unwrap();
    assert_eq!(ctx.phase(), Phase::Terminated);
    assert!(!ctx.device_open());
}

#[test]
fn shutdown_is_idempotent() {
    let ctx = PipelineContext::with_device(Box::new(ScriptedDevice::new(["1\t2"])));
    ctx.shutdown();
    ctx.shutdown();
    assert_eq!(ctx.phase(), Phase::Terminated);
    let source = LineSource::new(ctx.clone());
    assert!(matches!(source.step(), Err(SourceError::Closed)));
}

#[test]
fn failed_open_never_starts_reader() {
    let ctx = failed_pipeline();
    assert_eq!(ctx.phase(), Phase::Disconnected);
    assert!(matches!(ctx.connection(), ConnectionState::Disconnected { .. }));
    assert_eq!(ctx.connection().label(), "not connected");

    assert!(ctx.start().is_none());
    std::thread::sleep(Duration::from_millis(50));
    assert!(ctx.history.is_empty());
    assert_eq!(ctx.stats.snapshot().samples, 0);
}

#[test]
fn send_command_returns_trimmed_reply() {
    let dev = ScriptedDevice::new(["OK 619 \r"]);
    let written = dev.written.clone();
    let ctx = PipelineContext::with_device(Box::new(dev));
    assert_eq!(ctx.send_command("THROTTLE_MIN 619").unwrap(), "OK 619");
    assert_eq!(*written.lock().unwrap(), vec!["THROTTLE_MIN 619".to_string()]);
}

#[test]
fn send_command_without_reply_times_out() {
    let ctx = PipelineContext::with_device(Box::new(ScriptedDevice::new(Vec::<&str>::new())));
    assert!(matches!(ctx.send_command("PING"), Err(CommandError::Timeout)));
}

#[test]
fn partial_reply_after_timeout_reaches_the_reader() {
    let ctx = PipelineContext::with_device(Box::new(FramedDevice::new(vec![
        Some(&b"OK 6"[..]),
        None,
        Some(&b"19\r\n"[..]),
    ])));
    assert!(matches!(ctx.send_command("THROTTLE_MIN 619"), Err(CommandError::Timeout)));

    let source = LineSource::new(ctx.clone());
    assert!(matches!(
        source.step(),
        Err(SourceError::Parse(ParseError::MissingDelimiter(text))) if text == "OK 619"
    ));
    assert_eq!(ctx.stats.snapshot().dropped_lines(), 1);
}

#[test]
fn send_command_when_disconnected() {
    assert!(matches!(
        failed_pipeline().send_command("PING"),
        Err(CommandError::NotConnected)
    ));
}

#[test]
fn command_controller_delivers_reply() {
    let ctx = PipelineContext::with_device(Box::new(ScriptedDevice::new(["PONG"])));
    let mut commands = CommandController::new(ctx);
    assert!(commands.send("PING"));
    assert!(commands.busy());
    assert!(!commands.send("PING"), "only one command in flight");

    let mut reply = None;
    assert!(wait_until(|| {
        reply = commands.poll();
        reply.is_some()
    }));
    let reply = reply.unwrap();
    assert_eq!(reply.command, "PING");
    assert_eq!(reply.result.unwrap(), "PONG");
    assert!(!commands.busy());
}

#[test]
fn simulated_device_feeds_the_pipeline() {
    let ctx = PipelineContext::with_device(Box::new(pedalplot::SimulatedPedals::new(Duration::ZERO)));
    let source = LineSource::new(ctx.clone()).with_interval(Duration::ZERO);
    for _ in 0..250 {
        source.step().unwrap();
    }
    let snap = ctx.history.snapshot_all();
    assert_eq!(snap.brake.len(), 200);
    assert_eq!(snap.throttle.len(), 200);
    assert_eq!(ctx.stats.snapshot().parse_errors, 0);
}

#[test]
fn scripted_device_is_a_line_device() {
    let mut dev = ScriptedDevice::new(["x"]);
    assert_eq!(dev.name(), "scripted");
    assert_eq!(dev.read_line().unwrap(), b"x".to_vec());
}
