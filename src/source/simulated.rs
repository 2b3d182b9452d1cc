//! Synthetic pedal controller for running the UI without hardware.
//!
//! Emits records in the firmware's exact format (`<brake>\t<throttle>\r\n`)
//! at roughly the firmware's 10 ms cadence.

use std::collections::VecDeque;
use std::f64::consts::PI;
use std::io;
use std::time::Duration;

use crate::data::sample::Sample;

use super::device::LineDevice;

/// Full-scale ADC value after calibration.
const FULL_SCALE: f64 = 1023.0;
/// Values closer than this to zero are snapped to zero, as the firmware does.
const DEADZONE: i32 = 20;

pub struct SimulatedPedals {
    n: u64,
    period: Duration,
    replies: VecDeque<String>,
}

impl Default for SimulatedPedals {
    fn default() -> Self {
        Self::new(Duration::from_millis(10))
    }
}

impl SimulatedPedals {
    /// `period` is the pause before each emitted line; zero makes it free-running.
    pub fn new(period: Duration) -> Self {
        Self {
            n: 0,
            period,
            replies: VecDeque::new(),
        }
    }

    /// The record emitted for step `n`.
    pub fn line_at(n: u64) -> String {
        let t = n as f64 * 0.01;
        // Brake: 0.4 Hz triangle, throttle: 0.25 Hz raised sine.
        let phase = (t * 0.4).fract();
        let tri = if phase < 0.5 { phase * 2.0 } else { 2.0 - phase * 2.0 };
        let brake = apply_deadzone((tri * FULL_SCALE).round() as i32);
        let sine = 0.5 - 0.5 * (2.0 * PI * 0.25 * t).cos();
        let throttle = apply_deadzone((sine * FULL_SCALE).round() as i32);
        format!("{}\r", Sample::new(brake, throttle).to_line())
    }
}

fn apply_deadzone(value: i32) -> i32 {
    if value.abs() < DEADZONE {
        0
    } else {
        value
    }
}

impl LineDevice for SimulatedPedals {
    fn read_line(&mut self) -> io::Result<Vec<u8>> {
        if let Some(reply) = self.replies.pop_front() {
            return Ok(reply.into_bytes());
        }
        if !self.period.is_zero() {
            std::thread::sleep(self.period);
        }
        let line = Self::line_at(self.n);
        self.n = self.n.wrapping_add(1);
        Ok(line.into_bytes())
    }

    fn write_line(&mut self, line: &str) -> io::Result<()> {
        self.replies.push_back(format!("OK {}\r", line.trim()));
        Ok(())
    }

    fn name(&self) -> &str {
        "simulator"
    }
}
