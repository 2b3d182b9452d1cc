//! Data acquisition: device access and the background line reader.

pub mod device;
pub mod line_source;
pub mod simulated;

pub use device::{available_ports, ConnectionError, LineDevice, SerialDevice, BAUD_RATE, MAX_LINE_LEN, READ_TIMEOUT};
pub use line_source::{read_sample, LineSource, SourceError, POLL_INTERVAL};
pub use simulated::SimulatedPedals;
