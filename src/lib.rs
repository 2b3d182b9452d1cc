//! PedalPlot crate root: re-exports and module wiring.
//!
//! Reads brake/throttle pairs from a pedal controller's serial port on a
//! background thread and plots the most recent 200 samples per channel in an
//! egui/eframe window.
//!
//! - `data`: samples, line parsing, the bounded history store and reader stats
//! - `source`: device access, the simulator and the background line reader
//! - `context`: the shared pipeline state and application lifecycle
//! - `controllers`: non-blocking command round-trips
//! - `config`: window and connection configuration
//! - `app` / `panels`: the eframe application and its widgets

pub mod app;
pub mod config;
pub mod context;
pub mod controllers;
pub mod data;
pub mod panels;
pub mod source;

pub use app::{run_pedalplot, PedalPlotApp};
pub use config::PedalPlotConfig;
pub use context::{CommandError, ConnectionState, Phase, PipelineContext};
pub use data::history::{Channel, HistorySnapshot, HistoryStore, HISTORY_CAPACITY};
pub use data::sample::{parse_line, ParseError, Sample};
pub use source::{LineDevice, LineSource, SerialDevice, SimulatedPedals, SourceError};
