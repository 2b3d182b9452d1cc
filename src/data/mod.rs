pub mod history;
pub mod sample;
pub mod stats;
pub mod trace_look;
