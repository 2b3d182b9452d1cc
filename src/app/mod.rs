//! Application wiring for the pedal plotter window.
//!
//! | Sub-module     | Responsibility |
//! | -------------- | -------------- |
//! | [`refresher`]  | Drop-if-behind refresh timer and the plotted snapshot |
//! | [`pedal_app`]  | [`PedalPlotApp`], the [`eframe::App`] implementation |
//! | [`run`]        | [`run_pedalplot()`] entry point and icon loading |

pub mod refresher;
mod pedal_app;
mod run;

pub use pedal_app::PedalPlotApp;
pub use refresher::{DisplayRefresher, RefreshTimer, REFRESH_INTERVAL};
pub use run::run_pedalplot;
