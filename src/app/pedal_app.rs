//! Standalone application wrapper that implements [`eframe::App`].
//!
//! [`PedalPlotApp`] owns the UI-side state (panels, refresher, command
//! controller) and holds the shared [`PipelineContext`]. It starts the reader
//! on construction and shuts the pipeline down when the window closes.

use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Instant;

use eframe::egui;
use egui_phosphor::regular::WARNING;
use log::info;

use crate::config::PedalPlotConfig;
use crate::context::{ConnectionState, PipelineContext};
use crate::controllers::CommandController;
use crate::panels::{ConfigPanel, ScopePanel};

use super::refresher::{DisplayRefresher, REFRESH_INTERVAL};

pub struct PedalPlotApp {
    pipeline: Arc<PipelineContext>,
    refresher: DisplayRefresher,
    scope: ScopePanel,
    config_panel: ConfigPanel,
    commands: CommandController,
    reader: Option<JoinHandle<()>>,
    /// Startup connection failure not yet acknowledged by the user.
    connection_alert: Option<String>,
    last_reply: Option<String>,
    show_trace_settings: bool,
}

impl PedalPlotApp {
    /// Build the app and enter `Running`; the reader is spawned only if connected.
    pub fn new(pipeline: Arc<PipelineContext>, cfg: &PedalPlotConfig) -> Self {
        let reader = pipeline.start();
        let connection_alert = match pipeline.connection() {
            ConnectionState::Connected { .. } => None,
            ConnectionState::Disconnected { reason } => Some(reason.clone()),
        };
        Self {
            refresher: DisplayRefresher::new(REFRESH_INTERVAL),
            scope: ScopePanel::from_config(cfg),
            config_panel: ConfigPanel::from_config(cfg),
            commands: CommandController::new(Arc::clone(&pipeline)),
            pipeline,
            reader,
            connection_alert,
            last_reply: None,
            show_trace_settings: false,
        }
    }

    pub fn pipeline(&self) -> &Arc<PipelineContext> {
        &self.pipeline
    }

    /// Whether a reader thread was started.
    pub fn reader_started(&self) -> bool {
        self.reader.is_some()
    }

    /// Startup connection failure still waiting to be acknowledged.
    pub fn connection_alert(&self) -> Option<&str> {
        self.connection_alert.as_deref()
    }

    fn shutdown(&mut self) {
        self.pipeline.shutdown();
        // The reader exits on its own within one read timeout; it is not joined.
        if self.reader.take().is_some() {
            info!("Reader signalled to stop");
        }
    }

    fn render_connection_alert(&mut self, ctx: &egui::Context) {
        let Some(reason) = self.connection_alert.clone() else {
            return;
        };
        let modal = egui::Modal::new(egui::Id::new("connection_error")).show(ctx, |ui| {
            ui.heading(format!("{WARNING} Error"));
            ui.label(format!("Cannot open serial port.\n{reason}"));
            ui.add_space(8.0);
            ui.button("OK").clicked()
        });
        if modal.inner || modal.should_close() {
            self.connection_alert = None;
        }
    }

    fn render_status_bar(&self, ui: &mut egui::Ui) {
        let stats = self.pipeline.stats.snapshot();
        ui.horizontal(|ui| {
            ui.label(format!("Samples: {}", stats.samples));
            ui.separator();
            ui.label(format!(
                "Dropped lines: {} ({:.1}%)",
                stats.dropped_lines(),
                stats.drop_rate() * 100.0
            ));
            ui.separator();
            ui.label(format!("Timeouts: {}", stats.timeouts));
            if stats.io_errors > 0 {
                ui.separator();
                ui.label(format!("I/O errors: {}", stats.io_errors));
            }
            if let Some(t) = stats.last_sample_at {
                ui.separator();
                ui.label(format!("Last sample: {}", t.format("%H:%M:%S%.3f")));
            }
            if let Some(reply) = &self.last_reply {
                ui.separator();
                ui.label(reply);
            }
        });
    }
}

impl eframe::App for PedalPlotApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if ctx.input(|i| i.viewport().close_requested()) {
            self.shutdown();
        }

        let now = Instant::now();
        self.refresher.refresh(&self.pipeline.history, now);

        if let Some(reply) = self.commands.poll() {
            info!("{}", reply.summary());
            self.last_reply = Some(reply.summary());
        }

        egui::TopBottomPanel::top("header").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if let Some(cmd) = self.config_panel.render(
                    ui,
                    self.pipeline.connection(),
                    self.commands.busy(),
                ) {
                    self.commands.send(cmd);
                }
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.toggle_value(&mut self.show_trace_settings, "Traces");
                });
            });
            if self.show_trace_settings {
                ui.separator();
                self.scope.render_menu(ui);
            }
        });

        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            self.render_status_bar(ui);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            self.scope.render_plot(ui, self.refresher.snapshot());
        });

        self.render_connection_alert(ctx);

        ctx.request_repaint_after(self.refresher.next_repaint(Instant::now()));
    }
}

impl Drop for PedalPlotApp {
    fn drop(&mut self) {
        self.shutdown();
    }
}
