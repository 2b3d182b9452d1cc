//! Header row: "Throttle Min" input, connection status and the optional send button.

use egui::{Color32, RichText, Ui};
use egui_phosphor::regular::{PAPER_PLANE_RIGHT, PLUGS, PLUGS_CONNECTED};

use crate::config::{expand_template, PedalPlotConfig};
use crate::context::ConnectionState;

pub struct ConfigPanel {
    throttle_min_text: String,
    command_template: Option<String>,
}

impl ConfigPanel {
    pub fn from_config(cfg: &PedalPlotConfig) -> Self {
        Self {
            throttle_min_text: cfg.throttle_min.to_string(),
            command_template: cfg.command_template.clone(),
        }
    }

    /// Current field content as an integer, if it is one.
    pub fn throttle_min(&self) -> Option<i32> {
        self.throttle_min_text.trim().parse().ok()
    }

    /// The command the send button would issue right now.
    pub fn pending_command(&self) -> Option<String> {
        let value = self.throttle_min()?;
        self.command_template
            .as_deref()
            .map(|t| expand_template(t, value))
    }

    /// Render the row. Returns a command to send when the button was clicked.
    pub fn render(&mut self, ui: &mut Ui, connection: &ConnectionState, busy: bool) -> Option<String> {
        let mut clicked = false;
        ui.horizontal(|ui| {
            ui.label("Throttle Min:");
            let valid = self.throttle_min().is_some();
            let edit = egui::TextEdit::singleline(&mut self.throttle_min_text)
                .desired_width(80.0)
                .text_color_opt((!valid).then_some(Color32::LIGHT_RED));
            ui.add(edit)
                .on_hover_text("Integer value, raw ADC units");

            if self.command_template.is_some() {
                let enabled = valid && connection.is_connected() && !busy;
                clicked = ui
                    .add_enabled(enabled, egui::Button::new(format!("{PAPER_PLANE_RIGHT} Send")))
                    .clicked();
            }

            ui.separator();
            let (icon, color) = if connection.is_connected() {
                (PLUGS_CONNECTED, Color32::from_rgb(44, 160, 44))
            } else {
                (PLUGS, Color32::from_rgb(214, 39, 40))
            };
            let status = ui.label(RichText::new(format!("{icon} {}", connection.label())).color(color));
            match connection {
                ConnectionState::Connected { port } => status.on_hover_text(port.as_str()),
                ConnectionState::Disconnected { reason } => status.on_hover_text(reason.as_str()),
            };
        });
        if clicked {
            self.pending_command()
        } else {
            None
        }
    }
}
