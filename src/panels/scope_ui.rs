use egui::Ui;
use egui_plot::{Legend, Line, Plot};

use crate::config::{PedalPlotConfig, X_RANGE, Y_RANGE};
use crate::data::history::{Channel, HistorySnapshot};
use crate::data::trace_look::TraceLook;

/// The two-line pedal chart with fixed axes.
pub struct ScopePanel {
    brake: TraceLook,
    throttle: TraceLook,
    show_legend: bool,
}

impl Default for ScopePanel {
    fn default() -> Self {
        Self {
            brake: TraceLook::for_channel(Channel::Brake),
            throttle: TraceLook::for_channel(Channel::Throttle),
            show_legend: true,
        }
    }
}

impl ScopePanel {
    pub fn from_config(cfg: &PedalPlotConfig) -> Self {
        Self {
            brake: cfg.look(Channel::Brake),
            throttle: cfg.look(Channel::Throttle),
            ..Default::default()
        }
    }

    pub fn look(&self, channel: Channel) -> &TraceLook {
        match channel {
            Channel::Brake => &self.brake,
            Channel::Throttle => &self.throttle,
        }
    }

    pub fn look_mut(&mut self, channel: Channel) -> &mut TraceLook {
        match channel {
            Channel::Brake => &mut self.brake,
            Channel::Throttle => &mut self.throttle,
        }
    }

    /// Visibility/color/width editors for both traces.
    pub fn render_menu(&mut self, ui: &mut Ui) {
        for channel in Channel::ALL {
            self.look_mut(channel).render_editor(ui, channel.label());
        }
        ui.checkbox(&mut self.show_legend, "Legend");
    }

    pub fn render_plot(&self, ui: &mut Ui, snapshot: &HistorySnapshot) {
        let mut plot = Plot::new("pedal_scope")
            .x_axis_label("Samples")
            .y_axis_label("Analog value")
            .allow_drag(false)
            .allow_zoom(false)
            .allow_scroll(false)
            .allow_boxed_zoom(false)
            .allow_double_click_reset(false);
        if self.show_legend {
            plot = plot.legend(Legend::default());
        }

        plot.show(ui, |plot_ui| {
            plot_ui.set_plot_bounds_x(X_RANGE.0..=X_RANGE.1);
            plot_ui.set_plot_bounds_y(Y_RANGE.0..=Y_RANGE.1);

            for channel in Channel::ALL {
                let look = self.look(channel);
                if !look.visible {
                    continue;
                }
                let line = Line::new(channel.label(), snapshot.points(channel))
                    .color(look.color)
                    .width(look.width.max(0.1))
                    .style(look.style);
                plot_ui.line(line);
            }
        });
    }
}
