//! TraceLook: visual styling for the brake and throttle lines.

use eframe::egui;
use egui_plot::LineStyle;
use serde::{Deserialize, Serialize};

use super::history::Channel;

/// The visual presentation of a trace (color, visibility, line style).
#[derive(Debug, Clone)]
pub struct TraceLook {
    pub color: egui::Color32,
    pub visible: bool,
    pub width: f32,
    pub style: LineStyle,
}

impl Default for TraceLook {
    fn default() -> Self {
        Self {
            color: egui::Color32::GRAY,
            visible: true,
            width: 1.5,
            style: LineStyle::Solid,
        }
    }
}

impl TraceLook {
    /// Default look for a channel: the first two palette colors, in channel order.
    pub fn for_channel(channel: Channel) -> Self {
        let index = match channel {
            Channel::Brake => 0,
            Channel::Throttle => 1,
        };
        Self {
            color: Self::alloc_color(index),
            ..Default::default()
        }
    }

    /// Allocate a distinct color for the given trace index.
    pub fn alloc_color(index: usize) -> egui::Color32 {
        const PALETTE: [egui::Color32; 4] = [
            egui::Color32::from_rgb(31, 119, 180),
            egui::Color32::from_rgb(255, 127, 14),
            egui::Color32::from_rgb(44, 160, 44),
            egui::Color32::from_rgb(214, 39, 40),
        ];
        PALETTE[index % PALETTE.len()]
    }

    /// Render a compact inline editor (visibility, color, width).
    pub(crate) fn render_editor(&mut self, ui: &mut egui::Ui, label: &str) {
        ui.horizontal(|ui| {
            ui.checkbox(&mut self.visible, label);
            let mut c = self.color;
            if ui.color_edit_button_srgba(&mut c).changed() {
                self.color = c;
            }
            ui.add(
                egui::DragValue::new(&mut self.width)
                    .range(0.1..=10.0)
                    .speed(0.1),
            )
            .on_hover_text("Line width");
        });
    }
}

/// Serializable version of [`TraceLook`] for the YAML config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceLookSerde {
    pub color_rgba: [u8; 4],
    #[serde(default = "default_visible")]
    pub visible: bool,
    #[serde(default = "default_width")]
    pub width: f32,
}

fn default_visible() -> bool {
    true
}

fn default_width() -> f32 {
    1.5
}

impl From<&TraceLook> for TraceLookSerde {
    fn from(t: &TraceLook) -> Self {
        Self {
            color_rgba: t.color.to_srgba_unmultiplied(),
            visible: t.visible,
            width: t.width,
        }
    }
}

impl From<&TraceLookSerde> for TraceLook {
    fn from(s: &TraceLookSerde) -> Self {
        let [r, g, b, a] = s.color_rgba;
        Self {
            color: egui::Color32::from_rgba_unmultiplied(r, g, b, a),
            visible: s.visible,
            width: s.width.max(0.1),
            style: LineStyle::Solid,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channels_get_distinct_colors() {
        assert_ne!(
            TraceLook::for_channel(Channel::Brake).color,
            TraceLook::for_channel(Channel::Throttle).color
        );
    }

    #[test]
    fn serde_mirror_clamps_width() {
        let s = TraceLookSerde {
            color_rgba: [1, 2, 3, 255],
            visible: false,
            width: 0.0,
        };
        let look = TraceLook::from(&s);
        assert!(!look.visible);
        assert_eq!(look.width, 0.1);
        assert_eq!(TraceLookSerde::from(&look).color_rgba, [1, 2, 3, 255]);
    }
}
