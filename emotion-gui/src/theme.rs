//! Look and feel of the photo booth window.

use egui::{Color32, Context, CornerRadius, Margin, Shadow, Stroke, Visuals};
use emotion_core::Tone;

/// Shared color palette used by the GUI.
#[derive(Clone, Copy)]
pub struct Palette {
    pub canvas: Color32,
    pub panel: Color32,
    pub panel_dark: Color32,
    pub panel_light: Color32,
    pub accent: Color32,
    pub success: Color32,
    pub warning: Color32,
    pub danger: Color32,
    pub subtle_text: Color32,
    pub outline: Color32,
    /// Capture flash over the preview.
    pub flash: Color32,
}

pub fn palette() -> Palette {
    Palette {
        canvas: Color32::from_rgb(12, 14, 20),
        panel: Color32::from_rgb(24, 28, 38),
        panel_dark: Color32::from_rgb(16, 19, 27),
        panel_light: Color32::from_rgb(44, 50, 66),
        accent: Color32::from_rgb(102, 126, 234),
        success: Color32::from_rgb(72, 199, 116),
        warning: Color32::from_rgb(255, 193, 7),
        danger: Color32::from_rgb(235, 87, 87),
        subtle_text: Color32::from_rgb(190, 198, 214),
        outline: Color32::from_rgba_unmultiplied(96, 108, 136, 150),
        flash: Color32::from_rgba_unmultiplied(255, 255, 255, 204),
    }
}

impl Palette {
    /// Accent used for a results panel state.
    pub fn tone(&self, tone: Tone) -> Color32 {
        match tone {
            Tone::Muted => self.subtle_text,
            Tone::Info => self.accent,
            Tone::Success => self.success,
            Tone::Warning => self.warning,
            Tone::Danger => self.danger,
        }
    }
}

pub fn apply(ctx: &Context) {
    let palette = palette();
    let mut style = (*ctx.style()).clone();

    style.spacing.item_spacing = egui::vec2(10.0, 8.0);
    style.spacing.button_padding = egui::vec2(14.0, 8.0);
    style.spacing.window_margin = Margin::same(12);
    style.visuals = visuals_from_palette(palette);

    ctx.set_style(style);
}

fn visuals_from_palette(palette: Palette) -> Visuals {
    let mut visuals = Visuals::dark();
    visuals.override_text_color = Some(Color32::from_rgb(234, 237, 244));
    visuals.panel_fill = palette.panel;
    visuals.extreme_bg_color = palette.canvas;

    visuals.widgets.noninteractive.bg_fill = palette.panel_dark;
    visuals.widgets.noninteractive.fg_stroke = Stroke::new(1.0, palette.subtle_text);
    visuals.widgets.inactive.bg_fill = palette.panel_light;
    visuals.widgets.inactive.bg_stroke = Stroke::new(1.0, palette.outline);
    visuals.widgets.hovered.bg_stroke = Stroke::new(1.0, palette.accent);
    visuals.widgets.active.bg_stroke = Stroke::new(1.5, palette.accent);
    visuals.selection.bg_fill = palette.accent;

    visuals.window_corner_radius = CornerRadius::same(14);
    visuals.popup_shadow = Shadow {
        offset: [0, 4],
        blur: 18,
        spread: 1,
        color: Color32::from_rgba_unmultiplied(0, 0, 0, 190),
    };

    visuals
}
