//! Live video preview with the detection overlay.

use egui::{CentralPanel, CornerRadius, Margin, Rect, RichText, Spinner, Stroke, Ui};
use std::time::Instant;

use crate::{EmotionApp, theme};

impl EmotionApp {
    pub fn show_preview(&mut self, ctx: &egui::Context) {
        let palette = theme::palette();
        CentralPanel::default().show(ctx, |ui| {
            egui::Frame::new()
                .fill(palette.canvas)
                .stroke(Stroke::new(1.0, palette.outline))
                .corner_radius(CornerRadius::same(20))
                .inner_margin(Margin::same(14))
                .show(ui, |ui| {
                    ui.set_min_size(ui.available_size());
                    self.render_preview_area(ui, palette);
                });
        });
    }

    fn render_preview_area(&mut self, ui: &mut Ui, palette: theme::Palette) {
        let Some(texture) = self.preview.texture.clone() else {
            ui.vertical_centered(|ui| {
                ui.add_space(80.0);
                if self.controller.is_active() {
                    ui.add(Spinner::new().size(28.0));
                    ui.label(RichText::new("Waiting for the camera...").size(16.0));
                } else {
                    ui.heading("Camera is off");
                    ui.label(
                        RichText::new("Start the webcam to see the live preview.")
                            .color(palette.subtle_text),
                    );
                }
            });
            return;
        };

        let available = ui.available_size();
        let tex_size = texture.size_vec2();
        if available.x <= 0.0 || available.y <= 0.0 || tex_size.x <= 0.0 || tex_size.y <= 0.0 {
            return;
        }
        let scale = (available.x / tex_size.x).min(available.y / tex_size.y);
        let scale = if scale.is_finite() && scale > 0.0 { scale } else { 1.0 };
        let scaled = tex_size * scale;

        ui.centered_and_justified(|ui| {
            let response = ui.add(egui::Image::new(&texture).fit_to_exact_size(scaled));
            let image_rect = Rect::from_center_size(response.rect.center(), scaled);
            self.paint_overlay(ui, image_rect);
            if self.flash_active(Instant::now()) {
                ui.painter()
                    .rect_filled(image_rect, CornerRadius::ZERO, palette.flash);
            }
        });
    }
}
