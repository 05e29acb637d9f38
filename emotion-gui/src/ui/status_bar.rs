//! Top bar with the camera controls.

use egui::{
    Align, Button, Color32, CornerRadius, Layout, Margin, Response, RichText, Spinner, Stroke,
    TopBottomPanel, Ui, vec2,
};

use crate::{EmotionApp, theme};

impl EmotionApp {
    /// Renders the title, camera state and the Start / Stop / Take Live Photo buttons.
    pub fn show_status_bar(&mut self, ctx: &egui::Context) {
        let palette = theme::palette();
        TopBottomPanel::top("emotion_status_bar")
            .frame(
                egui::Frame::new()
                    .fill(palette.panel_dark)
                    .stroke(Stroke::new(1.0, palette.outline))
                    .inner_margin(Margin::symmetric(20, 14)),
            )
            .show(ctx, |ui| {
                ui.vertical(|ui| {
                    ui.spacing_mut().item_spacing.y = 6.0;
                    ui.horizontal(|ui| {
                        ui.heading(RichText::new("Live Emotion Photo Booth").size(24.0).strong());
                        ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                            self.draw_status_badge(ui, palette);
                        });
                    });

                    ui.label(RichText::new(&self.status_line).color(palette.subtle_text));
                    if let Some(notice) = self.controller.notice().map(str::to_owned) {
                        ui.horizontal(|ui| {
                            ui.colored_label(palette.warning, notice);
                            if ui.small_button("Dismiss").clicked() {
                                self.controller.dismiss_notice();
                            }
                        });
                    }
                    if let Some(err) = &self.last_error {
                        ui.colored_label(palette.danger, err);
                    }

                    ui.add_space(8.0);
                    self.draw_camera_controls(ui, palette);
                });
            });
    }

    fn draw_status_badge(&self, ui: &mut Ui, palette: theme::Palette) {
        let analyzing = self.is_analyzing();
        let (label, color) = if analyzing {
            ("Analyzing...", palette.accent)
        } else if self.controller.is_active() {
            ("Live", palette.success)
        } else {
            ("Camera Off", palette.subtle_text)
        };

        egui::Frame::new()
            .fill(palette.panel_light)
            .stroke(Stroke::new(1.0, color))
            .corner_radius(CornerRadius::same(64))
            .inner_margin(Margin::symmetric(14, 6))
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    if analyzing {
                        ui.add(Spinner::new().size(16.0));
                    }
                    ui.label(RichText::new(label).size(15.0).strong().color(color));
                });
            });
    }

    fn draw_camera_controls(&mut self, ui: &mut Ui, palette: theme::Palette) {
        let controls = self.controller.controls();
        ui.horizontal_wrapped(|ui| {
            if control_button(ui, palette, "Start Webcam", palette.success, controls.start)
                .clicked()
            {
                self.start_camera();
            }
            if control_button(ui, palette, "Stop Webcam", palette.danger, controls.stop).clicked()
            {
                self.stop_camera();
            }
            if control_button(ui, palette, "Take Live Photo", palette.accent, controls.capture)
                .clicked()
            {
                self.take_photo();
            }
        });
    }
}

fn control_button(
    ui: &mut Ui,
    palette: theme::Palette,
    title: &str,
    accent: Color32,
    enabled: bool,
) -> Response {
    ui.add_enabled(
        enabled,
        Button::new(RichText::new(title).size(16.0).strong())
            .min_size(vec2(160.0, 44.0))
            .fill(if enabled {
                palette.panel_light
            } else {
                palette.panel_dark
            })
            .stroke(Stroke::new(1.0, if enabled { accent } else { palette.outline }))
            .corner_radius(CornerRadius::same(12)),
    )
}
