//! Results panel beside the preview.

use egui::{CornerRadius, Margin, RichText, ScrollArea, SidePanel, Spinner, Stroke, Ui};
use emotion_core::{FaceCard, PanelAction, ResultsPanel, format_percent};

use crate::{EmotionApp, theme};

impl EmotionApp {
    pub fn show_results_panel(&mut self, ctx: &egui::Context) {
        let palette = theme::palette();
        let mut clicked = None;
        SidePanel::right("emotion_results")
            .resizable(true)
            .default_width(360.0)
            .frame(
                egui::Frame::new()
                    .fill(palette.panel)
                    .inner_margin(Margin::same(16)),
            )
            .show(ctx, |ui| {
                ui.heading("Results");
                ui.separator();
                ScrollArea::vertical().show(ui, |ui| {
                    clicked = draw_panel(ui, palette, self.controller.panel());
                });
            });

        if let Some(action) = clicked {
            self.handle_panel_action(action);
        }
    }

    pub fn handle_panel_action(&mut self, action: PanelAction) {
        match action {
            PanelAction::TakeAnother | PanelAction::Retry => self.take_photo(),
            PanelAction::Download => self.download_photo(),
            PanelAction::Clear => self.clear_results(),
        }
    }
}

fn draw_panel(ui: &mut Ui, palette: theme::Palette, panel: &ResultsPanel) -> Option<PanelAction> {
    let accent = palette.tone(panel.tone());

    if let Some(title) = panel.title() {
        ui.label(RichText::new(title).size(18.0).strong().color(accent));
    }
    ui.horizontal_wrapped(|ui| {
        if panel.is_busy() {
            ui.add(Spinner::new().size(18.0));
        }
        ui.label(RichText::new(panel.message()).color(palette.subtle_text));
    });
    for tip in panel.tips() {
        ui.label(format!("• {tip}"));
    }

    if let ResultsPanel::Success(summary) = panel {
        ui.small(summary.captured_label());
        ui.add_space(6.0);
        for card in &summary.cards {
            draw_card(ui, palette, card);
        }
    }

    let mut clicked = None;
    if !panel.actions().is_empty() {
        ui.add_space(10.0);
        ui.horizontal_wrapped(|ui| {
            for action in panel.actions() {
                if ui.button(action.label()).clicked() {
                    clicked = Some(*action);
                }
            }
        });
    }
    clicked
}

fn draw_card(ui: &mut Ui, palette: theme::Palette, card: &FaceCard) {
    egui::Frame::new()
        .fill(palette.panel_dark)
        .stroke(Stroke::new(1.0, palette.outline))
        .corner_radius(CornerRadius::same(12))
        .inner_margin(Margin::same(10))
        .show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.horizontal(|ui| {
                ui.label(RichText::new(format!("Face {} Analysis", card.number)).strong());
                egui::Frame::new()
                    .fill(palette.success)
                    .corner_radius(CornerRadius::same(24))
                    .inner_margin(Margin::symmetric(8, 2))
                    .show(ui, |ui| {
                        ui.label(
                            RichText::new(&card.dominant_emotion)
                                .color(palette.panel_dark)
                                .strong(),
                        );
                    });
            });
            ui.label(format!(
                "Primary emotion: {} ({} confidence)",
                card.primary_emotion,
                format_percent(card.primary_score)
            ));
            for (rank, (label, score)) in card.top_emotions.iter().enumerate() {
                ui.horizontal(|ui| {
                    ui.label(format!("{}. {label}", rank + 1));
                    ui.add(
                        egui::ProgressBar::new((score / 100.0).clamp(0.0, 1.0))
                            .desired_width(140.0)
                            .text(format_percent(*score)),
                    );
                });
            }
            ui.small(format!(
                "Overall confidence score: {}",
                format_percent(card.confidence)
            ));
        });
    ui.add_space(6.0);
}
