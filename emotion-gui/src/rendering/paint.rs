//! Painting the detection overlay with egui.

use egui::{
    Align2, Color32, CornerRadius, FontId, Painter, Rect, Shape, Stroke, StrokeKind, pos2, vec2,
};
use emotion_core::{LabelFont, OverlayRect, OverlaySurface};
use emotion_utils::RgbaColor;

use crate::types::EmotionApp;

/// An [`OverlaySurface`] that buffers egui shapes positioned relative to
/// the displayed video rectangle.
pub struct PainterSurface {
    origin: egui::Pos2,
    shapes: Vec<Shape>,
    text_shapes: Vec<(egui::Pos2, String, FontId, Color32)>,
}

impl PainterSurface {
    pub fn new(image_rect: Rect) -> Self {
        Self {
            origin: image_rect.min,
            shapes: Vec::new(),
            text_shapes: Vec::new(),
        }
    }

    pub fn shape_count(&self) -> usize {
        self.shapes.len() + self.text_shapes.len()
    }

    fn rect(&self, rect: OverlayRect) -> Rect {
        Rect::from_min_size(
            pos2(self.origin.x + rect.x, self.origin.y + rect.y),
            vec2(rect.width, rect.height),
        )
    }

    /// Hand the buffered shapes to `painter`.
    pub fn finish(self, painter: &Painter) {
        painter.extend(self.shapes);
        for (pos, text, font, color) in self.text_shapes {
            painter.text(pos, Align2::LEFT_BOTTOM, text, font, color);
        }
    }
}

fn color32(color: RgbaColor) -> Color32 {
    let [r, g, b, a] = color.to_array();
    Color32::from_rgba_unmultiplied(r, g, b, a)
}

impl OverlaySurface for PainterSurface {
    fn clear(&mut self) {
        self.shapes.clear();
        self.text_shapes.clear();
    }

    fn stroke_rect(&mut self, rect: OverlayRect, line_width: f32, color: RgbaColor) {
        self.shapes.push(Shape::rect_stroke(
            self.rect(rect),
            CornerRadius::ZERO,
            Stroke::new(line_width, color32(color)),
            StrokeKind::Middle,
        ));
    }

    fn fill_rect(&mut self, rect: OverlayRect, color: RgbaColor) {
        self.shapes.push(Shape::rect_filled(
            self.rect(rect),
            CornerRadius::ZERO,
            color32(color),
        ));
    }

    fn fill_text(&mut self, text: &str, origin: (f32, f32), font: LabelFont, color: RgbaColor) {
        let pos = pos2(self.origin.x + origin.0, self.origin.y + origin.1);
        let font_id = FontId::proportional(font.size);
        let color = color32(color);
        if font.bold {
            self.text_shapes
                .push((pos + vec2(1.0, 0.0), text.to_owned(), font_id.clone(), color));
        }
        self.text_shapes.push((pos, text.to_owned(), font_id, color));
    }
}

impl EmotionApp {
    /// Paints the current detections over the displayed video.
    pub(crate) fn paint_overlay(&self, ui: &egui::Ui, image_rect: Rect) {
        let painter = ui.painter().with_clip_rect(image_rect.expand(40.0));
        let mut surface = PainterSurface::new(image_rect);
        self.controller
            .paint_overlay(&mut surface, (image_rect.width(), image_rect.height()));
        surface.finish(&painter);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use emotion_core::{BoundingBox, DetectedFace, OverlayRenderer, OverlayStyle};

    #[test]
    fn buffers_one_box_and_labels_per_face() {
        let face = DetectedFace {
            bbox: BoundingBox::new(10.0, 40.0, 50.0, 50.0),
            emotion_scores: [("happy".to_string(), 91.2)].into_iter().collect(),
            dominant_emotion: "happy".into(),
            confidence: 91.2,
        };
        let mut surface =
            PainterSurface::new(Rect::from_min_size(pos2(100.0, 50.0), vec2(640.0, 480.0)));
        OverlayRenderer::new(OverlayStyle::default()).render(
            &mut surface,
            &[face],
            (640, 480),
            (640.0, 480.0),
        );
        // Bold labels are drawn twice.
        assert_eq!(surface.shapes.len(), 2);
        assert_eq!(surface.text_shapes.len(), 5);
        assert_eq!(surface.text_shapes[1].0, pos2(115.0, 80.0));

        surface.clear();
        assert_eq!(surface.shape_count(), 0);
    }
}
