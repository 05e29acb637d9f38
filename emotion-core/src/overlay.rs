//! Drawing detection results over the live preview.
//!
//! [`OverlayRenderer`] projects native-resolution boxes onto whatever
//! [`OverlaySurface`] the front end supplies: a recording [`DisplayList`],
//! a [`RasterSurface`] backed by an RGBA image, or a painter in the GUI.

use std::path::Path;

use ab_glyph::{Font, FontArc, PxScale, ScaleFont};
use anyhow::{Context, Result};
use emotion_utils::{RgbaColor, Stage, config::OverlaySettings, timing_guard};
use image::{DynamicImage, Pixel, Rgba, RgbaImage};
use imageproc::{
    drawing::{draw_hollow_rect_mut, draw_text_mut},
    rect::Rect,
};
use log::{Level, debug};

use crate::face::{BoundingBox, DetectedFace};

const LABEL_WIDTH: f32 = 120.0;
const LABEL_HEIGHT: f32 = 25.0;
const LABEL_OFFSET: f32 = 30.0;
const LABEL_TEXT_INSET: (f32, f32) = (5.0, 10.0);
const EMOTION_BASELINE: f32 = 20.0;
const CONFIDENCE_BASELINE: f32 = 35.0;

/// A rectangle in display coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl OverlayRect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

impl From<BoundingBox> for OverlayRect {
    fn from(bbox: BoundingBox) -> Self {
        Self::new(bbox.x, bbox.y, bbox.width, bbox.height)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabelFont {
    /// Pixel height.
    pub size: f32,
    pub bold: bool,
}

impl LabelFont {
    pub const fn bold(size: f32) -> Self {
        Self { size, bold: true }
    }

    pub const fn regular(size: f32) -> Self {
        Self { size, bold: false }
    }
}

/// A 2D surface the overlay can be drawn on.
///
/// Text origins are baselines, left-aligned.
pub trait OverlaySurface {
    fn clear(&mut self);
    fn stroke_rect(&mut self, rect: OverlayRect, line_width: f32, color: RgbaColor);
    fn fill_rect(&mut self, rect: OverlayRect, color: RgbaColor);
    fn fill_text(&mut self, text: &str, origin: (f32, f32), font: LabelFont, color: RgbaColor);
}

/// Colors and stroke width used for every face.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayStyle {
    pub box_color: RgbaColor,
    pub label_fill: RgbaColor,
    pub label_text: RgbaColor,
    pub line_width: f32,
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self::from(&OverlaySettings::default())
    }
}

impl From<&OverlaySettings> for OverlayStyle {
    fn from(settings: &OverlaySettings) -> Self {
        Self {
            box_color: settings.box_color,
            label_fill: settings.label_fill,
            label_text: settings.label_text,
            line_width: settings.line_width.max(1.0),
        }
    }
}

/// Mapping from native stream coordinates to display coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    pub scale_x: f32,
    pub scale_y: f32,
}

impl Projection {
    /// `None` when any dimension is zero or not finite.
    pub fn new(native: (u32, u32), display: (f32, f32)) -> Option<Self> {
        let (native_w, native_h) = native;
        let (display_w, display_h) = display;
        let valid = native_w > 0
            && native_h > 0
            && display_w.is_finite()
            && display_h.is_finite()
            && display_w > 0.0
            && display_h > 0.0;
        valid.then(|| Self {
            scale_x: display_w / native_w as f32,
            scale_y: display_h / native_h as f32,
        })
    }

    pub fn project(&self, bbox: &BoundingBox) -> BoundingBox {
        bbox.scaled(self.scale_x, self.scale_y)
    }
}

/// Draws boxes and labels for a set of faces.
#[derive(Debug, Clone, Default)]
pub struct OverlayRenderer {
    style: OverlayStyle,
}

impl OverlayRenderer {
    pub fn new(style: OverlayStyle) -> Self {
        Self { style }
    }

    pub fn style(&self) -> &OverlayStyle {
        &self.style
    }

    /// Clear `surface` and draw every face, scaled from `native` to `display`.
    pub fn render<S: OverlaySurface + ?Sized>(
        &self,
        surface: &mut S,
        faces: &[DetectedFace],
        native: (u32, u32),
        display: (f32, f32),
    ) {
        let _guard = timing_guard(Stage::Render, Level::Trace);
        surface.clear();

        let Some(projection) = Projection::new(native, display) else {
            if !faces.is_empty() {
                debug!(
                    "Skipping overlay for {} face(s): native {:?} display {:?}",
                    faces.len(),
                    native,
                    display
                );
            }
            return;
        };

        for (index, face) in faces.iter().enumerate() {
            self.draw_face(surface, index + 1, face, projection.project(&face.bbox));
        }
    }

    fn draw_face<S: OverlaySurface + ?Sized>(
        &self,
        surface: &mut S,
        number: usize,
        face: &DetectedFace,
        bbox: BoundingBox,
    ) {
        let style = &self.style;
        surface.stroke_rect(bbox.into(), style.line_width, style.box_color);

        surface.fill_rect(
            OverlayRect::new(bbox.x, bbox.y - LABEL_OFFSET, LABEL_WIDTH, LABEL_HEIGHT),
            style.label_fill,
        );
        surface.fill_text(
            &format!("Face {number}"),
            (bbox.x + LABEL_TEXT_INSET.0, bbox.y - LABEL_TEXT_INSET.1),
            LabelFont::bold(14.0),
            style.label_text,
        );

        let bottom = bbox.bottom();
        surface.fill_text(
            &face.dominant_emotion,
            (bbox.x, bottom + EMOTION_BASELINE),
            LabelFont::bold(16.0),
            style.box_color,
        );
        surface.fill_text(
            &format_percent(face.confidence),
            (bbox.x, bottom + CONFIDENCE_BASELINE),
            LabelFont::regular(12.0),
            style.box_color,
        );
    }
}

/// One decimal place followed by `%`.
pub fn format_percent(value: f32) -> String {
    format!("{value:.1}%")
}

/// A drawing operation recorded by [`DisplayList`].
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    StrokeRect {
        rect: OverlayRect,
        line_width: f32,
        color: RgbaColor,
    },
    FillRect {
        rect: OverlayRect,
        color: RgbaColor,
    },
    Text {
        text: String,
        origin: (f32, f32),
        font: LabelFont,
        color: RgbaColor,
    },
}

/// Surface that records what was drawn since the last clear.
#[derive(Debug, Clone, Default)]
pub struct DisplayList {
    commands: Vec<DrawCommand>,
    clears: usize,
}

impl DisplayList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn clear_count(&self) -> usize {
        self.clears
    }

    pub fn is_blank(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn stroked_rects(&self) -> Vec<OverlayRect> {
        self.commands
            .iter()
            .filter_map(|cmd| match cmd {
                DrawCommand::StrokeRect { rect, .. } => Some(*rect),
                _ => None,
            })
            .collect()
    }

    pub fn texts(&self) -> Vec<&str> {
        self.commands
            .iter()
            .filter_map(|cmd| match cmd {
                DrawCommand::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl OverlaySurface for DisplayList {
    fn clear(&mut self) {
        self.commands.clear();
        self.clears += 1;
    }

    fn stroke_rect(&mut self, rect: OverlayRect, line_width: f32, color: RgbaColor) {
        self.commands.push(DrawCommand::StrokeRect {
            rect,
            line_width,
            color,
        });
    }

    fn fill_rect(&mut self, rect: OverlayRect, color: RgbaColor) {
        self.commands.push(DrawCommand::FillRect { rect, color });
    }

    fn fill_text(&mut self, text: &str, origin: (f32, f32), font: LabelFont, color: RgbaColor) {
        self.commands.push(DrawCommand::Text {
            text: text.to_owned(),
            origin,
            font,
            color,
        });
    }
}

/// Overlay drawn straight into an RGBA image.
///
/// Clearing restores the background the surface was created with. Labels
/// need a font; without one only boxes and label backgrounds are drawn.
pub struct RasterSurface {
    background: RgbaImage,
    canvas: RgbaImage,
    font: Option<FontArc>,
}

impl RasterSurface {
    /// Fully transparent surface.
    pub fn blank(width: u32, height: u32) -> Self {
        Self::from_background(RgbaImage::new(width, height))
    }

    /// Surface that draws over a copy of `background`.
    pub fn over(background: &DynamicImage) -> Self {
        Self::from_background(background.to_rgba8())
    }

    fn from_background(background: RgbaImage) -> Self {
        Self {
            canvas: background.clone(),
            background,
            font: None,
        }
    }

    pub fn with_font(mut self, font: FontArc) -> Self {
        self.font = Some(font);
        self
    }

    pub fn has_font(&self) -> bool {
        self.font.is_some()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.canvas.dimensions()
    }

    pub fn image(&self) -> &RgbaImage {
        &self.canvas
    }

    pub fn into_image(self) -> RgbaImage {
        self.canvas
    }
}

/// Load a TrueType/OpenType font for raster labels.
pub fn load_font(path: &Path) -> Result<FontArc> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("failed to read font {}", path.display()))?;
    FontArc::try_from_vec(bytes)
        .with_context(|| format!("failed to parse font {}", path.display()))
}

fn to_rgba(color: RgbaColor) -> Rgba<u8> {
    Rgba(color.to_array())
}

impl OverlaySurface for RasterSurface {
    fn clear(&mut self) {
        self.canvas.clone_from(&self.background);
    }

    fn stroke_rect(&mut self, rect: OverlayRect, line_width: f32, color: RgbaColor) {
        // Centered on the rectangle edge, one hollow ring per pixel of width.
        // Rings are clipped to one pixel beyond the canvas so edges outside
        // it stay invisible and coordinates stay small.
        let (width, height) = self.canvas.dimensions();
        let (max_x, max_y) = (width as f32 + 1.0, height as f32 + 1.0);
        let rings = line_width.round().max(1.0) as i32;
        let first = -(rings / 2);
        for offset in first..first + rings {
            let left = (rect.x - offset as f32).round();
            let top = (rect.y - offset as f32).round();
            let right = left + (rect.width + 2.0 * offset as f32).round();
            let bottom = top + (rect.height + 2.0 * offset as f32).round();
            if right < 0.0 || bottom < 0.0 || left > width as f32 || top > height as f32 {
                continue;
            }
            let (left, top) = (left.clamp(-1.0, max_x), top.clamp(-1.0, max_y));
            let w = right.clamp(-1.0, max_x) - left;
            let h = bottom.clamp(-1.0, max_y) - top;
            if w < 1.0 || h < 1.0 {
                continue;
            }
            draw_hollow_rect_mut(
                &mut self.canvas,
                Rect::at(left as i32, top as i32).of_size(w as u32, h as u32),
                to_rgba(color),
            );
        }
    }

    fn fill_rect(&mut self, rect: OverlayRect, color: RgbaColor) {
        let (width, height) = self.canvas.dimensions();
        let x0 = rect.x.round().clamp(0.0, width as f32) as u32;
        let y0 = rect.y.round().clamp(0.0, height as f32) as u32;
        let x1 = (rect.x + rect.width).round().clamp(0.0, width as f32) as u32;
        let y1 = (rect.y + rect.height).round().clamp(0.0, height as f32) as u32;
        let paint = to_rgba(color);
        for y in y0..y1 {
            for x in x0..x1 {
                self.canvas.get_pixel_mut(x, y).blend(&paint);
            }
        }
    }

    fn fill_text(&mut self, text: &str, origin: (f32, f32), font: LabelFont, color: RgbaColor) {
        let Some(face) = self.font.as_ref() else {
            return;
        };
        let scale = PxScale::from(font.size);
        let top = origin.1 - face.as_scaled(scale).ascent();
        let (x, y) = (origin.0.round() as i32, top.round() as i32);
        draw_text_mut(&mut self.canvas, to_rgba(color), x, y, scale, face, text);
        if font.bold {
            draw_text_mut(&mut self.canvas, to_rgba(color), x + 1, y, scale, face, text);
        }
    }
}
