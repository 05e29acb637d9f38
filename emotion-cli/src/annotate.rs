//! Writing photos with the detection overlay drawn on them.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use emotion_core::{
    CameraSource, CapturedPhoto, LiveEmotionController, RasterSurface, load_font,
};
use image::{DynamicImage, imageops::FilterType};
use log::warn;

/// Size the overlay is rendered at; `None` means the photo's own size.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisplaySize {
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl DisplaySize {
    pub fn resolve(&self, native: (u32, u32)) -> (u32, u32) {
        (
            self.width.filter(|w| *w > 0).unwrap_or(native.0),
            self.height.filter(|h| *h > 0).unwrap_or(native.1),
        )
    }
}

/// Render the controller's current overlay over `photo` and save it as PNG.
pub fn annotate_photo<S: CameraSource>(
    app: &LiveEmotionController<S>,
    photo: &CapturedPhoto,
    display: DisplaySize,
    font_path: Option<&Path>,
    output_dir: &Path,
) -> Result<PathBuf> {
    let image = photo.decode().context("failed to decode captured photo")?;
    let (width, height) = display.resolve(photo.native_size());
    if width == 0 || height == 0 {
        anyhow::bail!("cannot annotate a photo with zero dimensions");
    }
    let background = if (width, height) == photo.native_size() {
        image
    } else {
        DynamicImage::ImageRgba8(image::imageops::resize(
            &image,
            width,
            height,
            FilterType::Triangle,
        ))
    };

    let mut surface = RasterSurface::over(&background);
    if let Some(path) = font_path {
        match load_font(path) {
            Ok(font) => surface = surface.with_font(font),
            Err(err) => warn!("Overlay labels disabled: {err:#}"),
        }
    }
    app.paint_overlay(&mut surface, (width as f32, height as f32));

    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("failed to create {}", output_dir.display()))?;
    let stem = photo
        .download_name()
        .trim_end_matches(".jpg")
        .to_string();
    let output_path = output_dir.join(format!("{stem}-overlay.png"));
    surface
        .into_image()
        .save(&output_path)
        .with_context(|| format!("failed to save annotated image {}", output_path.display()))?;
    Ok(output_path)
}
