//! Photo encoding and output helpers.
//!
//! Captured frames travel as lossy JPEG: raw bytes on disk, and a
//! `data:image/jpeg;base64,...` URI inside detection requests.

use anyhow::{Context, Result, anyhow};
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use image::{DynamicImage, ExtendedColorType, ImageEncoder, codecs::jpeg::JpegEncoder};
use log::debug;
use std::{
    fs::{self, File},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

/// Default JPEG quality for captured photos (0.9 on a 0-1 scale).
pub const DEFAULT_JPEG_QUALITY: u8 = 90;

pub const JPEG_MIME: &str = "image/jpeg";

/// Encode an image as baseline JPEG at the given quality (1-100).
pub fn encode_jpeg(image: &DynamicImage, quality: u8) -> Result<Vec<u8>> {
    let rgb = image.to_rgb8();
    anyhow::ensure!(
        rgb.width() > 0 && rgb.height() > 0,
        "cannot encode an empty {}x{} frame",
        rgb.width(),
        rgb.height()
    );
    let mut buffer = Vec::new();
    {
        let encoder = JpegEncoder::new_with_quality(&mut buffer, quality.clamp(1, 100));
        encoder
            .write_image(
                rgb.as_raw(),
                rgb.width(),
                rgb.height(),
                ExtendedColorType::Rgb8,
            )
            .context("failed to encode JPEG")?;
    }
    debug!(
        "Encoded {}x{} frame as JPEG q{} ({} bytes)",
        rgb.width(),
        rgb.height(),
        quality,
        buffer.len()
    );
    Ok(buffer)
}

/// Wrap JPEG bytes in a base64 `data:` URI.
pub fn jpeg_data_uri(bytes: &[u8]) -> String {
    format!("data:{JPEG_MIME};base64,{}", BASE64.encode(bytes))
}

/// Split a base64 `data:` URI into its MIME type and decoded payload.
pub fn decode_data_uri(uri: &str) -> Result<(String, Vec<u8>)> {
    let rest = uri
        .strip_prefix("data:")
        .ok_or_else(|| anyhow!("not a data URI"))?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| anyhow!("data URI has no payload separator"))?;
    let mime = header
        .strip_suffix(";base64")
        .ok_or_else(|| anyhow!("data URI payload is not base64"))?;
    let bytes = BASE64
        .decode(payload.trim())
        .context("failed to decode base64 payload")?;
    Ok((mime.to_string(), bytes))
}

/// Write bytes to `path`, replacing any existing file.
pub fn write_bytes(path: &Path, bytes: &[u8]) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    writer
        .write_all(bytes)
        .with_context(|| format!("failed to write {}", path.display()))?;
    writer
        .flush()
        .with_context(|| format!("failed to flush {}", path.display()))?;
    Ok(())
}

/// Save `bytes` as `file_name` inside `dir`, creating the directory when needed.
pub fn save_into_dir(dir: &Path, file_name: &str, bytes: &[u8]) -> Result<PathBuf> {
    fs::create_dir_all(dir).with_context(|| format!("failed to create {}", dir.display()))?;
    let path = dir.join(file_name);
    write_bytes(&path, bytes)?;
    Ok(path)
}
