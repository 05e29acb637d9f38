//! Common helpers shared across the live emotion crates.

/// Basic color type and hex parsing used by overlay styling.
pub mod color;
/// Application configuration and settings management.
pub mod config;
/// JPEG encoding, data URIs and photo output.
pub mod output;
/// Instrumentation helpers for optional performance tracing.
pub mod telemetry;
/// Webcam capture backed by nokhwa.
pub mod webcam;

use std::path::Path;

use anyhow::Result;
use log::LevelFilter;

pub use color::{RgbaColor, parse_hex_color};
pub use config::{AppSettings, default_settings_path};
pub use output::{
    DEFAULT_JPEG_QUALITY, JPEG_MIME, decode_data_uri, encode_jpeg, jpeg_data_uri, save_into_dir,
    write_bytes,
};
pub use telemetry::{
    Stage, TimingGuard, configure as configure_telemetry, telemetry_allows, telemetry_enabled,
    telemetry_level, timing_guard, timing_guard_if,
};
pub use webcam::{WebcamCapture, list_webcam_devices};

/// Initialize logging once for CLI and GUI environments.
///
/// This function respects the `RUST_LOG` environment variable if it is set.
/// Otherwise, it falls back to the provided default filter level.
pub fn init_logging(default_filter: LevelFilter) -> Result<()> {
    let mut builder = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(default_filter.as_str()),
    );
    builder.filter_module("emotion::telemetry", LevelFilter::Trace);

    if builder.try_init().is_err() {
        // Logger already initialized; nothing to do.
    }
    Ok(())
}

/// Validate that a path exists and resolve it to an absolute path.
pub fn normalize_path<P: AsRef<Path>>(path: P) -> Result<std::path::PathBuf> {
    let path = path.as_ref();
    anyhow::ensure!(path.exists(), "path does not exist: {}", path.display());
    Ok(path.canonicalize()?)
}
