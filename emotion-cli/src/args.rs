//! Command-line argument definitions for emotion-cli.

use clap::{ArgAction, Parser};
use std::path::PathBuf;

/// Capture live photos and analyze the emotions of every face in them.
#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct CaptureArgs {
    /// List available webcam devices and exit.
    #[arg(long, action = ArgAction::SetTrue)]
    pub list_devices: bool,

    /// Analyze a still image instead of the webcam.
    #[arg(short, long, conflicts_with = "list_devices")]
    pub image: Option<PathBuf>,

    /// Number of photos to take.
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    pub shots: u32,

    /// Pause between photos in milliseconds.
    #[arg(long, default_value_t = 1000)]
    pub interval_ms: u64,

    /// Optional settings JSON. Defaults to `config/emotion_settings.json` when present.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Detection service endpoint URL.
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Raw `Cookie` header the CSRF token is read from (e.g. "csrftoken=abc").
    #[arg(long)]
    pub cookie: Option<String>,

    /// Request timeout in seconds.
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Webcam device index.
    #[arg(long)]
    pub device: Option<u32>,

    /// Requested capture width.
    #[arg(long)]
    pub width: Option<u32>,

    /// Requested capture height.
    #[arg(long)]
    pub height: Option<u32>,

    /// Requested frame rate.
    #[arg(long)]
    pub fps: Option<u32>,

    /// JPEG quality for captured photos (1-100).
    #[arg(long)]
    pub jpeg_quality: Option<u8>,

    /// Save each analyzed photo into this directory.
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Directory to write photos with the detection overlay drawn on them.
    #[arg(long)]
    pub annotate: Option<PathBuf>,

    /// Width the overlay is rendered at (defaults to the photo width).
    #[arg(long, requires = "annotate")]
    pub display_width: Option<u32>,

    /// Height the overlay is rendered at (defaults to the photo height).
    #[arg(long, requires = "annotate")]
    pub display_height: Option<u32>,

    /// TrueType font used for overlay labels.
    #[arg(long)]
    pub font: Option<PathBuf>,

    /// Write the session report to a JSON file instead of stdout.
    #[arg(long)]
    pub json: Option<PathBuf>,

    /// Enable telemetry timing logs (defaults to settings file).
    #[arg(long, action = ArgAction::SetTrue)]
    pub telemetry: bool,

    /// Override telemetry logging level (error, warn, info, debug, trace).
    #[arg(long, value_name = "LEVEL")]
    pub telemetry_level: Option<String>,
}
