//! Shared configuration types consumed by the CLI and GUI front ends.
//!
//! Settings are stored as pretty-printed JSON. Every section uses
//! `#[serde(default)]`, so partial files only override what they name.

use crate::color::RgbaColor;

use anyhow::{Context, Result};
use log::LevelFilter;
use serde::{Deserialize, Serialize};
use std::{
    env, fs,
    path::{Path, PathBuf},
    time::Duration,
};

/// Camera acquisition request.
///
/// The width and height are a target only; the device may pick another mode
/// and the actual resolution is always read back after opening.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CameraSettings {
    /// Camera device index (0 for the default, front-facing camera).
    pub device_index: u32,
    pub width: u32,
    pub height: u32,
    pub fps: u32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            device_index: 0,
            width: 640,
            height: 480,
            fps: 30,
        }
    }
}

/// Where and how captured photos are sent for analysis.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServiceSettings {
    /// Detection endpoint accepting `POST` JSON frames.
    pub endpoint: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Cookie carrying the anti-forgery token.
    pub csrf_cookie_name: String,
    /// Header the token is sent in.
    pub csrf_header: String,
    /// Raw `Cookie` header contents to look the token up in.
    pub cookie_header: Option<String>,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:8000/process-frame/".to_string(),
            timeout_secs: 15,
            csrf_cookie_name: "csrftoken".to_string(),
            csrf_header: "X-CSRFToken".to_string(),
            cookie_header: None,
        }
    }
}

impl ServiceSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

/// Still-photo encoding and download options.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CaptureSettings {
    /// JPEG quality (1-100).
    pub jpeg_quality: u8,
    /// Directory photos are downloaded into.
    pub download_dir: PathBuf,
}

impl Default for CaptureSettings {
    fn default() -> Self {
        Self {
            jpeg_quality: crate::output::DEFAULT_JPEG_QUALITY,
            download_dir: PathBuf::from("captures"),
        }
    }
}

impl CaptureSettings {
    /// Clamp values to sensible ranges.
    pub fn sanitize(&mut self) {
        self.jpeg_quality = self.jpeg_quality.clamp(1, 100);
    }
}

/// Colors and metrics for the detection overlay.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OverlaySettings {
    pub box_color: RgbaColor,
    pub label_fill: RgbaColor,
    pub label_text: RgbaColor,
    /// Outline thickness in display pixels.
    pub line_width: f32,
    /// TrueType font for raster (file) output. Labels are skipped without one.
    pub font_path: Option<PathBuf>,
}

impl Default for OverlaySettings {
    fn default() -> Self {
        Self {
            box_color: RgbaColor::GREEN,
            label_fill: RgbaColor::GREEN.with_opacity(0.8),
            label_text: RgbaColor::WHITE,
            line_width: 3.0,
            font_path: None,
        }
    }
}

/// Settings controlling optional runtime telemetry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetrySettings {
    /// Whether telemetry timing logs are enabled.
    pub enabled: bool,
    /// Logging level for telemetry output (error, warn, info, debug, trace).
    pub level: String,
}

impl Default for TelemetrySettings {
    fn default() -> Self {
        Self {
            enabled: false,
            level: "debug".to_string(),
        }
    }
}

impl TelemetrySettings {
    /// Resolve the configured level string into a `LevelFilter`.
    pub fn level_filter(&self) -> LevelFilter {
        match self.level.trim().to_ascii_lowercase().as_str() {
            "off" => LevelFilter::Off,
            "error" => LevelFilter::Error,
            "warn" | "warning" => LevelFilter::Warn,
            "info" => LevelFilter::Info,
            "trace" => LevelFilter::Trace,
            _ => LevelFilter::Debug,
        }
    }
}

/// Persistent application settings consumed by CLI and GUI front ends.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppSettings {
    pub camera: CameraSettings,
    pub service: ServiceSettings,
    pub capture: CaptureSettings,
    pub overlay: OverlaySettings,
    pub telemetry: TelemetrySettings,
}

impl AppSettings {
    /// Load settings from a JSON file.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read settings file {}", path.display()))?;
        let mut settings: AppSettings = serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse settings JSON at {}", path.display()))?;
        settings.capture.sanitize();
        Ok(settings)
    }

    /// Serialize settings to disk in pretty-printed JSON, overwriting any existing file.
    pub fn save_to_path<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let payload =
            serde_json::to_string_pretty(self).context("failed to serialize settings JSON")?;
        fs::write(path, payload)
            .with_context(|| format!("failed to write settings file {}", path.display()))?;
        Ok(())
    }

    /// Load `path` when it exists, otherwise fall back to defaults.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::load_from_path(path)
        } else {
            Ok(Self::default())
        }
    }
}

/// Returns the default path for persisted settings (`config/emotion_settings.json`).
pub fn default_settings_path() -> PathBuf {
    env::current_dir()
        .map(|dir| dir.join("config/emotion_settings.json"))
        .unwrap_or_else(|_| PathBuf::from("config/emotion_settings.json"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn default_settings_round_trip() {
        let file = NamedTempFile::new().expect("tempfile");
        let settings = AppSettings::default();
        settings.save_to_path(file.path()).expect("save");

        let loaded = AppSettings::load_from_path(file.path()).expect("load");
        assert_eq!(loaded.camera, settings.camera);
        assert_eq!(loaded.service, settings.service);
        assert_eq!(loaded.capture, settings.capture);
        assert_eq!(loaded.overlay, settings.overlay);
        assert_eq!(loaded.telemetry.level, settings.telemetry.level);
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let file = NamedTempFile::new().expect("tempfile");
        let json = r#"{
            "camera": { "width": 1280 },
            "service": { "endpoint": "http://detector.local/process-frame/" },
            "capture": { "jpeg_quality": 0 }
        }"#;
        fs::write(file.path(), json).expect("write custom settings");

        let loaded = AppSettings::load_from_path(file.path()).expect("load");
        assert_eq!(loaded.camera.width, 1280);
        assert_eq!(loaded.camera.height, 480);
        assert_eq!(loaded.service.endpoint, "http://detector.local/process-frame/");
        assert_eq!(loaded.service.csrf_cookie_name, "csrftoken");
        assert_eq!(loaded.capture.jpeg_quality, 1, "quality is clamped");
        assert!(!loaded.telemetry.enabled);
        assert_eq!(loaded.telemetry.level_filter(), LevelFilter::Debug);
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let loaded =
            AppSettings::load_or_default(dir.path().join("absent.json")).expect("defaults");
        assert_eq!(loaded.camera, CameraSettings::default());
        assert_eq!(loaded.service.timeout(), Duration::from_secs(15));
    }

    #[test]
    fn default_overlay_matches_green_scheme() {
        let overlay = OverlaySettings::default();
        assert_eq!(overlay.box_color.to_hex(), "#00ff00");
        assert_eq!(overlay.label_fill.alpha, 204);
        assert_eq!(overlay.line_width, 3.0);
    }
}
