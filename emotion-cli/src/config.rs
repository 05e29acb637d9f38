//! Configuration loading and CLI override logic.

use std::path::PathBuf;

use anyhow::{Context, Result};
use emotion_utils::{
    config::{AppSettings, default_settings_path},
    normalize_path,
};
use log::info;

use crate::args::CaptureArgs;

/// Load application settings from a file or use defaults.
pub fn load_settings(config_path: Option<&PathBuf>) -> Result<AppSettings> {
    if let Some(path) = config_path {
        let resolved = normalize_path(path)?;
        let settings = AppSettings::load_from_path(&resolved)?;
        info!("Loaded settings from {}", resolved.display());
        return Ok(settings);
    }

    let default_path = default_settings_path();
    if !default_path.exists() {
        return Ok(AppSettings::default());
    }
    let settings = AppSettings::load_from_path(&default_path).with_context(|| {
        format!(
            "failed to load default settings from {}",
            default_path.display()
        )
    })?;
    info!("Loaded settings from {}", default_path.display());
    Ok(settings)
}

/// Apply command-line arguments on top of loaded or default settings.
pub fn apply_cli_overrides(settings: &mut AppSettings, args: &CaptureArgs) {
    if args.telemetry {
        settings.telemetry.enabled = true;
    }
    if let Some(level) = args.telemetry_level.as_ref() {
        let normalized = level.trim();
        if !normalized.is_empty() {
            let lower = normalized.to_ascii_lowercase();
            if lower == "off" {
                settings.telemetry.enabled = false;
            }
            settings.telemetry.level = lower;
        }
    }

    if let Some(endpoint) = args.endpoint.as_ref() {
        settings.service.endpoint = endpoint.trim().to_string();
    }
    if let Some(cookie) = args.cookie.as_ref() {
        settings.service.cookie_header = Some(cookie.clone());
    }
    if let Some(timeout) = args.timeout_secs {
        settings.service.timeout_secs = timeout;
    }

    let camera = &mut settings.camera;
    if let Some(device) = args.device {
        camera.device_index = device;
    }
    if let Some(width) = args.width {
        camera.width = width;
    }
    if let Some(height) = args.height {
        camera.height = height;
    }
    if let Some(fps) = args.fps {
        camera.fps = fps;
    }

    if let Some(quality) = args.jpeg_quality {
        settings.capture.jpeg_quality = quality;
    }
    if let Some(dir) = args.output_dir.as_ref() {
        settings.capture.download_dir = dir.clone();
    }
    if let Some(font) = args.font.as_ref() {
        settings.overlay.font_path = Some(font.clone());
    }

    settings.capture.sanitize();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn overrides_replace_file_values() {
        let args = CaptureArgs::try_parse_from([
            "emotion-cli",
            "--endpoint",
            " http://detector.local/process-frame/ ",
            "--cookie",
            "csrftoken=abc",
            "--width",
            "1280",
            "--jpeg-quality",
            "0",
            "--telemetry-level",
            "OFF",
        ])
        .expect("parse");
        let mut settings = AppSettings::default();
        settings.telemetry.enabled = true;
        apply_cli_overrides(&mut settings, &args);

        assert_eq!(settings.service.endpoint, "http://detector.local/process-frame/");
        assert_eq!(settings.service.cookie_header.as_deref(), Some("csrftoken=abc"));
        assert_eq!(settings.camera.width, 1280);
        assert_eq!(settings.camera.height, 480);
        assert_eq!(settings.capture.jpeg_quality, 1);
        assert!(!settings.telemetry.enabled);
        assert_eq!(settings.telemetry.level, "off");
    }

    #[test]
    fn explicit_config_file_is_loaded() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"camera": {"device_index": 2}}"#).expect("write");
        let settings = load_settings(Some(&path)).expect("load");
        assert_eq!(settings.camera.device_index, 2);
        assert_eq!(settings.camera.width, 640);
    }
}
