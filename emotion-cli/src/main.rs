mod annotate;
mod args;
mod config;
mod session;
mod types;

use std::{
    fs::{self, File},
    time::Duration,
};

use anyhow::{Context, Result};
use clap::Parser;
use emotion_core::{
    CameraSource, HttpDetectionClient, LiveEmotionController, StillImageSource, WebcamSource,
};
use emotion_utils::{
    config::AppSettings, configure_telemetry, init_logging, list_webcam_devices, normalize_path,
};
use log::info;

use crate::{
    annotate::DisplaySize,
    args::CaptureArgs,
    config::{apply_cli_overrides, load_settings},
    session::{SessionOptions, run_session},
    types::{ShotReport, ShotStatus},
};

fn main() -> Result<()> {
    init_logging(log::LevelFilter::Info)?;
    let args = CaptureArgs::parse();

    if args.list_devices {
        let devices = list_webcam_devices().context("could not enumerate webcam devices")?;
        if devices.is_empty() {
            println!("No webcam devices found");
        }
        for (index, name) in devices {
            println!("[{index}] {name}");
        }
        return Ok(());
    }

    let mut settings = load_settings(args.config.as_ref())?;
    apply_cli_overrides(&mut settings, &args);
    configure_telemetry(
        settings.telemetry.enabled,
        settings.telemetry.level_filter(),
    );

    let options = SessionOptions {
        shots: args.shots,
        interval: Duration::from_millis(args.interval_ms),
        download_dir: args
            .output_dir
            .as_ref()
            .map(|_| settings.capture.download_dir.clone()),
        annotate_dir: args.annotate.clone(),
        display: DisplaySize {
            width: args.display_width,
            height: args.display_height,
        },
        font_path: settings.overlay.font_path.clone(),
    };

    let client = HttpDetectionClient::from_settings(&settings.service);
    info!("Sending photos to {}", client.endpoint());

    let reports = match args.image.as_ref() {
        Some(path) => {
            let path = normalize_path(path)?;
            info!("Analyzing still image {}", path.display());
            capture_with(StillImageSource::new(path), &settings, &client, &options)?
        }
        None => {
            let camera = settings.camera;
            info!(
                "Opening webcam device {} at {}x{} @ {} fps",
                camera.device_index, camera.width, camera.height, camera.fps
            );
            capture_with(WebcamSource, &settings, &client, &options)?
        }
    };

    write_report(&args, &reports)?;

    if reports.iter().all(|r| r.status == ShotStatus::Failed) {
        anyhow::bail!("every capture failed; see the report for details");
    }
    Ok(())
}

fn capture_with<S: CameraSource>(
    source: S,
    settings: &AppSettings,
    client: &HttpDetectionClient,
    options: &SessionOptions,
) -> Result<Vec<ShotReport>> {
    let mut app = LiveEmotionController::new(source, settings);
    run_session(&mut app, client, options)
}

fn write_report(args: &CaptureArgs, reports: &[ShotReport]) -> Result<()> {
    let Some(json_path) = args.json.as_ref() else {
        let json = serde_json::to_string_pretty(reports).context("failed to serialize report")?;
        println!("{json}");
        return Ok(());
    };

    if let Some(dir) = json_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(dir)
            .with_context(|| format!("failed to create directory {}", dir.display()))?;
    }
    let file = File::create(json_path)
        .with_context(|| format!("failed to create {}", json_path.display()))?;
    serde_json::to_writer_pretty(file, reports)
        .with_context(|| format!("failed to write report to {}", json_path.display()))?;
    info!("Wrote report to {}", json_path.display());
    Ok(())
}
