//! Running a capture session from the command line.

use std::{path::PathBuf, thread, time::Duration};

use anyhow::{Context, Result};
use emotion_core::{
    CameraSource, CompletionOutcome, DetectionClient, LiveEmotionController, ResultsPresenter,
};
use log::{info, warn};

use crate::{
    annotate::{DisplaySize, annotate_photo},
    types::{FaceRecord, ShotReport, ShotStatus},
};

#[derive(Debug, Clone, Default)]
pub struct SessionOptions {
    pub shots: u32,
    pub interval: Duration,
    pub download_dir: Option<PathBuf>,
    pub annotate_dir: Option<PathBuf>,
    pub display: DisplaySize,
    pub font_path: Option<PathBuf>,
}

/// Start the camera, take `options.shots` photos, analyze each and stop.
pub fn run_session<S: CameraSource>(
    app: &mut LiveEmotionController<S>,
    client: &dyn DetectionClient,
    options: &SessionOptions,
) -> Result<Vec<ShotReport>> {
    app.start().context("failed to start the camera")?;
    log_panel(app);

    let mut reports = Vec::with_capacity(options.shots as usize);
    for shot in 1..=options.shots {
        if shot > 1 && !options.interval.is_zero() {
            thread::sleep(options.interval);
        }
        reports.push(take_shot(app, client, options, shot));
    }

    app.stop();
    log_panel(app);
    Ok(reports)
}

fn take_shot<S: CameraSource>(
    app: &mut LiveEmotionController<S>,
    client: &dyn DetectionClient,
    options: &SessionOptions,
    shot: u32,
) -> ShotReport {
    let pending = match app.begin_capture() {
        Ok(pending) => pending,
        Err(err) => {
            warn!("Shot {shot}: {err}");
            return ShotReport::failed(shot, err.to_string());
        }
    };
    log_panel(app);

    let result = client.detect(&pending.photo);
    let error = result.as_ref().err().map(ToString::to_string);
    let outcome = app.complete_capture(pending.ticket, result);
    log_panel(app);

    let mut report = ShotReport {
        shot,
        status: ShotStatus::from(outcome),
        width: Some(pending.photo.width),
        height: Some(pending.photo.height),
        faces: Vec::new(),
        error,
        photo: None,
        annotated: None,
    };
    if !matches!(outcome, CompletionOutcome::Rendered(_)) {
        return report;
    }

    report.faces = app
        .overlay_faces()
        .iter()
        .enumerate()
        .map(|(index, face)| FaceRecord::new(index + 1, face))
        .collect();

    if let Some(dir) = options.download_dir.as_ref() {
        match app.download_photo(dir) {
            Ok(path) => report.photo = Some(path.display().to_string()),
            Err(err) => warn!("Shot {shot}: failed to save photo: {err:#}"),
        }
    }
    if let (Some(dir), Some(photo)) = (options.annotate_dir.as_ref(), app.last_photo()) {
        match annotate_photo(app, photo, options.display, options.font_path.as_deref(), dir) {
            Ok(path) => {
                info!("Annotated photo saved to {}", path.display());
                report.annotated = Some(path.display().to_string());
            }
            Err(err) => warn!("Shot {shot}: failed to annotate photo: {err:#}"),
        }
    }
    report
}

fn log_panel<S: CameraSource>(app: &LiveEmotionController<S>) {
    for line in ResultsPresenter.render(app.panel()).lines() {
        if !line.trim().is_empty() {
            info!("{line}");
        }
    }
    if let Some(notice) = app.notice() {
        warn!("{notice}");
    }
}
