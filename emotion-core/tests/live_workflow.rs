mod common;

use std::time::Duration;

use common::{HAPPY_FACE, OneShotServer};
use emotion_core::{
    CompletionOutcome, ControlState, DisplayList, HttpDetectionClient, LiveEmotionController,
    RasterSurface, ResultsPanel, ResultsPresenter, StillImageSource, UiState,
};
use emotion_utils::AppSettings;
use image::{Rgb, RgbImage};
use tempfile::tempdir;

fn still_source(dir: &std::path::Path) -> StillImageSource {
    let path = dir.join("frame.png");
    RgbImage::from_fn(320, 240, |x, y| Rgb([(x % 256) as u8, (y % 256) as u8, 128]))
        .save(&path)
        .expect("write frame");
    StillImageSource::new(path)
}

#[test]
fn capture_analyze_render_and_download() {
    let scratch = tempdir().expect("tempdir");
    let mut app = LiveEmotionController::new(still_source(scratch.path()), &AppSettings::default());
    assert_eq!(app.controls(), ControlState::for_active(false));

    app.start().expect("start");
    assert_eq!(app.state(), UiState::Active);
    assert_eq!(app.panel(), &ResultsPanel::Active);

    let server = OneShotServer::respond(200, HAPPY_FACE);
    let client = HttpDetectionClient::new(server.url.clone(), Duration::from_secs(5));
    let outcome = app.run_capture(&client).expect("capture");
    server.finish();
    assert_eq!(outcome, CompletionOutcome::Rendered(1));

    let mut list = DisplayList::new();
    app.paint_overlay(&mut list, (640.0, 480.0));
    let rects = list.stroked_rects();
    assert_eq!(rects.len(), 1);
    assert_eq!((rects[0].x, rects[0].width), (20.0, 100.0));
    assert_eq!(list.texts(), vec!["Face 1", "happy", "91.2%"]);

    let mut raster = RasterSurface::blank(320, 240);
    app.paint_overlay(&mut raster, (320.0, 240.0));
    assert_eq!(raster.image().get_pixel(10, 30)[1], 255);

    let text = ResultsPresenter.render(app.panel());
    assert!(text.contains("Live Photo Captured Successfully!"));

    let downloads = scratch.path().join("downloads");
    let saved = app.download_photo(&downloads).expect("download");
    let decoded = image::open(&saved).expect("saved photo is a JPEG");
    assert_eq!((decoded.width(), decoded.height()), (320, 240));

    app.stop();
    assert_eq!(app.panel(), &ResultsPanel::Stopped);
    assert!(app.overlay_faces().is_empty());
    assert!(app.last_photo().is_some());
}

#[test]
fn detection_failure_then_retry() {
    let scratch = tempdir().expect("tempdir");
    let mut app = LiveEmotionController::new(still_source(scratch.path()), &AppSettings::default());
    app.start().expect("start");

    let failing = OneShotServer::respond(503, "{}");
    let client = HttpDetectionClient::new(failing.url.clone(), Duration::from_secs(5));
    assert_eq!(app.run_capture(&client), Ok(CompletionOutcome::Failed));
    failing.finish();
    assert!(matches!(app.panel(), ResultsPanel::DetectionFailed { .. }));
    assert!(app.last_photo().is_none());

    let recovered = OneShotServer::respond(200, r#"{"success": true, "faces": []}"#);
    let client = HttpDetectionClient::new(recovered.url.clone(), Duration::from_secs(5));
    assert_eq!(app.run_capture(&client), Ok(CompletionOutcome::NoFaces));
    recovered.finish();
    assert_eq!(app.panel(), &ResultsPanel::NoFaces);
}
