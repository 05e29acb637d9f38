//! Top-level live photo workflow.
//!
//! [`LiveEmotionController`] owns every piece of mutable state the front ends
//! need: the camera session, the faces currently shown on the overlay, the
//! results panel, and the single "last captured" photo slot. Detection runs
//! wherever the caller likes; results come back through
//! [`LiveEmotionController::complete_capture`] tagged with the ticket handed
//! out by [`LiveEmotionController::begin_capture`].

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::Result;
use emotion_utils::{AppSettings, save_into_dir};
use log::{error, info, warn};

use crate::{
    capture::{CaptureError, FrameCapturer},
    detection::{DetectionClient, DetectionError},
    face::DetectedFace,
    overlay::{OverlayRenderer, OverlayStyle, OverlaySurface},
    photo::CapturedPhoto,
    results::{AnalysisSummary, ResultsPanel},
    stream::{CameraSource, ControlState, StreamController, StreamError},
};

pub const NOT_READY_NOTICE: &str =
    "Please start the webcam first and wait for the video to load.";
pub const BUSY_NOTICE: &str = "Still analyzing the previous photo. Please wait.";
pub const NO_PHOTO_MESSAGE: &str = "No photo available to download. Capture a photo first.";

/// Coarse UI state. Analysis is a transient operation within `Active`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiState {
    Idle,
    Active,
}

/// Identifies one capture: the session it was taken in and its sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CaptureTicket {
    pub session_id: u64,
    pub sequence: u64,
}

/// A photo waiting for detection.
#[derive(Debug, Clone)]
pub struct PendingCapture {
    pub ticket: CaptureTicket,
    pub photo: Arc<CapturedPhoto>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionOutcome {
    /// Faces were drawn; carries the face count.
    Rendered(usize),
    NoFaces,
    Failed,
    /// The result belonged to a stopped session or a superseded capture.
    Stale,
}

/// Holds at most one analyzed photo; each store replaces the previous one.
#[derive(Debug, Clone, Default)]
pub struct LastPhotoSlot {
    photo: Option<CapturedPhoto>,
}

impl LastPhotoSlot {
    pub fn store(&mut self, photo: CapturedPhoto) {
        self.photo = Some(photo);
    }

    pub fn get(&self) -> Option<&CapturedPhoto> {
        self.photo.as_ref()
    }
}

pub struct LiveEmotionController<S: CameraSource> {
    stream: StreamController<S>,
    capturer: FrameCapturer,
    renderer: OverlayRenderer,
    panel: ResultsPanel,
    notice: Option<String>,
    overlay_faces: Vec<DetectedFace>,
    overlay_native: (u32, u32),
    in_flight: Option<PendingCapture>,
    captures_issued: u64,
    last_photo: LastPhotoSlot,
}

impl<S: CameraSource> LiveEmotionController<S> {
    pub fn new(source: S, settings: &AppSettings) -> Self {
        Self::with_parts(
            StreamController::new(source, settings.camera),
            FrameCapturer::new(settings.capture.jpeg_quality),
            OverlayRenderer::new(OverlayStyle::from(&settings.overlay)),
        )
    }

    pub fn with_parts(
        stream: StreamController<S>,
        capturer: FrameCapturer,
        renderer: OverlayRenderer,
    ) -> Self {
        Self {
            stream,
            capturer,
            renderer,
            panel: ResultsPanel::Prompt,
            notice: None,
            overlay_faces: Vec::new(),
            overlay_native: (0, 0),
            in_flight: None,
            captures_issued: 0,
            last_photo: LastPhotoSlot::default(),
        }
    }

    /// Acquire the camera. Failure keeps the controller idle and explains
    /// the problem in the results panel.
    pub fn start(&mut self) -> Result<(), StreamError> {
        if self.stream.is_active() {
            return Ok(());
        }
        match self.stream.start() {
            Ok(()) => {
                self.notice = None;
                self.panel = ResultsPanel::Active;
                Ok(())
            }
            Err(err) => {
                error!("Cannot access webcam: {err}");
                let StreamError::DeviceUnavailable { reason } = &err;
                self.panel = ResultsPanel::DeviceUnavailable {
                    reason: reason.clone(),
                };
                Err(err)
            }
        }
    }

    /// Release the camera, clear the overlay and drop any pending analysis.
    pub fn stop(&mut self) {
        if !self.stream.is_active() {
            return;
        }
        if let Some(pending) = self.in_flight.take() {
            warn!(
                "Stopping with capture {} still in flight; its result will be ignored",
                pending.ticket.sequence
            );
        }
        self.stream.stop();
        self.clear_overlay();
        self.notice = None;
        self.panel = ResultsPanel::Stopped;
    }

    pub fn is_active(&self) -> bool {
        self.stream.is_active()
    }

    pub fn state(&self) -> UiState {
        if self.is_active() {
            UiState::Active
        } else {
            UiState::Idle
        }
    }

    pub fn controls(&self) -> ControlState {
        self.stream.controls()
    }

    /// Snapshot a photo and reserve the single analysis slot for it.
    pub fn begin_capture(&mut self) -> Result<PendingCapture, CaptureError> {
        if let Some(pending) = &self.in_flight {
            warn!(
                "Capture rejected: capture {} is still being analyzed",
                pending.ticket.sequence
            );
            self.notice = Some(BUSY_NOTICE.to_owned());
            return Err(CaptureError::Busy);
        }

        let photo = match self.capturer.capture(&mut self.stream) {
            Ok(photo) => photo,
            Err(CaptureError::NotReady) => {
                warn!("Capture attempted before the stream was ready");
                self.notice = Some(NOT_READY_NOTICE.to_owned());
                return Err(CaptureError::NotReady);
            }
            Err(err) => {
                error!("Capture failed: {err}");
                self.panel = ResultsPanel::DetectionFailed {
                    message: err.to_string(),
                };
                return Err(err);
            }
        };

        let session_id = self.stream.session_id().ok_or(CaptureError::NotReady)?;
        self.captures_issued += 1;
        let pending = PendingCapture {
            ticket: CaptureTicket {
                session_id,
                sequence: self.captures_issued,
            },
            photo: Arc::new(photo),
        };
        info!(
            "Captured photo {} at {}x{}",
            pending.ticket.sequence, pending.photo.width, pending.photo.height
        );
        self.notice = None;
        self.panel = ResultsPanel::Analyzing;
        self.in_flight = Some(pending.clone());
        Ok(pending)
    }

    /// Apply a detection result for the capture identified by `ticket`.
    pub fn complete_capture(
        &mut self,
        ticket: CaptureTicket,
        result: Result<Vec<DetectedFace>, DetectionError>,
    ) -> CompletionOutcome {
        let current = self.in_flight.as_ref().map(|pending| pending.ticket);
        let same_session = self.stream.session_id() == Some(ticket.session_id);
        let pending = match self.in_flight.take() {
            Some(pending) if current == Some(ticket) && same_session => pending,
            other => {
                self.in_flight = other;
                warn!(
                    "Discarding stale detection result for capture {} (session {})",
                    ticket.sequence, ticket.session_id
                );
                return CompletionOutcome::Stale;
            }
        };

        match result {
            Ok(faces) if !faces.is_empty() => {
                let count = faces.len();
                let mut photo = (*pending.photo).clone();
                photo.mark_analyzed(count);
                info!(
                    "Capture {} analyzed: {count} face(s), saved as {}",
                    ticket.sequence,
                    photo.download_name()
                );
                self.panel = ResultsPanel::Success(AnalysisSummary::new(&faces, photo.captured_at));
                self.overlay_native = photo.native_size();
                self.overlay_faces = faces;
                self.last_photo.store(photo);
                CompletionOutcome::Rendered(count)
            }
            Ok(_) => {
                info!("Capture {} analyzed: no faces detected", ticket.sequence);
                self.clear_overlay();
                self.panel = ResultsPanel::NoFaces;
                CompletionOutcome::NoFaces
            }
            Err(err) => {
                error!("Emotion detection failed for capture {}: {err}", ticket.sequence);
                self.panel = ResultsPanel::DetectionFailed {
                    message: err.to_string(),
                };
                CompletionOutcome::Failed
            }
        }
    }

    /// Capture and analyze synchronously.
    pub fn run_capture(
        &mut self,
        client: &dyn DetectionClient,
    ) -> Result<CompletionOutcome, CaptureError> {
        let pending = self.begin_capture()?;
        let result = client.detect(&pending.photo);
        Ok(self.complete_capture(pending.ticket, result))
    }

    /// Dismiss the current results. The remembered photo stays downloadable.
    pub fn clear_results(&mut self) {
        self.clear_overlay();
        self.panel = if self.is_active() {
            ResultsPanel::Cleared
        } else {
            ResultsPanel::Prompt
        };
    }

    /// Redraw the overlay for a preview shown at `display` size.
    pub fn paint_overlay<T: OverlaySurface + ?Sized>(&self, surface: &mut T, display: (f32, f32)) {
        self.renderer
            .render(surface, &self.overlay_faces, self.overlay_native, display);
    }

    /// Write the remembered photo into `dir` under its suggested name.
    pub fn download_photo(&self, dir: &Path) -> Result<PathBuf> {
        let Some(photo) = self.last_photo.get() else {
            anyhow::bail!(NO_PHOTO_MESSAGE);
        };
        let path = save_into_dir(dir, &photo.download_name(), &photo.encoded)?;
        info!("Saved photo to {}", path.display());
        Ok(path)
    }

    fn clear_overlay(&mut self) {
        self.overlay_faces.clear();
        self.overlay_native = (0, 0);
    }

    pub fn overlay_faces(&self) -> &[DetectedFace] {
        &self.overlay_faces
    }

    pub fn panel(&self) -> &ResultsPanel {
        &self.panel
    }

    /// Transient warning, e.g. a capture attempted before the stream was ready.
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    pub fn in_flight(&self) -> Option<CaptureTicket> {
        self.in_flight.as_ref().map(|pending| pending.ticket)
    }

    pub fn last_photo(&self) -> Option<&CapturedPhoto> {
        self.last_photo.get()
    }

    pub fn stream(&self) -> &StreamController<S> {
        &self.stream
    }

    pub fn renderer(&self) -> &OverlayRenderer {
        &self.renderer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        face::BoundingBox,
        overlay::DisplayList,
        stream::{StillImage, StreamController},
    };
    use emotion_utils::config::CameraSettings;
    use image::{DynamicImage, ImageBuffer, Rgb};

    struct Frames {
        fail: bool,
    }

    impl CameraSource for Frames {
        type Device = StillImage;

        fn acquire(&mut self, _request: &CameraSettings) -> anyhow::Result<StillImage> {
            if self.fail {
                anyhow::bail!("device busy");
            }
            Ok(StillImage::new(DynamicImage::ImageRgb8(ImageBuffer::from_pixel(
                64,
                48,
                Rgb([120, 90, 60]),
            ))))
        }
    }

    fn controller(fail: bool) -> LiveEmotionController<Frames> {
        LiveEmotionController::with_parts(
            StreamController::new(Frames { fail }, CameraSettings::default()),
            FrameCapturer::default(),
            OverlayRenderer::default(),
        )
    }

    fn one_face() -> Vec<DetectedFace> {
        vec![DetectedFace {
            bbox: BoundingBox::new(4.0, 4.0, 20.0, 20.0),
            emotion_scores: [("happy".to_string(), 80.0)].into_iter().collect(),
            dominant_emotion: "happy".into(),
            confidence: 80.0,
        }]
    }

    #[test]
    fn failed_start_reports_device_problem() {
        let mut app = controller(true);
        assert!(app.start().is_err());
        assert_eq!(app.state(), UiState::Idle);
        assert!(matches!(
            app.panel(),
            ResultsPanel::DeviceUnavailable { reason } if reason.contains("device busy")
        ));
        assert_eq!(app.controls(), ControlState::for_active(false));
    }

    #[test]
    fn capture_while_idle_only_sets_a_notice() {
        let mut app = controller(false);
        assert_eq!(app.begin_capture().err(), Some(CaptureError::NotReady));
        assert_eq!(app.notice(), Some(NOT_READY_NOTICE));
        assert_eq!(app.panel(), &ResultsPanel::Prompt);
    }

    #[test]
    fn second_capture_is_rejected_while_in_flight() {
        let mut app = controller(false);
        app.start().expect("start");
        let first = app.begin_capture().expect("first capture");
        assert_eq!(app.panel(), &ResultsPanel::Analyzing);
        assert_eq!(app.begin_capture().err(), Some(CaptureError::Busy));

        assert_eq!(
            app.complete_capture(first.ticket, Ok(one_face())),
            CompletionOutcome::Rendered(1)
        );
        assert!(app.in_flight().is_none());
        assert!(app.begin_capture().is_ok());
    }

    #[test]
    fn results_after_stop_are_discarded() {
        let mut app = controller(false);
        app.start().expect("start");
        let pending = app.begin_capture().expect("capture");
        app.stop();
        app.start().expect("restart");

        assert_eq!(
            app.complete_capture(pending.ticket, Ok(one_face())),
            CompletionOutcome::Stale
        );
        assert!(app.overlay_faces().is_empty());
        assert!(app.last_photo().is_none());
        assert_eq!(app.panel(), &ResultsPanel::Active);
    }

    #[test]
    fn failed_detection_keeps_previous_overlay() {
        let mut app = controller(false);
        app.start().expect("start");
        let first = app.begin_capture().expect("capture");
        app.complete_capture(first.ticket, Ok(one_face()));

        let second = app.begin_capture().expect("capture");
        let outcome = app.complete_capture(
            second.ticket,
            Err(DetectionError::Request("connection refused".into())),
        );
        assert_eq!(outcome, CompletionOutcome::Failed);
        assert_eq!(app.overlay_faces().len(), 1);
        assert_eq!(app.last_photo().map(|p| p.face_count), Some(1));

        let mut list = DisplayList::new();
        app.paint_overlay(&mut list, (128.0, 96.0));
        assert_eq!(list.stroked_rects()[0].width, 40.0);
    }

    #[test]
    fn no_faces_clears_overlay_and_stop_resets_panel() {
        let mut app = controller(false);
        app.start().expect("start");
        let first = app.begin_capture().expect("capture");
        app.complete_capture(first.ticket, Ok(one_face()));
        let second = app.begin_capture().expect("capture");
        assert_eq!(
            app.complete_capture(second.ticket, Ok(vec![])),
            CompletionOutcome::NoFaces
        );
        assert!(app.overlay_faces().is_empty());
        assert_eq!(app.panel(), &ResultsPanel::NoFaces);

        app.stop();
        app.stop();
        assert_eq!(app.panel(), &ResultsPanel::Stopped);
        assert_eq!(app.state(), UiState::Idle);
    }

    #[test]
    fn clear_results_keeps_photo_for_download() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut app = controller(false);
        let err = app.download_photo(dir.path()).expect_err("nothing captured yet");
        assert_eq!(err.to_string(), NO_PHOTO_MESSAGE);

        app.start().expect("start");
        let pending = app.begin_capture().expect("capture");
        app.complete_capture(pending.ticket, Ok(one_face()));
        app.clear_results();
        assert_eq!(app.panel(), &ResultsPanel::Cleared);
        assert!(app.overlay_faces().is_empty());

        let saved = app.download_photo(dir.path()).expect("download");
        let name = saved.file_name().and_then(|n| n.to_str()).unwrap_or_default();
        assert!(name.starts_with("live-emotion-photo-1faces-"), "{name}");
        assert!(saved.exists());
    }
}
