//! Live photo capture and emotion overlay primitives.
//!
//! This crate owns the camera session, snapshots frames, talks to the remote
//! emotion detection service and turns its answers into overlay drawings and
//! results panels.

/// Still-frame capture from an active stream.
pub mod capture;
/// Top-level workflow tying the camera, detection and presentation together.
pub mod controller;
/// Detection service wire format and HTTP client.
pub mod detection;
/// Face and emotion score types.
pub mod face;
/// Bounding box and label rendering onto 2D surfaces.
pub mod overlay;
/// Captured photos and download naming.
pub mod photo;
/// Results panel states and text presentation.
pub mod results;
/// Camera sources and session control.
pub mod stream;

pub use capture::{CaptureError, FrameCapturer};
pub use controller::{
    CaptureTicket, CompletionOutcome, LastPhotoSlot, LiveEmotionController, PendingCapture,
    UiState,
};
pub use detection::{
    DetectionClient, DetectionError, DetectionRequest, DetectionResponse, HttpDetectionClient,
    csrf_token_from_cookies, decode_response, decode_response_json,
};
pub use face::{BoundingBox, DetectedFace, dominant_label};
pub use overlay::{
    DisplayList, DrawCommand, LabelFont, OverlayRect, OverlayRenderer, OverlayStyle,
    OverlaySurface, Projection, RasterSurface, format_percent, load_font,
};
pub use photo::{CapturedPhoto, fallback_filename, photo_filename};
pub use results::{
    AnalysisSummary, FaceCard, PanelAction, ResultsPanel, ResultsPresenter, Tone, face_cards,
};
pub use stream::{
    CameraDevice, CameraSource, CaptureSession, ControlState, StillImage, StillImageSource,
    StreamController, StreamError, WebcamSource,
};

/// Returns the crate version for diagnostics.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
