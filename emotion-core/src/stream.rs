//! Camera session ownership and start/stop control.
//!
//! A [`StreamController`] holds at most one [`CaptureSession`]. The session
//! owns the device handle exclusively, so "active" and "device held" can
//! never disagree: both are `session.is_some()`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use emotion_utils::{Stage, WebcamCapture, config::CameraSettings, timing_guard};
use image::DynamicImage;
use log::{Level, info, warn};
use thiserror::Error;

/// Errors raised while acquiring the camera.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StreamError {
    /// Permission denied, device busy or no camera present.
    #[error("camera unavailable: {reason}")]
    DeviceUnavailable { reason: String },
}

/// An acquired camera stream.
pub trait CameraDevice {
    /// Native frame size, or `None` until the first frame has been decoded.
    fn native_resolution(&self) -> Option<(u32, u32)>;
    /// The current frame at native resolution.
    fn snapshot(&mut self) -> Result<DynamicImage>;
    /// Stop all tracks and release the hardware.
    fn release(&mut self) -> Result<()>;
}

/// Something that can hand out camera devices.
pub trait CameraSource {
    type Device: CameraDevice;

    fn acquire(&mut self, request: &CameraSettings) -> Result<Self::Device>;
}

/// Enabled flags for the start, stop and capture controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlState {
    pub start: bool,
    pub stop: bool,
    pub capture: bool,
}

impl ControlState {
    /// Control enablement as a pure function of the activity flag.
    pub const fn for_active(active: bool) -> Self {
        Self {
            start: !active,
            stop: active,
            capture: active,
        }
    }
}

/// One active camera acquisition.
pub struct CaptureSession<D> {
    id: u64,
    device: D,
}

impl<D: CameraDevice> CaptureSession<D> {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }
}

/// Starts and stops camera sessions on behalf of the UI.
pub struct StreamController<S: CameraSource> {
    source: S,
    request: CameraSettings,
    session: Option<CaptureSession<S::Device>>,
    sessions_started: u64,
}

impl<S: CameraSource> StreamController<S> {
    pub fn new(source: S, request: CameraSettings) -> Self {
        Self {
            source,
            request,
            session: None,
            sessions_started: 0,
        }
    }

    /// Acquire the camera. A failure leaves the controller inactive.
    pub fn start(&mut self) -> Result<(), StreamError> {
        if self.session.is_some() {
            return Ok(());
        }

        let _guard = timing_guard(Stage::Acquire, Level::Debug);
        let device = self.source.acquire(&self.request).map_err(|err| {
            warn!("Camera acquisition failed: {err:#}");
            StreamError::DeviceUnavailable {
                reason: format!("{err:#}"),
            }
        })?;

        self.sessions_started += 1;
        let id = self.sessions_started;
        match device.native_resolution() {
            Some((w, h)) => info!("Capture session {id} started at {w}x{h}"),
            None => info!("Capture session {id} started; waiting for first frame"),
        }
        self.session = Some(CaptureSession { id, device });
        Ok(())
    }

    /// Release the camera. Does nothing when already inactive.
    pub fn stop(&mut self) {
        if let Some(mut session) = self.session.take() {
            if let Err(err) = session.device.release() {
                warn!("Failed to release camera for session {}: {err:#}", session.id);
            }
            info!("Capture session {} stopped", session.id);
        }
    }

    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    pub fn controls(&self) -> ControlState {
        ControlState::for_active(self.is_active())
    }

    pub fn session(&self) -> Option<&CaptureSession<S::Device>> {
        self.session.as_ref()
    }

    pub fn session_mut(&mut self) -> Option<&mut CaptureSession<S::Device>> {
        self.session.as_mut()
    }

    /// Id of the running session, if any.
    pub fn session_id(&self) -> Option<u64> {
        self.session.as_ref().map(CaptureSession::id)
    }

    pub fn native_resolution(&self) -> Option<(u32, u32)> {
        self.session
            .as_ref()
            .and_then(|s| s.device.native_resolution())
    }

    pub fn request(&self) -> &CameraSettings {
        &self.request
    }

    pub fn source(&self) -> &S {
        &self.source
    }
}

impl<S: CameraSource> Drop for StreamController<S> {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Hardware webcam source.
#[derive(Debug, Default, Clone, Copy)]
pub struct WebcamSource;

impl CameraSource for WebcamSource {
    type Device = WebcamCapture;

    fn acquire(&mut self, request: &CameraSettings) -> Result<WebcamCapture> {
        WebcamCapture::open(request)
    }
}

impl CameraDevice for WebcamCapture {
    fn native_resolution(&self) -> Option<(u32, u32)> {
        Some(self.resolution()).filter(|(w, h)| *w > 0 && *h > 0)
    }

    fn snapshot(&mut self) -> Result<DynamicImage> {
        self.capture_frame()
    }

    fn release(&mut self) -> Result<()> {
        self.stop()
    }
}

/// Serves a still image file as if it were a camera.
#[derive(Debug, Clone)]
pub struct StillImageSource {
    path: PathBuf,
}

impl StillImageSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CameraSource for StillImageSource {
    type Device = StillImage;

    fn acquire(&mut self, _request: &CameraSettings) -> Result<StillImage> {
        let image = image::open(&self.path)
            .with_context(|| format!("failed to open still image {}", self.path.display()))?;
        Ok(StillImage::new(image))
    }
}

/// A fixed frame standing in for a live stream.
#[derive(Debug, Clone)]
pub struct StillImage {
    image: Option<DynamicImage>,
}

impl StillImage {
    pub fn new(image: DynamicImage) -> Self {
        Self { image: Some(image) }
    }
}

impl CameraDevice for StillImage {
    fn native_resolution(&self) -> Option<(u32, u32)> {
        self.image
            .as_ref()
            .map(|img| (img.width(), img.height()))
            .filter(|(w, h)| *w > 0 && *h > 0)
    }

    fn snapshot(&mut self) -> Result<DynamicImage> {
        self.image
            .clone()
            .context("still image stream has been released")
    }

    fn release(&mut self) -> Result<()> {
        self.image = None;
        Ok(())
    }
}
