//! Still-frame capture from an active stream.

use chrono::Local;
use emotion_utils::{DEFAULT_JPEG_QUALITY, Stage, encode_jpeg, timing_guard};
use log::{Level, debug};
use thiserror::Error;

use crate::{
    photo::CapturedPhoto,
    stream::{CameraDevice, CameraSource, StreamController},
};

/// Why a capture could not produce a photo.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CaptureError {
    /// The session is inactive or has not decoded its first frame yet.
    #[error("the camera is not ready; start the webcam and wait for the video to load")]
    NotReady,
    /// Another capture is still being analyzed.
    #[error("a capture is already being analyzed")]
    Busy,
    #[error("failed to read a frame from the camera: {0}")]
    Snapshot(String),
    #[error("failed to encode the captured frame: {0}")]
    Encode(String),
}

/// Produces compressed stills from the live stream.
///
/// Frames are taken at the device's native size, never at the size the
/// preview happens to be displayed at.
#[derive(Debug, Clone, Copy)]
pub struct FrameCapturer {
    jpeg_quality: u8,
}

impl Default for FrameCapturer {
    fn default() -> Self {
        Self::new(DEFAULT_JPEG_QUALITY)
    }
}

impl FrameCapturer {
    pub fn new(jpeg_quality: u8) -> Self {
        Self {
            jpeg_quality: jpeg_quality.clamp(1, 100),
        }
    }

    pub fn jpeg_quality(&self) -> u8 {
        self.jpeg_quality
    }

    /// Snapshot the current frame as an unanalyzed photo.
    pub fn capture<S: CameraSource>(
        &self,
        stream: &mut StreamController<S>,
    ) -> Result<CapturedPhoto, CaptureError> {
        let session = stream.session_mut().ok_or(CaptureError::NotReady)?;
        let device = session.device_mut();
        let (native_w, native_h) = device
            .native_resolution()
            .filter(|(w, h)| *w > 0 && *h > 0)
            .ok_or(CaptureError::NotReady)?;

        let frame = {
            let _guard = timing_guard(Stage::Snapshot, Level::Debug);
            device
                .snapshot()
                .map_err(|err| CaptureError::Snapshot(format!("{err:#}")))?
        };
        if frame.width() == 0 || frame.height() == 0 {
            return Err(CaptureError::NotReady);
        }
        if (frame.width(), frame.height()) != (native_w, native_h) {
            debug!(
                "Frame is {}x{} while the stream reported {}x{}",
                frame.width(),
                frame.height(),
                native_w,
                native_h
            );
        }

        let encoded = {
            let _guard = timing_guard(Stage::Encode, Level::Debug);
            encode_jpeg(&frame, self.jpeg_quality)
                .map_err(|err| CaptureError::Encode(format!("{err:#}")))?
        };

        Ok(CapturedPhoto {
            encoded,
            width: frame.width(),
            height: frame.height(),
            face_count: 0,
            suggested_filename: None,
            captured_at: Local::now(),
        })
    }
}
