//! Webcam capture for live photos.

use anyhow::{Context, Result, anyhow};
use image::{DynamicImage, ImageBuffer, Rgb};
use log::{debug, info, warn};
use nokhwa::{
    Camera,
    pixel_format::RgbFormat,
    query,
    utils::{
        ApiBackend, CameraFormat, CameraIndex, FrameFormat, RequestedFormat, RequestedFormatType,
        Resolution,
    },
};

use crate::config::CameraSettings;

/// An open webcam stream.
///
/// The stream is started on construction and stopped on [`WebcamCapture::stop`]
/// or drop, whichever comes first.
pub struct WebcamCapture {
    camera: Camera,
    device_index: u32,
    resolution: (u32, u32),
    streaming: bool,
}

impl WebcamCapture {
    /// Opens the camera described by `settings`.
    ///
    /// The requested size is a target; the driver may choose the closest mode it
    /// supports, so callers must use [`WebcamCapture::resolution`] afterwards.
    pub fn open(settings: &CameraSettings) -> Result<Self> {
        let index = CameraIndex::Index(settings.device_index);
        let requested = RequestedFormat::new::<RgbFormat>(RequestedFormatType::Closest(
            CameraFormat::new(
                Resolution::new(settings.width, settings.height),
                FrameFormat::MJPEG,
                settings.fps,
            ),
        ));

        debug!(
            "Opening webcam device {} with requested resolution {}x{} @ {} fps",
            settings.device_index, settings.width, settings.height, settings.fps
        );

        let mut camera = Camera::new(index, requested)
            .with_context(|| format!("Failed to open webcam device {}", settings.device_index))?;

        camera
            .open_stream()
            .context("Failed to open webcam stream")?;

        let actual = camera.resolution();
        if actual.width() != settings.width || actual.height() != settings.height {
            warn!(
                "Webcam device {} could not honour {}x{}; streaming at {}x{}",
                settings.device_index,
                settings.width,
                settings.height,
                actual.width(),
                actual.height()
            );
        }
        info!(
            "Webcam device {} opened: {}x{} @ {} fps",
            settings.device_index,
            actual.width(),
            actual.height(),
            camera.frame_rate()
        );

        Ok(Self {
            camera,
            device_index: settings.device_index,
            resolution: (actual.width(), actual.height()),
            streaming: true,
        })
    }

    /// Captures and decodes a single frame at the stream's native size.
    pub fn capture_frame(&mut self) -> Result<DynamicImage> {
        let frame = self
            .camera
            .frame()
            .context("Failed to capture webcam frame")?;

        let decoded = frame
            .decode_image::<RgbFormat>()
            .context("Failed to decode webcam frame")?;
        let (width, height) = (decoded.width(), decoded.height());
        self.resolution = (width, height);

        let rgb_image: ImageBuffer<Rgb<u8>, Vec<u8>> =
            ImageBuffer::from_raw(width, height, decoded.into_raw())
                .ok_or_else(|| anyhow!("Failed to create image buffer from webcam data"))?;

        Ok(DynamicImage::ImageRgb8(rgb_image))
    }

    /// The resolution the device actually streams at.
    pub fn resolution(&self) -> (u32, u32) {
        self.resolution
    }

    pub fn device_index(&self) -> u32 {
        self.device_index
    }

    pub fn frame_rate(&self) -> u32 {
        self.camera.frame_rate()
    }

    /// Stops the stream and releases the device. Calling it again is a no-op.
    pub fn stop(&mut self) -> Result<()> {
        if !self.streaming {
            return Ok(());
        }
        self.streaming = false;
        self.camera
            .stop_stream()
            .context("Failed to stop webcam stream")?;
        info!("Webcam device {} stopped", self.device_index);
        Ok(())
    }
}

impl Drop for WebcamCapture {
    fn drop(&mut self) {
        if let Err(e) = self.stop() {
            warn!("Failed to stop webcam stream in drop: {}", e);
        }
    }
}

/// Lists available webcam devices as `(device_index, device_name)` pairs.
pub fn list_webcam_devices() -> Result<Vec<(u32, String)>> {
    let devices = query(ApiBackend::Auto).context("Failed to query webcam devices")?;

    let result = devices
        .iter()
        .enumerate()
        .map(|(idx, info)| (idx as u32, info.human_name().to_string()))
        .collect();

    Ok(result)
}
