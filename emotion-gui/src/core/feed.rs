//! Live camera feed pumped by a background thread.
//!
//! The webcam is opened and read on its own thread; the UI only ever sees
//! the most recent decoded frame. Until the first frame arrives the feed
//! reports no native resolution, which keeps captures from firing early.

use std::{
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, AtomicU64, Ordering},
        mpsc,
    },
    thread::{self, JoinHandle},
    time::Duration,
};

use anyhow::{Context, Result, anyhow};
use emotion_core::{CameraDevice, CameraSource};
use emotion_utils::{WebcamCapture, config::CameraSettings};
use image::DynamicImage;
use log::{info, warn};

const OPEN_TIMEOUT: Duration = Duration::from_secs(10);

/// Where frames come from.
#[derive(Clone)]
pub enum FeedBackend {
    Webcam,
    /// A fixed frame, served as if it were a camera that never changes.
    Still(Arc<DynamicImage>),
}

/// Camera source for the desktop app.
pub struct LiveFeedSource {
    backend: FeedBackend,
    repaint: Option<egui::Context>,
}

impl LiveFeedSource {
    pub fn webcam() -> Self {
        Self {
            backend: FeedBackend::Webcam,
            repaint: None,
        }
    }

    pub fn still(image: DynamicImage) -> Self {
        Self {
            backend: FeedBackend::Still(Arc::new(image)),
            repaint: None,
        }
    }

    /// Request a repaint of `ctx` whenever a new frame lands.
    pub fn with_repaint(mut self, ctx: egui::Context) -> Self {
        self.repaint = Some(ctx);
        self
    }
}

#[derive(Default)]
struct FeedShared {
    latest: Mutex<Option<Arc<DynamicImage>>>,
    frames: AtomicU64,
    stop: AtomicBool,
}

impl FeedShared {
    fn publish(&self, frame: DynamicImage) {
        if let Ok(mut slot) = self.latest.lock() {
            *slot = Some(Arc::new(frame));
        }
        self.frames.fetch_add(1, Ordering::Release);
    }

    fn latest(&self) -> Option<Arc<DynamicImage>> {
        self.latest.lock().ok().and_then(|slot| slot.clone())
    }
}

/// An acquired feed. Dropping it stops the camera thread.
pub struct LiveFeed {
    shared: Arc<FeedShared>,
    worker: Option<JoinHandle<()>>,
}

impl LiveFeed {
    pub fn latest_frame(&self) -> Option<Arc<DynamicImage>> {
        self.shared.latest()
    }

    /// Number of frames decoded so far; changes whenever a new frame lands.
    pub fn frames_received(&self) -> u64 {
        self.shared.frames.load(Ordering::Acquire)
    }
}

impl CameraDevice for LiveFeed {
    fn native_resolution(&self) -> Option<(u32, u32)> {
        self.latest_frame()
            .map(|frame| (frame.width(), frame.height()))
            .filter(|(w, h)| *w > 0 && *h > 0)
    }

    fn snapshot(&mut self) -> Result<DynamicImage> {
        self.latest_frame()
            .map(|frame| (*frame).clone())
            .context("no frame has been decoded yet")
    }

    fn release(&mut self) -> Result<()> {
        self.shared.stop.store(true, Ordering::Release);
        if let Some(worker) = self.worker.take() {
            worker
                .join()
                .map_err(|_| anyhow!("camera thread panicked"))?;
        }
        if let Ok(mut slot) = self.shared.latest.lock() {
            *slot = None;
        }
        Ok(())
    }
}

impl Drop for LiveFeed {
    fn drop(&mut self) {
        if self.worker.is_some()
            && let Err(err) = self.release()
        {
            warn!("Failed to stop camera thread: {err:#}");
        }
    }
}

impl CameraSource for LiveFeedSource {
    type Device = LiveFeed;

    fn acquire(&mut self, request: &CameraSettings) -> Result<LiveFeed> {
        let shared = Arc::new(FeedShared::default());
        match &self.backend {
            FeedBackend::Still(image) => {
                shared.publish((**image).clone());
                Ok(LiveFeed {
                    shared,
                    worker: None,
                })
            }
            FeedBackend::Webcam => {
                let (ready_tx, ready_rx) = mpsc::channel();
                let settings = *request;
                let thread_shared = shared.clone();
                let repaint = self.repaint.clone();
                let worker = thread::Builder::new()
                    .name("emotion-camera".into())
                    .spawn(move || pump_frames(settings, thread_shared, ready_tx, repaint))
                    .context("failed to spawn camera thread")?;

                match ready_rx.recv_timeout(OPEN_TIMEOUT) {
                    Ok(Ok((width, height))) => {
                        info!("Live feed running at {width}x{height}");
                        Ok(LiveFeed {
                            shared,
                            worker: Some(worker),
                        })
                    }
                    Ok(Err(reason)) => {
                        let _ = worker.join();
                        Err(anyhow!(reason))
                    }
                    Err(_) => {
                        shared.stop.store(true, Ordering::Release);
                        Err(anyhow!("timed out waiting for the camera to open"))
                    }
                }
            }
        }
    }
}

fn pump_frames(
    settings: CameraSettings,
    shared: Arc<FeedShared>,
    ready: mpsc::Sender<Result<(u32, u32), String>>,
    repaint: Option<egui::Context>,
) {
    let mut webcam = match WebcamCapture::open(&settings) {
        Ok(webcam) => webcam,
        Err(err) => {
            let _ = ready.send(Err(format!("{err:#}")));
            return;
        }
    };
    let _ = ready.send(Ok(webcam.resolution()));

    let retry_delay = Duration::from_millis(1000 / u64::from(settings.fps.max(1)));
    while !shared.stop.load(Ordering::Acquire) {
        match webcam.capture_frame() {
            Ok(frame) => {
                shared.publish(frame);
                if let Some(ctx) = &repaint {
                    ctx.request_repaint();
                }
            }
            Err(err) => {
                warn!("Dropped camera frame: {err:#}");
                thread::sleep(retry_delay);
            }
        }
    }

    if let Err(err) = webcam.stop() {
        warn!("Failed to stop webcam: {err:#}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn still_feed_reports_native_size_until_released() {
        let mut source = LiveFeedSource::still(DynamicImage::new_rgb8(32, 24));
        let mut feed = source
            .acquire(&CameraSettings::default())
            .expect("still feed");
        assert_eq!(feed.native_resolution(), Some((32, 24)));
        assert_eq!(feed.frames_received(), 1);
        assert!(feed.snapshot().is_ok());

        feed.release().expect("release");
        assert_eq!(feed.native_resolution(), None);
        assert!(feed.snapshot().is_err());
    }
}
