//! Application lifecycle and user actions.

use std::{
    path::PathBuf,
    sync::{Arc, mpsc},
    time::{Duration, Instant},
};

use eframe::{App, CreationContext, Frame};
use egui::{ColorImage, Context, TextureHandle, TextureOptions};
use emotion_core::{
    CaptureError, CompletionOutcome, DetectionClient, HttpDetectionClient, LiveEmotionController,
    controller::NO_PHOTO_MESSAGE,
};
use emotion_utils::{config::AppSettings, configure_telemetry, default_settings_path, write_bytes};
use image::DynamicImage;
use log::{info, warn};

use crate::{
    core::{
        detection::spawn_detection,
        feed::LiveFeedSource,
        settings::{load_settings, persist_settings},
    },
    theme,
    types::{EmotionApp, JobMessage, PreviewState},
};

/// How long the capture flash stays over the preview.
pub const FLASH_DURATION: Duration = Duration::from_millis(150);

/// Upload `image` as a uniquely named texture.
pub fn load_texture_from_image(
    ctx: &Context,
    image: &DynamicImage,
    texture_seq: &mut u64,
) -> TextureHandle {
    let rgba = image.to_rgba8();
    let size = [rgba.width() as usize, rgba.height() as usize];
    let color_image = ColorImage::from_rgba_unmultiplied(size, rgba.as_raw());
    let texture_name = format!("emotion-live-frame-{texture_seq}");
    *texture_seq = texture_seq.wrapping_add(1);
    ctx.load_texture(texture_name, color_image, TextureOptions::LINEAR)
}

impl EmotionApp {
    pub fn new(cc: &CreationContext<'_>) -> Self {
        Self::create(&cc.egui_ctx, default_settings_path())
    }

    /// Builds the app around the webcam and the configured detection service.
    pub fn create(ctx: &Context, settings_path: PathBuf) -> Self {
        let settings = load_settings(&settings_path);
        if !settings_path.exists()
            && let Err(err) = persist_settings(&settings, &settings_path)
        {
            warn!("Could not write default settings: {err:#}");
        }
        configure_telemetry(settings.telemetry.enabled, settings.telemetry.level_filter());

        let client: Arc<dyn DetectionClient> =
            Arc::new(HttpDetectionClient::from_settings(&settings.service));
        info!("Sending photos to {}", settings.service.endpoint);
        let source = LiveFeedSource::webcam().with_repaint(ctx.clone());
        Self::with_parts(ctx, settings, settings_path, source, client)
    }

    pub fn with_parts(
        ctx: &Context,
        settings: AppSettings,
        settings_path: PathBuf,
        source: LiveFeedSource,
        client: Arc<dyn DetectionClient>,
    ) -> Self {
        theme::apply(ctx);
        let (job_tx, job_rx) = mpsc::channel();
        let controller = LiveEmotionController::new(source, &settings);
        let download_dir = settings.capture.download_dir.clone();

        Self {
            settings,
            settings_path,
            controller,
            client,
            job_tx,
            job_rx,
            preview: PreviewState::default(),
            texture_seq: 0,
            status_line: "Camera idle.".to_owned(),
            last_error: None,
            download_dir,
            egui_ctx: ctx.clone(),
        }
    }

    pub fn start_camera(&mut self) {
        self.last_error = None;
        match self.controller.start() {
            Ok(()) => {
                self.status_line = "Webcam running.".to_owned();
            }
            Err(err) => {
                self.status_line = "Camera unavailable.".to_owned();
                self.last_error = Some(err.to_string());
            }
        }
    }

    pub fn stop_camera(&mut self) {
        self.controller.stop();
        self.preview.reset();
        self.status_line = "Camera idle.".to_owned();
    }

    /// Snapshot the live frame and hand it to a detection worker.
    pub fn take_photo(&mut self) {
        match self.controller.begin_capture() {
            Ok(pending) => {
                self.last_error = None;
                self.preview.flash_until = Some(Instant::now() + FLASH_DURATION);
                self.status_line = "Analyzing photo...".to_owned();
                spawn_detection(
                    self.client.clone(),
                    pending,
                    self.job_tx.clone(),
                    self.egui_ctx.clone(),
                );
            }
            Err(CaptureError::NotReady | CaptureError::Busy) => {}
            Err(err) => {
                self.last_error = Some(err.to_string());
            }
        }
    }

    pub fn clear_results(&mut self) {
        self.controller.clear_results();
        self.last_error = None;
    }

    /// Ask where to save the last analyzed photo, then write it.
    pub fn download_photo(&mut self) {
        let Some(photo) = self.controller.last_photo() else {
            self.last_error = Some(NO_PHOTO_MESSAGE.to_owned());
            return;
        };

        let mut dialog = rfd::FileDialog::new()
            .set_file_name(photo.download_name())
            .add_filter("JPEG image", &["jpg", "jpeg"]);
        if self.download_dir.is_dir() {
            dialog = dialog.set_directory(&self.download_dir);
        }
        let Some(path) = dialog.save_file() else {
            return;
        };

        match write_bytes(&path, &photo.encoded) {
            Ok(()) => {
                info!("Saved photo to {}", path.display());
                self.status_line = format!("Saved {}", path.display());
                if let Some(parent) = path.parent() {
                    self.download_dir = parent.to_path_buf();
                }
            }
            Err(err) => self.last_error = Some(format!("{err:#}")),
        }
    }

    /// Save the last analyzed photo straight into the download directory.
    pub fn save_photo_to_download_dir(&mut self) -> Option<PathBuf> {
        match self.controller.download_photo(&self.download_dir) {
            Ok(path) => {
                self.status_line = format!("Saved {}", path.display());
                Some(path)
            }
            Err(err) => {
                self.last_error = Some(format!("{err:#}"));
                None
            }
        }
    }

    /// Drain finished detection jobs.
    pub fn poll_worker(&mut self) {
        while let Ok(message) = self.job_rx.try_recv() {
            match message {
                JobMessage::DetectionFinished { ticket, result } => {
                    let outcome = self.controller.complete_capture(ticket, result);
                    self.status_line = match outcome {
                        CompletionOutcome::Rendered(count) => format!("Found {count} face(s)."),
                        CompletionOutcome::NoFaces => "No faces found.".to_owned(),
                        CompletionOutcome::Failed => "Analysis failed.".to_owned(),
                        CompletionOutcome::Stale => continue,
                    };
                }
            }
        }
    }

    /// Upload the newest camera frame if it changed since the last paint.
    pub fn refresh_preview(&mut self, ctx: &Context) {
        let Some(feed) = self.controller.stream().session().map(|session| session.device()) else {
            return;
        };
        let seq = feed.frames_received();
        if self.preview.frame_seq == Some(seq) {
            return;
        }
        if let Some(frame) = feed.latest_frame() {
            self.preview.texture = Some(load_texture_from_image(ctx, &frame, &mut self.texture_seq));
            self.preview.image_size = Some((frame.width(), frame.height()));
            self.preview.frame_seq = Some(seq);
        }
    }

    pub fn flash_active(&self, now: Instant) -> bool {
        self.preview.flash_until.is_some_and(|until| now < until)
    }

    pub fn is_analyzing(&self) -> bool {
        self.controller.in_flight().is_some()
    }
}

impl App for EmotionApp {
    fn update(&mut self, ctx: &Context, _frame: &mut Frame) {
        self.poll_worker();
        self.refresh_preview(ctx);
        self.show_status_bar(ctx);
        self.show_results_panel(ctx);
        self.show_preview(ctx);

        if self.is_analyzing() || self.flash_active(Instant::now()) {
            ctx.request_repaint_after(Duration::from_millis(16));
        }
    }
}
