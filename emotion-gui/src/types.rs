//! Type definitions for the live emotion desktop app.

use std::{
    path::PathBuf,
    sync::{Arc, mpsc},
    time::Instant,
};

use egui::TextureHandle;
use emotion_core::{CaptureTicket, DetectedFace, DetectionClient, DetectionError, LiveEmotionController};
use emotion_utils::config::AppSettings;

use crate::core::feed::LiveFeedSource;

/// Messages sent from worker threads to the UI thread.
pub enum JobMessage {
    DetectionFinished {
        ticket: CaptureTicket,
        result: Result<Vec<DetectedFace>, DetectionError>,
    },
}

/// State of the live preview texture.
#[derive(Default)]
pub struct PreviewState {
    pub texture: Option<TextureHandle>,
    /// Native size of the frame the texture was built from.
    pub image_size: Option<(u32, u32)>,
    /// Feed frame counter the texture corresponds to.
    pub frame_seq: Option<u64>,
    /// The capture flash stays visible until this instant.
    pub flash_until: Option<Instant>,
}

impl PreviewState {
    pub fn reset(&mut self) {
        self.texture = None;
        self.image_size = None;
        self.frame_seq = None;
        self.flash_until = None;
    }
}

/// The main application state.
pub struct EmotionApp {
    pub settings: AppSettings,
    pub settings_path: PathBuf,
    pub controller: LiveEmotionController<LiveFeedSource>,
    pub client: Arc<dyn DetectionClient>,
    pub job_tx: mpsc::Sender<JobMessage>,
    pub job_rx: mpsc::Receiver<JobMessage>,
    pub preview: PreviewState,
    pub texture_seq: u64,
    pub status_line: String,
    pub last_error: Option<String>,
    /// Where "Download Photo" saves when no dialog is available.
    pub download_dir: PathBuf,
    pub egui_ctx: egui::Context,
}
