//! Still photos taken from the live stream.

use chrono::{DateTime, Local, NaiveDateTime};
use emotion_utils::jpeg_data_uri;
use image::DynamicImage;

/// A JPEG snapshot of one live frame at the stream's native size.
#[derive(Debug, Clone, PartialEq)]
pub struct CapturedPhoto {
    /// Encoded JPEG bytes.
    pub encoded: Vec<u8>,
    pub width: u32,
    pub height: u32,
    /// Faces found by the last analysis; 0 until analyzed.
    pub face_count: usize,
    /// Download name, assigned once the photo has been analyzed.
    pub suggested_filename: Option<String>,
    pub captured_at: DateTime<Local>,
}

impl CapturedPhoto {
    pub fn native_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// `data:image/jpeg;base64,...` form used in detection requests.
    pub fn data_uri(&self) -> String {
        jpeg_data_uri(&self.encoded)
    }

    /// Decode the JPEG back into pixels.
    pub fn decode(&self) -> image::ImageResult<DynamicImage> {
        image::load_from_memory(&self.encoded)
    }

    /// Record the analysis result and derive the download name from it.
    pub fn mark_analyzed(&mut self, face_count: usize) {
        self.face_count = face_count;
        self.suggested_filename = Some(photo_filename(
            face_count,
            &self.captured_at.naive_local(),
        ));
    }

    /// Name to save under; unanalyzed photos fall back to a millisecond stamp.
    pub fn download_name(&self) -> String {
        self.suggested_filename
            .clone()
            .unwrap_or_else(|| fallback_filename(self.captured_at.timestamp_millis()))
    }
}

/// `live-emotion-photo-<N>faces-<YYYY-MM-DDTHH-MM-SS>.jpg`
pub fn photo_filename(face_count: usize, at: &NaiveDateTime) -> String {
    format!(
        "live-emotion-photo-{face_count}faces-{}.jpg",
        at.format("%Y-%m-%dT%H-%M-%S")
    )
}

pub fn fallback_filename(unix_millis: i64) -> String {
    format!("emotion-photo-{unix_millis}.jpg")
}
