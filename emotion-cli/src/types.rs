//! Serializable session report.

use std::collections::BTreeMap;

use emotion_core::{CompletionOutcome, DetectedFace};
use serde::Serialize;

/// One detected face as written to the report.
#[derive(Debug, Serialize)]
pub struct FaceRecord {
    pub face: usize,
    /// `[x, y, width, height]` in photo pixels.
    pub bbox: [f32; 4],
    pub dominant_emotion: String,
    pub confidence: f32,
    pub emotions: BTreeMap<String, f32>,
}

impl FaceRecord {
    pub fn new(number: usize, face: &DetectedFace) -> Self {
        Self {
            face: number,
            bbox: [face.bbox.x, face.bbox.y, face.bbox.width, face.bbox.height],
            dominant_emotion: face.dominant_emotion.clone(),
            confidence: face.confidence,
            emotions: face.emotion_scores.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ShotStatus {
    Analyzed,
    NoFaces,
    Failed,
}

impl From<CompletionOutcome> for ShotStatus {
    fn from(outcome: CompletionOutcome) -> Self {
        match outcome {
            CompletionOutcome::Rendered(_) => ShotStatus::Analyzed,
            CompletionOutcome::NoFaces => ShotStatus::NoFaces,
            CompletionOutcome::Failed | CompletionOutcome::Stale => ShotStatus::Failed,
        }
    }
}

/// Result of a single photo.
#[derive(Debug, Serialize)]
pub struct ShotReport {
    pub shot: u32,
    pub status: ShotStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    pub faces: Vec<FaceRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annotated: Option<String>,
}

impl ShotReport {
    pub fn failed(shot: u32, error: impl Into<String>) -> Self {
        Self {
            shot,
            status: ShotStatus::Failed,
            width: None,
            height: None,
            faces: Vec::new(),
            error: Some(error.into()),
            photo: None,
            annotated: None,
        }
    }
}
