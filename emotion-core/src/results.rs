//! What the results panel shows after each state change.

use std::fmt::Write as _;

use chrono::{DateTime, Local};
use serde::Serialize;

use crate::{face::DetectedFace, overlay::format_percent};

/// Number of ranked emotions listed per face.
pub const TOP_EMOTIONS: usize = 3;

pub const NO_FACE_TIPS: [&str; 4] = [
    "Position your face clearly in the frame",
    "Ensure good lighting on your face",
    "Move closer to the camera",
    "Look directly at the camera",
];

pub const CAMERA_REMEDIES: [&str; 3] = [
    "Allow camera permissions",
    "Check if the camera is being used by another app",
    "Reconnect the camera and try again",
];

/// Visual weight of a panel state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Muted,
    Info,
    Success,
    Warning,
    Danger,
}

/// Buttons offered alongside a panel state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelAction {
    TakeAnother,
    Retry,
    Download,
    Clear,
}

impl PanelAction {
    pub fn label(self) -> &'static str {
        match self {
            PanelAction::TakeAnother => "Take Another Photo",
            PanelAction::Retry => "Retry",
            PanelAction::Download => "Download Photo",
            PanelAction::Clear => "Clear Results",
        }
    }
}

/// Per-face card in the success summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FaceCard {
    /// 1-based, matching the overlay label.
    pub number: usize,
    pub dominant_emotion: String,
    pub primary_emotion: String,
    pub primary_score: f32,
    /// Highest scores first, at most [`TOP_EMOTIONS`] entries.
    pub top_emotions: Vec<(String, f32)>,
    pub confidence: f32,
}

impl FaceCard {
    pub fn new(number: usize, face: &DetectedFace) -> Self {
        let top_emotions: Vec<(String, f32)> = face
            .top_emotions(TOP_EMOTIONS)
            .into_iter()
            .map(|(label, score)| (label.to_owned(), score))
            .collect();
        let (primary_emotion, primary_score) = top_emotions
            .first()
            .cloned()
            .unwrap_or_else(|| (face.dominant_emotion.clone(), face.dominant_score()));
        Self {
            number,
            dominant_emotion: face.dominant_emotion.clone(),
            primary_emotion,
            primary_score,
            top_emotions,
            confidence: face.confidence,
        }
    }
}

pub fn face_cards(faces: &[DetectedFace]) -> Vec<FaceCard> {
    faces
        .iter()
        .enumerate()
        .map(|(index, face)| FaceCard::new(index + 1, face))
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisSummary {
    pub captured_at: DateTime<Local>,
    pub cards: Vec<FaceCard>,
}

impl AnalysisSummary {
    pub fn new(faces: &[DetectedFace], captured_at: DateTime<Local>) -> Self {
        Self {
            captured_at,
            cards: face_cards(faces),
        }
    }

    pub fn face_count(&self) -> usize {
        self.cards.len()
    }

    pub fn headline(&self) -> String {
        format!(
            "Detected {} face(s) with emotion analysis",
            self.face_count()
        )
    }

    pub fn captured_label(&self) -> String {
        format!("Captured at: {}", self.captured_at.format("%Y-%m-%d %H:%M:%S"))
    }
}

/// Contents of the results panel. Each transition replaces it wholesale.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ResultsPanel {
    #[default]
    Prompt,
    Active,
    Stopped,
    Analyzing,
    Success(AnalysisSummary),
    NoFaces,
    DeviceUnavailable {
        reason: String,
    },
    DetectionFailed {
        message: String,
    },
    /// Results dismissed while the camera keeps running.
    Cleared,
}

impl ResultsPanel {
    pub fn tone(&self) -> Tone {
        match self {
            ResultsPanel::Prompt | ResultsPanel::Stopped => Tone::Muted,
            ResultsPanel::Analyzing | ResultsPanel::Cleared => Tone::Info,
            ResultsPanel::Active | ResultsPanel::Success(_) => Tone::Success,
            ResultsPanel::NoFaces => Tone::Warning,
            ResultsPanel::DeviceUnavailable { .. } | ResultsPanel::DetectionFailed { .. } => {
                Tone::Danger
            }
        }
    }

    pub fn title(&self) -> Option<&'static str> {
        match self {
            ResultsPanel::Active => Some("Webcam Active!"),
            ResultsPanel::Success(_) => Some("Live Photo Captured Successfully!"),
            ResultsPanel::NoFaces => Some("No Faces Detected"),
            ResultsPanel::DeviceUnavailable { .. } => Some("Cannot access webcam"),
            ResultsPanel::DetectionFailed { .. } => Some("Detection Error"),
            _ => None,
        }
    }

    /// Main body text.
    pub fn message(&self) -> String {
        match self {
            ResultsPanel::Prompt => {
                "Click \"Start Webcam\" to begin taking live photos for emotion detection.".into()
            }
            ResultsPanel::Active => "Position your face in the frame and click \"Take Live Photo\" \
                 to capture and analyze emotions."
                .into(),
            ResultsPanel::Stopped => {
                "Webcam stopped. Click \"Start Webcam\" to begin taking live photos.".into()
            }
            ResultsPanel::Analyzing => "Capturing live photo and analyzing emotions...".into(),
            ResultsPanel::Success(summary) => summary.headline(),
            ResultsPanel::NoFaces => {
                "Could not detect any faces in the captured photo. Please:".into()
            }
            ResultsPanel::DeviceUnavailable { reason } => format!("{reason}. Please:"),
            ResultsPanel::DetectionFailed { message } => format!(
                "Failed to analyze the captured photo ({message}). \
                 Please check your connection and try again."
            ),
            ResultsPanel::Cleared => {
                "Webcam ready! Click \"Take Live Photo\" to capture and analyze emotions.".into()
            }
        }
    }

    /// Bulleted guidance shown under the message.
    pub fn tips(&self) -> &'static [&'static str] {
        match self {
            ResultsPanel::NoFaces => &NO_FACE_TIPS,
            ResultsPanel::DeviceUnavailable { .. } => &CAMERA_REMEDIES,
            _ => &[],
        }
    }

    pub fn actions(&self) -> &'static [PanelAction] {
        match self {
            ResultsPanel::Success(_) => &[
                PanelAction::TakeAnother,
                PanelAction::Download,
                PanelAction::Clear,
            ],
            ResultsPanel::NoFaces => &[PanelAction::TakeAnother],
            ResultsPanel::DetectionFailed { .. } => &[PanelAction::Retry],
            _ => &[],
        }
    }

    pub fn is_busy(&self) -> bool {
        matches!(self, ResultsPanel::Analyzing)
    }
}

/// Plain-text rendering of the results panel.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResultsPresenter;

impl ResultsPresenter {
    pub fn render(&self, panel: &ResultsPanel) -> String {
        let mut out = String::new();
        if let Some(title) = panel.title() {
            let _ = writeln!(out, "{title}");
        }
        let _ = writeln!(out, "{}", panel.message());
        for tip in panel.tips() {
            let _ = writeln!(out, "  - {tip}");
        }

        if let ResultsPanel::Success(summary) = panel {
            let _ = writeln!(out, "{}", summary.captured_label());
            for card in &summary.cards {
                self.render_card(&mut out, card);
            }
        }

        let actions: Vec<&str> = panel.actions().iter().map(|a| a.label()).collect();
        if !actions.is_empty() {
            let _ = writeln!(out, "[{}]", actions.join("] ["));
        }
        out
    }

    fn render_card(&self, out: &mut String, card: &FaceCard) {
        let _ = writeln!(out);
        let _ = writeln!(out, "Face {} Analysis ({})", card.number, card.dominant_emotion);
        let _ = writeln!(
            out,
            "  Primary emotion: {} ({} confidence)",
            card.primary_emotion,
            format_percent(card.primary_score)
        );
        for (rank, (label, score)) in card.top_emotions.iter().enumerate() {
            let _ = writeln!(out, "  {}. {label}: {}", rank + 1, format_percent(*score));
        }
        let _ = writeln!(
            out,
            "  Overall confidence score: {}",
            format_percent(card.confidence)
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::face::BoundingBox;

    fn face(scores: &[(&str, f32)], dominant: &str, confidence: f32) -> DetectedFace {
        DetectedFace {
            bbox: BoundingBox::new(0.0, 0.0, 10.0, 10.0),
            emotion_scores: scores.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
            dominant_emotion: dominant.into(),
            confidence,
        }
    }

    #[test]
    fn cards_list_top_three_emotions() {
        let faces = [
            face(
                &[("angry", 1.0), ("happy", 70.0), ("neutral", 20.0), ("sad", 9.0)],
                "happy",
                70.0,
            ),
            face(&[("surprise", 55.5)], "surprise", 55.5),
        ];
        let cards = face_cards(&faces);
        assert_eq!(cards[0].number, 1);
        assert_eq!(
            cards[0].top_emotions,
            vec![
                ("happy".to_string(), 70.0),
                ("neutral".to_string(), 20.0),
                ("sad".to_string(), 9.0)
            ]
        );
        assert_eq!(cards[1].number, 2);
        assert_eq!(cards[1].top_emotions.len(), 1);
        assert_eq!(cards[1].primary_emotion, "surprise");
    }

    #[test]
    fn no_faces_offers_guidance_and_retry() {
        let panel = ResultsPanel::NoFaces;
        assert_eq!(panel.tips().len(), 4);
        assert_eq!(panel.actions(), &[PanelAction::TakeAnother]);
        assert_eq!(panel.tone(), Tone::Warning);

        let text = ResultsPresenter.render(&panel);
        assert!(text.contains("No Faces Detected"));
        assert!(text.contains("Move closer to the camera"));
        assert!(text.contains("[Take Another Photo]"));
    }

    #[test]
    fn success_text_has_summary_and_cards() {
        let summary = AnalysisSummary::new(
            &[face(&[("happy", 91.2), ("neutral", 5.1)], "happy", 91.2)],
            Local::now(),
        );
        let text = ResultsPresenter.render(&ResultsPanel::Success(summary));
        assert!(text.contains("Detected 1 face(s)"));
        assert!(text.contains("Face 1 Analysis (happy)"));
        assert!(text.contains("2. neutral: 5.1%"));
        assert!(text.contains("Overall confidence score: 91.2%"));
        assert!(text.contains("[Take Another Photo] [Download Photo] [Clear Results]"));
    }

    #[test]
    fn detection_failure_offers_retry() {
        let panel = ResultsPanel::DetectionFailed {
            message: "timed out".into(),
        };
        assert_eq!(panel.actions(), &[PanelAction::Retry]);
        assert!(panel.message().contains("timed out"));
        assert!(!ResultsPanel::Prompt.is_busy());
        assert!(ResultsPanel::Analyzing.is_busy());
    }
}
