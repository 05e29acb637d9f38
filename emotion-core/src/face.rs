//! Faces reported by the detection service.

use std::collections::BTreeMap;

/// Axis-aligned bounding box in image coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    /// The x-coordinate of the top-left corner.
    pub x: f32,
    /// The y-coordinate of the top-left corner.
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl BoundingBox {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Multiplies every coordinate and dimension by the per-axis factors.
    pub fn scaled(&self, scale_x: f32, scale_y: f32) -> Self {
        Self {
            x: self.x * scale_x,
            y: self.y * scale_y,
            width: self.width * scale_x,
            height: self.height * scale_y,
        }
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }
}

/// One face found in a single captured photo.
///
/// Scores are independent per-class percentages and need not sum to 100.
/// Instances are built by the response decoder, which guarantees a non-empty
/// score map and a dominant label carrying the maximum score.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectedFace {
    /// Box in the photo's native resolution.
    pub bbox: BoundingBox,
    pub emotion_scores: BTreeMap<String, f32>,
    pub dominant_emotion: String,
    /// Overall confidence percentage (0-100).
    pub confidence: f32,
}

impl DetectedFace {
    /// Score of the dominant emotion.
    pub fn dominant_score(&self) -> f32 {
        self.emotion_scores
            .get(&self.dominant_emotion)
            .copied()
            .unwrap_or(self.confidence)
    }

    /// Emotions ordered by descending score; equal scores keep label order.
    pub fn ranked_emotions(&self) -> Vec<(&str, f32)> {
        let mut ranked: Vec<(&str, f32)> = self
            .emotion_scores
            .iter()
            .map(|(label, score)| (label.as_str(), *score))
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked
    }

    pub fn top_emotions(&self, count: usize) -> Vec<(&str, f32)> {
        let mut ranked = self.ranked_emotions();
        ranked.truncate(count);
        ranked
    }
}

/// Label with the highest score. Ties go to the lexicographically first label.
pub fn dominant_label(scores: &BTreeMap<String, f32>) -> Option<&str> {
    scores
        .iter()
        .fold(None::<(&str, f32)>, |best, (label, score)| match best {
            Some((_, best_score)) if *score <= best_score => best,
            _ => Some((label.as_str(), *score)),
        })
        .map(|(label, _)| label)
}
