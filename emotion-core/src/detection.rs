//! Remote emotion detection.
//!
//! Photos are posted as JSON (`{frame, timestamp}`) and the service answers
//! with `{success, faces, count?, error?}`. Responses are validated here so
//! the rest of the crate only ever sees well-formed [`DetectedFace`]s.

use std::{collections::BTreeMap, time::Duration};

use chrono::{DateTime, SecondsFormat, Utc};
use emotion_utils::{Stage, config::ServiceSettings, timing_guard};
use log::{Level, debug, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use ureq::Agent;

use crate::{
    face::{BoundingBox, DetectedFace, dominant_label},
    photo::CapturedPhoto,
};

/// Why a detection round-trip produced no usable result.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DetectionError {
    /// Transport failure, timeout or a non-success HTTP status.
    #[error("detection request failed: {0}")]
    Request(String),
    #[error("malformed detection response: {0}")]
    Malformed(String),
    /// The service answered `success: false` with an explanation.
    #[error("detection service reported an error: {message}")]
    Rejected { message: String },
}

/// Sends photos to a detector and returns the faces it found.
pub trait DetectionClient: Send + Sync {
    fn detect(&self, photo: &CapturedPhoto) -> Result<Vec<DetectedFace>, DetectionError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectionRequest {
    /// `data:image/jpeg;base64,...`
    pub frame: String,
    /// RFC 3339 UTC timestamp with millisecond precision.
    pub timestamp: String,
}

impl DetectionRequest {
    pub fn for_photo(photo: &CapturedPhoto, sent_at: DateTime<Utc>) -> Self {
        Self {
            frame: photo.data_uri(),
            timestamp: sent_at.to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DetectionResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub faces: Vec<WireFace>,
    #[serde(default)]
    pub count: Option<usize>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireFace {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
    #[serde(default)]
    pub emotions: BTreeMap<String, f32>,
    #[serde(default)]
    pub dominant_emotion: Option<String>,
    #[serde(default)]
    pub confidence: Option<f32>,
}

/// Validate a response. An empty list means the service found no faces.
pub fn decode_response(response: DetectionResponse) -> Result<Vec<DetectedFace>, DetectionError> {
    if !response.success {
        return match response.error.as_deref().map(str::trim) {
            Some(message) if !message.is_empty() => Err(DetectionError::Rejected {
                message: message.to_owned(),
            }),
            _ => Ok(Vec::new()),
        };
    }

    if let Some(count) = response.count
        && count != response.faces.len()
    {
        debug!(
            "Service reported count {count} but returned {} face(s)",
            response.faces.len()
        );
    }

    response
        .faces
        .into_iter()
        .enumerate()
        .map(|(index, face)| validate_face(face).map_err(|reason| {
            DetectionError::Malformed(format!("face {}: {reason}", index + 1))
        }))
        .collect()
}

/// Parse and validate a raw JSON body.
pub fn decode_response_json(body: &str) -> Result<Vec<DetectedFace>, DetectionError> {
    let response: DetectionResponse =
        serde_json::from_str(body).map_err(|err| DetectionError::Malformed(err.to_string()))?;
    decode_response(response)
}

fn validate_face(face: WireFace) -> Result<DetectedFace, String> {
    let WireFace {
        x,
        y,
        w,
        h,
        emotions,
        dominant_emotion,
        confidence,
    } = face;

    if ![x, y, w, h].iter().all(|v| v.is_finite()) {
        return Err("bounding box has non-finite coordinates".into());
    }
    if w <= 0.0 || h <= 0.0 {
        return Err(format!("bounding box has non-positive size {w}x{h}"));
    }
    if emotions.is_empty() {
        return Err("no emotion scores".into());
    }
    if let Some((label, _)) = emotions.iter().find(|(_, score)| !score.is_finite()) {
        return Err(format!("score for '{label}' is not finite"));
    }

    let best = dominant_label(&emotions)
        .map(str::to_owned)
        .ok_or_else(|| "no emotion scores".to_owned())?;
    let best_score = emotions[&best];
    let (dominant_emotion, confidence) = match dominant_emotion {
        Some(label) if emotions.get(&label) == Some(&best_score) => (label, confidence),
        Some(label) => {
            warn!("Reported dominant emotion '{label}' is not the top score; using '{best}'");
            // The reported confidence belongs to the rejected label.
            (best, None)
        }
        None => (best, confidence),
    };

    let confidence = match confidence {
        Some(value) if value.is_finite() && (0.0..=100.0).contains(&value) => value,
        Some(value) => return Err(format!("confidence {value} is outside 0-100")),
        None => best_score,
    };

    Ok(DetectedFace {
        bbox: BoundingBox::new(x, y, w, h),
        emotion_scores: emotions,
        dominant_emotion,
        confidence,
    })
}

/// Value of `name` in a `Cookie` header style string, percent-decoded.
pub fn csrf_token_from_cookies(cookies: &str, name: &str) -> Option<String> {
    cookies.split(';').find_map(|pair| {
        let (key, value) = pair.trim().split_once('=')?;
        if key.trim() != name {
            return None;
        }
        let decoded = urlencoding::decode(value.trim()).ok()?;
        Some(decoded.into_owned())
    })
}

/// Blocking HTTP client for the detection endpoint.
pub struct HttpDetectionClient {
    agent: Agent,
    endpoint: String,
    csrf: Option<(String, String)>,
}

impl HttpDetectionClient {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Self {
        let agent = Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self {
            agent,
            endpoint: endpoint.into(),
            csrf: None,
        }
    }

    pub fn from_settings(settings: &ServiceSettings) -> Self {
        let client = Self::new(settings.endpoint.clone(), settings.timeout());
        let token = settings
            .cookie_header
            .as_deref()
            .and_then(|cookies| csrf_token_from_cookies(cookies, &settings.csrf_cookie_name));
        match token {
            Some(token) => client.with_csrf_token(settings.csrf_header.clone(), token),
            None => client,
        }
    }

    /// Attach an anti-forgery token to every request.
    pub fn with_csrf_token(mut self, header: impl Into<String>, token: impl Into<String>) -> Self {
        self.csrf = Some((header.into(), token.into()));
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl DetectionClient for HttpDetectionClient {
    fn detect(&self, photo: &CapturedPhoto) -> Result<Vec<DetectedFace>, DetectionError> {
        let _guard = timing_guard(Stage::Detect, Level::Debug);
        let body = DetectionRequest::for_photo(photo, Utc::now());

        let mut request = self
            .agent
            .post(self.endpoint.as_str())
            .header("Content-Type", "application/json");
        if let Some((header, token)) = &self.csrf {
            request = request.header(header.as_str(), token.as_str());
        }

        let mut response = request
            .send_json(&body)
            .map_err(|err| DetectionError::Request(err.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(DetectionError::Request(format!(
                "{} responded with HTTP {}",
                self.endpoint,
                status.as_u16()
            )));
        }

        let payload: DetectionResponse = response
            .body_mut()
            .read_json()
            .map_err(|err| DetectionError::Malformed(err.to_string()))?;
        decode_response(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_the_documented_example() {
        let faces = decode_response_json(
            r#"{"success": true, "count": 1, "faces": [{"x":10,"y":10,"w":50,"h":50,
                "dominant_emotion":"happy","confidence":91.2,
                "emotions":{"happy":91.2,"neutral":5.1,"sad":3.7}}]}"#,
        )
        .expect("valid response");
        assert_eq!(faces.len(), 1);
        assert_eq!(faces[0].bbox, BoundingBox::new(10.0, 10.0, 50.0, 50.0));
        assert_eq!(faces[0].dominant_emotion, "happy");
        assert_eq!(faces[0].confidence, 91.2);
    }

    #[test]
    fn unsuccessful_responses() {
        assert_eq!(
            decode_response_json(r#"{"success": false, "error": "No frame data"}"#),
            Err(DetectionError::Rejected {
                message: "No frame data".into()
            })
        );
        assert_eq!(decode_response_json(r#"{"success": false}"#), Ok(vec![]));
        assert_eq!(decode_response_json(r#"{"success": true, "faces": []}"#), Ok(vec![]));
    }

    #[test]
    fn wrong_dominant_label_is_recomputed() {
        let faces = decode_response_json(
            r#"{"success": true, "faces": [{"x":0,"y":0,"w":5,"h":5,
                "dominant_emotion":"sad",
                "emotions":{"surprise":40.0,"angry":40.0,"sad":2.0}}]}"#,
        )
        .expect("valid response");
        assert_eq!(faces[0].dominant_emotion, "angry");
        assert_eq!(faces[0].confidence, 40.0, "missing confidence uses the top score");
    }

    #[test]
    fn recomputed_label_takes_its_own_score_as_confidence() {
        let faces = decode_response_json(
            r#"{"success": true, "faces": [{"x":0,"y":0,"w":5,"h":5,
                "dominant_emotion":"sad","confidence":97.0,
                "emotions":{"happy":61.5,"sad":30.0}}]}"#,
        )
        .expect("valid response");
        assert_eq!(faces[0].dominant_emotion, "happy");
        assert_eq!(faces[0].confidence, 61.5);
    }

    #[test]
    fn malformed_faces_reject_the_whole_response() {
        for body in [
            r#"{"success": true, "faces": [{"x":0,"y":0,"w":0,"h":5,"emotions":{"happy":1}}]}"#,
            r#"{"success": true, "faces": [{"x":0,"y":0,"w":5,"h":5,"emotions":{}}]}"#,
            r#"{"success": true, "faces": [{"x":0,"y":0,"w":5,"h":5,"emotions":{"a":1},"confidence":250}]}"#,
            r#"{"success": true, "faces": [{"x":"left","y":0,"w":5,"h":5}]}"#,
            r#"{"success": true, "faces": [{"x":0,"y":0,"w":5,"h":5,"emotions":{"a":1e300}}]}"#,
            "not json",
        ] {
            assert!(
                matches!(decode_response_json(body), Err(DetectionError::Malformed(_))),
                "{body}"
            );
        }
    }

    #[test]
    fn csrf_token_lookup() {
        let cookies = "sessionid=abc; csrftoken=a%2Fb%3Dc ; theme=dark";
        assert_eq!(csrf_token_from_cookies(cookies, "csrftoken").as_deref(), Some("a/b=c"));
        assert_eq!(csrf_token_from_cookies(cookies, "missing"), None);
        assert_eq!(csrf_token_from_cookies("", "csrftoken"), None);
    }

    #[test]
    fn request_timestamp_is_utc_with_millis() {
        let sent_at = DateTime::parse_from_rfc3339("2024-03-09T12:30:00.250Z")
            .expect("timestamp")
            .with_timezone(&Utc);
        let photo = CapturedPhoto {
            encoded: vec![1, 2, 3],
            width: 2,
            height: 2,
            face_count: 0,
            suggested_filename: None,
            captured_at: chrono::Local::now(),
        };
        let request = DetectionRequest::for_photo(&photo, sent_at);
        assert_eq!(request.timestamp, "2024-03-09T12:30:00.250Z");
        assert_eq!(request.frame, "data:image/jpeg;base64,AQID");
    }
}
