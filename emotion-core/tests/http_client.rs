mod common;

use std::time::Duration;

use chrono::Local;
use common::{HAPPY_FACE, OneShotServer};
use emotion_core::{CapturedPhoto, DetectionClient, DetectionError, HttpDetectionClient};
use emotion_utils::config::ServiceSettings;

fn sample_photo() -> CapturedPhoto {
    CapturedPhoto {
        encoded: vec![0xFF, 0xD8, 0xFF, 0xD9],
        width: 640,
        height: 480,
        face_count: 0,
        suggested_filename: None,
        captured_at: Local::now(),
    }
}

#[test]
fn posts_frame_with_csrf_token() {
    let server = OneShotServer::respond(200, HAPPY_FACE);
    let settings = ServiceSettings {
        endpoint: server.url.clone(),
        cookie_header: Some("sessionid=s1; csrftoken=tok%2B1".into()),
        ..ServiceSettings::default()
    };
    let client = HttpDetectionClient::from_settings(&settings);

    let faces = client.detect(&sample_photo()).expect("detection succeeds");
    assert_eq!(faces.len(), 1);
    assert_eq!(faces[0].dominant_emotion, "happy");

    let request = server.finish();
    assert!(request.request_line.starts_with("POST /process-frame/"));
    assert_eq!(request.header("x-csrftoken"), Some("tok+1"));
    assert!(
        request
            .header("content-type")
            .is_some_and(|v| v.starts_with("application/json"))
    );
    let body = request.json();
    assert_eq!(body["frame"], "data:image/jpeg;base64,/9j/2Q==");
    assert_eq!(
        request.frame_payload(),
        ("image/jpeg".to_string(), sample_photo().encoded)
    );
    assert!(body["timestamp"].as_str().is_some_and(|t| t.ends_with('Z')));
}

#[test]
fn no_token_means_no_csrf_header() {
    let server = OneShotServer::respond(200, r#"{"success": true, "faces": []}"#);
    let client = HttpDetectionClient::new(server.url.clone(), Duration::from_secs(5));
    assert_eq!(client.detect(&sample_photo()), Ok(vec![]));
    assert_eq!(server.finish().header("x-csrftoken"), None);
}

#[test]
fn server_errors_are_request_failures() {
    let server = OneShotServer::respond(500, r#"{"success": false}"#);
    let client = HttpDetectionClient::new(server.url.clone(), Duration::from_secs(5));
    let err = client.detect(&sample_photo()).expect_err("HTTP 500");
    assert!(matches!(err, DetectionError::Request(ref msg) if msg.contains("500")), "{err}");
    server.finish();
}

#[test]
fn garbage_body_is_malformed() {
    let server = OneShotServer::respond(200, "<html>oops</html>");
    let client = HttpDetectionClient::new(server.url.clone(), Duration::from_secs(5));
    assert!(matches!(
        client.detect(&sample_photo()),
        Err(DetectionError::Malformed(_))
    ));
    server.finish();
}

#[test]
fn unreachable_service_is_a_request_failure() {
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
        listener.local_addr().expect("addr").port()
    };
    let client = HttpDetectionClient::new(
        format!("http://127.0.0.1:{port}/process-frame/"),
        Duration::from_secs(2),
    );
    assert!(matches!(
        client.detect(&sample_photo()),
        Err(DetectionError::Request(_))
    ));
}
