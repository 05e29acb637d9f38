//! Loop-back HTTP responder standing in for the detection service.
#![allow(dead_code)]

use std::{
    io::{BufRead, BufReader, Read, Write},
    net::TcpListener,
    thread::{self, JoinHandle},
};

/// Request as received by [`OneShotServer`].
#[derive(Debug, Default)]
pub struct CapturedRequest {
    pub request_line: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl CapturedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).expect("request body is JSON")
    }

    /// MIME type and bytes of the posted `frame` data URI.
    pub fn frame_payload(&self) -> (String, Vec<u8>) {
        let body = self.json();
        let frame = body["frame"].as_str().expect("frame is a string");
        emotion_utils::decode_data_uri(frame).expect("frame is a data URI")
    }
}

/// Answers exactly one request with a canned response, then exits.
pub struct OneShotServer {
    pub url: String,
    handle: JoinHandle<CapturedRequest>,
}

impl OneShotServer {
    pub fn respond(status: u16, body: &str) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind loopback");
        let port = listener.local_addr().expect("local addr").port();
        let body = body.to_owned();

        let handle = thread::spawn(move || {
            let (stream, _) = listener.accept().expect("accept");
            let mut reader = BufReader::new(stream.try_clone().expect("clone stream"));

            let mut captured = CapturedRequest::default();
            reader
                .read_line(&mut captured.request_line)
                .expect("request line");
            let mut content_length = 0usize;
            loop {
                let mut line = String::new();
                reader.read_line(&mut line).expect("header line");
                let line = line.trim_end();
                if line.is_empty() {
                    break;
                }
                if let Some((key, value)) = line.split_once(':') {
                    let (key, value) = (key.trim().to_owned(), value.trim().to_owned());
                    if key.eq_ignore_ascii_case("content-length") {
                        content_length = value.parse().unwrap_or(0);
                    }
                    captured.headers.push((key, value));
                }
            }
            let mut body_bytes = vec![0u8; content_length];
            reader.read_exact(&mut body_bytes).expect("request body");
            captured.body = String::from_utf8_lossy(&body_bytes).into_owned();

            let reason = if status < 400 { "OK" } else { "Error" };
            let response = format!(
                "HTTP/1.1 {status} {reason}\r\nContent-Type: application/json\r\n\
                 Content-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            let mut stream = stream;
            stream
                .write_all(response.as_bytes())
                .expect("write response");
            stream.flush().ok();
            captured
        });

        Self {
            url: format!("http://127.0.0.1:{port}/process-frame/"),
            handle,
        }
    }

    /// Wait for the single request to be served.
    pub fn finish(self) -> CapturedRequest {
        self.handle.join().expect("responder thread")
    }
}

pub const HAPPY_FACE: &str = r#"{"success": true, "count": 1, "faces": [{
    "x": 10, "y": 10, "w": 50, "h": 50,
    "dominant_emotion": "happy", "confidence": 91.2,
    "emotions": {"happy": 91.2, "neutral": 5.1, "sad": 3.7}}]}"#;
