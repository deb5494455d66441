//! Server test utilities.

use axum::body::{Body, Bytes};
use axum::http::{header, HeaderMap, Request, StatusCode};
use pgp_drop::{build_router, AppConfig, AppState};
use std::path::PathBuf;
use tempfile::TempDir;
use tower::ServiceExt;

pub const PGP_MARKER: &[u8] = b"-----BEGIN PGP MESSAGE-----";
const BOUNDARY: &str = "pgpdropTestBoundary7MA4YWxkTrZu0gW";

/// A router wired to a throwaway storage root.
/// Note: #[allow(dead_code)] because each test file compiles common/ separately.
#[allow(dead_code)]
pub struct TestServer {
    pub router: axum::Router,
    pub state: AppState,
    pub storage_root: PathBuf,
    pub static_dir: PathBuf,
    pub temp_dir: TempDir,
}

#[allow(dead_code)]
impl TestServer {
    pub fn new() -> Self {
        Self::with_config(|_| {})
    }

    /// Create a test server with custom config modifications.
    pub fn with_config<F>(modifier: F) -> Self
    where
        F: FnOnce(&mut AppConfig),
    {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
        let storage_root = temp_dir.path().join("storage");
        let static_dir = temp_dir.path().join("static");
        std::fs::create_dir_all(&static_dir).expect("Failed to create static directory");

        let mut config = AppConfig::default();
        config.storage.root = storage_root.clone();
        config.ui.static_dir = static_dir.clone();
        modifier(&mut config);

        let state = AppState::new(config).expect("Failed to build app state");
        let router = build_router(state.clone());

        Self {
            router,
            state,
            storage_root,
            static_dir,
            temp_dir,
        }
    }

    /// Send a request and collect the full response.
    pub async fn send(&self, request: Request<Body>) -> (StatusCode, HeaderMap, Bytes) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, headers, body)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, HeaderMap, Bytes) {
        let request = Request::builder()
            .method("GET")
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        self.send(request).await
    }

    /// POST `content` as the `file` field of a multipart form.
    pub async fn upload(&self, filename: &str, content: &[u8]) -> (StatusCode, String) {
        let body = multipart_body("file", Some(filename), content);
        let (status, _, body) = self.send(multipart_request(body)).await;
        (status, String::from_utf8_lossy(&body).into_owned())
    }

    /// Names currently present under the storage root.
    pub fn stored_files(&self) -> Vec<String> {
        let mut names: Vec<String> = match std::fs::read_dir(&self.storage_root) {
            Ok(entries) => entries
                .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
                .collect(),
            Err(_) => Vec::new(),
        };
        names.sort();
        names
    }
}

/// Armored-looking payload of exactly `len` bytes.
#[allow(dead_code)]
pub fn armored_payload(len: usize) -> Vec<u8> {
    let mut content = PGP_MARKER.to_vec();
    content.push(b'\n');
    while content.len() < len {
        content.push(b'A' + (content.len() % 26) as u8);
    }
    content.truncate(len);
    content
}

/// Encode a single-field multipart/form-data body.
#[allow(dead_code)]
pub fn multipart_body(field: &str, filename: Option<&str>, content: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
    match filename {
        Some(name) => body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{field}\"; filename=\"{name}\"\r\n\
                 Content-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        ),
        None => body.extend_from_slice(
            format!("Content-Disposition: form-data; name=\"{field}\"\r\n\r\n").as_bytes(),
        ),
    }
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

#[allow(dead_code)]
pub fn multipart_request(body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/upload")
        .header(header::HOST, "drop.test")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .header(header::CONTENT_LENGTH, body.len())
        .body(Body::from(body))
        .unwrap()
}

/// Extract the stored name from an upload confirmation message.
#[allow(dead_code)]
pub fn stored_name_from(message: &str) -> String {
    message
        .trim()
        .rsplit('/')
        .next()
        .expect("confirmation should end with the stored name")
        .to_string()
}
