//! Integration tests for the upload endpoint.

mod common;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use common::{
    armored_payload, multipart_body, multipart_request, stored_name_from, TestServer, PGP_MARKER,
};

#[tokio::test]
async fn armored_upload_is_stored_verbatim() {
    let server = TestServer::new();
    let payload = armored_payload(50);

    let (status, message) = server.upload("secret.txt.gpg", &payload).await;

    assert_eq!(status, StatusCode::OK, "{message}");
    assert!(message.starts_with("File uploaded successfully."));
    assert!(message.contains("http://drop.test/uploads/"));

    let name = stored_name_from(&message);
    assert_eq!(name.len(), 16 + ".gpg".len());
    assert!(name.ends_with(".gpg"));
    assert!(name[..16].chars().all(|c| c.is_ascii_alphanumeric()));

    assert_eq!(server.stored_files(), vec![name.clone()]);
    let stored = std::fs::read(server.storage_root.join(&name)).unwrap();
    assert_eq!(stored.len(), 50);
    assert_eq!(stored, payload);
}

#[tokio::test]
async fn plain_text_upload_is_rejected() {
    let server = TestServer::new();
    let payload = vec![b'p'; 50];

    let (status, message) = server.upload("notes.txt", &payload).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(message.contains("not PGP encrypted"));
    assert!(server.stored_files().is_empty());
}

#[tokio::test]
async fn content_shorter_than_marker_is_rejected() {
    let server = TestServer::new();

    let (status, message) = server.upload("tiny.gpg", &PGP_MARKER[..10]).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(message.contains("not PGP encrypted"));
    assert!(server.stored_files().is_empty());
}

#[tokio::test]
async fn empty_file_is_rejected() {
    let server = TestServer::new();

    let (status, _) = server.upload("empty.gpg", b"").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(server.stored_files().is_empty());
}

#[tokio::test]
async fn extension_is_lowercased_and_base_discarded() {
    let server = TestServer::new();

    let (status, message) = server
        .upload("../../Quarterly Report.ASC", &armored_payload(80))
        .await;

    assert_eq!(status, StatusCode::OK, "{message}");
    let name = stored_name_from(&message);
    assert!(name.ends_with(".asc"));
    assert!(!name.contains("Report"));
    assert_eq!(server.stored_files(), vec![name]);
}

#[tokio::test]
async fn upload_without_extension_gets_bare_name() {
    let server = TestServer::new();

    let (status, message) = server.upload("message", &armored_payload(64)).await;

    assert_eq!(status, StatusCode::OK, "{message}");
    assert_eq!(stored_name_from(&message).len(), 16);
}

#[tokio::test]
async fn file_over_ceiling_is_rejected_while_streaming() {
    let server = TestServer::with_config(|config| config.storage.max_upload_mb = 1);
    let payload = armored_payload(1024 * 1024 + 100);

    let (status, _) = server.upload("big.gpg", &payload).await;

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert!(server.stored_files().is_empty());
}

#[tokio::test]
async fn body_over_limit_is_rejected_before_handler() {
    let server = TestServer::with_config(|config| config.storage.max_upload_mb = 1);
    let payload = armored_payload(2 * 1024 * 1024);

    let (status, _) = server.upload("huge.gpg", &payload).await;

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert!(server.stored_files().is_empty());
}

#[tokio::test]
async fn file_at_ceiling_is_accepted() {
    let server = TestServer::with_config(|config| config.storage.max_upload_mb = 1);
    let payload = armored_payload(1024 * 1024);

    let (status, message) = server.upload("exact.gpg", &payload).await;

    assert_eq!(status, StatusCode::OK, "{message}");
    let name = stored_name_from(&message);
    let stored = std::fs::metadata(server.storage_root.join(name)).unwrap();
    assert_eq!(stored.len(), 1024 * 1024);
}

#[tokio::test]
async fn missing_file_field_is_bad_request() {
    let server = TestServer::new();
    let body = multipart_body("attachment", Some("a.gpg"), &armored_payload(40));

    let (status, _, body) = server.send(multipart_request(body)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(String::from_utf8_lossy(&body).contains("no `file` field"));
    assert!(server.stored_files().is_empty());
}

#[tokio::test]
async fn non_multipart_body_is_bad_request() {
    let server = TestServer::new();
    let request = Request::builder()
        .method("POST")
        .uri("/upload")
        .header(header::CONTENT_TYPE, "text/plain")
        .body(Body::from(armored_payload(40)))
        .unwrap();

    let (status, _, _) = server.send(request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(server.stored_files().is_empty());
}

#[tokio::test]
async fn wrong_method_is_not_allowed() {
    let server = TestServer::new();

    for method in ["GET", "PUT", "DELETE"] {
        let request = Request::builder()
            .method(method)
            .uri("/upload")
            .body(Body::empty())
            .unwrap();
        let (status, _, body) = server.send(request).await;

        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED, "{method}");
        assert!(String::from_utf8_lossy(&body).contains("Use POST"));
    }
}

#[tokio::test]
async fn successive_uploads_get_distinct_names() {
    let server = TestServer::new();
    let payload = armored_payload(60);

    let (_, first) = server.upload("a.gpg", &payload).await;
    let (_, second) = server.upload("a.gpg", &payload).await;

    assert_ne!(stored_name_from(&first), stored_name_from(&second));
    assert_eq!(server.stored_files().len(), 2);
}

#[tokio::test]
async fn confirmation_falls_back_to_listen_address_without_host() {
    let server = TestServer::new();
    let body = multipart_body("file", Some("a.gpg"), &armored_payload(40));
    let request = Request::builder()
        .method("POST")
        .uri("/upload")
        .header(
            header::CONTENT_TYPE,
            "multipart/form-data; boundary=pgpdropTestBoundary7MA4YWxkTrZu0gW",
        )
        .body(Body::from(body))
        .unwrap();

    let (status, _, body) = server.send(request).await;

    assert_eq!(status, StatusCode::OK);
    assert!(String::from_utf8_lossy(&body).contains("http://0.0.0.0:8080/uploads/"));
}
