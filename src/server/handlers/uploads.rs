use std::future::Future;

use axum::extract::multipart::{Field, Multipart, MultipartError};
use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use tracing::{debug, error, info, warn};

use crate::{
    app_state::AppState,
    server::{
        constants::{BYTES_PER_MB, UPLOAD_FIELD_NAME},
        utils::{bad_request_response, public_base_url, server_error_response},
    },
    storage::{ChunkSource, UploadError},
};

impl ChunkSource for Field<'_> {
    fn next_chunk(&mut self) -> impl Future<Output = Result<Option<Bytes>, UploadError>> + Send {
        async move { self.chunk().await.map_err(UploadError::Multipart) }
    }
}

/// POST /upload — accept a single PGP-armored file from the `file` multipart field.
pub async fn upload_submit_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Response {
    loop {
        let mut field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(err) => {
                warn!(target: "upload", %err, "malformed multipart payload");
                return multipart_error_response(&err);
            }
        };

        if field.name() != Some(UPLOAD_FIELD_NAME) {
            debug!(
                target: "upload",
                field = field.name().unwrap_or(""),
                "discarding unexpected multipart field"
            );
            continue;
        }

        let declared_filename = field.file_name().map(str::to_owned);

        let stored = match state
            .store()
            .persist(declared_filename.as_deref(), &mut field)
            .await
        {
            Ok(stored) => stored,
            Err(err) => return upload_error_response(err),
        };

        info!(
            target: "upload",
            name = %stored.name,
            size_bytes = stored.size_bytes,
            "file uploaded successfully"
        );

        let fallback_host = format!(
            "{}:{}",
            state.config().server.bind_addr,
            state.config().server.port
        );
        let base_url = public_base_url(&headers, &fallback_host);

        return format!(
            "File uploaded successfully. Download at: {}/uploads/{}",
            base_url, stored.name
        )
        .into_response();
    }

    warn!(target: "upload", "multipart payload had no file field");
    bad_request_response(format!(
        "Error receiving file: no `{UPLOAD_FIELD_NAME}` field in upload"
    ))
}

/// Any method other than POST on /upload.
pub async fn method_not_allowed_handler() -> Response {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        "Method not allowed. Use POST.",
    )
        .into_response()
}

fn upload_error_response(err: UploadError) -> Response {
    match err {
        UploadError::NotArmored => {
            warn!(target: "upload", "rejected upload without PGP armor marker");
            bad_request_response("Upload rejected: file is not PGP encrypted")
        }
        UploadError::TooLarge { limit } => {
            warn!(target: "upload", limit, "rejected oversized upload");
            (
                StatusCode::PAYLOAD_TOO_LARGE,
                format!(
                    "Upload rejected: file exceeds the {} MB limit",
                    limit / BYTES_PER_MB
                ),
            )
                .into_response()
        }
        UploadError::Multipart(err) => {
            warn!(target: "upload", %err, "failed to read upload stream");
            multipart_error_response(&err)
        }
        UploadError::Io(err) => {
            error!(target: "upload", %err, "failed to persist uploaded file");
            server_error_response("Error saving file")
        }
    }
}

fn multipart_error_response(err: &MultipartError) -> Response {
    (
        err.status(),
        format!("Error receiving file: {}", err.body_text()),
    )
        .into_response()
}
