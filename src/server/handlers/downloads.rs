use axum::{
    body::Body,
    extract::{Path as AxumPath, State},
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
};
use std::io::ErrorKind;
use tokio::fs;
use tokio_util::io::ReaderStream;
use tracing::{error, info, warn};

use crate::{
    app_state::AppState,
    server::{
        constants::RAW_SUFFIX,
        utils::{
            bad_request_response, build_attachment_disposition, file_not_found_response,
            server_error_response,
        },
    },
    storage::{PathError, StoredFile},
    templates::{DecryptTemplate, HtmlTemplate, LayoutContext},
};

/// GET /uploads/ with nothing after the prefix.
pub async fn missing_name_handler() -> Response {
    bad_request_response("No file specified")
}

/// GET /uploads/{name} and /uploads/{name}/raw.
pub async fn retrieval_handler(
    State(state): State<AppState>,
    AxumPath(requested): AxumPath<String>,
) -> Response {
    let (name, raw_mode) = match requested.strip_suffix(RAW_SUFFIX) {
        Some(stripped) => (stripped, true),
        None => (requested.as_str(), false),
    };

    let resolved = match state.store().resolve(name) {
        Ok(resolved) => resolved,
        Err(PathError::Empty) => return missing_name_handler().await,
        Err(err @ PathError::Escapes) => {
            warn!(target: "download", requested = %requested, %err, "rejected retrieval path");
            return bad_request_response("Invalid path");
        }
    };

    let Some(stored) = state.store().stat(&resolved).await else {
        return file_not_found_response();
    };

    if raw_mode {
        return serve_raw(stored).await;
    }

    let layout = LayoutContext::from_state(&state, "Decrypt");
    HtmlTemplate::new(DecryptTemplate::new(layout, resolved.relative)).into_response()
}

async fn serve_raw(stored: StoredFile) -> Response {
    let file = match fs::File::open(&stored.location).await {
        Ok(file) => file,
        Err(err) if err.kind() == ErrorKind::NotFound => return file_not_found_response(),
        Err(err) => {
            error!(
                target: "download",
                %err,
                path = %stored.location.display(),
                "failed to open stored file"
            );
            return server_error_response("Error reading file");
        }
    };

    let mut response = Response::new(Body::from_stream(ReaderStream::new(file)));
    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/octet-stream"),
    );
    headers.insert(
        header::CONTENT_DISPOSITION,
        build_attachment_disposition(&stored.name),
    );
    headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );
    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(stored.size_bytes));

    info!(
        target: "download",
        name = %stored.name,
        size_bytes = stored.size_bytes,
        "serving raw download"
    );

    response
}
