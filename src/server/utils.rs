use axum::{
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use rand::{rngs::OsRng, RngCore};

use super::constants::NAME_ALPHABET;

/// Generate a random identifier of exactly `length` characters from the 62-symbol alphabet.
///
/// Randomness comes straight from the operating system. If the OS source fails the call
/// panics; there is no fallback generator.
pub fn generate_random_name(length: usize) -> String {
    if length == 0 {
        return String::new();
    }
    nanoid::nanoid!(length, &NAME_ALPHABET, os_random)
}

fn os_random(size: usize) -> Vec<u8> {
    let mut bytes = vec![0u8; size];
    OsRng.fill_bytes(&mut bytes);
    bytes
}

/// Confirm the OS entropy source is usable before accepting traffic.
pub fn check_entropy_source() -> Result<(), rand::Error> {
    let mut probe = [0u8; 16];
    OsRng.try_fill_bytes(&mut probe)
}

/// Client address as seen by the landing page: first `X-Forwarded-For` entry, else the peer.
pub fn client_address(headers: &HeaderMap, peer: Option<String>) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .or(peer)
        .unwrap_or_else(|| "unknown".to_string())
}

/// Base URL used in upload confirmations, derived from the request's `Host` header.
pub fn public_base_url(headers: &HeaderMap, fallback_host: &str) -> String {
    let scheme = headers
        .get("x-forwarded-proto")
        .and_then(|value| value.to_str().ok())
        .map(|value| value.trim().to_ascii_lowercase())
        .filter(|value| value == "http" || value == "https")
        .unwrap_or_else(|| "http".to_string());

    let host = headers
        .get(header::HOST)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .unwrap_or(fallback_host);

    format!("{scheme}://{host}")
}

/// Build an `attachment` Content-Disposition header value with an ASCII fallback name.
pub fn build_attachment_disposition(filename: &str) -> HeaderValue {
    let mut fallback = String::with_capacity(filename.len());
    let mut contains_non_ascii = false;

    for ch in filename.chars() {
        if matches!(ch, ' '..='~') && ch != '"' && ch != '\\' {
            fallback.push(ch);
        } else {
            contains_non_ascii |= !ch.is_ascii();
            fallback.push('_');
        }
    }

    if fallback.is_empty() {
        fallback.push_str("download.bin");
    }

    let header_value = if contains_non_ascii {
        let encoded = encode_filename_for_rfc5987(filename);
        format!("attachment; filename=\"{fallback}\"; filename*=UTF-8''{encoded}")
    } else {
        format!("attachment; filename=\"{fallback}\"")
    };

    HeaderValue::from_str(&header_value).unwrap_or(HeaderValue::from_static("attachment"))
}

/// Percent-encode a filename for RFC 5987 usage.
pub fn encode_filename_for_rfc5987(input: &str) -> String {
    let mut encoded = String::with_capacity(input.len());

    for byte in input.as_bytes() {
        match *byte {
            b'A'..=b'Z'
            | b'a'..=b'z'
            | b'0'..=b'9'
            | b'!'
            | b'#'
            | b'$'
            | b'&'
            | b'+'
            | b'-'
            | b'.'
            | b'^'
            | b'_'
            | b'`'
            | b'|'
            | b'~' => encoded.push(*byte as char),
            _ => {
                encoded.push('%');
                encoded.push_str(&format!("{:02X}", byte));
            }
        }
    }

    encoded
}

/// Canonical application server error response body.
pub fn server_error_response(message: &'static str) -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, message).into_response()
}

pub fn bad_request_response(message: impl Into<String>) -> Response {
    (StatusCode::BAD_REQUEST, message.into()).into_response()
}

/// Shared response for names that resolve inside the root but have no file behind them.
pub fn file_not_found_response() -> Response {
    (StatusCode::NOT_FOUND, "File not found").into_response()
}
