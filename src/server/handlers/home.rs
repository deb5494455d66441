use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, State},
    http::HeaderMap,
    response::IntoResponse,
};

use crate::{
    app_state::AppState,
    server::utils::client_address,
    templates::{HtmlTemplate, IndexTemplate, LayoutContext},
};

/// GET / — landing page with the caller's address and the upload ceiling.
pub async fn home_handler(
    State(state): State<AppState>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let peer = connect_info.map(|ConnectInfo(addr)| addr.to_string());
    let client_addr = client_address(&headers, peer);

    let layout = LayoutContext::from_state(&state, "Upload");
    HtmlTemplate::new(IndexTemplate::new(
        layout,
        client_addr,
        state.config().storage.max_upload_mb,
    ))
}
