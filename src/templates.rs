use askama::Template;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use time::OffsetDateTime;
use tracing::error;

use crate::app_state::AppState;

/// Shared layout context injected into all templates
#[derive(Clone, Debug)]
pub struct LayoutContext {
    pub title: String,
    pub brand_name: String,
    pub current_year: i32,
}

impl LayoutContext {
    /// Build a layout context using the configured brand name
    pub fn from_state(state: &AppState, title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            brand_name: state.config().ui.brand_name.clone(),
            current_year: OffsetDateTime::now_utc().year(),
        }
    }
}

/// Wrapper that converts Askama templates into Axum responses with logging
pub struct HtmlTemplate<T: Template> {
    template: T,
}

impl<T: Template> HtmlTemplate<T> {
    pub fn new(template: T) -> Self {
        Self { template }
    }
}

impl<T: Template> IntoResponse for HtmlTemplate<T> {
    fn into_response(self) -> Response {
        match self.template.render() {
            Ok(html) => Html(html).into_response(),
            Err(err) => {
                error!(target: "templates", error = %err, "failed to render template");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Template rendering error",
                )
                    .into_response()
            }
        }
    }
}

/// Landing page with the upload form.
#[derive(Template)]
#[template(path = "index.html", escape = "html")]
pub struct IndexTemplate {
    pub layout: LayoutContext,
    pub client_addr: String,
    pub max_upload_mb: u64,
}

impl IndexTemplate {
    pub fn new(layout: LayoutContext, client_addr: String, max_upload_mb: u64) -> Self {
        Self {
            layout,
            client_addr,
            max_upload_mb,
        }
    }
}

/// Decryption instructions for a stored file. Only the root-relative name is exposed.
#[derive(Template)]
#[template(path = "decrypt.html", escape = "html")]
pub struct DecryptTemplate {
    pub layout: LayoutContext,
    pub file_name: String,
}

impl DecryptTemplate {
    pub fn new(layout: LayoutContext, file_name: String) -> Self {
        Self { layout, file_name }
    }

    pub fn raw_url(&self) -> String {
        format!("/uploads/{}/raw", self.file_name)
    }
}
