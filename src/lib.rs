//! HTTP drop box that only accepts PGP-armored uploads.
//!
//! Files are stored flat under a single root with randomly generated names and served back
//! either as a forced download or wrapped in a browser-side decryption page.

pub mod app_state;
pub mod config;
pub mod logging;
pub mod server;
pub mod storage;
pub mod templates;

pub use app_state::AppState;
pub use config::AppConfig;
pub use server::router::build_router;
