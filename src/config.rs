use config::{Config, ConfigError as BaseConfigError, File};
use serde::{Deserialize, Serialize};
use std::env;
use std::net::{AddrParseError, IpAddr, SocketAddr};
use std::path::PathBuf;
use thiserror::Error;

use crate::server::constants::{BYTES_PER_MB, MAX_MAX_UPLOAD_MB, MIN_MAX_UPLOAD_MB};

const DEFAULT_CONFIG_FILE: &str = "config";

#[derive(Debug, Deserialize, Clone, Serialize)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone, Serialize)]
pub struct StorageConfig {
    pub root: PathBuf,
    pub max_upload_mb: u64,
}

#[derive(Debug, Deserialize, Clone, Serialize)]
pub struct UiConfig {
    pub brand_name: String,
    pub static_dir: PathBuf,
}

#[derive(Debug, Deserialize, Clone, Serialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub ui: UiConfig,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration error: {0}")]
    Config(#[from] BaseConfigError),
    #[error("Invalid bind address: {0}")]
    BindAddr(#[from] AddrParseError),
    #[error("Invalid configuration: {0}")]
    Validation(String),
}

/// Environment variables that override individual configuration keys.
const ENV_OVERRIDES: [(&str, &str); 6] = [
    ("server.bind_addr", "SERVER_BIND_ADDR"),
    ("server.port", "SERVER_PORT"),
    ("storage.root", "STORAGE_ROOT"),
    ("storage.max_upload_mb", "MAX_UPLOAD_MB"),
    ("ui.brand_name", "UI_BRAND_NAME"),
    ("ui.static_dir", "STATIC_DIR"),
];

impl AppConfig {
    /// Load configuration from defaults, `config.toml` (or `CONFIG_FILE`) and the process
    /// environment.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        let path = env::var("CONFIG_FILE").unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
        Self::load_from(&path, |key| env::var(key).ok())
    }

    /// Load configuration from an optional file at `path`, resolving overrides through `lookup`.
    pub fn load_from<F>(path: &str, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Config::builder()
            .add_source(Config::try_from(&AppConfig::default())?)
            .add_source(File::with_name(path).required(false));

        for (key, var) in ENV_OVERRIDES {
            settings = settings.set_override_option(key, lookup(var))?;
        }

        let mut config: AppConfig = settings.build()?.try_deserialize()?;
        config.validate()?;

        Ok(config)
    }

    /// Upload ceiling in bytes, derived from the configured megabyte value.
    pub fn max_upload_bytes(&self) -> u64 {
        self.storage.max_upload_mb.saturating_mul(BYTES_PER_MB)
    }

    pub fn listen_addr(&self) -> Result<SocketAddr, ConfigError> {
        let ip: IpAddr = self.server.bind_addr.trim().parse()?;
        Ok(SocketAddr::new(ip, self.server.port))
    }

    fn validate(&mut self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Validation(
                "Server port cannot be 0".to_string(),
            ));
        }
        self.listen_addr()?;

        if self.storage.max_upload_mb < MIN_MAX_UPLOAD_MB
            || self.storage.max_upload_mb > MAX_MAX_UPLOAD_MB
        {
            return Err(ConfigError::Validation(format!(
                "MAX_UPLOAD_MB must be between {} and {}",
                MIN_MAX_UPLOAD_MB, MAX_MAX_UPLOAD_MB
            )));
        }

        if self.storage.root.as_os_str().is_empty() {
            return Err(ConfigError::Validation(
                "STORAGE_ROOT cannot be empty".to_string(),
            ));
        }

        let brand = self.ui.brand_name.trim();
        if brand.is_empty() {
            return Err(ConfigError::Validation(
                "UI_BRAND_NAME cannot be empty".to_string(),
            ));
        }
        self.ui.brand_name = brand.to_string();

        Ok(())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                bind_addr: "0.0.0.0".to_string(),
                port: 8080,
            },
            storage: StorageConfig {
                root: PathBuf::from("./uploads"),
                max_upload_mb: 50,
            },
            ui: UiConfig {
                brand_name: "PGP Drop".to_string(),
                static_dir: PathBuf::from("./static"),
            },
        }
    }
}
