//! Storefront configuration.

use std::path::PathBuf;

use anyhow::{Context, Result};
use bazaar_commerce::Currency;
use serde::{Deserialize, Serialize};

use crate::telemetry::LogFormat;

/// Storefront configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorefrontConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub uploads: UploadsConfig,

    #[serde(default)]
    pub session: SessionConfig,

    #[serde(default)]
    pub shop: ShopConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl StorefrontConfig {
    /// Load config from a file.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path))?;

        if path.ends_with(".json") {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse JSON config: {}", path))
        } else {
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse TOML config: {}", path))
        }
    }

    /// Configuration for tests: in-memory database and sessions, uploads
    /// under `uploads_dir`.
    pub fn for_tests(uploads_dir: impl Into<PathBuf>) -> Self {
        Self {
            database: DatabaseConfig {
                path: ":memory:".to_string(),
            },
            uploads: UploadsConfig {
                dir: uploads_dir.into(),
                ..UploadsConfig::default()
            },
            ..Self::default()
        }
    }

    /// The configured shop currency.
    pub fn currency(&self) -> Result<Currency> {
        Currency::from_code(&self.shop.currency)
            .with_context(|| format!("Unknown currency code: {}", self.shop.currency))
    }
}

/// HTTP listener settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address to bind (default: 127.0.0.1:5000).
    #[serde(default = "default_bind")]
    pub bind: String,
}

fn default_bind() -> String {
    "127.0.0.1:5000".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

/// SQLite database settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database file, or `:memory:`.
    #[serde(default = "default_database_path")]
    pub path: String,
}

fn default_database_path() -> String {
    "bazaar.db".to_string()
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
        }
    }
}

/// Product image storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadsConfig {
    /// Directory images are written to.
    #[serde(default = "default_uploads_dir")]
    pub dir: PathBuf,

    /// URL path the directory is served under.
    #[serde(default = "default_url_prefix")]
    pub url_prefix: String,
}

fn default_uploads_dir() -> PathBuf {
    PathBuf::from("static/images")
}

fn default_url_prefix() -> String {
    "/images".to_string()
}

impl Default for UploadsConfig {
    fn default() -> Self {
        Self {
            dir: default_uploads_dir(),
            url_prefix: default_url_prefix(),
        }
    }
}

/// Where cart sessions are kept.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionBackend {
    #[default]
    Memory,
    /// A `kv_store` table in the shop database.
    Sqlite,
}

/// Session cookie settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,

    #[serde(default)]
    pub backend: SessionBackend,
}

fn default_cookie_name() -> String {
    "bazaar_session".to_string()
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: default_cookie_name(),
            backend: SessionBackend::default(),
        }
    }
}

/// Shop-wide settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShopConfig {
    /// ISO currency code prices are stored in.
    #[serde(default = "default_currency")]
    pub currency: String,
}

fn default_currency() -> String {
    "UZS".to_string()
}

impl Default for ShopConfig {
    fn default() -> Self {
        Self {
            currency: default_currency(),
        }
    }
}

/// Log output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Filter used when `BAZAAR_LOG` is unset.
    #[serde(default = "default_level")]
    pub level: String,

    #[serde(default)]
    pub format: LogFormat,
}

fn default_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: LogFormat::default(),
        }
    }
}
