//! Server configuration loaded from the environment.
//!
//! Every key has a default; the keys that fell back to one are remembered so
//! they can be logged once logging is up.

use axum::http::HeaderValue;
use std::fmt::Display;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

pub const BIND_ADDR_KEY: &str = "RECIPE_BIND_ADDR";
pub const DB_PATH_KEY: &str = "RECIPE_DB_PATH";
pub const MEDIA_ROOT_KEY: &str = "RECIPE_MEDIA_ROOT";
pub const MEDIA_URL_KEY: &str = "RECIPE_MEDIA_URL";
pub const PUBLIC_URL_KEY: &str = "RECIPE_PUBLIC_URL";
pub const CORS_ORIGINS_KEY: &str = "RECIPE_CORS_ORIGINS";
pub const LOG_LEVEL_KEY: &str = "RECIPE_LOG_LEVEL";
pub const LOG_DIR_KEY: &str = "RECIPE_LOG_DIR";
pub const MAX_UPLOAD_BYTES_KEY: &str = "RECIPE_MAX_UPLOAD_BYTES";

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";
const DEFAULT_MEDIA_URL: &str = "/media";
const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid {key} value `{value}`: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub db_path: PathBuf,
    pub media_root: PathBuf,
    /// Public URL prefix for stored media, without trailing slash.
    pub media_url: String,
    /// Origin such as `https://api.example.com`; media URLs are absolute
    /// when set and path-only otherwise.
    pub public_url: Option<String>,
    /// Origins allowed for cross-origin requests; empty allows any origin.
    pub cors_origins: Vec<HeaderValue>,
    pub log_level: String,
    /// Absolute directory for rotating log files; stderr only when unset.
    pub log_dir: Option<String>,
    pub max_upload_bytes: usize,
    /// Keys that were unset and took their default.
    pub defaulted: Vec<&'static str>,
}

impl Config {
    /// Loads configuration from the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration through an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut defaulted = Vec::new();
        let mut var = |key: &'static str| {
            let value = lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty());
            if value.is_none() {
                defaulted.push(key);
            }
            value
        };

        let bind_addr = try_parse(BIND_ADDR_KEY, var(BIND_ADDR_KEY), DEFAULT_BIND_ADDR)?;
        let db_path = var(DB_PATH_KEY)
            .map(PathBuf::from)
            .unwrap_or_else(|| std::env::temp_dir().join("recipe.sqlite3"));
        let media_root = var(MEDIA_ROOT_KEY)
            .map(PathBuf::from)
            .unwrap_or_else(|| std::env::temp_dir().join("media"));
        let media_url = var(MEDIA_URL_KEY)
            .unwrap_or_else(|| DEFAULT_MEDIA_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        if !media_url.starts_with('/') {
            return Err(ConfigError::Invalid {
                key: MEDIA_URL_KEY,
                value: media_url,
                reason: "must start with `/`".to_string(),
            });
        }
        let public_url = var(PUBLIC_URL_KEY)
            .map(|value| value.trim_end_matches('/').to_string());
        if let Some(value) = &public_url {
            if !(value.starts_with("http://") || value.starts_with("https://")) {
                return Err(ConfigError::Invalid {
                    key: PUBLIC_URL_KEY,
                    value: value.clone(),
                    reason: "must start with `http://` or `https://`".to_string(),
                });
            }
        }
        let cors_origins = var(CORS_ORIGINS_KEY)
            .map(|raw| parse_origins(&raw))
            .transpose()?
            .unwrap_or_default();
        let log_level = var(LOG_LEVEL_KEY)
            .unwrap_or_else(|| recipe_core::default_log_level().to_string());
        let log_dir = var(LOG_DIR_KEY);
        let max_upload_bytes = try_parse(
            MAX_UPLOAD_BYTES_KEY,
            var(MAX_UPLOAD_BYTES_KEY),
            &DEFAULT_MAX_UPLOAD_BYTES.to_string(),
        )?;

        Ok(Self {
            bind_addr,
            db_path,
            media_root,
            media_url,
            public_url,
            cors_origins,
            log_level,
            log_dir,
            max_upload_bytes,
            defaulted,
        })
    }
}

fn parse_origins(raw: &str) -> Result<Vec<HeaderValue>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(|origin| {
            HeaderValue::from_str(origin.trim_end_matches('/')).map_err(|err| {
                ConfigError::Invalid {
                    key: CORS_ORIGINS_KEY,
                    value: origin.to_string(),
                    reason: err.to_string(),
                }
            })
        })
        .collect()
}

fn try_parse<T: FromStr>(
    key: &'static str,
    value: Option<String>,
    default: &str,
) -> Result<T, ConfigError>
where
    T::Err: Display,
{
    let value = value.unwrap_or_else(|| default.to_string());
    value.parse().map_err(|err: T::Err| ConfigError::Invalid {
        key,
        reason: err.to_string(),
        value,
    })
}
