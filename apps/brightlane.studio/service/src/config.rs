use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:5000";
const DEFAULT_LOG_FILTER: &str = "info";
const DEFAULT_RUNTIME_ENV: &str = "development";

/// Origins the local page is served from during development.
pub const LOCAL_DEV_ORIGINS: &[&str] = &[
    "http://localhost:3000",
    "http://127.0.0.1:5500",
    "http://localhost:5500",
];
pub const DEPLOYED_FRONTEND_ORIGIN: &str = "https://brightlane.studio";
pub const DEPLOYED_BACKEND_ORIGIN: &str = "https://api.brightlane.studio";

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub log_filter: String,
    /// JSON file backing the contact store; unset keeps submissions in
    /// memory only.
    pub store_path: Option<PathBuf>,
    /// Extra origin appended to the CORS allow-list.
    pub frontend_origin: Option<String>,
    pub runtime_env: String,
    /// When set, `GET /api/contacts` requires a matching `x-api-key` header.
    pub contacts_api_key: Option<String>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid BL_CONTACT_BIND_ADDR value '{value}': {source}")]
    InvalidBindAddr {
        value: String,
        source: std::net::AddrParseError,
    },
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let bind_addr_raw = env::var("BL_CONTACT_BIND_ADDR")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());

        let bind_addr = bind_addr_raw
            .parse()
            .map_err(|source| ConfigError::InvalidBindAddr {
                value: bind_addr_raw,
                source,
            })?;

        let log_filter = env::var("BL_CONTACT_LOG_FILTER")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());

        let store_path = env::var("BL_CONTACT_STORE_PATH")
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .map(PathBuf::from);

        let frontend_origin = env::var("BL_FRONTEND_ORIGIN")
            .ok()
            .map(|value| value.trim().trim_end_matches('/').to_string())
            .filter(|value| !value.is_empty());

        let runtime_env = env::var("BL_RUNTIME_ENV")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_RUNTIME_ENV.to_string())
            .trim()
            .to_lowercase();

        let contacts_api_key = env::var("BL_CONTACTS_API_KEY")
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty());

        Ok(Self {
            bind_addr,
            log_filter,
            store_path,
            frontend_origin,
            runtime_env,
            contacts_api_key,
        })
    }

    /// Fixed allow-list plus the configured extra origin, deduplicated.
    pub fn allowed_origins(&self) -> Vec<String> {
        let mut origins: Vec<String> = LOCAL_DEV_ORIGINS
            .iter()
            .map(|origin| (*origin).to_string())
            .collect();
        origins.push(DEPLOYED_FRONTEND_ORIGIN.to_string());
        origins.push(DEPLOYED_BACKEND_ORIGIN.to_string());
        if let Some(extra) = &self.frontend_origin
            && !origins.iter().any(|origin| origin == extra)
        {
            origins.push(extra.clone());
        }
        origins
    }

    pub fn for_tests() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
            log_filter: "debug".to_string(),
            store_path: None,
            frontend_origin: Some("https://preview.brightlane.studio".to_string()),
            runtime_env: "test".to_string(),
            contacts_api_key: None,
        }
    }
}
