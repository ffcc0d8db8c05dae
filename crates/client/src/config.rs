//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `TANGELO_API_BASE_URL` - Base URL of the order/cart service
//!
//! ## Optional
//! - `TANGELO_CATALOG_URL` - Base URL of the public catalog
//!   (default: `https://fakestoreapi.com`)
//! - `TANGELO_CACHE_DIR` - Directory for the durable cart cache
//!   (default: `tangelo` under the OS temp directory)
//! - `TANGELO_REQUEST_TIMEOUT_SECS` - Per-request HTTP timeout (default: 10)

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

const DEFAULT_CATALOG_URL: &str = "https://fakestoreapi.com";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the order/cart service. Always ends with a slash so
    /// endpoint paths can be appended directly.
    pub api_base_url: Url,
    /// Base URL of the public catalog API.
    pub catalog_base_url: Url,
    /// Directory holding the durable cart cache file.
    pub cache_dir: PathBuf,
    /// Per-request HTTP timeout.
    pub request_timeout: Duration,
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let api_base_url = parse_base_url("TANGELO_API_BASE_URL", &get_required_env("TANGELO_API_BASE_URL")?)?;
        let catalog_base_url = parse_base_url(
            "TANGELO_CATALOG_URL",
            &get_env_or_default("TANGELO_CATALOG_URL", DEFAULT_CATALOG_URL),
        )?;
        let cache_dir = std::env::var("TANGELO_CACHE_DIR").map_or_else(
            |_| std::env::temp_dir().join("tangelo"),
            PathBuf::from,
        );
        let request_timeout_secs = get_env_or_default(
            "TANGELO_REQUEST_TIMEOUT_SECS",
            &DEFAULT_REQUEST_TIMEOUT_SECS.to_string(),
        )
        .parse::<u64>()
        .map_err(|e| {
            ConfigError::InvalidEnvVar("TANGELO_REQUEST_TIMEOUT_SECS".to_string(), e.to_string())
        })?;

        Ok(Self {
            api_base_url,
            catalog_base_url,
            cache_dir,
            request_timeout: Duration::from_secs(request_timeout_secs),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse a base URL, normalizing it to end with a trailing slash.
fn parse_base_url(var_name: &str, value: &str) -> Result<Url, ConfigError> {
    let normalized = if value.ends_with('/') {
        value.to_string()
    } else {
        format!("{value}/")
    };

    let url = Url::parse(&normalized)
        .map_err(|e| ConfigError::InvalidEnvVar(var_name.to_string(), e.to_string()))?;

    if url.cannot_be_a_base() {
        return Err(ConfigError::InvalidEnvVar(
            var_name.to_string(),
            "not a usable base URL".to_string(),
        ));
    }

    Ok(url)
}
