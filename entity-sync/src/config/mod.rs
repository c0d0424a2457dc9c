//! Configuration and dependency initialization.

mod dependencies;

pub use dependencies::Dependencies;

use axum::http::{header, HeaderName, HeaderValue, Method};
use std::env;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tracing::warn;

use crate::server::headers::{ALERT_HEADER, ERROR_HEADER, PARAMS_HEADER};
use crate::AppError;

/// Default server host.
const DEFAULT_SERVER_HOST: &str = "127.0.0.1";

/// Default server port.
const DEFAULT_SERVER_PORT: u16 = 8080;

/// Default PostgreSQL pool size.
const DEFAULT_DATABASE_MAX_CONNECTIONS: u32 = 10;

/// Default OpenSearch URL.
const DEFAULT_OPENSEARCH_URL: &str = "http://localhost:9200";

/// Default number of documents returned by a search.
const DEFAULT_SEARCH_RESULT_LIMIT: usize = 100;

/// Default connection retry interval in seconds.
const DEFAULT_RETRY_INTERVAL_SECS: u64 = 15;

/// Default origins allowed by CORS.
const DEFAULT_CORS_ALLOWED_ORIGINS: &str = "http://localhost:3000,http://localhost:9000";

/// Where records are stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    Memory,
    Postgres {
        database_url: String,
        max_connections: u32,
    },
}

/// Where records are indexed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexBackend {
    Memory,
    OpenSearch { url: String },
}

/// Connection mode for OpenSearch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionMode {
    /// Fail immediately if connection fails.
    FailFast,
    /// Retry the connection at the configured interval until it succeeds.
    Retry,
}

impl ConnectionMode {
    /// Parse a connection mode.
    ///
    /// Valid values: "fail-fast" or "retry" (case-insensitive).
    /// Defaults to "retry" if not set or invalid.
    fn parse(raw: Option<&str>) -> Self {
        match raw.unwrap_or("retry").to_lowercase().as_str() {
            "fail-fast" | "failfast" | "fail_fast" => Self::FailFast,
            "retry" => Self::Retry,
            _ => {
                warn!("Invalid OPENSEARCH_CONNECTION_MODE, defaulting to 'retry'");
                Self::Retry
            }
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server_addr: SocketAddr,
    pub store_backend: StoreBackend,
    pub index_backend: IndexBackend,
    pub index_version: u32,
    pub search_result_limit: usize,
    pub connection_mode: ConnectionMode,
    pub retry_interval: Duration,
    pub cors_allowed_origins: Vec<String>,
}

impl AppConfig {
    /// Read the configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `SERVER_HOST`: Bind address (default: 127.0.0.1)
    /// - `SERVER_PORT`: Bind port (default: 8080)
    /// - `STORE_BACKEND`: "memory" or "postgres" (default: memory)
    /// - `DATABASE_URL`: PostgreSQL URL, required for the postgres backend
    /// - `DATABASE_MAX_CONNECTIONS`: Pool size (default: 10)
    /// - `INDEX_BACKEND`: "memory" or "opensearch" (default: memory)
    /// - `OPENSEARCH_URL`: OpenSearch server URL (default: http://localhost:9200)
    /// - `INDEX_VERSION`: Index version number (default: 0)
    /// - `SEARCH_RESULT_LIMIT`: Maximum search hits returned, 0 for the
    ///   backend maximum (default: 100)
    /// - `OPENSEARCH_CONNECTION_MODE`: "fail-fast" or "retry" (default: retry)
    /// - `OPENSEARCH_RETRY_INTERVAL_SECS`: Retry interval in seconds (default: 15)
    /// - `CORS_ALLOWED_ORIGINS`: Comma-separated origins
    ///   (default: http://localhost:3000,http://localhost:9000)
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("SERVER_HOST").unwrap_or_else(|| DEFAULT_SERVER_HOST.to_string());
        let port = parse_or(&lookup, "SERVER_PORT", DEFAULT_SERVER_PORT)?;
        let ip = host
            .trim()
            .parse::<IpAddr>()
            .map_err(|e| AppError::config(format!("Invalid SERVER_HOST '{}': {}", host, e)))?;
        let server_addr = SocketAddr::from((ip, port));

        let store_backend = match lookup("STORE_BACKEND")
            .unwrap_or_else(|| "memory".to_string())
            .to_lowercase()
            .as_str()
        {
            "memory" => StoreBackend::Memory,
            "postgres" => StoreBackend::Postgres {
                database_url: lookup("DATABASE_URL").ok_or_else(|| {
                    AppError::config("DATABASE_URL is required when STORE_BACKEND=postgres")
                })?,
                max_connections: parse_or(
                    &lookup,
                    "DATABASE_MAX_CONNECTIONS",
                    DEFAULT_DATABASE_MAX_CONNECTIONS,
                )?,
            },
            other => {
                return Err(AppError::config(format!(
                    "Unknown STORE_BACKEND '{}', expected 'memory' or 'postgres'",
                    other
                )))
            }
        };

        let index_backend = match lookup("INDEX_BACKEND")
            .unwrap_or_else(|| "memory".to_string())
            .to_lowercase()
            .as_str()
        {
            "memory" => IndexBackend::Memory,
            "opensearch" => IndexBackend::OpenSearch {
                url: lookup("OPENSEARCH_URL")
                    .unwrap_or_else(|| DEFAULT_OPENSEARCH_URL.to_string()),
            },
            other => {
                return Err(AppError::config(format!(
                    "Unknown INDEX_BACKEND '{}', expected 'memory' or 'opensearch'",
                    other
                )))
            }
        };

        let cors_allowed_origins = lookup("CORS_ALLOWED_ORIGINS")
            .unwrap_or_else(|| DEFAULT_CORS_ALLOWED_ORIGINS.to_string())
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(String::from)
            .collect();

        Ok(Self {
            server_addr,
            store_backend,
            index_backend,
            index_version: parse_or(&lookup, "INDEX_VERSION", 0)?,
            search_result_limit: parse_or(
                &lookup,
                "SEARCH_RESULT_LIMIT",
                DEFAULT_SEARCH_RESULT_LIMIT,
            )?,
            connection_mode: ConnectionMode::parse(
                lookup("OPENSEARCH_CONNECTION_MODE").as_deref(),
            ),
            retry_interval: Duration::from_secs(parse_or(
                &lookup,
                "OPENSEARCH_RETRY_INTERVAL_SECS",
                DEFAULT_RETRY_INTERVAL_SECS,
            )?),
            cors_allowed_origins,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, AppError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| AppError::config(format!("Invalid {} '{}': {}", key, raw, e))),
        None => Ok(default),
    }
}

/// Create the CORS layer for the configured origins.
///
/// Origins that are not valid header values are skipped with a warning. The
/// alert headers are exposed so browser clients can read them.
pub fn create_cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE])
        .expose_headers([
            header::LOCATION,
            HeaderName::from_static(ALERT_HEADER),
            HeaderName::from_static(ERROR_HEADER),
            HeaderName::from_static(PARAMS_HEADER),
        ])
}
