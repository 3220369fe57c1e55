//! Application settings loaded via OrthoConfig.
//!
//! One explicit settings object is constructed at process start and handed
//! to the components that need it; core logic never reads ambient state.

use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;

use crate::domain::FreshnessWindow;
use crate::domain::freshness::DEFAULT_FRESHNESS_MINUTES;

const DEFAULT_DATABASE_URL: &str = "postgres://postgres@localhost:5432/hectare";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_IMAGERY_ENDPOINT: &str = "https://imagery.invalid/thumbnails";
const DEFAULT_IMAGERY_TIMEOUT_SECONDS: u64 = 30;
const DEFAULT_POOL_MAX_SIZE: u32 = 10;

/// Configuration values for the service, merged from CLI flags, environment
/// variables (prefix `HECTARE_`), and an optional config file.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "HECTARE")]
pub struct AppSettings {
    /// PostgreSQL connection URL; the database needs the PostGIS extension.
    pub database_url: Option<String>,
    /// Socket address the HTTP server binds to.
    pub bind_addr: Option<String>,
    /// Endpoint of the external satellite thumbnail provider.
    pub imagery_endpoint: Option<String>,
    /// Bearer token for the thumbnail provider, when it requires one.
    pub imagery_api_key: Option<String>,
    /// Request timeout towards the thumbnail provider, in seconds.
    pub imagery_timeout_seconds: Option<u64>,
    /// Minutes a fetched thumbnail stays fresh.
    pub freshness_minutes: Option<i64>,
    /// Maximum number of pooled database connections.
    pub pool_max_size: Option<u32>,
}

impl AppSettings {
    /// Database URL, falling back to a local development database.
    pub fn database_url(&self) -> String {
        self.database_url
            .clone()
            .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_owned())
    }

    /// Bind address for the HTTP server.
    pub fn bind_addr(&self) -> String {
        self.bind_addr
            .clone()
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_owned())
    }

    /// Thumbnail provider endpoint. The default is a placeholder host;
    /// deployments set `HECTARE_IMAGERY_ENDPOINT`.
    pub fn imagery_endpoint(&self) -> String {
        self.imagery_endpoint
            .clone()
            .unwrap_or_else(|| DEFAULT_IMAGERY_ENDPOINT.to_owned())
    }

    /// Timeout applied to every thumbnail provider request.
    pub fn imagery_timeout(&self) -> Duration {
        Duration::from_secs(
            self.imagery_timeout_seconds
                .unwrap_or(DEFAULT_IMAGERY_TIMEOUT_SECONDS),
        )
    }

    /// Freshness window for cached thumbnails.
    pub fn freshness_window(&self) -> FreshnessWindow {
        FreshnessWindow::from_minutes(self.freshness_minutes.unwrap_or(DEFAULT_FRESHNESS_MINUTES))
    }

    /// Maximum size of the database connection pool.
    pub fn pool_max_size(&self) -> u32 {
        self.pool_max_size.unwrap_or(DEFAULT_POOL_MAX_SIZE)
    }
}
