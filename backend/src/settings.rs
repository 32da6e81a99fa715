//! Service configuration loaded via OrthoConfig.
//!
//! Values come from CLI flags, `SURVEY_*` environment variables and an
//! optional configuration file, in that order of precedence.

use std::net::SocketAddr;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;

use crate::outbound::identity::DEFAULT_AUDIENCE;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";
const DEFAULT_APP_NAME: &str = "API Topografía";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
const DEFAULT_POOL_MAX_SIZE: u32 = 10;

/// Errors raised while interpreting loaded settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("invalid bind address {value:?}: {message}")]
    BindAddr { value: String, message: String },
    #[error("SURVEY_JWT_SECRET must be set to verify bearer tokens")]
    MissingJwtSecret,
    #[error("request timeout must be at least one second")]
    ZeroTimeout,
}

/// Start-up configuration for the survey backend.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "SURVEY")]
pub struct AppSettings {
    /// Socket address to listen on, e.g. `0.0.0.0:8000`.
    pub bind_addr: Option<String>,
    /// PostgreSQL connection URL. Without one the in-memory store is used.
    pub database_url: Option<String>,
    /// Shared HS256 secret of the identity provider.
    pub jwt_secret: Option<String>,
    /// Audience tokens must carry.
    pub jwt_audience: Option<String>,
    /// Per-request deadline in seconds.
    pub request_timeout_secs: Option<u64>,
    /// Maximum pooled database connections.
    pub pool_max_size: Option<u32>,
    /// Name reported by the banner and info endpoints.
    pub app_name: Option<String>,
    /// Serve Swagger UI and advertise it in `/info`.
    #[ortho_config(default = false)]
    pub debug: bool,
}

impl AppSettings {
    /// Parse the configured bind address, falling back to port 8000.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let raw = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        raw.parse().map_err(|err: std::net::AddrParseError| SettingsError::BindAddr {
            value: raw.to_owned(),
            message: err.to_string(),
        })
    }

    /// Return the JWT secret; a blank value counts as missing.
    pub fn jwt_secret(&self) -> Result<&str, SettingsError> {
        self.jwt_secret
            .as_deref()
            .map(str::trim)
            .filter(|secret| !secret.is_empty())
            .ok_or(SettingsError::MissingJwtSecret)
    }

    pub fn jwt_audience(&self) -> &str {
        self.jwt_audience.as_deref().unwrap_or(DEFAULT_AUDIENCE)
    }

    /// Return the request deadline, defaulting to 30 seconds.
    pub fn request_timeout(&self) -> Result<Duration, SettingsError> {
        match self.request_timeout_secs.unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS) {
            0 => Err(SettingsError::ZeroTimeout),
            secs => Ok(Duration::from_secs(secs)),
        }
    }

    pub fn pool_max_size(&self) -> u32 {
        self.pool_max_size.unwrap_or(DEFAULT_POOL_MAX_SIZE)
    }

    pub fn app_name(&self) -> &str {
        self.app_name.as_deref().unwrap_or(DEFAULT_APP_NAME)
    }

    /// Return the database URL when one is configured and non-blank.
    pub fn database_url(&self) -> Option<&str> {
        self.database_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }
}
