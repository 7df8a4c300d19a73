//! Gateway configuration.
//!
//! Values come from defaults, then environment variables; the server binary layers
//! CLI flags on top. Nothing here is global: a `Config` is built once and handed to
//! `server::build_state`.

use std::env;
use std::time::Duration;

use anyhow::{anyhow, Result};
use base64::Engine;
use serde::{Deserialize, Serialize};

/// Default session timeout in seconds (30 minutes).
pub const DEFAULT_SESSION_TIMEOUT_SECS: u64 = 1800;
pub const DEFAULT_CLEANUP_INTERVAL_SECS: u64 = 60;
pub const DEFAULT_JWT_EXPIRATION_SECS: u64 = 24 * 60 * 60;
pub const DEFAULT_HTTP_PORT: u16 = 8181;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub http_port: u16,
    /// When false the authentication gate is not installed and every endpoint is public.
    pub auth_required: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "0.0.0.0".to_string(), http_port: DEFAULT_HTTP_PORT, auth_required: true }
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    pub admin_username: String,
    pub admin_password: String,
    pub jwt_key: String,
    pub jwt_expiration_secs: u64,
    pub session_timeout_secs: u64,
    pub cleanup_interval_secs: u64,
}

// Keep secrets out of logs.
impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("admin_username", &self.admin_username)
            .field("admin_password", &"<redacted>")
            .field("jwt_key", &"<redacted>")
            .field("jwt_expiration_secs", &self.jwt_expiration_secs)
            .field("session_timeout_secs", &self.session_timeout_secs)
            .field("cleanup_interval_secs", &self.cleanup_interval_secs)
            .finish()
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            admin_username: "admin".to_string(),
            admin_password: String::new(),
            jwt_key: String::new(),
            jwt_expiration_secs: DEFAULT_JWT_EXPIRATION_SECS,
            session_timeout_secs: DEFAULT_SESSION_TIMEOUT_SECS,
            cleanup_interval_secs: DEFAULT_CLEANUP_INTERVAL_SECS,
        }
    }
}

impl AuthConfig {
    pub fn session_timeout(&self) -> Duration { Duration::from_secs(self.session_timeout_secs) }
    pub fn cleanup_interval(&self) -> Duration { Duration::from_secs(self.cleanup_interval_secs) }
    pub fn jwt_expiration(&self) -> Duration { Duration::from_secs(self.jwt_expiration_secs) }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub auth: AuthConfig,
}

pub(crate) fn parse_port_env(name: &str) -> Option<u16> {
    match env::var(name) {
        Ok(val) => val.parse::<u16>().ok(),
        Err(_) => None,
    }
}

pub(crate) fn parse_u64_env(name: &str) -> Option<u64> {
    env::var(name).ok().and_then(|v| v.trim().parse::<u64>().ok())
}

pub(crate) fn parse_bool(s: &str) -> Option<bool> {
    match s.to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

pub(crate) fn parse_bool_env(name: &str) -> Option<bool> {
    env::var(name).ok().and_then(|v| parse_bool(&v))
}

/// 256-bit random signing key, base64url without padding.
pub fn generate_jwt_key() -> Result<String> {
    let mut buf = [0u8; 32];
    getrandom::getrandom(&mut buf).map_err(|e| anyhow!(e.to_string()))?;
    Ok(base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(buf))
}

impl Config {
    /// Defaults overlaid with environment variables.
    pub fn from_env() -> Result<Self> {
        let mut cfg = Config::default();
        if let Some(port) = parse_port_env("REDFISH_HTTP_PORT") { cfg.server.http_port = port; }
        if let Ok(host) = env::var("REDFISH_HOST") { cfg.server.host = host; }
        if let Some(b) = parse_bool_env("REDFISH_AUTH_REQUIRED") { cfg.server.auth_required = b; }

        if let Ok(u) = env::var("AUTH_ADMIN_USERNAME") { cfg.auth.admin_username = u; }
        if let Ok(p) = env::var("AUTH_ADMIN_PASSWORD") { cfg.auth.admin_password = p; }
        if let Ok(k) = env::var("AUTH_JWT_KEY") { cfg.auth.jwt_key = k; }
        if let Some(v) = parse_u64_env("AUTH_JWT_EXPIRATION_SECS") { cfg.auth.jwt_expiration_secs = v; }
        if let Some(v) = parse_u64_env("REDFISH_SESSION_TIMEOUT_SECS") { cfg.auth.session_timeout_secs = v; }
        if let Some(v) = parse_u64_env("REDFISH_SESSION_CLEANUP_SECS") { cfg.auth.cleanup_interval_secs = v; }

        if cfg.auth.jwt_key.is_empty() {
            tracing::warn!("AUTH_JWT_KEY not set; generating an ephemeral signing key (tokens will not survive a restart)");
            cfg.auth.jwt_key = generate_jwt_key()?;
        }
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if self.auth.admin_username.trim().is_empty() {
            return Err(anyhow!("admin username must not be empty"));
        }
        if self.auth.jwt_key.is_empty() {
            return Err(anyhow!("jwt key must not be empty"));
        }
        if self.auth.session_timeout_secs == 0 {
            return Err(anyhow!("session timeout must be greater than zero"));
        }
        if self.auth.cleanup_interval_secs == 0 {
            return Err(anyhow!("session cleanup interval must be greater than zero"));
        }
        Ok(())
    }
}
