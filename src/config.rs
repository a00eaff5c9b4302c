use std::fmt;

use anyhow::Context;
use tower_sessions::cookie::Key;

/// Cookie signing key and session lifetime.
#[derive(Clone)]
pub struct SessionConfig {
    pub key: Key,
    pub ttl_minutes: i64,
    pub secure: bool,
}

impl SessionConfig {
    /// The secret must carry at least 64 bytes of key material.
    pub fn from_secret(secret: &str, ttl_minutes: i64, secure: bool) -> anyhow::Result<Self> {
        let key = Key::try_from(secret.as_bytes())
            .map_err(|e| anyhow::anyhow!("SESSION_SECRET must be at least 64 bytes: {e}"))?;
        anyhow::ensure!(ttl_minutes > 0, "SESSION_TTL_MINUTES must be positive");
        Ok(Self {
            key,
            ttl_minutes,
            secure,
        })
    }
}

impl fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionConfig")
            .field("key", &"<redacted>")
            .field("ttl_minutes", &self.ttl_minutes)
            .field("secure", &self.secure)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub session: SessionConfig,
    pub sms_from_number: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL is not set")?;
        let secret = std::env::var("SESSION_SECRET").context("SESSION_SECRET is not set")?;
        let ttl_minutes = std::env::var("SESSION_TTL_MINUTES")
            .ok()
            .and_then(|v| v.parse::<i64>().ok())
            .unwrap_or(60 * 24);
        let secure = std::env::var("SESSION_SECURE")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false);

        Ok(Self {
            database_url,
            host: std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: std::env::var("APP_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(8080),
            session: SessionConfig::from_secret(&secret, ttl_minutes, secure)?,
            sms_from_number: std::env::var("SMS_FROM_NUMBER")
                .ok()
                .filter(|v| !v.is_empty()),
        })
    }
}
