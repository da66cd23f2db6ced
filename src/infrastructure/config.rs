use anyhow::{Context, Result};
use std::env;

/// Process-wide configuration, loaded once at startup and injected into
/// the components that need it.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// Token-signing secret. Rotating it invalidates every outstanding
    /// session token.
    pub jwt_secret: String,
}

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 5000;

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let host = env::var("HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string());
        let port = match env::var("PORT") {
            Ok(raw) => raw
                .parse::<u16>()
                .with_context(|| format!("PORT is not a valid port number: {}", raw))?,
            Err(_) => DEFAULT_PORT,
        };
        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET must be set")?;

        Ok(Self {
            host,
            port,
            jwt_secret,
        })
    }
}
