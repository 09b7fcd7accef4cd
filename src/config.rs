//! Runtime configuration read from the environment (and `.env`).

use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// Directory holding the dashboard (`index.html` and assets)
    pub static_dir: PathBuf,
    /// Name of the cookie carrying the session id
    pub session_cookie: String,
    /// Sessions idle longer than this are dropped
    pub session_ttl: Duration,
    /// How many comments each analysis asks the generator for
    pub comment_sample_size: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            static_dir: PathBuf::from("static"),
            session_cookie: "session".to_string(),
            session_ttl: Duration::from_secs(24 * 60 * 60),
            comment_sample_size: 50,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let port = match env::var("PORT") {
            Ok(raw) => raw
                .parse()
                .with_context(|| format!("Invalid PORT: {}", raw))?,
            Err(_) => defaults.port,
        };

        let comment_sample_size = match env::var("COMMENT_SAMPLE_SIZE") {
            Ok(raw) => raw
                .parse()
                .with_context(|| format!("Invalid COMMENT_SAMPLE_SIZE: {}", raw))?,
            Err(_) => defaults.comment_sample_size,
        };

        let session_ttl = match env::var("SESSION_TTL_SECS") {
            Ok(raw) => Duration::from_secs(
                raw.parse()
                    .with_context(|| format!("Invalid SESSION_TTL_SECS: {}", raw))?,
            ),
            Err(_) => defaults.session_ttl,
        };

        Ok(Self {
            host: env::var("HOST").unwrap_or(defaults.host),
            port,
            static_dir: env::var("STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.static_dir),
            session_cookie: env::var("SESSION_COOKIE").unwrap_or(defaults.session_cookie),
            session_ttl,
            comment_sample_size,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
