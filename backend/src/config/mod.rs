//! Application configuration management

use std::env;

use anyhow::{Context, Result};
use base64::Engine;

use crate::db::DEFAULT_MAX_CONNECTIONS;

/// Default SQLite database location
pub const DEFAULT_DATABASE_URL: &str = "sqlite:./data/trailhead.db";

/// Default tracing filter when RUST_LOG is unset
pub const DEFAULT_LOG_FILTER: &str = "trailhead=debug,tower_http=debug";

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host (for generating URLs)
    pub host: Option<String>,

    /// Server port
    pub port: u16,

    /// SQLite database URL. DATABASE_PATH wins over DATABASE_URL.
    pub database_url: String,

    /// Maximum pool size (an in-memory database always uses one connection)
    pub database_max_connections: u32,

    /// HS256 secret for bearer token verification
    pub jwt_secret: String,

    /// Directory served under /media (trail images)
    pub media_path: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let database_url = env::var("DATABASE_PATH")
            .or_else(|_| env::var("DATABASE_URL"))
            .unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string());

        let jwt_secret = match env::var("JWT_SECRET") {
            Ok(secret) => secret.trim().to_string(),
            Err(_) => {
                tracing::warn!("JWT_SECRET not set, using a random secret for this run");
                generate_jwt_secret()
            }
        };

        Ok(Self {
            host: env::var("HOST").ok(),

            port: env::var("PORT")
                .unwrap_or_else(|_| "3001".to_string())
                .parse()
                .context("Invalid PORT")?,

            database_url,

            database_max_connections: match env::var("DATABASE_MAX_CONNECTIONS") {
                Ok(v) => v.parse().context("Invalid DATABASE_MAX_CONNECTIONS")?,
                Err(_) => DEFAULT_MAX_CONNECTIONS,
            },

            jwt_secret,

            media_path: env::var("MEDIA_PATH").unwrap_or_else(|_| "./data/media".to_string()),
        })
    }
}

/// Generate a cryptographically random JWT secret (64 bytes, base64 encoded)
fn generate_jwt_secret() -> String {
    let mut bytes = [0u8; 64];
    rand::RngCore::fill_bytes(&mut rand::thread_rng(), &mut bytes);
    base64::engine::general_purpose::STANDARD.encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_secrets_differ() {
        let a = generate_jwt_secret();
        let b = generate_jwt_secret();
        assert_ne!(a, b);
        assert_eq!(
            base64::engine::general_purpose::STANDARD
                .decode(&a)
                .unwrap()
                .len(),
            64
        );
    }
}
