//! Application configuration loaded from environment variables.

use std::env;
use std::str::FromStr;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database: Option<DatabaseSettings>,
    pub jwt: JwtSettings,
    /// Display name substituted when a signed-in author has none.
    pub author_fallback_name: Option<String>,
}

#[derive(Debug, Clone)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

#[derive(Debug, Clone)]
pub struct JwtSettings {
    pub secret: Option<String>,
    pub issuer: String,
    pub expiration_hours: i64,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let database = env::var("DATABASE_URL").ok().map(|url| DatabaseSettings {
            url,
            max_connections: parse_or("DB_MAX_CONNECTIONS", 20),
            min_connections: parse_or("DB_MIN_CONNECTIONS", 2),
        });

        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: parse_or("PORT", 8080),
            database,
            jwt: JwtSettings {
                secret: env::var("JWT_SECRET").ok(),
                issuer: env::var("JWT_ISSUER").unwrap_or_else(|_| "folio".to_string()),
                expiration_hours: parse_or("JWT_EXPIRATION_HOURS", 24),
            },
            author_fallback_name: env::var("AUTHOR_FALLBACK_NAME")
                .ok()
                .map(|name| name.trim().to_string())
                .filter(|name| !name.is_empty()),
        }
    }
}

fn parse_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}
