use std::env;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} must be a number, got {value:?}")]
    InvalidNumber { name: &'static str, value: String },
    #[error("{0} must be greater than zero")]
    NotPositive(&'static str),
    #[error("{name} must be at most {max} hours")]
    TooLarge { name: &'static str, max: i64 },
    #[error("JWT_SECRET and JWT_REFRESH_SECRET must differ")]
    SharedSecret,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub max_lifetime: Duration,
    pub acquire_timeout: Duration,
}

/// Signing material and lifetimes for both token kinds.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub expire_hours: i64,
    pub refresh_secret: String,
    pub refresh_expire_hours: i64,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    pub cors_origins: Vec<String>,
    pub request_timeout: Duration,
}

fn var_or(name: &str, default: &str) -> String {
    env::var(name)
        .ok()
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn parse_var<T: FromStr>(name: &'static str, default: &str) -> Result<T, ConfigError> {
    let value = var_or(name, default);
    value
        .parse()
        .map_err(|_| ConfigError::InvalidNumber { name, value })
}

/// Upper bound for either token lifetime (ten years).
pub const MAX_TOKEN_TTL_HOURS: i64 = 24 * 365 * 10;

fn positive_hours(name: &'static str, default: &str) -> Result<i64, ConfigError> {
    let hours: i64 = parse_var(name, default)?;
    if hours <= 0 {
        return Err(ConfigError::NotPositive(name));
    }
    if hours > MAX_TOKEN_TTL_HOURS {
        return Err(ConfigError::TooLarge {
            name,
            max: MAX_TOKEN_TTL_HOURS,
        });
    }
    Ok(hours)
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let jwt = JwtConfig {
            secret: var_or("JWT_SECRET", "development-access-secret-change-in-production"),
            expire_hours: positive_hours("JWT_EXPIRE_HOURS", "24")?,
            refresh_secret: var_or(
                "JWT_REFRESH_SECRET",
                "development-refresh-secret-change-in-production",
            ),
            refresh_expire_hours: positive_hours("JWT_REFRESH_EXPIRE_HOURS", "168")?,
        };

        if jwt.secret == jwt.refresh_secret {
            return Err(ConfigError::SharedSecret);
        }

        let database = DatabaseConfig {
            url: var_or("DATABASE_URL", "sqlite:expenses.db?mode=rwc"),
            max_connections: parse_var("DB_MAX_CONNECTIONS", "10")?,
            min_connections: parse_var("DB_MIN_CONNECTIONS", "1")?,
            max_lifetime: Duration::from_secs(parse_var("DB_MAX_LIFETIME_SECS", "3600")?),
            acquire_timeout: Duration::from_secs(parse_var("DB_ACQUIRE_TIMEOUT_SECS", "5")?),
        };

        if database.max_connections == 0 {
            return Err(ConfigError::NotPositive("DB_MAX_CONNECTIONS"));
        }

        Ok(Self {
            host: var_or("HOST", "127.0.0.1"),
            port: parse_var("PORT", "8080")?,
            database,
            jwt,
            cors_origins: var_or("CORS_ORIGINS", "http://localhost:3000")
                .split(',')
                .map(|origin| origin.trim().to_string())
                .filter(|origin| !origin.is_empty())
                .collect(),
            request_timeout: Duration::from_secs(parse_var("REQUEST_TIMEOUT_SECS", "30")?),
        })
    }
}
