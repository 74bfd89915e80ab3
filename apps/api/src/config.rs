use std::ops::RangeInclusive;
use std::str::FromStr;

use anyhow::{bail, Context, Result};

/// Accepted magic-link lifetimes: one minute up to one day.
pub const MAGIC_LINK_TTL_MINUTES: RangeInclusive<i64> = 1..=24 * 60;
/// Accepted session lifetimes: one hour up to one year.
pub const SESSION_TTL_HOURS: RangeInclusive<i64> = 1..=24 * 365;

/// Application configuration loaded from environment variables.
/// Fails at startup if `DATABASE_URL` is missing or any value is malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub database_max_connections: u32,
    pub port: u16,
    pub rust_log: String,
    /// Base URL used when building magic links, e.g. `https://fairinterviews.io`.
    pub public_base_url: String,
    pub magic_link_ttl_minutes: i64,
    pub session_ttl_hours: i64,
    pub cookie_secure: bool,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let port: u16 = parse_or("PORT", std::env::var("PORT").ok(), 8080)?;

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            database_max_connections: parse_or(
                "DATABASE_MAX_CONNECTIONS",
                std::env::var("DATABASE_MAX_CONNECTIONS").ok(),
                10,
            )?,
            port,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            public_base_url: std::env::var("PUBLIC_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|_| format!("http://localhost:{port}")),
            magic_link_ttl_minutes: parse_in_range(
                "MAGIC_LINK_TTL_MINUTES",
                std::env::var("MAGIC_LINK_TTL_MINUTES").ok(),
                15,
                MAGIC_LINK_TTL_MINUTES,
            )?,
            session_ttl_hours: parse_in_range(
                "SESSION_TTL_HOURS",
                std::env::var("SESSION_TTL_HOURS").ok(),
                24 * 30,
                SESSION_TTL_HOURS,
            )?,
            cookie_secure: parse_or("COOKIE_SECURE", std::env::var("COOKIE_SECURE").ok(), false)?,
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

/// Parses an optional raw value, falling back to `default` when unset or blank.
fn parse_or<T>(key: &str, raw: Option<String>, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(default),
        Some(value) => value
            .parse::<T>()
            .with_context(|| format!("{key} has an invalid value '{value}'")),
    }
}

/// Like [`parse_or`], but the value must also fall inside `range`.
fn parse_in_range(
    key: &str,
    raw: Option<String>,
    default: i64,
    range: RangeInclusive<i64>,
) -> Result<i64> {
    let value = parse_or(key, raw, default)?;
    if !range.contains(&value) {
        bail!(
            "{key} must be between {} and {}, got {value}",
            range.start(),
            range.end()
        );
    }
    Ok(value)
}

#[cfg(test)]
impl Config {
    /// Configuration for tests; the database URL points nowhere.
    pub fn for_tests() -> Self {
        Config {
            database_url: "postgres://postgres@127.0.0.1:1/unused".to_string(),
            database_max_connections: 1,
            port: 8080,
            rust_log: "info".to_string(),
            public_base_url: "http://localhost:8080".to_string(),
            magic_link_ttl_minutes: 15,
            session_ttl_hours: 720,
            cookie_secure: false,
        }
    }
}
