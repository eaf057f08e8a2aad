use std::env;
use std::str::FromStr;

use anyhow::{Context, Result};
use dotenvy::dotenv;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub server_addr: String,
    /// Token lifetime in seconds.
    pub token_ttl: u64,
    /// Compare the token's revocation marker on every authenticated request.
    pub enforce_revocation: bool,

    // Rate limiting
    pub rate_sign_in_per_min: u32,
    pub rate_sign_up_per_min: u32,
    pub rate_protected_per_min: u32,

    pub api_prefix: String,
    pub log_dir: String,
    pub log_level: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        Ok(Self {
            server_addr: required("SERVER_ADDR")?,
            database_url: required("DATABASE_URL")?,
            jwt_secret: required("JWT_SECRET")?,
            token_ttl: parsed_or("TOKEN_TTL", 86_400)?, // 1 day
            enforce_revocation: flag_or("ENFORCE_REVOCATION", false)?,

            rate_sign_in_per_min: parsed_or("RATE_SIGN_IN_PER_MIN", 60)?,
            rate_sign_up_per_min: parsed_or("RATE_SIGN_UP_PER_MIN", 30)?,
            rate_protected_per_min: parsed_or("RATE_PROTECTED_PER_MIN", 1000)?,

            api_prefix: env::var("API_PREFIX").unwrap_or_default(),
            log_dir: env::var("LOG_DIR").unwrap_or_else(|_| "logs".to_string()),
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "debug".to_string()),
        })
    }
}

fn required(key: &str) -> Result<String> {
    env::var(key).with_context(|| format!("{key} must be set"))
}

fn parsed_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .with_context(|| format!("{key} has an invalid value {raw:?}")),
        _ => Ok(default),
    }
}

/// Boolean switch accepting `true`/`false`, `1`/`0` and `yes`/`no`.
fn flag_or(key: &str, default: bool) -> Result<bool> {
    match env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => parse_flag(&raw)
            .with_context(|| format!("{key} has an invalid value {raw:?}")),
        _ => Ok(default),
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
