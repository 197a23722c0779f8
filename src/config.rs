use std::{fmt::Display, net::SocketAddr, str::FromStr};

use anyhow::{Context, anyhow};

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub db_max_connections: u32,
    pub session_idle_minutes: i64,
    pub session_secure: bool,
    pub room_code_length: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: "sqlite://huddle.db?mode=rwc".to_owned(),
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            db_max_connections: 16,
            session_idle_minutes: 60,
            session_secure: false,
            room_code_length: 6,
        }
    }
}

impl Config {
    /// Reads the process environment, after loading `.env` if there is one.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| dotenv::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let defaults = Self::default();

        let config = Self {
            database_url: lookup("DATABASE_URL").unwrap_or(defaults.database_url),
            bind_addr: parse_or(&lookup, "BIND_ADDR", defaults.bind_addr)?,
            db_max_connections: parse_or(&lookup, "DB_MAX_CONNECTIONS", defaults.db_max_connections)?,
            session_idle_minutes: parse_or(&lookup, "SESSION_IDLE_MINUTES", defaults.session_idle_minutes)?,
            session_secure: parse_or(&lookup, "SESSION_SECURE", defaults.session_secure)?,
            room_code_length: parse_or(&lookup, "ROOM_CODE_LENGTH", defaults.room_code_length)?,
        };

        if config.room_code_length == 0 {
            return Err(anyhow!("ROOM_CODE_LENGTH must be at least 1"));
        }
        if config.db_max_connections == 0 {
            return Err(anyhow!("DB_MAX_CONNECTIONS must be at least 1"));
        }

        Ok(config)
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow!("{e}"))
            .with_context(|| format!("invalid {key}: {raw:?}")),
        None => Ok(default),
    }
}
