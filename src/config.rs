use std::{env, fmt::Display, str::FromStr};

use anyhow::{anyhow, bail, Context};
use tracing::info;

/// One year.
const MAX_INACTIVITY_MINUTES: u32 = 365 * 24 * 60;
const MAX_FEED_LIMIT: u32 = 1000;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: String,
    pub session_inactivity_minutes: u32,
    pub secure_cookies: bool,
    /// Upper bound on messages shown in activity feeds.
    pub feed_limit: u32,
}

impl Config {
    /// Reads the environment, after loading `.env` if one exists.
    pub fn load() -> anyhow::Result<Self> {
        let _ = dotenv::dotenv();

        Ok(Self {
            database_url: try_load("DATABASE_URL", "sqlite://studybud.db")?,
            bind_addr: try_load("BIND_ADDR", "0.0.0.0:8080")?,
            session_inactivity_minutes: bounded(
                "SESSION_INACTIVITY_MINUTES",
                try_load("SESSION_INACTIVITY_MINUTES", "60")?,
                MAX_INACTIVITY_MINUTES,
            )?,
            secure_cookies: try_load("SECURE_COOKIES", "false")?,
            feed_limit: bounded("FEED_LIMIT", try_load("FEED_LIMIT", "50")?, MAX_FEED_LIMIT)?,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: "sqlite::memory:".to_owned(),
            bind_addr: "127.0.0.1:0".to_owned(),
            session_inactivity_minutes: 60,
            secure_cookies: false,
            feed_limit: 50,
        }
    }
}

fn try_load<T: FromStr>(key: &str, default: &str) -> anyhow::Result<T>
where
    T::Err: Display,
{
    let raw = match env::var(key) {
        Ok(value) => value,
        Err(env::VarError::NotPresent) => {
            info!("{key} not set, using default: {default}");
            default.to_owned()
        }
        Err(e) => return Err(e).with_context(|| format!("reading {key}")),
    };

    raw.parse()
        .map_err(|e| anyhow!("invalid {key} value {raw:?}: {e}"))
}

fn bounded(key: &str, value: u32, max: u32) -> anyhow::Result<u32> {
    if !(1..=max).contains(&value) {
        bail!("invalid {key} value {value}: must be between 1 and {max}");
    }
    Ok(value)
}
