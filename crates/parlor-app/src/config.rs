use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use chrono::Duration;

use parlor_store::session::DEFAULT_SESSION_TTL_DAYS;

/// Selects the in-memory backend instead of a SQLite file.
pub const MEMORY_DB_PATH: &str = ":memory:";

/// Upper bound for `PARLOR_SESSION_TTL_DAYS`.
pub const MAX_SESSION_TTL_DAYS: i64 = 365;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub db_path: String,
    pub session_ttl_days: i64,
}

impl AppConfig {
    /// Read configuration from the environment (after loading `.env`).
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();

        let db_path = std::env::var("PARLOR_DB_PATH").unwrap_or_else(|_| "parlor.db".into());
        let session_ttl_days = match std::env::var("PARLOR_SESSION_TTL_DAYS") {
            Ok(raw) => parse_ttl_days(&raw)?,
            Err(_) => DEFAULT_SESSION_TTL_DAYS,
        };

        Ok(Self {
            db_path,
            session_ttl_days,
        })
    }

    pub fn in_memory() -> Self {
        Self {
            db_path: MEMORY_DB_PATH.into(),
            session_ttl_days: DEFAULT_SESSION_TTL_DAYS,
        }
    }

    /// Session lifetime, held to `1..=MAX_SESSION_TTL_DAYS` days even for a
    /// hand-built config.
    pub fn session_ttl(&self) -> Duration {
        Duration::days(self.session_ttl_days.clamp(1, MAX_SESSION_TTL_DAYS))
    }

    /// `None` when the in-memory backend is selected.
    pub fn db_file(&self) -> Option<PathBuf> {
        (self.db_path != MEMORY_DB_PATH).then(|| PathBuf::from(&self.db_path))
    }
}

fn parse_ttl_days(raw: &str) -> Result<i64> {
    let days = raw
        .trim()
        .parse::<i64>()
        .with_context(|| format!("PARLOR_SESSION_TTL_DAYS is not a number: {raw:?}"))?;
    if !(1..=MAX_SESSION_TTL_DAYS).contains(&days) {
        bail!("PARLOR_SESSION_TTL_DAYS must be between 1 and {MAX_SESSION_TTL_DAYS}, got {days}");
    }
    Ok(days)
}
