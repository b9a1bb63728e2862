//! Environment-driven configuration.
//!
//! Everything has a logged default so a bare `cargo run` starts a working
//! server with an on-disk SQLite file and notifications disabled.

use std::{env, fmt::Display, path::PathBuf, str::FromStr};

use tracing::{info, warn};

use crate::waitlist::WAITLIST_POSITION_THRESHOLD;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    /// SQLite database path.
    pub data_path: PathBuf,
    /// Minimum population before positions are assigned.
    pub position_threshold: u64,
    /// Bounded startup reconnect attempts against the store.
    pub db_connect_tries: u32,
    pub db_connect_interval_ms: u64,
    /// Outbound mail API. Notifications are disabled when the URL is unset.
    pub mail_api_url: Option<String>,
    pub mail_api_key: Option<String>,
    pub mail_from: String,
    /// Comma-separated allowed CORS origins; unset allows any origin.
    pub cors_allow_origin: Option<String>,
}

impl Config {
    pub fn load() -> Self {
        Self {
            port: try_load("PORT", "5000"),
            data_path: PathBuf::from(try_load::<String>("DATA_PATH", "waitlist.db")),
            position_threshold: try_load(
                "WAITLIST_POSITION_THRESHOLD",
                &WAITLIST_POSITION_THRESHOLD.to_string(),
            ),
            db_connect_tries: try_load("DB_CONNECT_TRIES", "5"),
            db_connect_interval_ms: try_load("DB_CONNECT_INTERVAL_MS", "5000"),
            mail_api_url: env::var("MAIL_API_URL").ok(),
            mail_api_key: env::var("MAIL_API_KEY").ok(),
            mail_from: try_load("MAIL_FROM", "waitlist@example.com"),
            cors_allow_origin: env::var("CORS_ALLOW_ORIGIN").ok().filter(|v| !v.is_empty()),
        }
    }
}

fn try_load<T: FromStr>(key: &str, default: &str) -> T
where
    T::Err: Display,
{
    env::var(key)
        .unwrap_or_else(|_| {
            info!("{key} not set, using default: {default}");
            default.to_string()
        })
        .parse()
        .map_err(|e| {
            warn!("Invalid {key} value: {e}");
        })
        .expect("Environment misconfigured!")
}
