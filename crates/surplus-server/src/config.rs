use std::fmt::Display;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::info;

use surplus_api::state::Settings;

/// Store path that selects a throwaway in-memory store.
pub const IN_MEMORY: &str = ":memory:";

#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub db_path: PathBuf,
    pub poll_interval: Duration,
    pub seed_samples: bool,
    pub strict_login: bool,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let host: String = load(&lookup, "SURPLUS_HOST", "0.0.0.0")?;
        let port: u16 = load(&lookup, "SURPLUS_PORT", "3000")?;
        let db_path: String = load(&lookup, "SURPLUS_DB_PATH", "surplus.db")?;
        let poll_secs: u64 = load(&lookup, "SURPLUS_POLL_INTERVAL_SECS", "5")?;
        if poll_secs == 0 {
            anyhow::bail!("SURPLUS_POLL_INTERVAL_SECS must be at least 1");
        }

        Ok(Self {
            addr: format!("{}:{}", host, port)
                .parse()
                .with_context(|| format!("Invalid listen address {}:{}", host, port))?,
            db_path: db_path.into(),
            poll_interval: Duration::from_secs(poll_secs),
            seed_samples: load(&lookup, "SURPLUS_SEED_SAMPLES", "true")?,
            strict_login: load(&lookup, "SURPLUS_STRICT_LOGIN", "false")?,
        })
    }

    pub fn settings(&self) -> Settings {
        Settings {
            poll_interval: self.poll_interval,
            strict_login: self.strict_login,
        }
    }
}

fn load<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: &str) -> Result<T>
where
    T::Err: Display,
{
    let raw = lookup(key).unwrap_or_else(|| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });
    raw.parse()
        .map_err(|e| anyhow::anyhow!("Invalid {key} value '{raw}': {e}"))
}
