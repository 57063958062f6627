use anyhow::{anyhow, Context, Result};
use std::path::PathBuf;

const DEFAULT_DB_PATH: &str = "rewards.db";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

/// Runtime settings, read from the environment (and `.env` when present)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub db_path: PathBuf,
    pub bind_addr: String,
    pub seed_on_startup: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            seed_on_startup: true,
        }
    }
}

impl Config {
    /// Load `.env`, then read `REWARDS_*` variables over the defaults
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; unset keys keep their defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();

        if let Some(path) = lookup("REWARDS_DB_PATH") {
            config.db_path = PathBuf::from(path);
        }

        if let Some(addr) = lookup("REWARDS_BIND_ADDR") {
            config.bind_addr = addr;
        }

        if let Some(seed) = lookup("REWARDS_SEED_ON_STARTUP") {
            config.seed_on_startup = parse_bool(&seed)
                .context("REWARDS_SEED_ON_STARTUP must be 'true' or 'false'")?;
        }

        Ok(config)
    }
}

fn parse_bool(value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        other => Err(anyhow!("unrecognized boolean '{other}'")),
    }
}
