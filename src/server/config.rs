//! Server settings read from the environment.

use log::{info, warn};
use std::{env, fmt::Display, path::PathBuf, str::FromStr};
use thiserror::Error;
use uuid::Uuid;

/// Owner of the sample cards seeded into an empty database.
pub const DEFAULT_DEMO_USER: &str = "00000000-0000-4000-8000-000000000001";

#[derive(Error, Debug)]
#[error("Invalid value for {key}: {message}")]
pub struct ConfigError {
    pub key: &'static str,
    pub message: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub port: u16,
    pub database_path: PathBuf,
    /// Seed sample flashcards when the database is empty.
    pub seed: bool,
    /// JSON export to seed from instead of the built-in sample cards.
    pub seed_file: Option<PathBuf>,
    pub demo_user: Uuid,
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup, so tests don't touch the process env.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        Ok(Self {
            port: try_load(&lookup, "FLASHCARDS_PORT", "3000")?,
            database_path: try_load(&lookup, "FLASHCARDS_DB", "db.sqlite3")?,
            seed: try_load(&lookup, "FLASHCARDS_SEED", "true")?,
            seed_file: lookup("FLASHCARDS_SEED_FILE").map(PathBuf::from),
            demo_user: try_load(&lookup, "FLASHCARDS_DEMO_USER", DEFAULT_DEMO_USER)?,
        })
    }

    pub fn address(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }
}

fn try_load<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: &str,
) -> Result<T, ConfigError>
where
    T::Err: Display,
{
    let raw = lookup(key).unwrap_or_else(|| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });

    raw.trim().parse().map_err(|e: T::Err| {
        warn!("Invalid {key} value: {e}");
        ConfigError {
            key,
            message: e.to_string(),
        }
    })
}
