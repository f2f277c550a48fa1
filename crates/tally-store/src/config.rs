//! # Store Configuration
//!
//! Chooses the counter backend from the environment:
//! `DATABASE_URL` selects PostgreSQL, otherwise the JSON file at
//! `COUNTER_FILE` (default `./data.json`) is used.

use std::env;
use std::path::PathBuf;
use std::time::Duration;
use tally_core::TallyError;

const DEFAULT_COUNTER_FILE: &str = "./data.json";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_TIMEOUT_SECS: u64 = 5;

/// Which backend holds the counter
#[derive(Clone, PartialEq, Eq)]
pub enum StoreBackend {
    /// JSON document on local disk
    File { path: PathBuf },
    /// PostgreSQL table
    Postgres {
        database_url: String,
        max_connections: u32,
    },
}

impl std::fmt::Debug for StoreBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreBackend::File { path } => f.debug_struct("File").field("path", path).finish(),
            // Connection strings carry credentials
            StoreBackend::Postgres {
                max_connections, ..
            } => f
                .debug_struct("Postgres")
                .field("database_url", &"<redacted>")
                .field("max_connections", max_connections)
                .finish(),
        }
    }
}

/// Counter store configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    /// Upper bound on any single storage call
    pub timeout: Duration,
}

impl StoreConfig {
    /// Load configuration from environment variables.
    ///
    /// - `DATABASE_URL` (selects PostgreSQL)
    /// - `DATABASE_MAX_CONNECTIONS` (default 5)
    /// - `COUNTER_FILE` (default `./data.json`, used without `DATABASE_URL`)
    /// - `STORAGE_TIMEOUT_SECS` (default 5)
    pub fn from_env() -> Result<Self, TallyError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, TallyError> {
        let timeout_secs = parse_or(&lookup, "STORAGE_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?;

        let backend = match lookup("DATABASE_URL").filter(|url| !url.is_empty()) {
            Some(database_url) => StoreBackend::Postgres {
                database_url,
                max_connections: parse_or(
                    &lookup,
                    "DATABASE_MAX_CONNECTIONS",
                    DEFAULT_MAX_CONNECTIONS,
                )?,
            },
            None => StoreBackend::File {
                path: lookup("COUNTER_FILE")
                    .filter(|p| !p.is_empty())
                    .unwrap_or_else(|| DEFAULT_COUNTER_FILE.to_string())
                    .into(),
            },
        };

        Ok(Self {
            backend,
            timeout: Duration::from_secs(timeout_secs),
        })
    }

    /// File backend at `path` with the default timeout
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            backend: StoreBackend::File { path: path.into() },
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

fn parse_or<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
    default: T,
) -> Result<T, TallyError> {
    match lookup(name) {
        Some(raw) => raw
            .parse()
            .map_err(|_| TallyError::Configuration(format!("Invalid {}: {}", name, raw))),
        None => Ok(default),
    }
}
