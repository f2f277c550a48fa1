//! # tally-store
//!
//! Counter store backends for rupee-tally.
//!
//! Two interchangeable implementations of `tally_core::CounterStore`:
//!
//! 1. **FileCounterStore** - JSON document on disk
//!    - No external services
//!    - Best for: single-process development deployments
//!
//! 2. **PostgresCounterStore** - single row in PostgreSQL
//!    - Atomic `UPDATE ... RETURNING` increments
//!    - Best for: production, multiple processes
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use tally_store::{connect, StoreConfig};
//!
//! let store = connect(&StoreConfig::from_env()?).await?;
//! let count = store.increment_and_get().await?;
//! ```

pub mod config;
pub mod file;
pub mod postgres;

use std::sync::Arc;
use tally_core::{BoxedCounterStore, CounterStore, TallyResult, TimeoutCounterStore};
use tracing::info;

// Re-exports
pub use config::{StoreBackend, StoreConfig};
pub use file::FileCounterStore;
pub use postgres::PostgresCounterStore;

/// Build the configured backend, bound it with the storage timeout, and
/// make sure the counter row exists.
pub async fn connect(config: &StoreConfig) -> TallyResult<BoxedCounterStore> {
    let backend: BoxedCounterStore = match &config.backend {
        StoreBackend::File { path } => Arc::new(FileCounterStore::new(path.clone())),
        StoreBackend::Postgres {
            database_url,
            max_connections,
        } => Arc::new(
            PostgresCounterStore::connect(database_url, *max_connections, config.timeout).await?,
        ),
    };

    let store = TimeoutCounterStore::new(backend, config.timeout);
    store.init().await?;

    info!(
        "Counter store ready: backend={}, timeout={:?}",
        store.backend_name(),
        config.timeout
    );

    Ok(Arc::new(store))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_connect_file_backend() {
        let dir = tempfile::tempdir().unwrap();
        let config = StoreConfig::file(dir.path().join("data.json"));

        let store = connect(&config).await.unwrap();
        assert_eq!(store.backend_name(), "file");
        assert_eq!(store.increment_and_get().await.unwrap(), 1);
        assert_eq!(store.get().await.unwrap(), 1);
    }
}
