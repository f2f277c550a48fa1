//! # File Counter Store
//!
//! Keeps the counter in a small JSON document (`{"count": N}`).
//! Suited to single-process deployments; increments are serialized by a lock
//! held for the whole read-modify-write, and each write replaces the file
//! atomically via rename.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tally_core::{CounterStore, TallyError, TallyResult};
use tempfile::NamedTempFile;
use tokio::sync::Mutex;
use tracing::{debug, info};

#[derive(Debug, Default, Serialize, Deserialize)]
struct CounterDocument {
    #[serde(default)]
    count: i64,
}

/// JSON-file backed counter
pub struct FileCounterStore {
    path: PathBuf,
    lock: Arc<Mutex<()>>,
}

impl FileCounterStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Run `op` on a blocking thread while holding the store lock.
    ///
    /// The lock guard moves into the blocking task, so a caller that gives
    /// up (timeout, dropped request) cannot release the lock before the
    /// file operation it started has finished.
    async fn locked<T, F>(&self, op: F) -> TallyResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&Path) -> TallyResult<T> + Send + 'static,
    {
        let guard = self.lock.clone().lock_owned().await;
        let path = self.path.clone();

        tokio::task::spawn_blocking(move || {
            let _guard = guard;
            op(&path)
        })
        .await
        .map_err(|e| TallyError::Storage(format!("Counter file task failed: {}", e)))?
    }
}

fn read_document(path: &Path) -> TallyResult<CounterDocument> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| TallyError::Storage(format!("Failed to read {}: {}", path.display(), e)))?;

    let document: CounterDocument = serde_json::from_str(&raw).map_err(|e| {
        TallyError::Storage(format!("Corrupt counter file {}: {}", path.display(), e))
    })?;

    if document.count < 0 {
        return Err(TallyError::Storage(format!(
            "Negative count in {}",
            path.display()
        )));
    }

    Ok(document)
}

/// Write to a uniquely named temp file beside `path`, then rename over it
fn write_document(path: &Path, document: &CounterDocument) -> TallyResult<()> {
    let body = serde_json::to_string_pretty(document)
        .map_err(|e| TallyError::Serialization(e.to_string()))?;

    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let mut temp = NamedTempFile::new_in(dir).map_err(|e| {
        TallyError::Storage(format!("Failed to create temp file in {}: {}", dir.display(), e))
    })?;
    temp.write_all(body.as_bytes())
        .and_then(|_| temp.as_file().sync_all())
        .map_err(|e| TallyError::Storage(format!("Failed to write temp file: {}", e)))?;
    temp.persist(path).map_err(|e| {
        TallyError::Storage(format!("Failed to replace {}: {}", path.display(), e))
    })?;

    Ok(())
}

#[async_trait]
impl CounterStore for FileCounterStore {
    async fn init(&self) -> TallyResult<()> {
        self.locked(|path| {
            if path.exists() {
                // A damaged file is reported, never reset to zero
                let document = read_document(path)?;
                debug!("Counter file {} holds {}", path.display(), document.count);
                return Ok(());
            }

            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent).map_err(|e| TallyError::Storage(e.to_string()))?;
            }

            write_document(path, &CounterDocument::default())?;
            info!("Created counter file {}", path.display());
            Ok(())
        })
        .await
    }

    async fn increment_and_get(&self) -> TallyResult<i64> {
        self.locked(|path| {
            let mut document = read_document(path)?;
            document.count = document.count.checked_add(1).ok_or_else(|| {
                TallyError::Storage(format!("Counter in {} would overflow", path.display()))
            })?;
            write_document(path, &document)?;

            Ok(document.count)
        })
        .await
    }

    async fn get(&self) -> TallyResult<i64> {
        self.locked(|path| Ok(read_document(path)?.count)).await
    }

    fn backend_name(&self) -> &'static str {
        "file"
    }
}
