//! # Counter Store
//!
//! The single persisted counter, incremented once per verified payment.
//!
//! Backends (file, Postgres) live in `tally-store`; this module only defines
//! the contract and a timeout decorator shared by all of them.
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │            CounterStore (trait)             │
//! │  ├── init()                                 │
//! │  ├── increment_and_get()                    │
//! │  └── get()                                  │
//! └─────────────────────────────────────────────┘
//!                       ▲
//!          ┌────────────┴────────────┐
//!  ┌───────┴────────┐       ┌────────┴────────┐
//!  │FileCounterStore│       │PostgresCounter- │
//!  │                │       │     Store       │
//!  └────────────────┘       └─────────────────┘
//! ```

use crate::error::{TallyError, TallyResult};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// Identifier of the singleton counter row
pub const COUNTER_ROW_ID: i32 = 1;

/// Contract for the persisted counter.
///
/// Implementations must make `increment_and_get` atomic: concurrent callers
/// never lose an update, and each caller observes the value produced by its
/// own increment.
#[async_trait]
pub trait CounterStore: Send + Sync {
    /// Ensure the singleton counter exists, creating it at zero if absent.
    /// Must be idempotent across restarts.
    async fn init(&self) -> TallyResult<()>;

    /// Add one to the counter and return the new value.
    async fn increment_and_get(&self) -> TallyResult<i64>;

    /// Read the current value without mutating it.
    async fn get(&self) -> TallyResult<i64>;

    /// Backend name (for logging and health output).
    fn backend_name(&self) -> &'static str;
}

/// Type alias for a shared counter store (dynamic dispatch)
pub type BoxedCounterStore = Arc<dyn CounterStore>;

/// Bounds every call on the inner store with a timeout.
///
/// An elapsed timeout surfaces as `TallyError::Storage`, never as a stale value.
pub struct TimeoutCounterStore {
    inner: BoxedCounterStore,
    timeout: Duration,
}

impl TimeoutCounterStore {
    pub fn new(inner: BoxedCounterStore, timeout: Duration) -> Self {
        Self { inner, timeout }
    }

    async fn bounded<T>(
        &self,
        operation: &str,
        fut: impl std::future::Future<Output = TallyResult<T>> + Send,
    ) -> TallyResult<T> {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(TallyError::Storage(format!(
                "{} on {} timed out after {:?}",
                operation,
                self.inner.backend_name(),
                self.timeout
            ))),
        }
    }
}

#[async_trait]
impl CounterStore for TimeoutCounterStore {
    async fn init(&self) -> TallyResult<()> {
        self.bounded("init", self.inner.init()).await
    }

    async fn increment_and_get(&self) -> TallyResult<i64> {
        self.bounded("increment", self.inner.increment_and_get()).await
    }

    async fn get(&self) -> TallyResult<i64> {
        self.bounded("read", self.inner.get()).await
    }

    fn backend_name(&self) -> &'static str {
        self.inner.backend_name()
    }
}
