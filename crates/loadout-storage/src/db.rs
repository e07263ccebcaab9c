//! `SurrealDB` connection handle.
//!
//! [`Database`] wraps a `SurrealDB` connection for the configuration and
//! session tables. The endpoint string selects the engine:
//!
//! | Mode | Connection | Backend |
//! |------|-----------|---------|
//! | Embedded | `surrealkv://path/to/data` | `SurrealKV` |
//! | Tests | `mem://` | In-memory |
//!
//! The handle is cheap to clone into per-table stores; it owns no
//! process-wide state and is injected wherever storage is needed.

use std::future::Future;
use std::time::Duration;

use crate::error::{StoreError, StoreResult};

/// `SurrealDB` connection wrapper.
pub struct Database {
    inner: surrealdb::Surreal<surrealdb::engine::any::Any>,
}

impl Database {
    /// Connect to the given endpoint and select a namespace and
    /// database.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Connection`] if the connection or the
    /// namespace selection fails.
    pub async fn connect(endpoint: &str, namespace: &str, database: &str) -> StoreResult<Self> {
        let db: surrealdb::Surreal<surrealdb::engine::any::Any> = surrealdb::Surreal::init();
        db.connect(endpoint)
            .await
            .map_err(|e: surrealdb::Error| StoreError::Connection(e.to_string()))?;
        db.use_ns(namespace)
            .use_db(database)
            .await
            .map_err(|e: surrealdb::Error| StoreError::Connection(e.to_string()))?;
        Ok(Self { inner: db })
    }

    /// Connect to an in-memory engine (for tests).
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Connection`] if the connection fails.
    pub async fn connect_memory() -> StoreResult<Self> {
        Self::connect("mem://", "loadout", "test").await
    }

    /// Get a reference to the underlying `SurrealDB` client.
    #[must_use]
    pub fn client(&self) -> &surrealdb::Surreal<surrealdb::engine::any::Any> {
        &self.inner
    }
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database").finish_non_exhaustive()
    }
}

/// Bound a storage call by a deadline.
///
/// Timeouts are indistinguishable from any other persistence failure to
/// callers; no retry happens at this layer.
pub(crate) async fn with_deadline<T, F>(deadline: Duration, fut: F) -> StoreResult<T>
where
    F: Future<Output = StoreResult<T>>,
{
    match tokio::time::timeout(deadline, fut).await {
        Ok(result) => result,
        Err(_) => Err(StoreError::Timeout(format!(
            "storage call exceeded {}ms",
            deadline.as_millis()
        ))),
    }
}
