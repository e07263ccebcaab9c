//! Session token lookup and last-used tracking.
//!
//! The configuration repository never touches sessions; only the
//! gateway's auth layer resolves tokens through [`SessionStore`]. The
//! `session` table maps an opaque token to the numeric user id, with a
//! last-used timestamp refreshed best-effort when cached tokens are
//! evicted.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;

use loadout_core::{SessionToken, UserId};

use crate::db::{Database, with_deadline};
use crate::error::{StoreError, StoreResult};

/// Table mapping session tokens to user ids.
const SESSION_TABLE: &str = "session";

/// Token → user lookup with a best-effort last-used side channel.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Resolve a token to its user id, or `None` for an unknown token.
    async fn find_user_by_token(&self, token: &SessionToken) -> StoreResult<Option<UserId>>;

    /// Record that a session was recently used. Callers treat failures
    /// as non-fatal.
    async fn touch_last_used(&self, token: &SessionToken) -> StoreResult<()>;
}

/// SurrealDB-backed session store over a unique-indexed `session` table.
pub struct SurrealSessionStore {
    client: surrealdb::Surreal<surrealdb::engine::any::Any>,
    deadline: Duration,
}

impl SurrealSessionStore {
    /// Create a store over an existing connection. `deadline` bounds
    /// every storage call.
    #[must_use]
    pub fn new(db: &Database, deadline: Duration) -> Self {
        Self {
            client: db.client().clone(),
            deadline,
        }
    }

    /// Define the unique token index. Called once at startup.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the definition statement fails.
    pub async fn ensure_index(&self) -> StoreResult<()> {
        let client = self.client.clone();
        with_deadline(self.deadline, async move {
            client
                .query(format!(
                    "DEFINE INDEX IF NOT EXISTS session_token ON TABLE {SESSION_TABLE} FIELDS token UNIQUE"
                ))
                .await
                .map_err(query_err)?
                .check()
                .map_err(query_err)?;
            Ok(())
        })
        .await
    }
}

fn query_err(e: surrealdb::Error) -> StoreError {
    StoreError::Query(e.to_string())
}

#[async_trait]
impl SessionStore for SurrealSessionStore {
    async fn find_user_by_token(&self, token: &SessionToken) -> StoreResult<Option<UserId>> {
        let client = self.client.clone();
        let token = token.as_str().to_owned();
        with_deadline(self.deadline, async move {
            let mut response = client
                .query(format!(
                    "SELECT user FROM {SESSION_TABLE} WHERE token = $token LIMIT 1"
                ))
                .bind(("token", token))
                .await
                .map_err(query_err)?;
            let user: Option<i64> = response.take((0, "user")).map_err(query_err)?;
            Ok(user.map(UserId::new))
        })
        .await
    }

    async fn touch_last_used(&self, token: &SessionToken) -> StoreResult<()> {
        let client = self.client.clone();
        let token = token.as_str().to_owned();
        with_deadline(self.deadline, async move {
            client
                .query(format!(
                    "UPDATE {SESSION_TABLE} SET last_used = $now WHERE token = $token"
                ))
                .bind(("token", token))
                .bind(("now", Utc::now()))
                .await
                .map_err(query_err)?
                .check()
                .map_err(query_err)?;
            Ok(())
        })
        .await
    }
}

impl std::fmt::Debug for SurrealSessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SurrealSessionStore").finish_non_exhaustive()
    }
}
