//! Token authentication with a bounded session cache.
//!
//! Every request carries an opaque session token; resolving it through
//! the session store on each call would put the session table on the
//! hot path, so resolved tokens are cached with a TTL. Evicting a
//! cached token fires a best-effort write-back of the session's
//! last-used timestamp, detached from the request that triggered the
//! eviction.

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use tracing::warn;

use loadout_core::{SessionToken, UserId};
use loadout_storage::{SessionStore, StoreResult};

struct CachedSession {
    user: UserId,
    cached_at: Instant,
}

impl CachedSession {
    fn is_fresh(&self, ttl: Duration) -> bool {
        self.cached_at.elapsed() < ttl
    }
}

/// Bounded TTL cache in front of a [`SessionStore`].
pub struct SessionCache {
    store: Arc<dyn SessionStore>,
    entries: DashMap<String, CachedSession>,
    capacity: usize,
    ttl: Duration,
}

impl SessionCache {
    /// Create a cache holding at most `capacity` resolved tokens, each
    /// fresh for `ttl`.
    #[must_use]
    pub fn new(store: Arc<dyn SessionStore>, capacity: usize, ttl: Duration) -> Self {
        Self {
            store,
            entries: DashMap::new(),
            capacity,
            ttl,
        }
    }

    /// Resolve a token to its user id.
    ///
    /// An empty token is always unauthorized and never reaches the
    /// store. A fresh cache hit short-circuits; otherwise the store is
    /// consulted and a positive result cached. `Ok(None)` means the
    /// token is unknown.
    ///
    /// # Errors
    ///
    /// Propagates session store failures; the caller maps them to an
    /// internal error, distinct from unauthorized.
    pub async fn user_id(&self, token: &SessionToken) -> StoreResult<Option<UserId>> {
        if token.is_empty() {
            return Ok(None);
        }
        if let Some(cached) = self.entries.get(token.as_str())
            && cached.is_fresh(self.ttl)
        {
            return Ok(Some(cached.user));
        }

        match self.store.find_user_by_token(token).await? {
            Some(user) => {
                self.insert(token, user);
                Ok(Some(user))
            }
            None => {
                // A stale mapping for a since-revoked session must not
                // linger until TTL expiry.
                self.entries.remove(token.as_str());
                Ok(None)
            }
        }
    }

    fn insert(&self, token: &SessionToken, user: UserId) {
        if self.entries.len() >= self.capacity {
            self.evict();
        }
        self.entries.insert(
            token.as_str().to_owned(),
            CachedSession {
                user,
                cached_at: Instant::now(),
            },
        );
    }

    /// Drop expired entries, then the oldest entry if the cache is
    /// still full. Every evicted token gets a detached last-used
    /// write-back.
    fn evict(&self) {
        let mut evicted = Vec::new();
        self.entries.retain(|token, cached| {
            if cached.is_fresh(self.ttl) {
                true
            } else {
                evicted.push(token.clone());
                false
            }
        });

        if self.entries.len() >= self.capacity {
            let oldest = self
                .entries
                .iter()
                .min_by_key(|entry| entry.value().cached_at)
                .map(|entry| entry.key().clone());
            if let Some(token) = oldest {
                self.entries.remove(&token);
                evicted.push(token);
            }
        }

        for token in evicted {
            let store = Arc::clone(&self.store);
            tokio::spawn(async move {
                if let Err(error) = store.touch_last_used(&SessionToken::new(token)).await {
                    warn!(%error, "failed to record session last-used");
                }
            });
        }
    }
}

impl std::fmt::Debug for SessionCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionCache")
            .field("capacity", &self.capacity)
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}
