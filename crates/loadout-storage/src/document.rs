//! Document store abstraction and in-memory implementation.
//!
//! The repository talks to persistence exclusively through
//! [`DocumentStore`]: find-one-with-identity-excluded, upsert-set-fields,
//! unset-field, and startup index bootstrap. Field arguments are keyed by
//! *storage path* — `group.leaf` with exactly one unescaped dot, as
//! produced by [`crate::codec::key::storage_path`].
//!
//! [`MemoryStore`] backs tests; [`crate::surreal::SurrealStore`] backs
//! deployments.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use serde_json::{Map, Value};

use loadout_core::UserId;

use crate::error::{StoreError, StoreResult};

/// A stored per-user configuration document: top-level fields are
/// groups, each mapping leaf field names to typed values. Identity
/// fields are never part of this map.
pub type Document = Map<String, Value>;

/// Per-user document persistence handle.
///
/// One logical collection, one document per user, unique-indexed by user
/// id. Each mutation is atomic at the per-document level: concurrent
/// writers to disjoint fields never interleave partially, and writes to
/// the same field resolve last-write-wins.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch the user's document, identity fields excluded. `None` when
    /// the user has no document yet.
    async fn find(&self, user: UserId) -> StoreResult<Option<Document>>;

    /// Apply all `fields` (storage path → typed value) to the user's
    /// document in one atomic operation, creating the document if it
    /// does not exist. An empty map still upserts, so a caller issuing
    /// an all-rejected batch leaves an empty document behind — the
    /// behavior the wire API has always had.
    async fn set_fields(&self, user: UserId, fields: HashMap<String, Value>) -> StoreResult<()>;

    /// Remove one storage path from the user's document. Removing an
    /// absent path or targeting an absent document is a no-op; the
    /// document is never created by this call.
    async fn unset_field(&self, user: UserId, path: &str) -> StoreResult<()>;

    /// Bootstrap collection-level definitions (unique user index).
    /// Called once at startup.
    async fn ensure_index(&self) -> StoreResult<()>;
}

/// Split a storage path into its group and leaf parts.
pub(crate) fn split_storage_path(path: &str) -> StoreResult<(&str, &str)> {
    path.split_once('.')
        .ok_or_else(|| StoreError::Query(format!("malformed storage path {path:?}")))
}

/// In-memory [`DocumentStore`] for tests.
///
/// Thread-safe via an internal [`RwLock`]. Documents are keyed by user
/// id outside the map itself, so identity never appears as a field.
#[derive(Default)]
pub struct MemoryStore {
    documents: RwLock<HashMap<i64, Document>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace a user's document wholesale. Test scaffolding for shapes
    /// the write path cannot produce (e.g. a non-object group).
    pub fn insert_document(&self, user: UserId, document: Document) -> StoreResult<()> {
        let mut documents = self.write_lock()?;
        documents.insert(user.as_i64(), document);
        Ok(())
    }

    fn write_lock(&self) -> StoreResult<std::sync::RwLockWriteGuard<'_, HashMap<i64, Document>>> {
        self.documents
            .write()
            .map_err(|e| StoreError::Query(e.to_string()))
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn find(&self, user: UserId) -> StoreResult<Option<Document>> {
        let documents = self
            .documents
            .read()
            .map_err(|e| StoreError::Query(e.to_string()))?;
        Ok(documents.get(&user.as_i64()).cloned())
    }

    async fn set_fields(&self, user: UserId, fields: HashMap<String, Value>) -> StoreResult<()> {
        let mut documents = self.write_lock()?;
        let document = documents.entry(user.as_i64()).or_default();
        for (path, value) in fields {
            let (group, leaf) = split_storage_path(&path)?;
            let slot = document
                .entry(group.to_owned())
                .or_insert_with(|| Value::Object(Map::new()));
            if !slot.is_object() {
                // A scalar group cannot hold leaf fields; the path write wins.
                *slot = Value::Object(Map::new());
            }
            if let Value::Object(map) = slot {
                map.insert(leaf.to_owned(), value);
            }
        }
        Ok(())
    }

    async fn unset_field(&self, user: UserId, path: &str) -> StoreResult<()> {
        let (group, leaf) = split_storage_path(path)?;
        let mut documents = self.write_lock()?;
        if let Some(document) = documents.get_mut(&user.as_i64())
            && let Some(Value::Object(map)) = document.get_mut(group)
        {
            map.remove(leaf);
        }
        Ok(())
    }

    async fn ensure_index(&self) -> StoreResult<()> {
        Ok(())
    }
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(pairs: &[(&str, Value)]) -> HashMap<String, Value> {
        pairs
            .iter()
            .map(|(path, value)| ((*path).to_owned(), value.clone()))
            .collect()
    }

    #[tokio::test]
    async fn set_creates_document_and_groups() {
        let store = MemoryStore::new();
        let user = UserId::new(1);

        store
            .set_fields(user, fields(&[("overlay.hidden", json!(true))]))
            .await
            .unwrap();

        let doc = store.find(user).await.unwrap().unwrap();
        assert_eq!(doc["overlay"]["hidden"], json!(true));
    }

    #[tokio::test]
    async fn set_merges_into_existing_group() {
        let store = MemoryStore::new();
        let user = UserId::new(1);

        store
            .set_fields(user, fields(&[("overlay.hidden", json!(true))]))
            .await
            .unwrap();
        store
            .set_fields(user, fields(&[("overlay.opacity", json!(80))]))
            .await
            .unwrap();

        let doc = store.find(user).await.unwrap().unwrap();
        assert_eq!(doc["overlay"]["hidden"], json!(true));
        assert_eq!(doc["overlay"]["opacity"], json!(80));
    }

    #[tokio::test]
    async fn empty_set_still_creates_document() {
        let store = MemoryStore::new();
        let user = UserId::new(7);

        store.set_fields(user, HashMap::new()).await.unwrap();

        assert!(store.find(user).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn unset_removes_leaf_without_creating_documents() {
        let store = MemoryStore::new();
        let user = UserId::new(1);

        store
            .set_fields(user, fields(&[("overlay.hidden", json!(true))]))
            .await
            .unwrap();
        store.unset_field(user, "overlay.hidden").await.unwrap();

        let doc = store.find(user).await.unwrap().unwrap();
        assert_eq!(doc["overlay"], json!({}));

        // Absent document stays absent.
        let other = UserId::new(2);
        store.unset_field(other, "overlay.hidden").await.unwrap();
        assert!(store.find(other).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn malformed_path_is_rejected() {
        let store = MemoryStore::new();
        let err = store
            .set_fields(UserId::new(1), fields(&[("nodot", json!(1))]))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Query(_)));
    }
}
