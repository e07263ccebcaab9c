//! Configuration repository: reads, upserts, batch upserts, deletes.
//!
//! Stateless per call; every operation validates through the key codec,
//! converts through the value codec, and delegates persistence to the
//! injected [`DocumentStore`]. Atomicity comes entirely from the store's
//! per-document update primitive.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use loadout_core::{ConfigEntry, Configuration, UserId};

use crate::codec::{key, value};
use crate::document::DocumentStore;
use crate::error::{ConfigError, ConfigResult};

/// Per-user configuration repository over an injected document store.
pub struct ConfigRepository {
    store: Arc<dyn DocumentStore>,
    max_value_length: usize,
}

impl ConfigRepository {
    /// Create a repository. `max_value_length` bounds every decoded
    /// value string, in bytes.
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>, max_value_length: usize) -> Self {
        Self {
            store,
            max_value_length,
        }
    }

    /// Fetch a user's full configuration as flat wire entries.
    ///
    /// `Ok(None)` means the user has no configuration document yet — a
    /// valid outcome, not an error. A leaf value that fails to encode is
    /// skipped rather than surfaced, and entry ordering follows storage
    /// iteration order with no guarantee.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Store`] on persistence failure.
    pub async fn find_by_user(&self, user: UserId) -> ConfigResult<Option<Configuration>> {
        let Some(document) = self.store.find(user).await? else {
            return Ok(None);
        };

        let mut entries = Vec::new();
        for (group, fields) in document {
            let serde_json::Value::Object(fields) = fields else {
                debug!(user = %user, group = %group, "skipping non-object group");
                continue;
            };
            for (leaf, typed) in fields {
                match value::encode(&typed) {
                    Ok(encoded) => {
                        entries.push(ConfigEntry::new(key::wire_key(&group, &leaf), encoded));
                    }
                    Err(error) => {
                        debug!(user = %user, group = %group, field = %leaf, %error,
                            "skipping unencodable value");
                    }
                }
            }
        }
        Ok(Some(Configuration::new(entries)))
    }

    /// Upsert a single entry.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::InvalidKey`] — key fails validation; storage is
    ///   never touched.
    /// - [`ConfigError::TooLarge`] / [`ConfigError::InvalidValue`] —
    ///   propagated from the value codec.
    /// - [`ConfigError::Store`] — persistence failure.
    pub async fn save(&self, user: UserId, entry: &ConfigEntry) -> ConfigResult<()> {
        let Some(path) = sanitize(&entry.key) else {
            return Err(ConfigError::InvalidKey(entry.key.clone()));
        };
        let typed = value::decode(&entry.value, self.max_value_length)?;

        let mut fields = HashMap::with_capacity(1);
        fields.insert(path, typed);
        self.store.set_fields(user, fields).await?;
        Ok(())
    }

    /// Upsert a batch of entries, collecting per-entry rejections.
    ///
    /// Entries failing key validation or value decoding are excluded
    /// from the write and reported back by their original wire key; the
    /// surviving entries are applied in one atomic multi-field upsert.
    /// Two wire keys sanitizing to the same storage path resolve
    /// last-processed-wins, silently. An all-rejected batch still
    /// upserts the (then empty) document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Store`] if the combined update fails; the
    /// caller must then treat the whole batch as not durably applied.
    pub async fn save_batch(
        &self,
        user: UserId,
        configuration: &Configuration,
    ) -> ConfigResult<Vec<String>> {
        let mut failed_keys = Vec::new();
        let mut fields = HashMap::new();

        for entry in &configuration.config {
            let Some(path) = sanitize(&entry.key) else {
                failed_keys.push(entry.key.clone());
                continue;
            };
            match value::decode(&entry.value, self.max_value_length) {
                Ok(typed) => {
                    fields.insert(path, typed);
                }
                Err(error) => {
                    debug!(user = %user, key = %entry.key, %error, "rejecting batch entry");
                    failed_keys.push(entry.key.clone());
                }
            }
        }

        self.store.set_fields(user, fields).await?;
        Ok(failed_keys)
    }

    /// Remove a single key from a user's configuration.
    ///
    /// Deleting a key that does not exist (or a document that does not
    /// exist) succeeds — the unset is idempotent at the storage layer.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::InvalidKey`] — key fails validation; storage is
    ///   never touched.
    /// - [`ConfigError::Store`] — persistence failure.
    pub async fn delete_key(&self, user: UserId, key: &str) -> ConfigResult<()> {
        let Some(path) = sanitize(key) else {
            return Err(ConfigError::InvalidKey(key.to_owned()));
        };
        self.store.unset_field(user, &path).await?;
        Ok(())
    }
}

impl std::fmt::Debug for ConfigRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigRepository")
            .field("max_value_length", &self.max_value_length)
            .finish_non_exhaustive()
    }
}

/// Validate a wire key and map it to its storage path.
fn sanitize(wire_key: &str) -> Option<String> {
    if key::is_valid_key(wire_key) {
        key::storage_path(wire_key)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::MemoryStore;
    use serde_json::json;

    const MAX: usize = 262_144;

    fn repository() -> (Arc<MemoryStore>, ConfigRepository) {
        let store = Arc::new(MemoryStore::new());
        let repository = ConfigRepository::new(Arc::clone(&store) as Arc<dyn DocumentStore>, MAX);
        (store, repository)
    }

    fn entry_for<'a>(configuration: &'a Configuration, key: &str) -> Option<&'a ConfigEntry> {
        configuration.config.iter().find(|e| e.key == key)
    }

    #[tokio::test]
    async fn read_after_write() {
        let (_, repo) = repository();
        let user = UserId::new(1000);

        repo.save(user, &ConfigEntry::new("g.l", "42")).await.unwrap();

        let configuration = repo.find_by_user(user).await.unwrap().unwrap();
        assert_eq!(entry_for(&configuration, "g.l").unwrap().value, "42");
    }

    #[tokio::test]
    async fn missing_document_is_not_an_error() {
        let (_, repo) = repository();
        assert!(repo.find_by_user(UserId::new(404)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn save_rejects_invalid_keys_before_storage() {
        let (store, repo) = repository();
        let user = UserId::new(1);

        for bad in ["", "$x.y", "_x.y", "noDot"] {
            let err = repo.save(user, &ConfigEntry::new(bad, "1")).await.unwrap_err();
            assert!(matches!(err, ConfigError::InvalidKey(_)), "key {bad:?}");
        }
        // Nothing reached the store, not even an upsert of an empty document.
        assert!(store.find(user).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn save_propagates_value_errors() {
        let (_, repo) = repository();
        let user = UserId::new(1);

        let err = repo
            .save(user, &ConfigEntry::new("g.l", "{\"unterminated\":"))
            .await
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(_)));

        let repo_small = ConfigRepository::new(Arc::new(MemoryStore::new()), 8);
        let err = repo_small
            .save(user, &ConfigEntry::new("g.l", "waaaaaaay too long"))
            .await
            .unwrap_err();
        assert!(matches!(err, ConfigError::TooLarge { max: 8, .. }));
    }

    #[tokio::test]
    async fn typed_values_survive_the_document_round_trip() {
        let (_, repo) = repository();
        let user = UserId::new(2);

        let entries = [
            ("account.displayName", "MITCHELL"),
            ("killcount.vorkath", "1251"),
            ("overlay.hidden", "true"),
            ("pets.owned", "[\"NOON\",\"PET_SMOKE_DEVIL\",\"VORKI\"]"),
        ];
        for (key, value) in entries {
            repo.save(user, &ConfigEntry::new(key, value)).await.unwrap();
        }

        let configuration = repo.find_by_user(user).await.unwrap().unwrap();
        for (key, value) in entries {
            assert_eq!(entry_for(&configuration, key).unwrap().value, value);
        }
    }

    #[tokio::test]
    async fn batch_partial_failure() {
        let (_, repo) = repository();
        let user = UserId::new(3);

        let batch = Configuration::new(vec![
            ConfigEntry::new("$bad.x", "1"),
            ConfigEntry::new("ok.y", "2"),
        ]);
        let failed = repo.save_batch(user, &batch).await.unwrap();
        assert_eq!(failed, vec!["$bad.x".to_owned()]);

        let configuration = repo.find_by_user(user).await.unwrap().unwrap();
        assert_eq!(entry_for(&configuration, "ok.y").unwrap().value, "2");
        assert_eq!(configuration.len(), 1);
    }

    #[tokio::test]
    async fn batch_collision_is_last_processed_wins() {
        let (_, repo) = repository();
        let user = UserId::new(4);

        // Both keys sanitize to storage path `a.b:c`. No dedup error; the
        // later entry overwrites.
        let batch = Configuration::new(vec![
            ConfigEntry::new("a.b.c", "\"first\""),
            ConfigEntry::new("a.b:c", "\"second\""),
        ]);
        let failed = repo.save_batch(user, &batch).await.unwrap();
        assert!(failed.is_empty());

        let configuration = repo.find_by_user(user).await.unwrap().unwrap();
        assert_eq!(configuration.len(), 1);
        assert_eq!(entry_for(&configuration, "a.b:c").unwrap().value, "second");
    }

    #[tokio::test]
    async fn leaf_dots_are_lossy_on_read() {
        let (_, repo) = repository();
        let user = UserId::new(5);

        repo.save(user, &ConfigEntry::new("grandexchange.buylimit.4151", "100"))
            .await
            .unwrap();

        let configuration = repo.find_by_user(user).await.unwrap().unwrap();
        assert!(entry_for(&configuration, "grandexchange.buylimit.4151").is_none());
        assert_eq!(
            entry_for(&configuration, "grandexchange.buylimit:4151").unwrap().value,
            "100"
        );
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let (_, repo) = repository();
        let user = UserId::new(6);

        repo.save(user, &ConfigEntry::new("g.l", "42")).await.unwrap();
        repo.delete_key(user, "g.l").await.unwrap();
        repo.delete_key(user, "g.l").await.unwrap();

        let configuration = repo.find_by_user(user).await.unwrap().unwrap();
        assert!(entry_for(&configuration, "g.l").is_none());
    }

    #[tokio::test]
    async fn delete_rejects_invalid_keys() {
        let (_, repo) = repository();
        let err = repo.delete_key(UserId::new(1), "_hidden.x").await.unwrap_err();
        assert!(matches!(err, ConfigError::InvalidKey(_)));
    }

    #[tokio::test]
    async fn non_object_groups_are_skipped_on_read() {
        let (store, repo) = repository();
        let user = UserId::new(7);

        let mut document = serde_json::Map::new();
        document.insert("stray".to_owned(), json!(17));
        document.insert("overlay".to_owned(), json!({"hidden": true}));
        store.insert_document(user, document).unwrap();

        let configuration = repo.find_by_user(user).await.unwrap().unwrap();
        assert_eq!(configuration.len(), 1);
        assert_eq!(entry_for(&configuration, "overlay.hidden").unwrap().value, "true");
    }
}
