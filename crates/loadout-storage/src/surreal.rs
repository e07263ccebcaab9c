//! SurrealDB-backed [`DocumentStore`].
//!
//! One record per user in the `config` table, keyed by the numeric user
//! id (`config:<id>`), so record identity doubles as the unique user
//! index and never appears as a document field. Each operation is a
//! single SurrealQL statement — atomic at the record level — bounded by
//! the configured deadline.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Map, Value};

use loadout_core::UserId;

use crate::db::{Database, with_deadline};
use crate::document::{Document, DocumentStore, split_storage_path};
use crate::error::{StoreError, StoreResult};

/// Table holding one configuration document per user.
const CONFIG_TABLE: &str = "config";

/// SurrealDB-backed document store.
pub struct SurrealStore {
    client: surrealdb::Surreal<surrealdb::engine::any::Any>,
    deadline: Duration,
}

impl SurrealStore {
    /// Create a store over an existing connection. `deadline` bounds
    /// every storage call.
    #[must_use]
    pub fn new(db: &Database, deadline: Duration) -> Self {
        Self {
            client: db.client().clone(),
            deadline,
        }
    }
}

fn query_err(e: surrealdb::Error) -> StoreError {
    StoreError::Query(e.to_string())
}

/// Nest storage paths into the `{group: {leaf: value}}` document shape
/// expected by a record-level merge. Colliding paths resolve by map
/// insertion: the last one written wins.
fn nest_fields(fields: HashMap<String, Value>) -> StoreResult<Document> {
    let mut document = Map::new();
    for (path, value) in fields {
        let (group, leaf) = split_storage_path(&path)?;
        let slot = document
            .entry(group.to_owned())
            .or_insert_with(|| Value::Object(Map::new()));
        if let Value::Object(map) = slot {
            map.insert(leaf.to_owned(), value);
        }
    }
    Ok(document)
}

/// Escape a field name for inline use in a SurrealQL statement.
fn escape_ident(name: &str) -> String {
    format!("`{}`", name.replace('\\', "\\\\").replace('`', "\\`"))
}

#[async_trait]
impl DocumentStore for SurrealStore {
    async fn find(&self, user: UserId) -> StoreResult<Option<Document>> {
        let client = self.client.clone();
        with_deadline(self.deadline, async move {
            let mut response = client
                .query(format!(
                    "SELECT * OMIT id FROM type::thing('{CONFIG_TABLE}', $user)"
                ))
                .bind(("user", user.as_i64()))
                .await
                .map_err(query_err)?;
            let document: Option<Value> = response.take(0).map_err(query_err)?;
            match document {
                None | Some(Value::Null) => Ok(None),
                Some(Value::Object(map)) => Ok(Some(map)),
                Some(other) => Err(StoreError::Serialization(format!(
                    "expected document object, got {other}"
                ))),
            }
        })
        .await
    }

    async fn set_fields(&self, user: UserId, fields: HashMap<String, Value>) -> StoreResult<()> {
        let document = nest_fields(fields)?;
        let client = self.client.clone();
        with_deadline(self.deadline, async move {
            client
                .query(format!(
                    "UPSERT type::thing('{CONFIG_TABLE}', $user) MERGE $data"
                ))
                .bind(("user", user.as_i64()))
                .bind(("data", Value::Object(document)))
                .await
                .map_err(query_err)?
                .check()
                .map_err(query_err)?;
            Ok(())
        })
        .await
    }

    async fn unset_field(&self, user: UserId, path: &str) -> StoreResult<()> {
        let (group, leaf) = split_storage_path(path)?;
        // Field names cannot be bound as parameters; escaped inline.
        let statement = format!(
            "UPDATE type::thing('{CONFIG_TABLE}', $user) UNSET {}.{}",
            escape_ident(group),
            escape_ident(leaf)
        );
        let client = self.client.clone();
        with_deadline(self.deadline, async move {
            client
                .query(statement)
                .bind(("user", user.as_i64()))
                .await
                .map_err(query_err)?
                .check()
                .map_err(query_err)?;
            Ok(())
        })
        .await
    }

    async fn ensure_index(&self) -> StoreResult<()> {
        let client = self.client.clone();
        with_deadline(self.deadline, async move {
            client
                .query(format!("DEFINE TABLE IF NOT EXISTS {CONFIG_TABLE} SCHEMALESS"))
                .await
                .map_err(query_err)?
                .check()
                .map_err(query_err)?;
            Ok(())
        })
        .await
    }
}

impl std::fmt::Debug for SurrealStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SurrealStore").finish_non_exhaustive()
    }
}
