//! Loadout Storage — configuration document codec and repository.
//!
//! The bidirectional mapping between a flat list of string-keyed,
//! string-valued entries (the wire representation) and a nested,
//! heterogeneously-typed per-user document (the storage representation),
//! plus the repository orchestrating reads, single-key writes, batch
//! writes with partial-failure collection, and deletes.
//!
//! # Layering
//!
//! - [`codec`] — the key and value codecs (pure, no I/O).
//! - [`document`] — the [`DocumentStore`] seam plus [`MemoryStore`] for
//!   tests.
//! - [`surreal`] — the `SurrealDB` production store.
//! - [`session`] — token → user resolution for the gateway's auth layer.
//! - [`repository`] — [`ConfigRepository`], the inbound surface.
//!
//! The repository owns no process-wide state: the store handle is
//! injected at construction.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod codec;
pub mod db;
pub mod document;
pub mod error;
pub mod repository;
pub mod session;
pub mod surreal;

pub use db::Database;
pub use document::{Document, DocumentStore, MemoryStore};
pub use error::{ConfigError, ConfigResult, StoreError, StoreResult};
pub use repository::ConfigRepository;
pub use session::{SessionStore, SurrealSessionStore};
pub use surreal::SurrealStore;
