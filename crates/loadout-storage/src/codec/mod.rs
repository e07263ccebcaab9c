//! Bidirectional mapping between wire-form configuration entries and
//! their stored representation.
//!
//! Two independent codecs:
//!
//! - [`key`] — validates dot-namespaced wire keys and converts them to
//!   storage-safe field paths (and back).
//! - [`value`] — converts a value between its canonical string wire form
//!   and a typed storage form ([`serde_json::Value`]), using a
//!   best-effort JSON classifier.
//!
//! Neither codec touches storage; the repository composes them.

pub mod key;
pub mod value;
