//! Configuration key validation and storage-path mapping.
//!
//! A wire key is dot-namespaced: the segment before the first `.` is the
//! group (a top-level document field) and everything after it is the
//! leaf. The storage engine reserves `.` as a path separator and `$`/`_`
//! as field prefixes, so keys are checked and sanitized before they ever
//! reach a document update.

/// Whether a wire key is storage-eligible.
///
/// A key is valid when it is non-empty, does not start with the reserved
/// `$` or `_` prefixes, and has a `group.leaf` structure (at least one
/// `.`).
#[must_use]
pub fn is_valid_key(key: &str) -> bool {
    !key.is_empty() && !key.starts_with('$') && !key.starts_with('_') && key.contains('.')
}

/// Map a wire key to its storage field path.
///
/// Splits on the first `.` only; any further `.` inside the leaf segment
/// is replaced with `:` (the engine would otherwise treat it as a path
/// separator). Returns `None` for keys with no `.` at all. Reserved
/// prefixes are NOT checked here — call [`is_valid_key`] first; skipping
/// validation risks writing into reserved namespaces.
#[must_use]
pub fn storage_path(key: &str) -> Option<String> {
    let (group, leaf) = key.split_once('.')?;
    Some(format!("{group}.{}", leaf.replace('.', ":")))
}

/// Reconstruct a wire key from a stored group and leaf field name.
///
/// `:` is not substituted back to `.`: a leaf written as `a.b.c` reads
/// back as `a.b:c`. Reversing would conflate a literal `:` with an
/// escaped `.`, so the round trip stays lossy.
#[must_use]
pub fn wire_key(group: &str, leaf_field: &str) -> String {
    format!("{group}.{leaf_field}")
}
