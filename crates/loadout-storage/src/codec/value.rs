//! Configuration value encoding and decoding.
//!
//! The API is string-only so clients can send unquoted scalars and
//! literals economically, but the store benefits from native numeric,
//! boolean, array, and object types for later querying. The classifier
//! below trades full JSON validation for speed on the common case: a
//! plain string never reaches the parser.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::error::{ConfigError, ConfigResult};

/// Fast pre-check for whether a value string should be parsed as JSON.
///
/// The alternation is unanchored on `true`/`false`, so those literals
/// match anywhere in the text, not only at the start. Ordinary prose
/// containing the word "true" is therefore classified JSON-like and
/// rejected when the parse fails. Kept byte-for-byte for compatibility
/// with data written by earlier deployments.
static MAYBE_JSON: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^[-0-9{\["]|true|false"#).expect("maybe-json pattern is valid")
});

/// Encode a typed stored value to its canonical string wire form.
///
/// A plain string is returned unchanged (no quoting); every other
/// variant becomes its compact JSON text.
///
/// # Errors
///
/// Returns the underlying serializer error if the value cannot be
/// rendered as JSON. The read path treats this as a skippable entry.
pub fn encode(value: &Value) -> Result<String, serde_json::Error> {
    match value {
        Value::String(s) => Ok(s.clone()),
        other => serde_json::to_string(other),
    }
}

/// Decode a string wire value into its typed stored form.
///
/// The length guard runs first so oversized payloads are rejected before
/// any parse attempt. JSON-like strings must then parse fully; anything
/// else is stored verbatim as a string.
///
/// # Errors
///
/// - [`ConfigError::TooLarge`] if the string exceeds `max_len` bytes.
/// - [`ConfigError::InvalidValue`] if the string is JSON-like but fails
///   to parse.
pub fn decode(raw: &str, max_len: usize) -> ConfigResult<Value> {
    if raw.len() > max_len {
        return Err(ConfigError::TooLarge {
            len: raw.len(),
            max: max_len,
        });
    }
    if MAYBE_JSON.is_match(raw) {
        serde_json::from_str(raw).map_err(|e| ConfigError::InvalidValue(e.to_string()))
    } else {
        Ok(Value::String(raw.to_owned()))
    }
}
