//! Common types used throughout Loadout.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Internal numeric identifier for a user account.
///
/// Assigned by the account system and carried in the session table; the
/// configuration store treats it as opaque. One stored configuration
/// document exists per `UserId`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub i64);

impl UserId {
    /// Create a user ID from its raw numeric form.
    #[must_use]
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// The raw numeric form.
    #[must_use]
    pub fn as_i64(self) -> i64 {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "user:{}", self.0)
    }
}

/// Opaque session token presented by a client on every request.
///
/// Resolved to a [`UserId`] by the session store. Never logged in full;
/// `Display` shows a truncated prefix only.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionToken(pub String);

impl SessionToken {
    /// Wrap a raw token string.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The raw token string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the token is empty (always unauthorized).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = self.0.get(..8).unwrap_or("");
        write!(f, "token:{prefix}…")
    }
}

/// A single configuration entry as seen on the wire.
///
/// `key` is the externally visible dot-namespaced identifier (e.g.
/// `overlay.tooltipHidden`); `value` is always a string at the API
/// boundary, regardless of its semantic type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigEntry {
    /// Dot-namespaced configuration key.
    pub key: String,
    /// String-encoded value.
    pub value: String,
}

impl ConfigEntry {
    /// Build an entry from a key and a string-encoded value.
    #[must_use]
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// A full configuration payload: a set of entries, unique by key,
/// order irrelevant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Configuration {
    /// The configuration entries.
    pub config: Vec<ConfigEntry>,
}

impl Configuration {
    /// Build a configuration from a list of entries.
    #[must_use]
    pub fn new(config: Vec<ConfigEntry>) -> Self {
        Self { config }
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.config.len()
    }

    /// Whether the payload has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.config.is_empty()
    }
}
