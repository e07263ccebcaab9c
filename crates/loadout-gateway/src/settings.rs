//! Process configuration.
//!
//! The gateway is configured from the environment (or equivalent
//! command-line flags), matching how it is deployed: one container, one
//! environment block, no config files.

use std::net::SocketAddr;
use std::time::Duration;

use clap::Parser;

/// Gateway process settings.
#[derive(Debug, Clone, Parser)]
#[command(name = "loadout-gateway", version, about = "Per-user configuration store gateway")]
pub struct Settings {
    /// Socket address the RPC server binds to.
    #[arg(long, env = "LOADOUT_BIND_ADDR", default_value = "127.0.0.1:8080")]
    pub bind_addr: SocketAddr,

    /// Database endpoint (`surrealkv://<path>` embedded, `mem://` for
    /// smoke tests).
    #[arg(long, env = "LOADOUT_DB_ENDPOINT", default_value = "surrealkv://loadout-data")]
    pub db_endpoint: String,

    /// Database namespace.
    #[arg(long, env = "LOADOUT_DB_NAMESPACE", default_value = "loadout")]
    pub db_namespace: String,

    /// Database name.
    #[arg(long, env = "LOADOUT_DB_NAME", default_value = "main")]
    pub db_name: String,

    /// Maximum RPC request body size in bytes.
    #[arg(long, env = "LOADOUT_MAX_PAYLOAD_BYTES", default_value_t = 5_242_880)]
    pub max_payload_bytes: u32,

    /// Maximum length of a single configuration value string, in bytes.
    #[arg(long, env = "LOADOUT_MAX_VALUE_LENGTH", default_value_t = 262_144)]
    pub max_value_length: usize,

    /// Deadline for each storage call, in seconds.
    #[arg(long, env = "LOADOUT_STORAGE_TIMEOUT_SECS", default_value_t = 3)]
    pub storage_timeout_secs: u64,

    /// Maximum number of resolved session tokens held in the auth
    /// cache.
    #[arg(long, env = "LOADOUT_SESSION_CACHE_SIZE", default_value_t = 10_000)]
    pub session_cache_size: usize,

    /// Freshness window for cached session tokens, in seconds.
    #[arg(long, env = "LOADOUT_SESSION_CACHE_TTL_SECS", default_value_t = 300)]
    pub session_cache_ttl_secs: u64,
}

impl Settings {
    /// Storage call deadline as a [`Duration`].
    #[must_use]
    pub fn storage_timeout(&self) -> Duration {
        Duration::from_secs(self.storage_timeout_secs)
    }

    /// Session cache TTL as a [`Duration`].
    #[must_use]
    pub fn session_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.session_cache_ttl_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_deployment_expectations() {
        let settings = Settings::parse_from(["loadout-gateway"]);
        assert_eq!(settings.max_payload_bytes, 5_242_880);
        assert_eq!(settings.max_value_length, 262_144);
        assert_eq!(settings.storage_timeout(), Duration::from_secs(3));
        assert_eq!(settings.session_cache_size, 10_000);
    }

    #[test]
    fn flags_override_defaults() {
        let settings = Settings::parse_from([
            "loadout-gateway",
            "--bind-addr",
            "0.0.0.0:9090",
            "--max-value-length",
            "128",
        ]);
        assert_eq!(settings.bind_addr.port(), 9090);
        assert_eq!(settings.max_value_length, 128);
    }
}
