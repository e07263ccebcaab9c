//! RPC API exposed to game clients.
//!
//! One method per configuration operation, all token-authenticated. The
//! trait is implemented by the gateway (server side) and consumed by
//! clients and tests (client side).

use jsonrpsee::proc_macros::rpc;
use jsonrpsee::types::ErrorObjectOwned;

use loadout_core::{ConfigEntry, Configuration, SessionToken};

/// RPC error codes returned by the gateway.
pub mod error_codes {
    /// Missing, empty, or unknown session token.
    pub const UNAUTHORIZED: i32 = -32001;
    /// The user has no configuration document yet.
    pub const NOT_FOUND: i32 = -32002;
    /// The entry was rejected (invalid key, invalid value, or oversized
    /// value).
    pub const INVALID_ENTRY: i32 = -32003;
    /// Internal gateway or storage error.
    pub const INTERNAL_ERROR: i32 = -32004;
}

/// The Loadout gateway RPC API.
#[rpc(server, client, namespace = "loadout")]
pub trait LoadoutRpc {
    /// Fetch the caller's full configuration.
    #[method(name = "getConfiguration")]
    async fn get_configuration(
        &self,
        token: SessionToken,
    ) -> Result<Configuration, ErrorObjectOwned>;

    /// Upsert a single configuration entry.
    #[method(name = "setEntry")]
    async fn set_entry(
        &self,
        token: SessionToken,
        entry: ConfigEntry,
    ) -> Result<(), ErrorObjectOwned>;

    /// Upsert a batch of entries; returns the wire keys that were
    /// rejected and excluded from the write.
    #[method(name = "patchConfiguration")]
    async fn patch_configuration(
        &self,
        token: SessionToken,
        configuration: Configuration,
    ) -> Result<Vec<String>, ErrorObjectOwned>;

    /// Delete a single configuration key.
    #[method(name = "deleteEntry")]
    async fn delete_entry(&self, token: SessionToken, key: String) -> Result<(), ErrorObjectOwned>;
}
