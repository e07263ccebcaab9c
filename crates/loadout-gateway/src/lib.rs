//! Loadout Gateway — the RPC service in front of the configuration
//! repository.
//!
//! The gateway is a thin marshaling layer: it resolves the caller's
//! session token to a user id (through a bounded TTL cache), forwards
//! the request to [`loadout_storage::ConfigRepository`], and maps
//! repository outcomes to RPC results and error codes. It holds no
//! configuration state of its own.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod auth;
pub mod rpc;
pub mod server;
pub mod settings;

pub use auth::SessionCache;
pub use server::{RpcImpl, serve};
pub use settings::Settings;

/// Errors from gateway startup.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// The RPC listen address could not be bound.
    #[error("failed to bind rpc server: {0}")]
    Bind(String),

    /// Storage bootstrap (connection or index definition) failed.
    #[error("storage bootstrap failed: {0}")]
    Bootstrap(#[from] loadout_storage::StoreError),
}
