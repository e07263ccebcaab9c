//! Loadout Core — shared domain types.
//!
//! Wire-level types exchanged between game clients and the gateway
//! (`ConfigEntry`, `Configuration`) and the identifiers that key
//! everything else (`UserId`, `SessionToken`). This crate performs no
//! I/O and knows nothing about how configuration is stored.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod types;

pub use types::{ConfigEntry, Configuration, SessionToken, UserId};
