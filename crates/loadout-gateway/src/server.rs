//! RPC method implementations and server startup.

use std::net::SocketAddr;
use std::sync::Arc;

use jsonrpsee::server::{Server, ServerHandle};
use jsonrpsee::types::ErrorObjectOwned;
use tracing::{error, info};

use loadout_core::{ConfigEntry, Configuration, SessionToken, UserId};
use loadout_storage::{ConfigError, ConfigRepository};

use crate::GatewayError;
use crate::auth::SessionCache;
use crate::rpc::{LoadoutRpcServer, error_codes};

/// The jsonrpsee RPC method handler.
///
/// Holds the shared repository and session cache; every method resolves
/// the caller's token before touching configuration.
pub struct RpcImpl {
    repository: Arc<ConfigRepository>,
    sessions: Arc<SessionCache>,
}

impl RpcImpl {
    /// Build the handler from its shared collaborators.
    #[must_use]
    pub fn new(repository: Arc<ConfigRepository>, sessions: Arc<SessionCache>) -> Self {
        Self {
            repository,
            sessions,
        }
    }

    /// Resolve the caller's token, mapping unknown tokens to
    /// `UNAUTHORIZED` and session store failures to `INTERNAL_ERROR`.
    async fn authorize(&self, token: &SessionToken) -> Result<UserId, ErrorObjectOwned> {
        match self.sessions.user_id(token).await {
            Ok(Some(user)) => Ok(user),
            Ok(None) => Err(ErrorObjectOwned::owned(
                error_codes::UNAUTHORIZED,
                "unauthorized",
                None::<()>,
            )),
            Err(e) => {
                error!(error = %e, "session lookup failed");
                Err(internal_error())
            }
        }
    }
}

fn internal_error() -> ErrorObjectOwned {
    ErrorObjectOwned::owned(error_codes::INTERNAL_ERROR, "internal error", None::<()>)
}

/// Map a repository error to its RPC error object.
///
/// Caller input errors carry their message so the client can correct
/// the request; persistence errors are logged server-side and replaced
/// with an opaque internal error.
fn config_error(e: &ConfigError) -> ErrorObjectOwned {
    match e {
        ConfigError::InvalidKey(_) | ConfigError::InvalidValue(_) | ConfigError::TooLarge { .. } => {
            ErrorObjectOwned::owned(error_codes::INVALID_ENTRY, e.to_string(), None::<()>)
        }
        ConfigError::Store(store) => {
            error!(error = %store, "storage operation failed");
            internal_error()
        }
    }
}

#[jsonrpsee::core::async_trait]
impl LoadoutRpcServer for RpcImpl {
    async fn get_configuration(
        &self,
        token: SessionToken,
    ) -> Result<Configuration, ErrorObjectOwned> {
        let user = self.authorize(&token).await?;
        match self.repository.find_by_user(user).await {
            Ok(Some(configuration)) => Ok(configuration),
            Ok(None) => Err(ErrorObjectOwned::owned(
                error_codes::NOT_FOUND,
                "no configuration",
                None::<()>,
            )),
            Err(e) => Err(config_error(&e)),
        }
    }

    async fn set_entry(
        &self,
        token: SessionToken,
        entry: ConfigEntry,
    ) -> Result<(), ErrorObjectOwned> {
        let user = self.authorize(&token).await?;
        self.repository
            .save(user, &entry)
            .await
            .map_err(|e| config_error(&e))
    }

    async fn patch_configuration(
        &self,
        token: SessionToken,
        configuration: Configuration,
    ) -> Result<Vec<String>, ErrorObjectOwned> {
        let user = self.authorize(&token).await?;
        self.repository
            .save_batch(user, &configuration)
            .await
            .map_err(|e| config_error(&e))
    }

    async fn delete_entry(
        &self,
        token: SessionToken,
        key: String,
    ) -> Result<(), ErrorObjectOwned> {
        let user = self.authorize(&token).await?;
        self.repository
            .delete_key(user, &key)
            .await
            .map_err(|e| config_error(&e))
    }
}

impl std::fmt::Debug for RpcImpl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RpcImpl").finish_non_exhaustive()
    }
}

/// Bind and start the RPC server.
///
/// Returns the bound address (useful with a `:0` port) and the server
/// handle; the server runs until the handle is stopped.
///
/// # Errors
///
/// Returns [`GatewayError::Bind`] if the listen address cannot be
/// bound.
pub async fn serve(
    addr: SocketAddr,
    max_request_body_size: u32,
    rpc: RpcImpl,
) -> Result<(SocketAddr, ServerHandle), GatewayError> {
    let server = Server::builder()
        .max_request_body_size(max_request_body_size)
        .build(addr)
        .await
        .map_err(|e| GatewayError::Bind(e.to_string()))?;
    let local_addr = server
        .local_addr()
        .map_err(|e| GatewayError::Bind(e.to_string()))?;

    let handle = server.start(rpc.into_rpc());
    info!(addr = %local_addr, "gateway listening");
    Ok((local_addr, handle))
}

#[cfg(test)]
mod tests {
    use super::*;
    use loadout_storage::StoreError;

    #[test]
    fn input_errors_map_to_invalid_entry() {
        for e in [
            ConfigError::InvalidKey("$x.y".to_owned()),
            ConfigError::InvalidValue("bad json".to_owned()),
            ConfigError::TooLarge { len: 200, max: 128 },
        ] {
            assert_eq!(config_error(&e).code(), error_codes::INVALID_ENTRY);
        }
    }

    #[test]
    fn store_errors_map_to_internal_and_hide_details() {
        let e = ConfigError::Store(StoreError::Timeout("storage call exceeded 3000ms".to_owned()));
        let mapped = config_error(&e);
        assert_eq!(mapped.code(), error_codes::INTERNAL_ERROR);
        assert!(!mapped.message().contains("3000ms"));
    }
}
