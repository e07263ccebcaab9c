//! End-to-end RPC tests: a real server over the in-memory document
//! store, driven through the generated client.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use jsonrpsee::core::ClientError;
use jsonrpsee::server::ServerHandle;
use jsonrpsee::ws_client::{WsClient, WsClientBuilder};

use loadout_core::{ConfigEntry, Configuration, SessionToken, UserId};
use loadout_gateway::rpc::{LoadoutRpcClient, error_codes};
use loadout_gateway::server::RpcImpl;
use loadout_gateway::{SessionCache, serve};
use loadout_storage::{ConfigRepository, MemoryStore, SessionStore, StoreResult};

const VALID_TOKEN: &str = "f81d4fae-7dec-11d0-a765-00a0c91e6bf6";

struct StaticSessions;

#[async_trait]
impl SessionStore for StaticSessions {
    async fn find_user_by_token(&self, token: &SessionToken) -> StoreResult<Option<UserId>> {
        Ok((token.as_str() == VALID_TOKEN).then(|| UserId::new(1000)))
    }

    async fn touch_last_used(&self, _token: &SessionToken) -> StoreResult<()> {
        Ok(())
    }
}

async fn start_gateway() -> (WsClient, ServerHandle) {
    let repository = Arc::new(ConfigRepository::new(Arc::new(MemoryStore::new()), 262_144));
    let sessions = Arc::new(SessionCache::new(
        Arc::new(StaticSessions),
        16,
        Duration::from_secs(60),
    ));
    let (addr, handle) = serve(
        "127.0.0.1:0".parse().unwrap(),
        5_242_880,
        RpcImpl::new(repository, sessions),
    )
    .await
    .unwrap();

    let client = WsClientBuilder::default()
        .build(format!("ws://{addr}"))
        .await
        .unwrap();
    (client, handle)
}

fn rpc_code(err: &ClientError) -> i32 {
    match err {
        ClientError::Call(e) => e.code(),
        other => panic!("expected call error, got {other}"),
    }
}

#[tokio::test]
async fn rejects_missing_and_unknown_tokens() {
    let (client, _handle) = start_gateway().await;

    let err = client
        .get_configuration(SessionToken::new(""))
        .await
        .unwrap_err();
    assert_eq!(rpc_code(&err), error_codes::UNAUTHORIZED);

    let err = client
        .get_configuration(SessionToken::new("stale-token"))
        .await
        .unwrap_err();
    assert_eq!(rpc_code(&err), error_codes::UNAUTHORIZED);
}

#[tokio::test]
async fn get_without_configuration_is_not_found() {
    let (client, _handle) = start_gateway().await;

    let err = client
        .get_configuration(SessionToken::new(VALID_TOKEN))
        .await
        .unwrap_err();
    assert_eq!(rpc_code(&err), error_codes::NOT_FOUND);
}

#[tokio::test]
async fn set_then_get_round_trip() {
    let (client, _handle) = start_gateway().await;
    let token = SessionToken::new(VALID_TOKEN);

    client
        .set_entry(token.clone(), ConfigEntry::new("overlay.hidden", "true"))
        .await
        .unwrap();

    let configuration = client.get_configuration(token).await.unwrap();
    assert_eq!(
        configuration.config,
        vec![ConfigEntry::new("overlay.hidden", "true")]
    );
}

#[tokio::test]
async fn set_rejects_invalid_entries() {
    let (client, _handle) = start_gateway().await;
    let token = SessionToken::new(VALID_TOKEN);

    let err = client
        .set_entry(token.clone(), ConfigEntry::new("$bad.x", "1"))
        .await
        .unwrap_err();
    assert_eq!(rpc_code(&err), error_codes::INVALID_ENTRY);

    let err = client
        .set_entry(token, ConfigEntry::new("ok.x", "{\"unterminated\":"))
        .await
        .unwrap_err();
    assert_eq!(rpc_code(&err), error_codes::INVALID_ENTRY);
}

#[tokio::test]
async fn patch_reports_failed_keys_and_persists_the_rest() {
    let (client, _handle) = start_gateway().await;
    let token = SessionToken::new(VALID_TOKEN);

    let failed = client
        .patch_configuration(
            token.clone(),
            Configuration::new(vec![
                ConfigEntry::new("$bad.x", "1"),
                ConfigEntry::new("ok.y", "2"),
            ]),
        )
        .await
        .unwrap();
    assert_eq!(failed, vec!["$bad.x".to_owned()]);

    let configuration = client.get_configuration(token).await.unwrap();
    assert_eq!(configuration.config, vec![ConfigEntry::new("ok.y", "2")]);
}

#[tokio::test]
async fn delete_is_idempotent_over_rpc() {
    let (client, _handle) = start_gateway().await;
    let token = SessionToken::new(VALID_TOKEN);

    client
        .set_entry(token.clone(), ConfigEntry::new("g.l", "42"))
        .await
        .unwrap();
    client
        .delete_entry(token.clone(), "g.l".to_owned())
        .await
        .unwrap();
    client
        .delete_entry(token.clone(), "g.l".to_owned())
        .await
        .unwrap();

    let configuration = client.get_configuration(token).await.unwrap();
    assert!(configuration.config.is_empty());
}
