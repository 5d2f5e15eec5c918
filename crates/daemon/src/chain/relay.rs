// Copyright (C) 2026 Parity Technologies (UK) Ltd.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Relay chain client: a reconnecting-rpc-client with exponential backoff
//! and a bounded request timeout, talking to the relay chain specifically.

use crate::error::ChainError;
use sp_core::hashing::{blake2_128, twox_128};
use std::io::Write;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;
use subxt_rpcs::client::reconnecting_rpc_client::{
    ExponentialBackoff, RpcClient as ReconnectingClient,
};
use subxt_rpcs::{LegacyRpcMethods, RpcClient, rpc_params};

/// Legacy JSON-RPC surface for raw storage/header reads.
pub type SubstrateLegacyRpc = LegacyRpcMethods<subxt::config::RpcConfigFor<subxt::SubstrateConfig>>;

pub struct RelayClient {
    url: String,
    legacy_rpc: SubstrateLegacyRpc,
    rpc_client: RpcClient,
    consecutive_failures: AtomicU32,
}

/// Build a plain (non-map) storage key: `twox_128(pallet) ++ twox_128(item)`.
pub fn plain_key(pallet: &str, item: &str) -> Vec<u8> {
    let mut key = twox_128(pallet.as_bytes()).to_vec();
    key.extend(twox_128(item.as_bytes()));
    key
}

/// Build a `Blake2_128Concat`-hashed map storage key, the hasher
/// `pallet-staking` uses for its `AccountId`-keyed maps (`Bonded`, `Ledger`,
/// `Nominators`, `Validators`, `SlashingSpans`).
pub fn map_key(pallet: &str, item: &str, encoded_key: &[u8]) -> Vec<u8> {
    let mut key = plain_key(pallet, item);
    key.extend(blake2_128(encoded_key));
    key.extend(encoded_key);
    key
}

impl RelayClient {
    pub async fn connect(
        url: &str,
        initial_delay_ms: u64,
        max_delay_ms: u64,
        request_timeout_ms: u64,
    ) -> Result<Self, ChainError> {
        let reconnecting_client = connect_with_progress_logging(
            url,
            initial_delay_ms,
            max_delay_ms,
            request_timeout_ms,
        )
        .await?;

        let rpc_client = RpcClient::new(reconnecting_client);
        let legacy_rpc: SubstrateLegacyRpc = LegacyRpcMethods::new(rpc_client.clone());

        Ok(Self {
            url: url.to_string(),
            legacy_rpc,
            rpc_client,
            consecutive_failures: AtomicU32::new(0),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures.load(Ordering::Relaxed)
    }

    fn record_success(&self) {
        self.consecutive_failures.store(0, Ordering::Relaxed);
    }

    fn record_failure(&self) {
        self.consecutive_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub async fn current_block_hash(&self) -> Result<subxt::utils::H256, ChainError> {
        let result = self.legacy_rpc.chain_get_block_hash(None).await;
        self.settle(result)?
            .ok_or_else(|| ChainError::Transport {
                endpoint: self.url.clone(),
                reason: "no best block hash returned".to_string(),
            })
    }

    pub async fn block_hash_at(&self, height: u64) -> Result<subxt::utils::H256, ChainError> {
        let result = self
            .legacy_rpc
            .chain_get_block_hash(Some(height.into()))
            .await;
        self.settle(result)?.ok_or_else(|| ChainError::Transport {
            endpoint: self.url.clone(),
            reason: format!("no block hash at height {height}"),
        })
    }

    /// Raw `state_getStorage` read at a fixed block hash. Every read for one
    /// report must use the same `at` to stay snapshot-consistent.
    pub async fn storage_at(
        &self,
        key: &[u8],
        at: subxt::utils::H256,
    ) -> Result<Option<Vec<u8>>, ChainError> {
        let hex_key = format!("0x{}", hex::encode(key));
        let result: Result<Option<String>, subxt_rpcs::Error> = self
            .rpc_client
            .request("state_getStorage", rpc_params![hex_key, at])
            .await;
        let raw = self.settle(result)?;
        match raw {
            Some(hex_value) => {
                let bytes = hex::decode(hex_value.trim_start_matches("0x"))
                    .map_err(|e| ChainError::Transport {
                        endpoint: self.url.clone(),
                        reason: format!("malformed hex from state_getStorage: {e}"),
                    })?;
                Ok(Some(bytes))
            }
            None => Ok(None),
        }
    }

    fn settle<T>(&self, result: Result<T, subxt_rpcs::Error>) -> Result<T, ChainError> {
        match result {
            Ok(value) => {
                self.record_success();
                Ok(value)
            }
            Err(source) => {
                self.record_failure();
                Err(ChainError::Transport {
                    endpoint: self.url.clone(),
                    reason: source.to_string(),
                })
            }
        }
    }

    /// Tear down and re-establish the connection; used by the watchdog when
    /// no era change has been observed within its window.
    pub async fn reconnect(
        &mut self,
        initial_delay_ms: u64,
        max_delay_ms: u64,
        request_timeout_ms: u64,
    ) -> Result<(), ChainError> {
        let fresh = Self::connect(&self.url, initial_delay_ms, max_delay_ms, request_timeout_ms)
            .await?;
        *self = fresh;
        Ok(())
    }
}

async fn connect_with_progress_logging(
    url: &str,
    initial_delay_ms: u64,
    max_delay_ms: u64,
    request_timeout_ms: u64,
) -> Result<ReconnectingClient, ChainError> {
    let connect_future = ReconnectingClient::builder()
        .retry_policy(
            ExponentialBackoff::from_millis(initial_delay_ms)
                .max_delay(Duration::from_millis(max_delay_ms)),
        )
        .request_timeout(Duration::from_millis(request_timeout_ms))
        .build(url);

    tokio::pin!(connect_future);

    let mut interval = tokio::time::interval(Duration::from_secs(1));
    interval.tick().await;

    let mut elapsed_secs = 0u64;
    const TIMEOUT_SECS: u64 = 60;

    eprint!("\rConnecting to relay chain at {url}...");
    let _ = std::io::stderr().flush();

    loop {
        tokio::select! {
            result = &mut connect_future => {
                eprint!("\r\x1b[K");
                let _ = std::io::stderr().flush();
                return result.map_err(|source| ChainError::Transport {
                    endpoint: url.to_string(),
                    reason: source.to_string(),
                });
            }
            _ = interval.tick() => {
                elapsed_secs += 1;
                if elapsed_secs >= TIMEOUT_SECS {
                    eprintln!("\r\x1b[K");
                    return Err(ChainError::Timeout {
                        endpoint: url.to_string(),
                        timeout_secs: TIMEOUT_SECS,
                    });
                }
                eprint!("\rConnecting to relay chain at {url}... {elapsed_secs}s");
                let _ = std::io::stderr().flush();
            }
        }
    }
}
