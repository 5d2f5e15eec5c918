// Copyright (C) 2026 Parity Technologies (UK) Ltd.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Parachain (EVM) client: a `Provider` wrapped in a `SignerMiddleware`,
//! fill-sign-send-wait for transactions. Gas limit and priority fee are
//! fixed by configuration, so this client only adds the signer — no gas
//! estimator chain.

use crate::error::ChainError;
use crate::secrets::OracleSigner;
use ethers::middleware::SignerMiddleware;
use ethers::providers::{Http, Middleware, Provider, Ws};
use ethers::types::{Address, U256};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

/// Wraps an ethers provider + signer over either a WS or HTTP endpoint,
/// since `WS_URL_PARA` may be configured with either scheme.
pub struct ParachainClient {
    url: String,
    signed: SignedProvider,
    consecutive_failures: AtomicU32,
}

enum SignedProvider {
    Ws(Arc<SignerMiddleware<Provider<Ws>, ethers::signers::LocalWallet>>),
    Http(Arc<SignerMiddleware<Provider<Http>, ethers::signers::LocalWallet>>),
}

impl ParachainClient {
    pub async fn connect(url: &str, signer: &OracleSigner) -> Result<Self, ChainError> {
        let signed = if url.starts_with("ws") {
            let provider = Provider::<Ws>::connect(url)
                .await
                .map_err(|e| ChainError::Transport {
                    endpoint: url.to_string(),
                    reason: e.to_string(),
                })?;
            SignedProvider::Ws(Arc::new(SignerMiddleware::new(
                provider,
                signer.wallet().clone(),
            )))
        } else {
            let provider = Provider::<Http>::try_from(url).map_err(|e| ChainError::Transport {
                endpoint: url.to_string(),
                reason: e.to_string(),
            })?;
            SignedProvider::Http(Arc::new(SignerMiddleware::new(
                provider,
                signer.wallet().clone(),
            )))
        };

        Ok(Self {
            url: url.to_string(),
            signed,
            consecutive_failures: AtomicU32::new(0),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures.load(Ordering::Relaxed)
    }

    pub fn record_success(&self) {
        self.consecutive_failures.store(0, Ordering::Relaxed);
    }

    pub fn record_failure(&self) {
        self.consecutive_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub async fn get_transaction_count(&self, address: Address) -> Result<U256, ChainError> {
        let result = match &self.signed {
            SignedProvider::Ws(p) => p.get_transaction_count(address, None).await,
            SignedProvider::Http(p) => p.get_transaction_count(address, None).await,
        };
        self.settle(result)
    }

    pub async fn get_balance(&self, address: Address) -> Result<U256, ChainError> {
        let result = match &self.signed {
            SignedProvider::Ws(p) => p.get_balance(address, None).await,
            SignedProvider::Http(p) => p.get_balance(address, None).await,
        };
        self.settle(result)
    }

    pub async fn base_fee(&self) -> Result<U256, ChainError> {
        let block = match &self.signed {
            SignedProvider::Ws(p) => p.get_block(ethers::types::BlockNumber::Latest).await,
            SignedProvider::Http(p) => p.get_block(ethers::types::BlockNumber::Latest).await,
        };
        let block = self.settle(block)?;
        Ok(block
            .and_then(|b| b.base_fee_per_gas)
            .unwrap_or(U256::zero()))
    }

    pub fn signer_address(&self) -> Address {
        match &self.signed {
            SignedProvider::Ws(p) => p.address(),
            SignedProvider::Http(p) => p.address(),
        }
    }

    pub fn ws(&self) -> Option<Arc<SignerMiddleware<Provider<Ws>, ethers::signers::LocalWallet>>> {
        match &self.signed {
            SignedProvider::Ws(p) => Some(p.clone()),
            SignedProvider::Http(_) => None,
        }
    }

    pub fn http(
        &self,
    ) -> Option<Arc<SignerMiddleware<Provider<Http>, ethers::signers::LocalWallet>>> {
        match &self.signed {
            SignedProvider::Http(p) => Some(p.clone()),
            SignedProvider::Ws(_) => None,
        }
    }

    fn settle<T, E: std::fmt::Display>(&self, result: Result<T, E>) -> Result<T, ChainError> {
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
}
