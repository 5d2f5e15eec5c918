// Copyright (C) 2026 Parity Technologies (UK) Ltd.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Typed bindings for the subset of the `OracleMaster` contract ABI this
//! daemon consumes. The ABI is loaded at runtime from `ABI_PATH` rather than
//! `ethers::contract::abigen!`'d at compile time, so each call here decodes
//! its return value into a statically typed Rust value immediately, rather
//! than passing loosely-typed JSON around.

use crate::chain::parachain::ParachainClient;
use crate::error::ParaError;
use crate::report::ReportTuple;
use ethers::abi::Abi;
use ethers::contract::Contract;
use ethers::providers::Middleware;
use ethers::types::{Address, TransactionReceipt, U256};

/// The on-chain anchor triple era boundary arithmetic is computed from.
/// `seconds_per_era` is authoritative over the locally configured
/// `ERA_DURATION_IN_SECONDS`.
#[derive(Debug, Clone, Copy)]
pub struct AnchorTriple {
    pub anchor_era_id: u64,
    pub anchor_timestamp: u64,
    pub seconds_per_era: u64,
}

pub struct OracleMaster {
    address: Address,
    abi: Abi,
}

async fn call<M, T>(contract: &Contract<M>, method: &'static str) -> Result<T, ParaError>
where
    M: Middleware + 'static,
    T: ethers::abi::Detokenize,
{
    contract
        .method::<_, T>(method, ())
        .map_err(|e| ParaError::Rpc {
            method,
            reason: e.to_string(),
        })?
        .call()
        .await
        .map_err(|e| ParaError::Rpc {
            method,
            reason: e.to_string(),
        })
}

impl OracleMaster {
    pub fn new(address: Address, abi: Abi) -> Self {
        Self { address, abi }
    }

    fn contract<M: Middleware + 'static>(&self, client: std::sync::Arc<M>) -> Contract<M> {
        Contract::new(self.address, self.abi.clone(), client)
    }

    pub async fn get_current_era_id(&self, client: &ParachainClient) -> Result<u64, ParaError> {
        let v: U256 = self.dispatch(client, "getCurrentEraId").await?;
        Ok(v.as_u64())
    }

    pub async fn era_id(&self, client: &ParachainClient) -> Result<u64, ParaError> {
        let v: U256 = self.dispatch(client, "eraId").await?;
        Ok(v.as_u64())
    }

    pub async fn anchor_triple(&self, client: &ParachainClient) -> Result<AnchorTriple, ParaError> {
        let anchor_era_id: U256 = self.dispatch(client, "ANCHOR_ERA_ID").await?;
        let anchor_timestamp: U256 = self.dispatch(client, "ANCHOR_TIMESTAMP").await?;
        let seconds_per_era: U256 = self.dispatch(client, "SECONDS_PER_ERA").await?;
        Ok(AnchorTriple {
            anchor_era_id: anchor_era_id.as_u64(),
            anchor_timestamp: anchor_timestamp.as_u64(),
            seconds_per_era: seconds_per_era.as_u64(),
        })
    }

    pub async fn get_stash_accounts(
        &self,
        client: &ParachainClient,
    ) -> Result<Vec<[u8; 32]>, ParaError> {
        if let Some(p) = client.ws() {
            let contract = self.contract(p);
            call(&contract, "getStashAccounts").await
        } else if let Some(p) = client.http() {
            let contract = self.contract(p);
            call(&contract, "getStashAccounts").await
        } else {
            unreachable!("ParachainClient always holds a ws or http provider")
        }
    }

    /// `isReportedLastEra(self, stash) -> (lastEra, isReported)`. Used by the
    /// Submitter to skip a stash already reported this era, giving at-most-once
    /// idempotence across restarts.
    pub async fn is_reported_last_era(
        &self,
        client: &ParachainClient,
        oracle_member: Address,
        stash: [u8; 32],
    ) -> Result<(u64, bool), ParaError> {
        const METHOD: &str = "isReportedLastEra";
        if let Some(p) = client.ws() {
            let contract = self.contract(p);
            let (last_era, reported): (U256, bool) = contract
                .method(METHOD, (oracle_member, stash))
                .map_err(|e| ParaError::Rpc {
                    method: METHOD,
                    reason: e.to_string(),
                })?
                .call()
                .await
                .map_err(|e| ParaError::Rpc {
                    method: METHOD,
                    reason: e.to_string(),
                })?;
            Ok((last_era.as_u64(), reported))
        } else if let Some(p) = client.http() {
            let contract = self.contract(p);
            let (last_era, reported): (U256, bool) = contract
                .method(METHOD, (oracle_member, stash))
                .map_err(|e| ParaError::Rpc {
                    method: METHOD,
                    reason: e.to_string(),
                })?
                .call()
                .await
                .map_err(|e| ParaError::Rpc {
                    method: METHOD,
                    reason: e.to_string(),
                })?;
            Ok((last_era.as_u64(), reported))
        } else {
            unreachable!("ParachainClient always holds a ws or http provider")
        }
    }

    /// `reportRelay(era_id, OracleData)`. Fetches the signer's current nonce
    /// and the chain's current base fee explicitly rather than relying on
    /// `ethers`' implicit transaction auto-fill, then signs, submits, and
    /// waits for the receipt; classification of the outcome is the
    /// Submitter's job.
    pub async fn report_relay(
        &self,
        client: &ParachainClient,
        era_id: u64,
        report: &ReportTuple,
        gas_limit: u64,
        max_priority_fee_per_gas: u64,
    ) -> Result<TransactionReceipt, ParaError> {
        const METHOD: &str = "reportRelay";
        let args = (U256::from(era_id), report.clone());

        let nonce = client
            .get_transaction_count(client.signer_address())
            .await
            .map_err(|e| ParaError::Rpc {
                method: "getTransactionCount",
                reason: e.to_string(),
            })?;
        let base_fee = client.base_fee().await.map_err(|e| ParaError::Rpc {
            method: "baseFee",
            reason: e.to_string(),
        })?;
        let max_priority_fee_per_gas = U256::from(max_priority_fee_per_gas);
        let max_fee_per_gas = base_fee + max_priority_fee_per_gas;

        let pending_receipt = if let Some(p) = client.ws() {
            let contract = self.contract(p);
            let mut call = contract.method(METHOD, args).map_err(|e| ParaError::Rpc {
                method: METHOD,
                reason: e.to_string(),
            })?;
            call.tx.set_gas(gas_limit);
            call.tx.set_nonce(nonce);
            call.tx.as_eip1559_mut().map(|tx| {
                tx.max_priority_fee_per_gas = Some(max_priority_fee_per_gas);
                tx.max_fee_per_gas = Some(max_fee_per_gas);
            });
            call.send()
                .await
                .map_err(|e| ParaError::Rpc {
                    method: METHOD,
                    reason: e.to_string(),
                })?
                .await
                .map_err(|e| ParaError::Rpc {
                    method: METHOD,
                    reason: e.to_string(),
                })?
        } else if let Some(p) = client.http() {
            let contract = self.contract(p);
            let mut call = contract.method(METHOD, args).map_err(|e| ParaError::Rpc {
                method: METHOD,
                reason: e.to_string(),
            })?;
            call.tx.set_gas(gas_limit);
            call.tx.set_nonce(nonce);
            call.tx.as_eip1559_mut().map(|tx| {
                tx.max_priority_fee_per_gas = Some(max_priority_fee_per_gas);
                tx.max_fee_per_gas = Some(max_fee_per_gas);
            });
            call.send()
                .await
                .map_err(|e| ParaError::Rpc {
                    method: METHOD,
                    reason: e.to_string(),
                })?
                .await
                .map_err(|e| ParaError::Rpc {
                    method: METHOD,
                    reason: e.to_string(),
                })?
        } else {
            unreachable!("ParachainClient always holds a ws or http provider")
        };

        pending_receipt.ok_or_else(|| ParaError::Rpc {
            method: METHOD,
            reason: "transaction dropped from mempool".to_string(),
        })
    }

    async fn dispatch(&self, client: &ParachainClient, method: &'static str) -> Result<U256, ParaError> {
        if let Some(p) = client.ws() {
            let contract = self.contract(p);
            call(&contract, method).await
        } else if let Some(p) = client.http() {
            let contract = self.contract(p);
            call(&contract, method).await
        } else {
            unreachable!("ParachainClient always holds a ws or http provider")
        }
    }
}
