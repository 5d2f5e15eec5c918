// Copyright (C) 2026 Parity Technologies (UK) Ltd.
// SPDX-License-Identifier: GPL-3.0-or-later

//! ReportBuilder: for one stash at one era boundary, reads the relay chain's
//! staking storage at a fixed block hash and assembles a ReportTuple. Storage
//! keys are built with the plain/map helpers in `chain/relay.rs`, hashed with
//! the primitives `sp_core::hashing` exposes.

use crate::chain::relay::{RelayClient, map_key, plain_key};
use crate::error::RelayDataError;
use ethers::contract::EthAbiType;
use ethers::types::{Address, U256};
use parity_scale_codec::Decode;
use sp_core::crypto::AccountId32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StakeStatus {
    Chill = 0,
    Nominator = 1,
    Validator = 2,
    None = 3,
}

#[derive(Clone, Debug, EthAbiType)]
pub struct UnlockChunk {
    pub balance: U256,
    pub era: U256,
}

/// Mirrors the Solidity `OracleData` struct the `reportRelay` ABI expects.
/// Field order must match the ABI exactly; `EthAbiType` derives the tuple
/// encoding from declaration order.
#[derive(Clone, Debug, EthAbiType)]
pub struct ReportTuple {
    pub stash_account: [u8; 32],
    pub controller_account: [u8; 32],
    pub stake_status: u8,
    pub active_balance: U256,
    pub total_balance: U256,
    pub unlocking: Vec<UnlockChunk>,
    pub claimed_rewards: Vec<u32>,
    pub stash_balance: U256,
    pub slashing_spans: u32,
}

/// SCALE layout of `pallet_staking::StakingLedger` restricted to the fields
/// this daemon reads.
#[derive(Decode)]
struct StakingLedger {
    stash: AccountId32,
    #[codec(compact)]
    total: u128,
    #[codec(compact)]
    active: u128,
    unlocking: Vec<RawUnlockChunk>,
    claimed_rewards: Vec<u32>,
}

#[derive(Decode)]
struct RawUnlockChunk {
    #[codec(compact)]
    value: u128,
    #[codec(compact)]
    era: u32,
}

pub struct ReportBuilder<'a> {
    relay: &'a RelayClient,
}

impl<'a> ReportBuilder<'a> {
    pub fn new(relay: &'a RelayClient) -> Self {
        Self { relay }
    }

    /// Builds one `ReportTuple` for `stash` at the fixed `at` block hash.
    /// Every read in this function uses the same `at`, so the resulting
    /// report is a consistent point-in-time snapshot.
    pub async fn build(
        &self,
        stash: AccountId32,
        at: subxt::utils::H256,
    ) -> Result<ReportTuple, RelayDataError> {
        let stash_bytes: [u8; 32] = stash.clone().into();

        let bonded_key = map_key("Staking", "Bonded", &stash.encode_scale());
        let controller = self
            .relay
            .storage_at(&bonded_key, at)
            .await
            .map_err(transport_err(&stash, "Bonded"))?
            .map(|bytes| AccountId32::decode(&mut &bytes[..]))
            .transpose()
            .map_err(decode_err(&stash, "Bonded"))?;

        let Some(controller) = controller else {
            let stash_balance = self.read_stash_balance(&stash, at).await?;
            let slashing_spans = self.read_slashing_spans(&stash, at).await?;
            return Ok(ReportTuple {
                stash_account: stash_bytes,
                controller_account: [0u8; 32],
                stake_status: StakeStatus::None as u8,
                active_balance: U256::zero(),
                total_balance: U256::zero(),
                unlocking: Vec::new(),
                claimed_rewards: Vec::new(),
                stash_balance,
                slashing_spans,
            });
        };

        let ledger_key = map_key("Staking", "Ledger", &controller.encode_scale());
        let ledger_bytes = self
            .relay
            .storage_at(&ledger_key, at)
            .await
            .map_err(transport_err(&stash, "Ledger"))?
            .ok_or_else(|| RelayDataError {
                field: "Ledger",
                stash: hex::encode(stash_bytes),
                reason: "bonded controller has no ledger entry".to_string(),
            })?;
        let ledger =
            StakingLedger::decode(&mut &ledger_bytes[..]).map_err(decode_err(&stash, "Ledger"))?;

        let stake_status = self.resolve_stake_status(&stash, at).await?;
        let stash_balance = self.read_stash_balance(&stash, at).await?;
        let slashing_spans = self.read_slashing_spans(&stash, at).await?;

        Ok(ReportTuple {
            stash_account: stash_bytes,
            controller_account: controller.into(),
            stake_status: stake_status as u8,
            active_balance: u128_to_u256(ledger.active),
            total_balance: u128_to_u256(ledger.total),
            unlocking: ledger
                .unlocking
                .into_iter()
                .map(|c| UnlockChunk {
                    balance: u128_to_u256(c.value),
                    era: U256::from(c.era),
                })
                .collect(),
            claimed_rewards: ledger.claimed_rewards,
            stash_balance,
            slashing_spans,
        })
    }

    async fn read_stash_balance(
        &self,
        stash: &AccountId32,
        at: subxt::utils::H256,
    ) -> Result<U256, RelayDataError> {
        let key = map_key("System", "Account", &stash.encode_scale());
        let bytes = self
            .relay
            .storage_at(&key, at)
            .await
            .map_err(transport_err(stash, "System.Account"))?;
        match bytes {
            None => Ok(U256::zero()),
            Some(bytes) => {
                let account = SystemAccountInfo::decode(&mut &bytes[..])
                    .map_err(decode_err(stash, "System.Account"))?;
                Ok(u128_to_u256(account.data.free))
            }
        }
    }

    async fn read_slashing_spans(
        &self,
        stash: &AccountId32,
        at: subxt::utils::H256,
    ) -> Result<u32, RelayDataError> {
        let key = map_key("Staking", "SlashingSpans", &stash.encode_scale());
        let bytes = self
            .relay
            .storage_at(&key, at)
            .await
            .map_err(transport_err(stash, "SlashingSpans"))?;
        match bytes {
            None => Ok(0),
            Some(bytes) => {
                let spans = SlashingSpanRecord::decode(&mut &bytes[..])
                    .map_err(decode_err(stash, "SlashingSpans"))?;
                Ok(spans.span_index)
            }
        }
    }

    async fn resolve_stake_status(
        &self,
        stash: &AccountId32,
        at: subxt::utils::H256,
    ) -> Result<StakeStatus, RelayDataError> {
        let validators_key = plain_key("Staking", "Validators");
        let mut key = validators_key;
        key.extend(sp_core::hashing::blake2_128(&stash.encode_scale()));
        key.extend(stash.encode_scale());
        if self
            .relay
            .storage_at(&key, at)
            .await
            .map_err(transport_err(stash, "Validators"))?
            .is_some()
        {
            return Ok(StakeStatus::Validator);
        }

        let nominators_key = map_key("Staking", "Nominators", &stash.encode_scale());
        if self
            .relay
            .storage_at(&nominators_key, at)
            .await
            .map_err(transport_err(stash, "Nominators"))?
            .is_some()
        {
            return Ok(StakeStatus::Nominator);
        }

        Ok(StakeStatus::Chill)
    }
}

#[derive(Decode)]
struct AccountData {
    free: u128,
    #[allow(dead_code)]
    reserved: u128,
    #[allow(dead_code)]
    frozen: u128,
}

#[derive(Decode)]
struct SystemAccountInfo {
    #[allow(dead_code)]
    nonce: u32,
    #[allow(dead_code)]
    consumers: u32,
    #[allow(dead_code)]
    providers: u32,
    #[allow(dead_code)]
    sufficients: u32,
    data: AccountData,
}

#[derive(Decode)]
struct SlashingSpanRecord {
    span_index: u32,
    #[allow(dead_code)]
    last_start: u32,
    #[allow(dead_code)]
    last_nonzero_slash: u32,
    #[allow(dead_code)]
    prior: Vec<u32>,
}

fn u128_to_u256(value: u128) -> U256 {
    U256::from(value)
}

fn transport_err<'a>(
    stash: &'a AccountId32,
    field: &'static str,
) -> impl FnOnce(crate::error::ChainError) -> RelayDataError + 'a {
    move |e| RelayDataError {
        field,
        stash: hex::encode(<[u8; 32]>::from(stash.clone())),
        reason: e.to_string(),
    }
}

fn decode_err<'a>(
    stash: &'a AccountId32,
    field: &'static str,
) -> impl FnOnce(parity_scale_codec::Error) -> RelayDataError + 'a {
    move |e| RelayDataError {
        field,
        stash: hex::encode(<[u8; 32]>::from(stash.clone())),
        reason: e.to_string(),
    }
}

trait EncodeScale {
    fn encode_scale(&self) -> Vec<u8>;
}

impl EncodeScale for AccountId32 {
    fn encode_scale(&self) -> Vec<u8> {
        parity_scale_codec::Encode::encode(self)
    }
}

