// Copyright (C) 2026 Parity Technologies (UK) Ltd.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Submitter: a fill-sign-send-wait transaction pipeline reworked for this
//! daemon's sequential one-stash-at-a-time submission, which keeps nonce
//! handling simple.

use crate::chain::parachain::ParachainClient;
use crate::contract::OracleMaster;
use crate::error::ParaError;
use crate::report::ReportTuple;
use ethers::types::Address;
use oracle_daemon_config::OracleMode;
use sp_core::crypto::AccountId32;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Transaction mined with status 1.
    Success,
    /// `isReportedLastEra` already says this stash was reported this era.
    AlreadyReported,
    /// Transaction mined with status 0. Not retried within the same era.
    Reverted,
    /// `ORACLE_MODE=DEBUG`: report built and logged, nothing dispatched.
    DebugSkipped,
}

pub struct Submitter<'a> {
    oracle_master: &'a OracleMaster,
    oracle_member: Address,
    gas_limit: u64,
    max_priority_fee_per_gas: u64,
    mode: OracleMode,
}

impl<'a> Submitter<'a> {
    pub fn new(
        oracle_master: &'a OracleMaster,
        oracle_member: Address,
        gas_limit: u64,
        max_priority_fee_per_gas: u64,
        mode: OracleMode,
    ) -> Self {
        Self {
            oracle_master,
            oracle_member,
            gas_limit,
            max_priority_fee_per_gas,
            mode,
        }
    }

    pub async fn submit(
        &self,
        client: &ParachainClient,
        era_id: u64,
        stash: &AccountId32,
        report: &ReportTuple,
    ) -> Result<SubmitOutcome, ParaError> {
        let stash_bytes: [u8; 32] = stash.clone().into();

        let (last_era, already_reported) = self
            .oracle_master
            .is_reported_last_era(client, self.oracle_member, stash_bytes)
            .await?;

        if already_reported && last_era == era_id {
            return Ok(SubmitOutcome::AlreadyReported);
        }

        if self.mode.is_debug() {
            tracing::info!(
                era_id,
                stash = %hex::encode(stash_bytes),
                ?report,
                "DEBUG mode: built report, not dispatching reportRelay"
            );
            return Ok(SubmitOutcome::DebugSkipped);
        }

        let receipt = self
            .oracle_master
            .report_relay(
                client,
                era_id,
                report,
                self.gas_limit,
                self.max_priority_fee_per_gas,
            )
            .await?;

        let success = receipt.status.map(|s| s.as_u64()) == Some(1);
        if success {
            tracing::info!(era_id, tx_hash = ?receipt.transaction_hash, "reportRelay succeeded");
            Ok(SubmitOutcome::Success)
        } else {
            tracing::warn!(era_id, tx_hash = ?receipt.transaction_hash, "reportRelay reverted");
            Ok(SubmitOutcome::Reverted)
        }
    }
}
