// Copyright (C) 2026 Parity Technologies (UK) Ltd.
// SPDX-License-Identifier: GPL-3.0-or-later

//! StashDiscovery: a single contract read, modeled on `contract.rs`'s call
//! shape. The daemon does not filter the contract-returned set — it is
//! authoritative.

use crate::chain::parachain::ParachainClient;
use crate::contract::OracleMaster;
use crate::error::ParaError;
use sp_core::crypto::AccountId32;

pub struct StashDiscovery<'a> {
    oracle_master: &'a OracleMaster,
}

impl<'a> StashDiscovery<'a> {
    pub fn new(oracle_master: &'a OracleMaster) -> Self {
        Self { oracle_master }
    }

    /// Returns the contract's current stash set, or an empty vec (which the
    /// Reporter treats as "skip this era").
    pub async fn discover(
        &self,
        client: &ParachainClient,
    ) -> Result<Vec<AccountId32>, ParaError> {
        let raw = self.oracle_master.get_stash_accounts(client).await?;
        Ok(raw.into_iter().map(AccountId32::from).collect())
    }
}
