// Copyright (C) 2026 Parity Technologies (UK) Ltd.
// SPDX-License-Identifier: GPL-3.0-or-later

//! EraTracker: observes relay-chain era advances and resolves era-boundary
//! block hashes via `chain/relay.rs`'s `block_hash_at`, using the on-chain
//! anchor triple for skew arithmetic.

use crate::chain::relay::{RelayClient, plain_key};
use crate::contract::AnchorTriple;
use crate::error::{ChainError, SkewFatal};
use parity_scale_codec::Decode;
use std::time::{Duration, Instant};
use subxt::utils::H256;

#[derive(Decode)]
struct ActiveEraInfo {
    index: u32,
    #[allow(dead_code)]
    start: Option<u64>,
}

#[derive(Debug, Clone, Copy)]
pub struct EraChange {
    pub era_id: u64,
    pub previous_era_change_block_number: u64,
    pub block_hash: H256,
}

pub struct EraTracker {
    era_duration_in_blocks: u64,
    initial_block_number: u64,
    current_era: Option<u64>,
    last_advance_observed_at: Instant,
}

impl EraTracker {
    pub fn new(era_duration_in_blocks: u64, initial_block_number: u64) -> Self {
        Self {
            era_duration_in_blocks,
            initial_block_number,
            current_era: None,
            last_advance_observed_at: Instant::now(),
        }
    }

    pub fn current_era(&self) -> Option<u64> {
        self.current_era
    }

    pub fn seconds_since_last_advance(&self) -> Duration {
        self.last_advance_observed_at.elapsed()
    }

    /// Reads `Staking.ActiveEra` on the relay chain at its current best
    /// block. If the observed era advanced since the last tick, resolves
    /// the era-boundary block and returns the snapshot point for this era's
    /// reports.
    pub async fn observe(&mut self, relay: &RelayClient) -> Result<Option<EraChange>, ChainError> {
        let best_hash = relay.current_block_hash().await?;
        let key = plain_key("Staking", "ActiveEra");
        let bytes = relay.storage_at(&key, best_hash).await?;

        let Some(bytes) = bytes else {
            return Ok(None);
        };

        let info = ActiveEraInfo::decode(&mut &bytes[..]).map_err(|e| ChainError::Transport {
            endpoint: relay.url().to_string(),
            reason: format!("failed to decode ActiveEra: {e}"),
        })?;

        let era_id = info.index as u64;
        if self.current_era == Some(era_id) {
            return Ok(None);
        }

        let previous_era_change_block_number =
            era_id * self.era_duration_in_blocks + self.initial_block_number;
        let block_hash = relay.block_hash_at(previous_era_change_block_number).await?;

        self.current_era = Some(era_id);
        self.last_advance_observed_at = Instant::now();

        Ok(Some(EraChange {
            era_id,
            previous_era_change_block_number,
            block_hash,
        }))
    }

    /// Skew guard: `SECONDS_PER_ERA` from the on-chain anchor triple is
    /// authoritative for era boundary math, so the skew check compares the
    /// contract's `eraId()` against this tracker's observed relay era in
    /// units of `anchor.seconds_per_era`.
    pub fn check_skew(
        &self,
        contract_era_id: u64,
        relay_era_id: u64,
        anchor: &AnchorTriple,
        era_delay_secs: u64,
    ) -> Result<(), SkewFatal> {
        if relay_era_id <= contract_era_id {
            return Ok(());
        }

        let era_gap = relay_era_id - contract_era_id;
        let skew_seconds = era_gap * anchor.seconds_per_era;

        if skew_seconds > era_delay_secs {
            return Err(SkewFatal {
                reason: format!(
                    "contract eraId {contract_era_id} trails relay era {relay_era_id} by {skew_seconds}s (limit {era_delay_secs}s)"
                ),
            });
        }

        Ok(())
    }

    pub fn check_update_delay(&self, era_update_delay_secs: u64) -> Result<(), SkewFatal> {
        let elapsed = self.seconds_since_last_advance();
        if elapsed > Duration::from_secs(era_update_delay_secs) {
            return Err(SkewFatal {
                reason: format!(
                    "no era advance observed for {}s (limit {era_update_delay_secs}s)",
                    elapsed.as_secs()
                ),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn anchor(seconds_per_era: u64) -> AnchorTriple {
        AnchorTriple {
            anchor_era_id: 0,
            anchor_timestamp: 0,
            seconds_per_era,
        }
    }

    #[test]
    fn check_skew_allows_contract_caught_up_or_ahead() {
        let tracker = EraTracker::new(600, 0);
        assert!(tracker.check_skew(10, 10, &anchor(21600), 3600).is_ok());
        assert!(tracker.check_skew(11, 10, &anchor(21600), 3600).is_ok());
    }

    #[test]
    fn check_skew_tolerates_gap_within_limit() {
        let tracker = EraTracker::new(600, 0);
        assert!(tracker.check_skew(9, 10, &anchor(3600), 3600).is_ok());
    }

    #[test]
    fn check_skew_rejects_gap_beyond_limit() {
        let tracker = EraTracker::new(600, 0);
        let err = tracker
            .check_skew(8, 10, &anchor(3600), 3600)
            .expect_err("two-era gap at 3600s/era exceeds a 3600s limit");
        assert!(err.reason.contains("trails relay era"));
    }

    #[test]
    fn check_update_delay_ok_when_recently_advanced() {
        let tracker = EraTracker::new(600, 0);
        assert!(tracker.check_update_delay(3600).is_ok());
    }

    #[test]
    fn check_update_delay_fails_after_window_elapses() {
        let mut tracker = EraTracker::new(600, 0);
        tracker.last_advance_observed_at = Instant::now() - Duration::from_secs(100);
        let err = tracker
            .check_update_delay(10)
            .expect_err("100s since last advance exceeds a 10s window");
        assert!(err.reason.contains("no era advance observed"));
    }
}
