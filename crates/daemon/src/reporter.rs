// Copyright (C) 2026 Parity Technologies (UK) Ltd.
// SPDX-License-Identifier: GPL-3.0-or-later

//! The Reporter FSM and its `ReporterHandle`: a shared status handle the
//! HTTP surface reads, threaded through `state.rs`/`app.rs` the same way
//! other Axum state is.

use crate::arbiter::FailureArbiter;
use crate::chain::parachain::ParachainClient;
use crate::chain::relay::RelayClient;
use crate::contract::OracleMaster;
use crate::era::EraTracker;
use crate::error::SkewFatal;
use crate::metrics::registry as metrics;
use crate::report::ReportBuilder;
use crate::secrets::OracleSigner;
use crate::stash::StashDiscovery;
use crate::submit::{SubmitOutcome, Submitter};
use oracle_daemon_config::OracleConfig;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Notify, RwLock, watch};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BaseState {
    NotWorking,
    Starting,
    Monitoring,
    Processing,
}

impl BaseState {
    fn label(self) -> &'static str {
        match self {
            BaseState::NotWorking => "not working",
            BaseState::Starting => "starting",
            BaseState::Monitoring => "monitoring",
            BaseState::Processing => "processing",
        }
    }
}

struct ReporterInner {
    base: BaseState,
    recovering: bool,
}

/// Shared, clonable process-wide handle: the status string the HTTP surface
/// reads, passed to both the Reporter loop and the Axum router state.
#[derive(Clone)]
pub struct ReporterHandle {
    inner: Arc<RwLock<ReporterInner>>,
}

impl ReporterHandle {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(ReporterInner {
                base: BaseState::NotWorking,
                recovering: false,
            })),
        }
    }

    /// One of the five documented status strings, `recovering` taking
    /// priority as a modal overlay over whatever base state the FSM is
    /// actually in.
    pub async fn status_label(&self) -> &'static str {
        let inner = self.inner.read().await;
        if inner.recovering {
            "recovering"
        } else {
            inner.base.label()
        }
    }

    async fn set_base(&self, base: BaseState) {
        self.inner.write().await.base = base;
    }

    async fn set_recovering(&self, recovering: bool) {
        self.inner.write().await.recovering = recovering;
        metrics::IS_RECOVERY_MODE_ACTIVE.set(if recovering { 1 } else { 0 });
    }
}

impl Default for ReporterHandle {
    fn default() -> Self {
        Self::new()
    }
}

pub struct Reporter {
    config: OracleConfig,
    relay: RelayClient,
    parachain: ParachainClient,
    oracle_master: OracleMaster,
    signer: OracleSigner,
    arbiter: FailureArbiter,
    era_tracker: EraTracker,
    handle: ReporterHandle,
    last_era_reported: Option<u64>,
    era_advance_tx: watch::Sender<std::time::Instant>,
}

impl Reporter {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config: OracleConfig,
        relay: RelayClient,
        parachain: ParachainClient,
        oracle_master: OracleMaster,
        signer: OracleSigner,
        handle: ReporterHandle,
        era_advance_tx: watch::Sender<std::time::Instant>,
    ) -> Self {
        let arbiter = FailureArbiter::new(
            config.max_number_of_failure_requests,
            Duration::from_secs(config.blacklist_timeout_secs),
        );
        let era_tracker = EraTracker::new(config.era_duration_in_blocks, config.initial_block_number);

        Self {
            config,
            relay,
            parachain,
            oracle_master,
            signer,
            arbiter,
            era_tracker,
            handle,
            last_era_reported: None,
            era_advance_tx,
        }
    }

    pub fn handle(&self) -> ReporterHandle {
        self.handle.clone()
    }

    /// Drives `not_working -> starting -> monitoring <-> processing`. Runs
    /// until `shutdown` fires or a `SkewFatal` condition forces a graceful
    /// shutdown.
    pub async fn run(
        mut self,
        shutdown: Arc<Notify>,
        reconnect_signal: Arc<Notify>,
    ) -> Result<(), SkewFatal> {
        self.handle.set_base(BaseState::Starting).await;
        metrics::AGENT
            .with_label_values(&[self.relay.url()])
            .set(1.0);
        self.handle.set_base(BaseState::Monitoring).await;

        let tick = Duration::from_secs(self.config.frequency_of_requests_secs);

        loop {
            tokio::select! {
                _ = shutdown.notified() => {
                    tracing::info!("shutdown signal received, draining in-flight work");
                    return Ok(());
                }
                _ = reconnect_signal.notified() => {
                    tracing::warn!("watchdog fired, reconnecting relay client");
                    if let Err(e) = self.relay.reconnect(
                        self.config.reconnect_initial_delay_ms,
                        self.config.reconnect_max_delay_ms,
                        self.config.reconnect_request_timeout_ms,
                    ).await {
                        tracing::error!(error = %e, "watchdog-triggered reconnect failed");
                    }
                }
                _ = tokio::time::sleep(tick) => {
                    if let Err(fatal) = self.tick().await {
                        self.shutdown_with_grace(&fatal).await;
                        return Err(fatal);
                    }
                }
            }
        }
    }

    async fn shutdown_with_grace(&self, fatal: &SkewFatal) {
        tracing::error!(reason = %fatal, "fatal skew condition, shutting down after grace period");
        tokio::time::sleep(Duration::from_secs(
            self.config.waiting_time_before_shutdown_secs,
        ))
        .await;
    }

    async fn tick(&mut self) -> Result<(), SkewFatal> {
        self.era_tracker
            .check_update_delay(self.config.era_update_delay_secs)?;

        if self.arbiter.is_blacklisted(self.relay.url()) {
            let err = crate::error::ChainError::Blacklisted {
                endpoint: self.relay.url().to_string(),
            };
            tracing::warn!(error = %err, "skipping tick");
            return Ok(());
        }

        let change = match self.era_tracker.observe(&self.relay).await {
            Ok(change) => change,
            Err(e) => {
                metrics::RELAY_EXCEPTIONS_COUNT.inc();
                if self.arbiter.record_failure(self.relay.url()) {
                    self.handle.set_recovering(true).await;
                }
                tracing::warn!(error = %e, "relay tick failed");
                return Ok(());
            }
        };

        self.arbiter.record_success(self.relay.url());
        if !self.arbiter.expire_cooldowns() {
            self.handle.set_recovering(false).await;
        }

        let Some(change) = change else {
            return Ok(());
        };

        let _ = self.era_advance_tx.send(std::time::Instant::now());
        metrics::ACTIVE_ERA_ID.set(change.era_id as f64);
        metrics::PREVIOUS_ERA_CHANGE_BLOCK_NUMBER
            .set(change.previous_era_change_block_number as f64);

        let contract_era_id = match self.oracle_master.get_current_era_id(&self.parachain).await {
            Ok(id) => id,
            Err(e) => {
                metrics::PARA_EXCEPTIONS_COUNT.inc();
                tracing::warn!(error = %e, "failed to read contract reportable era");
                return Ok(());
            }
        };

        if contract_era_id != change.era_id {
            tracing::info!(
                era_id = change.era_id,
                contract_era_id,
                "relay era advanced but contract not yet reportable for it"
            );
            return Ok(());
        }

        if let Ok(anchor) = self.oracle_master.anchor_triple(&self.parachain).await {
            if let Ok(remote_era_id) = self.oracle_master.era_id(&self.parachain).await {
                self.era_tracker.check_skew(
                    remote_era_id,
                    change.era_id,
                    &anchor,
                    self.config.era_delay_time_secs,
                )?;
            }
        }

        self.process_era(change.era_id, change.block_hash).await;
        Ok(())
    }

    async fn process_era(&mut self, era_id: u64, block_hash: subxt::utils::H256) {
        self.handle.set_base(BaseState::Processing).await;

        let stashes = match StashDiscovery::new(&self.oracle_master)
            .discover(&self.parachain)
            .await
        {
            Ok(stashes) => stashes,
            Err(e) => {
                metrics::PARA_EXCEPTIONS_COUNT.inc();
                tracing::warn!(error = %e, "stash discovery failed");
                self.handle.set_base(BaseState::Monitoring).await;
                return;
            }
        };

        if stashes.is_empty() {
            tracing::info!(era_id, "no stashes reported by contract, skipping era");
            self.handle.set_base(BaseState::Monitoring).await;
            return;
        }

        let builder = ReportBuilder::new(&self.relay);
        let submitter = Submitter::new(
            &self.oracle_master,
            self.signer.address(),
            self.config.gas_limit,
            self.config.max_priority_fee_per_gas,
            self.config.mode,
        );

        let parachain_blacklisted = self.arbiter.is_blacklisted(self.parachain.url());
        if parachain_blacklisted {
            let err = crate::error::ChainError::Blacklisted {
                endpoint: self.parachain.url().to_string(),
            };
            tracing::warn!(error = %err, "skipping submissions for this era");
        }

        let mut all_ok = !parachain_blacklisted;
        let mut total_free_balance = ethers::types::U256::zero();

        for stash in &stashes {
            let report = match builder.build(stash.clone(), block_hash).await {
                Ok(report) => report,
                Err(e) => {
                    metrics::RELAY_EXCEPTIONS_COUNT.inc();
                    tracing::warn!(error = %e, "report build failed, skipping stash for this era");
                    all_ok = false;
                    continue;
                }
            };

            total_free_balance += report.stash_balance;

            if parachain_blacklisted {
                continue;
            }

            match submitter.submit(&self.parachain, era_id, stash, &report).await {
                Ok(SubmitOutcome::Success) => {
                    metrics::TX_SUCCESS.observe(1.0);
                }
                Ok(SubmitOutcome::AlreadyReported) => {}
                Ok(SubmitOutcome::DebugSkipped) => {}
                Ok(SubmitOutcome::Reverted) => {
                    metrics::TX_REVERT.observe(1.0);
                    metrics::LAST_FAILED_ERA.set(era_id as f64);
                    all_ok = false;
                }
                Err(e) => {
                    metrics::PARA_EXCEPTIONS_COUNT.inc();
                    tracing::warn!(error = %e, "submission transport error");
                    if self.arbiter.record_failure(self.parachain.url()) {
                        self.handle.set_recovering(true).await;
                    }
                    all_ok = false;
                }
            }
        }

        metrics::TOTAL_STASHES_FREE_BALANCE
            .set(total_free_balance.as_u128() as f64 / 1e18);

        if let Ok(balance) = self.parachain.get_balance(self.signer.address()).await {
            metrics::ORACLE_BALANCE.set(balance.as_u128() as f64 / 1e18);
        }

        if all_ok && !self.config.mode.is_debug() {
            self.last_era_reported = Some(era_id);
            metrics::LAST_ERA_REPORTED.set(era_id as f64);
            metrics::TIME_ELAPSED_UNTIL_LAST_ERA_REPORT
                .set(self.era_tracker.seconds_since_last_advance().as_secs_f64());
        }

        self.handle.set_base(BaseState::Monitoring).await;
    }
}
