// Copyright (C) 2026 Parity Technologies (UK) Ltd.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Prometheus registry: one `lazy_static` custom `Registry`, one
//! `Once`-guarded `init()`, one `gather_metrics()` returning text-encoded
//! output for the oracle daemon's metric set.

use lazy_static::lazy_static;
use prometheus::{
    Encoder, Gauge, GaugeVec, Histogram, IntGauge, Registry, TextEncoder, register_gauge,
    register_gauge_vec, register_histogram, register_int_gauge,
};

lazy_static! {
    pub static ref REGISTRY: Registry = Registry::new_custom(Some("oracle".to_string()), None)
        .expect("Failed to create Prometheus registry");

    pub static ref IS_RECOVERY_MODE_ACTIVE: IntGauge = register_int_gauge!(
        "is_recovery_mode_active",
        "1 while any endpoint is blacklisted, 0 otherwise"
    )
    .expect("Failed to create is_recovery_mode_active gauge");

    pub static ref ACTIVE_ERA_ID: Gauge = register_gauge!(
        "active_era_id",
        "Most recently observed relay chain active era"
    )
    .expect("Failed to create active_era_id gauge");

    pub static ref LAST_ERA_REPORTED: Gauge = register_gauge!(
        "last_era_reported",
        "Last era for which every stash was reported or already reported"
    )
    .expect("Failed to create last_era_reported gauge");

    pub static ref LAST_FAILED_ERA: Gauge = register_gauge!(
        "last_failed_era",
        "Last era that saw at least one reverted report"
    )
    .expect("Failed to create last_failed_era gauge");

    pub static ref PREVIOUS_ERA_CHANGE_BLOCK_NUMBER: Gauge = register_gauge!(
        "previous_era_change_block_number",
        "Relay chain block number of the most recent era boundary"
    )
    .expect("Failed to create previous_era_change_block_number gauge");

    pub static ref TIME_ELAPSED_UNTIL_LAST_ERA_REPORT: Gauge = register_gauge!(
        "time_elapsed_until_last_era_report",
        "Seconds between era boundary and the last era being fully reported"
    )
    .expect("Failed to create time_elapsed_until_last_era_report gauge");

    pub static ref TOTAL_STASHES_FREE_BALANCE: Gauge = register_gauge!(
        "total_stashes_free_balance",
        "Sum of free balance across all tracked stash accounts in the last era"
    )
    .expect("Failed to create total_stashes_free_balance gauge");

    pub static ref ORACLE_BALANCE: Gauge = register_gauge!(
        "oracle_balance",
        "Parachain native balance of the oracle's signing account"
    )
    .expect("Failed to create oracle_balance gauge");

    pub static ref TX_REVERT: Histogram = register_histogram!(
        "tx_revert",
        "Observations of reverted reportRelay submissions"
    )
    .expect("Failed to create tx_revert histogram");

    pub static ref TX_SUCCESS: Histogram = register_histogram!(
        "tx_success",
        "Observations of successful reportRelay submissions"
    )
    .expect("Failed to create tx_success histogram");

    pub static ref PARA_EXCEPTIONS_COUNT: Gauge = register_gauge!(
        "para_exceptions_count",
        "Cumulative count of parachain RPC exceptions"
    )
    .expect("Failed to create para_exceptions_count gauge");

    pub static ref RELAY_EXCEPTIONS_COUNT: Gauge = register_gauge!(
        "relay_exceptions_count",
        "Cumulative count of relay chain RPC exceptions"
    )
    .expect("Failed to create relay_exceptions_count gauge");

    pub static ref AGENT: GaugeVec = register_gauge_vec!(
        "agent",
        "Info metric carrying the connected relay chain URL as a label",
        &["relay_url"]
    )
    .expect("Failed to create agent info gauge");
}

/// Registers every metric with the custom registry. Idempotent.
pub fn init() {
    use std::sync::Once;
    static INIT: Once = Once::new();

    INIT.call_once(|| {
        REGISTRY
            .register(Box::new(IS_RECOVERY_MODE_ACTIVE.clone()))
            .expect("Failed to register is_recovery_mode_active");
        REGISTRY
            .register(Box::new(ACTIVE_ERA_ID.clone()))
            .expect("Failed to register active_era_id");
        REGISTRY
            .register(Box::new(LAST_ERA_REPORTED.clone()))
            .expect("Failed to register last_era_reported");
        REGISTRY
            .register(Box::new(LAST_FAILED_ERA.clone()))
            .expect("Failed to register last_failed_era");
        REGISTRY
            .register(Box::new(PREVIOUS_ERA_CHANGE_BLOCK_NUMBER.clone()))
            .expect("Failed to register previous_era_change_block_number");
        REGISTRY
            .register(Box::new(TIME_ELAPSED_UNTIL_LAST_ERA_REPORT.clone()))
            .expect("Failed to register time_elapsed_until_last_era_report");
        REGISTRY
            .register(Box::new(TOTAL_STASHES_FREE_BALANCE.clone()))
            .expect("Failed to register total_stashes_free_balance");
        REGISTRY
            .register(Box::new(ORACLE_BALANCE.clone()))
            .expect("Failed to register oracle_balance");
        REGISTRY
            .register(Box::new(TX_REVERT.clone()))
            .expect("Failed to register tx_revert");
        REGISTRY
            .register(Box::new(TX_SUCCESS.clone()))
            .expect("Failed to register tx_success");
        REGISTRY
            .register(Box::new(PARA_EXCEPTIONS_COUNT.clone()))
            .expect("Failed to register para_exceptions_count");
        REGISTRY
            .register(Box::new(RELAY_EXCEPTIONS_COUNT.clone()))
            .expect("Failed to register relay_exceptions_count");
        REGISTRY
            .register(Box::new(AGENT.clone()))
            .expect("Failed to register agent");
    });
}

/// Gather all metrics as Prometheus text format.
pub fn gather_metrics() -> Result<String, Box<dyn std::error::Error>> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gather_contains_every_documented_metric() {
        init();
        ACTIVE_ERA_ID.set(42.0);
        TX_SUCCESS.observe(1.0);
        AGENT.with_label_values(&["wss://relay.example"]).set(1.0);

        let text = gather_metrics().expect("should gather");
        for name in [
            "oracle_is_recovery_mode_active",
            "oracle_active_era_id",
            "oracle_last_era_reported",
            "oracle_last_failed_era",
            "oracle_previous_era_change_block_number",
            "oracle_time_elapsed_until_last_era_report",
            "oracle_total_stashes_free_balance",
            "oracle_oracle_balance",
            "oracle_tx_revert",
            "oracle_tx_success",
            "oracle_para_exceptions_count",
            "oracle_relay_exceptions_count",
            "oracle_agent",
        ] {
            assert!(text.contains(name), "missing metric {name}");
        }
    }
}
