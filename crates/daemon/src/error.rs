// Copyright (C) 2026 Parity Technologies (UK) Ltd.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Error taxonomy. Each enum is a `thiserror::Error` impl, matching the
//! config crate's per-section errors rather than a stringly-typed bucket.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChainError {
    #[error("transport error talking to {endpoint}: {reason}")]
    Transport { endpoint: String, reason: String },

    #[error("RPC call to {endpoint} timed out after {timeout_secs}s")]
    Timeout { endpoint: String, timeout_secs: u64 },

    #[error("endpoint {endpoint} is blacklisted, cooldown not yet expired")]
    Blacklisted { endpoint: String },
}

#[derive(Debug, Error)]
#[error("failed to decode {field} for stash {stash}: {reason}")]
pub struct RelayDataError {
    pub field: &'static str,
    pub stash: String,
    pub reason: String,
}

#[derive(Debug, Error)]
pub enum ParaError {
    #[error("parachain RPC error calling {method}: {reason}")]
    Rpc { method: &'static str, reason: String },
}

#[derive(Debug, Error)]
#[error("era skew detected: {reason}")]
pub struct SkewFatal {
    pub reason: String,
}
