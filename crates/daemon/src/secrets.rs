// Copyright (C) 2026 Parity Technologies (UK) Ltd.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Oracle private key loading. The key is the one configuration value that
//! is never logged: `OracleSigner`'s `Debug` impl redacts it, and the raw
//! string is zeroized immediately after the wallet is derived from it.

use ethers::signers::{LocalWallet, Signer};
use oracle_daemon_config::KeySource;
use std::fmt;
use thiserror::Error;
use zeroize::Zeroize;

#[derive(Debug, Error)]
pub enum SecretError {
    #[error("failed to read key file at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse private key material: {0}")]
    InvalidKey(String),
}

/// Wraps the derived wallet; `Debug` never prints key material.
#[derive(Clone)]
pub struct OracleSigner {
    wallet: LocalWallet,
}

impl fmt::Debug for OracleSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OracleSigner")
            .field("address", &self.wallet.address())
            .finish()
    }
}

impl OracleSigner {
    pub fn load(source: &KeySource, chain_id: u64) -> Result<Self, SecretError> {
        let mut raw = match source {
            KeySource::Inline(key) => key.clone(),
            KeySource::Path(path) => std::fs::read_to_string(path)
                .map_err(|source| SecretError::Io {
                    path: path.clone(),
                    source,
                })?
                .trim()
                .to_string(),
        };

        let wallet = raw
            .parse::<LocalWallet>()
            .map_err(|e| SecretError::InvalidKey(e.to_string()))?
            .with_chain_id(chain_id);

        raw.zeroize();

        Ok(Self { wallet })
    }

    pub fn address(&self) -> ethers::types::Address {
        self.wallet.address()
    }

    pub fn wallet(&self) -> &LocalWallet {
        &self.wallet
    }
}
