// Copyright (C) 2026 Parity Technologies (UK) Ltd.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Per-endpoint failure counting, generalized into an explicit
//! blacklist/cooldown policy with one `EndpointState` per chain client.

use std::collections::HashMap;
use tokio::time::Instant;

#[derive(Debug, Clone)]
pub struct EndpointState {
    pub url: String,
    pub consecutive_failures: u32,
    pub blacklisted_until: Option<Instant>,
}

impl EndpointState {
    fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            consecutive_failures: 0,
            blacklisted_until: None,
        }
    }

    pub fn is_blacklisted(&self, now: Instant) -> bool {
        matches!(self.blacklisted_until, Some(until) if until > now)
    }
}

/// Tracks per-endpoint failure counts across both ChainClients and decides
/// when the daemon enters/exits recovery mode. An endpoint over threshold is
/// never queried again before its cooldown expires.
pub struct FailureArbiter {
    endpoints: HashMap<String, EndpointState>,
    max_failures: u32,
    cooldown: std::time::Duration,
    recovery_active: bool,
    probe_succeeded_since_recovery: bool,
}

impl FailureArbiter {
    pub fn new(max_failures: u32, cooldown: std::time::Duration) -> Self {
        Self {
            endpoints: HashMap::new(),
            max_failures,
            cooldown,
            recovery_active: false,
            probe_succeeded_since_recovery: false,
        }
    }

    fn endpoint_mut(&mut self, url: &str) -> &mut EndpointState {
        self.endpoints
            .entry(url.to_string())
            .or_insert_with(|| EndpointState::new(url))
    }

    /// Record a successful RPC call, resetting the endpoint's failure count.
    pub fn record_success(&mut self, url: &str) {
        let entry = self.endpoint_mut(url);
        entry.consecutive_failures = 0;
        entry.blacklisted_until = None;

        if self.recovery_active {
            self.probe_succeeded_since_recovery = true;
        }
    }

    /// Record a failed RPC call. Returns `true` if this call tipped the
    /// endpoint into blacklist (threshold exceeded ⇒ recovery mode).
    pub fn record_failure(&mut self, url: &str) -> bool {
        let now = Instant::now();
        let cooldown = self.cooldown;
        let max_failures = self.max_failures;
        let entry = self.endpoint_mut(url);
        entry.consecutive_failures += 1;

        if entry.consecutive_failures > max_failures && entry.blacklisted_until.is_none() {
            entry.blacklisted_until = Some(now + cooldown);
            self.recovery_active = true;
            self.probe_succeeded_since_recovery = false;
            return true;
        }
        false
    }

    pub fn is_blacklisted(&self, url: &str) -> bool {
        let now = Instant::now();
        self.endpoints
            .get(url)
            .map(|e| e.is_blacklisted(now))
            .unwrap_or(false)
    }

    /// Expire cooldowns whose deadline has passed; recompute whether
    /// recovery mode should still be active. Call on every tick.
    pub fn expire_cooldowns(&mut self) -> bool {
        let now = Instant::now();
        for endpoint in self.endpoints.values_mut() {
            if let Some(until) = endpoint.blacklisted_until {
                if until <= now {
                    endpoint.blacklisted_until = None;
                }
            }
        }

        let still_blacklisted = self.endpoints.values().any(|e| e.is_blacklisted(now));
        if !still_blacklisted && self.recovery_active && self.probe_succeeded_since_recovery {
            self.recovery_active = false;
        }
        self.recovery_active
    }

    pub fn is_recovery_active(&self) -> bool {
        self.recovery_active
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_blacklist_after_threshold() {
        let mut arbiter = FailureArbiter::new(2, Duration::from_millis(20));
        assert!(!arbiter.record_failure("wss://relay"));
        assert!(!arbiter.record_failure("wss://relay"));
        assert!(arbiter.record_failure("wss://relay"));
        assert!(arbiter.is_blacklisted("wss://relay"));
        assert!(arbiter.is_recovery_active());
    }

    #[tokio::test]
    async fn test_cooldown_expiry_requires_success_probe() {
        let mut arbiter = FailureArbiter::new(1, Duration::from_millis(10));
        arbiter.record_failure("wss://relay");
        arbiter.record_failure("wss://relay");
        assert!(arbiter.is_recovery_active());

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(arbiter.expire_cooldowns());
        assert!(!arbiter.is_blacklisted("wss://relay"));

        arbiter.record_success("wss://relay");
        assert!(!arbiter.expire_cooldowns());
    }

    #[test]
    fn test_unrelated_endpoint_unaffected() {
        let mut arbiter = FailureArbiter::new(1, Duration::from_millis(100));
        arbiter.record_failure("wss://relay");
        arbiter.record_failure("wss://relay");
        assert!(!arbiter.is_blacklisted("wss://para"));
    }
}
