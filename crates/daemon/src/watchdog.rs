// Copyright (C) 2026 Parity Technologies (UK) Ltd.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Era watchdog: a `tokio::time`-driven timer that fires if no era change has
//! been observed within `ERA_DURATION_IN_SECONDS + WATCHDOG_DELAY`. On fire,
//! signals the Reporter to force-reconnect the relay client and rearms
//! itself.

use std::time::Duration;
use tokio::sync::Notify;

/// How much slack beyond `ERA_DURATION_IN_SECONDS` the watchdog allows
/// before it decides the relay client is stuck.
pub const WATCHDOG_DELAY_SECS: u64 = 5;

pub struct Watchdog {
    period: Duration,
    reconnect_signal: std::sync::Arc<Notify>,
}

impl Watchdog {
    pub fn new(era_duration_in_seconds: u64) -> Self {
        Self {
            period: Duration::from_secs(era_duration_in_seconds + WATCHDOG_DELAY_SECS),
            reconnect_signal: std::sync::Arc::new(Notify::new()),
        }
    }

    pub fn reconnect_signal(&self) -> std::sync::Arc<Notify> {
        self.reconnect_signal.clone()
    }

    /// Runs until `shutdown` fires. `last_advance` is re-read on every tick
    /// so the window resets whenever the Reporter observes a genuine era
    /// change, without the watchdog needing its own copy of era state. After
    /// firing, rearms from `now` rather than the stale `last_advance` value,
    /// so a still-stuck relay client doesn't spin: it waits one more full
    /// `period` before firing again.
    pub async fn run(
        self,
        mut last_advance: tokio::sync::watch::Receiver<std::time::Instant>,
        shutdown: std::sync::Arc<Notify>,
    ) {
        let mut last_fired_at: Option<tokio::time::Instant> = None;

        loop {
            let base = match last_fired_at {
                Some(fired) if fired > (*last_advance.borrow()).into() => fired,
                _ => (*last_advance.borrow()).into(),
            };
            let deadline = base + self.period;

            tokio::select! {
                _ = shutdown.notified() => return,
                _ = last_advance.changed() => {
                    last_fired_at = None;
                    continue;
                }
                _ = tokio::time::sleep_until(deadline) => {
                    if last_advance.borrow().elapsed() >= self.period {
                        tracing::warn!("watchdog: no era advance observed in window, forcing relay reconnect");
                        self.reconnect_signal.notify_one();
                        last_fired_at = Some(tokio::time::Instant::now());
                    } else {
                        last_fired_at = None;
                    }
                }
            }
        }
    }
}
