// Copyright (C) 2026 Parity Technologies (UK) Ltd.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Axum state. This daemon's HTTP surface never touches the chain directly,
//! so `AppState` only needs the shared `ReporterHandle` the Reporter loop
//! publishes its status through.

use crate::reporter::ReporterHandle;

#[derive(Clone)]
pub struct AppState {
    pub reporter: ReporterHandle,
}

impl AppState {
    pub fn new(reporter: ReporterHandle) -> Self {
        Self { reporter }
    }
}
