// SPDX-License-Identifier: AGPL-3.0-or-later
// © 2025 Ryo ∴ SpiralArchitect (kishkavsesvit@icloud.com)
// Part of torch2grid — Licensed under AGPL-3.0-or-later.

//! Process-wide logging setup for applications embedding torch2grid.

use std::sync::OnceLock;

use t2g_config::tracing::{self as config_tracing, InitError};
use tracing::{debug, warn};

static SUBSCRIBER: OnceLock<bool> = OnceLock::new();

/// Installs the torch2grid subscriber unless the host already installed one.
///
/// Returns `true` when events are being recorded by some global subscriber,
/// ours or the host's. Only the first call does any work.
pub fn init_tracing() -> bool {
    *SUBSCRIBER.get_or_init(|| match config_tracing::init_tracing() {
        Ok(()) => true,
        Err(InitError::AlreadyInitialised) | Err(InitError::Subscriber(_)) => {
            debug!("global tracing subscriber already installed, keeping it");
            true
        }
        Err(err) => {
            warn!("torch2grid logging disabled: {err}");
            false
        }
    })
}
