// SPDX-License-Identifier: AGPL-3.0-or-later
// © 2025 Ryo ∴ SpiralArchitect (kishkavsesvit@icloud.com)
// Part of torch2grid — Licensed under AGPL-3.0-or-later.

use crate::plugin::PluginRegistry;
use crate::telemetry;
use t2g_config::GridConfig;
use tracing::{debug, info, warn};

/// Builds a registry with the built-ins plus, when enabled, every plugin
/// library found in the configured directory.
///
/// A missing plugin directory is normal and only logged at debug level.
pub fn registry_from_config(config: &GridConfig) -> PluginRegistry {
    let registry = PluginRegistry::new();
    if !config.auto_load_plugins {
        return registry;
    }

    let dir = &config.plugin_directory;
    if !dir.is_dir() {
        debug!(dir = %dir.display(), "plugin directory not present, skipping auto-load");
        return registry;
    }

    match registry.load_from_directory(dir) {
        Ok(count) => info!(dir = %dir.display(), count = count, "auto-loaded plugins"),
        Err(err) => warn!(dir = %dir.display(), "plugin auto-load failed: {err}"),
    }
    registry
}

/// Application entry point: sets up logging through
/// [`telemetry::init_tracing`], then runs [`registry_from_config`] with the
/// process configuration read from the `TORCH2GRID_*` environment variables.
///
/// A subscriber installed by the host beforehand is left in place.
pub fn registry_from_env() -> PluginRegistry {
    telemetry::init_tracing();
    registry_from_config(t2g_config::config())
}
