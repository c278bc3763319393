// SPDX-License-Identifier: AGPL-3.0-or-later
// © 2025 Ryo ∴ SpiralArchitect (kishkavsesvit@icloud.com)
// Part of torch2grid — Licensed under AGPL-3.0-or-later.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::OnceLock;

const PLUGIN_DIRECTORY_VAR: &str = "TORCH2GRID_PLUGIN_DIRECTORY";
const AUTO_LOAD_PLUGINS_VAR: &str = "TORCH2GRID_AUTO_LOAD_PLUGINS";

/// Settings consumed by the plugin bootstrap.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Directory scanned for plugin libraries at start-up.
    pub plugin_directory: PathBuf,
    /// Whether the bootstrap should scan `plugin_directory` at all.
    pub auto_load_plugins: bool,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            plugin_directory: PathBuf::from("plugins"),
            auto_load_plugins: true,
        }
    }
}

impl GridConfig {
    /// Builds a configuration snapshot from environment variables, keeping the
    /// defaults for anything unset or blank.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let plugin_directory = std::env::var(PLUGIN_DIRECTORY_VAR)
            .ok()
            .filter(|raw| !raw.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or(defaults.plugin_directory);

        let auto_load_plugins = std::env::var(AUTO_LOAD_PLUGINS_VAR)
            .ok()
            .filter(|raw| !raw.trim().is_empty())
            .map(|raw| parse_flag(&raw))
            .unwrap_or(defaults.auto_load_plugins);

        Self {
            plugin_directory,
            auto_load_plugins,
        }
    }

    pub fn with_plugin_directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.plugin_directory = dir.into();
        self
    }

    pub fn with_auto_load(mut self, enabled: bool) -> Self {
        self.auto_load_plugins = enabled;
        self
    }
}

fn parse_flag(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "true" | "1" | "yes" | "on"
    )
}

static CONFIG: OnceLock<GridConfig> = OnceLock::new();

/// Returns the lazily initialised process configuration.
pub fn config() -> &'static GridConfig {
    CONFIG.get_or_init(GridConfig::from_env)
}
