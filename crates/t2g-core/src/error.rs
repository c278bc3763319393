// SPDX-License-Identifier: AGPL-3.0-or-later
// © 2025 Ryo ∴ SpiralArchitect (kishkavsesvit@icloud.com)
// Part of torch2grid — Licensed under AGPL-3.0-or-later.

use std::path::PathBuf;
use thiserror::Error;

pub type GridResult<T> = std::result::Result<T, GridError>;

/// Errors raised by the plugin registry and loader.
///
/// Transforms themselves never fail; degenerate input always yields a minimal
/// grid instead of an error.
#[derive(Debug, Error)]
pub enum GridError {
    /// A plugin does not satisfy the transformer contract.
    #[error("plugin contract violated: {0}")]
    Contract(String),
    #[error("plugin file not found: {}", .0.display())]
    PluginFileNotFound(PathBuf),
    #[error("not a directory: {}", .0.display())]
    NotADirectory(PathBuf),
    /// The file exists but could not be opened as a shared library.
    #[error("could not load plugin library {}: {source}", path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: libloading::Error,
    },
    #[error("{} does not export a torch2grid plugin declaration", .0.display())]
    MissingDeclaration(PathBuf),
    #[error("plugin declaration from {origin} targets t2g-core {found}, expected {expected}")]
    VersionMismatch {
        origin: String,
        expected: String,
        found: String,
    },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub(crate) fn contract(message: impl Into<String>) -> GridError {
    GridError::Contract(message.into())
}
