// SPDX-License-Identifier: AGPL-3.0-or-later
// © 2025 Ryo ∴ SpiralArchitect (kishkavsesvit@icloud.com)
// Part of torch2grid — Licensed under AGPL-3.0-or-later.

//! Process-level configuration shared by the torch2grid crates.
//!
//! Settings are read from `TORCH2GRID_*` environment variables; the tracing
//! bootstrap lives next to them so binaries only need a single dependency to
//! get a configured process.

pub mod settings;
pub mod tracing;

pub use settings::{config, GridConfig};
