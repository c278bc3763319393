// SPDX-License-Identifier: AGPL-3.0-or-later
// © 2025 Ryo ∴ SpiralArchitect (kishkavsesvit@icloud.com)
// Part of torch2grid — Licensed under AGPL-3.0-or-later.

//! Tensor-to-grid transformation for model weight inspection.
//!
//! A [`TensorCollection`] of named parameter tensors is mapped onto a 2D
//! [`Grid`] by a [`TransformerPlugin`](plugin::TransformerPlugin) chosen from a
//! [`PluginRegistry`](plugin::PluginRegistry). Loading checkpoints and drawing
//! the grid are left to the caller.
//!
//! ```rust
//! use ndarray::{arr1, arr2};
//! use t2g_core::{to_neutral_grid, PluginRegistry, TensorCollection};
//!
//! let mut tensors = TensorCollection::new();
//! tensors.insert("a.weight", arr2(&[[1.0_f32, 2.0], [3.0, 4.0]]));
//! tensors.insert("a.bias", arr1(&[5.0_f32, 6.0]));
//!
//! let registry = PluginRegistry::new();
//! let grid = to_neutral_grid(&tensors, Some("flatten"), Some(&registry));
//! assert_eq!(grid.dim(), (3, 3));
//! assert_eq!(grid[[1, 2]], 6.0);
//! ```

pub mod bootstrap;
pub mod error;
pub mod grid;
pub mod neutral;
pub mod plugin;
pub mod telemetry;
pub mod tensor;

pub use error::{GridError, GridResult};
pub use grid::Grid;
pub use neutral::{resolve_plugin, to_neutral_grid, DEFAULT_PLUGIN};
pub use plugin::{PluginHandle, PluginPipeline, PluginRegistry, TransformerPlugin};
pub use tensor::TensorCollection;
