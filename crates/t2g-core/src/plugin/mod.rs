// SPDX-License-Identifier: AGPL-3.0-or-later
// © 2025 Ryo ∴ SpiralArchitect (kishkavsesvit@icloud.com)
// Part of torch2grid — Licensed under AGPL-3.0-or-later.

//! Pluggable tensor-to-grid strategies.
//!
//! - [`TransformerPlugin`]: the strategy contract, with default hooks
//! - [`PluginPipeline`]: the fixed preprocess, transform, postprocess run
//! - [`PluginRegistry`]: name-keyed catalog, seeded with the built-ins
//! - [`loader`]: shared-library plugins and the [`export_plugins!`](crate::export_plugins) macro
//!
//! # Examples
//!
//! ```rust
//! use t2g_core::plugin::{PluginPipeline, PluginRegistry, TransformerPlugin};
//! use t2g_core::{Grid, TensorCollection};
//!
//! struct Ones;
//!
//! impl TransformerPlugin for Ones {
//!     fn name(&self) -> &str {
//!         "ones"
//!     }
//!
//!     fn transform(&self, _tensors: &TensorCollection) -> Grid {
//!         Grid::ones((2, 2))
//!     }
//! }
//!
//! let registry = PluginRegistry::new();
//! registry.register(Box::new(Ones))?;
//! let grid = registry.get("ones").unwrap().run(&TensorCollection::new());
//! assert_eq!(grid.sum(), 4.0);
//! # Ok::<(), t2g_core::GridError>(())
//! ```

pub mod builtin;
pub mod loader;
pub mod registry;
pub mod traits;

pub use builtin::{
    builtin_plugins, FlattenTransformer, LayerSeparatedTransformer, LayerWeightedTransformer,
    NormalizedTransformer, SpiralTransformer,
};
pub use loader::{
    default_factory, PluginDeclaration, PluginFactory, PluginRegistrar, CORE_VERSION,
    DECLARATION_SYMBOL,
};
pub use registry::PluginRegistry;
pub use traits::{PluginHandle, PluginInfo, PluginPipeline, TransformerPlugin, DEFAULT_DESCRIPTION};
