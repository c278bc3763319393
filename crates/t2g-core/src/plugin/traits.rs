// SPDX-License-Identifier: AGPL-3.0-or-later
// © 2025 Ryo ∴ SpiralArchitect (kishkavsesvit@icloud.com)
// Part of torch2grid — Licensed under AGPL-3.0-or-later.

//! The transformer contract and its fixed invocation pipeline.

use crate::error::{contract, GridResult};
use crate::grid::Grid;
use crate::tensor::TensorCollection;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::sync::Arc;

/// Description reported by plugins that do not provide their own.
pub const DEFAULT_DESCRIPTION: &str = "Custom transformer plugin";

/// A strategy mapping a [`TensorCollection`] onto a 2D [`Grid`].
///
/// Only [`name`](Self::name) and [`transform`](Self::transform) are required.
/// Callers never invoke the hooks one by one; they go through
/// [`PluginPipeline::run`], which always applies `preprocess`, `transform`
/// and `postprocess` in that order.
pub trait TransformerPlugin: Send + Sync {
    /// Registry key. Registering another plugin with the same name replaces
    /// this one.
    fn name(&self) -> &str;

    /// Human-readable summary for listings.
    fn description(&self) -> &str {
        DEFAULT_DESCRIPTION
    }

    /// Whether this plugin wants to handle `tensors` during first-match
    /// resolution. Lookups by name ignore it.
    fn can_handle(&self, _tensors: &TensorCollection) -> bool {
        true
    }

    /// Filters, reorders or rescales the input before [`transform`](Self::transform).
    fn preprocess<'a>(&self, tensors: Cow<'a, TensorCollection>) -> Cow<'a, TensorCollection> {
        tensors
    }

    /// Core placement algorithm.
    ///
    /// Must not panic on empty or all-absent input; return a minimal grid
    /// (usually [`crate::grid::empty_grid`]) instead.
    fn transform(&self, tensors: &TensorCollection) -> Grid;

    /// Final adjustment of the grid, e.g. clipping.
    fn postprocess(&self, grid: Grid) -> Grid {
        grid
    }
}

/// Shared handle to a registered plugin.
pub type PluginHandle = Arc<dyn TransformerPlugin>;

/// Runs the full plugin pipeline. Implemented for every
/// [`TransformerPlugin`] and not meant to be overridden.
pub trait PluginPipeline {
    fn run(&self, tensors: &TensorCollection) -> Grid;
}

impl<P: TransformerPlugin + ?Sized> PluginPipeline for P {
    fn run(&self, tensors: &TensorCollection) -> Grid {
        let prepared = self.preprocess(Cow::Borrowed(tensors));
        let grid = self.transform(&prepared);
        self.postprocess(grid)
    }
}

/// Name and description of a registered plugin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginInfo {
    pub name: String,
    pub description: String,
}

impl PluginInfo {
    pub fn of(plugin: &dyn TransformerPlugin) -> Self {
        Self {
            name: plugin.name().to_string(),
            description: plugin.description().to_string(),
        }
    }
}

/// Checks the parts of the contract the type system cannot express.
pub(crate) fn validate(plugin: &dyn TransformerPlugin) -> GridResult<()> {
    let name = plugin.name();
    if name.trim().is_empty() {
        return Err(contract("plugin name must not be empty"));
    }
    if name.trim() != name {
        return Err(contract(format!(
            "plugin name '{name}' must not carry leading or trailing whitespace"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{empty_grid, square_row_major};
    use ndarray::arr1;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Traced {
        calls: Mutex<Vec<&'static str>>,
    }

    impl TransformerPlugin for Traced {
        fn name(&self) -> &str {
            "traced"
        }

        fn preprocess<'a>(&self, tensors: Cow<'a, TensorCollection>) -> Cow<'a, TensorCollection> {
            self.calls.lock().unwrap().push("preprocess");
            let mut owned = tensors.into_owned();
            owned.retain(|name, _| !name.ends_with(".bias"));
            Cow::Owned(owned)
        }

        fn transform(&self, tensors: &TensorCollection) -> Grid {
            self.calls.lock().unwrap().push("transform");
            square_row_major(&tensors.flat_values())
        }

        fn postprocess(&self, grid: Grid) -> Grid {
            self.calls.lock().unwrap().push("postprocess");
            grid.mapv(|v| v.clamp(-1.0, 1.0))
        }
    }

    struct Bare;

    impl TransformerPlugin for Bare {
        fn name(&self) -> &str {
            "bare"
        }

        fn transform(&self, _tensors: &TensorCollection) -> Grid {
            empty_grid()
        }
    }

    #[test]
    fn pipeline_runs_hooks_in_order() {
        let plugin = Traced::default();
        let mut tensors = TensorCollection::new();
        tensors.insert("fc.weight", arr1(&[0.5_f32, 3.0, -7.0, 0.25]));
        tensors.insert("fc.bias", arr1(&[100.0_f32]));

        let grid = plugin.run(&tensors);

        assert_eq!(
            *plugin.calls.lock().unwrap(),
            vec!["preprocess", "transform", "postprocess"]
        );
        assert_eq!(grid.dim(), (2, 2));
        assert_eq!(grid.iter().copied().collect::<Vec<_>>(), vec![0.5, 1.0, -1.0, 0.25]);
    }

    #[test]
    fn defaults_are_permissive() {
        let plugin = Bare;
        let tensors = TensorCollection::new();
        assert_eq!(plugin.description(), DEFAULT_DESCRIPTION);
        assert!(plugin.can_handle(&tensors));
        let boxed: Box<dyn TransformerPlugin> = Box::new(Bare);
        assert_eq!(boxed.run(&tensors), empty_grid());
    }

    struct Named(&'static str);

    impl TransformerPlugin for Named {
        fn name(&self) -> &str {
            self.0
        }

        fn transform(&self, _tensors: &TensorCollection) -> Grid {
            empty_grid()
        }
    }

    #[test]
    fn validation_rejects_blank_or_padded_names() {
        assert!(validate(&Named("ok")).is_ok());
        assert!(validate(&Named("")).is_err());
        assert!(validate(&Named("   ")).is_err());
        assert!(validate(&Named(" padded")).is_err());
    }
}
