// SPDX-License-Identifier: AGPL-3.0-or-later
// © 2025 Ryo ∴ SpiralArchitect (kishkavsesvit@icloud.com)
// Part of torch2grid — Licensed under AGPL-3.0-or-later.

//! Example plugin library.
//!
//! Build it as a `cdylib` and point `PluginRegistry::load_from_file` (or the
//! `TORCH2GRID_PLUGIN_DIRECTORY` auto-load) at the resulting shared object.

use t2g_core::grid::{square_side, Grid};
use t2g_core::{TensorCollection, TransformerPlugin};

/// Fills the square grid from the bottom-right cell backwards.
#[derive(Debug, Default, Clone, Copy)]
pub struct ReversedTransformer;

impl TransformerPlugin for ReversedTransformer {
    fn name(&self) -> &str {
        "reversed"
    }

    fn description(&self) -> &str {
        "Fills grid in reverse order for a different perspective"
    }

    fn transform(&self, tensors: &TensorCollection) -> Grid {
        let mut values = tensors.flat_values();
        if values.is_empty() {
            values.push(0.0);
        }

        let side = square_side(values.len());
        let last = side * side - 1;
        let mut grid = Grid::zeros((side, side));
        for (i, &value) in values.iter().take(side * side).enumerate() {
            let idx = last - i;
            grid[[idx / side, idx % side]] = value;
        }
        grid
    }
}

t2g_core::export_plugins!(ReversedTransformer);

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{arr1, arr2};
    use t2g_core::plugin::CORE_VERSION;
    use t2g_core::{to_neutral_grid, PluginPipeline, PluginRegistry};

    #[test]
    fn fills_from_the_last_cell() {
        let mut tensors = TensorCollection::new();
        tensors.insert("w", arr1(&[1.0_f32, 2.0, 3.0]));
        assert_eq!(
            ReversedTransformer.run(&tensors),
            arr2(&[[0.0, 3.0], [2.0, 1.0]])
        );
    }

    #[test]
    fn empty_input_is_single_zero() {
        assert_eq!(
            ReversedTransformer.run(&TensorCollection::new()),
            arr2(&[[0.0]])
        );
    }

    #[test]
    fn exported_declaration_registers_the_plugin() {
        assert_eq!(t2g_plugin_declaration.core_version, CORE_VERSION);

        let registry = PluginRegistry::new();
        assert_eq!(registry.load_declaration(&t2g_plugin_declaration).unwrap(), 1);
        assert_eq!(
            registry.plugin_info("reversed").as_deref(),
            Some("Fills grid in reverse order for a different perspective")
        );

        let mut tensors = TensorCollection::new();
        tensors.insert("w", arr1(&[1.0_f32, 2.0, 3.0, 4.0]));
        let grid = to_neutral_grid(&tensors, Some("reversed"), Some(&registry));
        assert_eq!(grid, arr2(&[[4.0, 3.0], [2.0, 1.0]]));
    }
}
