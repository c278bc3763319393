// SPDX-License-Identifier: AGPL-3.0-or-later
// © 2025 Ryo ∴ SpiralArchitect (kishkavsesvit@icloud.com)
// Part of torch2grid — Licensed under AGPL-3.0-or-later.

//! Entry point turning a tensor collection into a grid through the registry.

use crate::grid::{square_row_major, Grid};
use crate::plugin::{FlattenTransformer, PluginHandle, PluginPipeline, PluginRegistry};
use crate::tensor::TensorCollection;
use tracing::{debug, warn};

/// Strategy used when none is requested or the requested one is unknown.
pub const DEFAULT_PLUGIN: &str = FlattenTransformer::NAME;

/// Resolve `plugin_name` against `registry`, falling back to
/// [`DEFAULT_PLUGIN`] when the name is missing or unknown.
///
/// Returns `None` only when the default itself is not registered.
pub fn resolve_plugin(registry: &PluginRegistry, plugin_name: Option<&str>) -> Option<PluginHandle> {
    if let Some(name) = plugin_name {
        if let Some(plugin) = registry.get(name) {
            debug!(plugin = name, "resolved requested plugin");
            return Some(plugin);
        }
        warn!(
            plugin = name,
            fallback = DEFAULT_PLUGIN,
            "plugin not found, falling back to default"
        );
    }
    registry.get(DEFAULT_PLUGIN)
}

/// Convert `tensors` into a grid using the named plugin.
///
/// Without a registry, or when the registry has lost the default plugin, the
/// flatten placement runs inline and yields exactly what
/// [`FlattenTransformer`] would.
pub fn to_neutral_grid(
    tensors: &TensorCollection,
    plugin_name: Option<&str>,
    registry: Option<&PluginRegistry>,
) -> Grid {
    let plugin = registry.and_then(|registry| resolve_plugin(registry, plugin_name));
    match plugin {
        Some(plugin) => plugin.run(tensors),
        None => {
            if registry.is_some() {
                warn!(
                    plugin = DEFAULT_PLUGIN,
                    "default plugin is not registered, flattening inline"
                );
            }
            square_row_major(&tensors.flat_values())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugin::LayerSeparatedTransformer;
    use ndarray::{arr1, arr2, Array, Array4};

    fn sample() -> TensorCollection {
        let mut tensors = TensorCollection::new();
        tensors.insert(
            "layer1.weight",
            Array::from_iter((0..50).map(|v| (v as f32 * 0.3).cos()))
                .into_shape((10, 5))
                .unwrap(),
        );
        tensors.insert("layer1.bias", arr1(&[0.1_f32; 10]));
        tensors.insert("conv.weight", Array4::<f32>::from_elem((2, 1, 3, 3), -0.5));
        tensors.insert_absent("bn.num_batches_tracked");
        tensors
    }

    #[test]
    fn empty_input_is_all_zero() {
        let registry = PluginRegistry::new();
        let grid = to_neutral_grid(&TensorCollection::new(), None, Some(&registry));
        assert_eq!(grid.ndim(), 2);
        assert!(grid.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn absent_only_collapses_to_single_zero() {
        let mut tensors = TensorCollection::new();
        tensors.insert_absent("w");
        let registry = PluginRegistry::new();
        assert_eq!(
            to_neutral_grid(&tensors, None, Some(&registry)),
            arr2(&[[0.0]])
        );
    }

    #[test]
    fn unknown_plugin_falls_back_to_flatten() {
        let registry = PluginRegistry::new();
        let tensors = sample();
        assert_eq!(
            to_neutral_grid(&tensors, Some("doesnotexist"), Some(&registry)),
            to_neutral_grid(&tensors, Some("flatten"), Some(&registry))
        );
    }

    #[test]
    fn requested_plugin_is_used() {
        let registry = PluginRegistry::new();
        let tensors = sample();
        let separated = to_neutral_grid(&tensors, Some("layer_separated"), Some(&registry));
        assert_eq!(separated, LayerSeparatedTransformer.run(&tensors));
        assert_ne!(separated.dim(), to_neutral_grid(&tensors, None, Some(&registry)).dim());
    }

    #[test]
    fn inline_fallback_matches_flatten_plugin() {
        let tensors = sample();
        let via_plugin = FlattenTransformer.run(&tensors);
        assert_eq!(to_neutral_grid(&tensors, None, None), via_plugin);
        assert_eq!(to_neutral_grid(&tensors, Some("spiral"), None), via_plugin);

        let gutted = PluginRegistry::new();
        gutted.unregister(DEFAULT_PLUGIN);
        assert!(resolve_plugin(&gutted, Some("missing")).is_none());
        assert_eq!(to_neutral_grid(&tensors, Some("missing"), Some(&gutted)), via_plugin);
        assert_eq!(
            to_neutral_grid(&TensorCollection::new(), None, None),
            arr2(&[[0.0]])
        );
    }

    #[test]
    fn resolution_prefers_requested_name() {
        let registry = PluginRegistry::new();
        assert_eq!(resolve_plugin(&registry, Some("spiral")).unwrap().name(), "spiral");
        assert_eq!(resolve_plugin(&registry, None).unwrap().name(), "flatten");
        assert_eq!(resolve_plugin(&registry, Some("nope")).unwrap().name(), "flatten");
    }
}
