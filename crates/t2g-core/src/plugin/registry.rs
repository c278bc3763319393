// SPDX-License-Identifier: AGPL-3.0-or-later
// © 2025 Ryo ∴ SpiralArchitect (kishkavsesvit@icloud.com)
// Part of torch2grid — Licensed under AGPL-3.0-or-later.

//! Catalog of transformer plugins keyed by name.

use super::builtin::builtin_plugins;
use super::traits::{validate, PluginHandle, PluginInfo, TransformerPlugin};
use crate::error::GridResult;
use crate::tensor::TensorCollection;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{info, warn};

struct PluginSlot {
    name: String,
    plugin: PluginHandle,
}

/// Registry mapping plugin names to shared plugin handles.
///
/// Slots keep registration order; re-registering a name replaces the plugin
/// in its existing slot. The catalog sits behind a single `RwLock` so one
/// registry can be shared across threads through an `Arc`. Plugin hooks are
/// never invoked while the lock is held.
pub struct PluginRegistry {
    slots: RwLock<Vec<PluginSlot>>,
}

impl PluginRegistry {
    /// Create a registry pre-populated with the built-in strategies.
    pub fn new() -> Self {
        let registry = Self::empty();
        for plugin in builtin_plugins() {
            registry.insert(Arc::from(plugin));
        }
        registry
    }

    /// Create a registry with no plugins at all.
    pub fn empty() -> Self {
        Self {
            slots: RwLock::new(Vec::new()),
        }
    }

    /// Register a plugin, replacing any plugin already registered under the
    /// same name.
    pub fn register(&self, plugin: Box<dyn TransformerPlugin>) -> GridResult<()> {
        self.register_handle(Arc::from(plugin))
    }

    /// Register an already shared plugin handle.
    pub fn register_handle(&self, plugin: PluginHandle) -> GridResult<()> {
        validate(plugin.as_ref())?;
        self.insert(plugin);
        Ok(())
    }

    fn insert(&self, plugin: PluginHandle) {
        let name = plugin.name().to_string();
        let mut slots = self.write();
        match slots.iter_mut().find(|slot| slot.name == name) {
            Some(slot) => {
                warn!(plugin = %name, "replacing previously registered plugin");
                slot.plugin = plugin;
            }
            None => {
                info!(plugin = %name, "registered plugin");
                slots.push(PluginSlot { name, plugin });
            }
        }
    }

    /// Remove a plugin by name. Unknown names are ignored.
    pub fn unregister(&self, name: &str) -> Option<PluginHandle> {
        let mut slots = self.write();
        let idx = slots.iter().position(|slot| slot.name == name)?;
        Some(slots.remove(idx).plugin)
    }

    /// Exact-match lookup.
    pub fn get(&self, name: &str) -> Option<PluginHandle> {
        self.read()
            .iter()
            .find(|slot| slot.name == name)
            .map(|slot| Arc::clone(&slot.plugin))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.read().iter().any(|slot| slot.name == name)
    }

    /// Registered names in registration order.
    pub fn list_plugins(&self) -> Vec<String> {
        self.read().iter().map(|slot| slot.name.clone()).collect()
    }

    /// Description of the named plugin.
    pub fn plugin_info(&self, name: &str) -> Option<String> {
        self.get(name).map(|plugin| plugin.description().to_string())
    }

    /// Name and description of every plugin, in registration order.
    pub fn describe(&self) -> Vec<PluginInfo> {
        self.handles()
            .iter()
            .map(|plugin| PluginInfo::of(plugin.as_ref()))
            .collect()
    }

    /// First plugin, in registration order, whose `can_handle` accepts
    /// `tensors`.
    pub fn find_compatible(&self, tensors: &TensorCollection) -> Option<PluginHandle> {
        self.handles()
            .into_iter()
            .find(|plugin| plugin.can_handle(tensors))
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    fn handles(&self) -> Vec<PluginHandle> {
        self.read()
            .iter()
            .map(|slot| Arc::clone(&slot.plugin))
            .collect()
    }

    fn read(&self) -> RwLockReadGuard<'_, Vec<PluginSlot>> {
        self.slots.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<PluginSlot>> {
        self.slots.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for PluginRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PluginRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PluginRegistry({} plugins)", self.len())
    }
}

impl fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginRegistry")
            .field("plugins", &self.list_plugins())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GridError;
    use crate::grid::{empty_grid, Grid};
    use crate::plugin::traits::PluginPipeline;
    use ndarray::arr1;

    struct TestPlugin {
        name: String,
        fill: f64,
    }

    impl TestPlugin {
        fn boxed(name: &str, fill: f64) -> Box<dyn TransformerPlugin> {
            Box::new(Self {
                name: name.to_string(),
                fill,
            })
        }
    }

    impl TransformerPlugin for TestPlugin {
        fn name(&self) -> &str {
            &self.name
        }

        fn transform(&self, _tensors: &TensorCollection) -> Grid {
            Grid::from_elem((1, 1), self.fill)
        }
    }

    /// Only accepts collections containing a four-dimensional tensor.
    struct ConvOnly;

    impl TransformerPlugin for ConvOnly {
        fn name(&self) -> &str {
            "conv_only"
        }

        fn description(&self) -> &str {
            "Only handles convolution kernels"
        }

        fn can_handle(&self, tensors: &TensorCollection) -> bool {
            tensors.present().any(|(_, tensor)| tensor.ndim() == 4)
        }

        fn transform(&self, _tensors: &TensorCollection) -> Grid {
            empty_grid()
        }
    }

    #[test]
    fn new_registry_carries_builtins() {
        let registry = PluginRegistry::new();
        let names = registry.list_plugins();
        for expected in [
            "flatten",
            "layer_weighted",
            "spiral",
            "normalized",
            "layer_separated",
        ] {
            assert!(names.iter().any(|name| name == expected), "{expected}");
        }
        assert_eq!(registry.len(), 5);
        assert_eq!(registry.to_string(), "PluginRegistry(5 plugins)");
        assert_eq!(registry.get("flatten").unwrap().name(), "flatten");
    }

    #[test]
    fn register_get_unregister_round_trip() {
        let registry = PluginRegistry::empty();
        assert!(registry.is_empty());

        registry.register(TestPlugin::boxed("x", 1.0)).unwrap();
        assert_eq!(registry.get("x").unwrap().name(), "x");

        assert!(registry.unregister("x").is_some());
        assert!(registry.get("x").is_none());
        assert!(registry.unregister("x").is_none());
    }

    #[test]
    fn reregistration_replaces_in_place() {
        let registry = PluginRegistry::empty();
        registry.register(TestPlugin::boxed("a", 1.0)).unwrap();
        registry.register(TestPlugin::boxed("b", 2.0)).unwrap();
        registry.register(TestPlugin::boxed("a", 3.0)).unwrap();

        assert_eq!(registry.list_plugins(), vec!["a", "b"]);
        let grid = registry.get("a").unwrap().run(&TensorCollection::new());
        assert_eq!(grid[[0, 0]], 3.0);
    }

    #[test]
    fn lookup_is_exact() {
        let registry = PluginRegistry::new();
        assert!(registry.get("Flatten").is_none());
        assert!(registry.get("flat").is_none());
        assert!(registry.get("flatten ").is_none());
        assert!(registry.contains("spiral"));
    }

    #[test]
    fn contract_violations_are_rejected() {
        let registry = PluginRegistry::empty();
        let err = registry.register(TestPlugin::boxed("", 0.0)).unwrap_err();
        assert!(matches!(err, GridError::Contract(_)));
        assert!(registry.is_empty());
    }

    #[test]
    fn plugin_info_and_describe_report_descriptions() {
        let registry = PluginRegistry::new();
        registry.register(TestPlugin::boxed("custom", 0.0)).unwrap();

        assert_eq!(
            registry.plugin_info("spiral").as_deref(),
            Some("Arranges weights in a spiral pattern from center outward")
        );
        assert_eq!(
            registry.plugin_info("custom").as_deref(),
            Some("Custom transformer plugin")
        );
        assert_eq!(registry.plugin_info("missing"), None);

        let infos = registry.describe();
        assert_eq!(infos.len(), 6);
        let json = serde_json::to_value(&infos[0]).unwrap();
        assert_eq!(json["name"], "flatten");
    }

    #[test]
    fn find_compatible_returns_first_match_in_order() {
        let registry = PluginRegistry::empty();
        assert!(registry.find_compatible(&TensorCollection::new()).is_none());

        registry.register(Box::new(ConvOnly)).unwrap();
        let mut dense = TensorCollection::new();
        dense.insert("fc.weight", arr1(&[1.0_f32, 2.0]));
        assert!(registry.find_compatible(&dense).is_none());

        let mut conv = TensorCollection::new();
        conv.insert("conv.weight", ndarray::Array4::<f32>::zeros((1, 1, 3, 3)));
        assert_eq!(registry.find_compatible(&conv).unwrap().name(), "conv_only");

        registry.register(TestPlugin::boxed("catch_all", 0.0)).unwrap();
        assert_eq!(registry.find_compatible(&dense).unwrap().name(), "catch_all");
        assert_eq!(registry.find_compatible(&conv).unwrap().name(), "conv_only");
    }

    #[test]
    fn builtins_win_first_match_in_default_registry() {
        let registry = PluginRegistry::new();
        let plugin = registry.find_compatible(&TensorCollection::new()).unwrap();
        assert_eq!(plugin.name(), "flatten");
    }

    #[test]
    fn registry_is_shareable_across_threads() {
        let registry = Arc::new(PluginRegistry::new());
        let workers: Vec<_> = (0..4)
            .map(|i| {
                let registry = Arc::clone(&registry);
                std::thread::spawn(move || {
                    registry
                        .register(TestPlugin::boxed(&format!("worker_{i}"), i as f64))
                        .unwrap();
                    registry.get("flatten").is_some()
                })
            })
            .collect();
        for worker in workers {
            assert!(worker.join().unwrap());
        }
        assert_eq!(registry.len(), 9);
    }
}
