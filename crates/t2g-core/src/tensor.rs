// SPDX-License-Identifier: AGPL-3.0-or-later
// © 2025 Ryo ∴ SpiralArchitect (kishkavsesvit@icloud.com)
// Part of torch2grid — Licensed under AGPL-3.0-or-later.

//! Normalised model parameters: an ordered map from layer name to tensor.
//!
//! Loaders produce a [`TensorCollection`] from whatever checkpoint format they
//! understand. Entries that could not be materialised as numeric arrays are
//! kept as explicit absences so the key set still mirrors the source model.

use ndarray::{Array, ArrayD, Dimension};
use serde::{Deserialize, Serialize};

/// Ordered collection of named tensors where any entry may be absent.
///
/// Iteration order is insertion order and is the placement order used by the
/// linearising strategies. Re-inserting a name replaces its value in place.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TensorCollection {
    entries: Vec<(String, Option<ArrayD<f32>>)>,
}

impl TensorCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a tensor of any dimensionality, returning the previous entry.
    pub fn insert<D: Dimension>(
        &mut self,
        name: impl Into<String>,
        tensor: Array<f32, D>,
    ) -> Option<Option<ArrayD<f32>>> {
        self.insert_entry(name, Some(tensor.into_dyn()))
    }

    /// Records `name` as present in the model but without numeric data.
    pub fn insert_absent(&mut self, name: impl Into<String>) -> Option<Option<ArrayD<f32>>> {
        self.insert_entry(name, None)
    }

    pub fn insert_entry(
        &mut self,
        name: impl Into<String>,
        value: Option<ArrayD<f32>>,
    ) -> Option<Option<ArrayD<f32>>> {
        let name = name.into();
        match self.position(&name) {
            Some(idx) => Some(std::mem::replace(&mut self.entries[idx].1, value)),
            None => {
                self.entries.push((name, value));
                None
            }
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<Option<ArrayD<f32>>> {
        let idx = self.position(name)?;
        Some(self.entries.remove(idx).1)
    }

    /// `None` when the key is missing, `Some(None)` when it is present but absent.
    pub fn get(&self, name: &str) -> Option<Option<&ArrayD<f32>>> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_ref())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&ArrayD<f32>>)> + '_ {
        self.entries
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_ref()))
    }

    /// Entries carrying data, in insertion order.
    pub fn present(&self) -> impl Iterator<Item = (&str, &ArrayD<f32>)> + '_ {
        self.entries
            .iter()
            .filter_map(|(name, value)| value.as_ref().map(|tensor| (name.as_str(), tensor)))
    }

    /// Number of scalars across all present tensors.
    pub fn total_elements(&self) -> usize {
        self.present().map(|(_, tensor)| tensor.len()).sum()
    }

    /// Every present scalar in placement order, widened to `f64`.
    ///
    /// Each tensor is visited in logical row-major order independent of its
    /// memory layout.
    pub fn flat_values(&self) -> Vec<f64> {
        let mut values = Vec::with_capacity(self.total_elements());
        for (_, tensor) in self.present() {
            values.extend(tensor.iter().map(|&v| f64::from(v)));
        }
        values
    }

    pub fn retain(&mut self, mut keep: impl FnMut(&str, Option<&ArrayD<f32>>) -> bool) {
        self.entries
            .retain(|(name, value)| keep(name.as_str(), value.as_ref()));
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|(key, _)| key == name)
    }
}

impl<S: Into<String>> FromIterator<(S, Option<ArrayD<f32>>)> for TensorCollection {
    fn from_iter<I: IntoIterator<Item = (S, Option<ArrayD<f32>>)>>(iter: I) -> Self {
        let mut collection = Self::new();
        collection.extend(iter);
        collection
    }
}

impl<S: Into<String>> Extend<(S, Option<ArrayD<f32>>)> for TensorCollection {
    fn extend<I: IntoIterator<Item = (S, Option<ArrayD<f32>>)>>(&mut self, iter: I) {
        for (name, value) in iter {
            self.insert_entry(name, value);
        }
    }
}
