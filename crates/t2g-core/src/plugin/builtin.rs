// SPDX-License-Identifier: AGPL-3.0-or-later
// © 2025 Ryo ∴ SpiralArchitect (kishkavsesvit@icloud.com)
// Part of torch2grid — Licensed under AGPL-3.0-or-later.

//! Placement strategies shipped with every registry.
//!
//! All of them skip absent tensors and are deterministic: the same collection
//! always yields a bit-identical grid.

use super::traits::TransformerPlugin;
use crate::grid::{empty_grid, fill_row_major, spiral_path, square_row_major, square_side, Grid};
use crate::tensor::TensorCollection;
use ndarray::s;

/// Spread below which min-max normalisation is skipped.
pub const NORMALIZE_EPSILON: f64 = 1e-6;

/// Instances of every built-in strategy, in registration order.
pub fn builtin_plugins() -> Vec<Box<dyn TransformerPlugin>> {
    vec![
        Box::new(FlattenTransformer),
        Box::new(LayerWeightedTransformer),
        Box::new(SpiralTransformer),
        Box::new(NormalizedTransformer),
        Box::new(LayerSeparatedTransformer),
    ]
}

/// Row-major fill of a square grid in collection order. The default strategy.
///
/// Empty input is treated as the single scalar `0.0`.
#[derive(Debug, Default, Clone, Copy)]
pub struct FlattenTransformer;

impl FlattenTransformer {
    pub const NAME: &'static str = "flatten";
}

impl TransformerPlugin for FlattenTransformer {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn description(&self) -> &str {
        "Flattens all tensors into a square grid (default behavior)"
    }

    fn transform(&self, tensors: &TensorCollection) -> Grid {
        square_row_major(&tensors.flat_values())
    }
}

/// Same placement as [`FlattenTransformer`], driven by a running element
/// cursor over each tensor instead of a single flattened buffer.
///
/// Kept as its own selectable name; the output is identical to `flatten`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LayerWeightedTransformer;

impl TransformerPlugin for LayerWeightedTransformer {
    fn name(&self) -> &str {
        "layer_weighted"
    }

    fn description(&self) -> &str {
        "Arranges layers in blocks, larger layers get more space"
    }

    fn transform(&self, tensors: &TensorCollection) -> Grid {
        let total = tensors.total_elements();
        if total == 0 {
            return empty_grid();
        }

        let side = square_side(total);
        let capacity = side * side;
        let mut grid = Grid::zeros((side, side));
        let mut cursor = 0usize;
        'layers: for (_, tensor) in tensors.present() {
            for &value in tensor.iter() {
                if cursor >= capacity {
                    break 'layers;
                }
                grid[[cursor / side, cursor % side]] = f64::from(value);
                cursor += 1;
            }
        }
        grid
    }
}

/// Places scalars along a center-outward spiral.
///
/// Values beyond the in-bounds spiral path are dropped, never wrapped.
#[derive(Debug, Default, Clone, Copy)]
pub struct SpiralTransformer;

impl TransformerPlugin for SpiralTransformer {
    fn name(&self) -> &str {
        "spiral"
    }

    fn description(&self) -> &str {
        "Arranges weights in a spiral pattern from center outward"
    }

    fn transform(&self, tensors: &TensorCollection) -> Grid {
        let mut values = tensors.flat_values();
        if values.is_empty() {
            values.push(0.0);
        }

        let side = square_side(values.len());
        let mut grid = Grid::zeros((side, side));
        for (&(row, col), &value) in spiral_path(side).iter().zip(values.iter()) {
            grid[[row, col]] = value;
        }
        grid
    }
}

/// Joint min-max normalisation to `[0, 1]` followed by a row-major fill.
///
/// Degenerate ranges (`max - min <= 1e-6`) are left untouched and empty input
/// yields a 1x1 zero grid.
#[derive(Debug, Default, Clone, Copy)]
pub struct NormalizedTransformer;

impl TransformerPlugin for NormalizedTransformer {
    fn name(&self) -> &str {
        "normalized"
    }

    fn description(&self) -> &str {
        "Normalizes all weights to [0, 1] range before visualization"
    }

    fn transform(&self, tensors: &TensorCollection) -> Grid {
        let mut values = tensors.flat_values();
        if values.is_empty() {
            return empty_grid();
        }

        let (min, max) = values
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            });
        let span = max - min;
        if span > NORMALIZE_EPSILON {
            for value in values.iter_mut() {
                *value = (*value - min) / span;
            }
        }

        fill_row_major(&values, square_side(values.len()))
    }
}

/// Gives every tensor its own bordered square tile and lays the tiles out on
/// a coarse grid.
///
/// Each tile is `(s + 2) x (s + 2)` with `s = ceil(sqrt(len))` and a one-cell
/// zero frame. Tiles sit top-left in cells sized to the largest tile, with
/// `cols = ceil(sqrt(n))` and `rows = ceil(n / cols)`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LayerSeparatedTransformer;

impl LayerSeparatedTransformer {
    fn tile(values: &[f64]) -> Grid {
        let side = square_side(values.len());
        let mut tile = Grid::zeros((side + 2, side + 2));
        if side > 0 {
            let inner = fill_row_major(values, side);
            tile.slice_mut(s![1..=side, 1..=side]).assign(&inner);
        }
        tile
    }
}

impl TransformerPlugin for LayerSeparatedTransformer {
    fn name(&self) -> &str {
        "layer_separated"
    }

    fn description(&self) -> &str {
        "Separates layers with visible boundaries in the grid"
    }

    fn transform(&self, tensors: &TensorCollection) -> Grid {
        let tiles: Vec<Grid> = tensors
            .present()
            .map(|(_, tensor)| {
                let values: Vec<f64> = tensor.iter().map(|&v| f64::from(v)).collect();
                Self::tile(&values)
            })
            .collect();
        if tiles.is_empty() {
            return empty_grid();
        }

        let count = tiles.len();
        let cols = square_side(count);
        let rows = count.div_ceil(cols);
        let cell_h = tiles.iter().map(|t| t.nrows()).max().unwrap_or(0);
        let cell_w = tiles.iter().map(|t| t.ncols()).max().unwrap_or(0);

        let mut grid = Grid::zeros((rows * cell_h, cols * cell_w));
        for (idx, tile) in tiles.iter().enumerate() {
            let top = (idx / cols) * cell_h;
            let left = (idx % cols) * cell_w;
            let (h, w) = tile.dim();
            grid.slice_mut(s![top..top + h, left..left + w]).assign(tile);
        }
        grid
    }
}
