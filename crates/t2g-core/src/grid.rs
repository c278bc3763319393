// SPDX-License-Identifier: AGPL-3.0-or-later
// © 2025 Ryo ∴ SpiralArchitect (kishkavsesvit@icloud.com)
// Part of torch2grid — Licensed under AGPL-3.0-or-later.

//! Grid type and the placement helpers shared by the built-in strategies.

use ndarray::Array2;

/// Dense 2D output of every transformer.
pub type Grid = Array2<f64>;

/// The 1x1 all-zero grid returned for empty input.
pub fn empty_grid() -> Grid {
    Grid::zeros((1, 1))
}

/// Smallest `s` with `s * s >= count`.
pub fn square_side(count: usize) -> usize {
    if count == 0 {
        return 0;
    }
    let mut side = (count as f64).sqrt().ceil() as usize;
    while side.saturating_mul(side) < count {
        side += 1;
    }
    while side > 1 && (side - 1) * (side - 1) >= count {
        side -= 1;
    }
    side
}

/// Writes `values` row-major into a zeroed `side x side` grid, dropping
/// anything past capacity.
pub fn fill_row_major(values: &[f64], side: usize) -> Grid {
    let mut grid = Grid::zeros((side, side));
    if side == 0 {
        return grid;
    }
    for (i, &value) in values.iter().take(side * side).enumerate() {
        grid[[i / side, i % side]] = value;
    }
    grid
}

/// Square row-major grid sized for `values`; empty input becomes a single zero.
pub fn square_row_major(values: &[f64]) -> Grid {
    if values.is_empty() {
        return fill_row_major(&[0.0], 1);
    }
    fill_row_major(values, square_side(values.len()))
}

/// Coordinates of a center-outward spiral over a `side x side` grid.
///
/// Starts at `(side / 2, side / 2)` and walks right, down, left, up with leg
/// lengths 1, 1, 2, 2, 3, 3, ... Positions outside the grid are skipped but
/// still advance the walk.
pub fn spiral_path(side: usize) -> Vec<(usize, usize)> {
    const DIRECTIONS: [(isize, isize); 4] = [(0, 1), (1, 0), (0, -1), (-1, 0)];

    let capacity = side * side;
    let mut coords = Vec::with_capacity(capacity);
    if side == 0 {
        return coords;
    }

    let bound = side as isize;
    let (mut row, mut col) = ((side / 2) as isize, (side / 2) as isize);
    coords.push((row as usize, col as usize));

    let mut dir_idx = 0;
    let mut steps = 1;
    while coords.len() < capacity {
        for _ in 0..2 {
            let (dr, dc) = DIRECTIONS[dir_idx];
            for _ in 0..steps {
                row += dr;
                col += dc;
                if (0..bound).contains(&row) && (0..bound).contains(&col) {
                    coords.push((row as usize, col as usize));
                }
                if coords.len() >= capacity {
                    return coords;
                }
            }
            dir_idx = (dir_idx + 1) % DIRECTIONS.len();
        }
        steps += 1;
    }
    coords
}
