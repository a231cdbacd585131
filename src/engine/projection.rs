//! Isometric projection between cell addresses, raw world pixels and screen
//! pixels. Pure integer maths, no state.
//!
//! ```text
//!   wx = (col - row) * HALF_W
//!   wy = (col + row) * HALF_H - height * SIDE_UNIT
//! ```
//!
//! `(wx, wy)` is the **top vertex** of the cell's diamond.

use glam::IVec2;

use super::types::Screen;

/// Half the diamond width.
pub const HALF_W: i32 = 16;
/// Half the diamond height. `HALF_W : HALF_H` is fixed at 2:1.
pub const HALF_H: i32 = 8;
/// Vertical pixels per unit of stacked height.
pub const SIDE_UNIT: i32 = 8;

const _: () = assert!(HALF_W == 2 * HALF_H);

/// Top vertex of cell `(col, row)` raised by `height` units.
#[inline]
pub fn cell_to_world(col: i32, row: i32, height: i32) -> IVec2 {
    IVec2::new(
        (col - row) * HALF_W,
        (col + row) * HALF_H - height * SIDE_UNIT,
    )
}

/// Translate a raw world point into screen space with `camera` at the
/// screen centre.
#[inline]
pub fn world_to_screen(world: IVec2, camera: IVec2, screen: Screen) -> IVec2 {
    world - camera + screen.center()
}

/// Approximate inverse of [`cell_to_world`] at height 0.
///
/// Solves the 2×2 system with `+HALF_W` bias and floor division, which
/// rounds a diamond's top vertex (and points near it) to that cell. For
/// picking and debugging only; the compiler never calls it.
#[inline]
pub fn world_to_cell(world: IVec2) -> IVec2 {
    let den = 2 * HALF_W;
    IVec2::new(
        (world.x + 2 * world.y + HALF_W).div_euclid(den),
        (2 * world.y - world.x + HALF_W).div_euclid(den),
    )
}
