use glam::IVec2;

use super::projection::{HALF_H, HALF_W, SIDE_UNIT, cell_to_world};
use crate::world::tile::TILE_SIZE;

const T: i32 = TILE_SIZE as i32;

/// Constants that depend on the display, not on the map.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Screen {
    pub w: i32,
    pub h: i32,
}

impl Screen {
    pub const fn new(w: i32, h: i32) -> Self {
        Self { w, h }
    }

    #[inline]
    pub fn center(self) -> IVec2 {
        IVec2::new(self.w / 2, self.h / 2)
    }
}

/// Half-open pixel rectangle `[min, max)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PixelRect {
    pub min: IVec2,
    pub max: IVec2,
}

impl PixelRect {
    pub fn new(min: IVec2, max: IVec2) -> Self {
        Self { min, max }
    }

    #[inline]
    pub fn intersects(&self, o: &PixelRect) -> bool {
        self.min.x < o.max.x && o.min.x < self.max.x && self.min.y < o.max.y && o.min.y < self.max.y
    }

    #[inline]
    pub fn contains_rect(&self, o: &PixelRect) -> bool {
        o.min.x >= self.min.x && o.min.y >= self.min.y && o.max.x <= self.max.x && o.max.y <= self.max.y
    }
}

/// Tile-aligned rectangle in world-tile coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Region {
    pub origin: IVec2,
    pub cols: usize,
    pub rows: usize,
}

impl Region {
    pub fn new(origin: IVec2, cols: usize, rows: usize) -> Self {
        Self { origin, cols, rows }
    }

    pub fn pixel_rect(&self) -> PixelRect {
        let min = self.origin * T;
        PixelRect::new(
            min,
            min + IVec2::new(self.cols as i32, self.rows as i32) * T,
        )
    }

    /// Pixel centre of the region.
    pub fn center_px(&self) -> IVec2 {
        let r = self.pixel_rect();
        (r.min + r.max) / 2
    }
}

/// Extent of one rasterized cube relative to its anchor (the top vertex of
/// the raised diamond), for cubes up to `max_height` units tall.
///
/// A cube of height `h` covers `x ∈ [ax - HALF_W, ax + HALF_W]` and
/// `y ∈ [ay, ay + 2·HALF_H + h·SIDE_UNIT)`; its bottom row is always the
/// ground diamond's bottom row, whatever `h`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ShapeBounds {
    pub half_w: i32,
    pub height: i32,
}

impl ShapeBounds {
    pub fn for_max_height(max_height: u8) -> Self {
        Self {
            half_w: HALF_W,
            height: 2 * HALF_H + max_height as i32 * SIDE_UNIT,
        }
    }

    /// Pixels a cube of height `h` anchored at `anchor` can touch.
    pub fn rect_at(anchor: IVec2, h: u8) -> PixelRect {
        PixelRect::new(
            IVec2::new(anchor.x - HALF_W, anchor.y),
            IVec2::new(
                anchor.x + HALF_W + 1,
                anchor.y + 2 * HALF_H + h as i32 * SIDE_UNIT,
            ),
        )
    }

    /// Scratch margin (tile-aligned) around a patch interior such that every
    /// cube intersecting the interior is drawn without clipping.
    ///
    /// A cube reaching the interior's left edge with its rightmost column
    /// starts `2·half_w` further left; one reaching the top edge with its
    /// bottom row starts `height - 1` further up; symmetrically to the
    /// right and below.
    pub fn patch_margin(&self) -> IVec2 {
        let round = |v: i32| (v + T - 1) / T * T;
        IVec2::new(round(2 * self.half_w), round(self.height - 1))
    }
}

/// World-pixel space: the raw isometric plane shifted so every pixel any
/// valid cell can paint has non-negative coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WorldExtent {
    /// Raw world coordinate of world-pixel (0, 0).
    pub origin: IVec2,
    pub width: i32,
    pub height: i32,
}

impl WorldExtent {
    /// Derive the extent of a `cols × rows` map with heights `≤ max_height`.
    ///
    /// Leftmost pixel: cell (0, rows-1) at `-(rows-1)·HW - HW = -rows·HW`.
    /// Rightmost: cell (cols-1, 0) at `(cols-1)·HW + HW = cols·HW`.
    /// Topmost: cell (0, 0) raised `max_height` at `-max_height·SU`.
    /// Bottom row: cell (cols-1, rows-1) at `(cols+rows-2)·HH + 2·HH - 1`.
    pub fn of(cols: usize, rows: usize, max_height: u8) -> Self {
        let (c, r, h) = (cols as i32, rows as i32, max_height as i32);
        Self {
            origin: IVec2::new(-r * HALF_W, -h * SIDE_UNIT),
            width: (c + r) * HALF_W + 1,
            height: (c + r) * HALF_H + h * SIDE_UNIT,
        }
    }

    #[inline]
    pub fn to_pixel(&self, raw: IVec2) -> IVec2 {
        raw - self.origin
    }

    #[inline]
    pub fn to_raw(&self, px: IVec2) -> IVec2 {
        px + self.origin
    }

    #[inline]
    pub fn rect(&self) -> PixelRect {
        PixelRect::new(IVec2::ZERO, IVec2::new(self.width, self.height))
    }

    /// Tile columns covering the extent (rounded up).
    #[inline]
    pub fn tile_cols(&self) -> usize {
        ((self.width + T - 1) / T) as usize
    }

    #[inline]
    pub fn tile_rows(&self) -> usize {
        ((self.height + T - 1) / T) as usize
    }

    /// The whole extent as a tile region.
    pub fn region(&self) -> Region {
        Region::new(IVec2::ZERO, self.tile_cols(), self.tile_rows())
    }

    /// Anchor of a cell in world-pixel space.
    #[inline]
    pub fn anchor(&self, col: usize, row: usize, height: u8) -> IVec2 {
        self.to_pixel(cell_to_world(col as i32, row as i32, height as i32))
    }

    /// Region of `cols × rows` tiles centred on `center_px`, tile aligned and
    /// clamped inside the extent where the extent is large enough.
    pub fn region_around(&self, center_px: IVec2, cols: usize, rows: usize) -> Region {
        let half = IVec2::new(cols as i32, rows as i32) * T / 2;
        let want = (center_px - half).div_euclid(IVec2::splat(T));
        let max = IVec2::new(
            self.tile_cols() as i32 - cols as i32,
            self.tile_rows() as i32 - rows as i32,
        )
        .max(IVec2::ZERO);
        Region::new(want.clamp(IVec2::ZERO, max), cols, rows)
    }
}
