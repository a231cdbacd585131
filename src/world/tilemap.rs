use glam::IVec2;

use super::tile::{EMPTY_TILE, TILE_SIZE, TileId};

/// Logical tile-index map: one [`TileId`] per 8×8 block of world-pixel space.
///
/// `origin` is the world-tile coordinate of entry `(0, 0)`; a full-world
/// map has origin zero, a windowed map sits wherever its region starts.
#[derive(Clone, Debug)]
pub struct TileMap {
    origin: IVec2,
    cols: usize,
    rows: usize,
    ids: Vec<TileId>,
}

impl TileMap {
    pub fn new(origin: IVec2, cols: usize, rows: usize) -> Self {
        Self {
            origin,
            cols,
            rows,
            ids: vec![EMPTY_TILE; cols * rows],
        }
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// World-tile coordinate of entry (0, 0).
    #[inline]
    pub fn origin(&self) -> IVec2 {
        self.origin
    }

    /// World-pixel coordinate of entry (0, 0).
    #[inline]
    pub fn origin_px(&self) -> IVec2 {
        self.origin * TILE_SIZE as i32
    }

    /// Entry at map-local `(col, row)`; `None` off the map.
    #[inline]
    pub fn get(&self, col: i32, row: i32) -> Option<TileId> {
        if col < 0 || row < 0 || col as usize >= self.cols || row as usize >= self.rows {
            return None;
        }
        Some(self.ids[row as usize * self.cols + col as usize])
    }

    /// Entry at `(col, row)`, or the empty id off the map.
    #[inline]
    pub fn get_or_empty(&self, col: i32, row: i32) -> TileId {
        self.get(col, row).unwrap_or(EMPTY_TILE)
    }

    /// Writes outside the map are dropped.
    #[inline]
    pub fn set(&mut self, col: usize, row: usize, id: TileId) {
        debug_assert!(col < self.cols && row < self.rows, "tile map write ({col}, {row}) out of range");
        if col < self.cols && row < self.rows {
            self.ids[row * self.cols + col] = id;
        }
    }

    /// Re-target the map and clear it.
    pub fn reset(&mut self, origin: IVec2, cols: usize, rows: usize) {
        self.origin = origin;
        self.cols = cols;
        self.rows = rows;
        self.ids.clear();
        self.ids.resize(cols * rows, EMPTY_TILE);
    }

    /// Row-major entries.
    #[inline]
    pub fn ids(&self) -> &[TileId] {
        &self.ids
    }

    pub fn row(&self, row: usize) -> &[TileId] {
        &self.ids[row * self.cols..(row + 1) * self.cols]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_bounds_reads_empty() {
        let mut map = TileMap::new(IVec2::new(2, 3), 4, 2);
        map.set(3, 1, 7);
        assert_eq!(map.get(3, 1), Some(7));
        assert_eq!(map.get(4, 1), None);
        assert_eq!(map.get(-1, 0), None);
        assert_eq!(map.get_or_empty(0, 9), EMPTY_TILE);
        assert_eq!(map.origin_px(), IVec2::new(16, 24));
        assert_eq!(map.row(1), &[0, 0, 0, 7]);
    }

    #[test]
    fn reset_retargets_and_clears() {
        let mut map = TileMap::new(IVec2::ZERO, 2, 2);
        map.set(1, 1, 5);
        map.reset(IVec2::new(1, 1), 3, 1);
        assert_eq!(map.ids(), &[0, 0, 0]);
        assert_eq!(map.origin(), IVec2::new(1, 1));
    }
}
