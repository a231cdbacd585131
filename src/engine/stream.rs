//! Streaming window: keeps a fixed `size × size` toroidal mirror of the
//! logical tile map in sync with the camera.
//!
//! Logical world-tile `(c, r)` lives in mirror slot `(wrap(c), wrap(r))`.
//! Moving the window by one column only rewrites the one column of slots
//! that just came into view, so per-frame work is proportional to camera
//! displacement in tiles, not to the window area.
//!
//! Invariant, after every [`StreamingWindow::update`]: for every `k, j` in
//! `0..size`, the slot holding logical `(loaded.x + k, loaded.y + j)` equals
//! the tile map entry there, or [`EMPTY_TILE`] off the map.

use glam::IVec2;
use smallvec::SmallVec;

use super::ring::Ring;
use super::types::Screen;
use crate::world::tile::{EMPTY_TILE, TILE_SIZE, TileId};
use crate::world::tilemap::TileMap;

const T: i32 = TILE_SIZE as i32;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis {
    Column,
    Row,
}

/// One column or row of mirror slots rewritten by an incremental step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Strip {
    pub axis: Axis,
    /// Logical world-tile column (or row) that was loaded.
    pub index: i32,
}

/// What changed in the mirror during one update.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StreamDelta {
    pub full_reload: bool,
    pub strips: SmallVec<[Strip; 4]>,
}

impl StreamDelta {
    #[inline]
    pub fn is_empty(&self) -> bool {
        !self.full_reload && self.strips.is_empty()
    }

    fn full() -> Self {
        Self {
            full_reload: true,
            strips: SmallVec::new(),
        }
    }
}

pub struct StreamingWindow {
    ring: Ring,
    screen: Screen,
    /// Row-major by slot: `mirror[slot_row * size + slot_col]`.
    mirror: Vec<TileId>,
    /// World-tile coordinate mirrored in the window's first column/row.
    loaded: IVec2,
    /// False until the first full reload.
    synced: bool,
}

impl StreamingWindow {
    /// `size` must be a power of two.
    pub fn new(size: usize, screen: Screen) -> Self {
        let ring = Ring::new(size);
        Self {
            ring,
            screen,
            mirror: vec![EMPTY_TILE; size * size],
            loaded: IVec2::ZERO,
            synced: false,
        }
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.ring.size()
    }

    #[inline]
    pub fn ring(&self) -> Ring {
        self.ring
    }

    /// World-tile origin of the window (`loaded_col_min`, `loaded_row_min`).
    #[inline]
    pub fn loaded(&self) -> IVec2 {
        self.loaded
    }

    #[inline]
    pub fn mirror(&self) -> &[TileId] {
        &self.mirror
    }

    #[inline]
    pub fn slot(&self, slot_col: usize, slot_row: usize) -> TileId {
        self.mirror[slot_row * self.size() + slot_col]
    }

    /// Where the window should sit for `camera_px`: centred on the camera's
    /// tile, clamped so it never starts before the map or runs past its far
    /// edge. A map smaller than the window pins it at the map origin.
    pub fn desired_origin(&self, camera_px: IVec2, map: &TileMap) -> IVec2 {
        let size = self.size() as i32;
        let want = camera_px.div_euclid(IVec2::splat(T)) - IVec2::splat(size / 2);
        let lo = map.origin();
        let hi = lo + IVec2::new(map.cols() as i32 - size, map.rows() as i32 - size).max(IVec2::ZERO);
        want.clamp(lo, hi)
    }

    /// Rewrite every slot. Used at startup, after camera jumps, and after the
    /// tile map itself was replaced.
    pub fn full_reload(&mut self, camera_px: IVec2, map: &TileMap) -> StreamDelta {
        self.loaded = self.desired_origin(camera_px, map);
        let size = self.size() as i32;
        for j in 0..size {
            self.load_row(self.loaded.y + j, map);
        }
        self.synced = true;
        log::debug!(
            "stream: full reload at tile ({}, {})",
            self.loaded.x,
            self.loaded.y
        );
        StreamDelta::full()
    }

    /// Bring the window to the camera, one column or row at a time.
    ///
    /// Columns are fully resynced before rows. The first call, and a
    /// displacement of a whole window or more, degrade to
    /// [`Self::full_reload`].
    pub fn update(&mut self, camera_px: IVec2, map: &TileMap) -> StreamDelta {
        let desired = self.desired_origin(camera_px, map);
        let delta = desired - self.loaded;
        let size = self.size() as i32;
        if !self.synced || delta.x.abs() >= size || delta.y.abs() >= size {
            return self.full_reload(camera_px, map);
        }

        let mut out = StreamDelta::default();
        while self.loaded.x != desired.x {
            let index = if desired.x > self.loaded.x {
                self.loaded.x += 1;
                self.loaded.x + size - 1
            } else {
                self.loaded.x -= 1;
                self.loaded.x
            };
            self.load_column(index, map);
            log::trace!("stream: column {index}");
            out.strips.push(Strip {
                axis: Axis::Column,
                index,
            });
        }
        while self.loaded.y != desired.y {
            let index = if desired.y > self.loaded.y {
                self.loaded.y += 1;
                self.loaded.y + size - 1
            } else {
                self.loaded.y -= 1;
                self.loaded.y
            };
            self.load_row(index, map);
            log::trace!("stream: row {index}");
            out.strips.push(Strip {
                axis: Axis::Row,
                index,
            });
        }

        debug_assert_eq!(self.first_mismatch(map), None, "mirror out of sync");
        out
    }

    /// Hardware scroll offset for `camera_px`, wrapped to the mirror's pixel
    /// size: `camera - window_origin - screen_centre`, shifted into slot space.
    pub fn scroll(&self, camera_px: IVec2) -> IVec2 {
        let mask = self.size() as i32 * T - 1;
        let slot_origin = IVec2::new(
            self.ring.wrap(self.loaded.x) as i32,
            self.ring.wrap(self.loaded.y) as i32,
        ) * T;
        let s = camera_px - self.loaded * T - self.screen.center() + slot_origin;
        IVec2::new(s.x & mask, s.y & mask)
    }

    /// `(slot_col, slot_row, id)` for every slot a strip covers.
    pub fn strip_entries(&self, strip: Strip) -> impl Iterator<Item = (usize, usize, TileId)> + '_ {
        let fixed = self.ring.wrap(strip.index);
        (0..self.size()).map(move |k| {
            let (c, r) = match strip.axis {
                Axis::Column => (fixed, k),
                Axis::Row => (k, fixed),
            };
            (c, r, self.slot(c, r))
        })
    }

    /// First logical window offset `(k, j)` whose slot disagrees with the map.
    pub fn first_mismatch(&self, map: &TileMap) -> Option<(usize, usize)> {
        let size = self.size() as i32;
        for j in 0..size {
            for k in 0..size {
                let logical = self.loaded + IVec2::new(k, j);
                let want = read(map, logical);
                let got = self.slot(self.ring.wrap(logical.x), self.ring.wrap(logical.y));
                if want != got {
                    return Some((k as usize, j as usize));
                }
            }
        }
        None
    }

    /*──────────────────────── strip writers ────────────────────────*/

    fn load_column(&mut self, col: i32, map: &TileMap) {
        let size = self.size();
        let hc = self.ring.wrap(col);
        for j in 0..size as i32 {
            let row = self.loaded.y + j;
            let hr = self.ring.wrap(row);
            self.mirror[hr * size + hc] = read(map, IVec2::new(col, row));
        }
    }

    fn load_row(&mut self, row: i32, map: &TileMap) {
        let size = self.size();
        let hr = self.ring.wrap(row);
        for k in 0..size as i32 {
            let col = self.loaded.x + k;
            let hc = self.ring.wrap(col);
            self.mirror[hr * size + hc] = read(map, IVec2::new(col, row));
        }
    }
}

/// Tile map entry at a world-tile coordinate, empty off the map.
#[inline]
fn read(map: &TileMap, world_tile: IVec2) -> TileId {
    let local = world_tile - map.origin();
    map.get_or_empty(local.x, local.y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng, rngs::StdRng};

    const SCREEN: Screen = Screen::new(240, 160);

    fn numbered_map(origin: IVec2, cols: usize, rows: usize) -> TileMap {
        let mut map = TileMap::new(origin, cols, rows);
        for r in 0..rows {
            for c in 0..cols {
                map.set(c, r, ((r * cols + c) % 1000 + 1) as TileId);
            }
        }
        map
    }

    fn assert_clamped(win: &StreamingWindow, map: &TileMap) {
        let size = win.size() as i32;
        let lo = map.origin();
        let hi = lo + IVec2::new(map.cols() as i32 - size, map.rows() as i32 - size).max(IVec2::ZERO);
        let l = win.loaded();
        assert!(l.cmpge(lo).all() && l.cmple(hi).all(), "loaded {l} outside [{lo}, {hi}]");
    }

    #[test]
    fn randomized_walk_keeps_mirror_in_sync() {
        let map = numbered_map(IVec2::ZERO, 433, 220);
        let mut rng = StdRng::seed_from_u64(0x150_57e4);
        let mut win = StreamingWindow::new(64, SCREEN);
        let mut cam = IVec2::new(1200, 600);
        win.full_reload(cam, &map);

        for step in 0..2000 {
            if rng.gen_ratio(1, 50) {
                // teleport, sometimes far off the map
                cam = IVec2::new(rng.gen_range(-5000..9000), rng.gen_range(-5000..7000));
            } else {
                cam += IVec2::new(rng.gen_range(-40..=40), rng.gen_range(-40..=40));
            }
            let before = win.loaded();
            let delta = win.update(cam, &map);

            assert_eq!(win.first_mismatch(&map), None, "step {step}");
            assert_clamped(&win, &map);
            if !delta.full_reload {
                let moved = (win.loaded() - before).abs();
                assert_eq!(delta.strips.len() as i32, moved.x + moved.y, "step {step}");
            }
        }
    }

    #[test]
    fn sub_tile_motion_writes_nothing() {
        let map = numbered_map(IVec2::ZERO, 200, 200);
        let mut win = StreamingWindow::new(64, SCREEN);
        let cam = IVec2::new(800, 800);
        win.full_reload(cam, &map);
        let delta = win.update(cam + IVec2::new(3, 5), &map);
        assert!(delta.is_empty());
        let delta = win.update(cam + IVec2::new(8, 0), &map);
        assert_eq!(
            delta.strips.as_slice(),
            &[Strip {
                axis: Axis::Column,
                index: 100 - 32 + 64
            }]
        );
    }

    #[test]
    fn columns_resync_before_rows() {
        let map = numbered_map(IVec2::ZERO, 300, 300);
        let mut win = StreamingWindow::new(64, SCREEN);
        let cam = IVec2::new(1600, 1600);
        win.full_reload(cam, &map);
        let delta = win.update(cam + IVec2::new(-24, 16), &map);
        let axes: Vec<Axis> = delta.strips.iter().map(|s| s.axis).collect();
        assert_eq!(axes, [Axis::Column, Axis::Column, Axis::Column, Axis::Row, Axis::Row]);
        assert_eq!(win.first_mismatch(&map), None);
    }

    #[test]
    fn small_map_pins_window_and_pads_with_empty() {
        let map = numbered_map(IVec2::new(10, 4), 20, 12);
        let mut win = StreamingWindow::new(64, SCREEN);
        for cam in [IVec2::new(-999, -999), IVec2::new(100, 60), IVec2::new(99999, 99999)] {
            win.update(cam, &map);
            assert_eq!(win.loaded(), IVec2::new(10, 4));
            assert_eq!(win.first_mismatch(&map), None);
        }
        let r = win.ring();
        assert_eq!(win.slot(r.wrap(10), r.wrap(4)), 1);
        assert_eq!(win.slot(r.wrap(40), r.wrap(4)), EMPTY_TILE);
    }

    #[test]
    fn long_jump_falls_back_to_full_reload() {
        let map = numbered_map(IVec2::ZERO, 433, 220);
        let mut win = StreamingWindow::new(64, SCREEN);
        win.full_reload(IVec2::new(300, 300), &map);
        let delta = win.update(IVec2::new(3000, 300), &map);
        assert!(delta.full_reload);
        assert_eq!(win.first_mismatch(&map), None);
    }

    #[test]
    fn scroll_tracks_camera_modulo_mirror() {
        let map = numbered_map(IVec2::ZERO, 433, 220);
        let mut win = StreamingWindow::new(64, SCREEN);
        let mut cam = IVec2::new(555, 444);
        win.full_reload(cam, &map);
        for _ in 0..200 {
            cam += IVec2::new(7, 3);
            win.update(cam, &map);
            let want = (cam - SCREEN.center()).rem_euclid(IVec2::splat(512));
            assert_eq!(win.scroll(cam), want);
        }
    }

    #[test]
    fn strip_entries_cover_one_column() {
        let map = numbered_map(IVec2::ZERO, 200, 200);
        let mut win = StreamingWindow::new(64, SCREEN);
        win.full_reload(IVec2::new(800, 800), &map);
        let strip = Strip {
            axis: Axis::Column,
            index: 70,
        };
        let entries: Vec<_> = win.strip_entries(strip).collect();
        assert_eq!(entries.len(), 64);
        assert!(entries.iter().all(|&(c, _, _)| c == 70 % 64));
    }
}
