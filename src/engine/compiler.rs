//! World compiler: logical cells → deduplicated tile atlas + tile map.
//!
//! Two strategies share one owner ([`WorldCompiler`]):
//!
//! * **Rasterize** – cubes are drawn back to front into a fixed scratch
//!   buffer one *patch* at a time. The scratch is the patch interior plus a
//!   margin derived from the largest cube's bounding box, and only cells
//!   whose box touches the interior are drawn, so nothing is ever clipped
//!   and only interior tiles are extracted. Patch seams are invisible.
//! * **Metatile** – predefined metatiles are composited straight onto the
//!   tile map through the store (see [`super::metatile`]).
//!
//! A region no larger than one patch can also be compiled progressively:
//! [`WorldCompiler::rasterize_slice`] and [`WorldCompiler::extract_slice`]
//! each do a bounded share of the work, and slice 0 always starts over.

use std::ops::Range;
use std::time::Instant;

use glam::IVec2;
use thiserror::Error;

use super::metatile::{METATILES, stamp_cell};
use super::types::{PixelRect, Region, ShapeBounds, WorldExtent};
use crate::config::{EngineConfig, LookupKind, Strategy};
use crate::renderer::PixelBuffer;
use crate::renderer::raster::draw_cell;
use crate::world::cell::IsoMap;
use crate::world::tile::{TILE_SIZE, Tile};
use crate::world::tilemap::TileMap;
use crate::world::tileset::TileStore;

const T: i32 = TILE_SIZE as i32;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CompileError {
    #[error("region {cols}x{rows} tiles does not fit the {patch_w}x{patch_h} px compile patch")]
    RegionTooLarge {
        cols: usize,
        rows: usize,
        patch_w: i32,
        patch_h: i32,
    },

    #[error("no region started")]
    NoRegion,

    #[error("slice {slice} of {of} out of range")]
    BadSlice { slice: usize, of: usize },
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CompileStats {
    pub cells_drawn: usize,
    pub patches: usize,
    pub tiles: usize,
    pub capacity: usize,
    /// New tiles dropped because the store was full.
    pub overflows: usize,
    /// Scratch writes that fell outside the patch. Always 0 unless the
    /// margin derivation is wrong.
    pub clipped_pixels: usize,
}

pub struct WorldCompiler {
    strategy: Strategy,
    extent: WorldExtent,
    margin: IVec2,
    /// Patch interior in pixels.
    patch: IVec2,
    scratch: PixelBuffer,
    store: TileStore,
    tiles: TileMap,
    stats: CompileStats,
    job: Option<Region>,
}

/// Cells of map columns `cols` in back-to-front order: by increasing
/// `col + row`, any order within one diagonal.
pub fn diagonal_order(cols: Range<usize>, rows: usize) -> impl Iterator<Item = (usize, usize)> {
    let (c0, c1) = (cols.start, cols.end);
    let end = if c0 >= c1 || rows == 0 { c0 } else { c1 + rows - 1 };
    (c0..end).flat_map(move |d| {
        let r_lo = d.saturating_sub(c1 - 1);
        let r_hi = (d - c0).min(rows - 1);
        (r_lo..=r_hi).map(move |r| (d - r, r))
    })
}

/// Split `0..n` into `of` near-equal consecutive parts and return part `k`.
fn share(n: usize, k: usize, of: usize) -> Range<usize> {
    let chunk = n.div_ceil(of);
    (k * chunk).min(n)..((k + 1) * chunk).min(n)
}

impl WorldCompiler {
    pub fn new(map: &IsoMap, cfg: &EngineConfig) -> Self {
        let extent = WorldExtent::of(map.cols(), map.rows(), map.max_height());
        let margin = ShapeBounds::for_max_height(map.max_height()).patch_margin();
        let patch = IVec2::new(cfg.patch.w as i32, cfg.patch.h as i32);
        let scratch_size = patch + 2 * margin;
        let store = match cfg.lookup {
            LookupKind::Linear => TileStore::linear(cfg.max_tiles),
            LookupKind::Hashed => TileStore::hashed(cfg.max_tiles),
        };
        Self {
            strategy: cfg.strategy,
            extent,
            margin,
            patch,
            scratch: PixelBuffer::new(scratch_size.x as usize, scratch_size.y as usize),
            store,
            tiles: TileMap::new(IVec2::ZERO, 0, 0),
            stats: CompileStats::default(),
            job: None,
        }
    }

    #[inline]
    pub fn extent(&self) -> &WorldExtent {
        &self.extent
    }

    #[inline]
    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    #[inline]
    pub fn store(&self) -> &TileStore {
        &self.store
    }

    /// Tile atlas in id order.
    #[inline]
    pub fn atlas(&self) -> &[Tile] {
        self.store.tiles()
    }

    #[inline]
    pub fn tile_map(&self) -> &TileMap {
        &self.tiles
    }

    #[inline]
    pub fn stats(&self) -> &CompileStats {
        &self.stats
    }

    /// Largest region, in tiles, a progressive compile accepts.
    pub fn max_region(&self) -> (usize, usize) {
        ((self.patch.x / T) as usize, (self.patch.y / T) as usize)
    }

    /*────────────────────────── one shot ──────────────────────────*/

    /// Compile the whole world.
    pub fn compile_world(&mut self, map: &IsoMap) -> CompileStats {
        let start = Instant::now();
        self.job = None;
        self.store.reset();
        self.stats = CompileStats::default();
        let world = self.extent.region();
        self.tiles.reset(world.origin, world.cols, world.rows);

        match self.strategy {
            Strategy::Rasterize => {
                let (pw, ph) = self.max_region();
                for ty in (0..world.rows).step_by(ph) {
                    for tx in (0..world.cols).step_by(pw) {
                        let sub = Region::new(
                            IVec2::new(tx as i32, ty as i32),
                            pw.min(world.cols - tx),
                            ph.min(world.rows - ty),
                        );
                        self.scratch.clear();
                        self.rasterize(map, &sub, 0..map.cols());
                        self.check_clipping(&sub);
                        self.extract(&sub, 0..sub.rows);
                        self.stats.patches += 1;
                    }
                }
            }
            Strategy::Metatile => self.stamp(map, &world, 0..map.cols()),
        }

        self.finish();
        log::info!(
            "compiled {}x{} world: {} cells, {} patches, {}/{} tiles, {} dropped, map {}x{} in {:.1?}",
            map.cols(),
            map.rows(),
            self.stats.cells_drawn,
            self.stats.patches,
            self.stats.tiles,
            self.stats.capacity,
            self.stats.overflows,
            self.tiles.cols(),
            self.tiles.rows(),
            start.elapsed()
        );
        self.stats
    }

    /// Compile one region in a single call.
    pub fn compile_region(&mut self, map: &IsoMap, region: Region) -> Result<CompileStats, CompileError> {
        self.begin_region(region)?;
        self.rasterize_slice(map, 0, 1)?;
        self.extract_slice(0, 1)?;
        Ok(self.stats)
    }

    /*────────────────────────── progressive ───────────────────────*/

    /// Select the region the following slices work on.
    pub fn begin_region(&mut self, region: Region) -> Result<(), CompileError> {
        let px = IVec2::new(region.cols as i32, region.rows as i32) * T;
        if px.x > self.patch.x || px.y > self.patch.y {
            return Err(CompileError::RegionTooLarge {
                cols: region.cols,
                rows: region.rows,
                patch_w: self.patch.x,
                patch_h: self.patch.y,
            });
        }
        self.job = Some(region);
        Ok(())
    }

    /// Draw map columns `share(cols, slice, of)` of the current region.
    /// Slice 0 clears the scratch (metatile: the store and map) first.
    pub fn rasterize_slice(&mut self, map: &IsoMap, slice: usize, of: usize) -> Result<(), CompileError> {
        let region = self.job.ok_or(CompileError::NoRegion)?;
        if slice >= of {
            return Err(CompileError::BadSlice { slice, of });
        }
        if slice == 0 {
            self.stats = CompileStats {
                patches: 1,
                ..CompileStats::default()
            };
            match self.strategy {
                Strategy::Rasterize => self.scratch.clear(),
                Strategy::Metatile => {
                    self.store.reset();
                    self.tiles.reset(region.origin, region.cols, region.rows);
                }
            }
        }

        let cols = share(map.cols(), slice, of);
        match self.strategy {
            Strategy::Rasterize => {
                self.rasterize(map, &region, cols);
                if slice + 1 == of {
                    self.check_clipping(&region);
                }
            }
            Strategy::Metatile => self.stamp(map, &region, cols),
        }
        Ok(())
    }

    /// Cut region rows `share(rows, slice, of)` out of the scratch.
    /// Slice 0 resets the store and map first. A no-op for metatiles.
    pub fn extract_slice(&mut self, slice: usize, of: usize) -> Result<(), CompileError> {
        let region = self.job.ok_or(CompileError::NoRegion)?;
        if slice >= of {
            return Err(CompileError::BadSlice { slice, of });
        }
        if self.strategy == Strategy::Rasterize {
            if slice == 0 {
                self.store.reset();
                self.tiles.reset(region.origin, region.cols, region.rows);
            }
            self.extract(&region, share(region.rows, slice, of));
        }
        if slice + 1 == of {
            self.finish();
            log::debug!(
                "compiled region at {} ({}x{}): {}/{} tiles, {} dropped",
                region.origin,
                region.cols,
                region.rows,
                self.stats.tiles,
                self.stats.capacity,
                self.stats.overflows
            );
        }
        Ok(())
    }

    /*─────────────────────────── workers ──────────────────────────*/

    /// World-pixel position of scratch pixel (0, 0) for patch `region`.
    #[inline]
    fn scratch_origin(&self, region: &Region) -> IVec2 {
        region.origin * T - self.margin
    }

    fn rasterize(&mut self, map: &IsoMap, region: &Region, cols: Range<usize>) {
        let interior = region.pixel_rect();
        let origin = self.scratch_origin(region);
        let world = self.extent.rect();
        for (col, row) in diagonal_order(cols, map.rows()) {
            let Some(cell) = map.get(col, row) else {
                continue;
            };
            let anchor = self.extent.anchor(col, row, cell.height);
            if !self.visible(&world, &interior, anchor, cell.height) {
                continue;
            }
            draw_cell(&mut self.scratch, anchor - origin, cell);
            self.stats.cells_drawn += 1;
        }
    }

    fn stamp(&mut self, map: &IsoMap, region: &Region, cols: Range<usize>) {
        let interior = region.pixel_rect();
        let world = self.extent.rect();
        for (col, row) in diagonal_order(cols, map.rows()) {
            let Some(cell) = map.get(col, row) else {
                continue;
            };
            let anchor = self.extent.anchor(col, row, cell.height);
            if !self.visible(&world, &interior, anchor, cell.height) {
                continue;
            }
            stamp_cell(&METATILES, &mut self.store, &mut self.tiles, anchor, cell);
            self.stats.cells_drawn += 1;
        }
    }

    /// Whether a cube at `anchor` touches `interior`. Cubes outside the
    /// world extent are skipped; with a correct extent there are none.
    fn visible(&self, world: &PixelRect, interior: &PixelRect, anchor: IVec2, height: u8) -> bool {
        let bbox = ShapeBounds::rect_at(anchor, height);
        debug_assert!(world.contains_rect(&bbox), "cube {bbox:?} outside world extent");
        bbox.intersects(world) && bbox.intersects(interior)
    }

    fn check_clipping(&mut self, region: &Region) {
        let clipped = self.scratch.clipped();
        debug_assert_eq!(clipped, 0, "patch at {} clipped pixels", region.origin);
        if clipped > 0 {
            log::warn!("patch at {} clipped {clipped} pixels", region.origin);
            self.stats.clipped_pixels += clipped;
        }
    }

    fn extract(&mut self, region: &Region, rows: Range<usize>) {
        let stride = self.scratch.width();
        let base = region.origin - self.tiles.origin();
        for r in rows {
            for c in 0..region.cols {
                let x = self.margin.x as usize + c * TILE_SIZE;
                let y = self.margin.y as usize + r * TILE_SIZE;
                let tile = Tile::from_block(self.scratch.pixels(), stride, x, y);
                let id = self.store.find_or_add(&tile);
                self.tiles
                    .set((base.x as usize) + c, (base.y as usize) + r, id);
            }
        }
    }

    fn finish(&mut self) {
        self.stats.tiles = self.store.len();
        self.stats.capacity = self.store.capacity();
        self.stats.overflows = self.store.overflow_count();
    }
}
