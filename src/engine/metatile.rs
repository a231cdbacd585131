//! Metatile compositing strategy.
//!
//! Every ground type has a predefined 32×16 textured diamond and every side
//! type a 32×8 wall texture. A cell is *stamped* onto the tile map: each
//! 8×8 piece of its image is drawn over whatever tile already sits in that
//! slot (transparent source pixels keep the old content) and the result is
//! written back through the tile store as content-addressed data.
//!
//! Side faces are sheared samples of the wall texture: column `x` of the
//! face starts right under the diamond's lower edge at that column, and the
//! texture row is `v = y - edge(x) - 1`, wrapped to the texture height.

use glam::IVec2;
use once_cell::sync::Lazy;

use super::projection::{HALF_W, SIDE_UNIT};
use crate::world::cell::{Ground, LogicalCell, Side};
use crate::world::palette::{BORDER, Shade, ground_color, side_color};
use crate::world::tile::{TILE_SIZE, Tile};
use crate::world::tilemap::TileMap;
use crate::world::tileset::{TileLookup, TileStore};

pub const META_W: usize = 2 * HALF_W as usize;
pub const META_H: usize = META_W / 2;
pub const SIDE_TEX_H: usize = SIDE_UNIT as usize;

const T: i32 = TILE_SIZE as i32;
const MID: usize = META_W / 2;

/// Columns `[lo, hi)` the metatile diamond covers on row `y`.
#[inline]
pub fn diamond_span(y: usize) -> (usize, usize) {
    let half = if y < META_H / 2 { 2 * (y + 1) } else { 2 * (META_H - y) };
    (MID - half, MID + half)
}

/// Last diamond row at column `x`.
#[inline]
pub fn diamond_bottom(x: usize) -> usize {
    META_H / 2 + if x < MID { x / 2 } else { (META_W - 1 - x) / 2 }
}

/// Cheap deterministic texel noise.
#[inline]
fn noise(x: usize, y: usize) -> u32 {
    let mut h = (x as u32).wrapping_mul(0x9E37_79B1) ^ (y as u32).wrapping_mul(0x85EB_CA77);
    h ^= h >> 13;
    h.wrapping_mul(0xC2B2_AE35) >> 7
}

/*────────────────────────────── textures ─────────────────────────────*/

pub struct GroundMetatile(pub [u8; META_W * META_H]);

impl GroundMetatile {
    fn build(g: Ground) -> Self {
        let mut px = [0u8; META_W * META_H];
        for y in 0..META_H {
            let (lo, hi) = diamond_span(y);
            for x in lo..hi {
                let edge = x == lo || x == hi - 1 || y == 0 || y == META_H - 1;
                px[y * META_W + x] = if edge { BORDER } else { ground_texel(g, x, y) };
            }
        }
        Self(px)
    }

    #[inline]
    pub fn texel(&self, x: usize, y: usize) -> u8 {
        self.0[y * META_W + x]
    }
}

fn ground_texel(g: Ground, x: usize, y: usize) -> u8 {
    let base = if x < MID { Shade::TopLeft } else { Shade::TopRight };
    let n = noise(x, y);
    let shade = match g {
        Ground::Grass if n % 7 == 0 => Shade::Highlight,
        Ground::Grass if n % 11 == 0 => Shade::Dark,
        Ground::Stone if x % 4 == 0 && (x / 4 + y / 2) % 3 == 0 => Shade::Dark,
        Ground::Stone if n % 9 == 0 => Shade::Highlight,
        Ground::Dirt if n % 5 == 0 => Shade::Mid,
        Ground::Dirt if n % 13 == 0 => Shade::Dark,
        Ground::Water if (x + 2 * y) % 10 == 0 => Shade::Highlight,
        Ground::Water if (x + 2 * y) % 10 == 5 => Shade::Accent,
        Ground::Roof if y % 3 == 0 => Shade::Dark,
        _ => base,
    };
    ground_color(g, shade)
}

pub struct SideTexture(pub [u8; META_W * SIDE_TEX_H]);

impl SideTexture {
    fn build(s: Side) -> Self {
        let mut px = [0u8; META_W * SIDE_TEX_H];
        for v in 0..SIDE_TEX_H {
            for x in 0..META_W {
                let edge = x == 0 || x == MID || x == META_W - 1;
                px[v * META_W + x] = if edge { BORDER } else { side_texel(s, x, v) };
            }
        }
        Self(px)
    }

    #[inline]
    pub fn texel(&self, x: usize, v: usize) -> u8 {
        self.0[(v % SIDE_TEX_H) * META_W + x]
    }
}

fn side_texel(s: Side, x: usize, v: usize) -> u8 {
    let base = if x < MID { Shade::SideLeft } else { Shade::SideRight };
    let joint = if v < SIDE_TEX_H / 2 { 0 } else { 4 };
    let shade = match s {
        Side::Stone if v == 3 || v == SIDE_TEX_H - 1 || x % 8 == joint => Shade::Dark,
        Side::Dirt if noise(x, v) % 6 == 0 => Shade::Dark,
        Side::Grass if v == 0 => Shade::Mid,
        Side::Water if v % 4 == 0 => Shade::Highlight,
        Side::Roof if x % 4 == 0 => Shade::Dark,
        _ => base,
    };
    side_color(s, shade)
}

pub struct MetatileSet {
    ground: Vec<GroundMetatile>,
    side: Vec<SideTexture>,
}

/// Built on first use; shared by every compiler.
pub static METATILES: Lazy<MetatileSet> = Lazy::new(MetatileSet::build);

impl MetatileSet {
    fn build() -> Self {
        Self {
            ground: Ground::ALL.iter().map(|&g| GroundMetatile::build(g)).collect(),
            side: Side::ALL.iter().map(|&s| SideTexture::build(s)).collect(),
        }
    }

    #[inline]
    pub fn ground(&self, g: Ground) -> &GroundMetatile {
        &self.ground[g.index() as usize]
    }

    #[inline]
    pub fn side(&self, s: Side) -> &SideTexture {
        &self.side[s.index() as usize]
    }

    /// Full image of one cell: diamond on top, sheared side faces below.
    /// Returns the pixels (row length [`META_W`]) and the image height.
    pub fn cell_image(&self, cell: &LogicalCell) -> (Vec<u8>, usize) {
        let s = cell.height as usize * SIDE_TEX_H;
        let h = META_H + s;
        let mut px = vec![0u8; META_W * h];
        px[..META_W * META_H].copy_from_slice(&self.ground(cell.ground).0);
        if s > 0 {
            let tex = self.side(cell.side);
            for x in 0..META_W {
                let top = diamond_bottom(x) + 1;
                for v in 0..s {
                    px[(top + v) * META_W + x] = if v == s - 1 { BORDER } else { tex.texel(x, v) };
                }
            }
        }
        (px, h)
    }
}

/*────────────────────────────── stamping ─────────────────────────────*/

/// Composite one cell onto `map`. `anchor` is the cell's raised top vertex
/// in world pixels; the image's top-left lands on a tile boundary.
///
/// Returns how many tile slots were rewritten. Slots off the map are
/// skipped.
pub fn stamp_cell<L: TileLookup>(
    set: &MetatileSet,
    store: &mut TileStore<L>,
    map: &mut TileMap,
    anchor: IVec2,
    cell: &LogicalCell,
) -> usize {
    let top_left = IVec2::new(anchor.x - HALF_W, anchor.y);
    debug_assert!(
        top_left.x % T == 0 && top_left.y % T == 0,
        "metatile stamp at {top_left} not tile aligned"
    );
    let (px, h) = set.cell_image(cell);
    let first = top_left.div_euclid(IVec2::splat(T)) - map.origin();

    let mut written = 0;
    for ty in 0..h / TILE_SIZE {
        for tx in 0..META_W / TILE_SIZE {
            let src = Tile::from_block(&px, META_W, tx * TILE_SIZE, ty * TILE_SIZE);
            if src.is_empty() {
                continue;
            }
            let (c, r) = (first.x + tx as i32, first.y + ty as i32);
            let Some(old) = map.get(c, r) else {
                continue;
            };
            let merged = store.tile(old).composite(&src);
            let id = store.find_or_add(&merged);
            map.set(c as usize, r as usize, id);
            written += 1;
        }
    }
    written
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::tile::EMPTY_TILE;

    #[test]
    fn diamond_mask_is_symmetric_and_consistent() {
        for y in 0..META_H {
            let (lo, hi) = diamond_span(y);
            assert_eq!(lo + hi, META_W, "row {y}");
        }
        for x in 0..META_W {
            let bottom = diamond_bottom(x);
            let (lo, hi) = diamond_span(bottom);
            assert!((lo..hi).contains(&x), "column {x} row {bottom}");
            if bottom + 1 < META_H {
                let (lo, hi) = diamond_span(bottom + 1);
                assert!(!(lo..hi).contains(&x), "column {x} past bottom");
            }
        }
    }

    #[test]
    fn ground_texels_only_inside_mask() {
        for g in Ground::ALL {
            let m = METATILES.ground(g);
            for y in 0..META_H {
                let (lo, hi) = diamond_span(y);
                for x in 0..META_W {
                    let inside = (lo..hi).contains(&x);
                    assert_eq!(m.texel(x, y) != 0, inside, "{g:?} ({x},{y})");
                }
            }
        }
    }

    #[test]
    fn side_faces_hang_below_the_diamond_edge() {
        let cell = LogicalCell::raised(Ground::Stone, Side::Dirt, 2);
        let (px, h) = METATILES.cell_image(&cell);
        assert_eq!(h, META_H + 16);
        for x in 0..META_W {
            let top = diamond_bottom(x) + 1;
            let col = |y: usize| px[y * META_W + x];
            assert_ne!(col(top), 0, "column {x}");
            assert_eq!(col(top + 15), BORDER);
            if top + 16 < h {
                assert_eq!(col(top + 16), 0);
            }
        }
        let dirt_left = side_color(Side::Dirt, Shade::SideLeft);
        assert!(px.contains(&dirt_left));
    }

    #[test]
    fn stamping_composites_over_existing_tiles() {
        let mut store = TileStore::linear(256);
        let mut map = TileMap::new(IVec2::ZERO, 8, 6);
        let grass = LogicalCell::flat(Ground::Grass);

        let n = stamp_cell(&METATILES, &mut store, &mut map, IVec2::new(16, 0), &grass);
        assert_eq!(n, 8);
        let first: Vec<_> = map.ids().to_vec();

        // the same image again changes nothing
        stamp_cell(&METATILES, &mut store, &mut map, IVec2::new(16, 0), &grass);
        assert_eq!(map.ids(), first.as_slice());

        // a neighbour one diagonal step right shares the (1, 1) slot
        let before = store.tile(map.get(2, 1).unwrap_or(EMPTY_TILE)).to_owned();
        stamp_cell(&METATILES, &mut store, &mut map, IVec2::new(32, 8), &grass);
        let after = store.tile(map.get(2, 1).unwrap_or(EMPTY_TILE));
        for i in 0..64 {
            if after.0[i] != before.0[i] {
                assert_ne!(after.0[i], 0, "composite never clears pixels");
            }
        }
        assert!(map.get(5, 2).is_some_and(|id| id != EMPTY_TILE));
    }

    #[test]
    fn stamps_off_the_map_are_skipped() {
        let mut store = TileStore::hashed(64);
        let mut map = TileMap::new(IVec2::new(2, 0), 2, 2);
        let n = stamp_cell(
            &METATILES,
            &mut store,
            &mut map,
            IVec2::new(16, 0),
            &LogicalCell::flat(Ground::Water),
        );
        // image covers world tiles x 0..4, the map only 2..4
        assert_eq!(n, 4);
    }
}
