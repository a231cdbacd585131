//! Software stand-in for a fixed-function tiled background compositor.
//!
//! The display owns its own copies of everything it shows: the tile atlas
//! (uploaded once per compile), the tile-index map in hardware layout
//! ([`Vram`]) and the scroll registers. It never borrows engine state, so a
//! recompile in progress cannot tear the visible frame.

use byteorder::{ByteOrder, LittleEndian};
use glam::IVec2;

use crate::engine::stream::{StreamDelta, StreamingWindow};
use crate::world::palette::{Palette, Rgba};
use crate::world::tile::{TILE_SIZE, Tile, TileId};

/// Entries per screenblock edge.
pub const BLOCK: usize = 32;
const BLOCK_BYTES: usize = BLOCK * BLOCK * 2;

/// Tile-index map in screenblock layout: the `size × size` surface is cut
/// into 32×32 blocks stored one after the other (left to right, then top to
/// bottom), each entry a little-endian `u16`.
#[derive(Clone)]
pub struct Vram {
    size: usize,
    bytes: Vec<u8>,
}

impl Vram {
    pub fn new(size: usize) -> Self {
        assert!(size % BLOCK == 0 && size > 0, "vram size {size} not a multiple of {BLOCK}");
        Self {
            size,
            bytes: vec![0; size * size * 2],
        }
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Byte offset of entry `(col, row)`.
    #[inline]
    pub fn offset(&self, col: usize, row: usize) -> usize {
        let block = (row / BLOCK) * (self.size / BLOCK) + col / BLOCK;
        block * BLOCK_BYTES + ((row % BLOCK) * BLOCK + col % BLOCK) * 2
    }

    #[inline]
    pub fn get(&self, col: usize, row: usize) -> TileId {
        let o = self.offset(col, row);
        LittleEndian::read_u16(&self.bytes[o..o + 2])
    }

    #[inline]
    pub fn set(&mut self, col: usize, row: usize, id: TileId) {
        let o = self.offset(col, row);
        LittleEndian::write_u16(&mut self.bytes[o..o + 2], id);
    }

    /// Raw image, as a DMA to video memory would copy it.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

pub struct Display {
    palette: Palette,
    atlas: Vec<Tile>,
    vram: Vram,
    scroll: IVec2,
}

impl Display {
    pub fn new(mirror_size: usize, palette: Palette) -> Self {
        Self {
            palette,
            atlas: vec![Tile::EMPTY],
            vram: Vram::new(mirror_size),
            scroll: IVec2::ZERO,
        }
    }

    /// Replace the tile atlas.
    pub fn upload_atlas(&mut self, tiles: &[Tile]) {
        self.atlas.clear();
        self.atlas.extend_from_slice(tiles);
        log::debug!("display: atlas upload, {} tiles", tiles.len());
    }

    #[inline]
    pub fn atlas(&self) -> &[Tile] {
        &self.atlas
    }

    #[inline]
    pub fn vram(&self) -> &Vram {
        &self.vram
    }

    #[inline]
    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    /// Copy what `delta` says changed in the mirror.
    pub fn apply(&mut self, window: &StreamingWindow, delta: &StreamDelta) {
        if delta.full_reload {
            let size = window.size();
            for (i, &id) in window.mirror().iter().enumerate() {
                self.vram.set(i % size, i / size, id);
            }
            return;
        }
        for &strip in &delta.strips {
            for (c, r, id) in window.strip_entries(strip) {
                self.vram.set(c, r, id);
            }
        }
    }

    pub fn set_scroll(&mut self, scroll: IVec2) {
        self.scroll = scroll;
    }

    /// Compose the background into a `w × h` RGBA frame.
    ///
    /// Entries naming tiles past the atlas show as transparent.
    pub fn compose(&self, out: &mut [Rgba], w: usize, h: usize) {
        let mask = (self.vram.size() * TILE_SIZE) as i32 - 1;
        for y in 0..h {
            let by = ((self.scroll.y + y as i32) & mask) as usize;
            let row = &mut out[y * w..(y + 1) * w];
            for (x, px) in row.iter_mut().enumerate() {
                let bx = ((self.scroll.x + x as i32) & mask) as usize;
                let id = self.vram.get(bx / TILE_SIZE, by / TILE_SIZE);
                let idx = self
                    .atlas
                    .get(id as usize)
                    .map_or(0, |t| t.pixel(bx % TILE_SIZE, by % TILE_SIZE));
                *px = self.palette[idx as usize];
            }
        }
    }
}

/*──────────────────────────── player marker ─────────────────────────*/

const MARKER_BODY: Rgba = 0xFFE0_C060;
const MARKER_HEAD: Rgba = 0xFFF8_D8B0;
const MARKER_LEGS: Rgba = 0xFF30_3050;

/// Draw a small figure whose feet touch `feet` (screen pixels). `frame`
/// selects the walk pose.
pub fn draw_marker(out: &mut [Rgba], w: usize, h: usize, feet: IVec2, frame: u8) {
    let mut put = |dx: i32, dy: i32, c: Rgba| {
        let (x, y) = (feet.x + dx, feet.y + dy);
        if (0..w as i32).contains(&x) && (0..h as i32).contains(&y) {
            out[y as usize * w + x as usize] = c;
        }
    };
    for dy in -12..=-10 {
        for dx in -1..=1 {
            put(dx, dy, MARKER_HEAD);
        }
    }
    for dy in -9..=-4 {
        for dx in -2..=2 {
            put(dx, dy, MARKER_BODY);
        }
    }
    // legs swing on alternate poses
    let stride = if frame % 2 == 0 { 1 } else { 2 };
    for dy in -3..=0 {
        put(-stride, dy, MARKER_LEGS);
        put(stride, dy, MARKER_LEGS);
    }
}
