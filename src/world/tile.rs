// 8×8 palette-indexed tile block: the storage unit of the hardware compositor.

/// Edge length of one hardware tile in pixels.
pub const TILE_SIZE: usize = 8;

/// Bytes per tile (one byte per pixel, palette indexed).
pub const TILE_BYTES: usize = TILE_SIZE * TILE_SIZE;

/// Index into the deduplicated tile atlas.
pub type TileId = u16;

/// Reserved id of the fully transparent tile. Also the capacity fallback.
pub const EMPTY_TILE: TileId = 0;

/// One 64-byte tile. Identity is by content: two `Tile`s are the same tile
/// iff all 64 bytes match.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tile(pub [u8; TILE_BYTES]);

impl Tile {
    pub const EMPTY: Tile = Tile([0; TILE_BYTES]);

    /// Copy the 8×8 block whose top-left pixel is `(x, y)` out of a
    /// row-major buffer of row length `stride`.
    pub fn from_block(pixels: &[u8], stride: usize, x: usize, y: usize) -> Self {
        let mut out = [0u8; TILE_BYTES];
        for (r, dst) in out.chunks_exact_mut(TILE_SIZE).enumerate() {
            let start = (y + r) * stride + x;
            dst.copy_from_slice(&pixels[start..start + TILE_SIZE]);
        }
        Tile(out)
    }

    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> u8 {
        self.0[y * TILE_SIZE + x]
    }

    #[inline]
    pub fn set_pixel(&mut self, x: usize, y: usize, c: u8) {
        self.0[y * TILE_SIZE + x] = c;
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.iter().all(|&p| p == 0)
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Draw `src` over `self`, keeping our pixel wherever `src` is
    /// transparent (index 0).
    pub fn composite(&self, src: &Tile) -> Tile {
        let mut out = *self;
        for (d, &s) in out.0.iter_mut().zip(src.0.iter()) {
            if s != 0 {
                *d = s;
            }
        }
        out
    }
}

impl Default for Tile {
    fn default() -> Self {
        Tile::EMPTY
    }
}

impl std::fmt::Debug for Tile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Tile [")?;
        for row in self.0.chunks_exact(TILE_SIZE) {
            writeln!(f, "  {row:2?}")?;
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_block_reads_with_stride() {
        let stride = 16;
        let pixels: Vec<u8> = (0..stride * 10).map(|i| (i % 251) as u8).collect();
        let t = Tile::from_block(&pixels, stride, 8, 2);
        assert_eq!(t.pixel(0, 0), pixels[2 * stride + 8]);
        assert_eq!(t.pixel(7, 7), pixels[9 * stride + 15]);
    }

    #[test]
    fn composite_keeps_destination_under_transparent_source() {
        let mut dst = Tile([3; TILE_BYTES]);
        dst.set_pixel(1, 1, 9);
        let mut src = Tile::EMPTY;
        src.set_pixel(0, 0, 5);
        let out = dst.composite(&src);
        assert_eq!(out.pixel(0, 0), 5);
        assert_eq!(out.pixel(1, 1), 9);
        assert_eq!(out.pixel(7, 7), 3);
    }
}
