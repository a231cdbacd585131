// Fixed background palette.
//
// Index 0 is transparent, index 1 is the outline colour, and every material
// owns a run of `SHADES_PER_TYPE` entries starting at `2 + SHADES_PER_TYPE*t`:
//
//   +0 top-left   +1 top-right   +2 side-left   +3 side-right
//   +4 highlight  +5 dark        +6 mid         +7 accent

use std::ops::{Index, IndexMut};

use super::cell::{Ground, Side};

pub const TRANSPARENT: u8 = 0;
pub const BORDER: u8 = 1;
pub const SHADES_PER_TYPE: u8 = 8;

/// Host-side frame-buffer colour (0xAARRGGBB).
pub type Rgba = u32;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Shade {
    TopLeft = 0,
    TopRight = 1,
    SideLeft = 2,
    SideRight = 3,
    Highlight = 4,
    Dark = 5,
    Mid = 6,
    Accent = 7,
}

#[inline]
fn slot(type_idx: u8, shade: Shade) -> u8 {
    2 + type_idx * SHADES_PER_TYPE + shade as u8
}

#[inline]
pub fn ground_color(g: Ground, shade: Shade) -> u8 {
    slot(g.index(), shade)
}

#[inline]
pub fn side_color(s: Side, shade: Shade) -> u8 {
    slot(s.index(), shade)
}

/// Expand a 5-5-5 colour to 0xFFRRGGBB.
#[inline]
pub const fn rgb15(r: u8, g: u8, b: u8) -> Rgba {
    0xFF00_0000 | (expand5(r) << 16) | (expand5(g) << 8) | expand5(b)
}

#[inline]
const fn expand5(c: u8) -> u32 {
    ((c as u32) << 3) | ((c as u32) >> 2)
}

pub struct Palette(pub [Rgba; 256]);

impl Index<usize> for Palette {
    type Output = Rgba;
    fn index(&self, idx: usize) -> &Rgba {
        &self.0[idx]
    }
}

impl IndexMut<usize> for Palette {
    fn index_mut(&mut self, idx: usize) -> &mut Rgba {
        &mut self.0[idx]
    }
}

/// RGB15 triples per material, in [`Shade`] order.
const MATERIALS: [[(u8, u8, u8); 8]; 5] = [
    // grass
    [
        (10, 22, 5),
        (7, 18, 3),
        (3, 10, 2),
        (5, 14, 3),
        (15, 23, 10),
        (6, 13, 4),
        (9, 18, 6),
        (12, 20, 8),
    ],
    // stone
    [
        (18, 18, 16),
        (14, 14, 13),
        (7, 7, 6),
        (10, 10, 9),
        (20, 20, 21),
        (8, 8, 9),
        (13, 13, 14),
        (16, 16, 17),
    ],
    // dirt
    [
        (18, 12, 6),
        (14, 9, 4),
        (7, 4, 2),
        (10, 7, 3),
        (23, 17, 10),
        (9, 6, 3),
        (14, 10, 5),
        (19, 13, 7),
    ],
    // water
    [
        (5, 15, 22),
        (3, 11, 18),
        (1, 5, 10),
        (2, 8, 14),
        (12, 18, 25),
        (3, 6, 13),
        (6, 11, 19),
        (14, 20, 26),
    ],
    // roof
    [
        (20, 6, 4),
        (16, 4, 3),
        (9, 2, 2),
        (12, 3, 2),
        (24, 10, 6),
        (10, 3, 2),
        (15, 5, 3),
        (22, 8, 5),
    ],
];

impl Default for Palette {
    fn default() -> Self {
        let mut pal = Palette([0xFF00_0000; 256]);
        pal[TRANSPARENT as usize] = rgb15(2, 2, 5);
        pal[BORDER as usize] = rgb15(1, 1, 1);
        for (t, shades) in MATERIALS.iter().enumerate() {
            for (s, &(r, g, b)) in shades.iter().enumerate() {
                pal[2 + t * SHADES_PER_TYPE as usize + s] = rgb15(r, g, b);
            }
        }
        pal
    }
}
