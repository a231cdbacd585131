//! Procedural map producer.
//!
//! The layout is authored for a 200×16 strip; other sizes sample the same
//! layout scaled to fit, so small test maps still get every kind of
//! terrain. From west to east: stone clusters, a dirt trail, a river, a
//! pond, a lake, a desert and a walled fortress with towers. A winding road
//! runs the whole length.

use super::cell::{Ground, IsoMap, LogicalCell, MapError, Side};

const REF_COLS: usize = 200;
const REF_ROWS: usize = 16;

/// xorshift32; a zero state is replaced so the stream never sticks.
#[derive(Clone, Copy, Debug)]
pub struct XorShift32(u32);

impl XorShift32 {
    pub fn new(seed: u32) -> Self {
        Self(if seed == 0 { 0xDEAD_BEEF } else { seed })
    }

    pub fn next_u32(&mut self) -> u32 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.0 = x;
        x
    }

    /// Percentage roll: true with probability `pct`/100.
    pub fn chance(&mut self, pct: u32) -> bool {
        self.next_u32() % 100 < pct
    }
}

/// Per-cell stream so a feature's look does not depend on scan order.
fn cell_rng(seed: u32, col: usize, row: usize, salt: u32) -> XorShift32 {
    let mixed = (col as u32)
        .wrapping_mul(salt)
        .wrapping_add((row as u32).wrapping_mul(97))
        .wrapping_add(12345)
        ^ seed;
    let mut rng = XorShift32::new(mixed);
    rng.next_u32();
    rng
}

pub fn generate(cols: usize, rows: usize, max_height: u8, seed: u32) -> Result<IsoMap, MapError> {
    let mut map = IsoMap::new(cols, rows, max_height)?;
    for row in 0..rows {
        for col in 0..cols {
            let rc = col * REF_COLS / cols;
            let rr = row * REF_ROWS / rows;
            let cell = terrain(rc, rr, max_height, seed);
            map.set(col, row, cell)?;
        }
    }
    let raised = (0..rows)
        .flat_map(|r| (0..cols).map(move |c| (c, r)))
        .filter(|&(c, r)| map.get(c, r).is_some_and(|cell| cell.height > 0))
        .count();
    log::debug!("generated {cols}x{rows} map (seed {seed:#x}), {raised} raised cells");
    Ok(map)
}

/// Cell at reference coordinate `(c, r)`.
fn terrain(c: usize, r: usize, max_h: u8, seed: u32) -> LogicalCell {
    let (ci, ri) = (c as i32, r as i32);
    let mut cell = LogicalCell::flat(Ground::Grass);

    // winding stone road
    if (6..=9).contains(&r) {
        let center = 7 + ((ci * 3 + ci / 7) % 4) - 1;
        if (ri - center).abs() <= 1 {
            cell = LogicalCell::flat(Ground::Stone);
        }
    }

    // river
    if (40..=55).contains(&c) {
        let center = 4 + ((ci - 40) * 2 + 3) / 5;
        if (ri - center).abs() <= 1 {
            cell = LogicalCell::flat(Ground::Water);
        }
    }

    // lake
    if (100..=115).contains(&c) && (8..=14).contains(&r) {
        let (dx, dy) = (ci - 107, ri - 11);
        if dx * dx + dy * dy * 3 <= 30 {
            cell = LogicalCell::flat(Ground::Water);
        }
    }

    // pond
    if (70..=75).contains(&c) && (1..=4).contains(&r) {
        let (dx, dy) = (ci - 72, ri - 2);
        if dx * dx + dy * dy <= 4 {
            cell = LogicalCell::flat(Ground::Water);
        }
    }

    // desert
    if (130..=160).contains(&c)
        && cell.ground == Ground::Grass
        && cell_rng(seed, c, r, 31).chance(60)
    {
        cell = LogicalCell::flat(Ground::Dirt);
    }

    // dirt trail
    if (13..=15).contains(&r)
        && (20..=90).contains(&c)
        && cell.ground == Ground::Grass
        && cell_rng(seed, c, r, 17).chance(50)
    {
        cell = LogicalCell::flat(Ground::Dirt);
    }

    // fortress
    if (175..=195).contains(&c) {
        let wall_row = r == 3 || r == 12;
        let wall_col = (c == 175 || c == 195) && (3..=12).contains(&r);
        if wall_row && (c == 175 || c == 195) {
            cell = LogicalCell::raised(Ground::Roof, Side::Stone, max_h);
        } else if wall_row || wall_col {
            cell = LogicalCell::raised(Ground::Stone, Side::Stone, max_h.min(2));
        } else if (184..=186).contains(&c) && (7..=8).contains(&r) {
            cell = LogicalCell::raised(Ground::Roof, Side::Stone, max_h.min(3));
        } else if (177..=193).contains(&c) && (5..=10).contains(&r) {
            cell = LogicalCell::flat(Ground::Stone);
        }
    }

    // stone clusters, some of them boulders
    if (15..=25).contains(&c) && r <= 3 {
        let mut rng = cell_rng(seed, c, r, 23);
        if rng.chance(40) {
            let height = if rng.chance(35) { max_h.min(1) } else { 0 };
            cell = LogicalCell::raised(Ground::Stone, Side::Stone, height);
        }
    }

    cell
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count(map: &IsoMap, pred: impl Fn(&LogicalCell) -> bool) -> usize {
        (0..map.rows())
            .flat_map(|r| (0..map.cols()).map(move |c| (c, r)))
            .filter(|&(c, r)| map.get(c, r).is_some_and(&pred))
            .count()
    }

    #[test]
    fn xorshift_never_sticks_at_zero() {
        let mut rng = XorShift32::new(0);
        assert_ne!(rng.next_u32(), 0);
        let mut a = XorShift32::new(42);
        let mut b = XorShift32::new(42);
        assert_eq!(a.next_u32(), b.next_u32());
    }

    #[test]
    fn full_strip_has_every_feature() {
        let map = generate(200, 16, 4, 1).unwrap();
        for g in Ground::ALL {
            assert!(count(&map, |c| c.ground == g) > 0, "{g:?}");
        }
        // towers reach the cap, walls stay lower
        assert_eq!(map.get(175, 3).map(|c| c.height), Some(4));
        assert_eq!(map.get(180, 3).map(|c| c.height), Some(2));
        assert_eq!(map.get(185, 6).map(|c| c.height), Some(0));
        assert_eq!(map.tallest(), 4);
    }

    #[test]
    fn same_seed_same_map() {
        let a = generate(64, 12, 4, 9).unwrap();
        let b = generate(64, 12, 4, 9).unwrap();
        for r in 0..12 {
            for c in 0..64 {
                assert_eq!(a.get(c, r), b.get(c, r));
            }
        }
    }

    #[test]
    fn small_maps_scale_the_layout() {
        let map = generate(24, 10, 4, 99).unwrap();
        assert!(count(&map, |c| c.height > 0) > 0);
        assert!(count(&map, |c| c.ground == Ground::Water) > 0);
        let flat = generate(24, 10, 0, 99).unwrap();
        assert_eq!(flat.tallest(), 0);
    }
}
