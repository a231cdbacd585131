//! Exact-integer isometric cube rasterizer.
//!
//! A cube is a 2:1 diamond (the top face) anchored at its top vertex, plus
//! two vertical parallelogram faces hanging `side_h` pixels below the
//! diamond's left and right lower edges. No floating point anywhere: two
//! adjacent diamonds produced by the projection share their edge exactly and
//! never leave a gap.
//!
//! Row layout of a cube with side height `S` (relative to the anchor):
//!
//! ```text
//!   y ∈ [0, HH)            upper diamond half        half-span grows
//!   y ∈ [HH, 2·HH)         lower diamond half        + side faces beside it
//!   y ∈ [2·HH, HH + S)     side faces, full width    (only when S > HH)
//!   y ∈ [HH + S, 2·HH + S) side faces, closing up    half-span shrinks
//! ```
//!
//! Every pixel of a cube is written exactly once.

use bitflags::bitflags;
use glam::IVec2;

use super::PixelSink;
use crate::engine::projection::{HALF_H, HALF_W, SIDE_UNIT};
use crate::world::cell::LogicalCell;
use crate::world::palette::{BORDER, Shade, ground_color, side_color};

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct CubeFaces: u8 {
        const TOP   = 0x01;
        const LEFT  = 0x02;
        const RIGHT = 0x04;
    }
}

/// Palette indices for the five colour classes of a cube.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CubeStyle {
    pub top_left: u8,
    pub top_right: u8,
    pub side_left: u8,
    pub side_right: u8,
    pub border: u8,
}

impl CubeStyle {
    pub fn for_cell(cell: &LogicalCell) -> Self {
        Self {
            top_left: ground_color(cell.ground, Shade::TopLeft),
            top_right: ground_color(cell.ground, Shade::TopRight),
            side_left: side_color(cell.side, Shade::SideLeft),
            side_right: side_color(cell.side, Shade::SideRight),
            border: BORDER,
        }
    }
}

/// Draw one logical cell with its anchor at `anchor` (already raised).
pub fn draw_cell<S: PixelSink + ?Sized>(sink: &mut S, anchor: IVec2, cell: &LogicalCell) {
    draw_cube(
        sink,
        anchor,
        cell.height as i32 * SIDE_UNIT,
        &CubeStyle::for_cell(cell),
        CubeFaces::all(),
    );
}

/// Rasterize a cube whose diamond's top vertex is `anchor`.
///
/// Side faces are skipped entirely when `side_h <= 0`.
pub fn draw_cube<S: PixelSink + ?Sized>(
    sink: &mut S,
    anchor: IVec2,
    side_h: i32,
    style: &CubeStyle,
    faces: CubeFaces,
) {
    if faces.contains(CubeFaces::TOP) {
        draw_diamond(sink, anchor, style);
    }
    if side_h > 0 && faces.intersects(CubeFaces::LEFT | CubeFaces::RIGHT) {
        draw_sides(sink, anchor, side_h, style, faces);
    }
}

/*──────────────────────────── top face ───────────────────────────────*/

fn draw_diamond<S: PixelSink + ?Sized>(sink: &mut S, anchor: IVec2, style: &CubeStyle) {
    let (sx, sy) = (anchor.x, anchor.y);
    let (hw, hh) = (HALF_W, HALF_H);

    for dy in 0..hh {
        let half = (dy * hw + hh / 2) / hh;
        diamond_row(sink, sx, sy + dy, half, style);
    }
    for dy in 0..hh {
        let half = ((hh - dy) * hw + hh / 2) / hh;
        diamond_row(sink, sx, sy + hh + dy, half, style);
    }
}

#[inline]
fn diamond_row<S: PixelSink + ?Sized>(sink: &mut S, sx: i32, y: i32, half: i32, style: &CubeStyle) {
    sink.plot(sx - half, y, style.border);
    if half == 0 {
        return;
    }
    sink.plot(sx + half, y, style.border);
    // left half is [sx-half+1, sx-1], right half [sx, sx+half-1]
    sink.hspan(sx - half + 1, sx - 1, y, style.top_left);
    sink.hspan(sx, sx + half - 1, y, style.top_right);
}

/*──────────────────────────── side faces ─────────────────────────────*/

fn draw_sides<S: PixelSink + ?Sized>(
    sink: &mut S,
    anchor: IVec2,
    side_h: i32,
    style: &CubeStyle,
    faces: CubeFaces,
) {
    let (sx, sy) = (anchor.x, anchor.y);
    let (hw, hh) = (HALF_W, HALF_H);
    let top = sy + hh;

    for py in top..sy + 2 * hh + side_h {
        let dt = py - top;
        let db = py - (top + side_h);
        if db > hh {
            continue;
        }

        // Horizontal distance from the centre column to the upper boundary
        // (the diamond edge, or the front vertical edge once past it) and
        // to the lower boundary (the outer vertical edge, then the bottom
        // slope).
        let reach_top = if dt <= hh { hw - dt * hw / hh } else { 0 };
        let reach_bot = if db < 0 { hw } else { hw - db * hw / hh };
        if reach_bot <= reach_top {
            continue;
        }

        if faces.contains(CubeFaces::LEFT) {
            let (x_bot, x_top) = (sx - reach_bot, sx - reach_top);
            sink.plot(x_bot, py, style.border);
            sink.hspan(x_bot + 1, x_top - 1, py, style.side_left);
        }
        if dt >= hh {
            // front vertical edge
            sink.plot(sx, py, style.border);
        }
        if faces.contains(CubeFaces::RIGHT) {
            let (x_top, x_bot) = (sx + reach_top, sx + reach_bot);
            sink.hspan(x_top + 1, x_bot - 1, py, style.side_right);
            sink.plot(x_bot, py, style.border);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::PixelBuffer;
    use crate::world::cell::{Ground, Side};
    use std::collections::BTreeMap;

    /// Records every write so double-painting is observable.
    #[derive(Default)]
    struct Recorder {
        writes: BTreeMap<(i32, i32), Vec<u8>>,
    }

    impl PixelSink for Recorder {
        fn plot(&mut self, x: i32, y: i32, color: u8) {
            self.writes.entry((x, y)).or_default().push(color);
        }
    }

    impl Recorder {
        fn color(&self, x: i32, y: i32) -> Option<u8> {
            self.writes.get(&(x, y)).map(|w| w[0])
        }

        /// (min x, max x) per row, asserting the row has no holes.
        fn row_span(&self, y: i32) -> Option<(i32, i32)> {
            let xs: Vec<i32> = self
                .writes
                .keys()
                .filter(|&&(_, py)| py == y)
                .map(|&(x, _)| x)
                .collect();
            let (lo, hi) = (*xs.first()?, *xs.last()?);
            assert_eq!(xs.len() as i32, hi - lo + 1, "hole in row {y}");
            Some((lo, hi))
        }
    }

    fn style() -> CubeStyle {
        CubeStyle {
            top_left: 10,
            top_right: 11,
            side_left: 12,
            side_right: 13,
            border: BORDER,
        }
    }

    fn draw(side_h: i32, faces: CubeFaces) -> Recorder {
        let mut rec = Recorder::default();
        draw_cube(&mut rec, IVec2::ZERO, side_h, &style(), faces);
        rec
    }

    #[test]
    fn flat_diamond_is_watertight_and_single_painted() {
        let rec = draw(0, CubeFaces::all());
        assert!(rec.writes.values().all(|w| w.len() == 1));

        let expected_half = |y: i32| if y < HALF_H { 2 * y } else { 2 * (2 * HALF_H - y) };
        for y in 0..2 * HALF_H {
            let half = expected_half(y);
            assert_eq!(rec.row_span(y), Some((-half, half)), "row {y}");
            assert_eq!(rec.color(-half, y), Some(BORDER));
            assert_eq!(rec.color(half, y), Some(BORDER));
            for x in -half + 1..half {
                let want = if x < 0 { 10 } else { 11 };
                assert_eq!(rec.color(x, y), Some(want), "({x},{y})");
            }
        }
        assert_eq!(rec.row_span(2 * HALF_H), None);
        assert_eq!(rec.row_span(-1), None);
    }

    #[test]
    fn raised_cube_covers_its_bounds_exactly_once() {
        for height in 1..=4 {
            let side_h = height * SIDE_UNIT;
            let rec = draw(side_h, CubeFaces::all());
            assert!(rec.writes.values().all(|w| w.len() == 1), "h{height}");

            let bottom = 2 * HALF_H + side_h - 1;
            for y in 0..=bottom {
                let (lo, hi) = rec.row_span(y).expect("row drawn");
                assert_eq!(lo, -hi, "symmetric row {y}");
                assert!(hi <= HALF_W);
            }
            assert_eq!(rec.row_span(bottom + 1), None);
            // the bottom row has the same shape as a flat diamond's
            assert_eq!(rec.row_span(bottom), Some((-2, 2)));
            // outer vertical edges run down to the start of the bottom slope
            for y in HALF_H..=HALF_H + side_h {
                assert_eq!(rec.row_span(y), Some((-HALF_W, HALF_W)), "h{height} row {y}");
            }
        }
    }

    #[test]
    fn side_faces_take_their_own_colours() {
        let rec = draw(2 * SIDE_UNIT, CubeFaces::all());
        // below the diamond, centre column is the front edge
        let y = 2 * HALF_H + 3;
        assert_eq!(rec.color(0, y), Some(BORDER));
        assert_eq!(rec.color(-5, y), Some(12));
        assert_eq!(rec.color(5, y), Some(13));
        assert_eq!(rec.color(-HALF_W, y), Some(BORDER));
        assert_eq!(rec.color(HALF_W, y), Some(BORDER));
        // beside the lower diamond half
        assert_eq!(rec.color(-15, HALF_H + 1), Some(12));
        assert_eq!(rec.color(15, HALF_H + 1), Some(13));
    }

    #[test]
    fn zero_height_draws_no_sides() {
        let flat = draw(0, CubeFaces::all());
        let top_only = draw(3 * SIDE_UNIT, CubeFaces::TOP);
        assert_eq!(flat.writes, top_only.writes);
        assert!(flat.writes.values().flatten().all(|&c| c != 12 && c != 13));
    }

    #[test]
    fn later_cube_overwrites_earlier() {
        let mut buf = PixelBuffer::new(64, 64);
        let back = LogicalCell::raised(Ground::Stone, Side::Stone, 2);
        let front = LogicalCell::flat(Ground::Water);
        draw_cell(&mut buf, IVec2::new(32, 8), &back);
        draw_cell(&mut buf, IVec2::new(32, 24), &front);
        // the front diamond's centre wins over the back cube's side face
        let water = ground_color(Ground::Water, Shade::TopRight);
        assert_eq!(buf.get(33, 24 + HALF_H), Some(water));
        assert_eq!(buf.clipped(), 0);
    }

    #[test]
    fn clipped_writes_are_dropped() {
        let mut buf = PixelBuffer::new(16, 16);
        draw_cube(&mut buf, IVec2::new(0, -4), 8, &style(), CubeFaces::all());
        assert!(buf.clipped() > 0);
        assert_eq!(buf.get(0, 0), Some(11));
    }
}
