//! Follow camera in 24.8 fixed point.
//!
//! Positions are world pixels (see [`crate::engine::types::WorldExtent`])
//! shifted left by [`FP_SHIFT`]. The camera eases an eighth of the way
//! towards its target each tic and never leaves [`Bounds`].

use glam::IVec2;

use crate::engine::types::WorldExtent;

pub const FP_SHIFT: u32 = 8;
pub const FP_ONE: i32 = 1 << FP_SHIFT;

/// Keep-out band along every world edge, in pixels.
pub const EDGE_MARGIN: i32 = 16;

#[inline]
pub fn to_fixed(px: IVec2) -> IVec2 {
    px << FP_SHIFT
}

#[inline]
pub fn to_pixels(fp: IVec2) -> IVec2 {
    fp >> FP_SHIFT
}

/// Inclusive fixed-point box that movers are clamped to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Bounds {
    pub min: IVec2,
    pub max: IVec2,
}

impl Bounds {
    /// The world extent minus [`EDGE_MARGIN`]. A world too small for the
    /// margin collapses to its centre.
    pub fn of_extent(extent: &WorldExtent) -> Self {
        let size = IVec2::new(extent.width, extent.height);
        let lo = IVec2::splat(EDGE_MARGIN);
        let hi = size - 1 - lo;
        let mid = size / 2;
        let min = IVec2::new(
            if lo.x <= hi.x { lo.x } else { mid.x },
            if lo.y <= hi.y { lo.y } else { mid.y },
        );
        let max = hi.max(min);
        Self {
            min: to_fixed(min),
            max: to_fixed(max),
        }
    }

    #[inline]
    pub fn clamp(&self, fp: IVec2) -> IVec2 {
        fp.clamp(self.min, self.max)
    }
}

#[derive(Clone, Copy, Debug)]
pub struct Camera {
    pos: IVec2,
    bounds: Bounds,
}

impl Camera {
    /// Start centred on `target` (fixed point).
    pub fn new(target: IVec2, bounds: Bounds) -> Self {
        Self {
            pos: bounds.clamp(target),
            bounds,
        }
    }

    #[inline]
    pub fn pos(&self) -> IVec2 {
        self.pos
    }

    /// Whole world pixel the camera is centred on.
    #[inline]
    pub fn pos_px(&self) -> IVec2 {
        to_pixels(self.pos)
    }

    /// Move an eighth of the remaining distance towards `target`.
    pub fn follow(&mut self, target: IVec2) {
        self.pos += (target - self.pos) >> 3;
        self.pos = self.bounds.clamp(self.pos);
    }

    /// Jump straight to `target`.
    pub fn snap(&mut self, target: IVec2) {
        self.pos = self.bounds.clamp(target);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_shrink_the_extent() {
        let ext = WorldExtent::of(200, 16, 4);
        let b = Bounds::of_extent(&ext);
        assert_eq!(to_pixels(b.min), IVec2::splat(16));
        assert_eq!(to_pixels(b.max), IVec2::new(ext.width - 17, ext.height - 17));

        // 1×1 flat world is 33×16 px: too short for the vertical margin
        let tiny = Bounds::of_extent(&WorldExtent::of(1, 1, 0));
        assert_eq!(to_pixels(tiny.min), IVec2::new(16, 8));
        assert_eq!(to_pixels(tiny.max), IVec2::new(16, 8));
    }

    #[test]
    fn follow_eases_and_converges() {
        let b = Bounds::of_extent(&WorldExtent::of(200, 16, 4));
        let start = to_fixed(IVec2::new(100, 100));
        let target = to_fixed(IVec2::new(900, 300));
        let mut cam = Camera::new(start, b);

        cam.follow(target);
        assert_eq!(cam.pos(), start + (target - start) / 8);

        for _ in 0..200 {
            cam.follow(target);
        }
        // the >> 3 step stalls within 8 fixed-point units of the target
        let d = (target - cam.pos()).abs();
        assert!(d.x < 8 && d.y < 8, "{d}");
        assert!((899..=900).contains(&cam.pos_px().x));
    }

    #[test]
    fn camera_never_leaves_bounds() {
        let b = Bounds::of_extent(&WorldExtent::of(20, 8, 2));
        let mut cam = Camera::new(IVec2::new(-1 << 20, -1 << 20), b);
        assert_eq!(cam.pos(), b.min);
        for _ in 0..100 {
            cam.follow(IVec2::new(1 << 24, 1 << 24));
            assert!(cam.pos().cmpge(b.min).all() && cam.pos().cmple(b.max).all());
        }
        cam.snap(IVec2::new(1 << 24, 0));
        assert_eq!(cam.pos(), IVec2::new(b.max.x, b.min.y));
    }
}
