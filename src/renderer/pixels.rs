use super::PixelSink;

/// Row-major palette-indexed scratch buffer with silent clipping.
///
/// Clipped writes are counted so callers that expect every write to land
/// (the world compiler) can check the invariant.
#[derive(Clone, Debug, Default)]
pub struct PixelBuffer {
    pixels: Vec<u8>,
    width: usize,
    height: usize,
    clipped: usize,
}

impl PixelBuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            pixels: vec![0; width * height],
            width,
            height,
            clipped: 0,
        }
    }

    /// Fill with transparent and reset the clip counter.
    pub fn clear(&mut self) {
        self.pixels.fill(0);
        self.clipped = 0;
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    #[inline]
    pub fn get(&self, x: i32, y: i32) -> Option<u8> {
        if self.in_bounds(x, y) {
            Some(self.pixels[y as usize * self.width + x as usize])
        } else {
            None
        }
    }

    /// Writes dropped since the last clear.
    #[inline]
    pub fn clipped(&self) -> usize {
        self.clipped
    }

    #[inline]
    fn in_bounds(&self, x: i32, y: i32) -> bool {
        (0..self.width as i32).contains(&x) && (0..self.height as i32).contains(&y)
    }
}

impl PixelSink for PixelBuffer {
    #[inline]
    fn plot(&mut self, x: i32, y: i32, color: u8) {
        if self.in_bounds(x, y) {
            self.pixels[y as usize * self.width + x as usize] = color;
        } else {
            self.clipped += 1;
        }
    }

    fn hspan(&mut self, x0: i32, x1: i32, y: i32, color: u8) {
        if x1 < x0 {
            return;
        }
        let total = (x1 - x0 + 1) as usize;
        if !(0..self.height as i32).contains(&y) {
            self.clipped += total;
            return;
        }
        let lo = x0.max(0);
        let hi = x1.min(self.width as i32 - 1);
        if lo > hi {
            self.clipped += total;
            return;
        }
        self.clipped += total - (hi - lo + 1) as usize;
        let row = y as usize * self.width;
        self.pixels[row + lo as usize..=row + hi as usize].fill(color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hspan_clips_and_counts() {
        let mut buf = PixelBuffer::new(8, 4);
        buf.hspan(-3, 2, 1, 7);
        assert_eq!(buf.get(0, 1), Some(7));
        assert_eq!(buf.get(2, 1), Some(7));
        assert_eq!(buf.get(3, 1), Some(0));
        assert_eq!(buf.clipped(), 3);

        buf.hspan(6, 20, 2, 5);
        assert_eq!(buf.get(7, 2), Some(5));
        assert_eq!(buf.clipped(), 3 + 13);

        buf.hspan(0, 3, 9, 5);
        assert_eq!(buf.clipped(), 3 + 13 + 4);

        buf.plot(-1, 0, 1);
        assert_eq!(buf.clipped(), 21);
        buf.clear();
        assert_eq!(buf.clipped(), 0);
        assert!(buf.pixels().iter().all(|&p| p == 0));
    }

    #[test]
    fn empty_span_writes_nothing() {
        let mut buf = PixelBuffer::new(4, 1);
        buf.hspan(3, 2, 0, 9);
        assert!(buf.pixels().iter().all(|&p| p == 0));
        assert_eq!(buf.clipped(), 0);
    }
}
