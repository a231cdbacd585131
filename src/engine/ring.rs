//! Toroidal addressing into a power-of-two ring.
//!
//! Logical coordinate `v` lives in slot `v mod size`. With `size` a power of
//! two this is a single mask, and it is correct for negative `v` as well
//! (two's complement `&` equals the Euclidean remainder).

/// Ring of `size` slots. Precondition: `size` is a power of two.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Ring {
    size: usize,
    mask: i32,
}

impl Ring {
    pub fn new(size: usize) -> Self {
        assert!(
            size.is_power_of_two() && size <= i32::MAX as usize,
            "ring size {size} must be a power of two"
        );
        Self {
            size,
            mask: size as i32 - 1,
        }
    }

    #[inline]
    pub fn size(self) -> usize {
        self.size
    }

    /// Slot of logical coordinate `v`.
    #[inline]
    pub fn wrap(self, v: i32) -> usize {
        (v & self.mask) as usize
    }
}
