//! Pixel output layer.
//!
//! *Nothing upstream touches a pixel array directly.* The rasterizer writes
//! through a [`PixelSink`]; the compiler's scratch is a [`PixelBuffer`]; the
//! host display is emulated by [`display::Display`].
//!
//! * Colours here are palette **indices** (`u8`), not RGB. Index 0 is
//!   transparent.
//! * Sinks clip silently: a write outside the target is dropped, never an
//!   error.

pub mod display;
pub mod pixels;
pub mod raster;

pub use display::{Display, Vram};
pub use pixels::PixelBuffer;
pub use raster::{CubeFaces, CubeStyle, draw_cube};

/// Destination for rasterized pixels.
pub trait PixelSink {
    /// Write one pixel.
    fn plot(&mut self, x: i32, y: i32, color: u8);

    /// Fill `x0 ..= x1` on scan-line `y`. Empty when `x1 < x0`.
    fn hspan(&mut self, x0: i32, x1: i32, y: i32, color: u8) {
        for x in x0..=x1 {
            self.plot(x, y, color);
        }
    }
}
