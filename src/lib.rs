//! Isometric world compiler and tile-map streaming engine.
//!
//! A grid of [`world::LogicalCell`]s is rasterized back to front, cut into
//! 8×8 palette-indexed tiles and deduplicated by content. The resulting
//! tile map is streamed through a small toroidal mirror that follows the
//! camera, the way a fixed-function tiled background expects it.

pub mod config;
pub mod engine;
pub mod renderer;
pub mod sim;
pub mod world;
