pub mod camera;
pub mod cell;
pub mod generator;
pub mod palette;
pub mod tile;
pub mod tilemap;
pub mod tileset;

pub use camera::{Bounds, Camera, FP_ONE, FP_SHIFT};
pub use cell::{Ground, IsoMap, LogicalCell, MAX_HEIGHT, MapError, Side};
pub use palette::{Palette, Rgba};
pub use tile::{EMPTY_TILE, TILE_SIZE, Tile, TileId};
pub use tilemap::TileMap;
pub use tileset::{HashIndex, LinearScan, Lookup, TileLookup, TileStore};
