pub mod compiler;
pub mod engine;
pub mod metatile;
pub mod projection;
pub mod ring;
pub mod scheduler;
pub mod stream;
pub mod types;

pub use compiler::{CompileError, CompileStats, WorldCompiler};
pub use engine::{Engine, EngineError, Frame};
pub use projection::{HALF_H, HALF_W, SIDE_UNIT, cell_to_world, world_to_cell, world_to_screen};
pub use scheduler::{Phase, Scheduler, Work};
pub use stream::{Axis, StreamDelta, StreamingWindow, Strip};
pub use types::{Region, Screen, WorldExtent};
