use glam::IVec2;
use hecs::World;

use super::{Facing, Player, Position, Velocity, WalkAnim};
use crate::engine::projection::HALF_H;
use crate::engine::types::WorldExtent;
use crate::world::camera::to_fixed;

/// Cell the player starts on.
pub const START_CELL: (usize, usize) = (3, 8);

/// Spawn the player standing on the centre of `cell`'s ground diamond.
pub fn spawn_player(world: &mut World, extent: &WorldExtent, cell: (usize, usize)) -> hecs::Entity {
    let feet = extent.anchor(cell.0, cell.1, 0) + IVec2::new(0, HALF_H);
    world.spawn((
        Player,
        Position(to_fixed(feet)),
        Velocity::default(),
        Facing::SouthEast,
        WalkAnim::default(),
    ))
}
