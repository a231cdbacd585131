use super::{InputCmd, Position, WalkAnim, Facing, player, systems};
use crate::engine::types::WorldExtent;
use crate::world::camera::Bounds;
use glam::IVec2;
use hecs::World;
use std::time::{Duration, Instant};

pub const SIM_FPS: u32 = 60;
const TIC: Duration = Duration::from_micros(1_000_000 / SIM_FPS as u64);

/// What the frame loop needs to know about the player after a pump.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlayerView {
    pub pos: IVec2,
    pub facing: Facing,
    pub frame: u8,
}

/// Owns the ECS world and drives all game-logic systems.
pub struct TicRunner {
    world: World,
    bounds: Bounds,
    player: hecs::Entity,
    cmd: InputCmd,
    last: Instant,
}

impl TicRunner {
    /// Fresh world with the player at its start cell.
    pub fn new(extent: &WorldExtent) -> Self {
        let mut world = World::new();
        let player = player::spawn_player(&mut world, extent, player::START_CELL);
        Self {
            world,
            bounds: Bounds::of_extent(extent),
            player,
            cmd: InputCmd::default(),
            last: Instant::now(),
        }
    }

    #[inline]
    pub fn world(&self) -> &hecs::World {
        &self.world
    }

    #[inline]
    pub fn world_mut(&mut self) -> &mut hecs::World {
        &mut self.world
    }

    #[inline]
    pub fn player(&self) -> hecs::Entity {
        self.player
    }

    #[inline]
    pub fn bounds(&self) -> &Bounds {
        &self.bounds
    }

    /// Input applied on every following tic until replaced.
    pub fn set_input(&mut self, cmd: InputCmd) {
        self.cmd = cmd;
    }

    pub fn player_view(&self) -> Option<PlayerView> {
        let mut q = self
            .world
            .query_one::<(&Position, &Facing, &WalkAnim)>(self.player)
            .ok()?;
        q.get().map(|(pos, facing, anim)| PlayerView {
            pos: pos.0,
            facing: *facing,
            frame: anim.frame,
        })
    }

    /// Advance enough tics to synchronise simulation with real time.
    /// Returns how many ran.
    pub fn pump(&mut self) -> usize {
        let mut n = 0;
        while self.last.elapsed() >= TIC {
            self.tick();
            self.last += TIC;
            n += 1;
        }
        n
    }

    /* ---------------------------------------------------------------- */
    /* one fixed-rate game tic                                           */
    /* ---------------------------------------------------------------- */
    pub fn tick(&mut self) {
        systems::player_input(&mut self.world, self.player, self.cmd);
        systems::movement(&mut self.world, &self.bounds);
        systems::animation(&mut self.world);
    }
}
