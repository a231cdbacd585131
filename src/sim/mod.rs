mod components;
mod player;
mod systems;
mod tic;

pub use components::{Facing, InputCmd, Player, Position, Velocity, WalkAnim};
pub use player::{START_CELL, spawn_player};
pub use systems::{ANIM_TICS, MOVE_SPEED, WALK_FRAMES, animation, iso_step, movement, player_input};
pub use tic::{PlayerView, SIM_FPS, TicRunner};
