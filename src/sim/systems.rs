use glam::IVec2;
use hecs::World;

use super::{Facing, InputCmd, Position, Velocity, WalkAnim};
use crate::world::camera::{Bounds, FP_ONE};

pub const MOVE_SPEED: i32 = FP_ONE; // fixed point per tic along one map axis
pub const WALK_FRAMES: u8 = 6;
pub const ANIM_TICS: u8 = 4; // tics per walk frame

/* ── Input ────────────────────────────────────────────────────────── */

/// Facing for a held direction. The last single-axis key wins unless both
/// axes are held, in which case the pair picks the diagonal.
fn facing_for(cmd: InputCmd, current: Facing) -> Facing {
    match (cmd.iso_dx.signum(), cmd.iso_dy.signum()) {
        (0, 0) => current,
        (1, -1) => Facing::NorthEast,
        (1, 1) | (1, 0) => Facing::SouthEast,
        (-1, -1) | (-1, 0) => Facing::NorthWest,
        (-1, 1) | (0, 1) => Facing::SouthWest,
        _ => Facing::NorthEast,
    }
}

/// Screen displacement for one tic of `cmd`. A step along a map axis is
/// 2:1 on screen; holding both axes halves the speed.
pub fn iso_step(cmd: InputCmd) -> IVec2 {
    let (ix, iy) = (cmd.iso_dx.signum() as i32, cmd.iso_dy.signum() as i32);
    let d = IVec2::new(2 * ix - 2 * iy, ix + iy) * MOVE_SPEED;
    if ix != 0 && iy != 0 { d >> 1 } else { d }
}

pub fn player_input(world: &mut World, player: hecs::Entity, cmd: InputCmd) {
    if let Ok(mut q) = world.query_one::<(&mut Velocity, &mut Facing)>(player) {
        if let Some((vel, facing)) = q.get() {
            vel.0 = iso_step(cmd);
            *facing = facing_for(cmd, *facing);
        }
    }
}

/* ── Movement ─────────────────────────────────────────────────────── */

pub fn movement(world: &mut World, bounds: &Bounds) {
    for (_, (pos, vel, anim)) in world.query_mut::<(&mut Position, &Velocity, Option<&mut WalkAnim>)>() {
        pos.0 = bounds.clamp(pos.0 + vel.0);
        if let Some(anim) = anim {
            anim.moving = !vel.is_zero();
        }
    }
}

/* ── Animation system ─────────────────────────────────────────────── */

pub fn animation(world: &mut World) {
    for (_, anim) in world.query_mut::<&mut WalkAnim>() {
        if anim.moving {
            anim.timer += 1;
            if anim.timer >= ANIM_TICS {
                anim.timer = 0;
                anim.frame = (anim.frame + 1) % WALK_FRAMES;
            }
        } else {
            anim.frame = 0;
            anim.timer = 0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::types::WorldExtent;
    use crate::sim::player::spawn_player;

    fn cmd(iso_dx: i8, iso_dy: i8) -> InputCmd {
        InputCmd { iso_dx, iso_dy }
    }

    #[test]
    fn steps_follow_the_map_axes() {
        assert_eq!(iso_step(cmd(1, 0)), IVec2::new(2, 1) * FP_ONE);
        assert_eq!(iso_step(cmd(0, 1)), IVec2::new(-2, 1) * FP_ONE);
        assert_eq!(iso_step(cmd(-1, 0)), IVec2::new(-2, -1) * FP_ONE);
        // diagonals move at half rate
        assert_eq!(iso_step(cmd(1, -1)), IVec2::new(2, 0) * FP_ONE);
        assert_eq!(iso_step(cmd(1, 1)), IVec2::new(0, 1) * FP_ONE);
        assert_eq!(iso_step(cmd(0, 0)), IVec2::ZERO);
    }

    #[test]
    fn facing_resolves_diagonals() {
        let f = Facing::SouthEast;
        assert_eq!(facing_for(cmd(0, -1), f), Facing::NorthEast);
        assert_eq!(facing_for(cmd(1, -1), f), Facing::NorthEast);
        assert_eq!(facing_for(cmd(-1, 1), f), Facing::SouthWest);
        assert_eq!(facing_for(cmd(-1, -1), f), Facing::NorthWest);
        assert_eq!(facing_for(cmd(0, 0), Facing::NorthWest), Facing::NorthWest);
    }

    #[test]
    fn movement_clamps_to_bounds() {
        let ext = WorldExtent::of(8, 8, 0);
        let bounds = Bounds::of_extent(&ext);
        let mut world = World::new();
        let p = spawn_player(&mut world, &ext, (0, 0));

        for _ in 0..1000 {
            player_input(&mut world, p, cmd(0, -1));
            movement(&mut world, &bounds);
        }
        let pos = world.get::<&Position>(p).unwrap().0;
        assert_eq!(pos.y, bounds.min.y);
        assert!(pos.x <= bounds.max.x);
        assert_eq!(*world.get::<&Facing>(p).unwrap(), Facing::NorthEast);
    }

    #[test]
    fn walk_cycle_advances_and_resets() {
        let ext = WorldExtent::of(40, 40, 0);
        let bounds = Bounds::of_extent(&ext);
        let mut world = World::new();
        let p = spawn_player(&mut world, &ext, (20, 20));

        player_input(&mut world, p, cmd(1, 0));
        for _ in 0..(ANIM_TICS as usize * 7) {
            movement(&mut world, &bounds);
            animation(&mut world);
        }
        assert_eq!(world.get::<&WalkAnim>(p).unwrap().frame, 7 % WALK_FRAMES);

        player_input(&mut world, p, InputCmd::default());
        movement(&mut world, &bounds);
        animation(&mut world);
        let anim = *world.get::<&WalkAnim>(p).unwrap();
        assert_eq!((anim.frame, anim.timer, anim.moving), (0, 0, false));
    }
}
