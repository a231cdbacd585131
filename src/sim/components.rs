use glam::IVec2;

/// World-pixel position in 24.8 fixed point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position(pub IVec2);

/// Displacement per tic, fixed point.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Velocity(pub IVec2);

impl Velocity {
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0 == IVec2::ZERO
    }
}

/// Screen-diagonal a walker faces. The discriminant is the sprite row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Facing {
    #[default]
    SouthEast = 0,
    NorthEast = 1,
    NorthWest = 2,
    SouthWest = 3,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkAnim {
    pub frame: u8,
    pub timer: u8,
    pub moving: bool,
}

/// Tag for the entity the camera follows.
#[derive(Debug, Clone, Copy)]
pub struct Player;

/// One tic of input along the map axes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InputCmd {
    pub iso_dx: i8, // +1 = along +col (screen south-east)
    pub iso_dy: i8, // +1 = along +row (screen south-west)
}
