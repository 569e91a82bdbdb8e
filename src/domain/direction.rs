/// Facing direction of a block: four quarter turns about the view axis.
///
/// Rotation is applied with exact component swaps instead of a quaternion,
/// so connector positions stay bit-exact after any number of turns and
/// snapped blocks line up without float drift.

use glam::Vec3;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Direction {
    #[default]
    Up,
    Right,
    Down,
    Left,
}

impl Direction {
    pub const ALL: [Direction; 4] = [Direction::Up, Direction::Right, Direction::Down, Direction::Left];

    fn index(self) -> usize {
        self as usize
    }

    /// One step along Up → Right → Down → Left (clockwise) or back, wrapping.
    pub fn rotated(self, clockwise: bool) -> Direction {
        let step = if clockwise { 1 } else { 3 };
        Self::ALL[(self.index() + step) % 4]
    }

    /// Rotate a local offset by this direction's quarter turns
    /// (counter-clockwise about +Z: Right is 90°, Down 180°, Left 270°).
    pub fn rotate_vec(self, v: Vec3) -> Vec3 {
        match self {
            Direction::Up => v,
            Direction::Right => Vec3::new(-v.y, v.x, v.z),
            Direction::Down => Vec3::new(-v.x, -v.y, v.z),
            Direction::Left => Vec3::new(v.y, -v.x, v.z),
        }
    }

    /// Half extents of an axis-aligned box after rotation (X/Y swap on quarter turns).
    pub fn rotate_extents(self, half: Vec3) -> Vec3 {
        match self {
            Direction::Up | Direction::Down => half,
            Direction::Right | Direction::Left => Vec3::new(half.y, half.x, half.z),
        }
    }

    /// Short label for the HUD.
    pub fn label(self) -> &'static str {
        match self {
            Direction::Up => "Up",
            Direction::Right => "Right",
            Direction::Down => "Down",
            Direction::Left => "Left",
        }
    }
}
