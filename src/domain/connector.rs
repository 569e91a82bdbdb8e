/// Connectors: small oriented attachment volumes owned by a block.
///
/// A positive connector only mates with a negative one and vice versa.
/// Offsets and extents are block-local; the owning block's position and
/// direction turn them into world-space volumes.

use glam::Vec3;

use super::direction::Direction;
use super::geometry::Aabb;

/// Default half-size of a connector cube.
pub const CONNECTOR_HALF: f32 = 0.25;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Polarity {
    Positive,
    Negative,
}

impl Polarity {
    /// Icon glyph drawn when connector icons are visible.
    pub fn glyph(self) -> char {
        match self {
            Polarity::Positive => '+',
            Polarity::Negative => '-',
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Connector {
    pub polarity: Polarity,
    pub offset: Vec3,
    pub half_extents: Vec3,
}

impl Connector {
    pub fn new(polarity: Polarity, offset: Vec3) -> Self {
        Connector { polarity, offset, half_extents: Vec3::splat(CONNECTOR_HALF) }
    }

    pub fn positive(x: f32, y: f32) -> Self {
        Connector::new(Polarity::Positive, Vec3::new(x, y, 0.0))
    }

    pub fn negative(x: f32, y: f32) -> Self {
        Connector::new(Polarity::Negative, Vec3::new(x, y, 0.0))
    }

    pub fn world_position(&self, origin: Vec3, direction: Direction) -> Vec3 {
        origin + direction.rotate_vec(self.offset)
    }

    pub fn world_bounds(&self, origin: Vec3, direction: Direction) -> Aabb {
        Aabb::from_center(
            self.world_position(origin, direction),
            direction.rotate_extents(self.half_extents),
        )
    }
}
