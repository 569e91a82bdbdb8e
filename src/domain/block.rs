/// Block: the placement unit.
///
/// Owns its body volume, overlap sphere and both connector collections.
/// Everything geometric is derived on demand from `position` + `direction`;
/// nothing is cached, so moving or rotating a block can never leave a stale
/// connector volume behind.
///
/// The connect / free-place operations live in `placement.rs`.

use glam::Vec3;

use super::color::Rgb;
use super::connector::{Connector, Polarity};
use super::direction::Direction;
use super::geometry::Aabb;

#[derive(Clone, Debug)]
pub struct Block {
    /// Template name this block was built from.
    pub kind: String,
    pub position: Vec3,
    pub direction: Direction,
    /// True while held as the ghost.
    pub placing: bool,
    pub color: Rgb,
    /// Body volume in block-local space, unrotated.
    body: Aabb,
    overlap_radius: f32,
    positives: Vec<Connector>,
    negatives: Vec<Connector>,
    icons_visible: bool,
}

impl Block {
    /// Build a block from typed parts. Connectors are sorted into the two
    /// collections by polarity, keeping their relative order.
    pub fn new(kind: &str, body: Aabb, overlap_radius: f32, connectors: Vec<Connector>) -> Self {
        let (positives, negatives): (Vec<_>, Vec<_>) = connectors
            .into_iter()
            .partition(|c| c.polarity == Polarity::Positive);
        Block {
            kind: kind.to_string(),
            position: Vec3::ZERO,
            direction: Direction::Up,
            placing: true,
            color: Rgb::default(),
            body,
            overlap_radius,
            positives,
            negatives,
            icons_visible: false,
        }
    }

    pub fn with_position(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    pub fn overlap_radius(&self) -> f32 {
        self.overlap_radius
    }

    pub fn positives(&self) -> &[Connector] {
        &self.positives
    }

    pub fn negatives(&self) -> &[Connector] {
        &self.negatives
    }

    /// All connectors, positives first.
    pub fn connectors(&self) -> impl Iterator<Item = &Connector> {
        self.positives.iter().chain(self.negatives.iter())
    }

    pub fn icons_visible(&self) -> bool {
        self.icons_visible
    }

    /// Body volume in world space.
    pub fn body_bounds(&self) -> Aabb {
        Aabb::from_center(
            self.position + self.direction.rotate_vec(self.body.center()),
            self.direction.rotate_extents(self.body.half_extents()),
        )
    }

    // ── Orientation / presentation ──

    /// Step the facing direction one quarter turn.
    pub fn rotate(&mut self, clockwise: bool) {
        self.direction = self.direction.rotated(clockwise);
    }

    /// Hard-set the facing direction (new ghosts inherit the last one used).
    pub fn set_rotation(&mut self, direction: Direction) {
        self.direction = direction;
    }

    pub fn set_color(&mut self, color: Rgb) {
        self.color = color;
    }

    pub fn show_connector_icons(&mut self, visible: bool) {
        self.icons_visible = visible;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar() -> Block {
        Block::new(
            "bar",
            Aabb::from_center(Vec3::ZERO, Vec3::new(1.0, 0.5, 0.5)),
            1.5,
            vec![
                Connector::negative(-1.0, 0.0),
                Connector::positive(1.0, 0.0),
                Connector::positive(0.0, 0.5),
            ],
        )
    }

    #[test]
    fn connectors_split_by_polarity_in_order() {
        let b = bar();
        assert_eq!(b.positives().len(), 2);
        assert_eq!(b.negatives().len(), 1);
        assert_eq!(b.positives()[0].offset, Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(b.positives()[1].offset, Vec3::new(0.0, 0.5, 0.0));
    }

    #[test]
    fn new_block_starts_placing_facing_up() {
        let b = bar();
        assert!(b.placing);
        assert_eq!(b.direction, Direction::Up);
    }

    #[test]
    fn body_rotates_with_direction() {
        let mut b = bar().with_position(Vec3::new(3.0, 0.0, 0.0));
        b.rotate(true);
        let bounds = b.body_bounds();
        assert_eq!(bounds.min, Vec3::new(2.5, -1.0, -0.5));
        assert_eq!(bounds.max, Vec3::new(3.5, 1.0, 0.5));
    }

    #[test]
    fn set_rotation_does_not_cycle() {
        let mut b = bar();
        b.set_rotation(Direction::Down);
        b.set_rotation(Direction::Down);
        assert_eq!(b.direction, Direction::Down);
    }

    #[test]
    fn icons_toggle_in_bulk() {
        let mut b = bar();
        b.show_connector_icons(true);
        assert!(b.icons_visible());
        b.show_connector_icons(false);
        assert!(!b.icons_visible());
    }
}
