/// Block builder: the ghost lifecycle.
///
/// ```text
///   Idle ──create_ghost / repeat_last / pick_up──▶ Holding
///   Holding ──commit (Connected | PlacedFree)────▶ Idle
///   Holding ──commit (Rejected)──────────────────▶ Holding
///   Holding ──cancel─────────────────────────────▶ Idle
/// ```
///
/// At most one ghost exists. The builder only keeps its `BlockId`; the
/// block itself lives in the registry like every other block.
///
/// Direction and color are remembered across spawns: a new ghost comes
/// out facing the way the last one was turned, in the current palette
/// color.

use glam::Vec3;

use crate::domain::color::{Palette, Rgb};
use crate::domain::direction::Direction;
use crate::domain::placement::PlacementOutcome;
use super::catalog::{Catalog, TemplateId};
use super::registry::{BlockId, Registry};

/// Pick-up search radius around the pointer.
pub const PICK_RADIUS: f32 = 0.1;

#[derive(Debug)]
pub struct BlockBuilder {
    ghost: Option<BlockId>,
    color_index: usize,
    direction: Direction,
    last_template: Option<TemplateId>,
    show_icons: bool,
    catalog: Catalog,
    palette: Palette,
}

impl BlockBuilder {
    pub fn new(catalog: Catalog, palette: Palette, show_icons: bool) -> Self {
        BlockBuilder {
            ghost: None,
            color_index: 0,
            direction: Direction::Up,
            last_template: None,
            show_icons,
            catalog,
            palette,
        }
    }

    // ── Queries ──

    pub fn has_ghost(&self) -> bool {
        self.ghost.is_some()
    }

    pub fn ghost(&self) -> Option<BlockId> {
        self.ghost
    }

    pub fn color(&self) -> Rgb {
        self.palette.get(self.color_index)
    }

    pub fn color_index(&self) -> usize {
        self.color_index
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn last_template(&self) -> Option<TemplateId> {
        self.last_template
    }

    pub fn show_icons(&self) -> bool {
        self.show_icons
    }

    // ── Spawning ──

    /// Spawn a ghost of `template` at `at`. Refused while one is held.
    pub fn create_ghost(&mut self, world: &mut Registry, template: TemplateId, at: Vec3) -> Option<BlockId> {
        if self.ghost.is_some() {
            return None;
        }
        let mut block = self.catalog.instantiate(template, at)?;
        block.set_color(self.color());
        block.set_rotation(self.direction);
        block.show_connector_icons(self.show_icons);
        log::info!("spawn {} at ({:.2}, {:.2})", block.kind, at.x, at.y);

        let id = world.insert(block);
        self.ghost = Some(id);
        self.last_template = Some(template);
        Some(id)
    }

    /// Spawn whatever was chosen last. `None` until something was chosen.
    pub fn repeat_last(&mut self, world: &mut Registry, at: Vec3) -> Option<BlockId> {
        let template = self.last_template?;
        self.create_ghost(world, template, at)
    }

    /// Lift a placed block under the pointer back into the ghost role.
    pub fn pick_up(&mut self, world: &mut Registry, pointer: Vec3) -> Option<BlockId> {
        if self.ghost.is_some() {
            return None;
        }
        let id = world.first_in_sphere(pointer, PICK_RADIUS)?;
        let block = world.get_mut(id)?;
        block.placing = true;
        log::info!("pick up {} at ({:.2}, {:.2})", block.kind, block.position.x, block.position.y);
        self.ghost = Some(id);
        Some(id)
    }

    // ── Holding ──

    pub fn track_pointer(&mut self, world: &mut Registry, pointer: Vec3) {
        if let Some(block) = self.ghost.and_then(|id| world.get_mut(id)) {
            block.position = Vec3::new(pointer.x, pointer.y, 0.0);
        }
    }

    /// Turn the ghost a quarter. Returns the new direction.
    pub fn rotate(&mut self, world: &mut Registry, clockwise: bool) -> Option<Direction> {
        let block = self.ghost.and_then(|id| world.get_mut(id))?;
        block.rotate(clockwise);
        self.direction = block.direction;
        Some(self.direction)
    }

    /// Step the palette; the ghost (if any) takes the new color.
    pub fn cycle_color(&mut self, world: &mut Registry, forward: bool) -> Rgb {
        self.color_index = if forward {
            self.palette.next(self.color_index)
        } else {
            self.palette.prev(self.color_index)
        };
        let color = self.color();
        if let Some(block) = self.ghost.and_then(|id| world.get_mut(id)) {
            block.set_color(color);
        }
        color
    }

    /// Try to set the ghost down. `None` when nothing is held.
    pub fn commit(&mut self, world: &mut Registry) -> Option<PlacementOutcome> {
        let id = self.ghost?;
        // Out of its slot, the ghost cannot find itself as a neighbour.
        let Some(mut block) = world.detach(id) else {
            log::warn!("ghost {id:?} is no longer registered");
            self.ghost = None;
            return None;
        };
        let outcome = block.commit(&*world);
        let (kind, pos) = (block.kind.clone(), block.position);
        if !world.reattach(id, block) {
            log::warn!("ghost {id:?} went stale during commit");
            self.ghost = None;
            return None;
        }

        match outcome {
            PlacementOutcome::Connected => {
                log::info!("snap {kind} at ({:.2}, {:.2})", pos.x, pos.y);
            }
            PlacementOutcome::PlacedFree => {
                log::info!("place {kind} at ({:.2}, {:.2})", pos.x, pos.y);
            }
            PlacementOutcome::Rejected => {
                log::debug!("reject {kind} at ({:.2}, {:.2})", pos.x, pos.y);
            }
        }
        if outcome.is_placed() {
            self.ghost = None;
        }
        Some(outcome)
    }

    /// Throw the ghost away. Only a block that is still placing can go.
    pub fn cancel(&mut self, world: &mut Registry) -> bool {
        let Some(id) = self.ghost else { return false };
        if !world.get(id).is_some_and(|b| b.placing) {
            return false;
        }
        self.ghost = None;
        match world.remove(id) {
            Some(block) => {
                log::debug!("cancel {}", block.kind);
                true
            }
            None => false,
        }
    }

    /// Flip connector icons on every block.
    pub fn toggle_icons(&mut self, world: &mut Registry) -> bool {
        self.show_icons = !self.show_icons;
        let visible = self.show_icons;
        world.for_each_mut(|b| b.show_connector_icons(visible));
        visible
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (BlockBuilder, Registry, TemplateId) {
        let cat = Catalog::default();
        let square = cat.find("Square").expect("square");
        (BlockBuilder::new(cat, Palette::default(), false), Registry::new(), square)
    }

    fn at(x: f32, y: f32) -> Vec3 {
        Vec3::new(x, y, 0.0)
    }

    #[test]
    fn only_one_ghost_at_a_time() {
        let (mut b, mut reg, sq) = setup();
        assert!(b.create_ghost(&mut reg, sq, at(0.0, 0.0)).is_some());
        assert!(b.create_ghost(&mut reg, sq, at(3.0, 0.0)).is_none());
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn free_commit_releases_ghost() {
        let (mut b, mut reg, sq) = setup();
        let id = b.create_ghost(&mut reg, sq, at(5.2, 0.0)).expect("spawned");
        assert_eq!(b.commit(&mut reg), Some(PlacementOutcome::PlacedFree));
        assert!(!b.has_ghost());
        let block = reg.get(id).expect("still registered");
        assert!(!block.placing);
        assert_eq!(block.position, at(5.5, -0.5));
    }

    /// Free-place a first square; (0.2, -0.2) lands on (0.5, -0.5).
    fn place_first(b: &mut BlockBuilder, reg: &mut Registry, sq: TemplateId) -> BlockId {
        let id = b.create_ghost(reg, sq, at(0.2, -0.2)).expect("spawned");
        assert_eq!(b.commit(reg), Some(PlacementOutcome::PlacedFree));
        assert_eq!(reg.get(id).map(|g| g.position), Some(at(0.5, -0.5)));
        id
    }

    #[test]
    fn free_place_at_origin_goes_negative() {
        let (mut b, mut reg, sq) = setup();
        let id = b.create_ghost(&mut reg, sq, at(0.0, 0.0)).expect("spawned");
        assert_eq!(b.commit(&mut reg), Some(PlacementOutcome::PlacedFree));
        assert_eq!(reg.get(id).map(|g| g.position), Some(at(-0.5, -0.5)));
    }

    #[test]
    fn ghost_snaps_to_neighbour() {
        let (mut b, mut reg, sq) = setup();
        place_first(&mut b, &mut reg, sq);

        // Our -X connector meets the first square's +X face.
        let id = b.create_ghost(&mut reg, sq, at(1.8, -0.4)).expect("spawned");
        assert_eq!(b.commit(&mut reg), Some(PlacementOutcome::Connected));
        let pos = reg.get(id).expect("registered").position;
        assert!((pos - at(1.5, -0.5)).length() < 1e-5);
    }

    #[test]
    fn failed_commit_keeps_ghost() {
        let (mut b, mut reg, sq) = setup();
        place_first(&mut b, &mut reg, sq);

        // On top of the first square: the only mating pair (our -X onto its
        // +Y) would sink the bodies into each other, and free placement is
        // blocked by the neighbour.
        let id = b.create_ghost(&mut reg, sq, at(0.6, -0.4)).expect("spawned");
        assert_eq!(b.commit(&mut reg), Some(PlacementOutcome::Rejected));
        assert_eq!(b.ghost(), Some(id));
        let g = reg.get(id).expect("registered");
        assert!(g.placing);
        // The snap translation stays applied.
        assert!((g.position - at(1.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn commit_with_stale_ghost_lets_go() {
        let (mut b, mut reg, sq) = setup();
        let id = b.create_ghost(&mut reg, sq, at(0.0, 0.0)).expect("spawned");
        reg.remove(id);
        assert_eq!(b.commit(&mut reg), None);
        assert!(!b.has_ghost());
        assert!(b.create_ghost(&mut reg, sq, at(3.0, 0.0)).is_some());
    }

    #[test]
    fn new_ghost_inherits_direction_and_color() {
        let (mut b, mut reg, sq) = setup();
        b.create_ghost(&mut reg, sq, at(0.0, 0.0));
        assert_eq!(b.rotate(&mut reg, true), Some(Direction::Right));
        let color = b.cycle_color(&mut reg, true);
        assert!(b.cancel(&mut reg));

        let id = b.create_ghost(&mut reg, sq, at(4.0, 0.0)).expect("spawned");
        let g = reg.get(id).expect("registered");
        assert_eq!(g.direction, Direction::Right);
        assert_eq!(g.color, color);
    }

    #[test]
    fn repeat_last_needs_history() {
        let (mut b, mut reg, sq) = setup();
        assert!(b.repeat_last(&mut reg, at(0.0, 0.0)).is_none());
        b.create_ghost(&mut reg, sq, at(0.0, 0.0));
        b.commit(&mut reg);
        let id = b.repeat_last(&mut reg, at(6.0, 0.0)).expect("repeated");
        assert_eq!(reg.get(id).map(|g| g.kind.as_str()), Some("Square"));
    }

    #[test]
    fn cancel_removes_from_registry() {
        let (mut b, mut reg, sq) = setup();
        let id = b.create_ghost(&mut reg, sq, at(0.0, 0.0)).expect("spawned");
        assert!(b.cancel(&mut reg));
        assert!(!b.has_ghost());
        assert!(reg.get(id).is_none());
        assert!(reg.is_empty());
        assert!(!b.cancel(&mut reg));
    }

    #[test]
    fn pick_up_flags_block_as_placing() {
        let (mut b, mut reg, sq) = setup();
        let id = b.create_ghost(&mut reg, sq, at(2.0, 2.0)).expect("spawned");
        b.commit(&mut reg);
        assert!(b.pick_up(&mut reg, at(9.0, 9.0)).is_none());
        assert_eq!(b.pick_up(&mut reg, at(2.6, 2.1)), Some(id));
        assert!(reg.get(id).is_some_and(|g| g.placing));
        assert!(b.has_ghost());
    }

    #[test]
    fn toggle_icons_applies_to_every_block() {
        let (mut b, mut reg, sq) = setup();
        b.create_ghost(&mut reg, sq, at(0.0, 0.0));
        b.commit(&mut reg);
        b.create_ghost(&mut reg, sq, at(5.0, 0.0));
        assert!(b.toggle_icons(&mut reg));
        assert!(reg.iter().all(|(_, blk)| blk.icons_visible()));
        assert!(!b.toggle_icons(&mut reg));
        assert!(reg.iter().all(|(_, blk)| !blk.icons_visible()));
    }

    #[test]
    fn ghost_follows_pointer_on_plane() {
        let (mut b, mut reg, sq) = setup();
        let id = b.create_ghost(&mut reg, sq, at(0.0, 0.0)).expect("spawned");
        b.track_pointer(&mut reg, Vec3::new(3.0, -1.0, 4.0));
        assert_eq!(reg.get(id).map(|g| g.position), Some(at(3.0, -1.0)));
    }
}
