/// Placement core: snapping a ghost onto neighbours, or setting it down on
/// the half-unit grid.
///
/// ## Connect (snap)
///   1. Neighbours = bodies touching the ghost's overlap sphere. None → fail.
///   2. Gather neighbour positives / negatives (neighbour order, then
///      storage order).
///   3. First touching pair (own positive, their negative) wins.
///   4. Else first touching pair (own negative, their positive).
///   5. No pair → fail, position untouched.
///   6. Translate so the two connector centres coincide.
///   7. Own body overlaps any step-1 neighbour → fail. The translated
///      position is kept.
///   8. Success: `placing = false`.
///
/// ## Free placement
///   1. Any neighbour → fail.
///   2. Quantize X/Y to the half grid.
///   3. Any neighbour at the new spot → fail (quantized position kept).
///   4. Success: `placing = false`.
///
/// Ordering is storage order, never distance: the first pair found wins.

use glam::Vec3;

use super::block::Block;
use super::connector::Connector;
use super::geometry::{quantize_xy, Aabb};

/// Spatial query service the core consumes.
///
/// Implementors return blocks whose body touches the sphere, in a stable
/// order. The block under test must not be part of the answer.
pub trait BodyQuery {
    fn bodies_in_sphere(&self, center: Vec3, radius: f32) -> Vec<&Block>;
}

impl BodyQuery for [Block] {
    fn bodies_in_sphere(&self, center: Vec3, radius: f32) -> Vec<&Block> {
        self.iter()
            .filter(|b| b.body_bounds().touches_sphere(center, radius))
            .collect()
    }
}

/// Result of a commit attempt.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PlacementOutcome {
    /// Snapped onto a neighbour's connector.
    Connected,
    /// Set down on the half grid with no neighbours.
    PlacedFree,
    /// Neither worked; the block is still placing.
    Rejected,
}

impl PlacementOutcome {
    pub fn is_placed(self) -> bool {
        !matches!(self, PlacementOutcome::Rejected)
    }
}

/// A connector resolved into world space.
struct Resolved {
    position: Vec3,
    bounds: Aabb,
}

fn resolve<'a>(owner: &'a Block, list: &'a [Connector]) -> impl Iterator<Item = Resolved> + 'a {
    list.iter().map(move |c| Resolved {
        position: c.world_position(owner.position, owner.direction),
        bounds: c.world_bounds(owner.position, owner.direction),
    })
}

/// First (mine, theirs) pair whose volumes touch, scanning `mine` in order
/// and, for each, `theirs` in order. Returns the snap translation.
fn first_match(mine: &[Resolved], theirs: &[Resolved]) -> Option<Vec3> {
    for m in mine {
        for t in theirs {
            if m.bounds.touches(&t.bounds) {
                return Some(t.position - m.position);
            }
        }
    }
    None
}

impl Block {
    /// Try to snap onto a neighbouring block through a compatible connector
    /// pair. See the module docs for the exact procedure.
    pub fn connect_block<Q: BodyQuery + ?Sized>(&mut self, world: &Q) -> bool {
        let neighbors = world.bodies_in_sphere(self.position, self.overlap_radius());
        if neighbors.is_empty() {
            return false;
        }

        let their_pos: Vec<Resolved> = neighbors.iter()
            .flat_map(|b| resolve(b, b.positives()))
            .collect();
        let their_neg: Vec<Resolved> = neighbors.iter()
            .flat_map(|b| resolve(b, b.negatives()))
            .collect();
        let my_pos: Vec<Resolved> = resolve(self, self.positives()).collect();
        let my_neg: Vec<Resolved> = resolve(self, self.negatives()).collect();

        let delta = match first_match(&my_pos, &their_neg)
            .or_else(|| first_match(&my_neg, &their_pos))
        {
            Some(d) => d,
            None => return false,
        };

        self.position += delta;

        let body = self.body_bounds();
        if neighbors.iter().any(|b| body.overlaps(&b.body_bounds())) {
            return false;
        }

        self.placing = false;
        true
    }

    /// Try to set the block down on the half grid, away from everything.
    pub fn place_block_in_air<Q: BodyQuery + ?Sized>(&mut self, world: &Q) -> bool {
        if !world.bodies_in_sphere(self.position, self.overlap_radius()).is_empty() {
            return false;
        }

        self.position = quantize_xy(self.position);

        if !world.bodies_in_sphere(self.position, self.overlap_radius()).is_empty() {
            return false;
        }

        self.placing = false;
        true
    }

    /// Snap if possible, otherwise free-place, otherwise reject.
    pub fn commit<Q: BodyQuery + ?Sized>(&mut self, world: &Q) -> PlacementOutcome {
        if self.connect_block(world) {
            PlacementOutcome::Connected
        } else if self.place_block_in_air(world) {
            PlacementOutcome::PlacedFree
        } else {
            PlacementOutcome::Rejected
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::connector::Connector;
    use crate::domain::direction::Direction;

    fn v(x: f32, y: f32) -> Vec3 {
        Vec3::new(x, y, 0.0)
    }

    /// Unit cube body centred on the block origin.
    fn block(x: f32, y: f32, radius: f32, connectors: Vec<Connector>) -> Block {
        let mut b = Block::new(
            "test",
            Aabb::from_center(Vec3::ZERO, Vec3::splat(0.5)),
            radius,
            connectors,
        )
        .with_position(v(x, y));
        b.placing = false;
        b
    }

    fn ghost(x: f32, y: f32, radius: f32, connectors: Vec<Connector>) -> Block {
        let mut g = block(x, y, radius, connectors);
        g.placing = true;
        g
    }

    // ── connect_block ──

    #[test]
    fn snaps_positive_onto_negative() {
        let a = block(0.0, 0.0, 1.0, vec![Connector::negative(0.5, 0.0)]);
        let mut b = ghost(1.4, 0.0, 1.0, vec![Connector::positive(-0.5, 0.0)]);
        let world = vec![a.clone()];

        assert!(b.connect_block(world.as_slice()));
        assert!((b.position - v(1.0, 0.0)).length() < 1e-5);
        assert!(!b.placing);

        let mine = b.positives()[0].world_position(b.position, b.direction);
        let theirs = a.negatives()[0].world_position(a.position, a.direction);
        assert!((mine - theirs).length() < 1e-5);
    }

    #[test]
    fn no_neighbours_never_connects_and_never_moves() {
        let far = block(10.0, 10.0, 1.0, vec![Connector::negative(0.5, 0.0)]);
        let mut g = ghost(0.3, -0.2, 1.0, vec![Connector::positive(-0.5, 0.0)]);
        let before = g.position;

        assert!(!g.connect_block(vec![far].as_slice()));
        assert!(!g.connect_block(Vec::<Block>::new().as_slice()));
        assert_eq!(g.position, before);
        assert!(g.placing);
    }

    #[test]
    fn same_polarity_does_not_mate() {
        let a = block(0.0, 0.0, 1.0, vec![Connector::positive(0.5, 0.0)]);
        let mut g = ghost(1.4, 0.0, 1.0, vec![Connector::positive(-0.5, 0.0)]);
        let before = g.position;
        assert!(!g.connect_block(vec![a].as_slice()));
        assert_eq!(g.position, before);
    }

    #[test]
    fn negative_side_is_tried_when_positives_miss() {
        let a = block(0.0, 0.0, 1.0, vec![Connector::positive(0.5, 0.0)]);
        let mut g = ghost(1.4, 0.0, 1.0, vec![
            Connector::positive(0.0, 0.5),
            Connector::negative(-0.5, 0.0),
        ]);
        assert!(g.connect_block(vec![a].as_slice()));
        assert!((g.position - v(1.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn positive_search_wins_over_negative_search() {
        // Both polarities have a touching pair; positives are scanned first.
        let left = block(-1.05, 0.0, 1.0, vec![Connector::negative(0.5, 0.0)]);
        let up = block(0.0, 1.1, 1.0, vec![Connector::positive(0.0, -0.5)]);
        let mut g = ghost(0.0, 0.0, 1.0, vec![
            Connector::negative(0.0, 0.5),
            Connector::positive(-0.5, 0.0),
        ]);
        assert!(g.connect_block(vec![up, left].as_slice()));
        assert!((g.position - v(-0.05, 0.0)).length() < 1e-5);
    }

    #[test]
    fn lower_connector_index_wins() {
        // C1 (left) and C2 (top) each touch a different neighbour.
        // Neighbour order is reversed on purpose: the ghost's own storage
        // order decides.
        let left = block(-1.05, 0.0, 1.0, vec![Connector::negative(0.5, 0.0)]);
        let up = block(0.0, 1.1, 1.0, vec![Connector::negative(0.0, -0.5)]);
        let mut g = ghost(0.0, 0.0, 1.0, vec![
            Connector::positive(-0.5, 0.0), // C1
            Connector::positive(0.0, 0.5),  // C2
        ]);
        assert!(g.connect_block(vec![up.clone(), left.clone()].as_slice()));
        assert!((g.position - v(-0.05, 0.0)).length() < 1e-5);

        // Swapping storage order flips the winner.
        let mut g2 = ghost(0.0, 0.0, 1.0, vec![
            Connector::positive(0.0, 0.5),
            Connector::positive(-0.5, 0.0),
        ]);
        assert!(g2.connect_block(vec![left, up].as_slice()));
        assert!((g2.position - v(0.0, 0.1)).length() < 1e-5);
    }

    #[test]
    fn snap_into_third_body_is_rejected_without_rollback() {
        let a = block(0.0, 0.0, 1.0, vec![Connector::negative(0.5, 0.0)]);
        // Connector-less blocker sitting where the snap would land.
        let blocker = block(1.5, 0.0, 1.0, vec![]);
        let mut g = ghost(1.4, 0.0, 1.0, vec![Connector::positive(-0.5, 0.0)]);

        assert!(!g.connect_block(vec![a, blocker].as_slice()));
        assert!(g.placing);
        // Left at the rejected snap location.
        assert!((g.position - v(1.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn flush_neighbour_after_snap_is_fine() {
        // After the snap the bodies share the x = 0.5 face only.
        let a = block(0.0, 0.0, 1.0, vec![Connector::negative(0.5, 0.0)]);
        let mut g = ghost(1.1, 0.1, 1.0, vec![Connector::positive(-0.5, 0.0)]);
        assert!(g.connect_block(vec![a].as_slice()));
        assert!((g.position - v(1.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn rotated_ghost_uses_rotated_connectors() {
        // Turned Left, local (0, -0.5) becomes (-0.5, 0): facing the block on its left.
        let a = block(0.0, 0.0, 1.0, vec![Connector::negative(0.5, 0.0)]);
        let mut g = ghost(1.3, 0.1, 1.0, vec![Connector::positive(0.0, -0.5)]);
        g.set_rotation(Direction::Left);
        assert!(g.connect_block(vec![a].as_slice()));
        assert!((g.position - v(1.0, 0.0)).length() < 1e-5);
    }

    // ── place_block_in_air ──

    #[test]
    fn free_place_quantizes() {
        let mut g = ghost(1.3, -0.76, 1.0, vec![]);
        assert!(g.place_block_in_air(Vec::<Block>::new().as_slice()));
        assert_eq!(g.position, v(1.5, -1.0));
        assert!(!g.placing);
    }

    #[test]
    fn free_place_refuses_near_neighbour() {
        let a = block(0.0, 0.0, 1.0, vec![]);
        let mut g = ghost(1.3, 0.0, 1.0, vec![]);
        assert!(!g.place_block_in_air(vec![a].as_slice()));
        assert_eq!(g.position, v(1.3, 0.0));
        assert!(g.placing);
    }

    #[test]
    fn free_place_rejects_collision_after_quantize() {
        // Body spans x ∈ [1.9, 2.9]; sphere r = 0.5.
        // From 1.3 the gap is 0.6 (clear); from 1.5 it is 0.4 (hit).
        let neighbour = block(2.4, 0.0, 0.5, vec![]);
        let mut g = ghost(1.3, 0.0, 0.5, vec![]);
        assert!(!g.place_block_in_air(vec![neighbour].as_slice()));
        assert!(g.placing);
        assert_eq!(g.position.x, 1.5);
    }

    // ── commit ──

    #[test]
    fn commit_prefers_snap() {
        let a = block(0.0, 0.0, 1.0, vec![Connector::negative(0.5, 0.0)]);
        let mut g = ghost(1.4, 0.0, 1.0, vec![Connector::positive(-0.5, 0.0)]);
        assert_eq!(g.commit(vec![a].as_slice()), PlacementOutcome::Connected);
    }

    #[test]
    fn commit_falls_back_to_free_place() {
        let mut g = ghost(5.2, 5.2, 1.0, vec![Connector::positive(-0.5, 0.0)]);
        assert_eq!(g.commit(Vec::<Block>::new().as_slice()), PlacementOutcome::PlacedFree);
        assert_eq!(g.position, v(5.5, 5.5));
    }

    #[test]
    fn commit_rejects_when_crowded_and_unmatched() {
        let a = block(0.0, 0.0, 1.0, vec![Connector::positive(0.5, 0.0)]);
        let mut g = ghost(1.4, 0.0, 1.0, vec![Connector::positive(-0.5, 0.0)]);
        let outcome = g.commit(vec![a].as_slice());
        assert_eq!(outcome, PlacementOutcome::Rejected);
        assert!(!outcome.is_placed());
        assert!(g.placing);
    }
}
