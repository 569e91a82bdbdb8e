/// Block catalog: the spawnable templates, grouped by menu category.
///
/// All built-in shapes live on a 1-unit lattice. Connectors sit on the
/// body faces: positives on +X / +Y faces, negatives on -X / -Y faces,
/// so any two shapes can chain along both axes.

use glam::Vec3;

use crate::domain::block::Block;
use crate::domain::connector::Connector;
use crate::domain::geometry::Aabb;

/// Body depth (Z half extent) shared by all shapes.
const DEPTH_HALF: f32 = 0.5;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct TemplateId(pub usize);

#[derive(Clone, Debug)]
pub struct BlockTemplate {
    pub name: String,
    pub category: String,
    /// Body half extents in X / Y, centred on the block origin.
    pub half_size: (f32, f32),
    pub overlap_radius: f32,
    /// Storage order matters: it is the snap tie-break order.
    pub connectors: Vec<Connector>,
}

impl BlockTemplate {
    pub fn new(name: &str, category: &str, half_size: (f32, f32), connectors: Vec<Connector>) -> Self {
        // Reach a neighbour one connector-width beyond our own faces.
        let (hx, hy) = half_size;
        let overlap_radius = (hx * hx + hy * hy).sqrt() + 0.5;
        BlockTemplate {
            name: name.to_string(),
            category: category.to_string(),
            half_size,
            overlap_radius,
            connectors,
        }
    }

    pub fn body(&self) -> Aabb {
        Aabb::from_center(Vec3::ZERO, Vec3::new(self.half_size.0, self.half_size.1, DEPTH_HALF))
    }

    /// Build a fresh block at `at`. It starts placing, facing up.
    pub fn instantiate(&self, at: Vec3) -> Block {
        Block::new(&self.name, self.body(), self.overlap_radius, self.connectors.clone())
            .with_position(at)
    }
}

#[derive(Clone, Debug)]
pub struct Catalog {
    templates: Vec<BlockTemplate>,
}

impl Catalog {
    pub fn new(templates: Vec<BlockTemplate>) -> Self {
        Catalog { templates }
    }

    pub fn get(&self, id: TemplateId) -> Option<&BlockTemplate> {
        self.templates.get(id.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (TemplateId, &BlockTemplate)> {
        self.templates.iter().enumerate().map(|(i, t)| (TemplateId(i), t))
    }

    #[cfg(test)]
    pub fn find(&self, name: &str) -> Option<TemplateId> {
        self.templates.iter().position(|t| t.name == name).map(TemplateId)
    }

    /// Categories in first-seen order.
    pub fn categories(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for t in &self.templates {
            if !out.contains(&t.category.as_str()) {
                out.push(&t.category);
            }
        }
        out
    }

    pub fn instantiate(&self, id: TemplateId, at: Vec3) -> Option<Block> {
        self.get(id).map(|t| t.instantiate(at))
    }
}

impl Default for Catalog {
    fn default() -> Self {
        builtin()
    }
}

fn builtin() -> Catalog {
    use Connector as C;
    Catalog::new(vec![
        // ── Basic ──
        BlockTemplate::new("Square", "Basic", (0.5, 0.5), vec![
            C::positive(0.5, 0.0),
            C::positive(0.0, 0.5),
            C::negative(-0.5, 0.0),
            C::negative(0.0, -0.5),
        ]),
        BlockTemplate::new("Long_Bar", "Basic", (1.0, 0.5), vec![
            C::positive(1.0, 0.0),
            C::positive(-0.5, 0.5),
            C::positive(0.5, 0.5),
            C::negative(-1.0, 0.0),
            C::negative(-0.5, -0.5),
            C::negative(0.5, -0.5),
        ]),
        BlockTemplate::new("Tall_Bar", "Basic", (0.5, 1.0), vec![
            C::positive(0.0, 1.0),
            C::positive(0.5, -0.5),
            C::positive(0.5, 0.5),
            C::negative(0.0, -1.0),
            C::negative(-0.5, -0.5),
            C::negative(-0.5, 0.5),
        ]),
        // ── Joints ──
        BlockTemplate::new("Corner", "Joints", (0.5, 0.5), vec![
            C::positive(0.5, 0.0),
            C::negative(0.0, -0.5),
        ]),
        BlockTemplate::new("Tee", "Joints", (0.5, 0.5), vec![
            C::positive(0.5, 0.0),
            C::positive(0.0, 0.5),
            C::negative(-0.5, 0.0),
        ]),
        BlockTemplate::new("Cross", "Joints", (0.5, 0.5), vec![
            C::positive(0.5, 0.0),
            C::positive(-0.5, 0.0),
            C::negative(0.0, 0.5),
            C::negative(0.0, -0.5),
        ]),
        // ── Ends ──
        BlockTemplate::new("Plug", "Ends", (0.5, 0.5), vec![
            C::positive(0.5, 0.0),
            C::negative(-0.5, 0.0),
        ]),
        BlockTemplate::new("Socket", "Ends", (0.5, 0.5), vec![
            C::negative(-0.5, 0.0),
            C::positive(0.0, 0.5),
        ]),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::placement::PlacementOutcome;

    #[test]
    fn every_builtin_has_both_polarities() {
        let cat = Catalog::default();
        for (_, t) in cat.iter() {
            let b = t.instantiate(Vec3::ZERO);
            assert!(!b.positives().is_empty(), "{}", t.name);
            assert!(!b.negatives().is_empty(), "{}", t.name);
        }
    }

    #[test]
    fn categories_keep_first_seen_order() {
        let cat = Catalog::default();
        assert_eq!(cat.categories(), vec!["Basic", "Joints", "Ends"]);
    }

    #[test]
    fn instantiate_places_a_fresh_ghost() {
        let cat = Catalog::default();
        let id = cat.find("Square").expect("builtin square");
        let b = cat.instantiate(id, Vec3::new(2.0, 3.0, 0.0)).expect("valid id");
        assert_eq!(b.position, Vec3::new(2.0, 3.0, 0.0));
        assert!(b.placing);
        assert_eq!(b.kind, "Square");
        assert!(cat.instantiate(TemplateId(99), Vec3::ZERO).is_none());
    }

    #[test]
    fn squares_chain_side_by_side() {
        let cat = Catalog::default();
        let id = cat.find("Square").expect("builtin square");
        let mut a = cat.instantiate(id, Vec3::ZERO).expect("valid id");
        a.placing = false;
        let world = vec![a];

        let mut g = cat.instantiate(id, Vec3::new(1.3, 0.1, 0.0)).expect("valid id");
        assert_eq!(g.commit(world.as_slice()), PlacementOutcome::Connected);
        assert!((g.position - Vec3::new(1.0, 0.0, 0.0)).length() < 1e-5);
    }
}
