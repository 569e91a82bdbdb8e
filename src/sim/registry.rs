/// World registry: every block in the scene, in a generational arena.
///
/// ## Handles
///
/// `BlockId { index, generation }`. Removing a block frees its slot and
/// bumps the slot generation, so old ids resolve to `None` instead of
/// aliasing whatever lands in the slot next.
///
/// ## Order
///
/// Iteration and spatial queries follow insertion order (`order`), not
/// slot order, so a reused slot does not jump the queue in tie-breaks.
///
/// ## Detaching
///
/// `detach` / `reattach` lift a block out of its slot while it is being
/// tested against the rest of the world. The id stays reserved, and the
/// block is naturally absent from its own neighbour queries.

use glam::Vec3;

use crate::domain::block::Block;
use crate::domain::placement::BodyQuery;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct BlockId {
    index: u32,
    generation: u32,
}

#[derive(Debug)]
struct Slot {
    generation: u32,
    block: Option<Block>,
    /// Slot holds a live id (the block may be temporarily detached).
    occupied: bool,
}

#[derive(Debug, Default)]
pub struct Registry {
    slots: Vec<Slot>,
    free: Vec<u32>,
    order: Vec<BlockId>,
}

impl Registry {
    pub fn new() -> Self {
        Registry::default()
    }

    /// Number of live blocks (detached ones included).
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    #[cfg(test)]
    pub fn contains(&self, id: BlockId) -> bool {
        self.live_slot(id).is_some()
    }

    /// Add a block at the end of the registry order.
    pub fn insert(&mut self, block: Block) -> BlockId {
        let id = match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.block = Some(block);
                slot.occupied = true;
                BlockId { index, generation: slot.generation }
            }
            None => {
                let index = self.slots.len() as u32;
                self.slots.push(Slot { generation: 0, block: Some(block), occupied: true });
                BlockId { index, generation: 0 }
            }
        };
        self.order.push(id);
        id
    }

    /// Remove and return a block. Stale or unknown ids return `None`.
    pub fn remove(&mut self, id: BlockId) -> Option<Block> {
        let slot = self.live_slot_mut(id)?;
        let block = slot.block.take();
        slot.occupied = false;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        self.order.retain(|o| *o != id);
        block
    }

    pub fn get(&self, id: BlockId) -> Option<&Block> {
        self.live_slot(id)?.block.as_ref()
    }

    pub fn get_mut(&mut self, id: BlockId) -> Option<&mut Block> {
        self.live_slot_mut(id)?.block.as_mut()
    }

    /// Live blocks in registry order (detached blocks are skipped).
    pub fn iter(&self) -> impl Iterator<Item = (BlockId, &Block)> + '_ {
        self.order.iter().filter_map(move |&id| self.get(id).map(|b| (id, b)))
    }

    pub fn for_each_mut(&mut self, mut f: impl FnMut(&mut Block)) {
        for slot in &mut self.slots {
            if let Some(b) = slot.block.as_mut() {
                f(b);
            }
        }
    }

    /// First block (registry order) whose body touches the sphere.
    pub fn first_in_sphere(&self, center: Vec3, radius: f32) -> Option<BlockId> {
        self.iter()
            .find(|(_, b)| b.body_bounds().touches_sphere(center, radius))
            .map(|(id, _)| id)
    }

    /// Take a block out of its slot, keeping the id reserved.
    pub fn detach(&mut self, id: BlockId) -> Option<Block> {
        self.live_slot_mut(id)?.block.take()
    }

    /// Put a detached block back. Returns false if the id went stale.
    pub fn reattach(&mut self, id: BlockId, block: Block) -> bool {
        match self.live_slot_mut(id) {
            Some(slot) if slot.block.is_none() => {
                slot.block = Some(block);
                true
            }
            _ => false,
        }
    }

    // ── Internal ──

    fn live_slot(&self, id: BlockId) -> Option<&Slot> {
        self.slots.get(id.index as usize)
            .filter(|s| s.occupied && s.generation == id.generation)
    }

    fn live_slot_mut(&mut self, id: BlockId) -> Option<&mut Slot> {
        self.slots.get_mut(id.index as usize)
            .filter(|s| s.occupied && s.generation == id.generation)
    }
}

impl BodyQuery for Registry {
    fn bodies_in_sphere(&self, center: Vec3, radius: f32) -> Vec<&Block> {
        self.iter()
            .map(|(_, b)| b)
            .filter(|b| b.body_bounds().touches_sphere(center, radius))
            .collect()
    }
}
