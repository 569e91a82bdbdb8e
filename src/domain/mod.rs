/// Pure placement core: block data, connector geometry and the
/// connect / free-place algorithms. No terminal, audio or timing here.

pub mod block;
pub mod color;
pub mod connector;
pub mod direction;
pub mod geometry;
pub mod placement;
