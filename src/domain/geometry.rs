/// Volume primitives for the placement core.
///
/// Two intersection flavours, on purpose:
///   - `touches`  — inclusive (shared faces count). Used for connector
///                  matching and sphere neighbour queries.
///   - `overlaps` — strict, with `OVERLAP_EPSILON` slack. Used for
///                  body-vs-body rejection so flush neighbours are legal.

use glam::Vec3;

/// Bodies must interpenetrate by more than this to count as overlapping.
pub const OVERLAP_EPSILON: f32 = 1e-4;

/// Axis-aligned box.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn from_center(center: Vec3, half_extents: Vec3) -> Self {
        Aabb { min: center - half_extents, max: center + half_extents }
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn half_extents(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }

    /// Inclusive test: boxes sharing a face or corner touch.
    pub fn touches(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x && self.max.x >= other.min.x
            && self.min.y <= other.max.y && self.max.y >= other.min.y
            && self.min.z <= other.max.z && self.max.z >= other.min.z
    }

    /// Strict test: true only when the boxes share volume.
    pub fn overlaps(&self, other: &Aabb) -> bool {
        let e = OVERLAP_EPSILON;
        self.min.x < other.max.x - e && self.max.x > other.min.x + e
            && self.min.y < other.max.y - e && self.max.y > other.min.y + e
            && self.min.z < other.max.z - e && self.max.z > other.min.z + e
    }

    /// Does this box reach into a sphere? (closest-point test, inclusive)
    pub fn touches_sphere(&self, center: Vec3, radius: f32) -> bool {
        let closest = center.clamp(self.min, self.max);
        closest.distance_squared(center) <= radius * radius
    }

    /// 2D containment, used for screen hit tests.
    pub fn contains_xy(&self, x: f32, y: f32) -> bool {
        x >= self.min.x && x <= self.max.x && y >= self.min.y && y <= self.max.y
    }
}

/// Snap one coordinate to the half-unit grid used for free placement.
///
/// Pushes the value half a unit away from zero, then truncates to a
/// multiple of 0.5: `1.3 → 1.5`, `-0.76 → -1.0`, `1.0 → 1.5`.
/// Zero counts as negative and lands on `-0.5`.
pub fn quantize_half(v: f32) -> f32 {
    let pushed = v + if v > 0.0 { 0.5 } else { -0.5 };
    (pushed * 2.0).trunc() / 2.0
}

/// Quantize X and Y; depth is left alone.
pub fn quantize_xy(p: Vec3) -> Vec3 {
    Vec3::new(quantize_half(p.x), quantize_half(p.y), p.z)
}
