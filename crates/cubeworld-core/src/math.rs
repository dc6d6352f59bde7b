//! Math utilities and helpers.

use glam::{IVec3, Vec3};

/// Ray for raycasting operations.
#[derive(Clone, Copy, Debug)]
pub struct Ray {
    /// Ray origin
    pub origin: Vec3,
    /// Ray direction (normalized)
    pub direction: Vec3,
}

impl Ray {
    /// Create a new ray, or `None` if `direction` is too short to normalize.
    #[inline]
    pub fn new(origin: Vec3, direction: Vec3) -> Option<Self> {
        direction
            .try_normalize()
            .map(|direction| Self { origin, direction })
    }
}

/// Axis-Aligned Bounding Box.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Aabb {
    /// Minimum corner
    pub min: Vec3,
    /// Maximum corner
    pub max: Vec3,
}

impl Aabb {
    /// Create an AABB from its minimum corner and full extents
    #[inline]
    pub fn from_min_size(min: Vec3, size: Vec3) -> Self {
        Self {
            min,
            max: min + size,
        }
    }

    /// Inclusive range of voxel cells touched by this box.
    ///
    /// The maximum corner is pulled in by `epsilon` first, so a box whose
    /// upper edge lies exactly on a cell boundary does not reach into the
    /// next cell.
    #[inline]
    pub fn cell_range(&self, epsilon: f32) -> (IVec3, IVec3) {
        let min = self.min.floor().as_ivec3();
        let max = (self.max - Vec3::splat(epsilon)).floor().as_ivec3();
        (min, max)
    }
}
