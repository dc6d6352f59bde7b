//! Face directions and texture layers.

use glam::IVec3;
use serde::{Deserialize, Serialize};

/// One of the six axis-aligned faces of a voxel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Face {
    /// +X (right)
    PosX,
    /// -X (left)
    NegX,
    /// +Y (top)
    PosY,
    /// -Y (bottom)
    NegY,
    /// +Z (front)
    PosZ,
    /// -Z (back)
    NegZ,
}

impl Face {
    /// All faces in meshing order.
    pub const ALL: [Face; 6] = [
        Face::PosX,
        Face::NegX,
        Face::PosY,
        Face::NegY,
        Face::PosZ,
        Face::NegZ,
    ];

    /// Outward unit normal.
    #[inline]
    pub const fn normal(self) -> IVec3 {
        match self {
            Face::PosX => IVec3::X,
            Face::NegX => IVec3::NEG_X,
            Face::PosY => IVec3::Y,
            Face::NegY => IVec3::NEG_Y,
            Face::PosZ => IVec3::Z,
            Face::NegZ => IVec3::NEG_Z,
        }
    }

    /// Face whose normal equals `normal`, if it is an axis unit vector.
    pub fn from_normal(normal: IVec3) -> Option<Self> {
        Self::ALL.into_iter().find(|face| face.normal() == normal)
    }
}

/// Index into the block texture array.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(transparent)]
pub struct TextureLayer(pub u32);

impl TextureLayer {
    /// Grass side, used on exposed sides of surface voxels
    pub const GRASS_SIDE: Self = Self(0);
    /// Grass top
    pub const GRASS_TOP: Self = Self(1);
    /// Dirt, used for bottoms and buried sides
    pub const DIRT: Self = Self(2);

    /// Layer as the float stored in vertex data.
    #[inline]
    pub fn as_f32(self) -> f32 {
        self.0 as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normals_are_distinct_unit_axes() {
        let sum: IVec3 = Face::ALL.iter().map(|f| f.normal()).sum();
        assert_eq!(sum, IVec3::ZERO);
        for face in Face::ALL {
            assert_eq!(face.normal().abs().element_sum(), 1);
        }
    }

    #[test]
    fn from_normal_roundtrip() {
        for face in Face::ALL {
            assert_eq!(Face::from_normal(face.normal()), Some(face));
        }
        assert_eq!(Face::from_normal(IVec3::ONE), None);
    }
}
