//! Voxel ray traversal.

use cubeworld_core::coords::WorldPos;
use cubeworld_core::math::Ray;
use cubeworld_core::types::Face;
use glam::{IVec3, Vec3};

/// Result of a raycast against voxels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RaycastHit {
    /// The solid voxel that was hit.
    pub voxel: WorldPos,
    /// Normal of the face the ray entered through.
    ///
    /// Zero when the ray started inside the voxel.
    pub normal: IVec3,
    /// Distance along the ray to the entry point.
    pub distance: f32,
}

impl RaycastHit {
    /// Face the ray entered through, if any.
    pub fn face(&self) -> Option<Face> {
        Face::from_normal(self.normal)
    }

    /// The empty cell in front of the hit face, where a new voxel would go.
    pub fn adjacent(&self) -> Option<WorldPos> {
        (self.normal != IVec3::ZERO).then(|| self.voxel.offset(self.normal))
    }
}

/// Walk the cells pierced by `ray` in order and return the first solid one.
///
/// Amanatides–Woo traversal. When two axes reach a boundary at the same
/// distance the step is taken on x first, then y, then z, so no cell is
/// visited twice. Gives up once the next boundary lies beyond
/// `max_distance`.
pub fn cast_voxel_ray(
    ray: &Ray,
    max_distance: f32,
    mut is_solid: impl FnMut(WorldPos) -> bool,
) -> Option<RaycastHit> {
    let origin = ray.origin;
    let dir = ray.direction;

    let mut cell = origin.floor().as_ivec3();
    let step = IVec3::new(
        step_sign(dir.x),
        step_sign(dir.y),
        step_sign(dir.z),
    );
    let t_delta = Vec3::new(inv_abs(dir.x), inv_abs(dir.y), inv_abs(dir.z));
    let mut t_max = Vec3::new(
        first_boundary(origin.x, dir.x),
        first_boundary(origin.y, dir.y),
        first_boundary(origin.z, dir.z),
    );

    let mut normal = IVec3::ZERO;
    let mut distance = 0.0;

    loop {
        let voxel = WorldPos::from(cell);
        if is_solid(voxel) {
            return Some(RaycastHit {
                voxel,
                normal,
                distance,
            });
        }

        let axis = if t_max.x <= t_max.y && t_max.x <= t_max.z {
            0
        } else if t_max.y <= t_max.z {
            1
        } else {
            2
        };

        distance = t_max[axis];
        if distance > max_distance {
            return None;
        }

        cell[axis] += step[axis];
        t_max[axis] += t_delta[axis];
        normal = IVec3::ZERO;
        normal[axis] = -step[axis];
    }
}

#[inline]
fn step_sign(d: f32) -> i32 {
    if d > 0.0 {
        1
    } else if d < 0.0 {
        -1
    } else {
        0
    }
}

/// Ray distance per unit step along an axis.
#[inline]
fn inv_abs(d: f32) -> f32 {
    if d == 0.0 {
        f32::INFINITY
    } else {
        (1.0 / d).abs()
    }
}

/// Ray distance to the first cell boundary along an axis.
#[inline]
fn first_boundary(o: f32, d: f32) -> f32 {
    if d > 0.0 {
        (o.floor() + 1.0 - o) / d
    } else if d < 0.0 {
        (o - o.floor()) / -d
    } else {
        f32::INFINITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn ray(origin: Vec3, direction: Vec3) -> Ray {
        Ray::new(origin, direction).unwrap()
    }

    #[test]
    fn straight_down_hits_voxel_below() {
        let target = WorldPos::new(5, 10, 5);
        let hit = cast_voxel_ray(&ray(Vec3::new(5.5, 11.5, 5.5), Vec3::NEG_Y), 8.0, |p| {
            p == target
        })
        .unwrap();

        assert_eq!(hit.voxel, target);
        assert_eq!(hit.normal, IVec3::Y);
        assert_eq!(hit.face(), Some(Face::PosY));
        assert_eq!(hit.adjacent(), Some(WorldPos::new(5, 11, 5)));
        assert_relative_eq!(hit.distance, 0.5);
    }

    #[test]
    fn open_sky_returns_none() {
        let hit = cast_voxel_ray(&ray(Vec3::new(0.5, 30.0, 0.5), Vec3::new(0.3, 1.0, -0.2)), 8.0, |_| {
            false
        });
        assert!(hit.is_none());
    }

    #[test]
    fn target_beyond_max_distance_is_missed() {
        let target = WorldPos::new(10, 0, 0);
        let r = ray(Vec3::new(0.5, 0.5, 0.5), Vec3::X);
        assert!(cast_voxel_ray(&r, 5.0, |p| p == target).is_none());
        let hit = cast_voxel_ray(&r, 10.0, |p| p == target).unwrap();
        assert_relative_eq!(hit.distance, 9.5);
        assert_eq!(hit.normal, IVec3::NEG_X);
    }

    #[test]
    fn starting_inside_solid_hits_immediately() {
        let hit = cast_voxel_ray(&ray(Vec3::new(1.2, 1.2, 1.2), Vec3::X), 5.0, |_| true).unwrap();
        assert_eq!(hit.voxel, WorldPos::new(1, 1, 1));
        assert_eq!(hit.normal, IVec3::ZERO);
        assert_eq!(hit.adjacent(), None);
        assert_relative_eq!(hit.distance, 0.0);
    }

    #[test]
    fn negative_origin_uses_floor_cell() {
        let hit = cast_voxel_ray(&ray(Vec3::new(-0.5, -0.5, -0.5), Vec3::NEG_Z), 5.0, |p| {
            p.z == -3
        })
        .unwrap();
        assert_eq!(hit.voxel, WorldPos::new(-1, -1, -3));
        assert_eq!(hit.normal, IVec3::Z);
        assert_relative_eq!(hit.distance, 1.5);
    }

    #[test]
    fn diagonal_through_corner_steps_x_first() {
        let mut visited = Vec::new();
        let r = ray(Vec3::new(0.5, 0.5, 0.5), Vec3::new(1.0, 1.0, 0.0));
        cast_voxel_ray(&r, 4.0, |p| {
            visited.push(p);
            false
        });

        assert_eq!(visited[0], WorldPos::new(0, 0, 0));
        assert_eq!(visited[1], WorldPos::new(1, 0, 0));
        assert_eq!(visited[2], WorldPos::new(1, 1, 0));
        assert_eq!(visited[3], WorldPos::new(2, 1, 0));
    }

    #[test]
    fn traversal_never_repeats_or_skips_cells() {
        let directions = [
            Vec3::new(1.0, 1.0, 1.0),
            Vec3::new(-0.3, 0.8, 0.1),
            Vec3::new(0.0, -1.0, 1.0),
            Vec3::new(-2.0, -1.0, -0.5),
        ];
        for direction in directions {
            let mut visited: Vec<WorldPos> = Vec::new();
            let r = ray(Vec3::new(0.25, 0.75, 0.5), direction);
            cast_voxel_ray(&r, 20.0, |p| {
                visited.push(p);
                false
            });

            for pair in visited.windows(2) {
                let d = pair[1].to_ivec3() - pair[0].to_ivec3();
                assert_eq!(d.abs().element_sum(), 1, "{direction:?}: {pair:?}");
            }
            let mut unique = visited.clone();
            unique.sort_by_key(|p| (p.x, p.y, p.z));
            unique.dedup();
            assert_eq!(unique.len(), visited.len());
        }
    }
}
