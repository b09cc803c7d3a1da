//! CPU ray picking against the voxel grid.

use glam::{Mat4, UVec3, Vec2, Vec3, Vec4};

use crate::constants::RAY_EPSILON;
use crate::grid::VoxelGrid;
use crate::types::Rgb;

/// World-space ray with a normalized direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub dir: Vec3,
}

impl Ray {
    /// Returns `None` for a zero-length direction.
    pub fn new(origin: Vec3, dir: Vec3) -> Option<Self> {
        let dir = dir.normalize_or_zero();
        if dir.length_squared() < 1e-12 {
            return None;
        }
        Some(Self { origin, dir })
    }
}

/// Nearest voxel struck by a ray.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickHit {
    pub coord: UVec3,
    pub color: Rgb,
    pub opacity: f32,
    /// Ray parameter at the entry point.
    pub distance: f32,
}

/// Entry distance of `ray` into the box `[min, max]`, slab method.
///
/// Only entries in front of the origin count: a ray starting inside the
/// box enters through a back face and does not hit it.
pub fn intersect_aabb(ray: &Ray, min: Vec3, max: Vec3) -> Option<f32> {
    let inv = ray.dir.recip();
    let t1 = (min - ray.origin) * inv;
    let t2 = (max - ray.origin) * inv;
    let tmin = t1.min(t2).max_element();
    let tmax = t1.max(t2).min_element();

    if tmax >= tmin && tmin >= 0.0 {
        Some(tmin)
    } else {
        None
    }
}

/// Build a world-space ray through pixel `cursor` of a `viewport`-sized view.
///
/// `cursor` is measured from the top-left corner. Uses wgpu NDC depth `[0, 1]`.
pub fn screen_ray(cursor: Vec2, viewport: Vec2, inv_view_proj: Mat4) -> Option<Ray> {
    if viewport.x <= 0.0 || viewport.y <= 0.0 {
        return None;
    }

    let ndc_x = cursor.x / viewport.x * 2.0 - 1.0;
    let ndc_y = 1.0 - cursor.y / viewport.y * 2.0;

    let near = inv_view_proj * Vec4::new(ndc_x, ndc_y, 0.0, 1.0);
    let far = inv_view_proj * Vec4::new(ndc_x, ndc_y, 1.0, 1.0);
    if near.w.abs() < RAY_EPSILON || far.w.abs() < RAY_EPSILON {
        return None;
    }

    let origin = near.truncate() / near.w;
    let far = far.truncate() / far.w;
    Ray::new(origin, far - origin)
}

impl VoxelGrid {
    /// Nearest voxel hit by `ray`. Ties go to the voxel earliest in storage order.
    pub fn pick(&self, ray: &Ray, include_transparent: bool) -> Option<PickHit> {
        let mut best: Option<PickHit> = None;
        for voxel in self.voxels() {
            if voxel.transparent && !include_transparent {
                continue;
            }
            let (min, max) = self.voxel_bounds(voxel);
            let Some(t) = intersect_aabb(ray, min, max) else {
                continue;
            };
            if best.is_none_or(|b| t < b.distance) {
                best = Some(PickHit {
                    coord: voxel.coord,
                    color: voxel.color,
                    opacity: voxel.opacity,
                    distance: t,
                });
            }
        }
        best
    }

    /// Color of the nearest voxel along the ray, transparent voxels included.
    pub fn resolve_color_at_point(&self, origin: Vec3, dir: Vec3) -> Option<Rgb> {
        let ray = Ray::new(origin, dir)?;
        self.pick(&ray, true).map(|hit| hit.color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{build, GridConfig};
    use crate::rows::TransparentRows;
    use crate::types::Axis;

    fn grid(n: u32) -> VoxelGrid {
        build(&GridConfig::new(n, 5.0, 0.05), &TransparentRows::new()).expect("valid config")
    }

    #[test]
    fn test_aabb_hit_from_outside() {
        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::NEG_Z).expect("non-zero dir");
        let t = intersect_aabb(&ray, Vec3::splat(-1.0), Vec3::splat(1.0));
        assert_eq!(t, Some(4.0));
    }

    #[test]
    fn test_aabb_miss() {
        let ray = Ray::new(Vec3::new(3.0, 0.0, 5.0), Vec3::NEG_Z).expect("non-zero dir");
        assert_eq!(intersect_aabb(&ray, Vec3::splat(-1.0), Vec3::splat(1.0)), None);
    }

    #[test]
    fn test_aabb_behind_origin() {
        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::Z).expect("non-zero dir");
        assert_eq!(intersect_aabb(&ray, Vec3::splat(-1.0), Vec3::splat(1.0)), None);
    }

    #[test]
    fn test_aabb_origin_inside_is_not_a_hit() {
        let ray = Ray::new(Vec3::ZERO, Vec3::X).expect("non-zero dir");
        assert_eq!(intersect_aabb(&ray, Vec3::splat(-1.0), Vec3::splat(1.0)), None);
    }

    #[test]
    fn test_zero_direction_rejected() {
        assert!(Ray::new(Vec3::ONE, Vec3::ZERO).is_none());
    }

    #[test]
    fn test_front_ray_hits_near_face() {
        // Looking down -Z through the center column: the z = n-1 voxel is nearest.
        let g = grid(5);
        let ray = Ray::new(Vec3::new(0.0, 0.0, 10.0), Vec3::NEG_Z).expect("non-zero dir");
        let hit = g.pick(&ray, true).expect("ray crosses the grid");
        assert_eq!(hit.coord, UVec3::new(2, 2, 4));
        assert_eq!(hit.color, Rgb::new(0.5, 0.5, 1.0));
        assert!((hit.distance - 7.5).abs() < 1e-4);
    }

    #[test]
    fn test_side_ray_hits_x_zero() {
        let g = grid(5);
        let ray = Ray::new(Vec3::new(-10.0, 0.0, 0.0), Vec3::X).expect("non-zero dir");
        let hit = g.pick(&ray, true).expect("ray crosses the grid");
        assert_eq!(hit.coord, UVec3::new(0, 2, 2));
    }

    #[test]
    fn test_ray_past_grid_misses() {
        let g = grid(5);
        assert_eq!(
            g.resolve_color_at_point(Vec3::new(0.0, 4.0, 10.0), Vec3::NEG_Z),
            None
        );
    }

    #[test]
    fn test_ray_through_gap_misses() {
        // Boxes span [-1.5, -0.5] and [0.5, 1.5] on each axis; x = y = 0 is in the gap.
        let g = build(&GridConfig::new(2, 3.0, 1.0), &TransparentRows::new())
            .expect("valid config");
        assert_eq!(
            g.resolve_color_at_point(Vec3::new(0.0, 0.0, 10.0), Vec3::NEG_Z),
            None
        );
    }

    #[test]
    fn test_transparent_voxels_skipped_on_request() {
        let mut rows = TransparentRows::new();
        rows.insert(Axis::Z, 3);
        rows.insert(Axis::Z, 4);
        let g = build(&GridConfig::new(5, 5.0, 0.05), &rows).expect("valid config");
        let ray = Ray::new(Vec3::new(0.0, 0.0, 10.0), Vec3::NEG_Z).expect("non-zero dir");

        let through = g.pick(&ray, false).expect("opaque voxel behind");
        assert_eq!(through.coord, UVec3::new(2, 2, 2));

        let first = g.pick(&ray, true).expect("transparent voxel in front");
        assert_eq!(first.coord, UVec3::new(2, 2, 4));
    }

    #[test]
    fn test_screen_ray_center_points_forward() {
        let view = Mat4::look_at_rh(Vec3::new(0.0, 0.0, 7.5), Vec3::ZERO, Vec3::Y);
        let proj = Mat4::perspective_rh(75f32.to_radians(), 1.0, 0.1, 1000.0);
        let inv = (proj * view).inverse();

        let ray = screen_ray(Vec2::new(400.0, 400.0), Vec2::new(800.0, 800.0), inv)
            .expect("valid viewport");
        assert!((ray.dir - Vec3::NEG_Z).length() < 1e-3);
        assert!((ray.origin.z - 7.4).abs() < 1e-2);
    }

    #[test]
    fn test_screen_ray_center_picks_front_voxel() {
        let g = grid(5);
        let view = Mat4::look_at_rh(Vec3::new(0.0, 0.0, 7.5), Vec3::ZERO, Vec3::Y);
        let proj = Mat4::perspective_rh(75f32.to_radians(), 1.5, 0.1, 1000.0);
        let ray = screen_ray(
            Vec2::new(600.0, 400.0),
            Vec2::new(1200.0, 800.0),
            (proj * view).inverse(),
        )
        .expect("valid viewport");
        let hit = g.pick(&ray, true).expect("center of screen hits the cube");
        assert_eq!(hit.coord, UVec3::new(2, 2, 4));
    }

    #[test]
    fn test_tie_goes_to_earlier_voxel() {
        // Gap 0: voxels (0,1,1) and (1,1,1) share the face x = 0. Both rays
        // enter the front face exactly on that shared edge.
        let g = build(&GridConfig::new(2, 2.0, 0.0), &TransparentRows::new())
            .expect("valid config");
        for (origin, dir) in [
            (Vec3::new(-1.0, 0.5, 2.0), Vec3::new(1.0, 0.0, -1.0)),
            (Vec3::new(1.0, 0.5, 2.0), Vec3::new(-1.0, 0.0, -1.0)),
        ] {
            let ray = Ray::new(origin, dir).expect("non-zero dir");
            let hit = g.pick(&ray, true).expect("ray hits the shared edge");
            assert_eq!(hit.coord, UVec3::new(0, 1, 1), "ray from {origin}");
        }
    }

    #[test]
    fn test_screen_ray_empty_viewport() {
        assert!(screen_ray(Vec2::ZERO, Vec2::ZERO, Mat4::IDENTITY).is_none());
    }
}
