use colorcube_core::grid::{Voxel, VoxelGrid};
use glam::Vec3;

/// Corner of the unit cube `[-0.5, 0.5]^3`.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CubeVertex {
    pub position: [f32; 3],
}

/// Per-voxel instance data. Must match `VertexIn` locations 1..=3 in voxel.wgsl.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct VoxelInstance {
    pub center: [f32; 3],
    pub edge: f32,
    /// RGB plus opacity in alpha.
    pub color: [f32; 4],
}

impl VoxelInstance {
    pub fn from_voxel(voxel: &Voxel, edge: f32) -> Self {
        let [r, g, b] = voxel.color.to_array();
        Self {
            center: voxel.center.to_array(),
            edge,
            color: [r, g, b, voxel.opacity],
        }
    }
}

/// Split a grid into opaque and transparent instance lists.
pub fn partition_instances(grid: &VoxelGrid) -> (Vec<VoxelInstance>, Vec<VoxelInstance>) {
    let edge = grid.edge_length();
    let mut opaque = Vec::with_capacity(grid.opaque_count());
    let mut transparent = Vec::with_capacity(grid.transparent_count());
    for voxel in grid.voxels() {
        let instance = VoxelInstance::from_voxel(voxel, edge);
        if voxel.transparent {
            transparent.push(instance);
        } else {
            opaque.push(instance);
        }
    }
    (opaque, transparent)
}

/// Order instances farthest-first from `eye` for alpha blending.
pub fn sort_back_to_front(instances: &mut [VoxelInstance], eye: Vec3) {
    instances.sort_by(|a, b| {
        let da = Vec3::from(a.center).distance_squared(eye);
        let db = Vec3::from(b.center).distance_squared(eye);
        db.total_cmp(&da)
    });
}

/// 36 vertices (12 triangles), counter-clockwise when seen from outside.
pub fn unit_cube_vertices() -> Vec<CubeVertex> {
    const H: f32 = 0.5;
    // Each face lists its corners counter-clockwise from outside.
    let faces: [[[f32; 3]; 4]; 6] = [
        // +X
        [[H, -H, H], [H, -H, -H], [H, H, -H], [H, H, H]],
        // -X
        [[-H, -H, -H], [-H, -H, H], [-H, H, H], [-H, H, -H]],
        // +Y
        [[-H, H, H], [H, H, H], [H, H, -H], [-H, H, -H]],
        // -Y
        [[-H, -H, -H], [H, -H, -H], [H, -H, H], [-H, -H, H]],
        // +Z
        [[-H, -H, H], [H, -H, H], [H, H, H], [-H, H, H]],
        // -Z
        [[H, -H, -H], [-H, -H, -H], [-H, H, -H], [H, H, -H]],
    ];

    let mut verts = Vec::with_capacity(36);
    for face in faces {
        for i in [0, 1, 2, 0, 2, 3] {
            verts.push(CubeVertex { position: face[i] });
        }
    }
    verts
}

#[cfg(test)]
mod tests {
    use super::*;
    use colorcube_core::grid::{build, GridConfig};
    use colorcube_core::rows::TransparentRows;
    use colorcube_core::types::Axis;

    #[test]
    fn test_cube_vertex_count() {
        assert_eq!(unit_cube_vertices().len(), 36);
    }

    #[test]
    fn test_cube_triangles_face_outward() {
        let verts = unit_cube_vertices();
        for tri in verts.chunks(3) {
            let a = Vec3::from(tri[0].position);
            let b = Vec3::from(tri[1].position);
            let c = Vec3::from(tri[2].position);
            let normal = (b - a).cross(c - a);
            let centroid = (a + b + c) / 3.0;
            assert!(
                normal.dot(centroid) > 0.0,
                "triangle {tri:?} winds inward"
            );
        }
    }

    #[test]
    fn test_cube_stays_in_unit_bounds() {
        for v in unit_cube_vertices() {
            assert!(v.position.iter().all(|c| c.abs() == 0.5));
        }
    }

    #[test]
    fn test_instance_layout_size() {
        assert_eq!(std::mem::size_of::<VoxelInstance>(), 32);
        assert_eq!(std::mem::size_of::<CubeVertex>(), 12);
    }

    #[test]
    fn test_partition_counts() {
        let mut rows = TransparentRows::new();
        rows.set_threshold(Axis::Y, 1);
        let grid = build(&GridConfig::new(4, 4.0, 0.0), &rows).expect("valid config");
        let (opaque, transparent) = partition_instances(&grid);
        assert_eq!(opaque.len(), 48);
        assert_eq!(transparent.len(), 16);
        assert!(transparent.iter().all(|i| i.color[3] == 0.04));
        assert!(opaque.iter().all(|i| i.color[3] == 1.0));
    }

    #[test]
    fn test_instance_copies_voxel() {
        let grid = build(&GridConfig::new(2, 2.0, 0.0), &TransparentRows::new())
            .expect("valid config");
        let voxel = grid.voxels()[7];
        let instance = VoxelInstance::from_voxel(&voxel, grid.edge_length());
        assert_eq!(instance.center, [0.5, 0.5, 0.5]);
        assert_eq!(instance.edge, 1.0);
        assert_eq!(instance.color, [1.0, 1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_sort_farthest_first() {
        let at = |z: f32| VoxelInstance {
            center: [0.0, 0.0, z],
            edge: 1.0,
            color: [1.0; 4],
        };
        let mut list = vec![at(1.0), at(-3.0), at(0.0)];
        sort_back_to_front(&mut list, Vec3::new(0.0, 0.0, 10.0));
        let zs: Vec<f32> = list.iter().map(|i| i.center[2]).collect();
        assert_eq!(zs, vec![-3.0, 0.0, 1.0]);
    }
}
