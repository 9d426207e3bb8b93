//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use glam::{UVec3, Vec3};
use walk_mesh::engine::chunk::WalkMeshAsset;
use walk_mesh::engine::mesh::{grid_surface, triangulate_walk};
use walk_mesh::WalkMesh;

pub const EPS: f32 = 1e-4;

/// Raw buffers of a unit square in the XY plane, split along the (0, 2)
/// diagonal into triangles (0, 1, 2) and (0, 2, 3).
pub fn square_parts() -> (Vec<Vec3>, Vec<Vec3>, Vec<UVec3>) {
    (
        vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        ],
        vec![Vec3::Z; 4],
        vec![UVec3::new(0, 1, 2), UVec3::new(0, 2, 3)],
    )
}

pub fn square() -> WalkMesh {
    let (v, n, t) = square_parts();
    WalkMesh::new(v, n, t).unwrap()
}

/// Flat 4×4 grid of unit cells on y = 0 spanning [-2, 2] in X and Z.
pub fn floor() -> WalkMesh {
    triangulate_walk(&grid_surface(4, 4, 1.0, |_, _| 0.0)).unwrap()
}

/// Two planes meeting at a ridge along x = 0: y = 1 - |x| / 2 for x in [-1, 1],
/// z in [-0.5, 0.5].
pub fn ridge() -> WalkMesh {
    triangulate_walk(&grid_surface(2, 1, 1.0, |x, _| 1.0 - 0.5 * x.abs())).unwrap()
}

/// Asset holding the square as "square" and a single triangle as "tri".
pub fn two_mesh_asset() -> WalkMeshAsset {
    let mut asset = WalkMeshAsset::new();
    let (v, n, t) = square_parts();
    asset.push_mesh("square", &v, &n, &t);
    asset.push_mesh(
        "tri",
        &[Vec3::new(5.0, 0.0, 0.0), Vec3::new(6.0, 0.0, 0.0), Vec3::new(5.0, 1.0, 0.0)],
        &[Vec3::Z; 3],
        &[UVec3::new(0, 1, 2)],
    );
    asset
}

pub fn approx(a: Vec3, b: Vec3) -> bool {
    a.abs_diff_eq(b, EPS)
}
