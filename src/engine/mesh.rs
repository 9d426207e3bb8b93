// Procedural walk surfaces.
//
//   grid_surface() → PolyMesh → triangulate_walk() → WalkMesh
//
// Used by the demo asset and tests; real levels come from asset files.

use glam::{UVec3, Vec3};

use super::error::WalkMeshResult;
use super::walk_mesh::WalkMesh;

// ============================================================================
// POLY MESH
// ============================================================================

/// Polygon mesh for procedural construction.
/// Supports n-gon faces (arbitrary vertex count per face).
/// Faces use CCW winding when viewed from the walkable side.
pub struct PolyMesh {
    pub positions: Vec<Vec3>,
    pub faces:     Vec<Vec<u32>>,  // each face = CCW-ordered vertex index list
}

impl PolyMesh {
    pub fn new() -> Self {
        Self {
            positions: Vec::new(),
            faces:     Vec::new(),
        }
    }

    /// Add a vertex and return its index.
    pub fn add_vertex(&mut self, pos: Vec3) -> u32 {
        let idx = self.positions.len() as u32;
        self.positions.push(pos);
        idx
    }

    /// Add a face by vertex indices (CCW order).
    pub fn add_face(&mut self, indices: Vec<u32>) {
        debug_assert!(indices.len() >= 3, "Face must have at least 3 vertices");
        self.faces.push(indices);
    }

    pub fn vertex_count(&self) -> usize { self.positions.len() }
}

impl Default for PolyMesh {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// TRIANGULATION + SMOOTH NORMALS
// ============================================================================

/// Fan-triangulate every face (from its vertex 0) and return the triangles
/// with area-weighted smooth vertex normals.
///
/// The unnormalized cross product of each fan triangle has magnitude
/// 2×area, so summing them per vertex weights larger triangles more.
pub fn triangulate_smooth(poly: &PolyMesh) -> (Vec<Vec3>, Vec<UVec3>) {
    let mut normal_accum: Vec<Vec3> = vec![Vec3::ZERO; poly.vertex_count()];
    let mut triangles: Vec<UVec3> = Vec::new();

    for face in &poly.faces {
        // Faces with fewer than three corners yield no triangles.
        let Some((&first, rest)) = face.split_first() else {
            continue;
        };
        for pair in rest.windows(2) {
            let tri = UVec3::new(first, pair[0], pair[1]);
            let a = poly.positions[tri.x as usize];
            let b = poly.positions[tri.y as usize];
            let c = poly.positions[tri.z as usize];
            let weighted_normal = (b - a).cross(c - a);
            normal_accum[tri.x as usize] += weighted_normal;
            normal_accum[tri.y as usize] += weighted_normal;
            normal_accum[tri.z as usize] += weighted_normal;
            triangles.push(tri);
        }
    }

    let normals = normal_accum.iter().map(|n| n.normalize_or_zero()).collect();
    (normals, triangles)
}

/// Build a walk mesh from a polygon mesh. Fails under the same conditions
/// as `WalkMesh::new` (for example a fold sharp enough that a smooth normal
/// disagrees with one of its faces).
pub fn triangulate_walk(poly: &PolyMesh) -> WalkMeshResult<WalkMesh> {
    let (normals, triangles) = triangulate_smooth(poly);
    WalkMesh::new(poly.positions.clone(), normals, triangles)
}

// ============================================================================
// GENERATORS
// ============================================================================

/// Regular grid of `cols × rows` quads over the XZ plane, centred on the
/// origin, with heights from `height(x, z)`. Faces are wound so the walkable
/// side faces +Y.
pub fn grid_surface(cols: u32, rows: u32, cell_size: f32, height: impl Fn(f32, f32) -> f32) -> PolyMesh {
    let mut poly = PolyMesh::new();
    let half_x = cols as f32 * cell_size * 0.5;
    let half_z = rows as f32 * cell_size * 0.5;

    for r in 0..=rows {
        for c in 0..=cols {
            let x = c as f32 * cell_size - half_x;
            let z = r as f32 * cell_size - half_z;
            poly.add_vertex(Vec3::new(x, height(x, z), z));
        }
    }

    let stride = cols + 1;
    for r in 0..rows {
        for c in 0..cols {
            let i00 = r * stride + c;
            let i10 = i00 + 1;
            let i01 = i00 + stride;
            let i11 = i01 + 1;
            // Looking down -Y with +X right, +Z points towards the viewer,
            // so (x, z) → (x, z+1) → (x+1, z+1) → (x+1, z) is counter-clockwise.
            poly.add_face(vec![i00, i01, i11, i10]);
        }
    }

    poly
}
