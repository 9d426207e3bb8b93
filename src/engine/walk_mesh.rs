// Walk mesh: a fixed triangulated surface that agents slide across.
//
// Positions on the mesh are WalkPoints (triangle corner indices + barycentric
// weights). Motion is split into two primitives that callers chain together:
//
//   walk_in_triangle()   move inside one triangle until the step ends or an edge is hit
//   cross_edge()         hop over the hit edge into the neighbouring triangle
//
// The adjacency index maps each directed edge (a, b) of triangle (a, b, c) to c.
// The neighbour across edge (a, b) is the triangle storing (b, a); a missing
// reverse edge is a mesh boundary.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use glam::{Quat, UVec3, Vec3};

use super::error::{WalkMeshError, WalkMeshResult};
use super::geometry::{barycentric_weights, closest_point_on_segment, triangle_normal};

// ============================================================================
// CONSTANTS
// ============================================================================

/// Minimum dot product between a triangle's geometric normal and each of its
/// corners' stored normals. Anything lower means the asset was exported with
/// flipped winding or broken normals.
pub const NORMAL_AGREEMENT_MIN: f32 = 0.1;

/// Cyclic reorderings that move the coordinate which reached zero into the z
/// slot, indexed by that coordinate (0 = x, 1 = y, 2 = z). Only cyclic shifts
/// appear so the reordered indices still wind the same way.
const EXIT_ROTATIONS: [[usize; 3]; 3] = [
    [1, 2, 0],
    [2, 0, 1],
    [0, 1, 2],
];

// ============================================================================
// WALK POINT
// ============================================================================

/// A location on a walk mesh.
///
/// `indices` are the three corners of a triangle (in one of its cyclic
/// orders) and `weights` the barycentric weights of the point, summing to 1.
/// A zero weight puts the point on the edge opposite that corner; after
/// `walk_in_triangle` stops at an edge the zero weight is always in `z`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WalkPoint {
    pub indices: UVec3,
    pub weights: Vec3,
}

impl WalkPoint {
    pub fn new(indices: UVec3, weights: Vec3) -> Self {
        Self { indices, weights }
    }

    /// True when the point sits on the edge between `indices.x` and `indices.y`.
    #[inline]
    pub fn is_on_edge(&self) -> bool {
        self.weights.z == 0.0
    }

    /// Reorder so coordinate `crossed` moves to z, forcing its weight to exactly zero.
    fn rotated_to_edge(self, crossed: usize) -> Self {
        let [i, j, k] = EXIT_ROTATIONS[crossed];
        let idx = self.indices.to_array();
        let w = self.weights.to_array();
        Self {
            indices: UVec3::new(idx[i], idx[j], idx[k]),
            weights: Vec3::new(w[i], w[j], 0.0),
        }
    }
}

// ============================================================================
// WALK MESH
// ============================================================================

/// One walkable surface. Immutable once built.
#[derive(Debug, Clone)]
pub struct WalkMesh {
    vertices: Vec<Vec3>,
    normals: Vec<Vec3>,
    triangles: Vec<UVec3>,
    /// Directed edge (a, b) → third corner c of the triangle that owns it.
    next_vertex: HashMap<(u32, u32), u32>,
}

impl WalkMesh {
    /// Build a walk mesh and its adjacency index.
    ///
    /// Fails if the vertex and normal buffers differ in length, a triangle
    /// indexes past the vertex buffer, a triangle has zero area, a stored
    /// normal disagrees with its triangle's winding, or a directed edge is
    /// used by two triangles.
    pub fn new(vertices: Vec<Vec3>, normals: Vec<Vec3>, triangles: Vec<UVec3>) -> WalkMeshResult<Self> {
        if vertices.len() != normals.len() {
            return Err(WalkMeshError::VertexNormalMismatch {
                vertices: vertices.len(),
                normals: normals.len(),
            });
        }

        for (ti, tri) in triangles.iter().enumerate() {
            if let Some(&index) = tri.to_array().iter().find(|&&i| i as usize >= vertices.len()) {
                return Err(WalkMeshError::TriangleIndexOutOfRange {
                    triangle: ti,
                    index,
                    vertex_count: vertices.len(),
                });
            }
        }

        let mut next_vertex = HashMap::with_capacity(triangles.len() * 3);
        for tri in &triangles {
            for (a, b, c) in [(tri.x, tri.y, tri.z), (tri.y, tri.z, tri.x), (tri.z, tri.x, tri.y)] {
                match next_vertex.entry((a, b)) {
                    Entry::Vacant(slot) => {
                        slot.insert(c);
                    }
                    Entry::Occupied(_) => return Err(WalkMeshError::DuplicateEdge { from: a, to: b }),
                }
            }
        }

        for (ti, tri) in triangles.iter().enumerate() {
            let out = triangle_normal(
                vertices[tri.x as usize],
                vertices[tri.y as usize],
                vertices[tri.z as usize],
            )
            .ok_or(WalkMeshError::DegenerateTriangle { triangle: ti })?;

            for vertex in tri.to_array() {
                let dot = out.dot(normals[vertex as usize]);
                // Written as a negated comparison so NaN normals are rejected too.
                if !(dot > NORMAL_AGREEMENT_MIN) {
                    return Err(WalkMeshError::InconsistentNormal { triangle: ti, vertex, dot });
                }
            }
        }

        let mesh = Self { vertices, normals, triangles, next_vertex };
        log::debug!(
            "walk mesh built: {} vertices, {} triangles, {} boundary edges",
            mesh.vertices.len(),
            mesh.triangles.len(),
            mesh.boundary_edges().count(),
        );
        Ok(mesh)
    }

    pub fn vertices(&self) -> &[Vec3] { &self.vertices }
    pub fn normals(&self) -> &[Vec3] { &self.normals }
    pub fn triangles(&self) -> &[UVec3] { &self.triangles }

    pub fn vertex_count(&self) -> usize { self.vertices.len() }
    pub fn triangle_count(&self) -> usize { self.triangles.len() }

    /// True if no triangle lies on the other side of directed edge (a, b).
    pub fn is_boundary_edge(&self, a: u32, b: u32) -> bool {
        !self.next_vertex.contains_key(&(b, a))
    }

    /// Every directed boundary edge, in triangle order.
    pub fn boundary_edges(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.triangles
            .iter()
            .flat_map(|t| [(t.x, t.y), (t.y, t.z), (t.z, t.x)])
            .filter(|&(a, b)| self.is_boundary_edge(a, b))
    }

    #[inline]
    fn corners(&self, indices: UVec3) -> (Vec3, Vec3, Vec3) {
        (
            self.vertices[indices.x as usize],
            self.vertices[indices.y as usize],
            self.vertices[indices.z as usize],
        )
    }

    // ------------------------------------------------------------------------
    // Derived values
    // ------------------------------------------------------------------------

    /// World-space position of a walk point.
    pub fn to_world_point(&self, wp: &WalkPoint) -> Vec3 {
        let (a, b, c) = self.corners(wp.indices);
        a * wp.weights.x + b * wp.weights.y + c * wp.weights.z
    }

    /// Geometric (flat) unit normal of the walk point's triangle.
    pub fn to_world_triangle_normal(&self, wp: &WalkPoint) -> Vec3 {
        let (a, b, c) = self.corners(wp.indices);
        (b - a).cross(c - a).normalize()
    }

    /// Barycentric blend of the corner normals, renormalized.
    pub fn to_world_smooth_normal(&self, wp: &WalkPoint) -> Vec3 {
        let n = |i: u32| self.normals[i as usize];
        (n(wp.indices.x) * wp.weights.x + n(wp.indices.y) * wp.weights.y + n(wp.indices.z) * wp.weights.z)
            .normalize_or_zero()
    }

    // ------------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------------

    /// Closest point on the mesh surface to `world_point`.
    ///
    /// Linear scan over all triangles; meant for spawning, not per-frame use.
    /// Ties keep the first candidate in triangle order, then edge order
    /// x→y, y→z, z→x.
    pub fn nearest_walk_point(&self, world_point: Vec3) -> WalkMeshResult<WalkPoint> {
        let mut closest: Option<WalkPoint> = None;
        let mut closest_dis2 = f32::INFINITY;

        for tri in &self.triangles {
            let (a, b, c) = self.corners(*tri);
            let coords = barycentric_weights(a, b, c, world_point);

            if coords.cmpge(Vec3::ZERO).all() {
                let candidate = WalkPoint::new(*tri, coords);
                let dis2 = world_point.distance_squared(self.to_world_point(&candidate));
                if dis2 < closest_dis2 {
                    closest_dis2 = dis2;
                    closest = Some(candidate);
                }
                continue;
            }

            // Projection falls outside: the closest point is on an edge (or a corner).
            for (ai, bi, ci) in [(tri.x, tri.y, tri.z), (tri.y, tri.z, tri.x), (tri.z, tri.x, tri.y)] {
                let (pt, t) = closest_point_on_segment(
                    self.vertices[ai as usize],
                    self.vertices[bi as usize],
                    world_point,
                );
                let dis2 = world_point.distance_squared(pt);
                if dis2 < closest_dis2 {
                    closest_dis2 = dis2;
                    closest = Some(WalkPoint::new(UVec3::new(ai, bi, ci), Vec3::new(1.0 - t, t, 0.0)));
                }
            }
        }

        closest.ok_or(WalkMeshError::EmptyMesh)
    }

    /// Move `start` by `step` without leaving its triangle.
    ///
    /// Returns the end point and the fraction of `step` that was used. When
    /// the whole step fits the fraction is 1. Otherwise the walk stops where
    /// the path meets the first edge, the point is rotated so that edge runs
    /// from `indices.x` to `indices.y` (zero weight in `z`), and the fraction
    /// is in [0, 1).
    ///
    /// A step that leaves the triangle without any coordinate reaching zero
    /// along the way (start point already outside through drift, non-finite
    /// step) cannot be resolved: `start` is returned with a fraction of 0.
    pub fn walk_in_triangle(&self, start: &WalkPoint, step: Vec3) -> (WalkPoint, f32) {
        let (a, b, c) = self.corners(start.indices);
        let end_bary = barycentric_weights(a, b, c, self.to_world_point(start) + step);

        advance_weights(start, end_bary).unwrap_or_else(|| {
            log::warn!(
                "walk_in_triangle: no exit edge for step {step} from {:?} (weights {}), not moving",
                start.indices,
                start.weights,
            );
            (*start, 0.0)
        })
    }

    /// Step over the edge `indices.x`–`indices.y` of an on-edge walk point.
    ///
    /// Returns the same location expressed in the neighbouring triangle
    /// (indices `(y, x, opposite)`, zero weight still in `z`) together with
    /// the rotation taking the old triangle's normal to the new one. Returns
    /// `None` if the edge is on the mesh boundary.
    pub fn cross_edge(&self, start: &WalkPoint) -> Option<(WalkPoint, Quat)> {
        debug_assert!(start.is_on_edge(), "cross_edge needs a point on an edge, got {start:?}");
        if !start.is_on_edge() {
            log::warn!("cross_edge: walk point {start:?} is not on an edge");
            return None;
        }

        let &opposite = self.next_vertex.get(&(start.indices.y, start.indices.x))?;

        let end = WalkPoint::new(
            UVec3::new(start.indices.y, start.indices.x, opposite),
            Vec3::new(start.weights.y, start.weights.x, 0.0),
        );
        let rotation = Quat::from_rotation_arc(
            self.to_world_triangle_normal(start),
            self.to_world_triangle_normal(&end),
        );
        Some((end, rotation))
    }
}

/// Move `start` straight towards `end_bary` (weights in the same triangle),
/// stopping at the first edge crossed. Same result shape as
/// `WalkMesh::walk_in_triangle`; `None` when no coordinate reaches zero on
/// the way out.
fn advance_weights(start: &WalkPoint, end_bary: Vec3) -> Option<(WalkPoint, f32)> {
    if end_bary.cmpge(Vec3::ZERO).all() {
        return Some((WalkPoint::new(start.indices, end_bary), 1.0));
    }

    let delta = end_bary - start.weights;

    // Earliest time any decreasing coordinate reaches zero.
    let mut exit: Option<(usize, f32)> = None;
    for i in 0..3 {
        if delta[i] < 0.0 {
            let t = start.weights[i] / -delta[i];
            if (0.0..=1.0).contains(&t) && exit.is_none_or(|(_, best)| t < best) {
                exit = Some((i, t));
            }
        }
    }
    let (crossed, time) = exit?;

    // The end lies a rounding error past the edge: the whole step fits.
    if time >= 1.0 {
        let weights = end_bary.max(Vec3::ZERO);
        return Some((WalkPoint::new(start.indices, weights / weights.element_sum()), 1.0));
    }

    let mut weights = start.weights + delta * time;
    weights[crossed] = 0.0;
    let weights = weights.max(Vec3::ZERO);
    let weights = weights / weights.element_sum();

    Some((WalkPoint::new(start.indices, weights).rotated_to_edge(crossed), time))
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-5;

    /// Unit square in the XY plane split along the (0, 2) diagonal.
    fn square() -> WalkMesh {
        WalkMesh::new(
            vec![
                Vec3::new(0.0, 0.0, 0.0),
                Vec3::new(1.0, 0.0, 0.0),
                Vec3::new(1.0, 1.0, 0.0),
                Vec3::new(0.0, 1.0, 0.0),
            ],
            vec![Vec3::Z; 4],
            vec![UVec3::new(0, 1, 2), UVec3::new(0, 2, 3)],
        )
        .unwrap()
    }

    #[test]
    fn adjacency_has_three_entries_per_triangle() {
        let mesh = square();
        assert_eq!(mesh.next_vertex.len(), 6);
        assert_eq!(mesh.next_vertex[&(2, 0)], 1);
        assert_eq!(mesh.next_vertex[&(0, 2)], 3);
    }

    #[test]
    fn boundary_edges_of_square() {
        let mesh = square();
        let edges: Vec<_> = mesh.boundary_edges().collect();
        assert_eq!(edges, vec![(0, 1), (1, 2), (2, 3), (3, 0)]);
        assert!(!mesh.is_boundary_edge(2, 0));
        assert!(!mesh.is_boundary_edge(0, 2));
    }

    #[test]
    fn mismatched_normals_rejected() {
        let err = WalkMesh::new(vec![Vec3::ZERO; 3], vec![Vec3::Z; 2], vec![]).unwrap_err();
        assert!(matches!(err, WalkMeshError::VertexNormalMismatch { vertices: 3, normals: 2 }));
    }

    #[test]
    fn out_of_range_index_rejected() {
        let err = WalkMesh::new(
            vec![Vec3::ZERO, Vec3::X, Vec3::Y],
            vec![Vec3::Z; 3],
            vec![UVec3::new(0, 1, 3)],
        )
        .unwrap_err();
        assert!(matches!(err, WalkMeshError::TriangleIndexOutOfRange { triangle: 0, index: 3, .. }));
    }

    #[test]
    fn duplicate_directed_edge_rejected() {
        // Same triangle twice: every directed edge is inserted twice.
        let err = WalkMesh::new(
            vec![Vec3::ZERO, Vec3::X, Vec3::Y],
            vec![Vec3::Z; 3],
            vec![UVec3::new(0, 1, 2), UVec3::new(1, 2, 0)],
        )
        .unwrap_err();
        assert!(matches!(err, WalkMeshError::DuplicateEdge { .. }));
    }

    #[test]
    fn flipped_winding_rejected() {
        let err = WalkMesh::new(
            vec![Vec3::ZERO, Vec3::X, Vec3::Y],
            vec![Vec3::Z; 3],
            vec![UVec3::new(0, 2, 1)],
        )
        .unwrap_err();
        assert!(matches!(err, WalkMeshError::InconsistentNormal { triangle: 0, .. }));
    }

    #[test]
    fn degenerate_triangle_rejected() {
        let err = WalkMesh::new(
            vec![Vec3::ZERO, Vec3::X, Vec3::X * 2.0],
            vec![Vec3::Z; 3],
            vec![UVec3::new(0, 1, 2)],
        )
        .unwrap_err();
        assert!(matches!(err, WalkMeshError::DegenerateTriangle { triangle: 0 }));
    }

    #[test]
    fn exit_rotations_put_crossed_coordinate_last() {
        let wp = WalkPoint::new(UVec3::new(10, 20, 30), Vec3::new(0.1, 0.2, 0.7));
        let expected = [
            (UVec3::new(20, 30, 10), Vec3::new(0.2, 0.7, 0.0)),
            (UVec3::new(30, 10, 20), Vec3::new(0.7, 0.1, 0.0)),
            (UVec3::new(10, 20, 30), Vec3::new(0.1, 0.2, 0.0)),
        ];
        for (crossed, (indices, weights)) in expected.into_iter().enumerate() {
            let rotated = wp.rotated_to_edge(crossed);
            assert_eq!(rotated.indices, indices, "crossed = {crossed}");
            assert_eq!(rotated.weights, weights, "crossed = {crossed}");
        }
    }

    #[test]
    fn nearest_point_snaps_to_edge_outside_mesh() {
        let mesh = square();
        let wp = mesh.nearest_walk_point(Vec3::new(0.25, -3.0, 1.0)).unwrap();
        assert_eq!(wp.weights.z, 0.0);
        assert!(mesh.to_world_point(&wp).abs_diff_eq(Vec3::new(0.25, 0.0, 0.0), EPS));
    }

    #[test]
    fn nearest_point_on_empty_mesh_fails() {
        let mesh = WalkMesh::new(vec![], vec![], vec![]).unwrap();
        assert!(matches!(mesh.nearest_walk_point(Vec3::ZERO), Err(WalkMeshError::EmptyMesh)));
    }

    #[test]
    fn step_out_of_triangle_stops_on_edge() {
        let mesh = square();
        let start = WalkPoint::new(UVec3::new(0, 1, 2), Vec3::new(0.5, 0.25, 0.25));
        // Straight down in -Y: leaves through edge (0, 1), opposite corner 2.
        let (end, t) = mesh.walk_in_triangle(&start, Vec3::new(0.0, -1.0, 0.0));
        assert!(t > 0.0 && t < 1.0);
        assert_eq!(end.indices, UVec3::new(0, 1, 2));
        assert_eq!(end.weights.z, 0.0);
        assert!((end.weights.element_sum() - 1.0).abs() < EPS);
    }

    #[test]
    fn start_outside_triangle_does_not_move() {
        let mesh = square();
        // Drifted past edge (1, 2) and (2, 0); stepping +X never brings a
        // coordinate down to zero.
        let start = WalkPoint::new(UVec3::new(0, 1, 2), Vec3::new(1.2, -0.1, -0.1));
        let (end, t) = mesh.walk_in_triangle(&start, Vec3::X * 0.1);
        assert_eq!(end, start);
        assert_eq!(t, 0.0);
    }

    #[test]
    fn non_finite_step_does_not_move() {
        let mesh = square();
        let start = WalkPoint::new(UVec3::new(0, 1, 2), Vec3::splat(1.0 / 3.0));
        let (end, t) = mesh.walk_in_triangle(&start, Vec3::new(f32::NAN, 0.0, 0.0));
        assert_eq!(end, start);
        assert_eq!(t, 0.0);
    }

    #[test]
    fn exit_rounded_to_step_end_counts_as_full_step() {
        let start = WalkPoint::new(UVec3::new(0, 1, 2), Vec3::new(0.25, 0.25, 0.5));
        // z ends 1e-9 below zero; 0.5 / 0.500000001 rounds to exactly 1.
        let (end, t) = advance_weights(&start, Vec3::new(0.25, 0.75, -1e-9)).unwrap();
        assert_eq!(t, 1.0);
        assert_eq!(end.indices, start.indices);
        assert!(end.weights.cmpge(Vec3::ZERO).all());
        assert!(end.weights.abs_diff_eq(Vec3::new(0.25, 0.75, 0.0), EPS));
    }

    #[test]
    fn exit_before_step_end_reports_fraction_below_one() {
        let start = WalkPoint::new(UVec3::new(0, 1, 2), Vec3::new(0.25, 0.25, 0.5));
        let (end, t) = advance_weights(&start, Vec3::new(0.25, 1.25, -0.5)).unwrap();
        assert!((t - 0.5).abs() < EPS);
        assert!(t < 1.0);
        assert_eq!(end.indices, UVec3::new(0, 1, 2));
        assert!(end.weights.abs_diff_eq(Vec3::new(0.25, 0.75, 0.0), EPS));
    }

    #[test]
    fn smooth_normal_blends_vertex_normals() {
        let mesh = WalkMesh::new(
            vec![Vec3::ZERO, Vec3::X, Vec3::Y],
            vec![Vec3::new(1.0, 0.0, 1.0).normalize(), Vec3::Z, Vec3::Z],
            vec![UVec3::new(0, 1, 2)],
        )
        .unwrap();
        let wp = WalkPoint::new(UVec3::new(0, 1, 2), Vec3::new(1.0, 0.0, 0.0));
        assert!(mesh.to_world_smooth_normal(&wp).abs_diff_eq(Vec3::new(1.0, 0.0, 1.0).normalize(), EPS));
        assert!(mesh.to_world_triangle_normal(&wp).abs_diff_eq(Vec3::Z, EPS));
    }
}
