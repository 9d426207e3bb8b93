// Stateless triangle geometry shared by the walk mesh queries.

use glam::Vec3;

/// Project `pt` onto the plane of triangle (a, b, c) and return the
/// barycentric weights of the projected point, one per corner.
///
/// Each weight is the signed area of the sub-triangle opposite its corner,
/// measured against the triangle normal, so points outside the triangle get
/// negative weights. The weights always sum to 1.
///
/// The triangle must have non-zero area; `WalkMesh::new` rejects meshes that
/// contain degenerate triangles.
pub fn barycentric_weights(a: Vec3, b: Vec3, c: Vec3, pt: Vec3) -> Vec3 {
    let normal = (b - a).cross(c - a);

    // Each perp points into the triangle from its edge, scaled by the edge length
    // and |normal|, so the dot products are proportional to sub-triangle areas.
    let ab_perp = normal.cross(b - a);
    let bc_perp = normal.cross(c - b);
    let ca_perp = normal.cross(a - c);

    let area_c = ab_perp.dot(pt - a);
    let area_a = bc_perp.dot(pt - b);
    let area_b = ca_perp.dot(pt - c);

    let total = area_a + area_b + area_c;
    Vec3::new(area_a, area_b, area_c) / total
}

/// Closest point to `pt` on the finite segment `a..b`.
///
/// Returns the point and its parameter `t` in [0, 1] (0 at `a`, 1 at `b`).
/// A zero-length segment returns `a`.
pub fn closest_point_on_segment(a: Vec3, b: Vec3, pt: Vec3) -> (Vec3, f32) {
    let ab = b - a;
    let len2 = ab.dot(ab);
    if len2 == 0.0 {
        return (a, 0.0);
    }
    let t = ((pt - a).dot(ab) / len2).clamp(0.0, 1.0);
    (a.lerp(b, t), t)
}

/// Unit normal of a counter-clockwise triangle, or `None` if it has no area.
#[inline]
pub fn triangle_normal(a: Vec3, b: Vec3, c: Vec3) -> Option<Vec3> {
    (b - a).cross(c - a).try_normalize()
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-5;

    fn tri() -> (Vec3, Vec3, Vec3) {
        (
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(2.0, 0.0, 0.0),
            Vec3::new(0.0, 2.0, 0.0),
        )
    }

    #[test]
    fn corners_have_unit_weights() {
        let (a, b, c) = tri();
        assert!(barycentric_weights(a, b, c, a).abs_diff_eq(Vec3::X, EPS));
        assert!(barycentric_weights(a, b, c, b).abs_diff_eq(Vec3::Y, EPS));
        assert!(barycentric_weights(a, b, c, c).abs_diff_eq(Vec3::Z, EPS));
    }

    #[test]
    fn point_above_plane_is_projected() {
        let (a, b, c) = tri();
        let in_plane = barycentric_weights(a, b, c, Vec3::new(0.5, 0.5, 0.0));
        let above = barycentric_weights(a, b, c, Vec3::new(0.5, 0.5, 7.0));
        assert!(in_plane.abs_diff_eq(above, EPS));
        assert!(in_plane.abs_diff_eq(Vec3::new(0.5, 0.25, 0.25), EPS));
    }

    #[test]
    fn outside_point_gets_negative_weight() {
        let (a, b, c) = tri();
        let w = barycentric_weights(a, b, c, Vec3::new(-1.0, 0.5, 0.0));
        assert!(w.x > 0.0);
        assert!(w.y < 0.0);
        assert!((w.x + w.y + w.z - 1.0).abs() < EPS);
    }

    #[test]
    fn segment_projection_clamps_to_endpoints() {
        let a = Vec3::ZERO;
        let b = Vec3::new(4.0, 0.0, 0.0);
        assert_eq!(closest_point_on_segment(a, b, Vec3::new(-3.0, 1.0, 0.0)), (a, 0.0));
        assert_eq!(closest_point_on_segment(a, b, Vec3::new(9.0, 1.0, 0.0)), (b, 1.0));

        let (p, t) = closest_point_on_segment(a, b, Vec3::new(1.0, 5.0, 0.0));
        assert!(p.abs_diff_eq(Vec3::new(1.0, 0.0, 0.0), EPS));
        assert!((t - 0.25).abs() < EPS);
    }

    #[test]
    fn collinear_triangle_has_no_normal() {
        assert!(triangle_normal(Vec3::ZERO, Vec3::X, Vec3::X * 2.0).is_none());
        let (a, b, c) = tri();
        assert!(triangle_normal(a, b, c).unwrap().abs_diff_eq(Vec3::Z, EPS));
    }
}
