// Multi-triangle walking: chains walk_in_triangle() and cross_edge() until a
// frame's step is used up, a wall stops the agent, or the iteration cap hits.
//
//   walk_in_triangle ──(step used up)──────────────► done
//          │
//      (hit edge)
//          ▼
//     cross_edge ──(neighbour)──► rotate remaining step, loop
//          │
//      (boundary)
//          ▼
//   WallResponse::Stop  → blocked
//   WallResponse::Slide → deflect remaining step along the wall, loop

use bevy_ecs::prelude::*;
use glam::{Quat, Vec3};

use super::walk_mesh::{WalkMesh, WalkPoint};

// ============================================================================
// CONSTANTS
// ============================================================================

/// Triangle hops allowed per call. Thin slivers or steps running parallel to
/// an edge can otherwise bounce between triangles without making progress.
pub const DEFAULT_MAX_ITERATIONS: u32 = 10;

/// How hard a sliding agent is pushed back off a wall: the outward part of
/// the step is reflected and scaled so it ends up pointing slightly inward.
const WALL_BOUNCE: f32 = 1.25;
/// Extra inward push, relative to the inward part, for steps already heading away from the wall.
const WALL_NUDGE: f32 = 0.01;

// ============================================================================
// SETTINGS
// ============================================================================

/// What to do when a step runs into a boundary edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WallResponse {
    /// Stop on the edge; the rest of the step is discarded.
    #[default]
    Stop,
    /// Keep the part of the step that runs along the wall.
    Slide,
}

/// Tunables for `walk`. Stored as an ECS resource for `walk_agents_system`.
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct WalkSettings {
    pub max_iterations: u32,
    pub wall: WallResponse,
}

impl Default for WalkSettings {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            wall: WallResponse::Stop,
        }
    }
}

// ============================================================================
// WALK
// ============================================================================

/// Result of walking one step across the mesh.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WalkOutcome {
    /// Where the walk ended.
    pub at: WalkPoint,
    /// Accumulated reorientation from every edge crossed, oldest applied first.
    pub rotation: Quat,
    /// Fraction of the requested step that was travelled, in [0, 1].
    pub consumed: f32,
    /// Unused part of the step, expressed in the final triangle's frame.
    pub remaining: Vec3,
    /// Number of edges crossed.
    pub crossings: u32,
    /// The walk stopped against a boundary edge (or could not move at all).
    pub blocked: bool,
    /// The iteration cap ran out with step left over.
    pub exhausted: bool,
}

/// Move `start` by `step` across as many triangles as needed.
///
/// Never fails: walls, degenerate steps and the iteration cap all end the
/// walk early at the best point reached, flagged in the outcome.
pub fn walk(mesh: &WalkMesh, start: WalkPoint, step: Vec3, settings: &WalkSettings) -> WalkOutcome {
    let mut out = WalkOutcome {
        at: start,
        rotation: Quat::IDENTITY,
        consumed: 0.0,
        remaining: step,
        crossings: 0,
        blocked: false,
        exhausted: false,
    };

    if step == Vec3::ZERO {
        out.consumed = 1.0;
        return out;
    }

    let mut finished = false;
    for _ in 0..settings.max_iterations {
        if out.remaining == Vec3::ZERO {
            finished = true;
            break;
        }

        let (end, time) = mesh.walk_in_triangle(&out.at, out.remaining);
        out.at = end;
        out.consumed += (1.0 - out.consumed) * time;

        if time == 1.0 {
            out.remaining = Vec3::ZERO;
            finished = true;
            break;
        }
        out.remaining *= 1.0 - time;

        // No exit edge was found; walk_in_triangle has already logged why.
        if !out.at.is_on_edge() {
            out.blocked = true;
            finished = true;
            break;
        }

        match mesh.cross_edge(&out.at) {
            Some((next, rotation)) => {
                log::debug!("walk: crossed edge ({}, {})", next.indices.y, next.indices.x);
                out.at = next;
                out.rotation = rotation * out.rotation;
                out.remaining = rotation * out.remaining;
                out.crossings += 1;
            }
            None => match settings.wall {
                WallResponse::Stop => {
                    out.blocked = true;
                    finished = true;
                    break;
                }
                WallResponse::Slide => {
                    out.remaining = deflect_off_wall(mesh, &out.at, out.remaining);
                }
            },
        }
    }

    if !finished && out.remaining != Vec3::ZERO {
        out.exhausted = true;
        log::warn!(
            "walk: gave up after {} iterations with {} of the step left ({} crossings)",
            settings.max_iterations,
            out.remaining,
            out.crossings,
        );
    }

    out
}

/// Remove the part of `step` that points out through the edge `indices.x`–`indices.y`.
fn deflect_off_wall(mesh: &WalkMesh, at: &WalkPoint, step: Vec3) -> Vec3 {
    let v = mesh.vertices();
    let a = v[at.indices.x as usize];
    let b = v[at.indices.y as usize];
    let c = v[at.indices.z as usize];

    let along = (b - a).normalize();
    let normal = (b - a).cross(c - a).normalize();
    let inward = normal.cross(along);

    let d = step.dot(inward);
    if d < 0.0 {
        step + (-WALL_BOUNCE * d) * inward
    } else {
        step + (WALL_NUDGE * d) * inward
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::UVec3;

    fn triangle() -> WalkMesh {
        WalkMesh::new(
            vec![Vec3::ZERO, Vec3::new(4.0, 0.0, 0.0), Vec3::new(0.0, 4.0, 0.0)],
            vec![Vec3::Z; 3],
            vec![UVec3::new(0, 1, 2)],
        )
        .unwrap()
    }

    #[test]
    fn deflection_keeps_tangential_part() {
        let mesh = triangle();
        // On edge (0, 1) along the X axis; inward is +Y.
        let at = WalkPoint::new(UVec3::new(0, 1, 2), Vec3::new(0.5, 0.5, 0.0));
        let step = deflect_off_wall(&mesh, &at, Vec3::new(1.0, -2.0, 0.0));
        assert!((step.x - 1.0).abs() < 1e-5);
        assert!((step.y - 0.5).abs() < 1e-5);
    }

    #[test]
    fn non_finite_step_blocks_in_place() {
        let mesh = triangle();
        let start = WalkPoint::new(UVec3::new(0, 1, 2), Vec3::splat(1.0 / 3.0));
        let out = walk(&mesh, start, Vec3::new(f32::NAN, 1.0, 0.0), &WalkSettings::default());
        assert!(out.blocked);
        assert!(!out.exhausted);
        assert_eq!(out.at, start);
        assert_eq!(out.consumed, 0.0);
        assert_eq!(out.crossings, 0);
    }

    #[test]
    fn drifted_start_blocks_in_place() {
        let mesh = triangle();
        let start = WalkPoint::new(UVec3::new(0, 1, 2), Vec3::new(1.2, -0.1, -0.1));
        let out = walk(&mesh, start, Vec3::X * 0.1, &WalkSettings { wall: WallResponse::Slide, ..Default::default() });
        assert!(out.blocked);
        assert_eq!(out.at, start);
        assert_eq!(out.consumed, 0.0);
    }

    #[test]
    fn zero_step_is_fully_consumed() {
        let mesh = triangle();
        let start = WalkPoint::new(UVec3::new(0, 1, 2), Vec3::splat(1.0 / 3.0));
        let out = walk(&mesh, start, Vec3::ZERO, &WalkSettings::default());
        assert_eq!(out.at, start);
        assert_eq!(out.consumed, 1.0);
        assert!(!out.blocked && !out.exhausted);
    }
}
