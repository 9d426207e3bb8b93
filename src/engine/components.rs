// ECS components and resources for agents that walk on walk meshes.

use bevy_ecs::prelude::*;
use glam::{Quat, Vec3};

use super::error::WalkMeshResult;
use super::walk_mesh::WalkPoint;
use super::walk_meshes::WalkMeshes;

/// Pose of an entity in world space.
/// Walking agents have it rewritten from their WalkPoint every frame.
#[derive(Component, Debug, Clone, Copy)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
        }
    }
}

impl Transform {
    pub fn from_position(position: Vec3) -> Self {
        Self { position, ..Default::default() }
    }
}

/// Desired world-space velocity (units per second).
/// Rotated along with the agent when it walks over a crease in the mesh.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Velocity {
    pub linear: Vec3,
}

impl Velocity {
    pub fn new(linear: Vec3) -> Self {
        Self { linear }
    }
}

/// An entity constrained to the surface of a named walk mesh.
#[derive(Component, Debug, Clone)]
pub struct WalkAgent {
    /// Key into the `WalkMeshes` resource.
    pub mesh: String,
    pub at: WalkPoint,
}

impl WalkAgent {
    /// Place an agent on `mesh` at the surface point closest to `position`.
    /// Fails if the mesh does not exist or has no triangles.
    pub fn spawn_on(meshes: &WalkMeshes, mesh: &str, position: Vec3) -> WalkMeshResult<Self> {
        let at = meshes.lookup(mesh)?.nearest_walk_point(position)?;
        Ok(Self { mesh: mesh.to_string(), at })
    }
}

/// Seconds elapsed since the previous frame.
#[derive(Resource, Debug, Clone, Copy)]
pub struct FrameTime {
    pub delta: f32,
}
