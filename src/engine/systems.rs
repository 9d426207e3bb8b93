// ECS systems for updating walking agents.
// Systems operate on entities with specific component combinations.

use bevy_ecs::prelude::*;
use glam::Vec3;

use super::components::*;
use super::walk_meshes::WalkMeshes;
use super::walker::{walk, WalkSettings, WallResponse};

/// Advance every walking agent by `velocity * delta` along its walk mesh.
///
/// The agent's WalkPoint is the source of truth; `Transform::position` is
/// rewritten from it and any reorientation picked up while crossing edges is
/// applied to both the transform and the velocity. Agents stopped by a wall
/// lose their velocity when the wall response is `Stop`.
pub fn walk_agents_system(
    meshes: Res<WalkMeshes>,
    settings: Res<WalkSettings>,
    time: Res<FrameTime>,
    mut query: Query<(&mut WalkAgent, &mut Transform, &mut Velocity)>,
) {
    for (mut agent, mut transform, mut velocity) in query.iter_mut() {
        let Some(mesh) = meshes.get(&agent.mesh) else {
            log::error!("walk agent references missing walk mesh '{}'", agent.mesh);
            continue;
        };

        let outcome = walk(mesh, agent.at, velocity.linear * time.delta, &settings);

        agent.at = outcome.at;
        transform.position = mesh.to_world_point(&outcome.at);
        transform.rotation = outcome.rotation * transform.rotation;
        velocity.linear = outcome.rotation * velocity.linear;

        if outcome.blocked && settings.wall == WallResponse::Stop {
            velocity.linear = Vec3::ZERO;
        }
    }
}
