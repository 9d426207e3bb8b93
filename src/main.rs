// Headless driver for walk mesh assets.
//
//   walk_mesh info <asset>                          list meshes in an asset
//   walk_mesh walk <asset> <mesh> [agents] [frames] simulate agents at 60 Hz
//   walk_mesh demo-asset <out>                      write a two-mesh sample asset
//
// Logging goes through env_logger; set RUST_LOG=debug for per-mesh details.

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use bevy_ecs::prelude::*;
use rand::Rng;
use structopt::StructOpt;

use walk_mesh::engine::chunk::WalkMeshAsset;
use walk_mesh::engine::mesh::{grid_surface, triangulate_smooth};
use walk_mesh::engine::systems::walk_agents_system;
use walk_mesh::engine::{FrameTime, Transform, Velocity, WalkAgent, WalkSettings, WallResponse};
use walk_mesh::{WalkMeshError, WalkMeshResult, WalkMeshes};

// ============================================================================
// CONSTANTS
// ============================================================================

/// Fixed simulation step.
const FRAME_DT: f32 = 1.0 / 60.0;
/// Walking speed of spawned agents, world units per second.
const AGENT_SPEED: f32 = 1.5;

// ============================================================================
// ARGUMENTS
// ============================================================================

#[derive(StructOpt, Debug)]
#[structopt(name = "walk_mesh", about = "Headless driver for walk mesh assets.")]
enum Command {
    /// List the meshes stored in an asset file.
    Info {
        /// Path to the walk mesh asset.
        asset: PathBuf,
    },

    /// Spawn agents at random on one mesh and simulate them at 60 Hz.
    Walk {
        /// Path to the walk mesh asset.
        asset: PathBuf,

        /// Name of the mesh to walk on.
        mesh: String,

        /// Number of agents to spawn.
        #[structopt(default_value = "16")]
        agents: usize,

        /// Number of frames to simulate.
        #[structopt(default_value = "600")]
        frames: u32,
    },

    /// Write a sample asset holding a flat floor and a pitched roof.
    DemoAsset {
        /// Output path.
        out: PathBuf,
    },
}

// ============================================================================
// COMMANDS
// ============================================================================

fn info(path: &Path) -> WalkMeshResult<()> {
    let meshes = WalkMeshes::load(path)?;
    for name in meshes.names() {
        let mesh = meshes.lookup(name)?;
        log::info!(
            "{name}: {} vertices, {} triangles, {} boundary edges",
            mesh.vertex_count(),
            mesh.triangle_count(),
            mesh.boundary_edges().count(),
        );
    }
    if meshes.trailing_bytes() > 0 {
        log::info!("{} trailing bytes ignored", meshes.trailing_bytes());
    }
    Ok(())
}

fn simulate(path: &Path, mesh_name: &str, agents: usize, frames: u32) -> WalkMeshResult<()> {
    let meshes = WalkMeshes::load(path)?;
    let mesh = meshes.lookup(mesh_name)?;
    if mesh.triangle_count() == 0 {
        return Err(WalkMeshError::EmptyMesh);
    }

    let mut rng = rand::thread_rng();
    let mut world = World::new();

    for _ in 0..agents {
        // Uniform point in a random triangle (fold the unit square onto the triangle).
        let tri = mesh.triangles()[rng.gen_range(0..mesh.triangle_count())];
        let (mut u, mut v) = (rng.gen_range(0.0..1.0f32), rng.gen_range(0.0..1.0f32));
        if u + v > 1.0 {
            (u, v) = (1.0 - u, 1.0 - v);
        }
        let [a, b, c] = tri.to_array().map(|i| mesh.vertices()[i as usize]);
        let spawn = a + (b - a) * u + (c - a) * v;

        let agent = WalkAgent::spawn_on(&meshes, mesh_name, spawn)?;
        let (t1, t2) = mesh.to_world_triangle_normal(&agent.at).any_orthonormal_pair();
        let heading = rng.gen_range(0.0..std::f32::consts::TAU);
        let velocity = (t1 * heading.cos() + t2 * heading.sin()) * AGENT_SPEED;

        world.spawn((
            Transform::from_position(mesh.to_world_point(&agent.at)),
            Velocity::new(velocity),
            agent,
        ));
    }
    log::info!("spawned {agents} agents on '{mesh_name}'");

    world.insert_resource(meshes);
    world.insert_resource(WalkSettings { wall: WallResponse::Slide, ..Default::default() });
    world.insert_resource(FrameTime { delta: FRAME_DT });

    let mut schedule = Schedule::default();
    schedule.add_systems(walk_agents_system);
    for _ in 0..frames {
        schedule.run(&mut world);
    }

    let mut query = world.query::<(Entity, &Transform, &Velocity)>();
    for (entity, transform, velocity) in query.iter(&world) {
        log::info!("{entity:?}: at {} moving {}", transform.position, velocity.linear);
    }
    Ok(())
}

fn demo_asset(out: &Path) -> WalkMeshResult<()> {
    let mut asset = WalkMeshAsset::new();

    let floor = grid_surface(8, 8, 1.0, |_, _| 0.0);
    let (normals, triangles) = triangulate_smooth(&floor);
    asset.push_mesh("floor", &floor.positions, &normals, &triangles);

    // Pitched roof: walking across x = 0 crosses a crease between two planes.
    let ridge = grid_surface(8, 4, 1.0, |x, _| 2.0 - 0.5 * x.abs());
    let (normals, triangles) = triangulate_smooth(&ridge);
    asset.push_mesh("ridge", &ridge.positions, &normals, &triangles);

    // Validate before writing so a broken generator never produces an asset.
    WalkMeshes::from_asset(&asset)?;

    let mut writer = BufWriter::new(File::create(out)?);
    asset.write_to(&mut writer)?;
    log::info!("wrote demo walk mesh asset to '{}'", out.display());
    Ok(())
}

// ============================================================================
// MAIN
// ============================================================================

fn main() -> ExitCode {
    env_logger::init();

    let result = match Command::from_args() {
        Command::Info { asset } => info(&asset),
        Command::Walk { asset, mesh, agents, frames } => simulate(&asset, &mesh, agents, frames),
        Command::DemoAsset { out } => demo_asset(&out),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
