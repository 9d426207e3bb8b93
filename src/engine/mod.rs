// Engine module - walk mesh navigation and the ECS glue that drives agents over it.

pub mod chunk;
pub mod components;
pub mod error;
pub mod geometry;
pub mod mesh;
pub mod systems;
pub mod walk_mesh;
pub mod walk_meshes;
pub mod walker;

// Re-export commonly used items
pub use components::*;
pub use error::{WalkMeshError, WalkMeshResult};
pub use walk_mesh::{WalkMesh, WalkPoint};
pub use walk_meshes::WalkMeshes;
pub use walker::{walk, WalkOutcome, WalkSettings, WallResponse};
