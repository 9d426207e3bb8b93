// Walk mesh navigation: barycentric agent tracking over a triangulated surface.
// The `engine` module holds the reusable pieces; `main.rs` is a headless driver.

pub mod engine;

pub use engine::{
    WalkMesh, WalkMeshError, WalkMeshResult, WalkMeshes, WalkOutcome, WalkPoint, WalkSettings,
    WallResponse,
};
