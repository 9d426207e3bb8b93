// Error types for walk mesh construction, asset loading and lookup.
//
// Everything here is the fatal tier: a corrupt asset or a programmer error.
// Runtime conditions (hitting a boundary, running out of walk iterations,
// trailing asset bytes) are reported through return values and `log::warn!`.

use thiserror::Error;

/// Unified error type for the walk mesh engine.
#[derive(Debug, Error)]
pub enum WalkMeshError {
    /// Underlying read or write failed (includes truncated chunks).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A chunk header carried a different tag than the one expected at this position.
    #[error("expected chunk '{expected}', found '{found}'")]
    ChunkTag { expected: String, found: String },

    /// A chunk's byte length is not a whole number of records.
    #[error("chunk '{tag}' has {size} bytes, not a multiple of the {record}-byte record size")]
    ChunkSize { tag: String, size: usize, record: usize },

    #[error("{vertices} vertex positions but {normals} vertex normals")]
    VertexNormalMismatch { vertices: usize, normals: usize },

    #[error("triangle {triangle} references vertex {index}, but the mesh has {vertex_count} vertices")]
    TriangleIndexOutOfRange { triangle: usize, index: u32, vertex_count: usize },

    /// Zero-area triangle: no geometric normal exists.
    #[error("triangle {triangle} is degenerate (zero area)")]
    DegenerateTriangle { triangle: usize },

    /// A stored vertex normal disagrees with the winding of a triangle using it.
    #[error("triangle {triangle}: vertex {vertex} normal disagrees with the geometric normal (dot = {dot:.3})")]
    InconsistentNormal { triangle: usize, vertex: u32, dot: f32 },

    /// The same directed edge belongs to two triangles (non-manifold or mis-wound mesh).
    #[error("directed edge ({from}, {to}) appears in more than one triangle")]
    DuplicateEdge { from: u32, to: u32 },

    #[error("index entry {entry}: name range [{begin}, {end}) is invalid for {len} name bytes")]
    InvalidNameRange { entry: usize, begin: u32, end: u32, len: usize },

    #[error("index entry {entry}: vertex range [{begin}, {end}) is invalid for {len} vertices")]
    InvalidVertexRange { entry: usize, begin: u32, end: u32, len: usize },

    #[error("index entry {entry}: triangle range [{begin}, {end}) is invalid for {len} triangles")]
    InvalidTriangleRange { entry: usize, begin: u32, end: u32, len: usize },

    /// A triangle inside a partition references a vertex outside that partition.
    #[error("walk mesh '{name}': triangle {triangle} leaves the vertex range [{begin}, {end})")]
    TriangleOutsidePartition { name: String, triangle: usize, begin: u32, end: u32 },

    #[error("index entry {entry}: mesh name is not valid UTF-8")]
    InvalidName { entry: usize },

    #[error("walk mesh '{0}' appears more than once")]
    DuplicateName(String),

    #[error("walk mesh '{0}' not found")]
    MeshNotFound(String),

    /// Nearest-point query on a mesh without triangles.
    #[error("cannot query an empty walk mesh")]
    EmptyMesh,
}

/// Convenience alias for `Result<T, WalkMeshError>`.
pub type WalkMeshResult<T> = Result<T, WalkMeshError>;
