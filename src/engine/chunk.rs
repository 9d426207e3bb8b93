// Tagged chunk container used by walk mesh asset files.
//
// Layout of one chunk:
//   [4 bytes]  ASCII tag, e.g. b"tri0"
//   [4 bytes]  u32 body length in bytes (little-endian)
//   [N bytes]  packed records of one fixed-size Pod type
//
// Bodies are copied straight into `Vec<T>` with bytemuck, so record fields are
// in native byte order (little-endian on every target we ship).

use std::io::{Read, Write};

use bytemuck::{Pod, Zeroable};
use glam::{UVec3, Vec3};

use super::error::{WalkMeshError, WalkMeshResult};

// ============================================================================
// CHUNK TAGS
// ============================================================================

pub const POSITIONS_TAG: &[u8; 4] = b"p...";
pub const NORMALS_TAG: &[u8; 4] = b"n...";
pub const TRIANGLES_TAG: &[u8; 4] = b"tri0";
pub const NAMES_TAG: &[u8; 4] = b"str0";
pub const INDEX_TAG: &[u8; 4] = b"idxA";

fn tag_str(tag: &[u8; 4]) -> String {
    String::from_utf8_lossy(tag).into_owned()
}

// ============================================================================
// READ / WRITE
// ============================================================================

/// Read one chunk with the given tag and decode its body as records of `T`.
pub fn read_chunk<T: Pod, R: Read>(reader: &mut R, tag: &[u8; 4]) -> WalkMeshResult<Vec<T>> {
    let mut header = [0u8; 8];
    reader.read_exact(&mut header)?;

    let found: [u8; 4] = [header[0], header[1], header[2], header[3]];
    if &found != tag {
        return Err(WalkMeshError::ChunkTag { expected: tag_str(tag), found: tag_str(&found) });
    }

    let size = u32::from_le_bytes([header[4], header[5], header[6], header[7]]) as usize;
    let record = std::mem::size_of::<T>();
    if size % record != 0 {
        return Err(WalkMeshError::ChunkSize { tag: tag_str(tag), size, record });
    }

    // Grow with the data actually present instead of trusting the header's size.
    let mut body = Vec::new();
    reader.by_ref().take(size as u64).read_to_end(&mut body)?;
    if body.len() < size {
        return Err(std::io::Error::new(
            std::io::ErrorKind::UnexpectedEof,
            format!("chunk '{}' claims {size} bytes but only {} remain", tag_str(tag), body.len()),
        )
        .into());
    }
    // The byte buffer has no alignment guarantee, so copy rather than cast in place.
    Ok(bytemuck::pod_collect_to_vec(&body))
}

/// Write `records` as one chunk with the given tag.
pub fn write_chunk<T: Pod, W: Write>(writer: &mut W, tag: &[u8; 4], records: &[T]) -> WalkMeshResult<()> {
    let body: &[u8] = bytemuck::cast_slice(records);
    let size = u32::try_from(body.len()).map_err(|_| {
        std::io::Error::new(std::io::ErrorKind::InvalidInput, format!("chunk '{}' is larger than 4 GiB", tag_str(tag)))
    })?;
    writer.write_all(tag)?;
    writer.write_all(&size.to_le_bytes())?;
    writer.write_all(body)?;
    Ok(())
}

// ============================================================================
// RAW ASSET
// ============================================================================

/// One row of the `idxA` chunk: half-open ranges into the shared arrays.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Pod, Zeroable)]
pub struct IndexEntry {
    pub name_begin: u32,
    pub name_end: u32,
    pub vertex_begin: u32,
    pub vertex_end: u32,
    pub triangle_begin: u32,
    pub triangle_end: u32,
}

/// The five arrays of a walk mesh asset, exactly as stored on disk.
///
/// No validation happens here; `WalkMeshes::from_asset` checks the index
/// ranges and builds the meshes.
#[derive(Debug, Clone, Default)]
pub struct WalkMeshAsset {
    pub positions: Vec<[f32; 3]>,
    pub normals:   Vec<[f32; 3]>,
    pub triangles: Vec<[u32; 3]>,
    pub names:     Vec<u8>,
    pub index:     Vec<IndexEntry>,
}

impl WalkMeshAsset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read the five chunks in file order. Bytes after the index chunk are left unread.
    pub fn read_from<R: Read>(reader: &mut R) -> WalkMeshResult<Self> {
        Ok(Self {
            positions: read_chunk(reader, POSITIONS_TAG)?,
            normals:   read_chunk(reader, NORMALS_TAG)?,
            triangles: read_chunk(reader, TRIANGLES_TAG)?,
            names:     read_chunk(reader, NAMES_TAG)?,
            index:     read_chunk(reader, INDEX_TAG)?,
        })
    }

    pub fn write_to<W: Write>(&self, writer: &mut W) -> WalkMeshResult<()> {
        write_chunk(writer, POSITIONS_TAG, &self.positions)?;
        write_chunk(writer, NORMALS_TAG, &self.normals)?;
        write_chunk(writer, TRIANGLES_TAG, &self.triangles)?;
        write_chunk(writer, NAMES_TAG, &self.names)?;
        write_chunk(writer, INDEX_TAG, &self.index)?;
        Ok(())
    }

    /// Serialize into a fresh byte buffer.
    pub fn to_bytes(&self) -> WalkMeshResult<Vec<u8>> {
        let mut bytes = Vec::new();
        self.write_to(&mut bytes)?;
        Ok(bytes)
    }

    /// Append a named partition. `triangles` index into `vertices` (local
    /// indices) and are rebased onto the shared vertex array.
    pub fn push_mesh(&mut self, name: &str, vertices: &[Vec3], normals: &[Vec3], triangles: &[UVec3]) {
        let vertex_begin = self.positions.len() as u32;
        let entry = IndexEntry {
            name_begin: self.names.len() as u32,
            name_end: (self.names.len() + name.len()) as u32,
            vertex_begin,
            vertex_end: vertex_begin + vertices.len() as u32,
            triangle_begin: self.triangles.len() as u32,
            triangle_end: (self.triangles.len() + triangles.len()) as u32,
        };

        self.names.extend_from_slice(name.as_bytes());
        self.positions.extend(vertices.iter().map(|v| v.to_array()));
        self.normals.extend(normals.iter().map(|n| n.to_array()));
        self.triangles.extend(triangles.iter().map(|t| (*t + UVec3::splat(vertex_begin)).to_array()));
        self.index.push(entry);
    }
}
