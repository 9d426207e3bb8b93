// Named collection of walk meshes loaded from one chunked asset file.
//
// The asset stores every mesh in shared position/normal/triangle arrays. The
// index chunk carves them into named partitions; each partition must only
// reference its own vertices and becomes an independent WalkMesh.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use bevy_ecs::prelude::*;
use glam::{UVec3, Vec3};

use super::chunk::WalkMeshAsset;
use super::error::{WalkMeshError, WalkMeshResult};
use super::walk_mesh::WalkMesh;

/// All walk meshes of one asset, keyed by name. Read-only after loading.
#[derive(Resource, Debug, Clone, Default)]
pub struct WalkMeshes {
    meshes: HashMap<String, WalkMesh>,
    /// Bytes found after the index chunk when loading. Zero for a clean asset.
    trailing_bytes: usize,
}

impl WalkMeshes {
    /// Load every walk mesh from an asset file.
    pub fn load(path: impl AsRef<Path>) -> WalkMeshResult<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file), &path.display().to_string())
    }

    /// Load from any byte stream. `label` names the source in log messages.
    pub fn from_reader<R: Read>(mut reader: R, label: &str) -> WalkMeshResult<Self> {
        let asset = WalkMeshAsset::read_from(&mut reader)?;

        let trailing_bytes = std::io::copy(&mut reader, &mut std::io::sink())? as usize;
        if trailing_bytes > 0 {
            log::warn!("{trailing_bytes} bytes of trailing data in walk mesh asset '{label}'");
        }

        let mut meshes = Self::from_asset(&asset)?;
        meshes.trailing_bytes = trailing_bytes;
        log::info!("loaded {} walk meshes from '{label}'", meshes.len());
        Ok(meshes)
    }

    /// Split a decoded asset into its named meshes.
    pub fn from_asset(asset: &WalkMeshAsset) -> WalkMeshResult<Self> {
        if asset.positions.len() != asset.normals.len() {
            return Err(WalkMeshError::VertexNormalMismatch {
                vertices: asset.positions.len(),
                normals: asset.normals.len(),
            });
        }

        let mut meshes = HashMap::with_capacity(asset.index.len());

        for (entry_idx, e) in asset.index.iter().enumerate() {
            if !(e.name_begin <= e.name_end && e.name_end as usize <= asset.names.len()) {
                return Err(WalkMeshError::InvalidNameRange {
                    entry: entry_idx,
                    begin: e.name_begin,
                    end: e.name_end,
                    len: asset.names.len(),
                });
            }
            if !(e.vertex_begin <= e.vertex_end && e.vertex_end as usize <= asset.positions.len()) {
                return Err(WalkMeshError::InvalidVertexRange {
                    entry: entry_idx,
                    begin: e.vertex_begin,
                    end: e.vertex_end,
                    len: asset.positions.len(),
                });
            }
            if !(e.triangle_begin <= e.triangle_end && e.triangle_end as usize <= asset.triangles.len()) {
                return Err(WalkMeshError::InvalidTriangleRange {
                    entry: entry_idx,
                    begin: e.triangle_begin,
                    end: e.triangle_end,
                    len: asset.triangles.len(),
                });
            }

            let name = std::str::from_utf8(&asset.names[e.name_begin as usize..e.name_end as usize])
                .map_err(|_| WalkMeshError::InvalidName { entry: entry_idx })?
                .to_string();

            let vertex_range = e.vertex_begin as usize..e.vertex_end as usize;
            let vertices: Vec<Vec3> = asset.positions[vertex_range.clone()].iter().map(|&p| Vec3::from(p)).collect();
            let normals: Vec<Vec3> = asset.normals[vertex_range].iter().map(|&n| Vec3::from(n)).collect();

            let partition = e.vertex_begin..e.vertex_end;
            let mut triangles = Vec::with_capacity((e.triangle_end - e.triangle_begin) as usize);
            for ti in e.triangle_begin as usize..e.triangle_end as usize {
                let tri = asset.triangles[ti];
                if !tri.iter().all(|i| partition.contains(i)) {
                    return Err(WalkMeshError::TriangleOutsidePartition {
                        name,
                        triangle: ti,
                        begin: e.vertex_begin,
                        end: e.vertex_end,
                    });
                }
                triangles.push(UVec3::from(tri) - UVec3::splat(e.vertex_begin));
            }

            if meshes.contains_key(&name) {
                return Err(WalkMeshError::DuplicateName(name));
            }
            let mesh = WalkMesh::new(vertices, normals, triangles)?;
            log::debug!("walk mesh '{name}': {} vertices, {} triangles", mesh.vertex_count(), mesh.triangle_count());
            meshes.insert(name, mesh);
        }

        Ok(Self { meshes, trailing_bytes: 0 })
    }

    /// The mesh called `name`; a missing mesh is an error.
    pub fn lookup(&self, name: &str) -> WalkMeshResult<&WalkMesh> {
        self.meshes.get(name).ok_or_else(|| WalkMeshError::MeshNotFound(name.to_string()))
    }

    pub fn get(&self, name: &str) -> Option<&WalkMesh> {
        self.meshes.get(name)
    }

    /// Mesh names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.meshes.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &WalkMesh)> {
        self.meshes.iter().map(|(name, mesh)| (name.as_str(), mesh))
    }

    pub fn len(&self) -> usize { self.meshes.len() }
    pub fn is_empty(&self) -> bool { self.meshes.is_empty() }

    /// Number of unread bytes that followed the index chunk.
    pub fn trailing_bytes(&self) -> usize { self.trailing_bytes }

    /// Register a mesh built in code. Fails if the name is taken.
    pub fn insert(&mut self, name: impl Into<String>, mesh: WalkMesh) -> WalkMeshResult<()> {
        let name = name.into();
        if self.meshes.contains_key(&name) {
            return Err(WalkMeshError::DuplicateName(name));
        }
        self.meshes.insert(name, mesh);
        Ok(())
    }
}
