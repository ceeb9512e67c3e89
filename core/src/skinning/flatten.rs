//! Scene flattening.
//!
//! Collapses every mesh of a [`Scene`] into one vertex array and one index
//! array with globally rebased indices, deduplicates materials by source
//! index and bones by name.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use crate::error::{AssetErrorKind, AssetLoadError};
use crate::import::asset_folder;
use crate::math::{mat4_from_array, Mat4};
use crate::scene::{Scene, SceneMesh, TextureChannel};

use super::vertex::{InfluenceSlots, SkinnedVertex};

/// Sub-range of the flattened buffers occupied by one source mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MeshRange {
    /// First vertex in the global vertex array.
    pub base_vertex: u32,
    /// Number of vertices.
    pub vertex_count: u32,
    /// First index in the global index array.
    pub base_index: u32,
    /// Number of indices.
    pub index_count: u32,
    /// Source material index.
    pub material: usize,
}

/// A texture to load for one (material, channel, slot) triple.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureRequest {
    /// Source material index.
    pub material: usize,
    /// Texture channel.
    pub channel: TextureChannel,
    /// Position within the channel's image list.
    pub slot: usize,
    /// Full path, resolved against the model's folder.
    pub path: PathBuf,
}

/// Loaded images of one source material, grouped by channel.
#[derive(Debug, Clone, PartialEq)]
pub struct Material<H> {
    images: BTreeMap<TextureChannel, Vec<H>>,
}

impl<H> Default for Material<H> {
    fn default() -> Self {
        Self {
            images: BTreeMap::new(),
        }
    }
}

impl<H> Material<H> {
    /// Set the images of a channel.
    #[must_use]
    pub fn with_images(mut self, channel: TextureChannel, images: Vec<H>) -> Self {
        self.images.insert(channel, images);
        self
    }

    /// Images of a channel, in slot order.
    pub fn images(&self, channel: TextureChannel) -> &[H] {
        self.images
            .get(&channel)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Largest image count over all channels, at least one.
    ///
    /// Each slot index below this value gets its own descriptor set.
    pub fn max_images(&self) -> usize {
        self.images.values().map(Vec::len).max().unwrap_or(0).max(1)
    }

    /// Total number of images.
    pub fn image_count(&self) -> usize {
        self.images.values().map(Vec::len).sum()
    }

    fn push(&mut self, channel: TextureChannel, image: H) {
        self.images.entry(channel).or_default().push(image);
    }
}

/// Global bone registry: one index and one offset matrix per bone name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoneTable {
    indices: HashMap<String, u32>,
    names: Vec<String>,
    offsets: Vec<Mat4>,
}

impl BoneTable {
    /// Index of a bone, assigning the next index on first encounter.
    ///
    /// The offset matrix is recorded only for the first encounter.
    pub fn register(&mut self, name: &str, offset: Mat4) -> u32 {
        if let Some(&index) = self.indices.get(name) {
            return index;
        }
        let index = self.names.len() as u32;
        log::debug!("Bone {:?} assigned index {}", name, index);
        self.indices.insert(name.to_owned(), index);
        self.names.push(name.to_owned());
        self.offsets.push(offset);
        index
    }

    /// Index of a known bone.
    pub fn index(&self, name: &str) -> Option<u32> {
        self.indices.get(name).copied()
    }

    /// Bone names in index order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Inverse bind-pose matrices in index order.
    pub fn offsets(&self) -> &[Mat4] {
        &self.offsets
    }

    /// Number of distinct bones.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether no bone has been registered.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// GPU-ready data extracted from a [`Scene`].
#[derive(Debug, Clone)]
pub struct FlattenedScene<H> {
    /// All vertices, mesh after mesh.
    pub vertices: Vec<SkinnedVertex>,
    /// All indices, rebased to global vertex positions.
    pub indices: Vec<u32>,
    /// One range per source mesh, in source mesh order.
    pub meshes: Vec<MeshRange>,
    /// Materials keyed by source material index.
    pub materials: BTreeMap<usize, Material<H>>,
    /// Bones discovered across all meshes.
    pub bones: BoneTable,
    /// Sampler descriptor slots needed by all materials.
    pub sampler_slots: u32,
    /// Bone influences dropped because a vertex had no free slot.
    pub dropped_influences: usize,
}

impl<H> FlattenedScene<H> {
    /// Material used by a mesh range.
    pub fn material(&self, mesh: &MeshRange) -> Option<&Material<H>> {
        self.materials.get(&mesh.material)
    }
}

struct Flattener<'a, H, F> {
    scene: &'a Scene,
    path: &'a Path,
    folder: PathBuf,
    channels: &'a [TextureChannel],
    load_texture: F,
    out: FlattenedScene<H>,
    slots: InfluenceSlots,
}

/// Flatten `scene` into contiguous vertex and index arrays.
///
/// Every mesh is processed exactly once: meshes reachable from the root in
/// depth-first order first, then any mesh no node references. Textures of
/// the enabled `channels` are requested once per distinct material through
/// `load_texture`, with paths resolved relative to the folder of `path`.
///
/// # Errors
///
/// Fails on dangling mesh, material, face or weight indices, and propagates
/// any error returned by `load_texture`.
pub fn flatten_scene<H, E, F>(
    scene: &Scene,
    path: &Path,
    channels: &[TextureChannel],
    load_texture: F,
) -> Result<FlattenedScene<H>, E>
where
    F: FnMut(&TextureRequest) -> Result<H, E>,
    E: From<AssetLoadError>,
{
    let meshes = mesh_ranges(&scene.meshes);
    let vertex_count = meshes.iter().map(|m| m.vertex_count as usize).sum();
    let index_count = meshes.iter().map(|m| m.index_count as usize).sum();

    let mut flattener = Flattener {
        scene,
        path,
        folder: asset_folder(path),
        channels,
        load_texture,
        out: FlattenedScene {
            vertices: vec![SkinnedVertex::default(); vertex_count],
            indices: vec![0; index_count],
            meshes,
            materials: BTreeMap::new(),
            bones: BoneTable::default(),
            sampler_slots: 0,
            dropped_influences: 0,
        },
        slots: InfluenceSlots::new(vertex_count),
    };

    let mut visited = vec![false; scene.meshes.len()];
    for id in scene.depth_first() {
        let node = scene.node(id);
        for &mesh in &node.meshes {
            if mesh >= scene.meshes.len() {
                return Err(flattener.fail(AssetErrorKind::InvalidMeshReference {
                    node: node.name.clone(),
                    mesh,
                }));
            }
            if !std::mem::replace(&mut visited[mesh], true) {
                flattener.process_mesh(mesh)?;
            }
        }
    }
    for mesh in 0..scene.meshes.len() {
        if !visited[mesh] {
            log::debug!("Mesh {} is not referenced by any node", mesh);
            flattener.process_mesh(mesh)?;
        }
    }

    let out = flattener.out;
    if out.dropped_influences > 0 {
        log::warn!(
            "{}: dropped {} bone influences beyond the per-vertex limit",
            path.display(),
            out.dropped_influences
        );
    }
    log::debug!(
        "Flattened {}: {} vertices, {} indices, {} meshes, {} materials, {} bones",
        path.display(),
        out.vertices.len(),
        out.indices.len(),
        out.meshes.len(),
        out.materials.len(),
        out.bones.len()
    );
    Ok(out)
}

/// Assign each mesh its base vertex and base index, in source order.
pub fn mesh_ranges(meshes: &[SceneMesh]) -> Vec<MeshRange> {
    let mut base_vertex = 0;
    let mut base_index = 0;
    meshes
        .iter()
        .map(|mesh| {
            let range = MeshRange {
                base_vertex,
                vertex_count: mesh.vertex_count,
                base_index,
                index_count: mesh.index_count(),
                material: mesh.material,
            };
            base_vertex += range.vertex_count;
            base_index += range.index_count;
            range
        })
        .collect()
}

impl<H, E, F> Flattener<'_, H, F>
where
    F: FnMut(&TextureRequest) -> Result<H, E>,
    E: From<AssetLoadError>,
{
    fn fail(&self, kind: AssetErrorKind) -> E {
        AssetLoadError::new(self.path, kind).into()
    }

    fn process_mesh(&mut self, index: usize) -> Result<(), E> {
        let scene = self.scene;
        let mesh = &scene.meshes[index];
        let range = self.out.meshes[index];
        self.copy_vertices(mesh, &range);
        self.copy_indices(index, mesh, &range)?;
        self.load_material(index, mesh.material)?;
        self.add_bones(index, mesh, &range)
    }

    fn copy_vertices(&mut self, mesh: &SceneMesh, range: &MeshRange) {
        let base = range.base_vertex as usize;
        let count = range.vertex_count as usize;
        let vertices = &mut self.out.vertices[base..base + count];
        let with_tangents = mesh.has_tangents_and_bitangents();
        for (i, vertex) in vertices.iter_mut().enumerate() {
            if let Some(&p) = mesh.positions.get(i) {
                vertex.position = p;
            }
            if let Some(&n) = mesh.normals.get(i) {
                vertex.normal = n;
            }
            if with_tangents {
                if let (Some(&t), Some(&b)) = (mesh.tangents.get(i), mesh.bitangents.get(i)) {
                    vertex.tangent = t;
                    vertex.bitangent = b;
                }
            }
            if let Some(&uv) = mesh.tex_coords.get(i) {
                vertex.tex_coord = uv;
            }
        }
    }

    fn copy_indices(&mut self, index: usize, mesh: &SceneMesh, range: &MeshRange) -> Result<(), E> {
        let base = range.base_index as usize;
        for (face, triangle) in mesh.faces.iter().enumerate() {
            for (k, &local) in triangle.iter().enumerate() {
                if local >= mesh.vertex_count {
                    return Err(self.fail(AssetErrorKind::InvalidFace {
                        mesh: index,
                        face,
                        index: local,
                    }));
                }
                self.out.indices[base + face * 3 + k] = range.base_vertex + local;
            }
        }
        Ok(())
    }

    fn load_material(&mut self, mesh: usize, material: usize) -> Result<(), E> {
        if self.out.materials.contains_key(&material) {
            log::debug!("Material {} already loaded", material);
            return Ok(());
        }
        let scene = self.scene;
        let Some(source) = scene.materials.get(material) else {
            return Err(self.fail(AssetErrorKind::InvalidMaterial { mesh, material }));
        };

        let mut loaded = Material::default();
        for &channel in self.channels {
            for (slot, relative) in source.textures(channel).iter().enumerate() {
                let request = TextureRequest {
                    material,
                    channel,
                    slot,
                    path: self.folder.join(relative),
                };
                let image = (self.load_texture)(&request)?;
                loaded.push(channel, image);
            }
        }
        self.out.sampler_slots += self.channels.len().max(loaded.max_images()) as u32;
        log::debug!(
            "Material {} loaded with {} images",
            material,
            loaded.image_count()
        );
        self.out.materials.insert(material, loaded);
        Ok(())
    }

    fn add_bones(&mut self, index: usize, mesh: &SceneMesh, range: &MeshRange) -> Result<(), E> {
        for bone in &mesh.bones {
            let bone_index = self
                .out
                .bones
                .register(&bone.name, mat4_from_array(&bone.offset_matrix));
            for weight in &bone.weights {
                if weight.vertex >= mesh.vertex_count {
                    return Err(self.fail(AssetErrorKind::InvalidWeight {
                        mesh: index,
                        bone: bone.name.clone(),
                        vertex: weight.vertex,
                    }));
                }
                let global = (range.base_vertex + weight.vertex) as usize;
                if !self
                    .slots
                    .push(&mut self.out.vertices, global, bone_index, weight.weight)
                {
                    self.out.dropped_influences += 1;
                }
            }
        }
        Ok(())
    }
}
