//! Imported mesh data: per-vertex attribute streams, triangles and bones.

use crate::math::IDENTITY_MATRIX;

/// Influence of one bone on one vertex.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VertexWeight {
    /// Mesh-local vertex index.
    pub vertex: u32,
    /// Blend weight.
    pub weight: f32,
}

/// A bone as referenced by one mesh.
///
/// The same bone (by name) may appear in several meshes; the flattener
/// merges them into one global bone.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneBone {
    /// Bone name, matching a node in the scene graph.
    pub name: String,
    /// Inverse bind-pose transform (column-major).
    pub offset_matrix: [f32; 16],
    /// Vertices influenced by this bone.
    pub weights: Vec<VertexWeight>,
}

impl SceneBone {
    /// Create a bone with an identity offset and no weights.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            offset_matrix: IDENTITY_MATRIX,
            weights: Vec::new(),
        }
    }

    /// Set the inverse bind-pose matrix.
    #[must_use]
    pub fn with_offset_matrix(mut self, offset_matrix: [f32; 16]) -> Self {
        self.offset_matrix = offset_matrix;
        self
    }

    /// Add a vertex influence.
    #[must_use]
    pub fn with_weight(mut self, vertex: u32, weight: f32) -> Self {
        self.weights.push(VertexWeight { vertex, weight });
        self
    }
}

/// A triangulated mesh as produced by an importer.
///
/// Attribute streams are optional: an empty stream means the attribute is
/// absent. A stream shorter than `vertex_count` only covers its prefix.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SceneMesh {
    /// Mesh name, if any.
    pub name: Option<String>,
    /// Number of vertices.
    pub vertex_count: u32,
    /// Vertex positions.
    pub positions: Vec<[f32; 3]>,
    /// Vertex normals.
    pub normals: Vec<[f32; 3]>,
    /// Vertex tangents.
    pub tangents: Vec<[f32; 3]>,
    /// Vertex bitangents.
    pub bitangents: Vec<[f32; 3]>,
    /// First texture coordinate set.
    pub tex_coords: Vec<[f32; 2]>,
    /// Triangles as mesh-local vertex indices.
    pub faces: Vec<[u32; 3]>,
    /// Index into [`Scene::materials`](super::Scene::materials).
    pub material: usize,
    /// Bones skinning this mesh.
    pub bones: Vec<SceneBone>,
}

impl SceneMesh {
    /// Creates an empty mesh.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the mesh name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set positions. Also sets the vertex count.
    #[must_use]
    pub fn with_positions(mut self, positions: Vec<[f32; 3]>) -> Self {
        self.vertex_count = positions.len() as u32;
        self.positions = positions;
        self
    }

    /// Set normals.
    #[must_use]
    pub fn with_normals(mut self, normals: Vec<[f32; 3]>) -> Self {
        self.normals = normals;
        self
    }

    /// Set tangents and bitangents together.
    #[must_use]
    pub fn with_tangents(mut self, tangents: Vec<[f32; 3]>, bitangents: Vec<[f32; 3]>) -> Self {
        self.tangents = tangents;
        self.bitangents = bitangents;
        self
    }

    /// Set the first texture coordinate set.
    #[must_use]
    pub fn with_tex_coords(mut self, tex_coords: Vec<[f32; 2]>) -> Self {
        self.tex_coords = tex_coords;
        self
    }

    /// Set the triangles.
    #[must_use]
    pub fn with_faces(mut self, faces: Vec<[u32; 3]>) -> Self {
        self.faces = faces;
        self
    }

    /// Set the material index.
    #[must_use]
    pub fn with_material(mut self, material: usize) -> Self {
        self.material = material;
        self
    }

    /// Add a bone.
    #[must_use]
    pub fn with_bone(mut self, bone: SceneBone) -> Self {
        self.bones.push(bone);
        self
    }

    /// Number of indices after flattening (three per triangle).
    pub fn index_count(&self) -> u32 {
        self.faces.len() as u32 * 3
    }

    /// Whether tangents and bitangents are both present.
    pub fn has_tangents_and_bitangents(&self) -> bool {
        !self.tangents.is_empty() && !self.bitangents.is_empty()
    }
}
