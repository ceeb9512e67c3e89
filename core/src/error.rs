//! Error types for scene import and animation playback.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Why a source asset was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssetErrorKind {
    /// The importer could not produce a scene at all.
    #[error("import failed: {0}")]
    Import(String),
    /// The scene has no root node.
    #[error("scene has no root node")]
    MissingRoot,
    /// The importer flagged the scene as incomplete.
    #[error("scene is incomplete")]
    Incomplete,
    /// The scene contains no meshes.
    #[error("No meshes found")]
    NoMeshes,
    /// The scene contains no animation clips.
    #[error("No animations found")]
    NoAnimations,
    /// A node references a mesh index that does not exist.
    #[error("node {node:?} references missing mesh {mesh}")]
    InvalidMeshReference {
        /// Name of the referencing node.
        node: String,
        /// Referenced mesh index.
        mesh: usize,
    },
    /// A mesh references a material index that does not exist.
    #[error("mesh {mesh} references missing material {material}")]
    InvalidMaterial {
        /// Mesh index in the scene.
        mesh: usize,
        /// Referenced material index.
        material: usize,
    },
    /// A triangle references a vertex outside its mesh.
    #[error("mesh {mesh} face {face} references vertex {index} out of range")]
    InvalidFace {
        /// Mesh index in the scene.
        mesh: usize,
        /// Face index within the mesh.
        face: usize,
        /// Offending mesh-local vertex index.
        index: u32,
    },
    /// A bone weight targets a vertex outside its mesh.
    #[error("mesh {mesh} bone {bone:?} weights vertex {vertex} out of range")]
    InvalidWeight {
        /// Mesh index in the scene.
        mesh: usize,
        /// Bone name.
        bone: String,
        /// Offending mesh-local vertex index.
        vertex: u32,
    },
}

/// A malformed, incomplete, mesh-less or animation-less source asset.
///
/// Always fatal for model construction. The asset path is carried along and
/// appended to the message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} for scene: {}", path.display())]
pub struct AssetLoadError {
    /// Path of the asset that failed to load.
    pub path: PathBuf,
    /// What went wrong.
    pub kind: AssetErrorKind,
}

impl AssetLoadError {
    /// Create an error for the asset at `path`.
    pub fn new(path: impl AsRef<Path>, kind: AssetErrorKind) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            kind,
        }
    }
}

/// A requested animation clip does not exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("animation index {index} out of range ({clip_count} clips available)")]
pub struct AnimationIndexError {
    /// Requested clip index.
    pub index: usize,
    /// Number of clips in the asset.
    pub clip_count: usize,
}
