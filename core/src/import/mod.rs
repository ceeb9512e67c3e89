//! Asset import seam.
//!
//! File formats are parsed by a [`SceneImporter`]; [`load_scene`] runs the
//! importer and rejects scenes the skinning pipeline cannot use.

use std::path::{Path, PathBuf};

use crate::error::{AssetErrorKind, AssetLoadError};
use crate::scene::{Scene, SceneFlags};

bitflags::bitflags! {
    /// Post-processing requested from the importer.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ImportFlags: u32 {
        /// Generate tangents and bitangents when missing.
        const CALC_TANGENT_SPACE = 1 << 0;
        /// Split polygons into triangles.
        const TRIANGULATE = 1 << 1;
        /// Merge identical vertices and index them.
        const JOIN_IDENTICAL_VERTICES = 1 << 2;
        /// Split meshes by primitive type.
        const SORT_BY_PTYPE = 1 << 3;
        /// Flip the V texture coordinate.
        const FLIP_UVS = 1 << 4;
    }
}

impl ImportFlags {
    /// Flags used when the caller does not override them.
    pub const DEFAULT: Self = Self::CALC_TANGENT_SPACE
        .union(Self::TRIANGULATE)
        .union(Self::JOIN_IDENTICAL_VERTICES)
        .union(Self::SORT_BY_PTYPE);
}

impl Default for ImportFlags {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Parses a model file into a [`Scene`].
pub trait SceneImporter {
    /// Import the asset at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`AssetLoadError`] when the file cannot be read or parsed.
    fn import(&self, path: &Path, flags: ImportFlags) -> Result<Scene, AssetLoadError>;
}

/// Check that a scene can be skinned and animated.
///
/// # Errors
///
/// Fails when the scene has no root, is flagged incomplete, has no meshes,
/// or has no animation clips.
pub fn validate_scene(scene: &Scene, path: &Path) -> Result<(), AssetLoadError> {
    let kind = if scene.root().is_none() {
        AssetErrorKind::MissingRoot
    } else if scene.flags.contains(SceneFlags::INCOMPLETE) {
        AssetErrorKind::Incomplete
    } else if scene.meshes.is_empty() {
        AssetErrorKind::NoMeshes
    } else if scene.animations.is_empty() {
        AssetErrorKind::NoAnimations
    } else {
        return Ok(());
    };
    Err(AssetLoadError::new(path, kind))
}

/// Import and validate the asset at `path`.
///
/// # Errors
///
/// Propagates importer failures and [`validate_scene`] rejections.
pub fn load_scene(
    importer: &dyn SceneImporter,
    path: &Path,
    flags: ImportFlags,
) -> Result<Scene, AssetLoadError> {
    let scene = importer.import(path, flags)?;
    validate_scene(&scene, path)?;
    log::debug!(
        "Imported {}: {} nodes, {} meshes, {} materials, {} clips",
        path.display(),
        scene.nodes().len(),
        scene.meshes.len(),
        scene.materials.len(),
        scene.animations.len()
    );
    Ok(scene)
}

/// Directory that relative texture paths of `model_path` resolve against.
pub fn asset_folder(model_path: &Path) -> PathBuf {
    model_path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default()
}
