//! glTF 2.0 scene importer.
//!
//! Converts `.gltf`/`.glb` files into a [`Scene`]: nodes, triangle meshes,
//! skins, materials and animations.
//!
//! # Conversion rules
//!
//! - A scene with several root nodes gets a synthetic identity root named
//!   `"Scene"`.
//! - Each skinned primitive becomes one mesh whose bones are the skin's
//!   joints, carrying the inverse bind matrices and per-vertex weights.
//! - Tangents are split into tangent and bitangent using the handedness sign.
//! - Base color, metallic-roughness, normal and occlusion textures map to the
//!   diffuse, specular, height and ambient channels. Only external image URIs
//!   are kept; they stay relative to the model file.
//! - Animation times stay in seconds, with one tick per second.
//!
//! # Example
//!
//! ```ignore
//! use ossa_core::gltf::GltfImporter;
//! use ossa_core::import::{load_scene, ImportFlags};
//!
//! let scene = load_scene(&GltfImporter, "models/guard.gltf".as_ref(), ImportFlags::DEFAULT)?;
//! println!("{} meshes", scene.meshes.len());
//! ```

mod error;
mod loader;

pub use error::GltfError;

use std::path::Path;

use crate::error::{AssetErrorKind, AssetLoadError};
use crate::import::{ImportFlags, SceneImporter};
use crate::scene::Scene;

/// [`SceneImporter`] for glTF 2.0 files.
///
/// External buffers are resolved relative to the model file.
#[derive(Debug, Clone, Copy, Default)]
pub struct GltfImporter;

impl GltfImporter {
    /// Read and convert the glTF file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`GltfError`] when the file or its buffers cannot be read, or
    /// the document references data it does not contain.
    pub fn load(&self, path: &Path, flags: ImportFlags) -> Result<Scene, GltfError> {
        let gltf = gltf_dep::Gltf::open(path)?;
        let buffers = gltf_dep::import_buffers(&gltf.document, path.parent(), gltf.blob)?;
        let ctx = loader::LoadContext::new(gltf.document, buffers, flags);
        ctx.load_scene()
    }
}

impl SceneImporter for GltfImporter {
    fn import(&self, path: &Path, flags: ImportFlags) -> Result<Scene, AssetLoadError> {
        self.load(path, flags)
            .map_err(|e| AssetLoadError::new(path, AssetErrorKind::Import(e.to_string())))
    }
}

#[cfg(test)]
mod tests;
