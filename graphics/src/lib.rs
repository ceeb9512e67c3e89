//! # Ossa Graphics
//!
//! Device-facing half of the Ossa skinned mesh renderer.
//!
//! ## Overview
//!
//! This crate provides:
//! - [`RenderDevice`] - Trait for the buffer, image and descriptor primitives a model needs
//! - [`CommandRecorder`] - Trait for the commands a model records each frame
//! - [`SkinnedModel`] - Construction, per-frame update and draw of an animated model
//! - [`DummyDevice`] - In-memory backend for tests and headless runs
//!
//! ## Example
//!
//! ```ignore
//! use ossa_core::gltf::GltfImporter;
//! use ossa_graphics::{
//!     CommandList, DummyDevice, FileTextureLoader, PerspectiveCamera, SkinnedModel,
//!     SkinnedModelConfig, TextureCache,
//! };
//!
//! let device = DummyDevice::new();
//! let mut textures = TextureCache::new(FileTextureLoader::new());
//! let mut model = SkinnedModel::construct(
//!     &device,
//!     &GltfImporter,
//!     &mut textures,
//!     "models/guard.gltf".as_ref(),
//!     &SkinnedModelConfig::default(),
//! )?;
//!
//! let mut cmd = CommandList::new();
//! model.update(&mut cmd, elapsed, &PerspectiveCamera::default(), 0);
//! model.draw(&mut cmd);
//! ```

pub mod backend;
pub mod camera;
pub mod command;
pub mod config;
pub mod error;
pub mod materials;
pub mod model;
pub mod resources;
pub mod types;

// Re-export main types for convenience
#[cfg(feature = "dummy")]
pub use backend::dummy::DummyDevice;
pub use backend::{
    BufferHandle, DescriptorPoolHandle, DescriptorSetHandle, ImageHandle, RenderDevice,
};
pub use camera::{Camera, PerspectiveCamera};
pub use command::{Command, CommandList, CommandRecorder};
pub use config::SkinnedModelConfig;
pub use error::{GraphicsError, GraphicsResult};
pub use materials::{BindingLayout, DescriptorPlan, ModelDescriptors};
pub use model::{ModelError, SkinnedModel};
pub use resources::{
    FileTextureLoader, PackedBuffer, PackedLayout, SkinnedUniforms, TextureCache, TextureLoader,
};
pub use types::{
    BufferDescriptor, BufferUsage, DescriptorPoolDescriptor, DescriptorResource, DescriptorWrite,
    ImageDescriptor, ImageFormat, IndexFormat,
};

/// Graphics library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the graphics subsystem.
///
/// This should be called before using any graphics functionality.
pub fn init() {
    log::info!("Ossa Graphics v{} initialized", VERSION);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[cfg(feature = "dummy")]
    #[test]
    fn test_dummy_device() {
        let device = DummyDevice::new();
        assert_eq!(device.name(), "Dummy");
    }
}
