//! Device resources owned by a skinned model.
//!
//! - [`PackedBuffer`] - One device buffer holding uniforms, vertices and indices
//! - [`SkinnedUniforms`] - Per-frame uniform block (matrices and bone array)
//! - [`TextureCache`] - Loads each material texture once

mod packed;
mod texture;

pub use packed::{PackedBuffer, PackedLayout, SkinnedUniforms};
pub use texture::{FileTextureLoader, TextureCache, TextureLoader};
