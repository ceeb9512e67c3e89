//! # Ossa Core
//!
//! GPU-agnostic half of the Ossa skinned mesh renderer: the imported scene
//! graph, animation clips, scene flattening, bone hierarchies and per-frame
//! pose evaluation.

pub mod animation;
pub mod error;
#[cfg(feature = "gltf")]
pub mod gltf;
pub mod import;
pub mod math;
pub mod scene;
pub mod skinning;

pub use error::{AnimationIndexError, AssetErrorKind, AssetLoadError};

/// Core library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
