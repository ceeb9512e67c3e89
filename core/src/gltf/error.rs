//! Error types for glTF importing.

use thiserror::Error;

/// Errors that can occur while converting a glTF document.
#[derive(Debug, Error)]
pub enum GltfError {
    /// Failed to read or parse the document or its buffers.
    #[error("glTF parse error: {0}")]
    Parse(#[from] gltf_dep::Error),
    /// The document declares no scene.
    #[error("document contains no scene")]
    NoScene,
    /// A primitive is missing position data.
    #[error("mesh {mesh} primitive {primitive} has no POSITION attribute")]
    MissingPositions {
        /// Mesh index in the glTF document.
        mesh: usize,
        /// Primitive index within the mesh.
        primitive: usize,
    },
    /// A vertex references a joint the skin does not have.
    #[error("skin {skin} has no joint {joint}")]
    InvalidJoint {
        /// Skin index in the glTF document.
        skin: usize,
        /// Offending joint index.
        joint: usize,
    },
    /// An animation channel has no input or output data.
    #[error("animation {animation} has a channel without keyframe data")]
    MissingAnimationData {
        /// Animation index in the glTF document.
        animation: usize,
    },
}
