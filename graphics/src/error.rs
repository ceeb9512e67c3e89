//! Graphics error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while creating or using device resources.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphicsError {
    /// Failed to create a resource.
    #[error("resource creation failed: {0}")]
    ResourceCreationFailed(String),
    /// Out of GPU memory.
    #[error("out of GPU memory")]
    OutOfMemory,
    /// An invalid parameter was provided.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
    /// A descriptor pool has no room for another set.
    #[error("descriptor pool exhausted ({max_sets} sets)")]
    DescriptorPoolExhausted {
        /// Number of sets the pool was created for.
        max_sets: u32,
    },
    /// A handle does not refer to a live resource.
    #[error("invalid {kind} handle {raw}")]
    InvalidHandle {
        /// Resource kind, e.g. `"buffer"`.
        kind: &'static str,
        /// Raw handle value.
        raw: u64,
    },
    /// A texture file could not be read or decoded.
    #[error("failed to decode image {}: {message}", path.display())]
    ImageDecode {
        /// Path of the image file.
        path: PathBuf,
        /// Decoder message.
        message: String,
    },
}

/// Result alias for graphics operations.
pub type GraphicsResult<T> = Result<T, GraphicsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = GraphicsError::OutOfMemory;
        assert_eq!(err.to_string(), "out of GPU memory");

        let err = GraphicsError::DescriptorPoolExhausted { max_sets: 3 };
        assert_eq!(err.to_string(), "descriptor pool exhausted (3 sets)");

        let err = GraphicsError::InvalidHandle {
            kind: "buffer",
            raw: 7,
        };
        assert_eq!(err.to_string(), "invalid buffer handle 7");
    }

    #[test]
    fn test_image_decode_display() {
        let err = GraphicsError::ImageDecode {
            path: PathBuf::from("textures/skin.png"),
            message: "unexpected end of file".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "failed to decode image textures/skin.png: unexpected end of file"
        );
    }
}
