//! Descriptor pool and descriptor write types.

use crate::backend::{BufferHandle, ImageHandle};

/// Descriptor for creating a descriptor pool.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct DescriptorPoolDescriptor {
    /// Debug label for the pool.
    pub label: Option<String>,
    /// Maximum number of sets that can be allocated.
    pub max_sets: u32,
    /// Uniform buffer descriptors available across all sets.
    pub uniform_buffers: u32,
    /// Combined image sampler descriptors available across all sets.
    pub combined_image_samplers: u32,
}

impl DescriptorPoolDescriptor {
    /// Create a pool descriptor.
    pub fn new(max_sets: u32, uniform_buffers: u32, combined_image_samplers: u32) -> Self {
        Self {
            label: None,
            max_sets,
            uniform_buffers,
            combined_image_samplers,
        }
    }

    /// Set the debug label.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

/// Resource written into a descriptor binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DescriptorResource {
    /// A range of a uniform buffer.
    UniformBuffer {
        /// Source buffer.
        buffer: BufferHandle,
        /// Byte offset of the range.
        offset: u64,
        /// Byte size of the range.
        range: u64,
    },
    /// An image sampled through its own sampler.
    CombinedImageSampler(ImageHandle),
}

/// One binding update of a descriptor set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DescriptorWrite {
    /// Binding index within the set.
    pub binding: u32,
    /// Resource bound at `binding`.
    pub resource: DescriptorResource,
}

impl DescriptorWrite {
    /// Bind a range of a uniform buffer.
    pub fn uniform_buffer(binding: u32, buffer: BufferHandle, offset: u64, range: u64) -> Self {
        Self {
            binding,
            resource: DescriptorResource::UniformBuffer {
                buffer,
                offset,
                range,
            },
        }
    }

    /// Bind a combined image sampler.
    pub fn combined_image_sampler(binding: u32, image: ImageHandle) -> Self {
        Self {
            binding,
            resource: DescriptorResource::CombinedImageSampler(image),
        }
    }
}
