//! Device abstraction layer.
//!
//! Skinned models talk to the GPU only through [`RenderDevice`]: buffer
//! creation, host writes and blocking copies, sampled images, and descriptor
//! pools and sets. Resources are referred to by opaque handles.
//!
//! # Available Backends
//!
//! - `dummy` (default): in-memory device for tests and headless runs

#[cfg(feature = "dummy")]
pub mod dummy;

use crate::error::GraphicsResult;
use crate::materials::BindingLayout;
use crate::types::{BufferDescriptor, DescriptorPoolDescriptor, DescriptorWrite, ImageDescriptor};

macro_rules! resource_handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(u64);

        impl $name {
            /// Wrap a backend-specific raw value.
            pub const fn from_raw(raw: u64) -> Self {
                Self(raw)
            }

            /// The backend-specific raw value.
            pub const fn raw(self) -> u64 {
                self.0
            }
        }
    };
}

resource_handle!(
    /// Handle to a device buffer.
    BufferHandle
);
resource_handle!(
    /// Handle to a sampled image together with its view and sampler.
    ImageHandle
);
resource_handle!(
    /// Handle to a descriptor pool.
    DescriptorPoolHandle
);
resource_handle!(
    /// Handle to a descriptor set allocated from a pool.
    DescriptorSetHandle
);

/// Resource creation and update primitives of a graphics device.
///
/// All calls are blocking. Implementations use interior mutability so a
/// device can be shared by reference between the model and texture loaders.
pub trait RenderDevice {
    /// Human readable backend name.
    fn name(&self) -> &'static str;

    /// Create a buffer.
    fn create_buffer(&self, descriptor: &BufferDescriptor) -> GraphicsResult<BufferHandle>;

    /// Write host data into a buffer created with
    /// [`BufferUsage::MAP_WRITE`](crate::types::BufferUsage::MAP_WRITE).
    fn write_buffer(&self, buffer: BufferHandle, offset: u64, data: &[u8]) -> GraphicsResult<()>;

    /// Copy `size` bytes from the start of `src` to the start of `dst` and
    /// wait for the transfer to finish.
    fn copy_buffer(&self, src: BufferHandle, dst: BufferHandle, size: u64) -> GraphicsResult<()>;

    /// Release a buffer. Unknown handles are ignored.
    fn destroy_buffer(&self, buffer: BufferHandle);

    /// Create a sampled image.
    fn create_image(&self, descriptor: &ImageDescriptor) -> GraphicsResult<ImageHandle>;

    /// Upload the full pixel data of an image.
    fn write_image(&self, image: ImageHandle, data: &[u8]) -> GraphicsResult<()>;

    /// Release an image. Unknown handles are ignored.
    fn destroy_image(&self, image: ImageHandle);

    /// Create a descriptor pool.
    fn create_descriptor_pool(
        &self,
        descriptor: &DescriptorPoolDescriptor,
    ) -> GraphicsResult<DescriptorPoolHandle>;

    /// Allocate one set with `layout` from `pool`.
    fn allocate_descriptor_set(
        &self,
        pool: DescriptorPoolHandle,
        layout: &BindingLayout,
    ) -> GraphicsResult<DescriptorSetHandle>;

    /// Apply binding updates to a set.
    fn update_descriptor_set(
        &self,
        set: DescriptorSetHandle,
        writes: &[DescriptorWrite],
    ) -> GraphicsResult<()>;

    /// Release a pool and every set allocated from it.
    fn destroy_descriptor_pool(&self, pool: DescriptorPoolHandle);
}
