//! Packed uniform, vertex and index buffer.
//!
//! A skinned model keeps all of its GPU data in one device buffer:
//!
//! ```text
//! 0                 vertex_offset            index_offset          total_size
//! | SkinnedUniforms | SkinnedVertex * V      | u32 * I             |
//! ```
//!
//! Offsets are computed once at upload time and never change.

use bytemuck::{Pod, Zeroable};
use ossa_core::math::Mat4;
use ossa_core::skinning::{SkinnedVertex, MAX_BONES};
use static_assertions::const_assert_eq;

use crate::backend::{BufferHandle, RenderDevice};
use crate::error::GraphicsResult;
use crate::types::{BufferDescriptor, BufferUsage};

/// Uniform block read by the skinned vertex shader.
///
/// Matrices are column-major, matching the shader's `mat4` layout.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct SkinnedUniforms {
    /// Model matrix.
    pub model: Mat4,
    /// View matrix.
    pub view: Mat4,
    /// Projection matrix.
    pub proj: Mat4,
    /// Final bone matrices indexed by global bone index.
    pub bones: [Mat4; MAX_BONES],
}

const_assert_eq!(std::mem::size_of::<SkinnedUniforms>(), 64 * (3 + MAX_BONES));

impl SkinnedUniforms {
    /// Size of the block in bytes.
    pub const SIZE: u64 = std::mem::size_of::<Self>() as u64;

    /// Copy bone matrices into the block. Extra matrices are ignored.
    pub fn set_bones(&mut self, bones: &[Mat4]) {
        for (slot, bone) in self.bones.iter_mut().zip(bones) {
            *slot = *bone;
        }
    }

    /// Raw bytes of the block.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }
}

impl Default for SkinnedUniforms {
    fn default() -> Self {
        Self {
            model: Mat4::IDENTITY,
            view: Mat4::IDENTITY,
            proj: Mat4::IDENTITY,
            bones: [Mat4::IDENTITY; MAX_BONES],
        }
    }
}

/// Byte offsets of the three regions of a packed buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackedLayout {
    /// Offset of [`SkinnedUniforms`], always zero.
    pub uniform_offset: u64,
    /// Offset of the first vertex.
    pub vertex_offset: u64,
    /// Offset of the first index.
    pub index_offset: u64,
    /// Size of the whole buffer.
    pub total_size: u64,
}

impl PackedLayout {
    /// Layout for `vertex_count` vertices and `index_count` 32-bit indices.
    pub fn new(vertex_count: usize, index_count: usize) -> Self {
        let vertex_size = vertex_count as u64 * u64::from(SkinnedVertex::STRIDE);
        let index_size = index_count as u64 * std::mem::size_of::<u32>() as u64;
        let vertex_offset = SkinnedUniforms::SIZE;
        let index_offset = vertex_offset + vertex_size;
        Self {
            uniform_offset: 0,
            vertex_offset,
            index_offset,
            total_size: index_offset + index_size,
        }
    }

    /// Size of the uniform region.
    pub fn uniform_size(&self) -> u64 {
        self.vertex_offset - self.uniform_offset
    }

    /// Size of the vertex region.
    pub fn vertex_size(&self) -> u64 {
        self.index_offset - self.vertex_offset
    }

    /// Size of the index region.
    pub fn index_size(&self) -> u64 {
        self.total_size - self.index_offset
    }
}

/// Device buffer holding uniforms, vertices and indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackedBuffer {
    buffer: BufferHandle,
    layout: PackedLayout,
}

impl PackedBuffer {
    /// Upload the initial uniforms together with the vertex and index data.
    ///
    /// The three regions are written into one staging buffer, copied to the
    /// device buffer with a single blocking copy, and the staging buffer is
    /// released. Nothing is left allocated on failure.
    ///
    /// # Errors
    ///
    /// Returns the first device error.
    pub fn upload(
        device: &dyn RenderDevice,
        uniforms: &SkinnedUniforms,
        vertices: &[SkinnedVertex],
        indices: &[u32],
    ) -> GraphicsResult<Self> {
        let layout = PackedLayout::new(vertices.len(), indices.len());
        log::debug!(
            "Packed buffer: {} bytes (vertices at {}, indices at {})",
            layout.total_size,
            layout.vertex_offset,
            layout.index_offset
        );

        let mut bytes = Vec::with_capacity(layout.total_size as usize);
        bytes.extend_from_slice(uniforms.as_bytes());
        bytes.extend_from_slice(bytemuck::cast_slice(vertices));
        bytes.extend_from_slice(bytemuck::cast_slice(indices));

        let staging = device.create_buffer(
            &BufferDescriptor::new(layout.total_size, BufferUsage::STAGING)
                .with_label("skinned_staging"),
        )?;
        let result = Self::transfer(device, staging, &bytes, layout);
        device.destroy_buffer(staging);
        result
    }

    fn transfer(
        device: &dyn RenderDevice,
        staging: BufferHandle,
        bytes: &[u8],
        layout: PackedLayout,
    ) -> GraphicsResult<Self> {
        device.write_buffer(staging, 0, bytes)?;
        let buffer = device.create_buffer(
            &BufferDescriptor::new(layout.total_size, BufferUsage::PACKED)
                .with_label("skinned_packed"),
        )?;
        if let Err(e) = device.copy_buffer(staging, buffer, layout.total_size) {
            device.destroy_buffer(buffer);
            return Err(e);
        }
        Ok(Self { buffer, layout })
    }

    /// The device buffer.
    pub fn buffer(&self) -> BufferHandle {
        self.buffer
    }

    /// Region offsets.
    pub fn layout(&self) -> &PackedLayout {
        &self.layout
    }

    /// Release the device buffer.
    pub fn destroy(self, device: &dyn RenderDevice) {
        device.destroy_buffer(self.buffer);
    }
}
