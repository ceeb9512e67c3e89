//! GPU vertex format for skinned meshes.

use std::mem::{offset_of, size_of};

/// Maximum number of bone influences stored per vertex.
pub const MAX_BONES_PER_VERTEX: usize = 4;

/// Format of a vertex attribute as seen by the shader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VertexFormat {
    /// Two 32-bit floats.
    Float2,
    /// Three 32-bit floats.
    Float3,
    /// Four 32-bit floats.
    Float4,
    /// Four 32-bit unsigned integers.
    Uint4,
}

impl VertexFormat {
    /// Size in bytes of this format.
    pub fn size(&self) -> usize {
        match self {
            Self::Float2 => 8,
            Self::Float3 => 12,
            Self::Float4 | Self::Uint4 => 16,
        }
    }
}

/// One shader input of the skinned vertex layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VertexAttribute {
    /// Shader input location.
    pub location: u32,
    /// Data format.
    pub format: VertexFormat,
    /// Byte offset within [`SkinnedVertex`].
    pub offset: u32,
}

impl VertexAttribute {
    const fn new(location: u32, format: VertexFormat, offset: usize) -> Self {
        Self {
            location,
            format,
            offset: offset as u32,
        }
    }
}

/// Interleaved vertex consumed by the skinned vertex shader.
///
/// Unused influence slots have weight `0.0`; their bone index is ignored.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SkinnedVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub tangent: [f32; 3],
    pub bitangent: [f32; 3],
    pub tex_coord: [f32; 2],
    pub bone_indices: [u32; MAX_BONES_PER_VERTEX],
    pub weights: [f32; MAX_BONES_PER_VERTEX],
}

impl SkinnedVertex {
    /// Byte stride between consecutive vertices.
    pub const STRIDE: u32 = size_of::<Self>() as u32;

    /// Shader inputs in location order.
    pub fn attributes() -> [VertexAttribute; 7] {
        use VertexFormat::*;
        [
            VertexAttribute::new(0, Float3, offset_of!(Self, position)),
            VertexAttribute::new(1, Float3, offset_of!(Self, normal)),
            VertexAttribute::new(2, Float3, offset_of!(Self, tangent)),
            VertexAttribute::new(3, Float3, offset_of!(Self, bitangent)),
            VertexAttribute::new(4, Float2, offset_of!(Self, tex_coord)),
            VertexAttribute::new(5, Uint4, offset_of!(Self, bone_indices)),
            VertexAttribute::new(6, Float4, offset_of!(Self, weights)),
        ]
    }

    /// Number of influence slots carrying a non-zero weight.
    pub fn influence_count(&self) -> usize {
        self.weights.iter().filter(|&&w| w != 0.0).count()
    }
}

/// Per-vertex cursor handing out influence slots in encounter order.
#[derive(Debug, Clone, Default)]
pub struct InfluenceSlots {
    next: Vec<u8>,
}

impl InfluenceSlots {
    /// Cursor for `vertex_count` vertices, all slots free.
    pub fn new(vertex_count: usize) -> Self {
        Self {
            next: vec![0; vertex_count],
        }
    }

    /// Write an influence into the next free slot of `vertices[index]`.
    ///
    /// Returns `false` when every slot of that vertex is taken; the influence
    /// is discarded and existing weights are left untouched.
    pub fn push(
        &mut self,
        vertices: &mut [SkinnedVertex],
        index: usize,
        bone: u32,
        weight: f32,
    ) -> bool {
        let slot = usize::from(self.next[index]);
        if slot >= MAX_BONES_PER_VERTEX {
            return false;
        }
        vertices[index].bone_indices[slot] = bone;
        vertices[index].weights[slot] = weight;
        self.next[index] += 1;
        true
    }
}

static_assertions::const_assert_eq!(size_of::<SkinnedVertex>(), 88);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attributes_cover_the_whole_vertex() {
        let attrs = SkinnedVertex::attributes();
        let mut end = 0;
        for (i, attr) in attrs.iter().enumerate() {
            assert_eq!(attr.location, i as u32);
            assert_eq!(attr.offset as usize, end);
            end += attr.format.size();
        }
        assert_eq!(end as u32, SkinnedVertex::STRIDE);
    }

    #[test]
    fn influences_fill_first_free_slot() {
        let mut vertices = vec![SkinnedVertex::default(); 2];
        let mut slots = InfluenceSlots::new(2);
        assert!(slots.push(&mut vertices, 1, 7, 0.5));
        assert!(slots.push(&mut vertices, 1, 2, 0.25));
        assert_eq!(vertices[1].bone_indices[..2], [7, 2]);
        assert_eq!(vertices[1].weights, [0.5, 0.25, 0.0, 0.0]);
        assert_eq!(vertices[1].influence_count(), 2);
        assert_eq!(vertices[0], SkinnedVertex::default());
    }

    #[test]
    fn overflow_is_rejected() {
        let mut vertices = vec![SkinnedVertex::default()];
        let mut slots = InfluenceSlots::new(1);
        for bone in 0..MAX_BONES_PER_VERTEX as u32 {
            assert!(slots.push(&mut vertices, 0, bone, 0.2));
        }
        assert!(!slots.push(&mut vertices, 0, 9, 0.2));
        assert_eq!(vertices[0].bone_indices, [0, 1, 2, 3]);
    }
}
