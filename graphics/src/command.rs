//! Command recording.
//!
//! [`CommandRecorder`] is the subset of a graphics command buffer used by
//! skinned models. [`CommandList`] records commands into memory so they can
//! be inspected or replayed by a backend.

use crate::backend::{BufferHandle, DescriptorSetHandle};
use crate::types::IndexFormat;

/// Records GPU commands in submission order.
pub trait CommandRecorder {
    /// Overwrite `data.len()` bytes of `buffer` at `offset`, ordered with the
    /// other commands of this recorder.
    fn update_buffer(&mut self, buffer: BufferHandle, offset: u64, data: &[u8]);

    /// Bind a vertex buffer range to an input slot.
    fn bind_vertex_buffer(&mut self, slot: u32, buffer: BufferHandle, offset: u64);

    /// Bind the index buffer range.
    fn bind_index_buffer(&mut self, buffer: BufferHandle, offset: u64, format: IndexFormat);

    /// Bind descriptor sets starting at set number `first_set`.
    fn bind_descriptor_sets(&mut self, first_set: u32, sets: &[DescriptorSetHandle]);

    /// Issue an indexed draw.
    fn draw_indexed(
        &mut self,
        index_count: u32,
        instance_count: u32,
        first_index: u32,
        base_vertex: i32,
        first_instance: u32,
    );
}

/// A recorded command.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// In-place buffer update.
    UpdateBuffer {
        /// Destination buffer.
        buffer: BufferHandle,
        /// Destination byte offset.
        offset: u64,
        /// Bytes to write.
        data: Vec<u8>,
    },
    /// Vertex buffer binding.
    BindVertexBuffer {
        /// Input slot.
        slot: u32,
        /// Bound buffer.
        buffer: BufferHandle,
        /// Byte offset of the first vertex.
        offset: u64,
    },
    /// Index buffer binding.
    BindIndexBuffer {
        /// Bound buffer.
        buffer: BufferHandle,
        /// Byte offset of the first index.
        offset: u64,
        /// Index element type.
        format: IndexFormat,
    },
    /// Descriptor set binding.
    BindDescriptorSets {
        /// First set number.
        first_set: u32,
        /// Sets bound at `first_set..`.
        sets: Vec<DescriptorSetHandle>,
    },
    /// Indexed draw call.
    DrawIndexed {
        /// Number of indices.
        index_count: u32,
        /// Number of instances.
        instance_count: u32,
        /// First index in the bound index buffer.
        first_index: u32,
        /// Value added to each index.
        base_vertex: i32,
        /// First instance.
        first_instance: u32,
    },
}

/// In-memory [`CommandRecorder`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommandList {
    commands: Vec<Command>,
}

impl CommandList {
    /// Create an empty command list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded commands in order.
    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// Number of recorded commands.
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Whether nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Drop all recorded commands.
    pub fn clear(&mut self) {
        self.commands.clear();
    }

    /// Recorded draw calls.
    pub fn draws(&self) -> impl Iterator<Item = &Command> {
        self.commands
            .iter()
            .filter(|c| matches!(c, Command::DrawIndexed { .. }))
    }
}

impl CommandRecorder for CommandList {
    fn update_buffer(&mut self, buffer: BufferHandle, offset: u64, data: &[u8]) {
        self.commands.push(Command::UpdateBuffer {
            buffer,
            offset,
            data: data.to_vec(),
        });
    }

    fn bind_vertex_buffer(&mut self, slot: u32, buffer: BufferHandle, offset: u64) {
        self.commands.push(Command::BindVertexBuffer {
            slot,
            buffer,
            offset,
        });
    }

    fn bind_index_buffer(&mut self, buffer: BufferHandle, offset: u64, format: IndexFormat) {
        self.commands.push(Command::BindIndexBuffer {
            buffer,
            offset,
            format,
        });
    }

    fn bind_descriptor_sets(&mut self, first_set: u32, sets: &[DescriptorSetHandle]) {
        self.commands.push(Command::BindDescriptorSets {
            first_set,
            sets: sets.to_vec(),
        });
    }

    fn draw_indexed(
        &mut self,
        index_count: u32,
        instance_count: u32,
        first_index: u32,
        base_vertex: i32,
        first_instance: u32,
    ) {
        self.commands.push(Command::DrawIndexed {
            index_count,
            instance_count,
            first_index,
            base_vertex,
            first_instance,
        });
    }
}
