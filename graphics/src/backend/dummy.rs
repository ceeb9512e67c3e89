//! Dummy GPU backend for testing and development.
//!
//! This backend doesn't talk to a GPU. It keeps host copies of buffer
//! contents and tracks every resource so tests can read uploads back, check
//! for leaks and exercise failure paths without requiring GPU hardware.

use std::collections::{BTreeMap, HashMap};

use parking_lot::Mutex;

use crate::command::{Command, CommandList};
use crate::error::{GraphicsError, GraphicsResult};
use crate::materials::{BindingLayout, BindingType};
use crate::types::{
    BufferDescriptor, BufferUsage, DescriptorPoolDescriptor, DescriptorResource, DescriptorWrite,
    ImageDescriptor,
};

use super::{BufferHandle, DescriptorPoolHandle, DescriptorSetHandle, ImageHandle, RenderDevice};

struct BufferState {
    descriptor: BufferDescriptor,
    data: Vec<u8>,
}

struct ImageState {
    descriptor: ImageDescriptor,
    written: bool,
}

struct PoolState {
    descriptor: DescriptorPoolDescriptor,
    allocated: u32,
}

struct SetState {
    pool: DescriptorPoolHandle,
    layout: BindingLayout,
    writes: BTreeMap<u32, DescriptorResource>,
}

#[derive(Default)]
struct DeviceState {
    next_id: u64,
    buffers: HashMap<u64, BufferState>,
    images: HashMap<u64, ImageState>,
    pools: HashMap<u64, PoolState>,
    sets: HashMap<u64, SetState>,
    allocated_bytes: u64,
    memory_budget: Option<u64>,
    copies: usize,
}

impl DeviceState {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn reserve(&mut self, size: u64) -> GraphicsResult<()> {
        let total = self.allocated_bytes + size;
        if self.memory_budget.is_some_and(|budget| total > budget) {
            return Err(GraphicsError::OutOfMemory);
        }
        self.allocated_bytes = total;
        Ok(())
    }

    fn buffer(&self, handle: BufferHandle) -> GraphicsResult<&BufferState> {
        self.buffers.get(&handle.raw()).ok_or(GraphicsError::InvalidHandle {
            kind: "buffer",
            raw: handle.raw(),
        })
    }

    fn buffer_mut(&mut self, handle: BufferHandle) -> GraphicsResult<&mut BufferState> {
        self.buffers
            .get_mut(&handle.raw())
            .ok_or(GraphicsError::InvalidHandle {
                kind: "buffer",
                raw: handle.raw(),
            })
    }

    fn require_usage(
        &self,
        handle: BufferHandle,
        usage: BufferUsage,
    ) -> GraphicsResult<&BufferState> {
        let buffer = self.buffer(handle)?;
        if !buffer.descriptor.usage.contains(usage) {
            return Err(GraphicsError::InvalidParameter(format!(
                "buffer {:?} lacks {:?} usage",
                buffer.descriptor.label, usage
            )));
        }
        Ok(buffer)
    }

    fn set(&self, handle: DescriptorSetHandle) -> GraphicsResult<&SetState> {
        self.sets.get(&handle.raw()).ok_or(GraphicsError::InvalidHandle {
            kind: "descriptor set",
            raw: handle.raw(),
        })
    }

    fn write_range(
        &mut self,
        handle: BufferHandle,
        offset: u64,
        data: &[u8],
    ) -> GraphicsResult<()> {
        let buffer = self.buffer_mut(handle)?;
        let start = offset as usize;
        let end = start + data.len();
        let Some(target) = buffer.data.get_mut(start..end) else {
            return Err(GraphicsError::InvalidParameter(format!(
                "write of {} bytes at {} exceeds buffer {:?} of {} bytes",
                data.len(),
                offset,
                buffer.descriptor.label,
                buffer.descriptor.size
            )));
        };
        target.copy_from_slice(data);
        Ok(())
    }

    fn check_write(&self, layout: &BindingLayout, write: &DescriptorWrite) -> GraphicsResult<()> {
        let entry = layout.entry(write.binding).ok_or_else(|| {
            GraphicsError::InvalidParameter(format!(
                "layout {:?} has no binding {}",
                layout.label, write.binding
            ))
        })?;
        match write.resource {
            DescriptorResource::UniformBuffer {
                buffer,
                offset,
                range,
            } if entry.binding_type == BindingType::UniformBuffer => {
                let state = self.require_usage(buffer, BufferUsage::UNIFORM)?;
                if offset + range > state.descriptor.size {
                    return Err(GraphicsError::InvalidParameter(format!(
                        "uniform range {}..{} exceeds buffer of {} bytes",
                        offset,
                        offset + range,
                        state.descriptor.size
                    )));
                }
                Ok(())
            }
            DescriptorResource::CombinedImageSampler(image)
                if entry.binding_type == BindingType::CombinedImageSampler =>
            {
                if self.images.contains_key(&image.raw()) {
                    Ok(())
                } else {
                    Err(GraphicsError::InvalidHandle {
                        kind: "image",
                        raw: image.raw(),
                    })
                }
            }
            _ => Err(GraphicsError::InvalidParameter(format!(
                "binding {} expects {:?}",
                write.binding, entry.binding_type
            ))),
        }
    }
}

/// Dummy GPU backend.
#[derive(Default)]
pub struct DummyDevice {
    state: Mutex<DeviceState>,
}

impl std::fmt::Debug for DummyDevice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("DummyDevice")
            .field("buffers", &state.buffers.len())
            .field("images", &state.images.len())
            .field("pools", &state.pools.len())
            .field("allocated_bytes", &state.allocated_bytes)
            .finish()
    }
}

impl DummyDevice {
    /// Create a new dummy device with unlimited memory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail buffer and image creation with [`GraphicsError::OutOfMemory`]
    /// once `bytes` are in use.
    #[must_use]
    pub fn with_memory_budget(self, bytes: u64) -> Self {
        self.state.lock().memory_budget = Some(bytes);
        self
    }

    /// Replay a command list, applying buffer updates to the host copies.
    ///
    /// # Errors
    ///
    /// Fails on the first command that references a missing resource or a
    /// buffer without the usage the command needs.
    pub fn submit(&self, commands: &CommandList) -> GraphicsResult<()> {
        let mut state = self.state.lock();
        log::trace!("DummyDevice: submitting {} commands", commands.len());
        for command in commands.commands() {
            match command {
                Command::UpdateBuffer {
                    buffer,
                    offset,
                    data,
                } => {
                    state.require_usage(*buffer, BufferUsage::COPY_DST)?;
                    state.write_range(*buffer, *offset, data)?;
                }
                Command::BindVertexBuffer { buffer, .. } => {
                    state.require_usage(*buffer, BufferUsage::VERTEX)?;
                }
                Command::BindIndexBuffer { buffer, .. } => {
                    state.require_usage(*buffer, BufferUsage::INDEX)?;
                }
                Command::BindDescriptorSets { sets, .. } => {
                    for set in sets {
                        state.set(*set)?;
                    }
                }
                Command::DrawIndexed { .. } => {}
            }
        }
        Ok(())
    }

    /// Host copy of a buffer's contents.
    pub fn buffer_data(&self, buffer: BufferHandle) -> Option<Vec<u8>> {
        self.state
            .lock()
            .buffers
            .get(&buffer.raw())
            .map(|b| b.data.clone())
    }

    /// Descriptor a buffer was created with.
    pub fn buffer_descriptor(&self, buffer: BufferHandle) -> Option<BufferDescriptor> {
        self.state
            .lock()
            .buffers
            .get(&buffer.raw())
            .map(|b| b.descriptor.clone())
    }

    /// Descriptor an image was created with.
    pub fn image_descriptor(&self, image: ImageHandle) -> Option<ImageDescriptor> {
        self.state
            .lock()
            .images
            .get(&image.raw())
            .map(|i| i.descriptor.clone())
    }

    /// Whether pixel data has been uploaded to an image.
    pub fn image_written(&self, image: ImageHandle) -> bool {
        self.state
            .lock()
            .images
            .get(&image.raw())
            .is_some_and(|i| i.written)
    }

    /// Bindings written to a set, ordered by binding index.
    pub fn descriptor_writes(&self, set: DescriptorSetHandle) -> Vec<DescriptorWrite> {
        self.state
            .lock()
            .sets
            .get(&set.raw())
            .map(|s| {
                s.writes
                    .iter()
                    .map(|(&binding, &resource)| DescriptorWrite { binding, resource })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Sets allocated so far from a pool.
    pub fn allocated_sets(&self, pool: DescriptorPoolHandle) -> Option<u32> {
        self.state
            .lock()
            .pools
            .get(&pool.raw())
            .map(|p| p.allocated)
    }

    /// Descriptor a pool was created with.
    pub fn pool_descriptor(&self, pool: DescriptorPoolHandle) -> Option<DescriptorPoolDescriptor> {
        self.state
            .lock()
            .pools
            .get(&pool.raw())
            .map(|p| p.descriptor.clone())
    }

    /// Number of live buffers.
    pub fn live_buffers(&self) -> usize {
        self.state.lock().buffers.len()
    }

    /// Number of live images.
    pub fn live_images(&self) -> usize {
        self.state.lock().images.len()
    }

    /// Number of live descriptor pools.
    pub fn live_pools(&self) -> usize {
        self.state.lock().pools.len()
    }

    /// Number of buffer-to-buffer copies performed.
    pub fn copy_count(&self) -> usize {
        self.state.lock().copies
    }
}

impl RenderDevice for DummyDevice {
    fn name(&self) -> &'static str {
        "Dummy"
    }

    fn create_buffer(&self, descriptor: &BufferDescriptor) -> GraphicsResult<BufferHandle> {
        log::trace!(
            "DummyDevice: creating buffer {:?} (size: {}, usage: {:?})",
            descriptor.label,
            descriptor.size,
            descriptor.usage
        );
        if descriptor.size == 0 {
            return Err(GraphicsError::InvalidParameter(format!(
                "buffer {:?} has zero size",
                descriptor.label
            )));
        }
        let mut state = self.state.lock();
        state.reserve(descriptor.size)?;
        let id = state.next_id();
        state.buffers.insert(
            id,
            BufferState {
                descriptor: descriptor.clone(),
                data: vec![0; descriptor.size as usize],
            },
        );
        Ok(BufferHandle::from_raw(id))
    }

    fn write_buffer(&self, buffer: BufferHandle, offset: u64, data: &[u8]) -> GraphicsResult<()> {
        log::trace!(
            "DummyDevice: writing {} bytes to buffer {} at {}",
            data.len(),
            buffer.raw(),
            offset
        );
        let mut state = self.state.lock();
        state.require_usage(buffer, BufferUsage::MAP_WRITE)?;
        state.write_range(buffer, offset, data)
    }

    fn copy_buffer(&self, src: BufferHandle, dst: BufferHandle, size: u64) -> GraphicsResult<()> {
        log::trace!(
            "DummyDevice: copying {} bytes from buffer {} to buffer {}",
            size,
            src.raw(),
            dst.raw()
        );
        let mut state = self.state.lock();
        let source = state.require_usage(src, BufferUsage::COPY_SRC)?;
        let Some(bytes) = source.data.get(..size as usize).map(<[u8]>::to_vec) else {
            return Err(GraphicsError::InvalidParameter(format!(
                "copy of {} bytes exceeds source buffer of {} bytes",
                size, source.descriptor.size
            )));
        };
        state.require_usage(dst, BufferUsage::COPY_DST)?;
        state.write_range(dst, 0, &bytes)?;
        state.copies += 1;
        Ok(())
    }

    fn destroy_buffer(&self, buffer: BufferHandle) {
        log::trace!("DummyDevice: destroying buffer {}", buffer.raw());
        let mut state = self.state.lock();
        if let Some(removed) = state.buffers.remove(&buffer.raw()) {
            state.allocated_bytes -= removed.descriptor.size;
        }
    }

    fn create_image(&self, descriptor: &ImageDescriptor) -> GraphicsResult<ImageHandle> {
        log::trace!(
            "DummyDevice: creating image {:?} ({}x{} {:?})",
            descriptor.label,
            descriptor.width,
            descriptor.height,
            descriptor.format
        );
        if descriptor.width == 0 || descriptor.height == 0 {
            return Err(GraphicsError::InvalidParameter(format!(
                "image {:?} has zero extent",
                descriptor.label
            )));
        }
        let mut state = self.state.lock();
        state.reserve(descriptor.byte_size())?;
        let id = state.next_id();
        state.images.insert(
            id,
            ImageState {
                descriptor: descriptor.clone(),
                written: false,
            },
        );
        Ok(ImageHandle::from_raw(id))
    }

    fn write_image(&self, image: ImageHandle, data: &[u8]) -> GraphicsResult<()> {
        log::trace!(
            "DummyDevice: writing {} bytes to image {}",
            data.len(),
            image.raw()
        );
        let mut state = self.state.lock();
        let target = state
            .images
            .get_mut(&image.raw())
            .ok_or(GraphicsError::InvalidHandle {
                kind: "image",
                raw: image.raw(),
            })?;
        if data.len() as u64 != target.descriptor.byte_size() {
            return Err(GraphicsError::InvalidParameter(format!(
                "image {:?} expects {} bytes, got {}",
                target.descriptor.label,
                target.descriptor.byte_size(),
                data.len()
            )));
        }
        target.written = true;
        Ok(())
    }

    fn destroy_image(&self, image: ImageHandle) {
        log::trace!("DummyDevice: destroying image {}", image.raw());
        let mut state = self.state.lock();
        if let Some(removed) = state.images.remove(&image.raw()) {
            state.allocated_bytes -= removed.descriptor.byte_size();
        }
    }

    fn create_descriptor_pool(
        &self,
        descriptor: &DescriptorPoolDescriptor,
    ) -> GraphicsResult<DescriptorPoolHandle> {
        log::trace!(
            "DummyDevice: creating descriptor pool {:?} (max sets: {}, uniforms: {}, samplers: {})",
            descriptor.label,
            descriptor.max_sets,
            descriptor.uniform_buffers,
            descriptor.combined_image_samplers
        );
        if descriptor.max_sets == 0 {
            return Err(GraphicsError::InvalidParameter(format!(
                "descriptor pool {:?} allows no sets",
                descriptor.label
            )));
        }
        let mut state = self.state.lock();
        let id = state.next_id();
        state.pools.insert(
            id,
            PoolState {
                descriptor: descriptor.clone(),
                allocated: 0,
            },
        );
        Ok(DescriptorPoolHandle::from_raw(id))
    }

    fn allocate_descriptor_set(
        &self,
        pool: DescriptorPoolHandle,
        layout: &BindingLayout,
    ) -> GraphicsResult<DescriptorSetHandle> {
        log::trace!(
            "DummyDevice: allocating set {:?} from pool {}",
            layout.label,
            pool.raw()
        );
        let mut state = self.state.lock();
        let pool_state = state
            .pools
            .get_mut(&pool.raw())
            .ok_or(GraphicsError::InvalidHandle {
                kind: "descriptor pool",
                raw: pool.raw(),
            })?;
        if pool_state.allocated >= pool_state.descriptor.max_sets {
            return Err(GraphicsError::DescriptorPoolExhausted {
                max_sets: pool_state.descriptor.max_sets,
            });
        }
        pool_state.allocated += 1;
        let id = state.next_id();
        state.sets.insert(
            id,
            SetState {
                pool,
                layout: layout.clone(),
                writes: BTreeMap::new(),
            },
        );
        Ok(DescriptorSetHandle::from_raw(id))
    }

    fn update_descriptor_set(
        &self,
        set: DescriptorSetHandle,
        writes: &[DescriptorWrite],
    ) -> GraphicsResult<()> {
        log::trace!(
            "DummyDevice: updating set {} with {} writes",
            set.raw(),
            writes.len()
        );
        let mut state = self.state.lock();
        let layout = &state.set(set)?.layout;
        for write in writes {
            state.check_write(layout, write)?;
        }
        if let Some(target) = state.sets.get_mut(&set.raw()) {
            for write in writes {
                target.writes.insert(write.binding, write.resource);
            }
        }
        Ok(())
    }

    fn destroy_descriptor_pool(&self, pool: DescriptorPoolHandle) {
        log::trace!("DummyDevice: destroying descriptor pool {}", pool.raw());
        let mut state = self.state.lock();
        if state.pools.remove(&pool.raw()).is_some() {
            state.sets.retain(|_, set| set.pool != pool);
        }
    }
}
