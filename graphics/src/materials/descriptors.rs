//! Descriptor pool sizing and descriptor set allocation for skinned models.
//!
//! A model owns one pool holding:
//! - one uniform set (set 0) pointing at the uniform region of its packed buffer
//! - one sampler set (set 1) per material and image slot
//!
//! The pool allows `sampler_slots + 1` sets, where each material contributes
//! `max(enabled channels, image slots)` to `sampler_slots`. This is an upper
//! bound on the sets a model needs; [`DescriptorPlan::check`] verifies it
//! before anything is allocated.

use std::collections::BTreeMap;

use ossa_core::scene::TextureChannel;
use ossa_core::skinning::Material;

use crate::backend::{DescriptorPoolHandle, DescriptorSetHandle, ImageHandle, RenderDevice};
use crate::error::{GraphicsError, GraphicsResult};
use crate::resources::PackedBuffer;
use crate::types::{DescriptorPoolDescriptor, DescriptorWrite};

use super::BindingLayout;

/// Pool size and the number of sets a model will allocate from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DescriptorPlan {
    /// Sampler slots reported by scene flattening.
    pub sampler_slots: u32,
    /// Uniform set plus one set per material image slot.
    pub required_sets: u32,
}

impl DescriptorPlan {
    /// Plan the pool for a material table.
    pub fn new<H>(materials: &BTreeMap<usize, Material<H>>, sampler_slots: u32) -> Self {
        let material_sets: usize = materials.values().map(Material::max_images).sum();
        Self {
            sampler_slots,
            required_sets: 1 + material_sets as u32,
        }
    }

    /// Sets the pool is created for.
    pub fn max_sets(&self) -> u32 {
        self.sampler_slots + 1
    }

    /// Pool descriptor. Uniform and sampler descriptor counts use the same
    /// bound as the set count.
    pub fn pool_descriptor(&self) -> DescriptorPoolDescriptor {
        let max_sets = self.max_sets();
        DescriptorPoolDescriptor::new(max_sets, max_sets, max_sets)
            .with_label("skinned_descriptors")
    }

    /// Verify the pool bound covers every set the model allocates.
    ///
    /// # Errors
    ///
    /// Returns [`GraphicsError::DescriptorPoolExhausted`] if it does not.
    pub fn check(&self) -> GraphicsResult<()> {
        if self.required_sets > self.max_sets() {
            return Err(GraphicsError::DescriptorPoolExhausted {
                max_sets: self.max_sets(),
            });
        }
        Ok(())
    }
}

/// Sampler writes for one image slot of a material.
///
/// A channel is written at its fixed binding only if it has an image at
/// `slot`; other bindings stay unwritten.
pub fn material_writes(
    material: &Material<ImageHandle>,
    channels: &[TextureChannel],
    slot: usize,
) -> Vec<DescriptorWrite> {
    channels
        .iter()
        .filter_map(|&channel| {
            material
                .images(channel)
                .get(slot)
                .map(|&image| DescriptorWrite::combined_image_sampler(channel.binding(), image))
        })
        .collect()
}

/// Descriptor pool and sets owned by one model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelDescriptors {
    pool: DescriptorPoolHandle,
    uniform_set: DescriptorSetHandle,
    material_sets: BTreeMap<usize, Vec<DescriptorSetHandle>>,
}

impl ModelDescriptors {
    /// Create the pool and write every set.
    ///
    /// # Errors
    ///
    /// Fails if the plan does not fit its pool or on the first device error.
    /// The pool is destroyed before returning an error.
    pub fn allocate(
        device: &dyn RenderDevice,
        plan: &DescriptorPlan,
        materials: &BTreeMap<usize, Material<ImageHandle>>,
        channels: &[TextureChannel],
        packed: &PackedBuffer,
    ) -> GraphicsResult<Self> {
        plan.check()?;
        log::debug!(
            "Descriptor pool: {} sets for {} materials ({} sets used)",
            plan.max_sets(),
            materials.len(),
            plan.required_sets
        );
        let pool = device.create_descriptor_pool(&plan.pool_descriptor())?;
        Self::fill(device, pool, materials, channels, packed).inspect_err(|_| {
            device.destroy_descriptor_pool(pool);
        })
    }

    fn fill(
        device: &dyn RenderDevice,
        pool: DescriptorPoolHandle,
        materials: &BTreeMap<usize, Material<ImageHandle>>,
        channels: &[TextureChannel],
        packed: &PackedBuffer,
    ) -> GraphicsResult<Self> {
        let layout = packed.layout();
        let uniform_set = device.allocate_descriptor_set(pool, &BindingLayout::skinned_uniforms())?;
        device.update_descriptor_set(
            uniform_set,
            &[DescriptorWrite::uniform_buffer(
                0,
                packed.buffer(),
                layout.uniform_offset,
                layout.uniform_size(),
            )],
        )?;

        let sampler_layout = BindingLayout::material_samplers(channels);
        let mut material_sets = BTreeMap::new();
        for (&index, material) in materials {
            let sets = (0..material.max_images())
                .map(|slot| {
                    let set = device.allocate_descriptor_set(pool, &sampler_layout)?;
                    device.update_descriptor_set(set, &material_writes(material, channels, slot))?;
                    Ok(set)
                })
                .collect::<GraphicsResult<Vec<_>>>()?;
            material_sets.insert(index, sets);
        }

        Ok(Self {
            pool,
            uniform_set,
            material_sets,
        })
    }

    /// The descriptor pool.
    pub fn pool(&self) -> DescriptorPoolHandle {
        self.pool
    }

    /// Set 0, shared by every draw.
    pub fn uniform_set(&self) -> DescriptorSetHandle {
        self.uniform_set
    }

    /// Sampler sets of a material, one per image slot.
    pub fn material_sets(&self, material: usize) -> &[DescriptorSetHandle] {
        self.material_sets
            .get(&material)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Sampler set of a material for one image slot.
    pub fn material_set(&self, material: usize, slot: usize) -> Option<DescriptorSetHandle> {
        self.material_sets(material).get(slot).copied()
    }

    /// Total number of allocated sets, including the uniform set.
    pub fn set_count(&self) -> usize {
        1 + self.material_sets.values().map(Vec::len).sum::<usize>()
    }

    /// Release the pool and all of its sets.
    pub fn destroy(self, device: &dyn RenderDevice) {
        device.destroy_descriptor_pool(self.pool);
    }
}
