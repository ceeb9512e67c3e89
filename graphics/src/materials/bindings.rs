//! Binding layout definitions.
//!
//! Bindings describe what resources a shader expects in one descriptor set.
//! Skinned models use two layouts: [`BindingLayout::skinned_uniforms`] for
//! set 0 and [`BindingLayout::material_samplers`] for set 1.

use ossa_core::scene::TextureChannel;

/// Type of resource that can be bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BindingType {
    /// Uniform buffer (read-only, small, frequently updated).
    UniformBuffer,

    /// Combined image and sampler.
    CombinedImageSampler,
}

/// Describes a single binding slot in a layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingLayoutEntry {
    /// Binding index within the set.
    pub binding: u32,

    /// Type of resource expected at this binding.
    pub binding_type: BindingType,

    /// Shader stages that can access this binding.
    pub visibility: ShaderStageFlags,

    /// The binding may be left without a descriptor.
    pub partially_bound: bool,

    /// Optional label for debugging.
    pub label: Option<String>,
}

impl BindingLayoutEntry {
    /// Create a new binding layout entry.
    pub fn new(binding: u32, binding_type: BindingType) -> Self {
        Self {
            binding,
            binding_type,
            visibility: ShaderStageFlags::VERTEX | ShaderStageFlags::FRAGMENT,
            partially_bound: false,
            label: None,
        }
    }

    /// Set the shader stage visibility.
    #[must_use]
    pub fn with_visibility(mut self, visibility: ShaderStageFlags) -> Self {
        self.visibility = visibility;
        self
    }

    /// Allow the binding to stay unwritten.
    #[must_use]
    pub fn with_partially_bound(mut self) -> Self {
        self.partially_bound = true;
        self
    }

    /// Set a debug label.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

bitflags::bitflags! {
    /// Shader stages that can access a binding.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ShaderStageFlags: u32 {
        /// Vertex shader stage.
        const VERTEX = 1 << 0;
        /// Fragment shader stage.
        const FRAGMENT = 1 << 1;
    }
}

/// Describes the layout of bindings for one descriptor set.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BindingLayout {
    /// The binding entries in this layout.
    pub entries: Vec<BindingLayoutEntry>,

    /// Optional label for debugging.
    pub label: Option<String>,
}

impl BindingLayout {
    /// Create a new empty binding layout.
    pub fn new() -> Self {
        Self::default()
    }

    /// Layout of the skinned uniform block: one uniform buffer at binding 0,
    /// read by the vertex stage.
    pub fn skinned_uniforms() -> Self {
        Self::new()
            .with_entry(
                BindingLayoutEntry::new(0, BindingType::UniformBuffer)
                    .with_visibility(ShaderStageFlags::VERTEX),
            )
            .with_label("skinned_uniforms")
    }

    /// Layout of a material set: one partially bound sampler per enabled
    /// channel, at the channel's fixed binding.
    pub fn material_samplers(channels: &[TextureChannel]) -> Self {
        channels
            .iter()
            .fold(Self::new(), |layout, channel| {
                layout.with_entry(
                    BindingLayoutEntry::new(channel.binding(), BindingType::CombinedImageSampler)
                        .with_visibility(ShaderStageFlags::FRAGMENT)
                        .with_partially_bound()
                        .with_label(channel.name()),
                )
            })
            .with_label("material_samplers")
    }

    /// Add a binding entry to the layout.
    #[must_use]
    pub fn with_entry(mut self, entry: BindingLayoutEntry) -> Self {
        self.entries.push(entry);
        self
    }

    /// Add a uniform buffer binding.
    #[must_use]
    pub fn with_uniform_buffer(self, binding: u32) -> Self {
        self.with_entry(BindingLayoutEntry::new(binding, BindingType::UniformBuffer))
    }

    /// Add a combined image+sampler binding.
    #[must_use]
    pub fn with_combined_image_sampler(self, binding: u32) -> Self {
        self.with_entry(BindingLayoutEntry::new(
            binding,
            BindingType::CombinedImageSampler,
        ))
    }

    /// Set a debug label.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Entry declared at `binding`.
    pub fn entry(&self, binding: u32) -> Option<&BindingLayoutEntry> {
        self.entries.iter().find(|e| e.binding == binding)
    }

    /// Number of entries of the given type.
    pub fn count(&self, binding_type: BindingType) -> u32 {
        self.entries
            .iter()
            .filter(|e| e.binding_type == binding_type)
            .count() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binding_layout_builder() {
        let layout = BindingLayout::new()
            .with_uniform_buffer(0)
            .with_combined_image_sampler(1)
            .with_label("material_bindings");

        assert_eq!(layout.entries.len(), 2);
        assert_eq!(layout.label, Some("material_bindings".to_string()));
        assert_eq!(layout.count(BindingType::CombinedImageSampler), 1);
    }

    #[test]
    fn test_binding_entry_visibility() {
        let entry = BindingLayoutEntry::new(0, BindingType::UniformBuffer)
            .with_visibility(ShaderStageFlags::VERTEX);

        assert_eq!(entry.visibility, ShaderStageFlags::VERTEX);
        assert!(!entry.visibility.contains(ShaderStageFlags::FRAGMENT));
        assert!(!entry.partially_bound);
    }

    #[test]
    fn test_material_samplers_use_channel_bindings() {
        let layout =
            BindingLayout::material_samplers(&[TextureChannel::Diffuse, TextureChannel::Height]);

        assert_eq!(layout.entries.len(), 2);
        let height = layout.entry(2).expect("height binding");
        assert_eq!(height.binding_type, BindingType::CombinedImageSampler);
        assert!(height.partially_bound);
        assert_eq!(height.visibility, ShaderStageFlags::FRAGMENT);
        assert!(layout.entry(1).is_none());
    }

    #[test]
    fn test_skinned_uniforms_layout() {
        let layout = BindingLayout::skinned_uniforms();
        let entry = layout.entry(0).expect("uniform binding");
        assert_eq!(entry.binding_type, BindingType::UniformBuffer);
        assert_eq!(layout.count(BindingType::CombinedImageSampler), 0);
    }
}
