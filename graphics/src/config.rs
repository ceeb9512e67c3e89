//! Skinned model configuration.

use ossa_core::animation::ClipDefaults;
use ossa_core::import::ImportFlags;
use ossa_core::math::Mat4;
use ossa_core::scene::TextureChannel;

/// Options for constructing a [`SkinnedModel`](crate::SkinnedModel).
#[derive(Debug, Clone, PartialEq)]
pub struct SkinnedModelConfig {
    /// Flags passed to the scene importer.
    pub import_flags: ImportFlags,
    /// Texture channels loaded and bound, in binding order.
    pub texture_channels: Vec<TextureChannel>,
    /// Replacement cadence and duration for clips that lack them.
    pub clip_defaults: ClipDefaults,
    /// Initial model matrix.
    pub model_transform: Mat4,
}

impl Default for SkinnedModelConfig {
    fn default() -> Self {
        Self {
            import_flags: ImportFlags::DEFAULT,
            texture_channels: vec![TextureChannel::Diffuse],
            clip_defaults: ClipDefaults::default(),
            model_transform: Mat4::IDENTITY,
        }
    }
}

impl SkinnedModelConfig {
    /// Create the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the importer flags.
    #[must_use]
    pub fn with_import_flags(mut self, flags: ImportFlags) -> Self {
        self.import_flags = flags;
        self
    }

    /// Set the enabled texture channels.
    ///
    /// Duplicates are removed, keeping the first occurrence.
    #[must_use]
    pub fn with_texture_channels(
        mut self,
        channels: impl IntoIterator<Item = TextureChannel>,
    ) -> Self {
        self.texture_channels.clear();
        for channel in channels {
            if !self.texture_channels.contains(&channel) {
                self.texture_channels.push(channel);
            }
        }
        self
    }

    /// Set the clip defaults.
    #[must_use]
    pub fn with_clip_defaults(mut self, defaults: ClipDefaults) -> Self {
        self.clip_defaults = defaults;
        self
    }

    /// Set the initial model matrix.
    #[must_use]
    pub fn with_model_transform(mut self, transform: Mat4) -> Self {
        self.model_transform = transform;
        self
    }
}
