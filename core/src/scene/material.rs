//! Imported material data: texture paths grouped by channel.

use std::collections::BTreeMap;

/// Semantic texture channel of a material.
///
/// Each channel maps to a fixed sampler binding in the skinned shader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TextureChannel {
    /// Base color.
    Diffuse,
    /// Specular / metallic-roughness.
    Specular,
    /// Height or normal map.
    Height,
    /// Ambient occlusion.
    Ambient,
}

impl TextureChannel {
    /// All channels in binding order.
    pub const ALL: [TextureChannel; 4] = [
        TextureChannel::Diffuse,
        TextureChannel::Specular,
        TextureChannel::Height,
        TextureChannel::Ambient,
    ];

    /// Sampler binding number used by the skinned shader.
    pub const fn binding(self) -> u32 {
        match self {
            Self::Diffuse => 0,
            Self::Specular => 1,
            Self::Height => 2,
            Self::Ambient => 3,
        }
    }

    /// Lowercase channel name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Diffuse => "diffuse",
            Self::Specular => "specular",
            Self::Height => "height",
            Self::Ambient => "ambient",
        }
    }
}

/// A source material: an ordered list of texture paths per channel.
///
/// Paths are as stored in the asset, usually relative to the model file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SceneMaterial {
    /// Material name, if any.
    pub name: Option<String>,
    textures: BTreeMap<TextureChannel, Vec<String>>,
}

impl SceneMaterial {
    /// Creates a material without textures.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the material name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Append a texture to a channel.
    #[must_use]
    pub fn with_texture(mut self, channel: TextureChannel, path: impl Into<String>) -> Self {
        self.add_texture(channel, path);
        self
    }

    /// Append a texture to a channel.
    pub fn add_texture(&mut self, channel: TextureChannel, path: impl Into<String>) {
        self.textures.entry(channel).or_default().push(path.into());
    }

    /// Texture paths of a channel, in slot order.
    pub fn textures(&self, channel: TextureChannel) -> &[String] {
        self.textures
            .get(&channel)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Number of textures across all channels.
    pub fn texture_count(&self) -> usize {
        self.textures.values().map(Vec::len).sum()
    }
}
