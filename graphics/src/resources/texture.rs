//! Texture loading.
//!
//! Skinned models request each material texture through a [`TextureLoader`].
//! [`TextureCache`] memoizes any loader by path so a texture shared by several
//! materials is decoded and uploaded once. [`FileTextureLoader`] decodes image
//! files with the `image` crate.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::backend::{ImageHandle, RenderDevice};
use crate::error::{GraphicsError, GraphicsResult};
use crate::types::{ImageDescriptor, ImageFormat};

/// Creates a sampled device image from a texture path.
pub trait TextureLoader {
    /// Load the texture at `path` into a new device image.
    fn load(&mut self, device: &dyn RenderDevice, path: &Path) -> GraphicsResult<ImageHandle>;
}

/// Decodes image files from disk and uploads them as RGBA8.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileTextureLoader {
    format: ImageFormat,
}

impl FileTextureLoader {
    /// Create a loader producing sRGB images.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the device format of loaded images.
    #[must_use]
    pub fn with_format(mut self, format: ImageFormat) -> Self {
        self.format = format;
        self
    }
}

impl TextureLoader for FileTextureLoader {
    fn load(&mut self, device: &dyn RenderDevice, path: &Path) -> GraphicsResult<ImageHandle> {
        let pixels = image::open(path)
            .map_err(|e| GraphicsError::ImageDecode {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?
            .to_rgba8();
        let (width, height) = pixels.dimensions();
        log::debug!("Loaded texture {} ({}x{})", path.display(), width, height);

        let descriptor = ImageDescriptor::new(width, height, self.format)
            .with_label(path.display().to_string());
        let image = device.create_image(&descriptor)?;
        if let Err(e) = device.write_image(image, pixels.as_raw()) {
            device.destroy_image(image);
            return Err(e);
        }
        Ok(image)
    }
}

/// Loads each distinct texture path once.
#[derive(Debug, Default)]
pub struct TextureCache<L> {
    loader: L,
    images: HashMap<PathBuf, ImageHandle>,
}

impl<L: TextureLoader> TextureCache<L> {
    /// Wrap a loader.
    pub fn new(loader: L) -> Self {
        Self {
            loader,
            images: HashMap::new(),
        }
    }

    /// Image previously loaded for `path`.
    pub fn get(&self, path: &Path) -> Option<ImageHandle> {
        self.images.get(path).copied()
    }

    /// Number of distinct textures loaded.
    pub fn len(&self) -> usize {
        self.images.len()
    }

    /// Whether nothing has been loaded yet.
    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// The wrapped loader.
    pub fn loader(&self) -> &L {
        &self.loader
    }

    /// Destroy every cached image.
    pub fn clear(&mut self, device: &dyn RenderDevice) {
        for (_, image) in self.images.drain() {
            device.destroy_image(image);
        }
    }
}

impl<L: TextureLoader> TextureLoader for TextureCache<L> {
    fn load(&mut self, device: &dyn RenderDevice, path: &Path) -> GraphicsResult<ImageHandle> {
        if let Some(image) = self.get(path) {
            log::trace!("Texture cache hit: {}", path.display());
            return Ok(image);
        }
        let image = self.loader.load(device, path)?;
        self.images.insert(path.to_path_buf(), image);
        Ok(image)
    }
}

#[cfg(all(test, feature = "dummy"))]
mod tests {
    use super::*;
    use crate::backend::dummy::DummyDevice;

    #[derive(Default)]
    struct Counting {
        loads: Vec<PathBuf>,
    }

    impl TextureLoader for Counting {
        fn load(&mut self, device: &dyn RenderDevice, path: &Path) -> GraphicsResult<ImageHandle> {
            self.loads.push(path.to_path_buf());
            device.create_image(&ImageDescriptor::new(1, 1, ImageFormat::Rgba8Unorm))
        }
    }

    #[test]
    fn test_cache_loads_each_path_once() {
        let device = DummyDevice::new();
        let mut cache = TextureCache::new(Counting::default());

        let a = cache.load(&device, Path::new("skin.png")).unwrap();
        let b = cache.load(&device, Path::new("skin.png")).unwrap();
        let c = cache.load(&device, Path::new("eyes.png")).unwrap();

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.loader().loads.len(), 2);

        cache.clear(&device);
        assert!(cache.is_empty());
        assert_eq!(device.live_images(), 0);
    }

    #[test]
    fn test_file_loader_decodes_png() {
        let dir = std::env::temp_dir().join(format!("ossa-texture-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("checker.png");
        image::RgbaImage::from_pixel(2, 3, image::Rgba([255, 0, 0, 255]))
            .save(&path)
            .unwrap();

        let device = DummyDevice::new();
        let image = FileTextureLoader::new().load(&device, &path).unwrap();

        let descriptor = device.image_descriptor(image).unwrap();
        assert_eq!((descriptor.width, descriptor.height), (2, 3));
        assert_eq!(descriptor.format, ImageFormat::Rgba8UnormSrgb);
        assert!(device.image_written(image));
    }

    #[test]
    fn test_file_loader_missing_file() {
        let device = DummyDevice::new();
        let err = FileTextureLoader::new()
            .load(&device, Path::new("/nonexistent/ossa/missing.png"))
            .unwrap_err();

        assert!(matches!(err, GraphicsError::ImageDecode { .. }));
        assert_eq!(device.live_images(), 0);
    }
}
