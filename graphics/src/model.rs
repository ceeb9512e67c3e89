//! Skinned model: construction, per-frame update and draw.
//!
//! Construction runs the whole pipeline once:
//!
//! 1. import and validate the scene
//! 2. flatten meshes, materials and bones, loading each material texture once
//! 3. build the animated node hierarchy
//! 4. upload uniforms, vertices and indices into one packed buffer
//! 5. allocate the uniform set and the per-material sampler sets
//!
//! Each frame the caller records [`SkinnedModel::update`] before
//! [`SkinnedModel::draw`] into the same command stream.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use ossa_core::import::{load_scene, validate_scene, SceneImporter};
use ossa_core::math::Mat4;
use ossa_core::scene::{Scene, TextureChannel};
use ossa_core::skinning::{
    flatten_scene, BoneTable, Material, MeshRange, Pose, Skeleton, TextureRequest,
};
use ossa_core::AssetLoadError;
use thiserror::Error;

use crate::backend::{BufferHandle, DescriptorSetHandle, ImageHandle, RenderDevice};
use crate::camera::Camera;
use crate::command::CommandRecorder;
use crate::config::SkinnedModelConfig;
use crate::error::GraphicsError;
use crate::materials::{DescriptorPlan, ModelDescriptors};
use crate::resources::{PackedBuffer, PackedLayout, SkinnedUniforms, TextureLoader};
use crate::types::IndexFormat;

/// Errors that abort model construction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    /// The asset could not be imported or is unusable.
    #[error(transparent)]
    AssetLoad(#[from] AssetLoadError),
    /// A device resource could not be created.
    #[error("resource allocation failed: {0}")]
    ResourceAllocation(#[from] GraphicsError),
}

/// An animated, textured mesh set backed by one packed device buffer.
#[derive(Debug)]
pub struct SkinnedModel {
    path: PathBuf,
    channels: Vec<TextureChannel>,
    meshes: Vec<MeshRange>,
    materials: BTreeMap<usize, Material<ImageHandle>>,
    bones: BoneTable,
    skeleton: Skeleton,
    pose: Pose,
    uniforms: SkinnedUniforms,
    packed: PackedBuffer,
    descriptors: ModelDescriptors,
    vertex_count: usize,
    index_count: usize,
}

impl SkinnedModel {
    /// Import the asset at `path` and build the model.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::AssetLoad`] for import or validation failures and
    /// [`ModelError::ResourceAllocation`] if any device call fails. Device
    /// resources created before the failure are released.
    pub fn construct(
        device: &dyn RenderDevice,
        importer: &dyn SceneImporter,
        textures: &mut dyn TextureLoader,
        path: &Path,
        config: &SkinnedModelConfig,
    ) -> Result<Self, ModelError> {
        let scene = load_scene(importer, path, config.import_flags)?;
        Self::from_scene(device, textures, &scene, path, config)
    }

    /// Build the model from an already imported scene.
    ///
    /// `path` names the asset in errors and anchors relative texture paths.
    ///
    /// # Errors
    ///
    /// Same as [`SkinnedModel::construct`].
    pub fn from_scene(
        device: &dyn RenderDevice,
        textures: &mut dyn TextureLoader,
        scene: &Scene,
        path: &Path,
        config: &SkinnedModelConfig,
    ) -> Result<Self, ModelError> {
        validate_scene(scene, path)?;

        let channels = config.texture_channels.clone();
        let flattened = flatten_scene(scene, path, &channels, |request: &TextureRequest| {
            log::debug!(
                "Material {} {} texture {}: {}",
                request.material,
                request.channel.name(),
                request.slot,
                request.path.display()
            );
            textures
                .load(device, &request.path)
                .map_err(ModelError::ResourceAllocation)
        })?;
        let skeleton = Skeleton::build(scene, &flattened.bones, &config.clip_defaults);

        let uniforms = SkinnedUniforms {
            model: config.model_transform,
            ..SkinnedUniforms::default()
        };
        let packed =
            PackedBuffer::upload(device, &uniforms, &flattened.vertices, &flattened.indices)?;
        let plan = DescriptorPlan::new(&flattened.materials, flattened.sampler_slots);
        let descriptors = match ModelDescriptors::allocate(
            device,
            &plan,
            &flattened.materials,
            &channels,
            &packed,
        ) {
            Ok(descriptors) => descriptors,
            Err(e) => {
                packed.destroy(device);
                return Err(e.into());
            }
        };

        log::info!(
            "Loaded skinned model {}: {} meshes, {} vertices, {} bones, {} clips",
            path.display(),
            flattened.meshes.len(),
            flattened.vertices.len(),
            flattened.bones.len(),
            skeleton.clips().len()
        );

        Ok(Self {
            path: path.to_path_buf(),
            channels,
            vertex_count: flattened.vertices.len(),
            index_count: flattened.indices.len(),
            meshes: flattened.meshes,
            materials: flattened.materials,
            bones: flattened.bones,
            skeleton,
            pose: Pose::new(),
            uniforms,
            packed,
            descriptors,
        })
    }

    /// Pose the model for `elapsed` time into clip `clip` and record the
    /// uniform block upload.
    ///
    /// An out-of-range clip is logged and nothing is recorded; the previous
    /// pose stays on the device.
    pub fn update(
        &mut self,
        cmd: &mut dyn CommandRecorder,
        elapsed: Duration,
        camera: &dyn Camera,
        clip: usize,
    ) {
        if let Err(err) = self
            .skeleton
            .animate(elapsed.as_secs_f32(), clip, &mut self.pose)
        {
            log::error!("{}: {}", self.path.display(), err);
            return;
        }

        self.uniforms.set_bones(self.pose.bones());
        self.uniforms.view = camera.view();
        self.uniforms.proj = camera.projection();
        cmd.update_buffer(
            self.packed.buffer(),
            self.packed.layout().uniform_offset,
            self.uniforms.as_bytes(),
        );
    }

    /// Record the bind and draw commands for every mesh.
    pub fn draw(&self, cmd: &mut dyn CommandRecorder) {
        let buffer = self.packed.buffer();
        let layout = self.packed.layout();
        cmd.bind_vertex_buffer(0, buffer, layout.vertex_offset);
        cmd.bind_index_buffer(buffer, layout.index_offset, IndexFormat::Uint32);

        let uniform_set = self.descriptors.uniform_set();
        for mesh in &self.meshes {
            let Some(material_set) = self.descriptors.material_set(mesh.material, 0) else {
                log::warn!("Mesh with material {} has no descriptor set", mesh.material);
                continue;
            };
            cmd.bind_descriptor_sets(0, &[uniform_set, material_set]);
            cmd.draw_indexed(mesh.index_count, 1, mesh.base_index, 0, 0);
        }
    }

    /// Release the packed buffer and descriptor pool.
    ///
    /// Textures belong to the loader that created them.
    pub fn destroy(self, device: &dyn RenderDevice) {
        self.descriptors.destroy(device);
        self.packed.destroy(device);
    }

    /// Replace the model matrix used by the next [`SkinnedModel::update`].
    pub fn set_model_transform(&mut self, transform: Mat4) {
        self.uniforms.model = transform;
    }

    /// Asset path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Enabled texture channels.
    pub fn channels(&self) -> &[TextureChannel] {
        &self.channels
    }

    /// Mesh ranges in draw order.
    pub fn meshes(&self) -> &[MeshRange] {
        &self.meshes
    }

    /// Materials keyed by source material index.
    pub fn materials(&self) -> &BTreeMap<usize, Material<ImageHandle>> {
        &self.materials
    }

    /// Bone registry.
    pub fn bones(&self) -> &BoneTable {
        &self.bones
    }

    /// Animated node hierarchy.
    pub fn skeleton(&self) -> &Skeleton {
        &self.skeleton
    }

    /// Bone matrices of the last successful update.
    pub fn pose(&self) -> &Pose {
        &self.pose
    }

    /// Host copy of the uniform block.
    pub fn uniforms(&self) -> &SkinnedUniforms {
        &self.uniforms
    }

    /// Number of animation clips.
    pub fn clip_count(&self) -> usize {
        self.skeleton.clips().len()
    }

    /// Total vertex count.
    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    /// Total index count.
    pub fn index_count(&self) -> usize {
        self.index_count
    }

    /// The packed device buffer.
    pub fn buffer(&self) -> BufferHandle {
        self.packed.buffer()
    }

    /// Offsets inside the packed buffer.
    pub fn layout(&self) -> &PackedLayout {
        self.packed.layout()
    }

    /// The descriptor pool and sets.
    pub fn descriptors(&self) -> &ModelDescriptors {
        &self.descriptors
    }

    /// Set 0, shared by every draw.
    pub fn uniform_set(&self) -> DescriptorSetHandle {
        self.descriptors.uniform_set()
    }
}
