//! Shared fixtures for skinned model integration tests.
//!
//! Scenes are built in memory and models are constructed against the
//! dummy device, which keeps host copies of every buffer.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use ossa_core::animation::{AnimationClip, NodeChannel};
use ossa_core::import::{ImportFlags, SceneImporter};
use ossa_core::math::{Mat4, Vec3};
use ossa_core::scene::{
    NodeTransform, Scene, SceneBone, SceneMaterial, SceneMesh, SceneNode, TextureChannel,
};
use ossa_core::AssetLoadError;
use ossa_graphics::{
    DummyDevice, GraphicsResult, ImageDescriptor, ImageFormat, ImageHandle, RenderDevice,
    SkinnedModel, SkinnedModelConfig, SkinnedUniforms, TextureLoader,
};

/// Path the fixtures pretend to be loaded from.
pub const MODEL_PATH: &str = "assets/rig.gltf";

/// Install a test logger once.
pub fn init_logging() {
    let _ = env_logger::builder()
        .filter_level(log::LevelFilter::Debug)
        .is_test(true)
        .try_init();
}

/// Texture loader that records every request and creates 1x1 images.
#[derive(Debug, Default)]
pub struct CountingLoader {
    pub loads: Vec<PathBuf>,
}

impl TextureLoader for CountingLoader {
    fn load(&mut self, device: &dyn RenderDevice, path: &Path) -> GraphicsResult<ImageHandle> {
        self.loads.push(path.to_path_buf());
        let image = device.create_image(
            &ImageDescriptor::new(1, 1, ImageFormat::Rgba8Unorm)
                .with_label(path.display().to_string()),
        )?;
        device.write_image(image, &[255; 4])?;
        Ok(image)
    }
}

/// Importer returning a prepared scene.
pub struct FixedImporter(pub Scene);

impl SceneImporter for FixedImporter {
    fn import(&self, _path: &Path, _flags: ImportFlags) -> Result<Scene, AssetLoadError> {
        Ok(self.0.clone())
    }
}

fn translation(x: f32, y: f32, z: f32) -> [f32; 16] {
    Mat4::from_translation(Vec3::new(x, y, z)).to_cols_array()
}

/// One clip sliding `hips` from the origin to (1, 0, 0) over one second.
pub fn slide_clip() -> AnimationClip {
    AnimationClip::new(1.0, 1.0).with_name("slide").with_channel(
        NodeChannel::new("hips")
            .with_position_key(0.0, [0.0, 0.0, 0.0])
            .with_position_key(1.0, [1.0, 0.0, 0.0]),
    )
}

/// A triangle skinned to `hips` and `head`.
pub fn skinned_triangle(material: usize) -> SceneMesh {
    SceneMesh::new()
        .with_name("body")
        .with_positions(vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]])
        .with_normals(vec![[0.0, 0.0, 1.0]; 3])
        .with_tex_coords(vec![[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]])
        .with_faces(vec![[0, 1, 2]])
        .with_material(material)
        .with_bone(SceneBone::new("hips").with_weight(0, 1.0).with_weight(1, 0.5))
        .with_bone(
            SceneBone::new("head")
                .with_offset_matrix(translation(0.0, -1.0, 0.0))
                .with_weight(1, 0.5)
                .with_weight(2, 1.0),
        )
}

/// The two-bone rig:
///
/// ```text
/// Armature
/// |- hips      (bone 0, animated)
/// |  `- head   (bone 1, at y = 1)
/// `- body      (mesh 0)
/// ```
pub fn sliding_rig() -> Scene {
    rig_with_meshes(
        vec![skinned_triangle(0)],
        vec![SceneMaterial::new()
            .with_name("skin")
            .with_texture(TextureChannel::Diffuse, "textures/skin.png")],
    )
}

/// The rig with custom meshes, each attached to its own node under the root.
pub fn rig_with_meshes(meshes: Vec<SceneMesh>, materials: Vec<SceneMaterial>) -> Scene {
    let mesh_count = meshes.len();
    let mut scene = Scene::new()
        .with_meshes(meshes)
        .with_materials(materials)
        .with_animations(vec![slide_clip()]);
    let root = scene.add_node(None, SceneNode::new("Armature"));
    let hips = scene.add_node(Some(root), SceneNode::new("hips"));
    let head_rest = NodeTransform::IDENTITY.with_translation([0.0, 1.0, 0.0]);
    scene.add_node(Some(hips), SceneNode::new("head").with_transform(head_rest));
    for mesh in 0..mesh_count {
        scene.add_node(
            Some(root),
            SceneNode::new(format!("mesh{mesh}")).with_meshes(vec![mesh]),
        );
    }
    scene
}

/// Two triangles sharing material 0 and one quad using material 1, which has
/// two diffuse images and a height map.
pub fn three_mesh_rig() -> Scene {
    let quad = SceneMesh::new()
        .with_name("cape")
        .with_positions(vec![
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [1.0, 1.0, 0.0],
            [0.0, 1.0, 0.0],
        ])
        .with_faces(vec![[0, 1, 2], [0, 2, 3]])
        .with_material(1)
        .with_bone(SceneBone::new("hips").with_weight(3, 1.0));
    rig_with_meshes(
        vec![skinned_triangle(0), skinned_triangle(0), quad],
        vec![
            SceneMaterial::new()
                .with_name("skin")
                .with_texture(TextureChannel::Diffuse, "textures/skin.png"),
            SceneMaterial::new()
                .with_name("cape")
                .with_texture(TextureChannel::Diffuse, "textures/cape_a.png")
                .with_texture(TextureChannel::Diffuse, "textures/cape_b.png")
                .with_texture(TextureChannel::Height, "textures/cape_n.png"),
        ],
    )
}

/// Build a model from `scene` with a fresh counting loader.
pub fn build(
    device: &DummyDevice,
    scene: &Scene,
    config: &SkinnedModelConfig,
) -> (SkinnedModel, CountingLoader) {
    let mut loader = CountingLoader::default();
    let model = SkinnedModel::from_scene(device, &mut loader, scene, Path::new(MODEL_PATH), config)
        .expect("model construction");
    (model, loader)
}

/// Uniform block currently stored on the device.
pub fn device_uniforms(device: &DummyDevice, model: &SkinnedModel) -> SkinnedUniforms {
    let data = device.buffer_data(model.buffer()).expect("packed buffer");
    bytemuck::pod_read_unaligned(&data[..SkinnedUniforms::SIZE as usize])
}
