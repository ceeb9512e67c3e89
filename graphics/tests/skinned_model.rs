//! Integration tests for skinned model construction, update and draw.
//!
//! Every test runs against the dummy device. Uploaded data is read back from
//! its host copies after the recorded commands are submitted.

mod common;

use std::path::{Path, PathBuf};
use std::time::Duration;

use rstest::rstest;

use common::{
    build, device_uniforms, init_logging, rig_with_meshes, skinned_triangle, sliding_rig,
    three_mesh_rig, CountingLoader, FixedImporter, MODEL_PATH,
};
use ossa_core::error::AssetErrorKind;
use ossa_core::math::{mat4_translation, Mat4, Vec3};
use ossa_core::scene::{Scene, SceneFlags, TextureChannel};
use ossa_core::skinning::SkinnedVertex;
use ossa_core::AssetLoadError;
use ossa_graphics::{
    BufferUsage, Command, CommandList, DescriptorResource, DescriptorWrite, DummyDevice,
    GraphicsError, IndexFormat, ModelError, PerspectiveCamera, RenderDevice, SkinnedModel,
    SkinnedModelConfig, SkinnedUniforms, TextureCache,
};

fn seconds(s: f32) -> Duration {
    Duration::from_secs_f32(s)
}

// ============================================================================
// Construction
// ============================================================================

#[test]
fn test_construct_packs_single_buffer() {
    init_logging();
    let device = DummyDevice::new();
    let (model, _) = build(&device, &three_mesh_rig(), &SkinnedModelConfig::default());

    assert_eq!(model.vertex_count(), 10);
    assert_eq!(model.index_count(), 12);

    let layout = model.layout();
    assert_eq!(layout.uniform_offset, 0);
    assert_eq!(layout.vertex_offset, SkinnedUniforms::SIZE);
    assert_eq!(
        layout.index_offset,
        SkinnedUniforms::SIZE + 10 * u64::from(SkinnedVertex::STRIDE)
    );
    assert_eq!(layout.total_size, layout.index_offset + 12 * 4);

    // Staging is gone; only the packed buffer remains.
    assert_eq!(device.live_buffers(), 1);
    assert_eq!(device.copy_count(), 1);
    let descriptor = device.buffer_descriptor(model.buffer()).unwrap();
    assert_eq!(descriptor.size, layout.total_size);
    assert!(descriptor.usage.contains(BufferUsage::PACKED));
}

#[test]
fn test_indices_are_global() {
    let device = DummyDevice::new();
    let (model, _) = build(&device, &three_mesh_rig(), &SkinnedModelConfig::default());

    let data = device.buffer_data(model.buffer()).unwrap();
    let layout = model.layout();
    let indices: Vec<u32> = data[layout.index_offset as usize..]
        .chunks_exact(4)
        .map(|b| u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect();

    assert_eq!(indices, vec![0, 1, 2, 3, 4, 5, 6, 7, 8, 6, 8, 9]);
    assert!(indices.iter().all(|&i| (i as usize) < model.vertex_count()));
}

#[test]
fn test_vertices_carry_bone_weights() {
    let device = DummyDevice::new();
    let (model, _) = build(&device, &sliding_rig(), &SkinnedModelConfig::default());

    let data = device.buffer_data(model.buffer()).unwrap();
    let layout = model.layout();
    let stride = SkinnedVertex::STRIDE as usize;
    let vertex = |i: usize| -> SkinnedVertex {
        let start = layout.vertex_offset as usize + i * stride;
        bytemuck::pod_read_unaligned(&data[start..start + stride])
    };

    let shared = vertex(1);
    assert_eq!(shared.position, [1.0, 0.0, 0.0]);
    assert_eq!(shared.bone_indices[..2], [0, 1]);
    assert_eq!(shared.weights, [0.5, 0.5, 0.0, 0.0]);
    assert_eq!(vertex(2).weights, [1.0, 0.0, 0.0, 0.0]);
    assert_eq!(vertex(2).bone_indices[0], 1);
}

#[test]
fn test_material_textures_loaded_once() {
    let device = DummyDevice::new();
    let (model, loader) = build(&device, &three_mesh_rig(), &SkinnedModelConfig::default());

    assert_eq!(
        loader.loads,
        vec![
            PathBuf::from("assets/textures/skin.png"),
            PathBuf::from("assets/textures/cape_a.png"),
            PathBuf::from("assets/textures/cape_b.png"),
        ]
    );
    assert_eq!(model.materials().len(), 2);
    assert_eq!(model.meshes()[0].material, model.meshes()[1].material);
    assert_eq!(device.live_images(), 3);
}

#[test]
fn test_texture_cache_shares_paths_across_models() {
    let device = DummyDevice::new();
    let mut cache = TextureCache::new(CountingLoader::default());
    let config = SkinnedModelConfig::default();
    let path = Path::new(MODEL_PATH);

    let first =
        SkinnedModel::from_scene(&device, &mut cache, &sliding_rig(), path, &config).unwrap();
    let second =
        SkinnedModel::from_scene(&device, &mut cache, &sliding_rig(), path, &config).unwrap();

    assert_eq!(cache.loader().loads.len(), 1);
    assert_eq!(first.materials(), second.materials());
}

#[test]
fn test_bones_shared_between_meshes() {
    let device = DummyDevice::new();
    let (model, _) = build(&device, &three_mesh_rig(), &SkinnedModelConfig::default());

    assert_eq!(model.bones().names(), ["hips", "head"]);
    assert_eq!(model.skeleton().bone_count(), 2);
    assert_eq!(model.skeleton().root().map(|n| n.name.as_str()), Some("Armature"));
}

#[test]
fn test_construct_through_importer() {
    let device = DummyDevice::new();
    let importer = FixedImporter(sliding_rig());
    let mut loader = CountingLoader::default();

    let model = SkinnedModel::construct(
        &device,
        &importer,
        &mut loader,
        Path::new(MODEL_PATH),
        &SkinnedModelConfig::default(),
    )
    .unwrap();

    assert_eq!(model.path(), Path::new(MODEL_PATH));
    assert_eq!(model.clip_count(), 1);
}

// ============================================================================
// Construction failures
// ============================================================================

#[rstest]
#[case::no_meshes(rig_with_meshes(Vec::new(), Vec::new()), AssetErrorKind::NoMeshes)]
#[case::no_animations(sliding_rig().with_animations(Vec::new()), AssetErrorKind::NoAnimations)]
#[case::incomplete(sliding_rig().with_flags(SceneFlags::INCOMPLETE), AssetErrorKind::Incomplete)]
#[case::missing_root(
    Scene::new().with_meshes(vec![skinned_triangle(0)]),
    AssetErrorKind::MissingRoot
)]
fn test_construct_rejects_invalid_scene(#[case] scene: Scene, #[case] kind: AssetErrorKind) {
    let device = DummyDevice::new();
    let mut loader = CountingLoader::default();

    let err = SkinnedModel::from_scene(
        &device,
        &mut loader,
        &scene,
        Path::new(MODEL_PATH),
        &SkinnedModelConfig::default(),
    )
    .unwrap_err();

    assert_eq!(err, ModelError::AssetLoad(AssetLoadError::new(MODEL_PATH, kind)));
    assert!(err.to_string().ends_with("for scene: assets/rig.gltf"));
    assert_eq!(device.live_buffers(), 0);
    assert!(loader.loads.is_empty());
}

#[test]
fn test_out_of_memory_is_fatal() {
    let device = DummyDevice::new().with_memory_budget(5000);
    let mut loader = CountingLoader::default();

    let err = SkinnedModel::from_scene(
        &device,
        &mut loader,
        &sliding_rig(),
        Path::new(MODEL_PATH),
        &SkinnedModelConfig::default(),
    )
    .unwrap_err();

    assert_eq!(err, ModelError::ResourceAllocation(GraphicsError::OutOfMemory));
    assert_eq!(device.live_buffers(), 0);
    assert_eq!(device.live_pools(), 0);
}

#[test]
fn test_destroy_releases_model_resources() {
    let device = DummyDevice::new();
    let (model, _) = build(&device, &sliding_rig(), &SkinnedModelConfig::default());
    assert_eq!(device.live_pools(), 1);

    model.destroy(&device);

    assert_eq!(device.live_buffers(), 0);
    assert_eq!(device.live_pools(), 0);
    // Textures stay with their loader.
    assert_eq!(device.live_images(), 1);
}

// ============================================================================
// Descriptors
// ============================================================================

#[rstest]
#[case::diffuse(vec![TextureChannel::Diffuse], 4)]
#[case::diffuse_height(vec![TextureChannel::Diffuse, TextureChannel::Height], 5)]
#[case::all(TextureChannel::ALL.to_vec(), 9)]
fn test_pool_bound_covers_sets(#[case] channels: Vec<TextureChannel>, #[case] max_sets: u32) {
    let device = DummyDevice::new();
    let config = SkinnedModelConfig::new().with_texture_channels(channels);
    let (model, _) = build(&device, &three_mesh_rig(), &config);

    let pool = model.descriptors().pool();
    let descriptor = device.pool_descriptor(pool).unwrap();
    assert_eq!(descriptor.max_sets, max_sets);

    // Uniform set, one set for the skin, two for the cape.
    assert_eq!(device.allocated_sets(pool), Some(4));
    assert_eq!(model.descriptors().set_count(), 4);
    assert!(4 <= descriptor.max_sets);
}

#[test]
fn test_pool_exhaustion_beyond_bound() {
    let device = DummyDevice::new();
    let (model, _) = build(&device, &three_mesh_rig(), &SkinnedModelConfig::default());
    let pool = model.descriptors().pool();
    let max_sets = device.pool_descriptor(pool).unwrap().max_sets;
    let layout = ossa_graphics::BindingLayout::material_samplers(&[TextureChannel::Diffuse]);

    let allocated = device.allocated_sets(pool).unwrap();
    for _ in allocated..max_sets {
        device.allocate_descriptor_set(pool, &layout).unwrap();
    }
    assert_eq!(
        device.allocate_descriptor_set(pool, &layout),
        Err(GraphicsError::DescriptorPoolExhausted { max_sets })
    );
}

#[test]
fn test_material_sets_per_image_slot() {
    let device = DummyDevice::new();
    let config = SkinnedModelConfig::new()
        .with_texture_channels([TextureChannel::Diffuse, TextureChannel::Height]);
    let (model, _) = build(&device, &three_mesh_rig(), &config);

    let cape = &model.materials()[&1];
    let diffuse = cape.images(TextureChannel::Diffuse);
    let height = cape.images(TextureChannel::Height);
    assert_eq!(diffuse.len(), 2);
    assert_eq!(height.len(), 1);

    let sets = model.descriptors().material_sets(1);
    assert_eq!(sets.len(), 2);
    assert_eq!(
        device.descriptor_writes(sets[0]),
        vec![
            DescriptorWrite::combined_image_sampler(0, diffuse[0]),
            DescriptorWrite::combined_image_sampler(2, height[0]),
        ]
    );
    // Slot 1 only has a second diffuse image; the height binding stays empty.
    assert_eq!(
        device.descriptor_writes(sets[1]),
        vec![DescriptorWrite::combined_image_sampler(0, diffuse[1])]
    );
}

#[test]
fn test_uniform_set_points_at_uniform_region() {
    let device = DummyDevice::new();
    let (model, _) = build(&device, &sliding_rig(), &SkinnedModelConfig::default());

    assert_eq!(
        device.descriptor_writes(model.uniform_set()),
        vec![DescriptorWrite {
            binding: 0,
            resource: DescriptorResource::UniformBuffer {
                buffer: model.buffer(),
                offset: 0,
                range: SkinnedUniforms::SIZE,
            },
        }]
    );
}

// ============================================================================
// Update
// ============================================================================

#[rstest]
#[case::start(0.0, 0.0)]
#[case::quarter(0.25, 0.25)]
#[case::half(0.5, 0.5)]
#[case::wrapped(1.5, 0.5)]
fn test_update_writes_pose(#[case] elapsed: f32, #[case] expected_x: f32) {
    let device = DummyDevice::new();
    let (mut model, _) = build(&device, &sliding_rig(), &SkinnedModelConfig::default());
    let camera = PerspectiveCamera::default();

    let mut cmd = CommandList::new();
    model.update(&mut cmd, seconds(elapsed), &camera, 0);
    device.submit(&cmd).unwrap();

    let uniforms = device_uniforms(&device, &model);
    let expected = Vec3::new(expected_x, 0.0, 0.0);
    assert!(mat4_translation(&uniforms.bones[0]).abs_diff_eq(expected, 1e-5));
    // The head sits one unit above the hips and its offset undoes that.
    assert!(mat4_translation(&uniforms.bones[1]).abs_diff_eq(expected, 1e-5));
    assert_eq!(uniforms.bones[2], Mat4::IDENTITY);
}

#[test]
fn test_update_writes_camera_and_model() {
    use ossa_graphics::Camera;

    let device = DummyDevice::new();
    let model_transform = Mat4::from_translation(Vec3::new(0.0, 0.0, -3.0));
    let config = SkinnedModelConfig::new().with_model_transform(model_transform);
    let (mut model, _) = build(&device, &sliding_rig(), &config);
    let camera = PerspectiveCamera::new(Vec3::new(2.0, 2.0, 2.0), 1.0, 1.5, 0.1, 50.0);

    let mut cmd = CommandList::new();
    model.update(&mut cmd, seconds(0.0), &camera, 0);

    assert_eq!(cmd.len(), 1);
    let Command::UpdateBuffer { buffer, offset, data } = &cmd.commands()[0] else {
        panic!("expected a buffer update, got {:?}", cmd.commands()[0]);
    };
    assert_eq!(*buffer, model.buffer());
    assert_eq!(*offset, model.layout().uniform_offset);
    assert_eq!(data.len() as u64, SkinnedUniforms::SIZE);

    device.submit(&cmd).unwrap();
    let uniforms = device_uniforms(&device, &model);
    assert_eq!(uniforms.model, model_transform);
    assert_eq!(uniforms.view, camera.view());
    assert_eq!(uniforms.proj, camera.projection());
}

#[test]
fn test_update_loops_over_clip() {
    let device = DummyDevice::new();
    let (mut model, _) = build(&device, &sliding_rig(), &SkinnedModelConfig::default());
    let camera = PerspectiveCamera::default();

    let mut cmd = CommandList::new();
    model.update(&mut cmd, seconds(0.25), &camera, 0);
    let first = model.uniforms().bones;
    model.update(&mut cmd, seconds(1.25), &camera, 0);
    let second = model.uniforms().bones;
    model.update(&mut cmd, seconds(2.25), &camera, 0);

    assert_eq!(first, second);
    assert_eq!(second, model.uniforms().bones);
}

#[test]
fn test_out_of_range_clip_keeps_previous_pose() {
    init_logging();
    let device = DummyDevice::new();
    let (mut model, _) = build(&device, &sliding_rig(), &SkinnedModelConfig::default());
    let camera = PerspectiveCamera::default();

    let mut cmd = CommandList::new();
    model.update(&mut cmd, seconds(0.5), &camera, 0);
    device.submit(&cmd).unwrap();
    let before = device_uniforms(&device, &model);

    let mut cmd = CommandList::new();
    model.update(&mut cmd, seconds(0.75), &camera, 1);

    assert!(cmd.is_empty());
    assert_eq!(model.uniforms().bones, before.bones);
    assert_eq!(device_uniforms(&device, &model), before);
}

// ============================================================================
// Draw
// ============================================================================

#[test]
fn test_draw_command_sequence() {
    let device = DummyDevice::new();
    let (model, _) = build(&device, &three_mesh_rig(), &SkinnedModelConfig::default());
    let buffer = model.buffer();
    let layout = *model.layout();
    let uniform = model.uniform_set();
    let skin = model.descriptors().material_set(0, 0).unwrap();
    let cape = model.descriptors().material_set(1, 0).unwrap();

    let mut cmd = CommandList::new();
    model.draw(&mut cmd);

    let draw = |index_count, first_index| Command::DrawIndexed {
        index_count,
        instance_count: 1,
        first_index,
        base_vertex: 0,
        first_instance: 0,
    };
    let bind = |material| Command::BindDescriptorSets {
        first_set: 0,
        sets: vec![uniform, material],
    };
    assert_eq!(
        cmd.commands(),
        [
            Command::BindVertexBuffer {
                slot: 0,
                buffer,
                offset: layout.vertex_offset,
            },
            Command::BindIndexBuffer {
                buffer,
                offset: layout.index_offset,
                format: IndexFormat::Uint32,
            },
            bind(skin),
            draw(3, 0),
            bind(skin),
            draw(3, 3),
            bind(cape),
            draw(6, 6),
        ]
    );
    device.submit(&cmd).unwrap();
}

#[test]
fn test_update_then_draw_frame() {
    let device = DummyDevice::new();
    let (mut model, _) = build(&device, &sliding_rig(), &SkinnedModelConfig::default());
    let camera = PerspectiveCamera::default();

    let mut cmd = CommandList::new();
    model.update(&mut cmd, seconds(0.5), &camera, 0);
    model.draw(&mut cmd);

    assert!(matches!(cmd.commands()[0], Command::UpdateBuffer { .. }));
    assert_eq!(cmd.draws().count(), 1);
    device.submit(&cmd).unwrap();
}
