//! Internal glTF conversion logic.
//!
//! The [`LoadContext`] holds the parsed document and its resolved buffers
//! while nodes, meshes, skins, materials and animations are converted.

use std::collections::HashMap;

use crate::animation::{AnimationClip, NodeChannel, QuatKey, VectorKey};
use crate::import::ImportFlags;
use crate::math::{Mat4, Vec3};
use crate::scene::{
    NodeId, NodeTransform, Scene, SceneBone, SceneMaterial, SceneMesh, SceneNode, TextureChannel,
    VertexWeight,
};

use gltf_dep::animation::util::ReadOutputs;

use super::GltfError;

/// Name given to the synthetic root when a glTF scene has several roots.
pub(crate) const SYNTHETIC_ROOT: &str = "Scene";

/// Internal loading context that holds resolved data during conversion.
pub(crate) struct LoadContext {
    /// The parsed glTF document.
    document: gltf_dep::Document,
    /// Resolved buffer data (one entry per glTF buffer).
    buffers: Vec<gltf_dep::buffer::Data>,
    flags: ImportFlags,
    /// Node names, unique within the document.
    node_names: Vec<String>,
}

impl LoadContext {
    /// Create a context from a parsed document and its buffers.
    pub fn new(
        document: gltf_dep::Document,
        buffers: Vec<gltf_dep::buffer::Data>,
        flags: ImportFlags,
    ) -> Self {
        let node_names = document
            .nodes()
            .map(|node| match node.name() {
                Some(name) => name.to_string(),
                None => format!("node{}", node.index()),
            })
            .collect();
        Self {
            document,
            buffers,
            flags,
            node_names,
        }
    }

    fn buffer(&self, buffer: gltf_dep::Buffer<'_>) -> Option<&[u8]> {
        self.buffers.get(buffer.index()).map(|data| data.0.as_slice())
    }

    /// Convert the default scene (or the first one) into a [`Scene`].
    pub fn load_scene(&self) -> Result<Scene, GltfError> {
        let source = self
            .document
            .default_scene()
            .or_else(|| self.document.scenes().next())
            .ok_or(GltfError::NoScene)?;

        let mut scene = Scene::new()
            .with_materials(self.load_materials())
            .with_animations(self.load_animations()?);
        if let Some(name) = source.name() {
            scene = scene.with_name(name);
        }
        let default_material = scene.materials.len();

        let roots: Vec<gltf_dep::Node<'_>> = source.nodes().collect();
        let mut stack: Vec<(gltf_dep::Node<'_>, Option<NodeId>)> = Vec::new();
        if let [root] = roots.as_slice() {
            stack.push((root.clone(), None));
        } else {
            let root = scene.add_node(None, SceneNode::new(SYNTHETIC_ROOT));
            stack.extend(roots.into_iter().rev().map(|node| (node, Some(root))));
        }

        let mut needs_default_material = false;
        while let Some((node, parent)) = stack.pop() {
            let mut scene_node = SceneNode::new(self.node_names[node.index()].clone())
                .with_transform(node_transform(&node));
            if let Some(mesh) = node.mesh() {
                for primitive in mesh.primitives() {
                    let Some(converted) = self.load_primitive(&mesh, &primitive, node.skin())?
                    else {
                        continue;
                    };
                    let converted = match primitive.material().index() {
                        Some(material) => converted.with_material(material),
                        None => {
                            needs_default_material = true;
                            converted.with_material(default_material)
                        }
                    };
                    scene_node.meshes.push(scene.meshes.len());
                    scene.meshes.push(converted);
                }
            }
            let id = scene.add_node(parent, scene_node);
            let children: Vec<_> = node.children().collect();
            stack.extend(children.into_iter().rev().map(|child| (child, Some(id))));
        }
        if needs_default_material {
            scene.materials.push(SceneMaterial::new().with_name("default"));
        }
        Ok(scene)
    }

    /// Convert one triangle primitive. Other topologies are skipped.
    fn load_primitive(
        &self,
        mesh: &gltf_dep::Mesh<'_>,
        primitive: &gltf_dep::Primitive<'_>,
        skin: Option<gltf_dep::Skin<'_>>,
    ) -> Result<Option<SceneMesh>, GltfError> {
        if primitive.mode() != gltf_dep::mesh::Mode::Triangles {
            log::warn!(
                "Skipping primitive {} of mesh {}: unsupported mode {:?}",
                primitive.index(),
                mesh.index(),
                primitive.mode()
            );
            return Ok(None);
        }

        let reader = primitive.reader(|buffer| self.buffer(buffer));
        let positions: Vec<[f32; 3]> = reader
            .read_positions()
            .ok_or(GltfError::MissingPositions {
                mesh: mesh.index(),
                primitive: primitive.index(),
            })?
            .collect();
        let vertex_count = positions.len() as u32;

        let normals: Vec<[f32; 3]> = reader
            .read_normals()
            .map(Iterator::collect)
            .unwrap_or_default();
        let mut tex_coords: Vec<[f32; 2]> = reader
            .read_tex_coords(0)
            .map(|uv| uv.into_f32().collect())
            .unwrap_or_default();
        if self.flags.contains(ImportFlags::FLIP_UVS) {
            for uv in &mut tex_coords {
                uv[1] = 1.0 - uv[1];
            }
        }

        type Basis = (Vec<[f32; 3]>, Vec<[f32; 3]>);
        let (tangents, bitangents): Basis = match reader.read_tangents() {
            Some(tangents) if !normals.is_empty() => tangents
                .zip(&normals)
                .map(|(t, n)| {
                    let tangent = Vec3::new(t[0], t[1], t[2]);
                    let bitangent = Vec3::from(*n).cross(tangent) * t[3];
                    (tangent.to_array(), bitangent.to_array())
                })
                .unzip(),
            _ => (Vec::new(), Vec::new()),
        };

        let indices: Vec<u32> = match reader.read_indices() {
            Some(indices) => indices.into_u32().collect(),
            None => (0..vertex_count).collect(),
        };
        let faces = indices
            .chunks_exact(3)
            .map(|tri| [tri[0], tri[1], tri[2]])
            .collect();

        let mut scene_mesh = SceneMesh::new()
            .with_positions(positions)
            .with_normals(normals)
            .with_tangents(tangents, bitangents)
            .with_tex_coords(tex_coords)
            .with_faces(faces);
        if let Some(name) = mesh.name() {
            scene_mesh = scene_mesh.with_name(name);
        }

        if let Some(skin) = skin {
            let influences: Vec<([u16; 4], [f32; 4])> =
                match (reader.read_joints(0), reader.read_weights(0)) {
                    (Some(joints), Some(weights)) => {
                        joints.into_u16().zip(weights.into_f32()).collect()
                    }
                    _ => Vec::new(),
                };
            scene_mesh.bones = self.load_bones(&skin, &influences)?;
        }
        Ok(Some(scene_mesh))
    }

    /// Build per-mesh bones from a skin and per-vertex joint influences.
    ///
    /// Joints that influence no vertex of this primitive are dropped.
    fn load_bones(
        &self,
        skin: &gltf_dep::Skin<'_>,
        influences: &[([u16; 4], [f32; 4])],
    ) -> Result<Vec<SceneBone>, GltfError> {
        let inverse_binds: Vec<[f32; 16]> = skin
            .reader(|buffer| self.buffer(buffer))
            .read_inverse_bind_matrices()
            .map(|matrices| {
                matrices
                    .map(|m| Mat4::from_cols_array_2d(&m).to_cols_array())
                    .collect()
            })
            .unwrap_or_default();

        let mut bones: Vec<SceneBone> = skin
            .joints()
            .enumerate()
            .map(|(i, joint)| {
                let bone = SceneBone::new(self.node_names[joint.index()].clone());
                match inverse_binds.get(i) {
                    Some(&offset) => bone.with_offset_matrix(offset),
                    None => bone,
                }
            })
            .collect();

        for (vertex, (joints, weights)) in influences.iter().enumerate() {
            for (&joint, &weight) in joints.iter().zip(weights) {
                if weight <= 0.0 {
                    continue;
                }
                let joint = usize::from(joint);
                let bone = bones.get_mut(joint).ok_or(GltfError::InvalidJoint {
                    skin: skin.index(),
                    joint,
                })?;
                bone.weights.push(VertexWeight {
                    vertex: vertex as u32,
                    weight,
                });
            }
        }
        bones.retain(|bone| !bone.weights.is_empty());
        Ok(bones)
    }

    /// Convert materials, mapping PBR textures onto the four channels.
    pub fn load_materials(&self) -> Vec<SceneMaterial> {
        self.document
            .materials()
            .map(|material| {
                let pbr = material.pbr_metallic_roughness();
                let mut scene_material = SceneMaterial::new();
                if let Some(name) = material.name() {
                    scene_material = scene_material.with_name(name);
                }
                let textures = [
                    (TextureChannel::Diffuse, pbr.base_color_texture().map(|t| t.texture())),
                    (
                        TextureChannel::Specular,
                        pbr.metallic_roughness_texture().map(|t| t.texture()),
                    ),
                    (TextureChannel::Height, material.normal_texture().map(|t| t.texture())),
                    (
                        TextureChannel::Ambient,
                        material.occlusion_texture().map(|t| t.texture()),
                    ),
                ];
                for (channel, texture) in textures {
                    let Some(texture) = texture else { continue };
                    match texture.source().source() {
                        gltf_dep::image::Source::Uri { uri, .. } if !uri.starts_with("data:") => {
                            scene_material.add_texture(channel, uri);
                        }
                        _ => log::warn!(
                            "Material {:?}: embedded {} texture is not supported",
                            material.name(),
                            channel.name()
                        ),
                    }
                }
                scene_material
            })
            .collect()
    }

    /// Convert animations. Times are kept in seconds with one tick per second.
    pub fn load_animations(&self) -> Result<Vec<AnimationClip>, GltfError> {
        let mut clips = Vec::new();
        for animation in self.document.animations() {
            let mut channels: Vec<NodeChannel> = Vec::new();
            let mut by_node: HashMap<usize, usize> = HashMap::new();
            let mut duration = 0.0f32;

            for channel in animation.channels() {
                let node = channel.target().node().index();
                let slot = *by_node.entry(node).or_insert_with(|| {
                    channels.push(NodeChannel::new(self.node_names[node].clone()));
                    channels.len() - 1
                });
                let cubic = channel.sampler().interpolation()
                    == gltf_dep::animation::Interpolation::CubicSpline;

                let reader = channel.reader(|buffer| self.buffer(buffer));
                let times: Vec<f32> = reader
                    .read_inputs()
                    .ok_or(GltfError::MissingAnimationData {
                        animation: animation.index(),
                    })?
                    .collect();
                duration = times.iter().copied().fold(duration, f32::max);

                let Some(outputs) = reader.read_outputs() else {
                    return Err(GltfError::MissingAnimationData {
                        animation: animation.index(),
                    });
                };
                let target = &mut channels[slot];
                match outputs {
                    ReadOutputs::Translations(values) => {
                        target.position_keys = vector_keys(&times, keyframe_values(values, cubic));
                    }
                    ReadOutputs::Scales(values) => {
                        target.scaling_keys = vector_keys(&times, keyframe_values(values, cubic));
                    }
                    ReadOutputs::Rotations(values) => {
                        target.rotation_keys = times
                            .iter()
                            .zip(keyframe_values(values.into_f32(), cubic))
                            .map(|(&time, value)| QuatKey::new(time, value))
                            .collect();
                    }
                    ReadOutputs::MorphTargetWeights(_) => {
                        log::debug!(
                            "Ignoring morph target weights in animation {}",
                            animation.index()
                        );
                    }
                }
            }

            let mut clip = AnimationClip::new(duration, 1.0);
            clip.channels = channels;
            if let Some(name) = animation.name() {
                clip = clip.with_name(name);
            }
            clips.push(clip);
        }
        Ok(clips)
    }
}

fn node_transform(node: &gltf_dep::Node<'_>) -> NodeTransform {
    let (translation, rotation, scale) = node.transform().decomposed();
    NodeTransform::IDENTITY
        .with_translation(translation)
        .with_rotation(rotation)
        .with_scale(scale)
}

/// Keyframe values, skipping the in/out tangents of cubic spline samplers.
fn keyframe_values<T>(values: impl Iterator<Item = T>, cubic: bool) -> Vec<T> {
    if cubic {
        values.skip(1).step_by(3).collect()
    } else {
        values.collect()
    }
}

fn vector_keys(times: &[f32], values: Vec<[f32; 3]>) -> Vec<VectorKey> {
    times
        .iter()
        .zip(values)
        .map(|(&time, value)| VectorKey::new(time, value))
        .collect()
}
