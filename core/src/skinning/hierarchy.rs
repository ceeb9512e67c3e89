//! Bone hierarchy: the part of the scene graph that drives skinning.
//!
//! A [`Skeleton`] owns copies of the scene nodes that are bones or ancestors
//! of bones. Nodes are stored in an arena in depth-first pre-order, so every
//! parent precedes its children and a forward pass composes transforms
//! top-down.

use std::collections::HashMap;

use crate::animation::{AnimationClip, ClipDefaults};
use crate::math::Mat4;
use crate::scene::{NodeId, NodeTransform, Scene};

use super::flatten::BoneTable;
use super::pose::MAX_BONES;

/// A scene node that influences at least one bone.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimNode {
    /// Name of the mirrored scene node.
    pub name: String,
    /// Rest transform relative to the parent.
    pub local_transform: NodeTransform,
    /// Global bone index, `None` for pure ancestors.
    pub bone: Option<u32>,
    tracks: Vec<Option<usize>>,
    parent: Option<usize>,
    children: Vec<usize>,
}

impl AnimNode {
    /// Channel index of this node within clip `clip`.
    ///
    /// `None` means the node is static for that clip.
    pub fn track(&self, clip: usize) -> Option<usize> {
        self.tracks.get(clip).copied().flatten()
    }

    /// Per-clip channel indices, one entry per clip.
    pub fn tracks(&self) -> &[Option<usize>] {
        &self.tracks
    }

    /// Arena index of the nearest animated ancestor.
    pub fn parent(&self) -> Option<usize> {
        self.parent
    }

    /// Arena indices of the children.
    pub fn children(&self) -> &[usize] {
        &self.children
    }
}

/// The animatable subtree of a scene together with its clips and bones.
#[derive(Debug, Clone, Default)]
pub struct Skeleton {
    pub(super) nodes: Vec<AnimNode>,
    pub(super) clips: Vec<AnimationClip>,
    pub(super) inverse_root: Mat4,
    pub(super) offsets: Vec<Mat4>,
}

impl Skeleton {
    /// Build the skeleton for the bones discovered while flattening `scene`.
    ///
    /// Clips are copied and normalized with `defaults`. Bones whose name
    /// matches no scene node are skipped with a warning.
    pub fn build(scene: &Scene, bones: &BoneTable, defaults: &ClipDefaults) -> Self {
        let mut clips = scene.animations.clone();
        for clip in &mut clips {
            clip.normalize(defaults);
        }

        let animatable = animatable_nodes(scene, bones);
        let mut nodes: Vec<AnimNode> = Vec::with_capacity(animatable.len());
        let mut stack: Vec<(NodeId, Option<usize>)> =
            scene.root().map(|root| (root, None)).into_iter().collect();
        while let Some((id, parent)) = stack.pop() {
            let Some(&bone) = animatable.get(&id) else {
                continue;
            };
            let node = scene.node(id);
            let index = nodes.len();
            nodes.push(AnimNode {
                name: node.name.clone(),
                local_transform: node.transform,
                bone,
                tracks: clips.iter().map(|c| c.channel_index(&node.name)).collect(),
                parent,
                children: Vec::new(),
            });
            if let Some(parent) = parent {
                nodes[parent].children.push(index);
            }
            stack.extend(node.children().iter().rev().map(|&c| (c, Some(index))));
        }

        let inverse_root = scene
            .root()
            .map(|root| scene.node(root).transform.matrix().inverse())
            .unwrap_or(Mat4::IDENTITY);

        log::debug!(
            "Skeleton: {} animated nodes, {} bones, {} clips",
            nodes.len(),
            bones.len(),
            clips.len()
        );

        Self {
            nodes,
            clips,
            inverse_root,
            offsets: bones.offsets().to_vec(),
        }
    }

    /// Root of the animated tree, `None` when no bone matched a node.
    pub fn root(&self) -> Option<&AnimNode> {
        self.nodes.first()
    }

    /// Animated nodes in depth-first pre-order.
    pub fn nodes(&self) -> &[AnimNode] {
        &self.nodes
    }

    /// Find an animated node by name.
    pub fn find(&self, name: &str) -> Option<&AnimNode> {
        self.nodes.iter().find(|n| n.name == name)
    }

    /// Normalized animation clips.
    pub fn clips(&self) -> &[AnimationClip] {
        &self.clips
    }

    /// Number of bones, including bones without a matching node.
    pub fn bone_count(&self) -> usize {
        self.offsets.len()
    }

    /// Inverse of the scene root transform.
    pub fn inverse_root(&self) -> Mat4 {
        self.inverse_root
    }
}

/// Map every bone node to its bone index and every strict ancestor of a bone
/// node to `None`, unless that ancestor is itself a bone.
fn animatable_nodes(scene: &Scene, bones: &BoneTable) -> HashMap<NodeId, Option<u32>> {
    let mut animatable = HashMap::new();
    for (index, name) in bones.names().iter().enumerate() {
        let index = index as u32;
        if index as usize >= MAX_BONES {
            log::warn!(
                "Bone {:?} has index {} beyond the {} supported bones; it will not be posed",
                name,
                index,
                MAX_BONES
            );
        }
        let Some(id) = scene.find_node(name) else {
            log::warn!("Bone {:?} has no matching scene node", name);
            continue;
        };
        animatable.insert(id, Some(index));
        for ancestor in scene.ancestors(id) {
            animatable.entry(ancestor).or_insert(None);
        }
    }
    animatable
}
