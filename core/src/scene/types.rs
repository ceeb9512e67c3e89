//! Scene graph data types.
//!
//! Nodes live in an arena owned by [`Scene`] and refer to each other through
//! [`NodeId`]s, so lookups by name and ancestor walks never chase pointers.

use crate::animation::AnimationClip;
use crate::math::{Mat4, Quat, Vec3};

use super::material::SceneMaterial;
use super::mesh::SceneMesh;

/// Node transform decomposed into translation, rotation, and scale.
///
/// Uses plain arrays for portability. Convert with [`NodeTransform::matrix`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeTransform {
    /// Translation [x, y, z].
    pub translation: [f32; 3],
    /// Rotation quaternion [x, y, z, w].
    pub rotation: [f32; 4],
    /// Scale [x, y, z].
    pub scale: [f32; 3],
}

impl NodeTransform {
    /// Identity transform: no translation, identity rotation, unit scale.
    pub const IDENTITY: Self = Self {
        translation: [0.0, 0.0, 0.0],
        rotation: [0.0, 0.0, 0.0, 1.0],
        scale: [1.0, 1.0, 1.0],
    };

    /// Returns this transform with a different translation.
    #[must_use]
    pub const fn with_translation(mut self, translation: [f32; 3]) -> Self {
        self.translation = translation;
        self
    }

    /// Returns this transform with a different rotation.
    #[must_use]
    pub const fn with_rotation(mut self, rotation: [f32; 4]) -> Self {
        self.rotation = rotation;
        self
    }

    /// Returns this transform with a different scale.
    #[must_use]
    pub const fn with_scale(mut self, scale: [f32; 3]) -> Self {
        self.scale = scale;
        self
    }

    /// Decompose an affine matrix.
    pub fn from_matrix(matrix: &Mat4) -> Self {
        let (scale, rotation, translation) = matrix.to_scale_rotation_translation();
        Self {
            translation: translation.to_array(),
            rotation: rotation.to_array(),
            scale: scale.to_array(),
        }
    }

    /// Compose the TRS components into a matrix (`T * R * S`).
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(
            Vec3::from(self.scale),
            Quat::from_array(self.rotation),
            Vec3::from(self.translation),
        )
    }
}

impl Default for NodeTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Index of a node inside its [`Scene`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

/// A node in a scene graph tree.
///
/// Parent and child links are assigned by [`Scene::add_node`].
#[derive(Debug, Clone)]
pub struct SceneNode {
    /// Node name. Bones are matched to nodes by this name.
    pub name: String,
    /// Local transform relative to parent.
    pub transform: NodeTransform,
    /// Indices into [`Scene::meshes`].
    pub meshes: Vec<usize>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl SceneNode {
    /// Creates a detached node with identity transform and no meshes.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            transform: NodeTransform::IDENTITY,
            meshes: Vec::new(),
            parent: None,
            children: Vec::new(),
        }
    }

    /// Set the local transform.
    #[must_use]
    pub fn with_transform(mut self, transform: NodeTransform) -> Self {
        self.transform = transform;
        self
    }

    /// Set the mesh indices.
    #[must_use]
    pub fn with_meshes(mut self, meshes: Vec<usize>) -> Self {
        self.meshes = meshes;
        self
    }

    /// Parent node, `None` for the root.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Child nodes in insertion order.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

bitflags::bitflags! {
    /// Status flags reported by an importer.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct SceneFlags: u32 {
        /// The importer could not read the whole asset.
        const INCOMPLETE = 1 << 0;
        /// The importer recovered from problems it found while validating.
        const VALIDATION_WARNING = 1 << 1;
    }
}

/// An imported scene: a single-rooted node tree plus the meshes, materials
/// and animation clips its nodes refer to.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    /// Scene name, if any.
    pub name: Option<String>,
    /// All meshes referenced by nodes in this scene.
    pub meshes: Vec<SceneMesh>,
    /// Materials referenced by [`SceneMesh::material`].
    pub materials: Vec<SceneMaterial>,
    /// Animation clips.
    pub animations: Vec<AnimationClip>,
    /// Importer status flags.
    pub flags: SceneFlags,
    nodes: Vec<SceneNode>,
    root: Option<NodeId>,
}

impl Scene {
    /// Creates a new empty scene.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the scene name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the meshes.
    #[must_use]
    pub fn with_meshes(mut self, meshes: Vec<SceneMesh>) -> Self {
        self.meshes = meshes;
        self
    }

    /// Set the materials.
    #[must_use]
    pub fn with_materials(mut self, materials: Vec<SceneMaterial>) -> Self {
        self.materials = materials;
        self
    }

    /// Set the animation clips.
    #[must_use]
    pub fn with_animations(mut self, animations: Vec<AnimationClip>) -> Self {
        self.animations = animations;
        self
    }

    /// Set the importer flags.
    #[must_use]
    pub fn with_flags(mut self, flags: SceneFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Insert a node under `parent`, or as the root when `parent` is `None`.
    ///
    /// Inserting a second root replaces the first; the old tree stays in the
    /// arena but is no longer reachable from [`Scene::root`].
    pub fn add_node(&mut self, parent: Option<NodeId>, mut node: SceneNode) -> NodeId {
        let id = NodeId(self.nodes.len());
        node.parent = parent;
        node.children.clear();
        self.nodes.push(node);
        match parent {
            Some(parent) => self.nodes[parent.0].children.push(id),
            None => {
                if let Some(old) = self.root.replace(id) {
                    log::warn!("Scene: replacing root node {:?}", self.nodes[old.0].name);
                }
            }
        }
        id
    }

    /// The root node, if any.
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// Get a node by id.
    ///
    /// # Panics
    ///
    /// Panics if `id` did not come from this scene.
    pub fn node(&self, id: NodeId) -> &SceneNode {
        &self.nodes[id.0]
    }

    /// Get a node by id, returning `None` for foreign ids.
    pub fn get_node(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.get(id.0)
    }

    /// All nodes in the arena, including unreachable ones.
    pub fn nodes(&self) -> &[SceneNode] {
        &self.nodes
    }

    /// Find the first node named `name` in depth-first pre-order from the root.
    pub fn find_node(&self, name: &str) -> Option<NodeId> {
        let mut stack: Vec<NodeId> = self.root.into_iter().collect();
        while let Some(id) = stack.pop() {
            let node = &self.nodes[id.0];
            if node.name == name {
                return Some(id);
            }
            stack.extend(node.children.iter().rev().copied());
        }
        None
    }

    /// Strict ancestors of `id`, nearest first.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.nodes[id.0].parent, move |p| self.nodes[p.0].parent)
    }

    /// Nodes reachable from the root in depth-first pre-order.
    pub fn depth_first(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<NodeId> = self.root.into_iter().collect();
        while let Some(id) = stack.pop() {
            order.push(id);
            stack.extend(self.nodes[id.0].children.iter().rev().copied());
        }
        order
    }
}
