//! CPU side of skinned mesh rendering.
//!
//! - [`flatten_scene`] - Builds one vertex array, one index array, a material
//!   table and a bone table from an imported [`Scene`](crate::scene::Scene)
//! - [`Skeleton`] - The animatable subtree of the scene graph
//! - [`Pose`] - Bone matrices recomputed every frame by [`Skeleton::evaluate`]
//! - [`SkinnedVertex`] - Interleaved vertex with up to four bone influences

mod flatten;
mod hierarchy;
mod pose;
mod vertex;

pub use flatten::{
    flatten_scene, mesh_ranges, BoneTable, FlattenedScene, Material, MeshRange, TextureRequest,
};
pub use hierarchy::{AnimNode, Skeleton};
pub use pose::{Pose, MAX_BONES};
pub use vertex::{
    InfluenceSlots, SkinnedVertex, VertexAttribute, VertexFormat, MAX_BONES_PER_VERTEX,
};
