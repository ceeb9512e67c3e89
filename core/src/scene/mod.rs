//! Scene graph types for representing imported assets.
//!
//! These types are format-agnostic and can be produced by any importer
//! (glTF, custom formats) or built programmatically.
//!
//! - [`Scene`] - A single-rooted node arena with meshes, materials and clips
//! - [`SceneNode`] / [`NodeId`] - A node in the scene tree and its handle
//! - [`NodeTransform`] - TRS transform using plain arrays
//! - [`SceneMesh`] / [`SceneBone`] - Triangulated meshes and their bones
//! - [`SceneMaterial`] / [`TextureChannel`] - Texture paths per channel

mod material;
mod mesh;
mod types;

pub use material::{SceneMaterial, TextureChannel};
pub use mesh::{SceneBone, SceneMesh, VertexWeight};
pub use types::{NodeId, NodeTransform, Scene, SceneFlags, SceneNode};
