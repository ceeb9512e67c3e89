//! Material descriptor sets for the skinned pipeline.
//!
//! - [`BindingLayout`] - What a shader expects in one descriptor set
//! - [`DescriptorPlan`] - Pool sizing for a model's material table
//! - [`ModelDescriptors`] - The pool, the uniform set and per-material sampler sets

mod bindings;
mod descriptors;

pub use bindings::{BindingLayout, BindingLayoutEntry, BindingType, ShaderStageFlags};
pub use descriptors::{material_writes, DescriptorPlan, ModelDescriptors};
