//! Common types and descriptors for graphics resources.
//!
//! This module contains usage flags, formats and the descriptor structs
//! passed to a [`RenderDevice`](crate::backend::RenderDevice).

mod buffer;
mod descriptor;
mod image;

pub use buffer::{BufferDescriptor, BufferUsage, IndexFormat};
pub use descriptor::{DescriptorPoolDescriptor, DescriptorResource, DescriptorWrite};
pub use image::{ImageDescriptor, ImageFormat};
