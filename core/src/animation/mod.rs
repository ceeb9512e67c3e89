//! Keyframe animation data.
//!
//! - [`AnimationClip`] - A named clip with a tick rate, length and node tracks
//! - [`NodeChannel`] - Translation/rotation/scale keys for one scene node
//! - [`ClipDefaults`] - Cadence applied to clips exported without one
//!
//! Track evaluation lives in [`keyframe`]: linear for translation and scale,
//! spherical for rotation, endpoints held outside the keyed range.

mod clip;
pub mod keyframe;

pub use clip::{AnimationClip, ClipDefaults, NodeChannel, QuatKey, VectorKey};
