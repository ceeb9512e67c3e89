//! Keyframe track evaluation.
//!
//! Translation and scale are interpolated linearly, rotation spherically.
//! Before the first key and after the last key the endpoint value is held.

use crate::math::{Mat4, Quat, Vec3};
use crate::scene::NodeTransform;

use super::clip::{NodeChannel, QuatKey, VectorKey};

/// Locate the keys bracketing `time` and the blend factor between them.
///
/// Returns `(i, i, 0.0)` when `time` is outside the keyed range.
fn bracket(times: impl ExactSizeIterator<Item = f32> + Clone, time: f32) -> (usize, usize, f32) {
    let count = times.len();
    let next = times.clone().take_while(|&t| t <= time).count();
    if next == 0 {
        return (0, 0, 0.0);
    }
    if next >= count {
        return (count - 1, count - 1, 0.0);
    }
    let prev = next - 1;
    let mut iter = times.skip(prev);
    let (t0, t1) = match (iter.next(), iter.next()) {
        (Some(t0), Some(t1)) => (t0, t1),
        _ => return (prev, prev, 0.0),
    };
    let span = t1 - t0;
    let factor = if span > 0.0 { (time - t0) / span } else { 0.0 };
    (prev, next, factor.clamp(0.0, 1.0))
}

/// Sample a vector track, `None` if it has no keys.
pub fn sample_vector(keys: &[VectorKey], time: f32) -> Option<Vec3> {
    if keys.is_empty() {
        return None;
    }
    let (a, b, t) = bracket(keys.iter().map(|k| k.time), time);
    let start = Vec3::from(keys[a].value);
    let end = Vec3::from(keys[b].value);
    Some(start.lerp(end, t))
}

/// Sample a rotation track, `None` if it has no keys.
pub fn sample_rotation(keys: &[QuatKey], time: f32) -> Option<Quat> {
    if keys.is_empty() {
        return None;
    }
    let (a, b, t) = bracket(keys.iter().map(|k| k.time), time);
    let start = Quat::from_array(keys[a].value).normalize();
    let end = Quat::from_array(keys[b].value).normalize();
    Some(start.slerp(end, t).normalize())
}

impl NodeChannel {
    /// Interpolated local transform at `time` ticks.
    ///
    /// Components without keys keep the value from `rest`.
    pub fn evaluate(&self, time: f32, rest: &NodeTransform) -> Mat4 {
        let translation =
            sample_vector(&self.position_keys, time).unwrap_or(Vec3::from(rest.translation));
        let rotation =
            sample_rotation(&self.rotation_keys, time).unwrap_or(Quat::from_array(rest.rotation));
        let scale = sample_vector(&self.scaling_keys, time).unwrap_or(Vec3::from(rest.scale));
        Mat4::from_scale_rotation_translation(scale, rotation, translation)
    }
}
