//! Per-frame bone matrix evaluation.

use crate::animation::AnimationClip;
use crate::error::AnimationIndexError;
use crate::math::Mat4;

use super::hierarchy::{AnimNode, Skeleton};

/// Number of bone matrices the skinned shader can address.
pub const MAX_BONES: usize = 64;

/// Final bone matrices for one frame, indexed by global bone index.
///
/// Entries beyond the skeleton's bone count stay at identity.
#[derive(Debug, Clone, PartialEq)]
pub struct Pose {
    bones: Vec<Mat4>,
    globals: Vec<Mat4>,
}

impl Default for Pose {
    fn default() -> Self {
        Self::new()
    }
}

impl Pose {
    /// A pose holding [`MAX_BONES`] identity matrices.
    pub fn new() -> Self {
        Self::with_capacity(MAX_BONES)
    }

    /// A pose holding `capacity` identity matrices.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            bones: vec![Mat4::IDENTITY; capacity],
            globals: Vec::new(),
        }
    }

    /// All bone matrices.
    pub fn bones(&self) -> &[Mat4] {
        &self.bones
    }

    /// Matrix of one bone.
    pub fn bone(&self, index: usize) -> Option<&Mat4> {
        self.bones.get(index)
    }

    /// Number of addressable bones.
    pub fn capacity(&self) -> usize {
        self.bones.len()
    }
}

impl AnimNode {
    /// Local transform at `progress` ticks of clip `clip_index`.
    ///
    /// Nodes without a track in that clip keep their rest transform.
    pub fn local_matrix(&self, clips: &[AnimationClip], clip_index: usize, progress: f32) -> Mat4 {
        let channel = self
            .track(clip_index)
            .and_then(|track| clips.get(clip_index)?.channels.get(track));
        match channel {
            Some(channel) => channel.evaluate(progress, &self.local_transform),
            None => self.local_transform.matrix(),
        }
    }
}

impl Skeleton {
    fn check_clip(&self, clip: usize) -> Result<(), AnimationIndexError> {
        if clip < self.clips.len() {
            Ok(())
        } else {
            Err(AnimationIndexError {
                index: clip,
                clip_count: self.clips.len(),
            })
        }
    }

    /// Looping position in ticks of clip `clip` after `elapsed_seconds`.
    ///
    /// # Errors
    ///
    /// Returns [`AnimationIndexError`] if the clip does not exist.
    pub fn progress(&self, elapsed_seconds: f32, clip: usize) -> Result<f32, AnimationIndexError> {
        self.check_clip(clip)?;
        Ok(self.clips[clip].progress(elapsed_seconds))
    }

    /// Recompute `pose` at `progress` ticks of clip `clip`.
    ///
    /// Each bone receives `inverse_root * global * offset`, where `global` is
    /// the node's transform composed with all of its animated ancestors.
    ///
    /// # Errors
    ///
    /// Returns [`AnimationIndexError`] if the clip does not exist. The pose is
    /// left untouched in that case.
    pub fn evaluate(
        &self,
        progress: f32,
        clip: usize,
        pose: &mut Pose,
    ) -> Result<(), AnimationIndexError> {
        self.check_clip(clip)?;

        let globals = &mut pose.globals;
        globals.clear();
        globals.reserve(self.nodes.len());
        for node in &self.nodes {
            let parent = node.parent().map_or(Mat4::IDENTITY, |p| globals[p]);
            let global = parent * node.local_matrix(&self.clips, clip, progress);
            globals.push(global);

            let Some(bone) = node.bone.map(|b| b as usize) else {
                continue;
            };
            if let (Some(slot), Some(offset)) = (pose.bones.get_mut(bone), self.offsets.get(bone))
            {
                *slot = self.inverse_root * global * *offset;
            }
        }
        Ok(())
    }

    /// Evaluate clip `clip` after `elapsed_seconds` of looping playback.
    ///
    /// # Errors
    ///
    /// Returns [`AnimationIndexError`] if the clip does not exist.
    pub fn animate(
        &self,
        elapsed_seconds: f32,
        clip: usize,
        pose: &mut Pose,
    ) -> Result<(), AnimationIndexError> {
        let progress = self.progress(elapsed_seconds, clip)?;
        self.evaluate(progress, clip, pose)
    }
}
