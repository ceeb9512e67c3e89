//! Animation clips and per-node keyframe channels.

/// A translation or scale keyframe.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VectorKey {
    /// Time in ticks.
    pub time: f32,
    /// Value [x, y, z].
    pub value: [f32; 3],
}

impl VectorKey {
    /// Create a keyframe.
    pub const fn new(time: f32, value: [f32; 3]) -> Self {
        Self { time, value }
    }
}

/// A rotation keyframe.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuatKey {
    /// Time in ticks.
    pub time: f32,
    /// Rotation quaternion [x, y, z, w].
    pub value: [f32; 4],
}

impl QuatKey {
    /// Create a keyframe.
    pub const fn new(time: f32, value: [f32; 4]) -> Self {
        Self { time, value }
    }
}

/// Keyframe track of one node within one clip.
///
/// Keys within each list are sorted by time. Any list may be empty, in which
/// case that component keeps the node's rest value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeChannel {
    /// Name of the animated scene node.
    pub node_name: String,
    /// Translation keys.
    pub position_keys: Vec<VectorKey>,
    /// Rotation keys.
    pub rotation_keys: Vec<QuatKey>,
    /// Scale keys.
    pub scaling_keys: Vec<VectorKey>,
}

impl NodeChannel {
    /// Creates an empty track for the named node.
    pub fn new(node_name: impl Into<String>) -> Self {
        Self {
            node_name: node_name.into(),
            ..Self::default()
        }
    }

    /// Add a translation key.
    #[must_use]
    pub fn with_position_key(mut self, time: f32, value: [f32; 3]) -> Self {
        self.position_keys.push(VectorKey::new(time, value));
        self
    }

    /// Add a rotation key.
    #[must_use]
    pub fn with_rotation_key(mut self, time: f32, value: [f32; 4]) -> Self {
        self.rotation_keys.push(QuatKey::new(time, value));
        self
    }

    /// Add a scale key.
    #[must_use]
    pub fn with_scaling_key(mut self, time: f32, value: [f32; 3]) -> Self {
        self.scaling_keys.push(VectorKey::new(time, value));
        self
    }

    /// Time of the last key across all components.
    pub fn end_time(&self) -> f32 {
        let last = |t: Option<f32>| t.unwrap_or(0.0);
        last(self.position_keys.last().map(|k| k.time))
            .max(last(self.rotation_keys.last().map(|k| k.time)))
            .max(last(self.scaling_keys.last().map(|k| k.time)))
    }
}

/// Playback cadence applied to clips that do not declare one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClipDefaults {
    /// Ticks per second.
    pub ticks_per_second: f32,
    /// Clip length in ticks.
    pub duration_ticks: f32,
}

impl ClipDefaults {
    /// Default cadence: 25 ticks per second.
    pub const DEFAULT_TICKS_PER_SECOND: f32 = 25.0;
    /// Default length: one second at the default cadence.
    pub const DEFAULT_DURATION_TICKS: f32 = 25.0;
}

impl Default for ClipDefaults {
    fn default() -> Self {
        Self {
            ticks_per_second: Self::DEFAULT_TICKS_PER_SECOND,
            duration_ticks: Self::DEFAULT_DURATION_TICKS,
        }
    }
}

/// A named animation sequence.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnimationClip {
    /// Clip name, if any.
    pub name: Option<String>,
    /// Length in ticks.
    pub duration: f32,
    /// Playback rate.
    pub ticks_per_second: f32,
    /// One track per animated node.
    pub channels: Vec<NodeChannel>,
}

impl AnimationClip {
    /// Creates a clip with the given length and rate.
    pub fn new(duration: f32, ticks_per_second: f32) -> Self {
        Self {
            name: None,
            duration,
            ticks_per_second,
            channels: Vec::new(),
        }
    }

    /// Set the clip name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Add a node track.
    #[must_use]
    pub fn with_channel(mut self, channel: NodeChannel) -> Self {
        self.channels.push(channel);
        self
    }

    /// Replace non-positive rate or length with `defaults`.
    ///
    /// Returns `true` if anything was changed.
    pub fn normalize(&mut self, defaults: &ClipDefaults) -> bool {
        let mut changed = false;
        if self.ticks_per_second <= 0.0 || !self.ticks_per_second.is_finite() {
            log::warn!(
                "AnimationClip {:?}: ticks per second {} replaced by {}",
                self.name,
                self.ticks_per_second,
                defaults.ticks_per_second
            );
            self.ticks_per_second = defaults.ticks_per_second;
            changed = true;
        }
        if self.duration <= 0.0 || !self.duration.is_finite() {
            log::warn!(
                "AnimationClip {:?}: duration {} replaced by {}",
                self.name,
                self.duration,
                defaults.duration_ticks
            );
            self.duration = defaults.duration_ticks;
            changed = true;
        }
        changed
    }

    /// Index of the first channel targeting `node_name`.
    pub fn channel_index(&self, node_name: &str) -> Option<usize> {
        self.channels.iter().position(|c| c.node_name == node_name)
    }

    /// Map elapsed wall time to a looping position in ticks.
    pub fn progress(&self, elapsed_seconds: f32) -> f32 {
        (elapsed_seconds * self.ticks_per_second).rem_euclid(self.duration)
    }
}
