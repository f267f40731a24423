//! Sampled animation data
//!
//! An [`Animation`] is an ordered list of [`Frame`]s, each holding one [`Pose`]
//! per bone in the order given by `bone_names`. Poses are global (world space)
//! when read from a capture, or parent-local after relativization.

use glam::{DQuat, DVec3};

/// Position and orientation of one bone at one instant
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pose {
    /// Position in meters
    pub position: DVec3,
    /// Unit quaternion
    pub orientation: DQuat,
}

impl Default for Pose {
    fn default() -> Self {
        Self {
            position: DVec3::ZERO,
            orientation: DQuat::IDENTITY,
        }
    }
}

impl Pose {
    pub fn new(position: DVec3, orientation: DQuat) -> Self {
        Self {
            position,
            orientation,
        }
    }
}

/// One sampled instant: timestamp plus a pose per bone
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    /// Time in seconds
    pub time: f64,
    pub poses: Vec<Pose>,
}

/// Every frame of one capture, sharing one bone set
#[derive(Clone, Debug, PartialEq)]
pub struct Animation {
    pub bone_names: Vec<String>,
    pub frames: Vec<Frame>,
}

impl Animation {
    pub fn new(bone_names: Vec<String>, frames: Vec<Frame>) -> Self {
        Self { bone_names, frames }
    }

    pub fn bone_count(&self) -> usize {
        self.bone_names.len()
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Playback rate derived from the second frame's timestamp
    ///
    /// Captures start at t = 0, so `1 / t1` is frames per second. Falls back to
    /// 1 when there are fewer than two frames.
    pub fn framerate(&self) -> f64 {
        match self.frames.get(1) {
            Some(frame) => 1.0 / frame.time,
            None => 1.0,
        }
    }

    /// Frame 0, used as the bind pose
    pub fn bind_pose(&self) -> Option<&Frame> {
        self.frames.first()
    }
}
