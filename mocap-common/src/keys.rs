//! Keyframe sampling for export
//!
//! Writers consume per-bone tracks of [`BoneKey`]s: Euler rotation plus
//! position, in the order frames were captured.

use glam::DVec3;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::hierarchy::Hierarchy;
use crate::math::quat_to_euler;
use crate::pose::{Animation, Pose};
use crate::relative::{RelativeError, Relativizer};

/// Space the exported poses are expressed in
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportMode {
    /// World-space poses as sampled
    #[default]
    Global,
    /// Every bone relative to its parent
    Relative,
}

impl ExportMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportMode::Global => "global",
            ExportMode::Relative => "relative",
        }
    }
}

impl fmt::Display for ExportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExportMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "global" => Ok(ExportMode::Global),
            "relative" => Ok(ExportMode::Relative),
            other => Err(format!(
                "unknown export mode '{}' (expected 'global' or 'relative')",
                other
            )),
        }
    }
}

/// One bone at one frame, ready to be written
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BoneKey {
    /// Euler angles (X, Y, Z) in radians
    pub rotation: DVec3,
    /// Position in meters (scaled to output units by the writer)
    pub position: DVec3,
}

impl From<&Pose> for BoneKey {
    fn from(pose: &Pose) -> Self {
        Self {
            rotation: quat_to_euler(pose.orientation),
            position: pose.position,
        }
    }
}

/// Poses to export for `mode`
///
/// Global mode returns the sampled data unchanged; relative mode runs the
/// relativizer over every frame.
pub fn prepare(
    animation: &Animation,
    mode: ExportMode,
    hierarchy: &Hierarchy,
) -> Result<Animation, RelativeError> {
    match mode {
        ExportMode::Global => Ok(animation.clone()),
        ExportMode::Relative => Relativizer::new(hierarchy).relativize(animation),
    }
}

/// Per-bone tracks of keys, indexed `[bone][frame]`
pub fn bone_tracks(animation: &Animation) -> Vec<Vec<BoneKey>> {
    (0..animation.bone_count())
        .map(|bone| {
            animation
                .frames
                .iter()
                .map(|frame| BoneKey::from(&frame.poses[bone]))
                .collect()
        })
        .collect()
}

/// Keys of frame 0, one per bone
pub fn bind_keys(animation: &Animation) -> Vec<BoneKey> {
    animation
        .bind_pose()
        .map(|frame| frame.poses.iter().map(BoneKey::from).collect())
        .unwrap_or_default()
}
