//! Shared pose math and skeleton data for the mocap exporter
//!
//! # Modules
//!
//! - [`math`] - Quaternion / rotation matrix / Euler conversions
//! - [`hierarchy`] - Parent-index bone table and the reference skeleton
//! - [`pose`] - Sampled animation data
//! - [`relative`] - Global → parent-local pose conversion
//! - [`keys`] - Per-bone keyframe tracks for the writers

pub mod hierarchy;
pub mod keys;
pub mod math;
pub mod pose;
pub mod relative;

pub use hierarchy::{
    Hierarchy, HierarchyError, REFERENCE_BONES, REFERENCE_BONE_COUNT, REFERENCE_PARENTS,
};
pub use keys::{bind_keys, bone_tracks, prepare, BoneKey, ExportMode};
pub use math::{euler_to_quat, matrix_to_quat, quat_to_euler, quat_to_matrix};
pub use pose::{Animation, Frame, Pose};
pub use relative::{RelativeError, Relativizer};
