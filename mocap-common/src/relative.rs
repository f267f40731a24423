//! Global → parent-local pose conversion
//!
//! Captured poses are world-space. Skeletal animation wants every bone
//! expressed in its parent's frame, so for each frame:
//!
//! ```text
//! pose     = T(p) · R(q)
//! inverse  = R(q)ᵀ · T(-p)
//! relative = inverse(parent) · pose
//! ```
//!
//! The root has no parent: its relative pose is its global pose. Parent
//! inverses come from a frame-scoped table filled in
//! [`Hierarchy::processing_order`], so a parent is always resolved before its
//! children. Since samples are global, a bone's own inverse already is the
//! full world → bone transform and is stored unchanged.

use glam::{DMat4, DVec4};

use crate::hierarchy::Hierarchy;
use crate::math::{
    matrix_to_quat, quat_to_matrix, rigid_inverse, translation_matrix, translation_of,
};
use crate::pose::{Animation, Frame, Pose};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RelativeError {
    #[error("frame {frame} has {found} bones, but the hierarchy has {expected}")]
    BoneCountMismatch {
        frame: usize,
        expected: usize,
        found: usize,
    },
}

/// Converts global poses to parent-local poses for one hierarchy
#[derive(Debug, Clone, Copy)]
pub struct Relativizer<'a> {
    hierarchy: &'a Hierarchy,
}

impl<'a> Relativizer<'a> {
    pub fn new(hierarchy: &'a Hierarchy) -> Self {
        Self { hierarchy }
    }

    /// Relativize every frame into a new animation
    ///
    /// The input is left untouched. Fails only when a frame's bone count differs
    /// from the hierarchy.
    pub fn relativize(&self, animation: &Animation) -> Result<Animation, RelativeError> {
        let expected = self.hierarchy.len();

        // World -> bone transform per bone, overwritten by every frame
        let mut inverses = vec![DMat4::IDENTITY; expected];

        let mut frames = Vec::with_capacity(animation.frame_count());
        for (index, frame) in animation.frames.iter().enumerate() {
            if frame.poses.len() != expected {
                return Err(RelativeError::BoneCountMismatch {
                    frame: index,
                    expected,
                    found: frame.poses.len(),
                });
            }

            let mut poses = vec![Pose::default(); expected];
            self.relativize_with(&frame.poses, &mut poses, &mut inverses);
            frames.push(Frame {
                time: frame.time,
                poses,
            });
        }

        tracing::debug!("Relativized {} frames of {} bones", frames.len(), expected);

        Ok(Animation::new(animation.bone_names.clone(), frames))
    }

    /// Relativize one frame of global poses into `relative`
    ///
    /// Both slices must hold one pose per hierarchy bone.
    pub fn relativize_frame(&self, global: &[Pose], relative: &mut [Pose]) {
        let mut inverses = vec![DMat4::IDENTITY; self.hierarchy.len()];
        self.relativize_with(global, relative, &mut inverses);
    }

    /// Relativize one frame using `inverses` as the per-bone scratch table
    ///
    /// Every entry is written before it is read, so the table needs no reset
    /// between frames.
    fn relativize_with(&self, global: &[Pose], relative: &mut [Pose], inverses: &mut [DMat4]) {
        debug_assert_eq!(global.len(), self.hierarchy.len());
        debug_assert_eq!(relative.len(), self.hierarchy.len());
        debug_assert_eq!(inverses.len(), self.hierarchy.len());

        for &bone in self.hierarchy.processing_order() {
            let Pose {
                position,
                orientation,
            } = global[bone];

            let pose = translation_matrix(position) * quat_to_matrix(orientation);

            let parent_inverse = if self.hierarchy.is_root(bone) {
                DMat4::IDENTITY
            } else {
                inverses[self.hierarchy.parent(bone)]
            };
            inverses[bone] = rigid_inverse(position, orientation);

            let mut local = parent_inverse * pose;
            let local_position = translation_of(&local);
            local.w_axis = DVec4::W;

            relative[bone] = Pose::new(local_position, matrix_to_quat(&local));
        }
    }
}
