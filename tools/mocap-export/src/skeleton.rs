//! Skeleton converter (capture CSV -> .ddb)
//!
//! The first captured frame is the bind pose. Joint names come from the
//! capture header, parent links from the bone hierarchy.

use anyhow::{Context, Result};
use mocap_common::{bind_keys, Animation, ExportMode, Hierarchy};
use std::path::Path;

use crate::animation::{prepare_poses, warn_on_name_mismatch, write_text};
use crate::csv::read_animation;
use crate::formats::write_skeleton;

/// Result of in-memory skeleton conversion
#[derive(Debug, Clone)]
pub struct ConvertedSkeleton {
    /// Number of joints in the skeleton
    pub bone_count: usize,
    /// Complete .ddb file contents
    pub text: String,
}

/// Encode the bind pose of prepared poses as .ddb text
pub fn encode_skeleton(
    poses: &Animation,
    hierarchy: &Hierarchy,
    unit_scale: f64,
) -> Result<ConvertedSkeleton> {
    let bind = bind_keys(poses);

    let mut buffer = Vec::new();
    write_skeleton(&mut buffer, hierarchy, &poses.bone_names, &bind, unit_scale)?;
    let text = String::from_utf8(buffer).context("Skeleton output is not UTF-8")?;

    Ok(ConvertedSkeleton {
        bone_count: hierarchy.len(),
        text,
    })
}

/// Convert a capture CSV to in-memory .ddb text
pub fn convert_skeleton_to_memory(
    input: &Path,
    mode: ExportMode,
    hierarchy: &Hierarchy,
    unit_scale: f64,
) -> Result<ConvertedSkeleton> {
    let animation =
        read_animation(input).with_context(|| format!("Failed to read capture: {:?}", input))?;
    if mode == ExportMode::Global {
        warn_on_name_mismatch(&animation, hierarchy);
    }
    let poses = prepare_poses(&animation, mode, hierarchy)?;
    encode_skeleton(&poses, hierarchy, unit_scale)
}

/// Convert a capture CSV to a .ddb file
pub fn convert_skeleton(
    input: &Path,
    output: &Path,
    mode: ExportMode,
    hierarchy: &Hierarchy,
    unit_scale: f64,
) -> Result<()> {
    let converted = convert_skeleton_to_memory(input, mode, hierarchy, unit_scale)?;
    write_text(output, &converted.text)?;

    tracing::info!("Exported {} skeleton: {} joints", mode, converted.bone_count);

    Ok(())
}

/// Log the bones of a hierarchy with their parents
pub fn list_bones(hierarchy: &Hierarchy) {
    tracing::info!("Hierarchy has {} bones:", hierarchy.len());
    for bone in hierarchy.processing_order() {
        let parent = hierarchy.parent(*bone);
        if hierarchy.is_root(*bone) {
            tracing::info!("  [{}] {} (root)", bone, hierarchy.name(*bone));
        } else {
            tracing::info!(
                "  [{}] {} <- [{}] {}",
                bone,
                hierarchy.name(*bone),
                parent,
                hierarchy.name(parent)
            );
        }
    }
}
