//! Animation converter (capture CSV -> .dda)
//!
//! Reads global bone samples, optionally relativizes them against the bone
//! hierarchy, and writes one keyframe track per bone.

use anyhow::{Context, Result};
use mocap_common::{bone_tracks, Animation, ExportMode, Hierarchy};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::csv::read_animation;
use crate::formats::{write_animation, ClipHeader};

/// Result of in-memory animation conversion
#[derive(Debug, Clone)]
pub struct ConvertedAnimation {
    /// Number of bones (tracks)
    pub bone_count: usize,
    /// Number of frames per track
    pub frame_count: usize,
    /// Frames per second, from the capture timestamps
    pub framerate: f64,
    /// Complete .dda file contents
    pub text: String,
}

/// Poses to export for `mode`, with bone-name mismatches logged
pub fn prepare_poses(
    animation: &Animation,
    mode: ExportMode,
    hierarchy: &Hierarchy,
) -> Result<Animation> {
    if mode == ExportMode::Relative {
        warn_on_name_mismatch(animation, hierarchy);
    }
    mocap_common::prepare(animation, mode, hierarchy).context("Failed to relativize animation")
}

/// Log sampled bone names that don't match the hierarchy
///
/// Names are informational only; bones are matched by index.
pub(crate) fn warn_on_name_mismatch(animation: &Animation, hierarchy: &Hierarchy) {
    for (index, expected, found) in hierarchy.mismatched_names(&animation.bone_names) {
        tracing::warn!(
            "Bone {} is '{}' in the capture but '{}' in the hierarchy",
            index,
            found,
            expected
        );
    }
}

/// Encode prepared poses as .dda text
///
/// `poses` must already be in the space named by `mode` (see [`prepare_poses`]).
pub fn encode_animation(
    poses: &Animation,
    mode: ExportMode,
    unit_scale: f64,
) -> Result<ConvertedAnimation> {
    let header = ClipHeader {
        mode,
        framerate: poses.framerate(),
        repeat: false,
        joint_count: poses.bone_count(),
        frame_count: poses.frame_count(),
    };

    let tracks = bone_tracks(poses);

    let mut buffer = Vec::new();
    write_animation(&mut buffer, &header, &tracks, unit_scale)?;
    let text = String::from_utf8(buffer).context("Animation output is not UTF-8")?;

    Ok(ConvertedAnimation {
        bone_count: header.joint_count,
        frame_count: header.frame_count,
        framerate: header.framerate,
        text,
    })
}

/// Convert a capture CSV to in-memory .dda text
pub fn convert_animation_to_memory(
    input: &Path,
    mode: ExportMode,
    hierarchy: &Hierarchy,
    unit_scale: f64,
) -> Result<ConvertedAnimation> {
    let animation =
        read_animation(input).with_context(|| format!("Failed to read capture: {:?}", input))?;
    let poses = prepare_poses(&animation, mode, hierarchy)?;
    encode_animation(&poses, mode, unit_scale)
}

/// Convert a capture CSV to a .dda file
pub fn convert_animation(
    input: &Path,
    output: &Path,
    mode: ExportMode,
    hierarchy: &Hierarchy,
    unit_scale: f64,
) -> Result<()> {
    let converted = convert_animation_to_memory(input, mode, hierarchy, unit_scale)?;
    write_text(output, &converted.text)?;

    tracing::info!(
        "Exported {} animation: {} bones, {} frames at {} fps",
        mode,
        converted.bone_count,
        converted.frame_count,
        converted.framerate
    );

    Ok(())
}

pub(crate) fn write_text(output: &Path, text: &str) -> Result<()> {
    let file =
        File::create(output).with_context(|| format!("Failed to create output: {:?}", output))?;
    let mut writer = BufWriter::new(file);
    writer
        .write_all(text.as_bytes())
        .and_then(|_| writer.flush())
        .with_context(|| format!("Failed to write output: {:?}", output))
}
