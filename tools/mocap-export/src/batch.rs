//! Directory and per-clip export
//!
//! A clip is one capture CSV. It is read and relativized once, then written
//! as `<name>.dda` and optionally `<name>.ddb`.

use anyhow::{Context, Result};
use mocap_common::{ExportMode, Hierarchy};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::animation::{encode_animation, prepare_poses, warn_on_name_mismatch, write_text};
use crate::csv::read_animation;
use crate::formats::{ANIMATION_EXT, M_TO_CM, SKELETON_EXT};
use crate::skeleton::encode_skeleton;

/// Options shared by every clip of a batch
#[derive(Debug, Clone)]
pub struct BatchOptions {
    pub mode: ExportMode,
    /// Also write a .ddb skeleton per clip
    pub skeleton: bool,
    /// Meters to output units
    pub unit_scale: f64,
    pub hierarchy: Hierarchy,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            mode: ExportMode::Global,
            skeleton: false,
            unit_scale: M_TO_CM,
            hierarchy: Hierarchy::reference(),
        }
    }
}

/// Files written for one clip
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClipOutputs {
    pub animation: PathBuf,
    pub skeleton: Option<PathBuf>,
}

/// Counts for a finished batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub animations: usize,
    pub skeletons: usize,
    /// Directory entries that were not capture files
    pub skipped: usize,
}

/// Export one capture file as `<out_dir>/<name>.dda` (and `.ddb`)
pub fn export_clip(
    input: &Path,
    out_dir: &Path,
    name: &str,
    options: &BatchOptions,
) -> Result<ClipOutputs> {
    let animation =
        read_animation(input).with_context(|| format!("Failed to read capture: {:?}", input))?;

    if options.skeleton && options.mode == ExportMode::Global {
        warn_on_name_mismatch(&animation, &options.hierarchy);
    }
    let poses = prepare_poses(&animation, options.mode, &options.hierarchy)
        .with_context(|| format!("Failed to export {:?}", input))?;

    // Nothing is written until every artifact of the clip has encoded
    let converted = encode_animation(&poses, options.mode, options.unit_scale)?;
    let skeleton = if options.skeleton {
        let skeleton = encode_skeleton(&poses, &options.hierarchy, options.unit_scale)
            .with_context(|| format!("Failed to export skeleton for {:?}", input))?;
        Some(skeleton)
    } else {
        None
    };

    let animation_path = out_dir.join(format!("{}.{}", name, ANIMATION_EXT));
    write_text(&animation_path, &converted.text)?;
    tracing::info!(
        "{:?}: {} bones, {} frames at {} fps",
        animation_path,
        converted.bone_count,
        converted.frame_count,
        converted.framerate
    );

    let skeleton_path = match skeleton {
        Some(skeleton) => {
            let path = out_dir.join(format!("{}.{}", name, SKELETON_EXT));
            write_text(&path, &skeleton.text)?;
            tracing::info!("{:?}: {} joints", path, skeleton.bone_count);
            Some(path)
        }
        None => None,
    };

    Ok(ClipOutputs {
        animation: animation_path,
        skeleton: skeleton_path,
    })
}

/// Convert every `*.csv` directly inside `in_dir`
///
/// Subdirectories are not visited. The first failing file aborts the batch.
pub fn convert_directory(
    in_dir: &Path,
    out_dir: &Path,
    options: &BatchOptions,
) -> Result<BatchSummary> {
    fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create output directory: {:?}", out_dir))?;

    let mut summary = BatchSummary::default();

    for entry in WalkDir::new(in_dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.with_context(|| format!("Failed to read directory: {:?}", in_dir))?;
        let path = entry.path();

        let stem = match capture_stem(path) {
            Some(stem) if entry.file_type().is_file() => stem,
            _ => {
                tracing::debug!("Skipping {:?}", path);
                summary.skipped += 1;
                continue;
            }
        };

        let outputs = export_clip(path, out_dir, stem, options)?;
        summary.animations += 1;
        if outputs.skeleton.is_some() {
            summary.skeletons += 1;
        }
    }

    tracing::info!(
        "Converted {} clips ({} skeletons), skipped {} entries",
        summary.animations,
        summary.skeletons,
        summary.skipped
    );

    Ok(summary)
}

/// File stem of a capture file, `None` for anything but `.csv`
fn capture_stem(path: &Path) -> Option<&str> {
    let ext = path.extension()?.to_str()?;
    if !ext.eq_ignore_ascii_case("csv") {
        return None;
    }
    path.file_stem()?.to_str()
}
