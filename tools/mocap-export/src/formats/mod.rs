//! DayDream text formats (.dda animation, .ddb skeleton)
//!
//! Both formats are line-oriented with `<tag>` ... `</tag>` blocks. Vectors are
//! written as a one-letter prefix followed by three numbers:
//!
//! - `r` - Euler rotation (X, Y, Z) in radians
//! - `p` - position in output units (centimeters by default)
//! - `s` - scale
//!
//! Numbers use the shortest representation that round-trips (`0`, `100`, `0.25`).
//! Values within [`ZERO_EPSILON`] of zero are written as `0`.

use anyhow::{bail, Result};
use glam::DVec3;
use mocap_common::{BoneKey, ExportMode, Hierarchy};
use std::io::Write;

/// Meters to centimeters
pub const M_TO_CM: f64 = 100.0;

/// Magnitudes below this are written as `0`
pub const ZERO_EPSILON: f64 = 1e-12;

/// Animation file extension
pub const ANIMATION_EXT: &str = "dda";

/// Skeleton file extension
pub const SKELETON_EXT: &str = "ddb";

/// Header fields of a .dda file
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClipHeader {
    pub mode: ExportMode,
    pub framerate: f64,
    pub repeat: bool,
    pub joint_count: usize,
    pub frame_count: usize,
}

/// Write a complete .dda animation
///
/// `tracks` is indexed `[bone][frame]`. Positions are multiplied by
/// `unit_scale` on output.
pub fn write_animation<W: Write>(
    w: &mut W,
    header: &ClipHeader,
    tracks: &[Vec<BoneKey>],
    unit_scale: f64,
) -> Result<()> {
    if tracks.len() != header.joint_count {
        bail!(
            "Animation has {} bone tracks, header declares {}",
            tracks.len(),
            header.joint_count
        );
    }

    writeln!(w, "<format>\n{}\n</format>", header.mode)?;
    writeln!(w, "<framerate>\n{}\n</framerate>", header.framerate)?;
    writeln!(w, "<repeat>\n{}\n</repeat>", header.repeat as u8)?;
    writeln!(
        w,
        "<buffer>\nj {}\nf {}\n</buffer>",
        header.joint_count, header.frame_count
    )?;

    for (bone, track) in tracks.iter().enumerate() {
        if track.len() != header.frame_count {
            bail!(
                "Bone {} has {} frames, header declares {}",
                bone,
                track.len(),
                header.frame_count
            );
        }

        writeln!(w, "<animation>")?;
        writeln!(w, "- {}", bone)?;
        for key in track {
            writeln!(w, "r {}", vec3(key.rotation))?;
            writeln!(w, "p {}", vec3(key.position * unit_scale))?;
        }
        writeln!(w, "</animation>")?;
    }
    writeln!(w)?;

    Ok(())
}

/// Write a complete .ddb skeleton
///
/// Joint names come from the capture; parent indices from `hierarchy`.
/// `bind` holds one key per bone (frame 0).
pub fn write_skeleton<W: Write>(
    w: &mut W,
    hierarchy: &Hierarchy,
    bone_names: &[String],
    bind: &[BoneKey],
    unit_scale: f64,
) -> Result<()> {
    if bone_names.len() != hierarchy.len() || bind.len() != hierarchy.len() {
        bail!(
            "Skeleton has {} names and {} bind poses, hierarchy has {} bones",
            bone_names.len(),
            bind.len(),
            hierarchy.len()
        );
    }

    writeln!(w, "<size>\n{}\n</size>", hierarchy.len())?;

    // Skeleton to world: identity
    writeln!(w, "<global>")?;
    writeln!(w, "p {}", vec3(DVec3::ZERO))?;
    writeln!(w, "r {}", vec3(DVec3::ZERO))?;
    writeln!(w, "s {}", vec3(DVec3::ONE))?;
    writeln!(w, "</global>")?;

    for (bone, (name, key)) in bone_names.iter().zip(bind).enumerate() {
        writeln!(w, "<joint>")?;
        writeln!(w, "{} {} {}", name, bone, hierarchy.parent(bone))?;
        writeln!(w, "p {}", vec3(key.position * unit_scale))?;
        writeln!(w, "r {}", vec3(key.rotation))?;
        writeln!(w, "s {}", vec3(DVec3::ONE))?;
        writeln!(w, "</joint>")?;
    }

    Ok(())
}

fn vec3(v: DVec3) -> String {
    format!("{} {} {}", number(v.x), number(v.y), number(v.z))
}

/// Round-off noise and negative zero print as `0`
fn number(value: f64) -> f64 {
    if value.abs() < ZERO_EPSILON {
        0.0
    } else {
        value
    }
}
