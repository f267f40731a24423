//! mocap.toml manifest parsing and building
//!
//! ```toml
//! [output]
//! dir = "out"
//! mode = "relative"
//! skeleton = true
//!
//! [[clips]]
//! input = "captures/walk.csv"
//!
//! [[clips]]
//! input = "captures/idle.csv"
//! name = "idle_loop"
//! mode = "global"
//! ```
//!
//! Relative paths resolve against the manifest's directory.

use anyhow::{bail, Context, Result};
use mocap_common::{ExportMode, Hierarchy};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::batch::{export_clip, BatchOptions};
use crate::formats::M_TO_CM;

/// mocap.toml manifest structure
#[derive(Debug, Default, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub output: OutputSection,
    #[serde(default)]
    pub clips: Vec<ClipEntry>,
    /// Custom bone hierarchy (default: reference skeleton)
    #[serde(default)]
    pub skeleton: Option<SkeletonSection>,
}

/// Output settings shared by all clips
#[derive(Debug, Deserialize)]
pub struct OutputSection {
    #[serde(default = "default_dir")]
    pub dir: PathBuf,
    #[serde(default)]
    pub mode: ExportMode,
    /// Also emit a .ddb for every clip
    #[serde(default)]
    pub skeleton: bool,
    /// Meters to output units
    #[serde(default = "default_unit_scale")]
    pub unit_scale: f64,
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            dir: default_dir(),
            mode: ExportMode::default(),
            skeleton: false,
            unit_scale: default_unit_scale(),
        }
    }
}

fn default_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_unit_scale() -> f64 {
    M_TO_CM
}

/// Single capture to export
#[derive(Debug, Deserialize)]
pub struct ClipEntry {
    pub input: PathBuf,
    /// Output file name without extension (default: input stem)
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub mode: Option<ExportMode>,
    #[serde(default)]
    pub skeleton: Option<bool>,
}

impl ClipEntry {
    /// Output name, falling back to the input file stem
    pub fn output_name(&self) -> Option<&str> {
        match &self.name {
            Some(name) => Some(name.as_str()),
            None => self.input.file_stem().and_then(|s| s.to_str()),
        }
    }
}

/// Custom hierarchy, one entry per bone in index order
#[derive(Debug, Deserialize)]
pub struct SkeletonSection {
    pub bones: Vec<BoneEntry>,
}

#[derive(Debug, Deserialize)]
pub struct BoneEntry {
    pub name: String,
    /// Parent bone name; the root names itself
    pub parent: String,
}

impl Manifest {
    /// Parse manifest from string
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse mocap.toml")
    }

    /// Bone hierarchy the clips are exported against
    pub fn hierarchy(&self) -> Result<Hierarchy> {
        match &self.skeleton {
            Some(skeleton) => {
                let bones: Vec<(&str, &str)> = skeleton
                    .bones
                    .iter()
                    .map(|b| (b.name.as_str(), b.parent.as_str()))
                    .collect();
                Hierarchy::from_named(&bones).context("Invalid [skeleton] hierarchy")
            }
            None => Ok(Hierarchy::reference()),
        }
    }

    /// Batch options for one clip, with per-clip overrides applied
    fn clip_options(&self, clip: &ClipEntry, hierarchy: &Hierarchy) -> BatchOptions {
        BatchOptions {
            mode: clip.mode.unwrap_or(self.output.mode),
            skeleton: clip.skeleton.unwrap_or(self.output.skeleton),
            unit_scale: self.output.unit_scale,
            hierarchy: hierarchy.clone(),
        }
    }
}

/// Load manifest from file
pub fn load_manifest(path: &Path) -> Result<Manifest> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read manifest: {}", path.display()))?;
    Manifest::parse(&content)
}

/// Check a manifest without touching the filesystem
pub fn validate(manifest: &Manifest) -> Result<()> {
    manifest.hierarchy()?;

    if !(manifest.output.unit_scale.is_finite() && manifest.output.unit_scale > 0.0) {
        bail!(
            "unit_scale must be a positive number, got {}",
            manifest.output.unit_scale
        );
    }

    if manifest.clips.is_empty() {
        tracing::warn!("Manifest declares no clips");
    }

    let mut seen = hashbrown::HashSet::new();
    for clip in &manifest.clips {
        let name = clip
            .output_name()
            .with_context(|| format!("Cannot derive an output name from {:?}", clip.input))?;
        if name.is_empty() {
            bail!("Clip {:?} has an empty name", clip.input);
        }
        if !seen.insert(name) {
            bail!("Duplicate clip name '{}'", name);
        }
    }

    Ok(())
}

/// Export every clip of a manifest
///
/// `base_dir` is the manifest's directory; `output_override` replaces
/// `[output] dir` when set.
pub fn build_all(
    manifest: &Manifest,
    base_dir: &Path,
    output_override: Option<&Path>,
) -> Result<Vec<PathBuf>> {
    validate(manifest)?;
    let hierarchy = manifest.hierarchy()?;

    let out_dir = match output_override {
        Some(dir) => dir.to_path_buf(),
        None => base_dir.join(&manifest.output.dir),
    };
    fs::create_dir_all(&out_dir)
        .with_context(|| format!("Failed to create output directory: {:?}", out_dir))?;

    let mut written = Vec::new();
    for clip in &manifest.clips {
        let input = base_dir.join(&clip.input);
        let name = clip
            .output_name()
            .with_context(|| format!("Cannot derive an output name from {:?}", clip.input))?;
        tracing::debug!("Exporting clip '{}' from {:?}", name, input);

        let options = manifest.clip_options(clip, &hierarchy);
        let outputs = export_clip(&input, &out_dir, name, &options)?;
        written.push(outputs.animation);
        written.extend(outputs.skeleton);
    }

    tracing::info!("Built {} clips into {:?}", manifest.clips.len(), out_dir);

    Ok(written)
}
