//! mocap-export - motion capture export tool
//!
//! Converts captured CSV motion to DayDream text formats
//! (.dda animation, .ddb skeleton)

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use mocap_export::formats::{ANIMATION_EXT, M_TO_CM, SKELETON_EXT};
use mocap_export::{animation, batch, manifest, skeleton, ExportMode, Hierarchy};

#[derive(Parser)]
#[command(name = "mocap-export")]
#[command(about = "Motion capture export tool")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Export a capture as a .dda animation
    Animation {
        /// Input capture CSV
        input: PathBuf,

        /// Output .dda file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Pose space: global or relative
        #[arg(short, long, default_value = "global")]
        mode: ExportMode,
    },

    /// Export the first frame of a capture as a .ddb skeleton
    Skeleton {
        /// Input capture CSV
        input: PathBuf,

        /// Output .ddb file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Pose space: global or relative
        #[arg(short, long, default_value = "global")]
        mode: ExportMode,
    },

    /// Export every capture CSV in a directory
    Batch {
        /// Directory with capture CSVs
        in_dir: PathBuf,

        /// Output directory (created if missing)
        out_dir: PathBuf,

        /// Pose space: global or relative
        #[arg(short, long, default_value = "global")]
        mode: ExportMode,

        /// Also export a .ddb skeleton per capture
        #[arg(long)]
        skeleton: bool,
    },

    /// Build clips from a manifest file
    Build {
        /// Path to mocap.toml manifest
        #[arg(default_value = "mocap.toml")]
        manifest: PathBuf,

        /// Output directory (overrides manifest)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Validate manifest without building
    Check {
        /// Path to mocap.toml manifest
        #[arg(default_value = "mocap.toml")]
        manifest: PathBuf,
    },

    /// List the reference bone hierarchy
    Bones,
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Animation {
            input,
            output,
            mode,
        } => {
            let output = output.unwrap_or_else(|| input.with_extension(ANIMATION_EXT));
            tracing::info!("Converting {:?} -> {:?}", input, output);
            animation::convert_animation(&input, &output, mode, &Hierarchy::reference(), M_TO_CM)?;
            tracing::info!("Done!");
        }

        Commands::Skeleton {
            input,
            output,
            mode,
        } => {
            let output = output.unwrap_or_else(|| input.with_extension(SKELETON_EXT));
            tracing::info!("Converting {:?} -> {:?}", input, output);
            skeleton::convert_skeleton(&input, &output, mode, &Hierarchy::reference(), M_TO_CM)?;
            tracing::info!("Done!");
        }

        Commands::Batch {
            in_dir,
            out_dir,
            mode,
            skeleton,
        } => {
            tracing::info!("Converting {:?} -> {:?}", in_dir, out_dir);
            let options = batch::BatchOptions {
                mode,
                skeleton,
                ..Default::default()
            };
            batch::convert_directory(&in_dir, &out_dir, &options)?;
            tracing::info!("Done!");
        }

        Commands::Build {
            manifest,
            output,
            verbose,
        } => {
            if verbose {
                tracing::info!("Building clips from {:?}", manifest);
            }
            let config = manifest::load_manifest(&manifest)?;
            let base_dir = manifest_dir(&manifest)?;
            let written = manifest::build_all(&config, &base_dir, output.as_deref())?;
            if verbose {
                for path in &written {
                    tracing::info!("  {:?}", path);
                }
            }
            tracing::info!("Build complete!");
        }

        Commands::Check { manifest } => {
            tracing::info!("Checking manifest {:?}", manifest);
            let config = manifest::load_manifest(&manifest)?;
            manifest::validate(&config)?;
            tracing::info!("Manifest is valid!");
        }

        Commands::Bones => {
            skeleton::list_bones(&Hierarchy::reference());
        }
    }

    Ok(())
}

/// Directory that manifest paths are relative to
fn manifest_dir(manifest: &Path) -> Result<PathBuf> {
    let dir = match manifest.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => std::env::current_dir().context("Failed to get current directory")?,
    };
    Ok(dir)
}
