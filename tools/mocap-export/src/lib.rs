//! mocap-export library
//!
//! Converts motion-capture CSV files to DayDream animation (.dda) and
//! skeleton (.ddb) text files. Used by the `mocap-export` binary.

pub mod animation;
pub mod batch;
pub mod csv;
pub mod formats;
pub mod manifest;
pub mod skeleton;

// Re-export pose math and hierarchy types from mocap-common
pub use mocap_common::{ExportMode, Hierarchy, REFERENCE_BONES, REFERENCE_PARENTS};

// Re-export conversion types
pub use animation::{convert_animation_to_memory, ConvertedAnimation};
pub use batch::{convert_directory, BatchOptions, BatchSummary};
pub use skeleton::{convert_skeleton_to_memory, ConvertedSkeleton};
