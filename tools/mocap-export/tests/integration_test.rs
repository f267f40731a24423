//! Integration tests for mocap-export
//!
//! Tests the full pipeline: generate capture CSV -> convert -> verify output


use std::path::Path;
use std::process::{Command, Output};
use tempfile::tempdir;

use mocap_export::{REFERENCE_BONES, REFERENCE_PARENTS};

fn mocap_export(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_mocap-export"))
        .args(args)
        .output()
        .expect("Failed to run mocap-export")
}

fn run_ok(args: &[&str]) {
    let output = mocap_export(args);
    assert!(
        output.status.success(),
        "mocap-export {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
}

fn path_str(path: &Path) -> &str {
    path.to_str().unwrap()
}

/// Parse every `<prefix> x y z` line
fn vectors(text: &str, prefix: &str) -> Vec<[f64; 3]> {
    text.lines()
        .filter_map(|line| line.strip_prefix(prefix))
        .map(|rest| {
            let v: Vec<f64> = rest
                .split_whitespace()
                .map(|n| n.parse().expect("Invalid number"))
                .collect();
            [v[0], v[1], v[2]]
        })
        .collect()
}

fn assert_close(actual: [f64; 3], expected: [f64; 3]) {
    for axis in 0..3 {
        assert!(
            (actual[axis] - expected[axis]).abs() < 1e-6,
            "{:?} != {:?}",
            actual,
            expected
        );
    }
}

/// Two frames, one root bone, 0 -> 1m along Y
#[test]
fn test_rising_root_animation() {
    let dir = tempdir().expect("Failed to create temp dir");
    let csv = dir.path().join("rise.csv");
    let dda = dir.path().join("rise.dda");
    generate_test_captures::generate_rising_root(&csv, 0.5).expect("Failed to write CSV");

    run_ok(&["animation", path_str(&csv), "-o", path_str(&dda)]);

    let text = std::fs::read_to_string(&dda).expect("Failed to read .dda");
    let expected = "\
<format>
global
</format>
<framerate>
2
</framerate>
<repeat>
0
</repeat>
<buffer>
j 1
f 2
</buffer>
<animation>
- 0
r 0 0 0
p 0 0 0
r 0 0 0
p 0 100 0
</animation>

";
    assert_eq!(text, expected);
}

/// Without -o the output lands next to the input
#[test]
fn test_default_output_path() {
    let dir = tempdir().expect("Failed to create temp dir");
    let csv = dir.path().join("take.csv");
    generate_test_captures::generate_rising_root(&csv, 0.125).expect("Failed to write CSV");

    run_ok(&["animation", path_str(&csv)]);

    let text = std::fs::read_to_string(dir.path().join("take.dda")).expect("Missing take.dda");
    assert!(text.contains("<framerate>\n8\n</framerate>"));
}

/// Relative export of the reference skeleton recovers the parent offsets
#[test]
fn test_relative_reference_animation() {
    let dir = tempdir().expect("Failed to create temp dir");
    let csv = dir.path().join("walk.csv");
    let dda = dir.path().join("walk.dda");
    generate_test_captures::generate_reference_capture(&csv, 3).expect("Failed to write CSV");

    run_ok(&["animation", path_str(&csv), "-o", path_str(&dda), "-m", "relative"]);

    let text = std::fs::read_to_string(&dda).expect("Failed to read .dda");
    assert!(text.starts_with("<format>\nrelative\n</format>\n"));
    assert!(text.contains("<buffer>\nj 28\nf 3\n</buffer>"));

    // Tracks are bone-major: bone b, frame f is entry b * 3 + f
    let positions = vectors(&text, "p ");
    let rotations = vectors(&text, "r ");
    assert_eq!(positions.len(), 28 * 3);
    assert_eq!(rotations.len(), 28 * 3);

    for frame in 0..3 {
        // Root keeps its global pose
        assert_close(positions[frame], [frame as f64 / 3.0 * 100.0, 100.0, 0.0]);
    }
    for bone in 1..REFERENCE_BONES.len() {
        for frame in 0..3 {
            assert_close(positions[bone * 3 + frame], [0.0, 50.0, 0.0]);
            assert_close(rotations[bone * 3 + frame], [0.0, 0.0, 0.0]);
        }
    }
}

/// Relative export needs one captured bone per hierarchy bone
#[test]
fn test_relative_bone_count_mismatch_fails() {
    let dir = tempdir().expect("Failed to create temp dir");
    let csv = dir.path().join("rise.csv");
    generate_test_captures::generate_rising_root(&csv, 0.5).expect("Failed to write CSV");

    let output = mocap_export(&["animation", path_str(&csv), "-m", "relative"]);
    assert!(!output.status.success());
    assert!(!dir.path().join("rise.dda").exists());
}

#[test]
fn test_unreadable_capture_fails() {
    let dir = tempdir().expect("Failed to create temp dir");
    let csv = dir.path().join("broken.csv");
    std::fs::write(&csv, "time,Hips:posx\n0,0\n").expect("Failed to write CSV");

    let output = mocap_export(&["animation", path_str(&csv)]);
    assert!(!output.status.success());

    let missing = dir.path().join("missing.csv");
    assert!(!mocap_export(&["animation", path_str(&missing)]).status.success());
}

#[test]
fn test_reference_skeleton() {
    let dir = tempdir().expect("Failed to create temp dir");
    let csv = dir.path().join("walk.csv");
    let ddb = dir.path().join("walk.ddb");
    generate_test_captures::generate_reference_capture(&csv, 2).expect("Failed to write CSV");

    run_ok(&["skeleton", path_str(&csv), "-o", path_str(&ddb), "-m", "relative"]);

    let text = std::fs::read_to_string(&ddb).expect("Failed to read .ddb");
    assert!(text.starts_with(
        "<size>\n28\n</size>\n<global>\np 0 0 0\nr 0 0 0\ns 1 1 1\n</global>\n"
    ));

    let joints: Vec<&str> = text
        .lines()
        .zip(text.lines().skip(1))
        .filter(|(tag, _)| *tag == "<joint>")
        .map(|(_, joint)| joint)
        .collect();
    assert_eq!(joints.len(), REFERENCE_BONES.len());
    for (bone, line) in joints.iter().enumerate() {
        assert_eq!(
            *line,
            format!("{} {} {}", REFERENCE_BONES[bone], bone, REFERENCE_PARENTS[bone])
        );
    }

    // Bind pose is frame 0, relative to the parent
    let positions = vectors(&text, "p ");
    assert_close(positions[0], [0.0, 0.0, 0.0]);
    assert_close(positions[1], [0.0, 100.0, 0.0]);
    assert_close(positions[2], [0.0, 50.0, 0.0]);
}

#[test]
fn test_skeleton_needs_full_hierarchy() {
    let dir = tempdir().expect("Failed to create temp dir");
    let csv = dir.path().join("rise.csv");
    generate_test_captures::generate_rising_root(&csv, 0.5).expect("Failed to write CSV");

    assert!(!mocap_export(&["skeleton", path_str(&csv)]).status.success());
}

/// Batch converts every CSV and ignores everything else
#[test]
fn test_batch_directory() {
    let input = tempdir().expect("Failed to create temp dir");
    let output = tempdir().expect("Failed to create temp dir");
    let out_dir = output.path().join("converted");

    generate_test_captures::generate_reference_capture(&input.path().join("walk.csv"), 2)
        .expect("Failed to write CSV");
    generate_test_captures::generate_reference_capture(&input.path().join("run.csv"), 4)
        .expect("Failed to write CSV");
    std::fs::write(input.path().join("notes.txt"), "session notes").expect("Failed to write");

    run_ok(&[
        "batch",
        path_str(input.path()),
        path_str(&out_dir),
        "-m",
        "relative",
        "--skeleton",
    ]);

    for name in ["walk", "run"] {
        assert!(out_dir.join(format!("{}.dda", name)).is_file());
        assert!(out_dir.join(format!("{}.ddb", name)).is_file());
    }
    assert!(!out_dir.join("notes.dda").exists());

    let run = std::fs::read_to_string(out_dir.join("run.dda")).expect("Failed to read run.dda");
    assert!(run.contains("<buffer>\nj 28\nf 4\n</buffer>"));
}

/// Manifest build resolves paths against the manifest directory
#[test]
fn test_build_from_manifest() {
    let dir = tempdir().expect("Failed to create temp dir");
    std::fs::create_dir(dir.path().join("captures")).expect("Failed to create dir");
    generate_test_captures::generate_rising_root(&dir.path().join("captures/rise.csv"), 0.25)
        .expect("Failed to write CSV");
    generate_test_captures::generate_reference_capture(&dir.path().join("captures/walk.csv"), 2)
        .expect("Failed to write CSV");

    let manifest = dir.path().join("mocap.toml");
    std::fs::write(
        &manifest,
        r#"
[output]
dir = "out"
mode = "relative"

[[clips]]
input = "captures/walk.csv"
skeleton = true

[[clips]]
input = "captures/rise.csv"
name = "rise_global"
mode = "global"
"#,
    )
    .expect("Failed to write manifest");

    run_ok(&["check", path_str(&manifest)]);
    run_ok(&["build", path_str(&manifest)]);

    let out = dir.path().join("out");
    let walk = std::fs::read_to_string(out.join("walk.dda")).expect("Missing walk.dda");
    assert!(walk.starts_with("<format>\nrelative\n"));
    assert!(out.join("walk.ddb").is_file());

    let rise =
        std::fs::read_to_string(out.join("rise_global.dda")).expect("Missing rise_global.dda");
    assert!(rise.contains("<framerate>\n4\n</framerate>"));
    assert!(!out.join("rise_global.ddb").exists());

    // -o overrides [output] dir
    let elsewhere = dir.path().join("elsewhere");
    run_ok(&["build", path_str(&manifest), "-o", path_str(&elsewhere)]);
    assert!(elsewhere.join("walk.dda").is_file());
}

#[test]
fn test_check_rejects_bad_manifest() {
    let dir = tempdir().expect("Failed to create temp dir");
    let manifest = dir.path().join("mocap.toml");
    std::fs::write(&manifest, "[output]\nmode = \"sideways\"\n").expect("Failed to write");

    assert!(!mocap_export(&["check", path_str(&manifest)]).status.success());
}

#[test]
fn test_list_bones() {
    let output = mocap_export(&["bones"]);
    assert!(output.status.success());

    // tracing writes to stdout
    let log = String::from_utf8_lossy(&output.stdout);
    assert!(log.contains("Hierarchy has 28 bones"));
    assert!(log.contains("RightHandThumb2"));
}
