//! Capture CSV reader
//!
//! The capture rig writes one header line and one row per frame:
//!
//! ```text
//! time,Hips:posx,Hips:posy,Hips:posz,Hips:rotw,Hips:rotx,Hips:roty,Hips:rotz,LeftUpLeg:posx,...
//! 0.0,0.01,0.95,0.02,1.0,0.0,0.0,0.0,...
//! ```
//!
//! Every bone contributes [`DATA_PER_BONE`] columns: position in meters, then
//! a w-first quaternion. Bone names are taken from the header, up to the `:`.
//! Lines may carry trailing commas; blank lines are ignored.

use glam::{DQuat, DVec3};
use mocap_common::{Animation, Frame, Pose};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Values per bone: position xyz + quaternion wxyz
pub const DATA_PER_BONE: usize = 7;

#[derive(Debug, thiserror::Error)]
pub enum CsvError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("missing header line")]
    MissingHeader,

    #[error("header has {columns} columns, expected time plus {} per bone", DATA_PER_BONE)]
    MalformedHeader { columns: usize },

    #[error("line {line}: expected {expected} values, found {found}")]
    ShortRow {
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("line {line}, column {column}: '{value}' is not a number")]
    InvalidNumber {
        line: usize,
        column: usize,
        value: String,
    },

    #[error("no frames after the header")]
    NoFrames,
}

/// Read a capture CSV file
pub fn read_animation(path: &Path) -> Result<Animation, CsvError> {
    let file = File::open(path)?;
    parse_animation(BufReader::new(file))
}

/// Parse capture CSV from any buffered reader
pub fn parse_animation<R: BufRead>(reader: R) -> Result<Animation, CsvError> {
    let mut lines = reader.lines().enumerate();

    let header = loop {
        match lines.next() {
            Some((_, line)) => {
                let line = line?;
                if !clean(&line).is_empty() {
                    break line;
                }
            }
            None => return Err(CsvError::MissingHeader),
        }
    };
    let bone_names = read_header(&header)?;
    let expected = 1 + bone_names.len() * DATA_PER_BONE;

    let mut frames = Vec::new();
    for (index, line) in lines {
        let line = line?;
        let line_no = index + 1;
        let row = clean(&line);
        if row.is_empty() {
            continue;
        }

        let fields: Vec<&str> = row.split(',').collect();
        if fields.len() < expected {
            return Err(CsvError::ShortRow {
                line: line_no,
                expected,
                found: fields.len(),
            });
        }

        let values = fields
            .iter()
            .take(expected)
            .enumerate()
            .map(|(column, field)| parse_value(field, line_no, column + 1))
            .collect::<Result<Vec<f64>, _>>()?;

        let poses = values[1..]
            .chunks_exact(DATA_PER_BONE)
            .map(|v| {
                Pose::new(
                    DVec3::new(v[0], v[1], v[2]),
                    DQuat::from_xyzw(v[4], v[5], v[6], v[3]),
                )
            })
            .collect();

        frames.push(Frame {
            time: values[0],
            poses,
        });
    }

    if frames.is_empty() {
        return Err(CsvError::NoFrames);
    }

    tracing::debug!("Parsed {} frames of {} bones", frames.len(), bone_names.len());

    Ok(Animation::new(bone_names, frames))
}

/// Bone names from the header line, one per group of columns
fn read_header(header: &str) -> Result<Vec<String>, CsvError> {
    let columns: Vec<&str> = clean(header).split(',').collect();
    if columns.len() < 1 + DATA_PER_BONE || (columns.len() - 1) % DATA_PER_BONE != 0 {
        return Err(CsvError::MalformedHeader {
            columns: columns.len(),
        });
    }

    Ok(columns[1..]
        .iter()
        .step_by(DATA_PER_BONE)
        .map(|column| column.split(':').next().unwrap_or_default().trim().to_string())
        .collect())
}

fn clean(line: &str) -> &str {
    line.trim().trim_matches(',')
}

fn parse_value(field: &str, line: usize, column: usize) -> Result<f64, CsvError> {
    let field = field.trim();
    field.parse().map_err(|_| CsvError::InvalidNumber {
        line,
        column,
        value: field.to_string(),
    })
}
