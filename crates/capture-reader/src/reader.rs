//! Capture file parsing and directory listing

use crate::timestamp::parse_capture_timestamp;
use crate::{CaptureError, RawWindow};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// List capture files in a directory, ordered by file name.
///
/// Capture names sort lexicographically in chronological order, so the
/// returned order is the capture order. Sub-directories and dot-files are
/// ignored; every other entry is returned and must parse as a capture.
pub fn list_captures(dir: &Path) -> Result<Vec<PathBuf>, CaptureError> {
    let entries = fs::read_dir(dir).map_err(|e| CaptureError::io(dir, e))?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| CaptureError::io(dir, e))?;
        let file_type = entry.file_type().map_err(|e| CaptureError::io(entry.path(), e))?;
        if file_type.is_dir() {
            continue;
        }
        if entry.file_name().to_string_lossy().starts_with('.') {
            continue;
        }
        files.push(entry.path());
    }

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    debug!("Found {} capture files in {}", files.len(), dir.display());
    Ok(files)
}

/// Extract one 1-based channel from the text of a capture file.
///
/// `file` is only used to label errors.
pub fn parse_channel(content: &str, bearing: usize, file: &Path) -> Result<Vec<f64>, CaptureError> {
    if bearing == 0 {
        return Err(CaptureError::InvalidBearing(bearing));
    }

    let mut samples = Vec::new();
    let mut columns: Option<usize> = None;

    for (line_idx, line) in content.lines().enumerate() {
        let line_no = line_idx + 1;
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.is_empty() {
            continue;
        }

        match columns {
            None => {
                if bearing > tokens.len() {
                    return Err(CaptureError::malformed(
                        file,
                        format!(
                            "bearing {} requested but line {} has only {} columns",
                            bearing,
                            line_no,
                            tokens.len()
                        ),
                    ));
                }
                columns = Some(tokens.len());
            }
            Some(expected) if expected != tokens.len() => {
                return Err(CaptureError::malformed(
                    file,
                    format!(
                        "line {} has {} columns, expected {}",
                        line_no,
                        tokens.len(),
                        expected
                    ),
                ));
            }
            Some(_) => {}
        }

        let token = tokens[bearing - 1];
        let value: f64 = token.parse().map_err(|_| {
            CaptureError::malformed(
                file,
                format!("non-numeric value '{}' at line {}", token, line_no),
            )
        })?;
        if !value.is_finite() {
            return Err(CaptureError::malformed(
                file,
                format!("non-finite value '{}' at line {}", token, line_no),
            ));
        }
        samples.push(value);
    }

    Ok(samples)
}

/// Read one channel of a capture file
pub fn read_channel(path: &Path, bearing: usize) -> Result<Vec<f64>, CaptureError> {
    let content = fs::read_to_string(path).map_err(|e| match e.kind() {
        ErrorKind::InvalidData => {
            CaptureError::malformed(path, "non-numeric content (not UTF-8 text)")
        }
        _ => CaptureError::io(path, e),
    })?;
    parse_channel(&content, bearing, path)
}

/// Read one channel of a capture file together with its capture time
pub fn read_window(path: &Path, bearing: usize) -> Result<RawWindow, CaptureError> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let timestamp = parse_capture_timestamp(&name)?;
    let samples = read_channel(path, bearing)?;
    Ok(RawWindow::new(timestamp, bearing, samples))
}
