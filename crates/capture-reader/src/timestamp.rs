//! Capture timestamp decoding

use crate::CaptureError;
use chrono::NaiveDateTime;

/// File-name format of a capture, e.g. `2004.02.12.10.32.39`
pub const CAPTURE_NAME_FORMAT: &str = "%Y.%m.%d.%H.%M.%S";

/// Timestamp format used in feature tables, e.g. `2004-02-12 10:32:39`
pub const TABLE_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Parse a capture file name into its capture time
pub fn parse_capture_timestamp(name: &str) -> Result<NaiveDateTime, CaptureError> {
    NaiveDateTime::parse_from_str(name, CAPTURE_NAME_FORMAT)
        .map_err(|_| CaptureError::InvalidTimestamp(name.to_string()))
}

/// Parse a timestamp as written in a feature table
pub fn parse_table_timestamp(value: &str) -> Result<NaiveDateTime, CaptureError> {
    NaiveDateTime::parse_from_str(value, TABLE_TIMESTAMP_FORMAT)
        .map_err(|_| CaptureError::InvalidTimestamp(value.to_string()))
}

/// Render a timestamp the way feature tables store it
pub fn format_timestamp(ts: &NaiveDateTime) -> String {
    ts.format(TABLE_TIMESTAMP_FORMAT).to_string()
}
