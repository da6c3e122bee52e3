//! Capture Reader
//!
//! Reads raw accelerometer capture files: one file per capture window, named
//! after its capture time, holding one whitespace-delimited column per
//! bearing sensor.

mod error;
mod reader;
mod timestamp;
mod window;

pub use error::CaptureError;
pub use reader::{list_captures, parse_channel, read_channel, read_window};
pub use timestamp::{
    format_timestamp, parse_capture_timestamp, parse_table_timestamp, CAPTURE_NAME_FORMAT,
    TABLE_TIMESTAMP_FORMAT,
};
pub use window::RawWindow;
