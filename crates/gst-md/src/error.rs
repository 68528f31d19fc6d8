use std::fmt;

use gst_schemas::Resolution;

/// Errors produced while resolving a record source or parsing its lines.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordError {
    /// The record type is declared incompletely (no source, no resolution, ...).
    Configuration(String),
    /// The date format cannot express the time of day the resolution needs.
    FormatMismatch {
        type_id: String,
        format: String,
        resolution: Resolution,
    },
    /// One line could not be turned into a record. Carries the raw line.
    Parse { line: String, cause: String },
    /// The source text could not be retrieved.
    Fetch { location: String, message: String },
}

impl RecordError {
    pub(crate) fn parse(line: &str, cause: impl Into<String>) -> Self {
        RecordError::Parse {
            line: line.to_string(),
            cause: cause.into(),
        }
    }
}

impl fmt::Display for RecordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordError::Configuration(msg) => write!(f, "RECORD_CONFIGURATION: {msg}"),
            RecordError::FormatMismatch {
                type_id,
                format,
                resolution,
            } => write!(
                f,
                "RECORD_FORMAT_MISMATCH: {type_id} date format '{format}' has no hour/minute \
                 component but resolution is {resolution}"
            ),
            RecordError::Parse { line, cause } => {
                write!(f, "RECORD_PARSE: failed to parse line '{line}': {cause}")
            }
            RecordError::Fetch { location, message } => {
                write!(f, "RECORD_FETCH: {location}: {message}")
            }
        }
    }
}

impl std::error::Error for RecordError {}
