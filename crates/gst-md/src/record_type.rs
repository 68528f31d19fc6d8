//! Custom record type declarations.
//!
//! A record type says where its text comes from (exactly one of a remote URL
//! or a local path), how lines are delimited, which column holds the
//! timestamp and how it is formatted, the sampling resolution, and how every
//! other column is converted.

use std::fmt;
use std::path::PathBuf;

use gst_schemas::Resolution;

use crate::convert::{Converter, FieldConverters};
use crate::error::RecordError;

/// strftime tokens that carry a time of day.
const TIME_TOKENS: &[&str] = &["%H", "%M", "%I", "%k", "%l", "%T", "%R", "%X", "%s"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceLocation {
    Remote(String),
    Local(PathBuf),
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceLocation::Remote(url) => write!(f, "remote:{url}"),
            SourceLocation::Local(path) => write!(f, "local:{}", path.display()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CustomDataType {
    pub type_id: String,
    pub data_url: Option<String>,
    pub data_path: Option<PathBuf>,
    pub delimiter: char,
    pub date_column: String,
    pub date_format: String,
    pub resolution: Option<Resolution>,
    pub converters: FieldConverters,
}

impl CustomDataType {
    /// New declaration with `,` delimiter, text passthrough converters and no
    /// source or resolution yet.
    pub fn new(
        type_id: impl Into<String>,
        date_column: impl Into<String>,
        date_format: impl Into<String>,
    ) -> Self {
        Self {
            type_id: type_id.into(),
            data_url: None,
            data_path: None,
            delimiter: ',',
            date_column: date_column.into(),
            date_format: date_format.into(),
            resolution: None,
            converters: FieldConverters::default(),
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.data_url = Some(url.into());
        self
    }

    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.data_path = Some(path.into());
        self
    }

    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn with_resolution(mut self, resolution: Resolution) -> Self {
        self.resolution = Some(resolution);
        self
    }

    pub fn with_default_converter(mut self, converter: Converter) -> Self {
        self.converters.set_default(converter);
        self
    }

    pub fn with_field(mut self, column: impl Into<String>, converter: Converter) -> Self {
        self.converters.insert(column, converter);
        self
    }

    pub fn require_resolution(&self) -> Result<Resolution, RecordError> {
        self.resolution.ok_or_else(|| {
            RecordError::Configuration(format!(
                "record type '{}' declares no resolution",
                self.type_id
            ))
        })
    }

    /// Where this type's text lives. Exactly one location must be declared.
    pub fn source(&self) -> Result<SourceLocation, RecordError> {
        self.require_resolution()?;
        match (&self.data_url, &self.data_path) {
            (Some(url), None) => Ok(SourceLocation::Remote(url.clone())),
            (None, Some(path)) => Ok(SourceLocation::Local(path.clone())),
            (None, None) => Err(RecordError::Configuration(format!(
                "record type '{}' must declare data_url or data_path",
                self.type_id
            ))),
            (Some(_), Some(_)) => Err(RecordError::Configuration(format!(
                "record type '{}' declares both data_url and data_path",
                self.type_id
            ))),
        }
    }

    /// Sub-daily resolutions need a date format with an hour or minute token.
    pub fn check_date_format(&self, resolution: Resolution) -> Result<(), RecordError> {
        if resolution.is_sub_daily() && !has_time_component(&self.date_format) {
            return Err(RecordError::FormatMismatch {
                type_id: self.type_id.clone(),
                format: self.date_format.clone(),
                resolution,
            });
        }
        Ok(())
    }
}

pub fn has_time_component(format: &str) -> bool {
    TIME_TOKENS.iter().any(|t| format.contains(t))
}
