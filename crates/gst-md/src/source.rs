//! Retrieval of a record type's raw text.

use std::fs;

use gst_schemas::Symbol;
use tracing::info;

use crate::error::RecordError;
use crate::reader::{CustomDataRecord, RecordReader};
use crate::record_type::SourceLocation;

/// Fetches the full text behind a [`SourceLocation`].
///
/// Remote locations go through a blocking HTTP client; local ones are read
/// from disk.
#[derive(Debug, Clone)]
pub struct SourceFetcher {
    http: reqwest::blocking::Client,
}

impl Default for SourceFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl SourceFetcher {
    pub fn new() -> Self {
        Self {
            http: reqwest::blocking::Client::new(),
        }
    }

    pub fn with_client(http: reqwest::blocking::Client) -> Self {
        Self { http }
    }

    pub fn fetch(&self, location: &SourceLocation) -> Result<String, RecordError> {
        let text = match location {
            SourceLocation::Remote(url) => self.fetch_remote(url)?,
            SourceLocation::Local(path) => {
                fs::read_to_string(path).map_err(|e| RecordError::Fetch {
                    location: location.to_string(),
                    message: e.to_string(),
                })?
            }
        };
        info!(%location, bytes = text.len(), "record source fetched");
        Ok(text)
    }

    fn fetch_remote(&self, url: &str) -> Result<String, RecordError> {
        let fetch_err = |message: String| RecordError::Fetch {
            location: format!("remote:{url}"),
            message,
        };

        let resp = self
            .http
            .get(url)
            .send()
            .map_err(|e| fetch_err(format!("request failed: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(fetch_err(format!("http error status={}", status.as_u16())));
        }

        resp.text()
            .map_err(|e| fetch_err(format!("body decode failed: {e}")))
    }
}

/// Run every line of `text` through `reader`, collecting emitted records.
/// Stops at the first line that fails.
pub fn read_all(
    reader: &mut RecordReader,
    text: &str,
    symbol: &Symbol,
) -> Result<Vec<CustomDataRecord>, RecordError> {
    let mut out = Vec::new();
    for line in text.lines() {
        if let Some(rec) = reader.read_line(line, symbol)? {
            out.push(rec);
        }
    }
    Ok(out)
}
