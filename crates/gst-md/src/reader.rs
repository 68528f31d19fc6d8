//! Header-then-data line reader.
//!
//! One [`RecordReader`] per record type. The first non-blank line it sees is
//! stored as the column header; every later line is parsed against that
//! header into a [`CustomDataRecord`]. The reader is owned by whoever owns the
//! stream, so no header state is shared between readers.

use std::sync::Arc;

use chrono::format::{parse, Parsed, StrftimeItems};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;
use tracing::debug;

use gst_schemas::{Resolution, Symbol};

use crate::convert::{FieldValue, Fields};
use crate::error::RecordError;
use crate::record_type::CustomDataType;

/// Nominal close instant stamped on every daily record.
pub fn daily_close_time() -> NaiveTime {
    NaiveTime::from_hms_opt(16, 15, 0).unwrap_or(NaiveTime::MIN)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReaderPhase {
    Uninitialized,
    HeaderCaptured,
    Streaming,
}

/// One parsed row. `time` and `end_time` are always equal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomDataRecord {
    pub type_id: String,
    pub symbol: Symbol,
    pub time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub fields: Fields,
}

impl CustomDataRecord {
    pub fn get(&self, column: &str) -> Option<&FieldValue> {
        self.fields.get(column)
    }
}

#[derive(Debug, Clone)]
pub struct RecordReader {
    record_type: Arc<CustomDataType>,
    header: Option<Vec<String>>,
    phase: ReaderPhase,
}

impl RecordReader {
    pub fn new(record_type: Arc<CustomDataType>) -> Self {
        Self {
            record_type,
            header: None,
            phase: ReaderPhase::Uninitialized,
        }
    }

    pub fn record_type(&self) -> &CustomDataType {
        &self.record_type
    }

    pub fn phase(&self) -> ReaderPhase {
        self.phase
    }

    pub fn header(&self) -> Option<&[String]> {
        self.header.as_deref()
    }

    /// Feed one raw line.
    ///
    /// Returns `Ok(None)` for the header line and for blank lines. A failed
    /// data line leaves the reader unchanged so the next line can still parse.
    pub fn read_line(
        &mut self,
        line: &str,
        symbol: &Symbol,
    ) -> Result<Option<CustomDataRecord>, RecordError> {
        let line = clean_line(line);
        if line.is_empty() {
            return Ok(None);
        }

        let header = match &self.header {
            None => {
                let columns = split_line(line, self.record_type.delimiter);
                debug!(
                    type_id = %self.record_type.type_id,
                    columns = columns.len(),
                    "header captured"
                );
                self.header = Some(columns);
                self.phase = ReaderPhase::HeaderCaptured;
                return Ok(None);
            }
            Some(h) => h,
        };

        let record = parse_data_line(&self.record_type, header, line, symbol)?;
        self.phase = ReaderPhase::Streaming;
        Ok(Some(record))
    }
}

/// Parse one data line against a known header. Pure: the same inputs always
/// produce the same record or the same error.
pub fn parse_data_line(
    record_type: &CustomDataType,
    header: &[String],
    line: &str,
    symbol: &Symbol,
) -> Result<CustomDataRecord, RecordError> {
    let line = clean_line(line);
    let values = split_line(line, record_type.delimiter);

    let date_idx = header
        .iter()
        .position(|c| *c == record_type.date_column)
        .ok_or_else(|| {
            RecordError::parse(
                line,
                format!(
                    "header mismatch: date column '{}' not in header [{}]",
                    record_type.date_column,
                    header.join(", ")
                ),
            )
        })?;

    let resolution = record_type.require_resolution()?;
    record_type.check_date_format(resolution)?;

    if values.len() < header.len() {
        return Err(RecordError::parse(
            line,
            format!(
                "line has {} fields but header has {}",
                values.len(),
                header.len()
            ),
        ));
    }

    let raw_date = values[date_idx].trim();
    let mut time = parse_timestamp(raw_date, &record_type.date_format)
        .map_err(|cause| RecordError::parse(line, cause))?;
    if resolution == Resolution::Daily {
        time = time.date().and_time(daily_close_time());
    }

    let mut fields = Fields::with_capacity(header.len().saturating_sub(1));
    for (idx, column) in header.iter().enumerate() {
        if idx == date_idx {
            continue;
        }
        let value = record_type
            .converters
            .converter_for(column)
            .convert(&values[idx])
            .map_err(|cause| RecordError::parse(line, format!("column '{column}': {cause}")))?;
        fields.push(column.clone(), value);
    }

    Ok(CustomDataRecord {
        type_id: record_type.type_id.clone(),
        symbol: symbol.clone(),
        time,
        end_time: time,
        fields,
    })
}

/// Surrounding whitespace and a leading UTF-8 BOM are not part of the row.
fn clean_line(line: &str) -> &str {
    line.trim_start_matches('\u{feff}').trim()
}

fn split_line(line: &str, delimiter: char) -> Vec<String> {
    line.split(delimiter).map(str::to_string).collect()
}

/// Parse `raw` with a strftime `format`. Missing time fields default to zero
/// (`%I` without `%p` reads as AM); date-only formats yield midnight.
fn parse_timestamp(raw: &str, format: &str) -> Result<NaiveDateTime, String> {
    let mut parsed = Parsed::new();
    parse(&mut parsed, raw, StrftimeItems::new(format))
        .map_err(|e| format!("cannot parse '{raw}' with format '{format}': {e}"))?;

    if let Ok(dt) = parsed.to_naive_datetime_with_offset(0) {
        return Ok(dt);
    }

    let date: NaiveDate = parsed
        .to_naive_date()
        .map_err(|e| format!("cannot build date from '{raw}' with format '{format}': {e}"))?;

    let time = match parsed.to_naive_time() {
        Ok(t) => t,
        Err(_) => {
            // Missing pieces default like strptime: AM, hour 0, minute 0.
            // Each setter is a no-op when the field was already parsed.
            let mut filled = parsed.clone();
            let _ = filled.set_ampm(false);
            let _ = filled.set_hour(0);
            let _ = filled.set_minute(0);
            filled.to_naive_time().map_err(|e| {
                format!("cannot build time of day from '{raw}' with format '{format}': {e}")
            })?
        }
    };
    Ok(date.and_time(time))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::Converter;

    fn ts(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    fn sym() -> Symbol {
        Symbol::new("FEED", 7)
    }

    #[test]
    fn timestamp_formats() {
        assert_eq!(
            parse_timestamp("2024-01-01", "%Y-%m-%d").unwrap(),
            ts("2024-01-01 00:00:00")
        );
        assert_eq!(
            parse_timestamp("2024-01-01 09:30", "%Y-%m-%d %H:%M").unwrap(),
            ts("2024-01-01 09:30:00")
        );
        assert_eq!(
            parse_timestamp("2024010110", "%Y%m%d%H").unwrap(),
            ts("2024-01-01 10:00:00")
        );
        assert!(parse_timestamp("01/02/2024", "%Y-%m-%d").is_err());
    }

    #[test]
    fn partial_clock_formats_keep_time_of_day() {
        assert_eq!(
            parse_timestamp("2024-01-01 09:30", "%Y-%m-%d %I:%M").unwrap(),
            ts("2024-01-01 09:30:00")
        );
        assert_eq!(
            parse_timestamp("2024-01-01 30", "%Y-%m-%d %M").unwrap(),
            ts("2024-01-01 00:30:00")
        );
        assert_eq!(
            parse_timestamp("2024-01-01 03 PM", "%Y-%m-%d %I %p").unwrap(),
            ts("2024-01-01 15:00:00")
        );
    }

    #[test]
    fn twelve_hour_feed_records_carry_parsed_time() {
        let t = CustomDataType::new("F", "d", "%Y-%m-%d %I:%M")
            .with_path("/unused")
            .with_resolution(Resolution::Minute)
            .with_default_converter(Converter::Float);
        let mut r = RecordReader::new(Arc::new(t));
        r.read_line("d,v", &sym()).unwrap();
        let rec = r.read_line("2024-01-01 09:30,1.0", &sym()).unwrap().unwrap();
        assert_eq!(rec.time, ts("2024-01-01 09:30:00"));

        let t = CustomDataType::new("F", "d", "%Y-%m-%d %M")
            .with_path("/unused")
            .with_resolution(Resolution::Minute);
        let mut r = RecordReader::new(Arc::new(t));
        r.read_line("d,v", &sym()).unwrap();
        let rec = r.read_line("2024-01-01 30,x", &sym()).unwrap().unwrap();
        assert_eq!(rec.time, ts("2024-01-01 00:30:00"));
    }

    #[test]
    fn header_with_bom_and_padding_still_matches_date_column() {
        let t = CustomDataType::new("Feed", "Row", "%Y-%m-%d")
            .with_delimiter(';')
            .with_resolution(Resolution::Daily);
        let mut r = RecordReader::new(Arc::new(t));
        assert!(r.read_line("\u{feff}Row;mu \r\n", &sym()).unwrap().is_none());
        assert_eq!(r.header().unwrap(), ["Row", "mu"]);
        let rec = r.read_line("  2024-01-01;0.5  ", &sym()).unwrap().unwrap();
        assert_eq!(rec.time, ts("2024-01-01 16:15:00"));
        assert_eq!(rec.get("mu"), Some(&FieldValue::Text("0.5".into())));
    }

    #[test]
    fn header_then_streaming_phases() {
        let t = CustomDataType::new("Feed", "Date", "%Y-%m-%d %H:%M")
            .with_path("/unused")
            .with_resolution(Resolution::Minute)
            .with_field("px", Converter::Float);
        let mut r = RecordReader::new(Arc::new(t));
        assert_eq!(r.phase(), ReaderPhase::Uninitialized);

        assert!(r.read_line("Date,px,note\r\n", &sym()).unwrap().is_none());
        assert_eq!(r.phase(), ReaderPhase::HeaderCaptured);
        assert_eq!(r.header().unwrap(), ["Date", "px", "note"]);

        let rec = r
            .read_line("2024-03-04 10:01,101.5,hello", &sym())
            .unwrap()
            .unwrap();
        assert_eq!(r.phase(), ReaderPhase::Streaming);
        assert_eq!(rec.time, ts("2024-03-04 10:01:00"));
        assert_eq!(rec.time, rec.end_time);
        assert_eq!(rec.get("px"), Some(&FieldValue::Float(101.5)));
        assert_eq!(rec.get("note"), Some(&FieldValue::Text("hello".into())));
        assert!(rec.get("Date").is_none());
        assert_eq!(rec.symbol, sym());
    }

    #[test]
    fn blank_lines_are_skipped() {
        let t = CustomDataType::new("Feed", "d", "%Y-%m-%d").with_resolution(Resolution::Daily);
        let mut r = RecordReader::new(Arc::new(t));
        assert!(r.read_line("", &sym()).unwrap().is_none());
        assert!(r.read_line("   \n", &sym()).unwrap().is_none());
        assert_eq!(r.phase(), ReaderPhase::Uninitialized);
    }

    #[test]
    fn short_line_is_parse_error() {
        let t = CustomDataType::new("Feed", "d", "%Y-%m-%d").with_resolution(Resolution::Daily);
        let header = vec!["d".to_string(), "a".to_string(), "b".to_string()];
        let err = parse_data_line(&t, &header, "2024-01-01,1", &sym()).unwrap_err();
        match err {
            RecordError::Parse { line, cause } => {
                assert_eq!(line, "2024-01-01,1");
                assert!(cause.contains("3"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn extra_trailing_fields_are_ignored() {
        let t = CustomDataType::new("Feed", "d", "%Y-%m-%d").with_resolution(Resolution::Daily);
        let header = vec!["d".to_string(), "a".to_string()];
        let rec = parse_data_line(&t, &header, "2024-01-01,x,y", &sym()).unwrap();
        assert_eq!(rec.fields.len(), 1);
        assert_eq!(rec.time, ts("2024-01-01 16:15:00"));
    }

    #[test]
    fn missing_resolution_is_configuration_error() {
        let t = CustomDataType::new("Feed", "d", "%Y-%m-%d");
        let header = vec!["d".to_string()];
        assert!(matches!(
            parse_data_line(&t, &header, "2024-01-01", &sym()),
            Err(RecordError::Configuration(_))
        ));
    }
}
