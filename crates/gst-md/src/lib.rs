//! gst-md
//!
//! Custom record feeds: type declarations, the field converter catalog, the
//! header-then-data line reader and source retrieval.
//!
//! Deterministic by construction. Parsing a line depends only on the record
//! type, the captured header and the line itself.

mod catalog;
mod convert;
mod error;
mod reader;
mod record_type;
mod source;

pub use catalog::{garch_data, CustomDataCatalog, GARCH_DATA};
pub use convert::{parse_bool, Converter, FieldConverters, FieldValue, Fields};
pub use error::RecordError;
pub use reader::{daily_close_time, parse_data_line, CustomDataRecord, ReaderPhase, RecordReader};
pub use record_type::{has_time_component, CustomDataType, SourceLocation};
pub use source::{read_all, SourceFetcher};
