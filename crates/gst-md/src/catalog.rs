//! Registered custom record types, looked up by name.
//!
//! Built once at startup; the registry resolves `CustomData` declarations
//! through it and the runtime creates one reader per type from it.

use std::collections::BTreeMap;
use std::sync::Arc;

use gst_schemas::Resolution;

use crate::convert::Converter;
use crate::reader::RecordReader;
use crate::record_type::CustomDataType;

pub const GARCH_DATA: &str = "Garch_data";

const GARCH_DATA_URL: &str =
    "https://raw.githubusercontent.com/Patrizio825/repository_prova/main/rolling_garch_objects.csv";

/// Rolling GARCH estimates published as a `;`-delimited daily CSV.
pub fn garch_data() -> CustomDataType {
    CustomDataType::new(GARCH_DATA, "Row", "%Y-%m-%d")
        .with_url(GARCH_DATA_URL)
        .with_delimiter(';')
        .with_resolution(Resolution::Daily)
        .with_default_converter(Converter::Float)
}

#[derive(Debug, Clone, Default)]
pub struct CustomDataCatalog {
    types: BTreeMap<String, Arc<CustomDataType>>,
}

impl CustomDataCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog preloaded with the record types that ship with this crate.
    pub fn with_builtin() -> Self {
        let mut c = Self::new();
        c.register(garch_data());
        c
    }

    /// Register (or replace) a type under its `type_id`. Returns the replaced
    /// declaration, if any.
    pub fn register(&mut self, record_type: CustomDataType) -> Option<Arc<CustomDataType>> {
        self.types
            .insert(record_type.type_id.clone(), Arc::new(record_type))
    }

    pub fn get(&self, type_id: &str) -> Option<Arc<CustomDataType>> {
        self.types.get(type_id).cloned()
    }

    pub fn contains(&self, type_id: &str) -> bool {
        self.types.contains_key(type_id)
    }

    pub fn type_ids(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(String::as_str)
    }

    /// Fresh reader (header not yet captured) for a registered type.
    pub fn new_reader(&self, type_id: &str) -> Option<RecordReader> {
        self.get(type_id).map(RecordReader::new)
    }
}
