//! Field converter catalog.
//!
//! Each record type maps column names to a [`Converter`]; columns without an
//! explicit entry use the type's default converter.

use std::collections::BTreeMap;
use std::fmt;

use serde::ser::{Serialize, SerializeMap, Serializer};

/// Typed value of one parsed column.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Float(f64),
    Int(i64),
    Bool(bool),
}

impl FieldValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Float(v) => Some(*v),
            FieldValue::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            FieldValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(s) => f.write_str(s),
            FieldValue::Float(v) => write!(f, "{v}"),
            FieldValue::Int(v) => write!(f, "{v}"),
            FieldValue::Bool(v) => write!(f, "{v}"),
        }
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        match self {
            FieldValue::Text(v) => s.serialize_str(v),
            FieldValue::Float(v) => s.serialize_f64(*v),
            FieldValue::Int(v) => s.serialize_i64(*v),
            FieldValue::Bool(v) => s.serialize_bool(*v),
        }
    }
}

/// Conversion applied to one raw column value.
#[derive(Debug, Clone, Copy)]
pub enum Converter {
    /// Passthrough, value kept verbatim.
    Text,
    Float,
    Int,
    /// `true/false/1/0/yes/no`, case-insensitive.
    Bool,
    Custom(fn(&str) -> Result<FieldValue, String>),
}

impl Converter {
    pub fn convert(&self, raw: &str) -> Result<FieldValue, String> {
        match self {
            Converter::Text => Ok(FieldValue::Text(raw.to_string())),
            Converter::Float => raw
                .trim()
                .parse::<f64>()
                .map(FieldValue::Float)
                .map_err(|e| format!("cannot convert '{raw}' to float: {e}")),
            Converter::Int => raw
                .trim()
                .parse::<i64>()
                .map(FieldValue::Int)
                .map_err(|e| format!("cannot convert '{raw}' to int: {e}")),
            Converter::Bool => parse_bool(raw)
                .map(FieldValue::Bool)
                .ok_or_else(|| format!("cannot convert '{raw}' to bool")),
            Converter::Custom(f) => f(raw),
        }
    }
}

pub fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

/// Per-record-type column → converter map with a default fallback.
#[derive(Debug, Clone)]
pub struct FieldConverters {
    default: Converter,
    by_column: BTreeMap<String, Converter>,
}

impl Default for FieldConverters {
    fn default() -> Self {
        Self::new(Converter::Text)
    }
}

impl FieldConverters {
    pub fn new(default: Converter) -> Self {
        Self {
            default,
            by_column: BTreeMap::new(),
        }
    }

    pub fn set_default(&mut self, default: Converter) {
        self.default = default;
    }

    pub fn insert(&mut self, column: impl Into<String>, converter: Converter) {
        self.by_column.insert(column.into(), converter);
    }

    pub fn default_converter(&self) -> Converter {
        self.default
    }

    pub fn converter_for(&self, column: &str) -> Converter {
        self.by_column.get(column).copied().unwrap_or(self.default)
    }
}

/// Parsed columns in header order, date column excluded.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fields(Vec<(String, FieldValue)>);

impl Fields {
    pub(crate) fn with_capacity(n: usize) -> Self {
        Self(Vec::with_capacity(n))
    }

    pub(crate) fn push(&mut self, column: String, value: FieldValue) {
        self.0.push((column, value));
    }

    pub fn get(&self, column: &str) -> Option<&FieldValue> {
        self.0.iter().find(|(c, _)| c == column).map(|(_, v)| v)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(c, _)| c.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.0.iter().map(|(c, v)| (c.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for Fields {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        let mut map = s.serialize_map(Some(self.0.len()))?;
        for (k, v) in &self.0 {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}
