//! Scoped static config loader.
//!
//! Reads the persisted config document for one project from the object store
//! and keeps only the part that belongs to the requested execution id.
//!
//! Storage key: `Project_{algorithm}_{project_id}/config_data/config_data.{ext}`
//!
//! Filtering rules:
//! - list → entries whose `execution_id` (stringified) equals the id
//! - single object → itself if it matches, otherwise an empty document
//! - table (`;`-delimited) → rows whose `execution_id` cell equals the id
//!
//! A present document that matches nothing is **not** an error here.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info};

use crate::document::{stringify_id, ConfigData, ConfigDocument, ConfigTable, ExecutionEntry};
use crate::hash::{canonical_string, sha256_hex};
use crate::store::ObjectStore;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigLoadError {
    /// The derived storage key is absent.
    SourceNotFound { key: String },
    /// The declared encoding is not one of json | yaml | csv.
    UnsupportedEncoding(String),
    /// Table encoding without an `execution_id` column.
    Schema(String),
    /// Bytes could not be decoded in the declared encoding.
    Decode(String),
    /// The store reported the key but failed to read it.
    Store(String),
    /// `data()` was called before a successful `load()`.
    NotLoaded,
}

impl ConfigLoadError {
    pub fn is_source_not_found(&self) -> bool {
        matches!(self, ConfigLoadError::SourceNotFound { .. })
    }
}

impl fmt::Display for ConfigLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigLoadError::SourceNotFound { key } => {
                write!(f, "CONFIG_SOURCE_NOT_FOUND: no object at key '{key}'")
            }
            ConfigLoadError::UnsupportedEncoding(enc) => {
                write!(f, "CONFIG_UNSUPPORTED_ENCODING: '{enc}' (expected json | yaml | csv)")
            }
            ConfigLoadError::Schema(msg) => write!(f, "CONFIG_SCHEMA: {msg}"),
            ConfigLoadError::Decode(msg) => write!(f, "CONFIG_DECODE: {msg}"),
            ConfigLoadError::Store(msg) => write!(f, "CONFIG_STORE: {msg}"),
            ConfigLoadError::NotLoaded => {
                write!(f, "CONFIG_NOT_LOADED: call load() before data()")
            }
        }
    }
}

impl std::error::Error for ConfigLoadError {}

// ---------------------------------------------------------------------------
// Encoding + key derivation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigEncoding {
    Json,
    Yaml,
    Csv,
}

impl ConfigEncoding {
    pub fn parse(s: &str) -> Result<Self, ConfigLoadError> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(ConfigEncoding::Json),
            "yaml" | "yml" => Ok(ConfigEncoding::Yaml),
            "csv" => Ok(ConfigEncoding::Csv),
            _ => Err(ConfigLoadError::UnsupportedEncoding(s.to_string())),
        }
    }
}

/// Deployment identity the storage key is derived from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectIdentity {
    pub algorithm: String,
    pub project_id: String,
}

impl ProjectIdentity {
    pub fn new(algorithm: impl Into<String>, project_id: impl Into<String>) -> Self {
        Self {
            algorithm: algorithm.into(),
            project_id: project_id.into(),
        }
    }

    pub fn config_key(&self, file_type: &str) -> String {
        format!(
            "Project_{}_{}/config_data/config_data.{}",
            self.algorithm, self.project_id, file_type
        )
    }
}

// ---------------------------------------------------------------------------
// Loader
// ---------------------------------------------------------------------------

pub struct StaticConfigLoader {
    store: Arc<dyn ObjectStore>,
    file_type: String,
    key: String,
    data: Option<ConfigData>,
}

impl StaticConfigLoader {
    pub fn new(store: Arc<dyn ObjectStore>, project: &ProjectIdentity, file_type: &str) -> Self {
        Self {
            store,
            file_type: file_type.to_string(),
            key: project.config_key(file_type),
            data: None,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn load(&mut self, execution_id: &str) -> Result<(), ConfigLoadError> {
        let encoding = ConfigEncoding::parse(&self.file_type)?;

        if !self.store.contains_key(&self.key) {
            return Err(ConfigLoadError::SourceNotFound {
                key: self.key.clone(),
            });
        }

        let bytes = self
            .store
            .read(&self.key)
            .map_err(|e| ConfigLoadError::Store(e.to_string()))?;

        let data = match encoding {
            ConfigEncoding::Json => {
                let raw: Value = serde_json::from_slice(&bytes)
                    .map_err(|e| ConfigLoadError::Decode(format!("json: {e}")))?;
                ConfigData::Document(filter_structured(raw, execution_id)?)
            }
            ConfigEncoding::Yaml => {
                let raw_yaml: serde_yaml::Value = serde_yaml::from_slice(&bytes)
                    .map_err(|e| ConfigLoadError::Decode(format!("yaml: {e}")))?;
                let raw = serde_json::to_value(raw_yaml)
                    .map_err(|e| ConfigLoadError::Decode(format!("yaml->json: {e}")))?;
                ConfigData::Document(filter_structured(raw, execution_id)?)
            }
            ConfigEncoding::Csv => ConfigData::Table(filter_table(&bytes, execution_id)?),
        };

        let kept = match &data {
            ConfigData::Document(d) => d.len(),
            ConfigData::Table(t) => t.len(),
        };
        info!(key = %self.key, execution_id, kept, "config snapshot loaded");
        debug!(
            "filtered config for execution_id={execution_id}:\n{}",
            serde_json::to_string_pretty(&data.to_json()).unwrap_or_default()
        );

        self.data = Some(data);
        Ok(())
    }

    pub fn data(&self) -> Result<&ConfigData, ConfigLoadError> {
        self.data.as_ref().ok_or(ConfigLoadError::NotLoaded)
    }

    pub fn into_data(self) -> Result<ConfigData, ConfigLoadError> {
        self.data.ok_or(ConfigLoadError::NotLoaded)
    }

    /// SHA-256 hex of the canonical JSON form of the loaded snapshot.
    pub fn snapshot_hash(&self) -> Result<String, ConfigLoadError> {
        let data = self.data()?;
        Ok(snapshot_hash(data))
    }
}

pub fn snapshot_hash(data: &ConfigData) -> String {
    sha256_hex(canonical_string(&data.to_json()).as_bytes())
}

fn matches_execution(entry: &Value, execution_id: &str) -> bool {
    entry
        .get("execution_id")
        .and_then(stringify_id)
        .map(|id| id == execution_id)
        .unwrap_or(false)
}

fn decode_entry(entry: Value) -> Result<ExecutionEntry, ConfigLoadError> {
    serde_json::from_value(entry)
        .map_err(|e| ConfigLoadError::Decode(format!("execution entry: {e}")))
}

fn filter_structured(raw: Value, execution_id: &str) -> Result<ConfigDocument, ConfigLoadError> {
    match raw {
        Value::Array(items) => {
            let mut kept = Vec::new();
            for (i, item) in items.into_iter().enumerate() {
                if !item.is_object() {
                    return Err(ConfigLoadError::Decode(format!(
                        "entry {i} is not an object"
                    )));
                }
                if matches_execution(&item, execution_id) {
                    kept.push(decode_entry(item)?);
                }
            }
            Ok(ConfigDocument::new(kept))
        }
        Value::Object(_) => {
            if matches_execution(&raw, execution_id) {
                Ok(ConfigDocument::new(vec![decode_entry(raw)?]))
            } else {
                Ok(ConfigDocument::default())
            }
        }
        _ => Err(ConfigLoadError::Decode(
            "unsupported top-level shape; expected a list of execution entries".to_string(),
        )),
    }
}

fn filter_table(bytes: &[u8], execution_id: &str) -> Result<ConfigTable, ConfigLoadError> {
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(b';')
        .from_reader(bytes);

    let columns: Vec<String> = rdr
        .headers()
        .map_err(|e| ConfigLoadError::Decode(format!("csv header: {e}")))?
        .iter()
        .map(|c| c.trim().to_string())
        .collect();

    let id_col = columns
        .iter()
        .position(|c| c == "execution_id")
        .ok_or_else(|| {
            ConfigLoadError::Schema("table is missing the 'execution_id' column".to_string())
        })?;

    let mut rows = Vec::new();
    for rec in rdr.records() {
        let rec = rec.map_err(|e| ConfigLoadError::Decode(format!("csv row: {e}")))?;
        let keep = rec
            .get(id_col)
            .map(|v| v.trim() == execution_id)
            .unwrap_or(false);
        if keep {
            rows.push(rec.iter().map(str::to_string).collect());
        }
    }

    Ok(ConfigTable { columns, rows })
}
