//! Run settings: which project/execution this process serves and how it logs.
//!
//! Settings come from one or more YAML layers merged in order (earlier layers
//! are the base, later layers override). The merged tree is hashed so a run can
//! record exactly which settings it started with.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::document::token_string;
use crate::hash::{canonical_string, sha256_hex};
use crate::loader::ProjectIdentity;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSettings {
    pub algorithm: String,
    #[serde(deserialize_with = "token_string")]
    pub project_id: String,
    #[serde(default = "default_execution_id", deserialize_with = "token_string")]
    pub execution_id: String,
    #[serde(default = "default_encoding")]
    pub config_encoding: String,
    /// Root of the directory-backed object store.
    #[serde(default)]
    pub store_root: Option<PathBuf>,
    #[serde(default)]
    pub logging: LoggingSettings,
}

impl RunSettings {
    pub fn project(&self) -> ProjectIdentity {
        ProjectIdentity::new(self.algorithm.as_str(), self.project_id.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_level")]
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            level: default_level(),
        }
    }
}

impl LoggingSettings {
    /// `tracing` filter directive for the configured level. Unknown names fall
    /// back to `info`.
    pub fn filter_directive(&self) -> &'static str {
        match self.level.trim().to_ascii_uppercase().as_str() {
            "CRITICAL" | "ERROR" => "error",
            "WARNING" | "WARN" => "warn",
            "INFO" => "info",
            "DEBUG" => "debug",
            "TRACE" | "NOTSET" => "trace",
            _ => "info",
        }
    }
}

fn default_execution_id() -> String {
    "1".to_string()
}

fn default_encoding() -> String {
    "json".to_string()
}

fn default_true() -> bool {
    true
}

fn default_level() -> String {
    "INFO".to_string()
}

#[derive(Debug, Clone)]
pub struct LoadedSettings {
    pub settings: RunSettings,
    pub settings_hash: String,
    pub canonical_json: String,
}

pub fn load_layered_settings(paths: &[&str]) -> Result<LoadedSettings> {
    let mut docs: Vec<String> = Vec::new();
    for p in paths {
        let raw =
            fs::read_to_string(p).with_context(|| format!("failed to read settings path: {p}"))?;
        docs.push(raw);
    }
    let doc_refs: Vec<&str> = docs.iter().map(|s| s.as_str()).collect();
    load_layered_settings_from_strings(&doc_refs)
}

pub fn load_layered_settings_from_strings(yaml_docs: &[&str]) -> Result<LoadedSettings> {
    let mut merged = serde_json::json!({});
    for raw in yaml_docs {
        let v_yaml: serde_yaml::Value = serde_yaml::from_str(raw).context("invalid yaml")?;
        let v_json = serde_json::to_value(v_yaml).context("yaml->json conversion failed")?;
        merged = deep_merge(merged, v_json);
    }

    let canonical_json = canonical_string(&merged);
    let settings_hash = sha256_hex(canonical_json.as_bytes());

    let settings: RunSettings =
        serde_json::from_value(merged).context("SETTINGS_INVALID: merged settings do not match schema")?;

    Ok(LoadedSettings {
        settings,
        settings_hash,
        canonical_json,
    })
}

fn deep_merge(a: Value, b: Value) -> Value {
    match (a, b) {
        (Value::Object(mut a_map), Value::Object(b_map)) => {
            for (k, b_val) in b_map {
                let a_val = a_map.remove(&k).unwrap_or(Value::Null);
                a_map.insert(k, deep_merge(a_val, b_val));
            }
            Value::Object(a_map)
        }
        (_, b_other) => b_other,
    }
}
