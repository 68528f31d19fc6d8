//! Config document model.
//!
//! Two decoded shapes exist:
//! - [`ConfigDocument`]: execution entries → strategy groups → strategies →
//!   security requests (structured encodings).
//! - [`ConfigTable`]: flat `;`-delimited rows (table encoding).
//!
//! Fields this crate does not interpret are kept in `extra` maps so the
//! snapshot can be logged and hashed without loss.

use std::sync::Arc;

use gst_schemas::{
    Market, ResourceKey, ResourceRegistration, Resolution, Subscription, Symbol,
    DEFAULT_MARKET_TOKEN,
};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

// ---------------------------------------------------------------------------
// Structured document
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfigDocument {
    pub entries: Vec<ExecutionEntry>,
}

impl ConfigDocument {
    pub fn new(entries: Vec<ExecutionEntry>) -> Self {
        Self { entries }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Every security request, in document order.
    pub fn security_requests(&self) -> impl Iterator<Item = &SecurityRequest> {
        self.entries
            .iter()
            .flat_map(|e| e.strategy_groups.iter())
            .flat_map(|g| g.strategies.iter())
            .flat_map(|s| s.security.iter())
    }

    pub fn security_requests_mut(&mut self) -> impl Iterator<Item = &mut SecurityRequest> {
        self.entries
            .iter_mut()
            .flat_map(|e| e.strategy_groups.iter_mut())
            .flat_map(|g| g.strategies.iter_mut())
            .flat_map(|s| s.security.iter_mut())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExecutionEntry {
    #[serde(default)]
    pub execution_id: Value,
    #[serde(default)]
    pub strategy_groups: Vec<StrategyGroup>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ExecutionEntry {
    pub fn execution_id(&self) -> Option<String> {
        stringify_id(&self.execution_id)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StrategyGroup {
    #[serde(default)]
    pub strategies: Vec<Strategy>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Strategy {
    #[serde(default)]
    pub security: Vec<SecurityRequest>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One declared instrument or custom feed.
///
/// The four token fields stay exactly as written; the registry binds the
/// resolved [`ResourceRegistration`] onto `registration` in place.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SecurityRequest {
    #[serde(deserialize_with = "token_string")]
    pub ticker: String,
    #[serde(deserialize_with = "token_string")]
    pub security_type: String,
    #[serde(deserialize_with = "token_string")]
    pub resolution: String,
    #[serde(
        default,
        deserialize_with = "opt_token_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub market: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
    #[serde(skip)]
    pub registration: Option<Arc<ResourceRegistration>>,
}

impl SecurityRequest {
    pub fn new(
        ticker: impl Into<String>,
        security_type: impl Into<String>,
        resolution: impl Into<String>,
        market: Option<&str>,
    ) -> Self {
        Self {
            ticker: ticker.into(),
            security_type: security_type.into(),
            resolution: resolution.into(),
            market: market.map(str::to_string),
            ..Self::default()
        }
    }

    /// Identity key; the market token falls back to `USA`.
    pub fn resource_key(&self) -> ResourceKey {
        ResourceKey::new(
            self.ticker.as_str(),
            self.security_type.as_str(),
            self.resolution.as_str(),
            self.market.as_deref().unwrap_or(DEFAULT_MARKET_TOKEN),
        )
    }

    pub fn bind(&mut self, registration: Arc<ResourceRegistration>) {
        self.registration = Some(registration);
    }

    pub fn subscription(&self) -> Option<&Subscription> {
        self.registration.as_deref().map(|r| &r.subscription)
    }

    pub fn resolved_resolution(&self) -> Option<Resolution> {
        self.registration.as_deref().map(|r| r.resolution())
    }

    pub fn resolved_market(&self) -> Option<Market> {
        self.registration.as_deref().map(|r| r.market())
    }

    pub fn symbol(&self) -> Option<&Symbol> {
        self.registration.as_deref().map(|r| &r.symbol)
    }
}

// ---------------------------------------------------------------------------
// Table document
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigTable {
    /// Column names, whitespace-stripped, in file order.
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl ConfigTable {
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn get(&self, row: usize, column: &str) -> Option<&str> {
        let i = self.column_index(column)?;
        self.rows.get(row)?.get(i).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows as a JSON list of `{column: value}` objects.
    pub fn to_json(&self) -> Value {
        let rows = self
            .rows
            .iter()
            .map(|row| {
                let obj: Map<String, Value> = self
                    .columns
                    .iter()
                    .zip(row.iter())
                    .map(|(c, v)| (c.clone(), Value::String(v.clone())))
                    .collect();
                Value::Object(obj)
            })
            .collect();
        Value::Array(rows)
    }
}

// ---------------------------------------------------------------------------
// Loaded snapshot
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub enum ConfigData {
    Document(ConfigDocument),
    Table(ConfigTable),
}

impl ConfigData {
    pub fn is_empty(&self) -> bool {
        match self {
            ConfigData::Document(d) => d.is_empty(),
            ConfigData::Table(t) => t.is_empty(),
        }
    }

    pub fn document(&self) -> Option<&ConfigDocument> {
        match self {
            ConfigData::Document(d) => Some(d),
            ConfigData::Table(_) => None,
        }
    }

    pub fn document_mut(&mut self) -> Option<&mut ConfigDocument> {
        match self {
            ConfigData::Document(d) => Some(d),
            ConfigData::Table(_) => None,
        }
    }

    pub fn table(&self) -> Option<&ConfigTable> {
        match self {
            ConfigData::Table(t) => Some(t),
            ConfigData::Document(_) => None,
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            ConfigData::Document(d) => serde_json::to_value(d).unwrap_or(Value::Null),
            ConfigData::Table(t) => t.to_json(),
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// String form of an execution identifier value: `"1"` and `1` both become
/// `"1"`. `null` (or a missing field) has no string form.
pub fn stringify_id(v: &Value) -> Option<String> {
    match v {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        other => Some(other.to_string()),
    }
}

/// Accept a string or a scalar and keep its string form.
pub(crate) fn token_string<'de, D>(de: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Value::deserialize(de)?;
    match v {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected a string token, got {other}"
        ))),
    }
}

fn opt_token_string<'de, D>(de: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Option::<Value>::deserialize(de)?;
    match v {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(serde::de::Error::custom(format!(
            "expected a string token, got {other}"
        ))),
    }
}
