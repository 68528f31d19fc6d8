//! scenario_scoped_load
//!
//! Validates the scoped static config loader end to end against an in-memory
//! object store:
//! 1) `data()` before `load()` is a usage error.
//! 2) `load("1")` keeps only the entries of execution "1".
//! 3) An absent storage key surfaces as SourceNotFound.
//! 4) Table encoding without `execution_id` is a schema error.
//! 5) Unsupported encodings fail at load time.

use std::sync::Arc;

use gst_config::{
    ConfigLoadError, MemoryObjectStore, ObjectStore, ProjectIdentity, StaticConfigLoader,
};
use serde_json::json;

fn project() -> ProjectIdentity {
    ProjectIdentity::new("General_Strategy", "4242")
}

fn two_executions() -> String {
    json!([
        {
            "execution_id": "1",
            "strategy_groups": [{
                "strategies": [{
                    "security": [
                        {"ticker": "Garch_data", "security_type": "CustomData", "resolution": "Daily", "market": "USA"}
                    ]
                }]
            }]
        },
        {
            "execution_id": "2",
            "strategy_groups": [{
                "strategies": [{
                    "security": [
                        {"ticker": "QQQ", "security_type": "Equity", "resolution": "Minute"}
                    ]
                }]
            }]
        }
    ])
    .to_string()
}

fn store_with(file_type: &str, body: &str) -> Arc<dyn ObjectStore> {
    let p = project();
    Arc::new(MemoryObjectStore::new().with_object(p.config_key(file_type), body.as_bytes().to_vec()))
}

#[test]
fn data_before_load_is_usage_error() {
    let loader = StaticConfigLoader::new(store_with("json", &two_executions()), &project(), "json");
    assert_eq!(loader.data().unwrap_err(), ConfigLoadError::NotLoaded);
}

#[test]
fn load_keeps_only_requested_execution() {
    let mut loader =
        StaticConfigLoader::new(store_with("json", &two_executions()), &project(), "json");
    loader.load("1").expect("load must succeed");

    let doc = loader
        .data()
        .unwrap()
        .document()
        .expect("json decodes to a structured document");
    assert_eq!(doc.len(), 1);
    assert_eq!(doc.entries[0].execution_id().as_deref(), Some("1"));

    let tickers: Vec<&str> = doc.security_requests().map(|s| s.ticker.as_str()).collect();
    assert_eq!(tickers, vec!["Garch_data"]);
}

#[test]
fn non_matching_execution_yields_empty_document() {
    let mut loader =
        StaticConfigLoader::new(store_with("json", &two_executions()), &project(), "json");
    loader.load("99").expect("non-matching id is not an error");
    assert!(loader.data().unwrap().is_empty());
}

#[test]
fn absent_key_is_source_not_found() {
    let store: Arc<dyn ObjectStore> = Arc::new(MemoryObjectStore::new());
    let mut loader = StaticConfigLoader::new(store, &project(), "json");

    let err = loader.load("1").unwrap_err();
    assert_eq!(
        err,
        ConfigLoadError::SourceNotFound {
            key: "Project_General_Strategy_4242/config_data/config_data.json".to_string()
        }
    );
    // Still unusable after a failed load.
    assert_eq!(loader.data().unwrap_err(), ConfigLoadError::NotLoaded);
}

#[test]
fn table_without_execution_id_is_schema_error() {
    let mut loader = StaticConfigLoader::new(
        store_with("csv", "run;ticker\n1;SPX\n"),
        &project(),
        "csv",
    );
    assert!(matches!(loader.load("1"), Err(ConfigLoadError::Schema(_))));
}

#[test]
fn table_keeps_matching_rows() {
    let body = "execution_id;ticker;weight\n1;SPX;0.5\n2;QQQ;0.2\n1;IWM;0.3\n";
    let mut loader = StaticConfigLoader::new(store_with("csv", body), &project(), "csv");
    loader.load("1").unwrap();

    let table = loader.data().unwrap().table().expect("csv decodes to a table");
    assert_eq!(table.len(), 2);
    assert_eq!(table.get(0, "ticker"), Some("SPX"));
    assert_eq!(table.get(1, "weight"), Some("0.3"));
}

#[test]
fn unsupported_encoding_fails_at_load() {
    let mut loader = StaticConfigLoader::new(store_with("xml", "<x/>"), &project(), "xml");
    assert_eq!(
        loader.load("1").unwrap_err(),
        ConfigLoadError::UnsupportedEncoding("xml".to_string())
    );
}
