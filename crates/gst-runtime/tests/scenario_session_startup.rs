//! scenario_session_startup
//!
//! Validates session startup against the paper platform and an in-memory
//! object store:
//! 1) Config load + registration + feed readers, one platform call per key.
//! 2) Delivered lines flow header-then-data through the feed reader.
//! 3) A missing config key degrades to an empty session with a warning.
//! 4) A present config with nothing for this execution is an error.
//! 5) Registration and source errors abort startup.
//! 6) Replay fetches the whole source without disturbing the live reader.

use std::sync::Arc;

use gst_config::{LoggingSettings, MemoryObjectStore, ObjectStore, RunSettings};
use gst_md::{CustomDataCatalog, CustomDataType, FieldValue, ReaderPhase, RecordError};
use gst_paper::{PaperPlatform, PlatformCall};
use gst_runtime::Session;
use gst_schemas::Resolution;
use httpmock::prelude::*;
use serde_json::json;

const CONFIG_KEY: &str = "Project_General_Strategy_4242/config_data/config_data.json";
const GARCH_ID: &str = "garch_data_customdata_daily_usa";

fn settings(execution_id: &str) -> RunSettings {
    RunSettings {
        algorithm: "General_Strategy".into(),
        project_id: "4242".into(),
        execution_id: execution_id.into(),
        config_encoding: "json".into(),
        store_root: None,
        logging: LoggingSettings::default(),
    }
}

fn config(securities: serde_json::Value) -> Vec<u8> {
    serde_json::to_vec(&json!([
        {
            "execution_id": "1",
            "strategy_groups": [{"strategies": [{"security": securities}]}]
        },
        {
            "execution_id": "2",
            "strategy_groups": [{"strategies": [{"security": [
                {"ticker": "QQQ", "security_type": "Equity", "resolution": "Minute"}
            ]}]}]
        }
    ]))
    .unwrap()
}

fn store(bytes: Vec<u8>) -> Arc<dyn ObjectStore> {
    Arc::new(MemoryObjectStore::new().with_object(CONFIG_KEY, bytes))
}

fn default_securities() -> serde_json::Value {
    json!([
        {"ticker": "SPX", "security_type": "IndexOption", "resolution": "Minute", "market": "USA"},
        {"ticker": "SPX", "security_type": "IndexOption", "resolution": "Minute", "market": "USA"},
        {"ticker": "Garch_data", "security_type": "CustomData", "resolution": "Daily"}
    ])
}

fn start(
    execution_id: &str,
    store: Arc<dyn ObjectStore>,
    catalog: CustomDataCatalog,
) -> anyhow::Result<Session<PaperPlatform>> {
    Session::initialize(
        &settings(execution_id),
        store,
        PaperPlatform::new(),
        Arc::new(catalog),
    )
}

#[test]
fn startup_registers_each_key_once_and_prepares_feeds() {
    let session = start(
        "1",
        store(config(default_securities())),
        CustomDataCatalog::with_builtin(),
    )
    .unwrap();

    assert_eq!(session.execution_id(), "1");
    assert_eq!(session.platform().call_count(), 2);
    assert!(matches!(
        &session.platform().calls()[1],
        PlatformCall::Data { type_id, .. } if type_id == "Garch_data"
    ));
    assert_eq!(session.registry().len(), 2);
    assert_eq!(session.feed_ids().collect::<Vec<_>>(), vec![GARCH_ID]);
    assert_eq!(
        session.reader("Garch_data").unwrap().phase(),
        ReaderPhase::Uninitialized
    );

    // Only execution "1" survived the filter.
    let doc = session.config().document().unwrap();
    assert_eq!(doc.len(), 1);
    assert!(doc.security_requests().all(|r| r.registration.is_some()));
    assert_eq!(session.config_hash().len(), 64);
}

#[test]
fn delivered_lines_become_records() {
    let mut session = start(
        "1",
        store(config(default_securities())),
        CustomDataCatalog::with_builtin(),
    )
    .unwrap();

    assert!(session.on_line(GARCH_ID, "Row;mu_h1;sigma_h1").unwrap().is_none());
    let rec = session
        .on_line(GARCH_ID, "2024-01-01;0.02;1.1")
        .unwrap()
        .unwrap();
    assert_eq!(rec.time.to_string(), "2024-01-01 16:15:00");
    assert_eq!(rec.get("mu_h1"), Some(&FieldValue::Float(0.02)));
    assert_eq!(rec.symbol.value(), "Garch_data");
    assert_eq!(
        session.reader("Garch_data").unwrap().phase(),
        ReaderPhase::Streaming
    );

    let err = session.on_line(GARCH_ID, "2024-01-02;oops;1").unwrap_err();
    assert!(matches!(
        err.downcast_ref::<RecordError>(),
        Some(RecordError::Parse { .. })
    ));

    let err = session.on_line("nope", "x").unwrap_err();
    assert!(err.to_string().starts_with("RUNTIME_UNKNOWN_FEED"));
}

#[test]
fn missing_config_key_degrades_to_empty_session() {
    let session = start(
        "1",
        Arc::new(MemoryObjectStore::new()),
        CustomDataCatalog::with_builtin(),
    )
    .unwrap();
    assert!(session.config().is_empty());
    assert!(session.registry().is_empty());
    assert_eq!(session.platform().call_count(), 0);
}

#[test]
fn present_config_without_matching_execution_is_an_error() {
    let err = start(
        "9",
        store(config(default_securities())),
        CustomDataCatalog::with_builtin(),
    )
    .err()
    .unwrap();
    assert!(
        err.to_string().starts_with("CONFIG_EMPTY_FOR_EXECUTION"),
        "got {err}"
    );
}

#[test]
fn registration_error_aborts_startup() {
    let err = start(
        "1",
        store(config(json!([
            {"ticker": "SPX", "security_type": "IndexOption", "resolution": "Minute", "market": "Atlantis"}
        ]))),
        CustomDataCatalog::with_builtin(),
    )
    .err()
    .unwrap();
    assert!(format!("{err:#}").contains("REGISTRY_UNKNOWN_MARKET"), "got {err:#}");
}

#[test]
fn custom_type_without_source_aborts_startup() {
    let mut catalog = CustomDataCatalog::with_builtin();
    catalog.register(
        CustomDataType::new("NoSource", "Date", "%Y-%m-%d").with_resolution(Resolution::Daily),
    );
    let err = start(
        "1",
        store(config(json!([
            {"ticker": "NoSource", "security_type": "CustomData", "resolution": "Daily"}
        ]))),
        catalog,
    )
    .err()
    .unwrap();
    assert!(format!("{err:#}").contains("RECORD_CONFIGURATION"), "got {err:#}");
}

#[test]
fn sub_daily_type_with_date_only_format_aborts_startup() {
    let mut catalog = CustomDataCatalog::new();
    catalog.register(
        CustomDataType::new("Hourly", "Date", "%Y-%m-%d")
            .with_path("/unused.csv")
            .with_resolution(Resolution::Hour),
    );
    let err = start(
        "1",
        store(config(json!([
            {"ticker": "Hourly", "security_type": "CustomData", "resolution": "Hour"}
        ]))),
        catalog,
    )
    .err()
    .unwrap();
    assert!(matches!(
        err.downcast_ref::<RecordError>(),
        Some(RecordError::FormatMismatch { .. })
    ));
}

#[test]
fn replay_reads_whole_source_with_fresh_reader() {
    let server = MockServer::start();
    let m = server.mock(|when, then| {
        when.method(GET).path("/vol.csv");
        then.status(200)
            .body("Row;vol\n2024-01-01;0.1\n2024-01-02;0.2\n2024-01-03;0.3\n");
    });

    let mut catalog = CustomDataCatalog::new();
    catalog.register(
        CustomDataType::new("Vol", "Row", "%Y-%m-%d")
            .with_url(server.url("/vol.csv"))
            .with_delimiter(';')
            .with_resolution(Resolution::Daily)
            .with_default_converter(gst_md::Converter::Float),
    );
    let session = start(
        "1",
        store(config(json!([
            {"ticker": "Vol", "security_type": "CustomData", "resolution": "Daily"}
        ]))),
        catalog,
    )
    .unwrap();

    let records = session.replay("vol_customdata_daily_usa").unwrap();
    m.assert();
    assert_eq!(records.len(), 3);
    assert_eq!(records[2].get("vol").and_then(FieldValue::as_f64), Some(0.3));
    assert_eq!(
        session.reader("Vol").unwrap().phase(),
        ReaderPhase::Uninitialized
    );
}
