use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use gst_config::{
    load_layered_settings, snapshot_hash, DirObjectStore, LoggingSettings, ObjectStore,
    RunSettings, StaticConfigLoader,
};
use gst_md::CustomDataCatalog;
use gst_paper::PaperPlatform;
use gst_runtime::{load_config_or_empty, Session};
use tracing::info;

use crate::RunArgs;

pub fn config_hash(paths: &[String]) -> Result<()> {
    let path_refs: Vec<&str> = paths.iter().map(|s| s.as_str()).collect();
    let loaded = load_layered_settings(&path_refs)?;
    println!("settings_hash={}", loaded.settings_hash);
    println!("{}", loaded.canonical_json);
    Ok(())
}

pub fn show_config(run: &RunArgs) -> Result<()> {
    let (settings, store) = prepare(run)?;
    let mut loader =
        StaticConfigLoader::new(store, &settings.project(), &settings.config_encoding);
    let data = load_config_or_empty(&mut loader, &settings.execution_id)?;

    println!("key={}", loader.key());
    println!("execution_id={}", settings.execution_id);
    println!("config_hash={}", snapshot_hash(&data));
    println!("{}", serde_json::to_string_pretty(&data.to_json())?);
    Ok(())
}

pub fn register(run: &RunArgs) -> Result<()> {
    let session = start_session(run)?;

    println!("execution_id={}", session.execution_id());
    println!("config_hash={}", session.config_hash());
    println!("registrations={}", session.registry().len());
    for r in session.registry().iter() {
        println!(
            "registration id={} category={} resolution={} market={} symbol={}",
            r.id(),
            r.subscription.category_label(),
            r.resolution(),
            r.market(),
            r.symbol
        );
    }
    println!("platform_calls={}", session.platform().call_count());
    for call in session.platform().calls() {
        println!("call {call}");
    }
    Ok(())
}

pub fn replay(run: &RunArgs, feed: &str, limit: Option<usize>) -> Result<()> {
    let session = start_session(run)?;
    let records = session.replay(feed)?;
    let take = limit.unwrap_or(records.len());

    for rec in records.iter().take(take) {
        println!("{}", serde_json::to_string(rec)?);
    }
    info!(feed, printed = take.min(records.len()), total = records.len(), "replay printed");
    Ok(())
}

fn start_session(run: &RunArgs) -> Result<Session<PaperPlatform>> {
    let (settings, store) = prepare(run)?;
    Session::initialize(
        &settings,
        store,
        PaperPlatform::new(),
        Arc::new(CustomDataCatalog::with_builtin()),
    )
}

/// Load settings, apply flag overrides, start logging and open the store.
fn prepare(run: &RunArgs) -> Result<(RunSettings, Arc<dyn ObjectStore>)> {
    let path_refs: Vec<&str> = run.settings_paths.iter().map(|s| s.as_str()).collect();
    let loaded = load_layered_settings(&path_refs)?;
    let mut settings = loaded.settings;

    if let Some(id) = &run.execution_id {
        settings.execution_id = id.clone();
    }
    if let Some(root) = &run.store_root {
        settings.store_root = Some(PathBuf::from(root));
    }

    init_tracing(&settings.logging);
    info!(settings_hash = %loaded.settings_hash, "settings loaded");

    let root = settings
        .store_root
        .clone()
        .context("store_root not set (settings or --store-root)")?;
    let store: Arc<dyn ObjectStore> = Arc::new(DirObjectStore::new(root));
    Ok((settings, store))
}

/// `RUST_LOG` wins over the settings level. Logs go to stderr so stdout stays
/// machine-readable.
fn init_tracing(logging: &LoggingSettings) {
    if !logging.enabled {
        return;
    }
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| logging.filter_directive().into()),
        )
        .try_init();
}
