use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use gst_config::{
    snapshot_hash, ConfigData, ConfigDocument, ObjectStore, RunSettings, StaticConfigLoader,
};
use gst_md::{
    read_all, CustomDataCatalog, CustomDataRecord, RecordReader, SourceFetcher, SourceLocation,
};
use gst_registry::{Platform, ResourceRegistry};
use gst_schemas::ResourceRegistration;
use tracing::{info, warn};

/// Load the scoped config for `execution_id`.
///
/// A missing storage key is downgraded to a warning and an empty document. A
/// document that exists but keeps nothing for this execution is an error.
pub fn load_config_or_empty(
    loader: &mut StaticConfigLoader,
    execution_id: &str,
) -> Result<ConfigData> {
    match loader.load(execution_id) {
        Ok(()) => {}
        Err(e) if e.is_source_not_found() => {
            warn!(error = %e, "config source not found; continuing with an empty document");
            return Ok(ConfigData::Document(ConfigDocument::default()));
        }
        Err(e) => return Err(e).context("config load failed"),
    }

    let data = loader.data().context("config load failed")?.clone();
    if data.is_empty() {
        bail!(
            "CONFIG_EMPTY_FOR_EXECUTION: no configuration entries for execution_id={execution_id} at {}",
            loader.key()
        );
    }
    Ok(data)
}

/// Custom feed bound to one registration.
#[derive(Debug, Clone)]
struct Feed {
    registration: Arc<ResourceRegistration>,
    type_id: String,
    source: SourceLocation,
}

/// One execution run: scoped config, registrations and live feed readers.
///
/// Built by [`Session::initialize`]; afterwards lines delivered by the host
/// are routed through [`Session::on_line`].
pub struct Session<P: Platform> {
    execution_id: String,
    platform: P,
    registry: ResourceRegistry,
    config: ConfigData,
    config_hash: String,
    fetcher: SourceFetcher,
    // registration composite id -> feed
    feeds: BTreeMap<String, Feed>,
    // record type id -> live reader
    readers: BTreeMap<String, RecordReader>,
}

impl<P: Platform> Session<P> {
    pub fn initialize(
        settings: &RunSettings,
        store: Arc<dyn ObjectStore>,
        mut platform: P,
        catalog: Arc<CustomDataCatalog>,
    ) -> Result<Self> {
        let execution_id = settings.execution_id.clone();
        let mut loader =
            StaticConfigLoader::new(store, &settings.project(), &settings.config_encoding);
        let mut config = load_config_or_empty(&mut loader, &execution_id)?;
        let config_hash = snapshot_hash(&config);

        let mut registry = ResourceRegistry::new(Arc::clone(&catalog));
        match config.document_mut() {
            Some(document) => {
                registry
                    .register_all(document, &mut platform)
                    .context("security registration failed")?;
            }
            None => warn!(
                encoding = %settings.config_encoding,
                "table config carries no security declarations; nothing registered"
            ),
        }

        let mut feeds = BTreeMap::new();
        let mut readers = BTreeMap::new();
        for registration in registry.custom_registrations() {
            let type_id = registration
                .subscription
                .custom_type_id()
                .ok_or_else(|| anyhow!("registration {} is not a custom feed", registration.id()))?
                .to_string();
            let record_type = catalog
                .get(&type_id)
                .ok_or_else(|| anyhow!("custom record type '{type_id}' left the catalog"))?;

            let source = record_type
                .source()
                .with_context(|| format!("source resolution failed for {type_id}"))?;
            let resolution = record_type.require_resolution()?;
            record_type.check_date_format(resolution)?;

            info!(id = %registration.id(), %type_id, %source, "custom feed ready");
            feeds.insert(
                registration.id(),
                Feed {
                    registration: Arc::clone(registration),
                    type_id: type_id.clone(),
                    source,
                },
            );
            readers
                .entry(type_id)
                .or_insert_with(|| RecordReader::new(record_type));
        }

        info!(
            execution_id = %execution_id,
            registrations = registry.len(),
            feeds = feeds.len(),
            config_hash = %config_hash,
            "session initialized"
        );

        Ok(Self {
            execution_id,
            platform,
            registry,
            config,
            config_hash,
            fetcher: SourceFetcher::new(),
            feeds,
            readers,
        })
    }

    /// Replace the HTTP/disk fetcher used by [`Session::replay`].
    pub fn with_fetcher(mut self, fetcher: SourceFetcher) -> Self {
        self.fetcher = fetcher;
        self
    }

    pub fn execution_id(&self) -> &str {
        &self.execution_id
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    pub fn registry(&self) -> &ResourceRegistry {
        &self.registry
    }

    pub fn config(&self) -> &ConfigData {
        &self.config
    }

    pub fn config_hash(&self) -> &str {
        &self.config_hash
    }

    pub fn feed_ids(&self) -> impl Iterator<Item = &str> {
        self.feeds.keys().map(String::as_str)
    }

    pub fn feed_source(&self, registration_id: &str) -> Option<&SourceLocation> {
        self.feeds.get(registration_id).map(|f| &f.source)
    }

    pub fn reader(&self, type_id: &str) -> Option<&RecordReader> {
        self.readers.get(type_id)
    }

    /// Route one delivered line to its feed's reader.
    pub fn on_line(
        &mut self,
        registration_id: &str,
        line: &str,
    ) -> Result<Option<CustomDataRecord>> {
        let feed = self
            .feeds
            .get(registration_id)
            .ok_or_else(|| anyhow!("RUNTIME_UNKNOWN_FEED: {registration_id}"))?;
        let reader = self
            .readers
            .get_mut(&feed.type_id)
            .ok_or_else(|| anyhow!("RUNTIME_UNKNOWN_FEED: no reader for {}", feed.type_id))?;
        Ok(reader.read_line(line, &feed.registration.symbol)?)
    }

    /// Fetch a feed's whole source and parse it with a fresh reader. The live
    /// reader is left untouched.
    pub fn replay(&self, registration_id: &str) -> Result<Vec<CustomDataRecord>> {
        let feed = self
            .feeds
            .get(registration_id)
            .ok_or_else(|| anyhow!("RUNTIME_UNKNOWN_FEED: {registration_id}"))?;
        let record_type = self
            .registry
            .catalog()
            .get(&feed.type_id)
            .ok_or_else(|| anyhow!("custom record type '{}' left the catalog", feed.type_id))?;

        let text = self.fetcher.fetch(&feed.source)?;
        let mut reader = RecordReader::new(record_type);
        let records = read_all(&mut reader, &text, &feed.registration.symbol)?;
        info!(id = registration_id, records = records.len(), "replay complete");
        Ok(records)
    }
}
