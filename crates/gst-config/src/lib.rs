//! gst-config
//!
//! Static configuration for one execution run:
//! - `store`: key-addressed object storage (in-memory and directory-backed)
//! - `document`: the decoded config document (structured or table form)
//! - `loader`: the scoped loader that filters a persisted document down to one
//!   execution id
//! - `settings`: layered YAML run settings with a provenance hash

pub mod document;
pub mod hash;
pub mod loader;
pub mod settings;
pub mod store;

pub use document::{
    stringify_id, ConfigData, ConfigDocument, ConfigTable, ExecutionEntry, SecurityRequest,
    Strategy, StrategyGroup,
};
pub use loader::{
    snapshot_hash, ConfigEncoding, ConfigLoadError, ProjectIdentity, StaticConfigLoader,
};
pub use settings::{
    load_layered_settings, load_layered_settings_from_strings, LoadedSettings, LoggingSettings,
    RunSettings,
};
pub use store::{DirObjectStore, MemoryObjectStore, ObjectStore, StoreError};
