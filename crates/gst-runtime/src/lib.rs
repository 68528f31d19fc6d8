//! gst-runtime
//!
//! Startup sequencing for one execution run: load the scoped config, register
//! its securities, prepare custom feed readers, then route delivered lines.

mod session;

pub use session::{load_config_or_empty, Session};
