//! gst-registry
//!
//! Turns declared security requests into platform registrations, once per
//! distinct resource key, and binds the result back onto every declaration.

mod error;
mod platform;
mod registry;

pub use error::RegistryError;
pub use platform::{Platform, PlatformError, SecurityCall};
pub use registry::ResourceRegistry;
