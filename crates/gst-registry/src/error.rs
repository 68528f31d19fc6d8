use std::fmt;

use gst_schemas::ResourceKey;

/// Registration failures. Any of these aborts the whole registration pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    UnknownCustomType { key: ResourceKey },
    UnknownSecurityType { key: ResourceKey },
    UnknownResolution { key: ResourceKey },
    UnknownMarket { key: ResourceKey },
    /// Category is valid but has no registration call.
    UnmappedSecurityType { key: ResourceKey },
    Platform { key: ResourceKey, message: String },
}

impl RegistryError {
    pub fn key(&self) -> &ResourceKey {
        match self {
            RegistryError::UnknownCustomType { key }
            | RegistryError::UnknownSecurityType { key }
            | RegistryError::UnknownResolution { key }
            | RegistryError::UnknownMarket { key }
            | RegistryError::UnmappedSecurityType { key }
            | RegistryError::Platform { key, .. } => key,
        }
    }
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryError::UnknownCustomType { key } => write!(
                f,
                "REGISTRY_UNKNOWN_CUSTOM_TYPE: no custom record type named '{}' {key}",
                key.ticker
            ),
            RegistryError::UnknownSecurityType { key } => write!(
                f,
                "REGISTRY_UNKNOWN_SECURITY_TYPE: invalid security type '{}' {key}",
                key.security_type
            ),
            RegistryError::UnknownResolution { key } => write!(
                f,
                "REGISTRY_UNKNOWN_RESOLUTION: invalid resolution '{}' {key}",
                key.resolution
            ),
            RegistryError::UnknownMarket { key } => write!(
                f,
                "REGISTRY_UNKNOWN_MARKET: invalid market '{}' {key}",
                key.market
            ),
            RegistryError::UnmappedSecurityType { key } => write!(
                f,
                "REGISTRY_UNMAPPED_SECURITY_TYPE: no registration path for '{}' {key}",
                key.security_type
            ),
            RegistryError::Platform { key, message } => {
                write!(f, "REGISTRY_PLATFORM: {key}: {message}")
            }
        }
    }
}

impl std::error::Error for RegistryError {}
