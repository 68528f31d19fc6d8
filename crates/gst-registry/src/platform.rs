//! Host platform seam.
//!
//! The registry never creates securities itself; it asks a [`Platform`] to
//! subscribe and keeps the handle it gets back.

use std::fmt;
use std::sync::Arc;

use gst_md::CustomDataType;
use gst_schemas::{Market, Resolution, Security, SecurityType};

/// Category-specific subscription call for standard instruments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SecurityCall {
    AddEquity,
    AddOption,
    AddIndex,
    AddIndexOption,
    AddFuture,
    AddForex,
    AddCrypto,
}

impl SecurityCall {
    /// Dispatch path for a resolved category. `None` means the category is in
    /// the vocabulary but has no registration path.
    pub fn for_category(category: SecurityType) -> Option<Self> {
        match category {
            SecurityType::Equity => Some(SecurityCall::AddEquity),
            SecurityType::Option => Some(SecurityCall::AddOption),
            SecurityType::Index => Some(SecurityCall::AddIndex),
            SecurityType::IndexOption => Some(SecurityCall::AddIndexOption),
            SecurityType::Future => Some(SecurityCall::AddFuture),
            SecurityType::Forex => Some(SecurityCall::AddForex),
            SecurityType::Crypto => Some(SecurityCall::AddCrypto),
            SecurityType::Base
            | SecurityType::Commodity
            | SecurityType::Cfd
            | SecurityType::FutureOption
            | SecurityType::CryptoFuture => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SecurityCall::AddEquity => "AddEquity",
            SecurityCall::AddOption => "AddOption",
            SecurityCall::AddIndex => "AddIndex",
            SecurityCall::AddIndexOption => "AddIndexOption",
            SecurityCall::AddFuture => "AddFuture",
            SecurityCall::AddForex => "AddForex",
            SecurityCall::AddCrypto => "AddCrypto",
        }
    }
}

impl fmt::Display for SecurityCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformError {
    pub message: String,
}

impl PlatformError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for PlatformError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PLATFORM_REJECTED: {}", self.message)
    }
}

impl std::error::Error for PlatformError {}

/// Registration API of the host platform.
pub trait Platform {
    /// Subscribe a standard instrument.
    fn add_security(
        &mut self,
        call: SecurityCall,
        ticker: &str,
        resolution: Resolution,
        market: Market,
    ) -> Result<Arc<Security>, PlatformError>;

    /// Subscribe a custom record feed.
    fn add_data(
        &mut self,
        record_type: &CustomDataType,
        ticker: &str,
        resolution: Resolution,
    ) -> Result<Arc<Security>, PlatformError>;
}
