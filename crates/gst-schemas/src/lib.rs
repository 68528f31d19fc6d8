//! gst-schemas
//!
//! Shared vocabulary for the data-entry workspace: token enums, the opaque
//! handles issued by the host platform, and the registration record that the
//! registry hands back to every matching security declaration.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

pub mod vocab;

pub use vocab::{Market, Resolution, SecurityType};

/// Category token that routes a declaration to the custom record type catalog
/// instead of the standard security type vocabulary.
pub const CUSTOM_DATA_TOKEN: &str = "CustomData";

/// Market token assumed when a declaration does not name one.
pub const DEFAULT_MARKET_TOKEN: &str = "USA";

// ---------------------------------------------------------------------------
// Platform handles
// ---------------------------------------------------------------------------

/// Opaque symbol handle issued by the host platform.
///
/// Two handles are equal only when the platform issued them for the same
/// subscription (`sid` is unique per issuing platform).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Symbol {
    value: String,
    sid: u64,
}

impl Symbol {
    pub fn new(value: impl Into<String>, sid: u64) -> Self {
        Self {
            value: value.into(),
            sid,
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn sid(&self) -> u64 {
        self.sid
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.value, self.sid)
    }
}

/// Resource object returned by the platform for a subscription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Security {
    pub symbol: Symbol,
    pub resolution: Resolution,
    pub market: Market,
}

// ---------------------------------------------------------------------------
// Resource identity
// ---------------------------------------------------------------------------

/// Deduplication identity of a declared instrument or custom feed.
///
/// Holds the four tokens exactly as written in the config document. Equality
/// is plain string equality on all four; resolution to enums happens later.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ResourceKey {
    pub ticker: String,
    pub security_type: String,
    pub resolution: String,
    pub market: String,
}

impl ResourceKey {
    pub fn new(
        ticker: impl Into<String>,
        security_type: impl Into<String>,
        resolution: impl Into<String>,
        market: impl Into<String>,
    ) -> Self {
        Self {
            ticker: ticker.into(),
            security_type: security_type.into(),
            resolution: resolution.into(),
            market: market.into(),
        }
    }

    /// Lower-cased `_` join of the four raw tokens, e.g.
    /// `garch_data_customdata_daily_usa`.
    pub fn composite_id(&self) -> String {
        [
            self.ticker.as_str(),
            self.security_type.as_str(),
            self.resolution.as_str(),
            self.market.as_str(),
        ]
        .iter()
        .map(|part| part.to_lowercase())
        .collect::<Vec<_>>()
        .join("_")
    }

    pub fn is_custom_data(&self) -> bool {
        self.security_type == CUSTOM_DATA_TOKEN
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}, {}, {}, {}]",
            self.ticker, self.security_type, self.resolution, self.market
        )
    }
}

// ---------------------------------------------------------------------------
// Registration
// ---------------------------------------------------------------------------

/// Resolved subscription: either a standard instrument or a custom record feed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Subscription {
    Standard {
        category: SecurityType,
        resolution: Resolution,
        market: Market,
    },
    CustomRecord {
        type_id: String,
        resolution: Resolution,
        market: Market,
    },
}

impl Subscription {
    pub fn resolution(&self) -> Resolution {
        match self {
            Subscription::Standard { resolution, .. }
            | Subscription::CustomRecord { resolution, .. } => *resolution,
        }
    }

    pub fn market(&self) -> Market {
        match self {
            Subscription::Standard { market, .. } | Subscription::CustomRecord { market, .. } => {
                *market
            }
        }
    }

    /// Category label used in logs and CLI output.
    pub fn category_label(&self) -> &str {
        match self {
            Subscription::Standard { category, .. } => category.as_str(),
            Subscription::CustomRecord { type_id, .. } => type_id,
        }
    }

    pub fn custom_type_id(&self) -> Option<&str> {
        match self {
            Subscription::CustomRecord { type_id, .. } => Some(type_id),
            Subscription::Standard { .. } => None,
        }
    }
}

/// Cached outcome of resolving and registering one [`ResourceKey`].
///
/// Shared (`Arc`) by every declaration that carries the same key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRegistration {
    pub key: ResourceKey,
    pub subscription: Subscription,
    pub symbol: Symbol,
    pub security: Arc<Security>,
}

impl ResourceRegistration {
    pub fn id(&self) -> String {
        self.key.composite_id()
    }

    pub fn ticker(&self) -> &str {
        &self.key.ticker
    }

    pub fn resolution(&self) -> Resolution {
        self.subscription.resolution()
    }

    pub fn market(&self) -> Market {
        self.subscription.market()
    }
}
