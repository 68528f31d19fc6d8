//! Fixed token vocabularies for instrument category, sampling resolution and
//! market.
//!
//! Tokens are matched exactly (case-sensitive), the same way they are spelled
//! in the persisted config document. Each enum carries one static
//! `(token, variant)` table; lookups never allocate.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Security type
// ---------------------------------------------------------------------------

/// Standard instrument categories understood by the host platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SecurityType {
    Base,
    Equity,
    Option,
    Commodity,
    Forex,
    Future,
    Cfd,
    Crypto,
    FutureOption,
    Index,
    IndexOption,
    CryptoFuture,
}

const SECURITY_TYPES: &[(&str, SecurityType)] = &[
    ("Base", SecurityType::Base),
    ("Equity", SecurityType::Equity),
    ("Option", SecurityType::Option),
    ("Commodity", SecurityType::Commodity),
    ("Forex", SecurityType::Forex),
    ("Future", SecurityType::Future),
    ("Cfd", SecurityType::Cfd),
    ("Crypto", SecurityType::Crypto),
    ("FutureOption", SecurityType::FutureOption),
    ("Index", SecurityType::Index),
    ("IndexOption", SecurityType::IndexOption),
    ("CryptoFuture", SecurityType::CryptoFuture),
];

impl SecurityType {
    pub fn from_token(token: &str) -> Option<Self> {
        lookup(SECURITY_TYPES, token)
    }

    pub fn as_str(&self) -> &'static str {
        name_of(SECURITY_TYPES, *self)
    }
}

impl fmt::Display for SecurityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

/// Sampling resolution of a subscription.
///
/// Ordered from finest to coarsest so `Resolution::Hour < Resolution::Daily`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Resolution {
    Tick,
    Second,
    Minute,
    Hour,
    Daily,
}

const RESOLUTIONS: &[(&str, Resolution)] = &[
    ("Tick", Resolution::Tick),
    ("Second", Resolution::Second),
    ("Minute", Resolution::Minute),
    ("Hour", Resolution::Hour),
    ("Daily", Resolution::Daily),
];

impl Resolution {
    pub fn from_token(token: &str) -> Option<Self> {
        lookup(RESOLUTIONS, token)
    }

    pub fn as_str(&self) -> &'static str {
        name_of(RESOLUTIONS, *self)
    }

    /// True for every resolution finer than one trading day. Timestamps at
    /// these resolutions must carry a time of day.
    pub fn is_sub_daily(&self) -> bool {
        *self < Resolution::Daily
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Market
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Market {
    Usa,
    Oanda,
    Fxcm,
    Binance,
    Bitfinex,
    Coinbase,
    Kraken,
    Bybit,
    Cme,
    Cbot,
    Nymex,
    Comex,
    Ice,
    Cboe,
    Cfe,
    Eurex,
    India,
    Nse,
    Sgx,
    Hkfe,
}

const MARKETS: &[(&str, Market)] = &[
    ("USA", Market::Usa),
    ("Oanda", Market::Oanda),
    ("FXCM", Market::Fxcm),
    ("Binance", Market::Binance),
    ("Bitfinex", Market::Bitfinex),
    ("Coinbase", Market::Coinbase),
    ("Kraken", Market::Kraken),
    ("Bybit", Market::Bybit),
    ("CME", Market::Cme),
    ("CBOT", Market::Cbot),
    ("NYMEX", Market::Nymex),
    ("COMEX", Market::Comex),
    ("ICE", Market::Ice),
    ("CBOE", Market::Cboe),
    ("CFE", Market::Cfe),
    ("EUREX", Market::Eurex),
    ("India", Market::India),
    ("NSE", Market::Nse),
    ("SGX", Market::Sgx),
    ("HKFE", Market::Hkfe),
];

impl Market {
    pub fn from_token(token: &str) -> Option<Self> {
        lookup(MARKETS, token)
    }

    pub fn as_str(&self) -> &'static str {
        name_of(MARKETS, *self)
    }
}

impl fmt::Display for Market {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn lookup<T: Copy>(table: &[(&'static str, T)], token: &str) -> Option<T> {
    table
        .iter()
        .find(|(name, _)| *name == token)
        .map(|(_, v)| *v)
}

fn name_of<T: Copy + PartialEq>(table: &[(&'static str, T)], value: T) -> &'static str {
    table
        .iter()
        .find(|(_, v)| *v == value)
        .map(|(name, _)| *name)
        .unwrap_or("?")
}
