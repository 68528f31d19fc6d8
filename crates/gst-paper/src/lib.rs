//! Deterministic in-memory "paper" platform.
//!
//! Design decisions:
//! - `sid` is a 1-based counter in call order. No randomness, no timestamps.
//! - Symbol value is the ticker as declared.
//! - Every accepted call is recorded, so tests and the CLI can show exactly
//!   what reached the platform.
//! - Tickers can be marked as rejected to exercise failure paths.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use gst_md::CustomDataType;
use gst_registry::{Platform, PlatformError, SecurityCall};
use gst_schemas::{Market, Resolution, Security, Symbol};

/// One accepted subscription request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PlatformCall {
    Security {
        call: SecurityCall,
        ticker: String,
        resolution: Resolution,
        market: Market,
    },
    Data {
        type_id: String,
        ticker: String,
        resolution: Resolution,
    },
}

impl fmt::Display for PlatformCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlatformCall::Security {
                call,
                ticker,
                resolution,
                market,
            } => write!(f, "{call}({ticker}, {resolution}, {market})"),
            PlatformCall::Data {
                type_id,
                ticker,
                resolution,
            } => write!(f, "AddData({type_id}, {ticker}, {resolution})"),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct PaperPlatform {
    next_sid: u64,
    calls: Vec<PlatformCall>,
    rejected: BTreeSet<String>,
}

impl PaperPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    /// Refuse any future subscription for `ticker`.
    pub fn reject_ticker(&mut self, ticker: impl Into<String>) {
        self.rejected.insert(ticker.into());
    }

    pub fn calls(&self) -> &[PlatformCall] {
        &self.calls
    }

    pub fn call_count(&self) -> usize {
        self.calls.len()
    }

    fn check(&self, ticker: &str) -> Result<(), PlatformError> {
        if self.rejected.contains(ticker) {
            return Err(PlatformError::new(format!("paper platform rejects '{ticker}'")));
        }
        Ok(())
    }

    fn issue(&mut self, ticker: &str, resolution: Resolution, market: Market) -> Arc<Security> {
        self.next_sid += 1;
        Arc::new(Security {
            symbol: Symbol::new(ticker, self.next_sid),
            resolution,
            market,
        })
    }
}

impl Platform for PaperPlatform {
    fn add_security(
        &mut self,
        call: SecurityCall,
        ticker: &str,
        resolution: Resolution,
        market: Market,
    ) -> Result<Arc<Security>, PlatformError> {
        self.check(ticker)?;
        self.calls.push(PlatformCall::Security {
            call,
            ticker: ticker.to_string(),
            resolution,
            market,
        });
        Ok(self.issue(ticker, resolution, market))
    }

    /// Custom feeds are not tied to an exchange; the handle carries `USA`.
    fn add_data(
        &mut self,
        record_type: &CustomDataType,
        ticker: &str,
        resolution: Resolution,
    ) -> Result<Arc<Security>, PlatformError> {
        self.check(ticker)?;
        self.calls.push(PlatformCall::Data {
            type_id: record_type.type_id.clone(),
            ticker: ticker.to_string(),
            resolution,
        });
        Ok(self.issue(ticker, resolution, Market::Usa))
    }
}
