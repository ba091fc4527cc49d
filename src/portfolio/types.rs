use crate::records::RunId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Opaque instrument identifier, e.g. an exchange symbol or contract code.
pub type InstrumentId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    Buy,
    Sell,
}

/// A fill. `qty` is always positive; `side` carries the direction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub instrument_id: InstrumentId,
    pub ts_utc: DateTime<Utc>,
    pub side: Side,
    pub qty: f64,
    /// Quote currency per unit
    pub price: f64,
    /// Quote currency, charged against realized P&L
    #[serde(default)]
    pub fees: f64,
    #[serde(default)]
    pub venue: Option<String>,
    #[serde(default)]
    pub trade_id: Option<String>,
}

impl Trade {
    pub fn new(
        instrument_id: impl Into<InstrumentId>,
        ts_utc: DateTime<Utc>,
        side: Side,
        qty: f64,
        price: f64,
    ) -> Self {
        Self {
            instrument_id: instrument_id.into(),
            ts_utc,
            side,
            qty,
            price,
            fees: 0.0,
            venue: None,
            trade_id: None,
        }
    }

    pub fn with_fees(mut self, fees: f64) -> Self {
        self.fees = fees;
        self
    }

    pub fn with_trade_id(mut self, trade_id: impl Into<String>) -> Self {
        self.trade_id = Some(trade_id.into());
        self
    }
}

/// Open inventory bought at one price. Cost excludes fees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lot {
    pub instrument_id: InstrumentId,
    pub ts_utc: DateTime<Utc>,
    pub qty: f64,
    pub cost_per_unit: f64,
    pub source_trade_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RealizedPnl {
    pub instrument_id: InstrumentId,
    /// Net of all fees
    pub realized: f64,
    pub fees: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnrealizedPnl {
    pub instrument_id: InstrumentId,
    pub unrealized: f64,
    pub mark_price: f64,
}

/// Realized plus unrealized P&L of one instrument, marked at a stored pricing run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PnlSummary {
    pub instrument_id: InstrumentId,
    pub mark_run_id: RunId,
    pub mark_price: f64,
    pub realized: RealizedPnl,
    pub unrealized: UnrealizedPnl,
    pub net: f64,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[non_exhaustive]
pub enum PortfolioError {
    #[error("{0} is empty")]
    Empty(&'static str),

    #[error("expected a single instrument {expected}, found {found}")]
    MixedInstruments {
        expected: InstrumentId,
        found: InstrumentId,
    },

    #[error("{field} must be {rule}, got {value}")]
    InvalidInput {
        field: &'static str,
        rule: &'static str,
        value: f64,
    },

    #[error("sell of {requested} exceeds available inventory {available} under FIFO")]
    Inventory { requested: f64, available: f64 },

    #[error("mark run not found: {0}")]
    MarkNotFound(RunId),
}
