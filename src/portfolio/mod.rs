//! Position P&L: FIFO lots from fills, marked at persisted pricing runs.

pub mod fifo;
pub mod service;
pub mod types;

pub use fifo::{apply_trades_fifo, unrealized_pnl_from_lots};
pub use service::compute_pnl_with_mark_run;
pub use types::{
    InstrumentId, Lot, PnlSummary, PortfolioError, RealizedPnl, Side, Trade, UnrealizedPnl,
};
