//! Spot × volatility surfaces of option values and the P&L derived from them.

pub mod generator;
pub mod grid;
pub mod pnl;

pub use generator::{Surface, SurfaceGenerator};
pub use grid::linspace;
pub use pnl::{to_pnl, to_pnl_with_engine_premium, PnLSurface, Position};
