use crate::portfolio::fifo::{apply_trades_fifo, unrealized_pnl_from_lots};
use crate::portfolio::types::{PnlSummary, PortfolioError, Trade, UnrealizedPnl};
use crate::records::{Repo, RunId};
use anyhow::Result;

/// FIFO P&L of `trades`, marked at the value of a persisted pricing run.
///
/// Reads only; nothing is persisted and nothing is priced. A flat position has
/// zero unrealized P&L at the mark.
pub fn compute_pnl_with_mark_run<R: Repo + ?Sized>(
    repo: &R,
    mark_run_id: RunId,
    trades: &[Trade],
) -> Result<PnlSummary> {
    let run = repo
        .get_pricing_run(mark_run_id)?
        .ok_or(PortfolioError::MarkNotFound(mark_run_id))?;
    let mark_price = run.outputs.value();

    let (open_lots, realized) = apply_trades_fifo(trades)?;
    let unrealized = if open_lots.is_empty() {
        UnrealizedPnl {
            instrument_id: realized.instrument_id.clone(),
            unrealized: 0.0,
            mark_price,
        }
    } else {
        unrealized_pnl_from_lots(&open_lots, mark_price)?
    };

    let net = realized.realized + unrealized.unrealized;
    tracing::debug!(%mark_run_id, mark_price, net, "pnl marked");
    Ok(PnlSummary {
        instrument_id: realized.instrument_id.clone(),
        mark_run_id,
        mark_price,
        realized,
        unrealized,
        net,
    })
}
