//! FIFO inventory accounting for a single instrument.

use crate::portfolio::types::{Lot, PortfolioError, RealizedPnl, Side, Trade, UnrealizedPnl};
use std::collections::VecDeque;

fn require(
    field: &'static str,
    rule: &'static str,
    value: f64,
    ok: bool,
) -> Result<(), PortfolioError> {
    if ok && value.is_finite() {
        Ok(())
    } else {
        Err(PortfolioError::InvalidInput { field, rule, value })
    }
}

fn check_trade(t: &Trade) -> Result<(), PortfolioError> {
    require("trade.qty", "finite and > 0", t.qty, t.qty > 0.0)?;
    require("trade.price", "finite and >= 0", t.price, t.price >= 0.0)?;
    require("trade.fees", "finite and >= 0", t.fees, t.fees >= 0.0)
}

/// Apply `trades` in order and return the open lots plus realized P&L.
///
/// A buy opens a lot at the trade price. A sell consumes lots oldest first and
/// realizes `(sell - cost) * qty` per slice. Fees on both sides reduce realized P&L.
/// Every trade is checked before any is applied.
pub fn apply_trades_fifo(trades: &[Trade]) -> Result<(Vec<Lot>, RealizedPnl), PortfolioError> {
    let first = trades.first().ok_or(PortfolioError::Empty("trades"))?;
    let instrument_id = &first.instrument_id;
    for t in trades {
        if &t.instrument_id != instrument_id {
            return Err(PortfolioError::MixedInstruments {
                expected: instrument_id.clone(),
                found: t.instrument_id.clone(),
            });
        }
        check_trade(t)?;
    }

    let mut lots: VecDeque<Lot> = VecDeque::new();
    let mut realized = 0.0;
    let mut fees = 0.0;

    for t in trades {
        fees += t.fees;
        match t.side {
            Side::Buy => lots.push_back(Lot {
                instrument_id: t.instrument_id.clone(),
                ts_utc: t.ts_utc,
                qty: t.qty,
                cost_per_unit: t.price,
                source_trade_id: t.trade_id.clone(),
            }),
            Side::Sell => {
                let available: f64 = lots.iter().map(|l| l.qty).sum();
                if t.qty > available {
                    return Err(PortfolioError::Inventory {
                        requested: t.qty,
                        available,
                    });
                }

                let mut remaining = t.qty;
                while remaining > 0.0 {
                    let Some(head) = lots.front_mut() else {
                        break;
                    };
                    let take = head.qty.min(remaining);
                    realized += (t.price - head.cost_per_unit) * take;
                    head.qty -= take;
                    remaining -= take;
                    if head.qty <= 0.0 {
                        lots.pop_front();
                    }
                }
            }
        }
    }

    tracing::debug!(
        instrument_id = %instrument_id,
        trades = trades.len(),
        open_lots = lots.len(),
        realized,
        "fifo applied"
    );
    Ok((
        lots.into(),
        RealizedPnl {
            instrument_id: instrument_id.clone(),
            realized: realized - fees,
            fees,
        },
    ))
}

/// `Σ (mark - cost) * qty` over `lots`.
pub fn unrealized_pnl_from_lots(
    lots: &[Lot],
    mark_price: f64,
) -> Result<UnrealizedPnl, PortfolioError> {
    let first = lots.first().ok_or(PortfolioError::Empty("lots"))?;
    let instrument_id = &first.instrument_id;
    for lot in lots {
        if &lot.instrument_id != instrument_id {
            return Err(PortfolioError::MixedInstruments {
                expected: instrument_id.clone(),
                found: lot.instrument_id.clone(),
            });
        }
        require("lot.qty", "finite and > 0", lot.qty, lot.qty > 0.0)?;
        let cost = lot.cost_per_unit;
        require("lot.cost_per_unit", "finite and >= 0", cost, cost >= 0.0)?;
    }
    require("mark_price", "finite and >= 0", mark_price, mark_price >= 0.0)?;

    let unrealized = lots
        .iter()
        .map(|lot| (mark_price - lot.cost_per_unit) * lot.qty)
        .sum();
    Ok(UnrealizedPnl {
        instrument_id: instrument_id.clone(),
        unrealized,
        mark_price,
    })
}
