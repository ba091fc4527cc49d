use crate::models::bs::price;
use crate::models::OptionType;
use crate::params::{Field, ValidationError};
use crate::surface::generator::{nearest, write_long_csv, Surface};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::io;

/// Direction of the option position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Position {
    /// Bought the option, paid the premium
    Long,
    /// Wrote the option, received the premium
    Short,
}

impl Position {
    pub fn sign(&self) -> f64 {
        match self {
            Position::Long => 1.0,
            Position::Short => -1.0,
        }
    }

    /// `+1` → long, `-1` → short, anything else → `None`.
    pub fn from_sign(sign: i32) -> Option<Self> {
        match sign {
            1 => Some(Position::Long),
            -1 => Some(Position::Short),
            _ => None,
        }
    }
}

/// Net P&L of a position over the grid of a [`Surface`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PnLSurface {
    option_type: OptionType,
    position: Position,
    premium: f64,
    spot_axis: Vec<f64>,
    vol_axis: Vec<f64>,
    values: Vec<Vec<f64>>,
}

impl PnLSurface {
    /// Premium taken from cell `(i0, j0)` of `surface`, so that cell nets to 0.
    /// `None` if the cell is outside the grid.
    pub fn from_reference(
        surface: &Surface,
        i0: usize,
        j0: usize,
        position: Position,
    ) -> Option<Result<Self, ValidationError>> {
        let premium = surface.value_at(i0, j0)?;
        Some(to_pnl(surface, premium, position))
    }

    pub fn option_type(&self) -> OptionType {
        self.option_type
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn premium(&self) -> f64 {
        self.premium
    }

    pub fn spot_axis(&self) -> &[f64] {
        &self.spot_axis
    }

    pub fn vol_axis(&self) -> &[f64] {
        &self.vol_axis
    }

    pub fn values(&self) -> &[Vec<f64>] {
        &self.values
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.spot_axis.len(), self.vol_axis.len())
    }

    pub fn value_at(&self, i: usize, j: usize) -> Option<f64> {
        self.values.get(i).and_then(|row| row.get(j)).copied()
    }

    /// Grid cell closest to `(spot, vol)`.
    pub fn reference_index(&self, spot: f64, vol: f64) -> (usize, usize) {
        (nearest(&self.spot_axis, spot), nearest(&self.vol_axis, vol))
    }

    /// Smallest and largest P&L on the grid.
    pub fn range(&self) -> (f64, f64) {
        self.values
            .iter()
            .flatten()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            })
    }

    /// Write the P&L in long format: one `spot,vol,pnl` row per cell.
    pub fn write_csv<W: io::Write>(&self, writer: W) -> Result<()> {
        write_long_csv(writer, &self.spot_axis, &self.vol_axis, &self.values, "pnl")
    }
}

/// `sign · (value - premium)` for every cell of `surface`.
///
/// A pure transform of already-computed values; the pricing engine is not
/// called again.
pub fn to_pnl(
    surface: &Surface,
    premium: f64,
    position: Position,
) -> Result<PnLSurface, ValidationError> {
    if !premium.is_finite() {
        return Err(ValidationError::NonFinite {
            field: Field::Premium,
            value: premium,
        });
    }
    if premium < 0.0 {
        return Err(ValidationError::OutOfRange {
            field: Field::Premium,
            value: premium,
            min: 0.0,
            max: f64::INFINITY,
        });
    }

    let sign = position.sign();
    let values = surface
        .values()
        .iter()
        .map(|row| row.iter().map(|&v| sign * (v - premium)).collect())
        .collect();

    tracing::debug!(premium, ?position, "pnl surface derived");
    Ok(PnLSurface {
        option_type: surface.option_type(),
        position,
        premium,
        spot_axis: surface.spot_axis().to_vec(),
        vol_axis: surface.vol_axis().to_vec(),
        values,
    })
}

/// P&L against the engine's own price at the surface's base record, i.e. the
/// premium a trader would pay today at the current spot and volatility.
pub fn to_pnl_with_engine_premium(
    surface: &Surface,
    position: Position,
) -> Result<PnLSurface, ValidationError> {
    let premium = price(surface.base(), surface.option_type()).value;
    to_pnl(surface, premium, position)
}
