use crate::models::bs::{price_pair, PricingResult, Terms};
use crate::models::OptionType;
use crate::params::{
    AxisRange, Field, GridConfig, ParameterRecord, PricerConfig, RawParams, ValidationError,
    Validator,
};
use crate::surface::grid::linspace;
use anyhow::Result;
use serde::Serialize;
use std::io;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Option values over a spot × volatility grid.
///
/// `values[i][j]` is the value at `spot_axis[i]` and `vol_axis[j]`, every other
/// input taken from `base`. Axes keep the order the caller supplied.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Surface {
    option_type: OptionType,
    base: ParameterRecord,
    spot_axis: Vec<f64>,
    vol_axis: Vec<f64>,
    values: Vec<Vec<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    results: Option<Vec<Vec<PricingResult>>>,
}

impl Surface {
    fn from_results(
        option_type: OptionType,
        base: ParameterRecord,
        spot_axis: Vec<f64>,
        vol_axis: Vec<f64>,
        results: Vec<Vec<PricingResult>>,
        keep_results: bool,
    ) -> Self {
        let values = results
            .iter()
            .map(|row| row.iter().map(|r| r.value).collect())
            .collect();
        Self {
            option_type,
            base,
            spot_axis,
            vol_axis,
            values,
            results: keep_results.then_some(results),
        }
    }

    pub fn option_type(&self) -> OptionType {
        self.option_type
    }

    /// Record whose S and σ were replaced cell by cell.
    pub fn base(&self) -> &ParameterRecord {
        &self.base
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

    /// Full pricing results, present for surfaces built with
    /// [`SurfaceGenerator::build_full`].
    pub fn results(&self) -> Option<&[Vec<PricingResult>]> {
        self.results.as_deref()
    }

    /// `(len(spot_axis), len(vol_axis))`
    pub fn shape(&self) -> (usize, usize) {
        (self.spot_axis.len(), self.vol_axis.len())
    }

    pub fn value_at(&self, i: usize, j: usize) -> Option<f64> {
        self.values.get(i).and_then(|row| row.get(j)).copied()
    }

    pub fn result_at(&self, i: usize, j: usize) -> Option<&PricingResult> {
        self.results.as_ref()?.get(i)?.get(j)
    }

    /// Grid cell closest to `(spot, vol)`.
    pub fn reference_index(&self, spot: f64, vol: f64) -> (usize, usize) {
        (nearest(&self.spot_axis, spot), nearest(&self.vol_axis, vol))
    }

    /// Write the surface in long format: one `spot,vol,value` row per cell.
    pub fn write_csv<W: io::Write>(&self, writer: W) -> Result<()> {
        write_long_csv(writer, &self.spot_axis, &self.vol_axis, &self.values, "value")
    }
}

pub(crate) fn nearest(axis: &[f64], x: f64) -> usize {
    axis.iter()
        .enumerate()
        .min_by(|a, b| (a.1 - x).abs().total_cmp(&(b.1 - x).abs()))
        .map(|(i, _)| i)
        .unwrap_or(0)
}

pub(crate) fn write_long_csv<W: io::Write>(
    writer: W,
    spot_axis: &[f64],
    vol_axis: &[f64],
    matrix: &[Vec<f64>],
    column: &str,
) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(["spot", "vol", column])?;
    for (row, &s) in matrix.iter().zip(spot_axis) {
        for (&cell, &v) in row.iter().zip(vol_axis) {
            wtr.write_record(&[s.to_string(), v.to_string(), cell.to_string()])?;
        }
    }
    wtr.flush()?;
    Ok(())
}

/// Evaluates the pricing engine over spot × volatility grids.
///
/// Holds its own validator and grid limits; two generators built from different
/// configs never influence each other.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SurfaceGenerator {
    validator: Validator,
    grid: GridConfig,
}

impl SurfaceGenerator {
    pub fn new(config: &PricerConfig) -> Self {
        Self {
            validator: Validator::new(config.bounds),
            grid: config.grid,
        }
    }

    pub fn validator(&self) -> &Validator {
        &self.validator
    }

    pub fn grid(&self) -> &GridConfig {
        &self.grid
    }

    /// Value surface for one option type.
    pub fn build(
        &self,
        base: &ParameterRecord,
        spot_axis: &[f64],
        vol_axis: &[f64],
        option_type: OptionType,
    ) -> Result<Surface, ValidationError> {
        self.build_inner(base, spot_axis, vol_axis, option_type, false)
    }

    /// Like [`build`](Self::build) but keeps every cell's Greeks as well.
    pub fn build_full(
        &self,
        base: &ParameterRecord,
        spot_axis: &[f64],
        vol_axis: &[f64],
        option_type: OptionType,
    ) -> Result<Surface, ValidationError> {
        self.build_inner(base, spot_axis, vol_axis, option_type, true)
    }

    /// Call and put surfaces from one pass over the grid.
    pub fn build_pair(
        &self,
        base: &ParameterRecord,
        spot_axis: &[f64],
        vol_axis: &[f64],
    ) -> Result<(Surface, Surface), ValidationError> {
        self.check_axes(base, spot_axis, vol_axis)?;
        let (rows, cols) = (spot_axis.len(), vol_axis.len());
        tracing::debug!(rows, cols, "call/put surface build started");

        let pairs = eval_rows(spot_axis, vol_axis, |s, v| {
            price_pair(&base.with_spot_vol_unchecked(s, v))
        });
        let mut calls = Vec::with_capacity(rows);
        let mut puts = Vec::with_capacity(rows);
        for row in pairs {
            let (c, p): (Vec<PricingResult>, Vec<PricingResult>) = row.into_iter().unzip();
            calls.push(c);
            puts.push(p);
        }

        tracing::debug!(rows, cols, "call/put surface build complete");
        Ok((
            Surface::from_results(
                OptionType::Call,
                *base,
                spot_axis.to_vec(),
                vol_axis.to_vec(),
                calls,
                false,
            ),
            Surface::from_results(
                OptionType::Put,
                *base,
                spot_axis.to_vec(),
                vol_axis.to_vec(),
                puts,
                false,
            ),
        ))
    }

    /// Build from axis ranges (`min`, `max`, step count) instead of explicit axes.
    pub fn build_from_ranges(
        &self,
        base: &ParameterRecord,
        spot: AxisRange,
        vol: AxisRange,
        option_type: OptionType,
    ) -> Result<Surface, ValidationError> {
        let spot_axis = linspace(Field::Spot, spot, self.grid.max_axis_len)?;
        let vol_axis = linspace(Field::Volatility, vol, self.grid.max_axis_len)?;
        self.build(base, &spot_axis, &vol_axis, option_type)
    }

    /// Build on the configured default grid around the base spot.
    pub fn build_default_grid(
        &self,
        base: &ParameterRecord,
        option_type: OptionType,
    ) -> Result<Surface, ValidationError> {
        self.build_from_ranges(
            base,
            self.grid.spot_range(base.spot()),
            self.grid.vol_range(),
            option_type,
        )
    }

    fn build_inner(
        &self,
        base: &ParameterRecord,
        spot_axis: &[f64],
        vol_axis: &[f64],
        option_type: OptionType,
        keep_results: bool,
    ) -> Result<Surface, ValidationError> {
        self.check_axes(base, spot_axis, vol_axis)?;
        let (rows, cols) = (spot_axis.len(), vol_axis.len());
        tracing::debug!(rows, cols, %option_type, "surface build started");

        let results = eval_rows(spot_axis, vol_axis, |s, v| {
            Terms::new(&base.with_spot_vol_unchecked(s, v)).result(option_type)
        });

        tracing::debug!(rows, cols, %option_type, "surface build complete");
        Ok(Surface::from_results(
            option_type,
            *base,
            spot_axis.to_vec(),
            vol_axis.to_vec(),
            results,
            keep_results,
        ))
    }

    /// Every derived record must pass the same checks as the base, so checking
    /// each axis value against the S and σ rules covers the whole grid. The base
    /// itself is re-checked because it may have been validated under other bounds.
    fn check_axes(
        &self,
        base: &ParameterRecord,
        spot_axis: &[f64],
        vol_axis: &[f64],
    ) -> Result<(), ValidationError> {
        self.validator.validate(&RawParams::from(*base))?;
        for (field, axis) in [(Field::Spot, spot_axis), (Field::Volatility, vol_axis)] {
            if axis.is_empty() {
                return Err(ValidationError::EmptyAxis { field });
            }
            if axis.len() > self.grid.max_axis_len {
                return Err(ValidationError::AxisTooLong {
                    field,
                    len: axis.len(),
                    max: self.grid.max_axis_len,
                });
            }
            for &v in axis {
                self.validator.check_axis_value(field, v)?;
            }
        }
        Ok(())
    }
}

/// One output row per spot value; rows are independent and, with the
/// `parallel` feature, each worker owns whole rows.
fn eval_rows<T, F>(spot_axis: &[f64], vol_axis: &[f64], cell: F) -> Vec<Vec<T>>
where
    T: Send,
    F: Fn(f64, f64) -> T + Sync,
{
    let row = |&s: &f64| vol_axis.iter().map(|&v| cell(s, v)).collect::<Vec<T>>();

    #[cfg(feature = "parallel")]
    let rows = spot_axis.par_iter().map(row).collect();
    #[cfg(not(feature = "parallel"))]
    let rows = spot_axis.iter().map(row).collect();

    rows
}
