//! Input validation for the pricing engine and surface generator.
//!
//! Checks run in a fixed order and stop at the first failure:
//! 1. every required field is present,
//! 2. every field is finite,
//! 3. S, K, T and σ are strictly positive,
//! 4. every field lies inside its configured [`ParamBounds`] range.

use crate::params::config::ParamBounds;
use crate::params::types::{Field, ParameterRecord, RawParams};
use thiserror::Error;

/// Why an input was rejected. Always names the offending field.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum ValidationError {
    #[error("{field} is required")]
    Missing { field: Field },

    #[error("{field} must be finite, got {value}")]
    NonFinite { field: Field, value: f64 },

    #[error("{field} must be > 0, got {value}")]
    NonPositive { field: Field, value: f64 },

    #[error("{field} = {value} is outside the allowed range [{min}, {max}]")]
    OutOfRange {
        field: Field,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("{field} axis must be non-empty")]
    EmptyAxis { field: Field },

    #[error("{field} axis has {len} points, more than the limit of {max}")]
    AxisTooLong { field: Field, len: usize, max: usize },
}

impl ValidationError {
    /// The field the error refers to.
    pub fn field(&self) -> Field {
        match self {
            ValidationError::Missing { field }
            | ValidationError::NonFinite { field, .. }
            | ValidationError::NonPositive { field, .. }
            | ValidationError::OutOfRange { field, .. }
            | ValidationError::EmptyAxis { field }
            | ValidationError::AxisTooLong { field, .. } => *field,
        }
    }
}

const REQUIRED: [Field; 5] = [
    Field::Spot,
    Field::Strike,
    Field::Time,
    Field::Volatility,
    Field::Rate,
];

const ALL_INPUTS: [Field; 6] = [
    Field::Spot,
    Field::Strike,
    Field::Time,
    Field::Volatility,
    Field::Rate,
    Field::DividendYield,
];

const STRICTLY_POSITIVE: [Field; 4] = [Field::Spot, Field::Strike, Field::Time, Field::Volatility];

/// Turns [`RawParams`] into [`ParameterRecord`]s under a fixed set of bounds.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Validator {
    bounds: ParamBounds,
}

impl Validator {
    pub fn new(bounds: ParamBounds) -> Self {
        Self { bounds }
    }

    pub fn bounds(&self) -> &ParamBounds {
        &self.bounds
    }

    /// Validate raw inputs. No partial record is ever produced.
    pub fn validate(&self, raw: &RawParams) -> Result<ParameterRecord, ValidationError> {
        for field in REQUIRED {
            if raw.get(field).is_none() {
                return Err(ValidationError::Missing { field });
            }
        }

        let value = |field: Field| raw.get(field).unwrap_or(0.0);

        for field in ALL_INPUTS {
            let v = value(field);
            if !v.is_finite() {
                return Err(ValidationError::NonFinite { field, value: v });
            }
        }

        for field in STRICTLY_POSITIVE {
            let v = value(field);
            if v <= 0.0 {
                return Err(ValidationError::NonPositive { field, value: v });
            }
        }

        for field in ALL_INPUTS {
            let v = value(field);
            if let Some(bound) = self.bounds.get(field) {
                if !bound.contains(v) {
                    return Err(ValidationError::OutOfRange {
                        field,
                        value: v,
                        min: bound.min,
                        max: bound.max,
                    });
                }
            }
        }

        Ok(ParameterRecord::new_unchecked(
            value(Field::Spot),
            value(Field::Strike),
            value(Field::Time),
            value(Field::Volatility),
            value(Field::Rate),
            value(Field::DividendYield),
        ))
    }

    /// Derive a record from `base` with spot and volatility replaced, re-running
    /// every check on the result.
    pub fn shock(
        &self,
        base: &ParameterRecord,
        spot: f64,
        vol: f64,
    ) -> Result<ParameterRecord, ValidationError> {
        self.validate(&base.shocked(spot, vol))
    }

    /// Check a single axis value in isolation, reporting errors against `field`.
    pub(crate) fn check_axis_value(&self, field: Field, v: f64) -> Result<(), ValidationError> {
        if !v.is_finite() {
            return Err(ValidationError::NonFinite { field, value: v });
        }
        if v <= 0.0 {
            return Err(ValidationError::NonPositive { field, value: v });
        }
        if let Some(bound) = self.bounds.get(field) {
            if !bound.contains(v) {
                return Err(ValidationError::OutOfRange {
                    field,
                    value: v,
                    min: bound.min,
                    max: bound.max,
                });
            }
        }
        Ok(())
    }
}

/// Validate with the default bounds.
pub fn validate(raw: &RawParams) -> Result<ParameterRecord, ValidationError> {
    Validator::default().validate(raw)
}
