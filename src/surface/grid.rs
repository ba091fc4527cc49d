use crate::params::{AxisRange, Field, ValidationError};

/// `steps` evenly spaced points from `min` to `max`, both ends included.
///
/// `steps == 1` yields `[min]`. Errors are reported against `field` so a bad
/// spot range reads as a bad `S`.
pub fn linspace(
    field: Field,
    range: AxisRange,
    max_len: usize,
) -> Result<Vec<f64>, ValidationError> {
    let AxisRange { min, max, steps } = range;
    if steps == 0 {
        return Err(ValidationError::EmptyAxis { field });
    }
    if steps > max_len {
        return Err(ValidationError::AxisTooLong {
            field,
            len: steps,
            max: max_len,
        });
    }
    for v in [min, max] {
        if !v.is_finite() {
            return Err(ValidationError::NonFinite { field, value: v });
        }
    }
    if min > max {
        return Err(ValidationError::OutOfRange {
            field,
            value: min,
            min: f64::NEG_INFINITY,
            max,
        });
    }
    if steps == 1 {
        return Ok(vec![min]);
    }

    let step = (max - min) / (steps - 1) as f64;
    let mut axis: Vec<f64> = (0..steps).map(|i| min + step * i as f64).collect();
    // pin the last point so rounding never overshoots the requested range
    axis[steps - 1] = max;
    Ok(axis)
}
