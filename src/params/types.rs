use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies one input of the pricing model (or a surface axis built from it).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Field {
    /// Spot price of the underlying (S)
    Spot,
    /// Strike price (K)
    Strike,
    /// Time to expiry in years (T)
    Time,
    /// Annualized volatility (σ)
    Volatility,
    /// Continuously compounded risk-free rate (r)
    Rate,
    /// Continuous dividend yield (q)
    DividendYield,
    /// Premium used as the P&L reference
    Premium,
}

impl Field {
    /// Short symbol used in error messages and CLI help.
    pub fn symbol(&self) -> &'static str {
        match self {
            Field::Spot => "S",
            Field::Strike => "K",
            Field::Time => "T",
            Field::Volatility => "sigma",
            Field::Rate => "r",
            Field::DividendYield => "q",
            Field::Premium => "premium",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Unchecked model inputs as they arrive from a caller (UI, CLI, stored record).
///
/// Every field may be missing, NaN, infinite, zero or negative. The only way to
/// turn this into a [`ParameterRecord`] is through
/// [`Validator::validate`](crate::params::validation::Validator::validate).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RawParams {
    pub spot: Option<f64>,
    pub strike: Option<f64>,
    pub time: Option<f64>,
    pub vol: Option<f64>,
    pub rate: Option<f64>,
    /// Dividend yield; `None` means 0.
    #[serde(default)]
    pub div_yield: Option<f64>,
}

impl RawParams {
    /// All required fields present, no dividend yield.
    pub fn new(spot: f64, strike: f64, time: f64, vol: f64, rate: f64) -> Self {
        Self {
            spot: Some(spot),
            strike: Some(strike),
            time: Some(time),
            vol: Some(vol),
            rate: Some(rate),
            div_yield: None,
        }
    }

    pub fn with_div_yield(mut self, q: f64) -> Self {
        self.div_yield = Some(q);
        self
    }

    /// Value of a field, `None` when missing. A missing dividend yield reads as 0.
    pub fn get(&self, field: Field) -> Option<f64> {
        match field {
            Field::Spot => self.spot,
            Field::Strike => self.strike,
            Field::Time => self.time,
            Field::Volatility => self.vol,
            Field::Rate => self.rate,
            Field::DividendYield => Some(self.div_yield.unwrap_or(0.0)),
            Field::Premium => None,
        }
    }
}

impl From<ParameterRecord> for RawParams {
    fn from(p: ParameterRecord) -> Self {
        RawParams::new(p.spot(), p.strike(), p.time(), p.vol(), p.rate())
            .with_div_yield(p.div_yield())
    }
}

/// Validated Black-Scholes-Merton inputs.
///
/// Fields are private: a record only exists after validation, so S, K, T and σ are
/// strictly positive and every field is finite. Scenario variants are new records
/// produced by the validator, never in-place edits.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ParameterRecord {
    spot: f64,
    strike: f64,
    time: f64,
    vol: f64,
    rate: f64,
    div_yield: f64,
}

impl ParameterRecord {
    pub(crate) fn new_unchecked(
        spot: f64,
        strike: f64,
        time: f64,
        vol: f64,
        rate: f64,
        div_yield: f64,
    ) -> Self {
        Self {
            spot,
            strike,
            time,
            vol,
            rate,
            div_yield,
        }
    }

    pub fn spot(&self) -> f64 {
        self.spot
    }

    pub fn strike(&self) -> f64 {
        self.strike
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn vol(&self) -> f64 {
        self.vol
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }

    pub fn div_yield(&self) -> f64 {
        self.div_yield
    }

    /// Copy with spot and volatility replaced. Callers must have checked both
    /// values against the same bounds as the original record.
    pub(crate) fn with_spot_vol_unchecked(&self, spot: f64, vol: f64) -> Self {
        Self { spot, vol, ..*self }
    }

    /// Raw copy with spot and volatility replaced, ready for re-validation.
    pub fn shocked(&self, spot: f64, vol: f64) -> RawParams {
        RawParams {
            spot: Some(spot),
            vol: Some(vol),
            ..RawParams::from(*self)
        }
    }
}
