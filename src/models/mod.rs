pub mod bs;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// European option flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OptionType {
    #[serde(rename = "C", alias = "call")]
    Call,
    #[serde(rename = "P", alias = "put")]
    Put,
}

impl OptionType {
    pub const BOTH: [OptionType; 2] = [OptionType::Call, OptionType::Put];

    /// Payoff at expiry for a terminal price `spot`.
    pub fn payoff(&self, spot: f64, strike: f64) -> f64 {
        match self {
            OptionType::Call => (spot - strike).max(0.0),
            OptionType::Put => (strike - spot).max(0.0),
        }
    }
}

impl fmt::Display for OptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionType::Call => f.write_str("call"),
            OptionType::Put => f.write_str("put"),
        }
    }
}

impl FromStr for OptionType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.to_lowercase().as_str() {
            "call" | "c" => Ok(OptionType::Call),
            "put" | "p" => Ok(OptionType::Put),
            _ => Err(anyhow::anyhow!("Invalid option type: {}", s)),
        }
    }
}

/// Standard normal distribution helpers shared by the pricing code.
pub mod utils {
    use std::f64::consts::{FRAC_1_SQRT_2, PI};

    /// Standard normal CDF, N(x).
    ///
    /// Evaluated through `erfc` so both tails keep full relative precision and
    /// saturate cleanly to 0 or 1 for large |x|.
    pub fn norm_cdf(x: f64) -> f64 {
        0.5 * libm::erfc(-x * FRAC_1_SQRT_2)
    }

    /// Standard normal PDF, φ(x).
    pub fn norm_pdf(x: f64) -> f64 {
        (-0.5 * x * x).exp() / (2.0 * PI).sqrt()
    }

    /// Calculate log-moneyness: ln(S/K)
    pub fn log_moneyness(spot: f64, strike: f64) -> f64 {
        (spot / strike).ln()
    }

}
