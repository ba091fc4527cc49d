use crate::params::types::{Field, RawParams};
use crate::params::validation::Validator;
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Inclusive sanity range for one input.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bound {
    pub min: f64,
    pub max: f64,
}

impl Bound {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Per-field sanity ranges applied by the validator after the finiteness and
/// positivity checks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParamBounds {
    #[serde(default = "default_spot_bound")]
    pub spot: Bound,
    #[serde(default = "default_strike_bound")]
    pub strike: Bound,
    #[serde(default = "default_time_bound")]
    pub time: Bound,
    #[serde(default = "default_vol_bound")]
    pub vol: Bound,
    #[serde(default = "default_rate_bound")]
    pub rate: Bound,
    #[serde(default = "default_div_yield_bound")]
    pub div_yield: Bound,
}

impl Default for ParamBounds {
    fn default() -> Self {
        Self {
            spot: default_spot_bound(),
            strike: default_strike_bound(),
            time: default_time_bound(),
            vol: default_vol_bound(),
            rate: default_rate_bound(),
            div_yield: default_div_yield_bound(),
        }
    }
}

impl ParamBounds {
    /// Bound for a model input. The premium has no configured range.
    pub fn get(&self, field: Field) -> Option<Bound> {
        match field {
            Field::Spot => Some(self.spot),
            Field::Strike => Some(self.strike),
            Field::Time => Some(self.time),
            Field::Volatility => Some(self.vol),
            Field::Rate => Some(self.rate),
            Field::DividendYield => Some(self.div_yield),
            Field::Premium => None,
        }
    }

    /// Rejects ranges that could let degenerate inputs through to the engine.
    pub fn check(&self) -> Result<()> {
        for field in [
            Field::Spot,
            Field::Strike,
            Field::Time,
            Field::Volatility,
            Field::Rate,
            Field::DividendYield,
        ] {
            let Some(b) = self.get(field) else { continue };
            if !b.min.is_finite() || !b.max.is_finite() {
                return Err(anyhow!("bounds for {} must be finite, got [{}, {}]", field, b.min, b.max));
            }
            if b.min > b.max {
                return Err(anyhow!("bounds for {} are inverted: min {} > max {}", field, b.min, b.max));
            }
        }
        for field in [Field::Spot, Field::Strike, Field::Time, Field::Volatility] {
            if let Some(b) = self.get(field) {
                if b.min <= 0.0 {
                    return Err(anyhow!("lower bound for {} must be > 0, got {}", field, b.min));
                }
            }
        }
        if self.div_yield.min < 0.0 {
            return Err(anyhow!(
                "lower bound for q must be >= 0, got {}",
                self.div_yield.min
            ));
        }
        Ok(())
    }
}

/// Default scenario shown to a user before they touch any input. Fields left
/// out of a config file keep their [`Default`] values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultParams {
    pub spot: f64,
    pub strike: f64,
    pub time: f64,
    pub vol: f64,
    pub rate: f64,
    pub div_yield: f64,
}

impl Default for DefaultParams {
    fn default() -> Self {
        Self {
            spot: 100.0,
            strike: 100.0,
            time: 1.0,
            vol: 0.2,
            rate: 0.05,
            div_yield: 0.0,
        }
    }
}

impl DefaultParams {
    pub fn to_raw(&self) -> RawParams {
        RawParams::new(self.spot, self.strike, self.time, self.vol, self.rate)
            .with_div_yield(self.div_yield)
    }
}

/// Axis range and resolution: `steps` evenly spaced points from `min` to `max`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisRange {
    pub min: f64,
    pub max: f64,
    pub steps: usize,
}

impl AxisRange {
    pub const fn new(min: f64, max: f64, steps: usize) -> Self {
        Self { min, max, steps }
    }
}

/// Default grid used when a caller asks for a surface around the current spot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridConfig {
    /// Lowest spot on the grid as a fraction of the reference spot
    #[serde(default = "default_spot_min_pct")]
    pub spot_min_pct: f64,
    /// Highest spot on the grid as a fraction of the reference spot
    #[serde(default = "default_spot_max_pct")]
    pub spot_max_pct: f64,
    #[serde(default = "default_spot_steps")]
    pub spot_steps: usize,
    #[serde(default = "default_vol_min")]
    pub vol_min: f64,
    #[serde(default = "default_vol_max")]
    pub vol_max: f64,
    #[serde(default = "default_vol_steps")]
    pub vol_steps: usize,
    /// Hard cap on the length of either axis
    #[serde(default = "default_max_axis_len")]
    pub max_axis_len: usize,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            spot_min_pct: default_spot_min_pct(),
            spot_max_pct: default_spot_max_pct(),
            spot_steps: default_spot_steps(),
            vol_min: default_vol_min(),
            vol_max: default_vol_max(),
            vol_steps: default_vol_steps(),
            max_axis_len: default_max_axis_len(),
        }
    }
}

impl GridConfig {
    /// Spot axis range centred on `spot`.
    pub fn spot_range(&self, spot: f64) -> AxisRange {
        AxisRange::new(spot * self.spot_min_pct, spot * self.spot_max_pct, self.spot_steps)
    }

    pub fn vol_range(&self) -> AxisRange {
        AxisRange::new(self.vol_min, self.vol_max, self.vol_steps)
    }

    pub fn check(&self) -> Result<()> {
        if self.max_axis_len == 0 {
            return Err(anyhow!("max_axis_len must be at least 1"));
        }
        if self.spot_steps == 0 || self.vol_steps == 0 {
            return Err(anyhow!("grid step counts must be at least 1"));
        }
        if self.spot_steps > self.max_axis_len || self.vol_steps > self.max_axis_len {
            return Err(anyhow!(
                "grid step counts ({}, {}) exceed max_axis_len {}",
                self.spot_steps,
                self.vol_steps,
                self.max_axis_len
            ));
        }
        if !(self.spot_min_pct > 0.0 && self.spot_min_pct <= self.spot_max_pct) {
            return Err(anyhow!(
                "spot grid fractions must satisfy 0 < min <= max, got [{}, {}]",
                self.spot_min_pct,
                self.spot_max_pct
            ));
        }
        if !(self.vol_min > 0.0 && self.vol_min <= self.vol_max) {
            return Err(anyhow!(
                "vol grid must satisfy 0 < min <= max, got [{}, {}]",
                self.vol_min,
                self.vol_max
            ));
        }
        Ok(())
    }
}

/// Top-level configuration handed to the validator and surface generator.
///
/// Built once (from a preset or a TOML file) and passed by value; nothing in the
/// crate reads configuration from global state.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PricerConfig {
    #[serde(default)]
    pub defaults: DefaultParams,
    #[serde(default)]
    pub bounds: ParamBounds,
    #[serde(default)]
    pub grid: GridConfig,
}

impl PricerConfig {
    /// Wide bounds suitable for interactive use.
    pub fn standard() -> Self {
        Self::default()
    }

    /// Narrow bounds mirroring typical equity-option input ranges.
    pub fn strict() -> Self {
        Self {
            defaults: DefaultParams::default(),
            bounds: ParamBounds {
                spot: Bound::new(1.0, 500.0),
                strike: Bound::new(1.0, 500.0),
                time: Bound::new(1.0 / 365.0, 10.0),
                vol: Bound::new(0.01, 2.0),
                rate: Bound::new(0.0, 0.20),
                div_yield: Bound::new(0.0, 0.20),
            },
            grid: GridConfig::default(),
        }
    }

    /// Dense grid for offline analysis.
    pub fn research() -> Self {
        Self {
            defaults: DefaultParams::default(),
            bounds: ParamBounds::default(),
            grid: GridConfig {
                spot_steps: 201,
                vol_steps: 101,
                vol_min: 0.01,
                vol_max: 1.0,
                max_axis_len: 5000,
                ..GridConfig::default()
            },
        }
    }

    /// Bounds and grid are well formed, and the default scenario passes the bounds.
    pub fn check(&self) -> Result<()> {
        self.bounds.check()?;
        self.grid.check()?;
        Validator::new(self.bounds)
            .validate(&self.defaults.to_raw())
            .context("default parameters fall outside the configured bounds")?;
        Ok(())
    }

    /// Parse a TOML document; missing sections and fields take their defaults.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let cfg: PricerConfig = toml::from_str(s).context("invalid pricer config")?;
        cfg.check()?;
        Ok(cfg)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::from_toml_str(&text)
    }
}

fn default_spot_bound() -> Bound {
    Bound::new(1e-8, 1e9)
}

fn default_strike_bound() -> Bound {
    Bound::new(1e-8, 1e9)
}

fn default_time_bound() -> Bound {
    Bound::new(1e-8, 100.0)
}

fn default_vol_bound() -> Bound {
    Bound::new(1e-8, 10.0)
}

fn default_rate_bound() -> Bound {
    Bound::new(-1.0, 1.0)
}

fn default_div_yield_bound() -> Bound {
    Bound::new(0.0, 1.0)
}

fn default_spot_min_pct() -> f64 {
    0.5
}

fn default_spot_max_pct() -> f64 {
    1.5
}

fn default_spot_steps() -> usize {
    50
}

fn default_vol_min() -> f64 {
    0.05
}

fn default_vol_max() -> f64 {
    0.50
}

fn default_vol_steps() -> usize {
    20
}

fn default_max_axis_len() -> usize {
    1000
}
