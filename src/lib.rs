//! # bsm-surface: Black-Scholes-Merton Pricing and Scenario Surfaces
//!
//! `bsm-surface` prices European options under Black-Scholes-Merton with a continuous
//! dividend yield and turns single prices into scenario views: value surfaces over a
//! spot × volatility grid and the P&L of a long or short position over the same grid.
//!
//! ## Core Features
//!
//! - **Validation**: every input is checked once, in a fixed order, before it reaches
//!   the engine. Bad inputs are typed errors that name the offending field.
//! - **Pricing**: closed-form value plus delta, gamma, theta, vega and rho.
//! - **Surfaces**: value grids indexed `[spot][vol]`, optionally evaluated in parallel
//!   (`parallel` feature).
//! - **P&L**: premium-relative scenario P&L, FIFO position accounting, persisted runs
//!   that can be replayed bit for bit.
//!
//! ## Quick Start
//!
//! ```rust
//! use bsm_surface::{price_checked, value_surface, OptionType, Position, RawParams};
//!
//! let raw = RawParams::new(100.0, 100.0, 1.0, 0.2, 0.05);
//! let call = price_checked(&raw, OptionType::Call)?;
//! assert!((call.value - 10.4506).abs() < 1e-4);
//!
//! let spots = [90.0, 100.0, 110.0];
//! let vols = [0.1, 0.2, 0.3];
//! let surface = value_surface(&raw, &spots, &vols, OptionType::Call)?;
//! let pnl = bsm_surface::to_pnl(&surface, call.value, Position::Long)?;
//! assert_eq!(pnl.shape(), (3, 3));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Configuration Presets
//!
//! Validation bounds, defaults and the default grid live in [`PricerConfig`]:
//! - `standard()`: wide bounds, 50 × 20 default grid
//! - `strict()`: bounds for listed equity options
//! - `research()`: dense default grid for offline studies

// ================================================================================================
// MODULES
// ================================================================================================

pub mod models;
pub mod params;
pub mod portfolio;
pub mod records;
pub mod surface;

// ================================================================================================
// PUBLIC RE-EXPORTS
// ================================================================================================

// Inputs, bounds and validation
pub use params::{
    validate, AxisRange, Bound, DefaultParams, Field, GridConfig, ParamBounds, ParameterRecord,
    PricerConfig, RawParams, ValidationError, Validator,
};

// Pricing engine
pub use models::bs::{
    discounted_intrinsic, parity_gap, payoff_at_expiry, price, price_pair, PricingResult, Terms,
};
pub use models::OptionType;

// Surfaces and scenario P&L
pub use surface::{
    linspace, to_pnl, to_pnl_with_engine_premium, PnLSurface, Position, Surface,
    SurfaceGenerator,
};

// Persistence
pub use records::{
    InMemoryRepo, PointOptions, PricingRun, PricingService, Repo, RunId, SurfaceId,
    SurfaceOptions,
};

// Position P&L
pub use portfolio::{
    apply_trades_fifo, compute_pnl_with_mark_run, unrealized_pnl_from_lots, PnlSummary,
    PortfolioError, Side, Trade,
};

// ================================================================================================
// DEFAULT CONFIGURATIONS
// ================================================================================================

/// Pre-configured pricer settings for common use cases.
///
/// # Available Configurations
///
/// - [`standard()`]: General-purpose bounds and grid
/// - [`strict()`]: Tight bounds for listed equity options
/// - [`research()`]: Dense grids for offline analysis
pub mod default_configs {
    use crate::params::PricerConfig;

    /// General-purpose configuration.
    ///
    /// **Characteristics:**
    /// - S, K in (0, 1e9], T up to 100 years, σ up to 1000%
    /// - r in [-100%, 100%], q in [0, 100%]
    /// - Default grid: spot 50%..150% of base in 50 steps, σ 5%..50% in 20 steps
    ///
    /// # Example
    ///
    /// ```rust
    /// use bsm_surface::default_configs;
    ///
    /// let config = default_configs::standard();
    /// assert_eq!(config.grid.spot_steps, 50);
    /// ```
    pub fn standard() -> PricerConfig {
        PricerConfig::standard()
    }

    /// Tight bounds for listed equity options.
    ///
    /// **Characteristics:**
    /// - S, K in [1, 500], T from one day to 10 years
    /// - σ in [1%, 200%], r and q in [0, 20%]
    ///
    /// **Use Cases:**
    /// - Front-end input checking
    /// - Catching unit mistakes (percent vs decimal volatility)
    pub fn strict() -> PricerConfig {
        PricerConfig::strict()
    }

    /// Dense default grid for research and plotting.
    ///
    /// **Characteristics:**
    /// - 201 spot steps × 101 volatility steps
    /// - σ 1%..100%
    /// - Axis length limit raised to 5,000
    pub fn research() -> PricerConfig {
        PricerConfig::research()
    }
}

// ================================================================================================
// CONVENIENCE API
// ================================================================================================

/// Validate `raw` with default bounds and price one option type.
///
/// # Errors
///
/// The first [`ValidationError`] found, in validation order. Nothing is priced
/// when validation fails.
pub fn price_checked(
    raw: &RawParams,
    option_type: OptionType,
) -> Result<PricingResult, ValidationError> {
    let params = validate(raw)?;
    Ok(price(&params, option_type))
}

/// Validate `raw` with default bounds and price both the call and the put.
pub fn price_checked_pair(
    raw: &RawParams,
) -> Result<(PricingResult, PricingResult), ValidationError> {
    let params = validate(raw)?;
    Ok(price_pair(&params))
}

/// Value surface over explicit axes, with default bounds.
///
/// The base record supplies K, T, r and q; every cell replaces spot and volatility.
/// The returned matrix has shape `(spot_axis.len(), vol_axis.len())`.
pub fn value_surface(
    base: &RawParams,
    spot_axis: &[f64],
    vol_axis: &[f64],
    option_type: OptionType,
) -> Result<Surface, ValidationError> {
    let params = validate(base)?;
    SurfaceGenerator::default().build(&params, spot_axis, vol_axis, option_type)
}

/// Position P&L over explicit axes against a premium paid (long) or received (short).
pub fn pnl_surface(
    base: &RawParams,
    spot_axis: &[f64],
    vol_axis: &[f64],
    option_type: OptionType,
    premium: f64,
    position: Position,
) -> Result<PnLSurface, ValidationError> {
    let surface = value_surface(base, spot_axis, vol_axis, option_type)?;
    to_pnl(&surface, premium, position)
}
