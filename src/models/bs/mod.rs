//! Closed-form Black-Scholes-Merton values and Greeks for European options.
//!
//! Both option types share one pass over `d1`, `d2` and the normal CDF/PDF
//! ([`Terms`]); the option type only selects the final formula.
//!
//! Inputs are [`ParameterRecord`]s, so S, K, T and σ are strictly positive and
//! `σ·√T` is never zero here.

use crate::models::utils::{log_moneyness, norm_cdf, norm_pdf};
use crate::models::OptionType;
use crate::params::ParameterRecord;
use serde::{Deserialize, Serialize};

/// Value and first/second-order sensitivities for one option.
///
/// Vega and rho are per unit of σ and r; theta is per year.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricingResult {
    pub option_type: OptionType,
    pub value: f64,
    pub delta: f64,
    pub gamma: f64,
    pub theta: f64,
    pub vega: f64,
    pub rho: f64,
}

impl PricingResult {
    /// Vega per one volatility point (σ + 0.01).
    pub fn vega_per_point(&self) -> f64 {
        self.vega / 100.0
    }

    /// Theta per calendar day.
    pub fn theta_per_day(&self) -> f64 {
        self.theta / 365.0
    }

    pub fn is_finite(&self) -> bool {
        [
            self.value, self.delta, self.gamma, self.theta, self.vega, self.rho,
        ]
        .iter()
        .all(|x| x.is_finite())
    }
}

/// Intermediate quantities shared by the call and put formulas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Terms {
    pub d1: f64,
    pub d2: f64,
    sqrt_t: f64,
    /// S·e^{-qT}
    fwd_spot: f64,
    /// K·e^{-rT}
    pv_strike: f64,
    /// e^{-qT}
    div_factor: f64,
    pdf_d1: f64,
    params: ParameterRecord,
}

impl Terms {
    pub fn new(params: &ParameterRecord) -> Self {
        let (s, k, t, sigma, r, q) = (
            params.spot(),
            params.strike(),
            params.time(),
            params.vol(),
            params.rate(),
            params.div_yield(),
        );
        let sqrt_t = t.sqrt();
        let vol_sqrt_t = sigma * sqrt_t;
        let d1 = (log_moneyness(s, k) + (r - q + 0.5 * sigma * sigma) * t) / vol_sqrt_t;
        let d2 = d1 - vol_sqrt_t;
        let div_factor = (-q * t).exp();

        Self {
            d1,
            d2,
            sqrt_t,
            fwd_spot: s * div_factor,
            pv_strike: k * (-r * t).exp(),
            div_factor,
            pdf_d1: norm_pdf(d1),
            params: *params,
        }
    }

    /// Option value and Greeks for one option type.
    pub fn result(&self, option_type: OptionType) -> PricingResult {
        let p = &self.params;
        let (s, t, sigma, r, q) = (p.spot(), p.time(), p.vol(), p.rate(), p.div_yield());

        // shared by both types
        let gamma = self.div_factor * self.pdf_d1 / (s * sigma * self.sqrt_t);
        let vega = self.fwd_spot * self.pdf_d1 * self.sqrt_t;
        let decay = -self.fwd_spot * self.pdf_d1 * sigma / (2.0 * self.sqrt_t);

        let result = match option_type {
            OptionType::Call => {
                let nd1 = norm_cdf(self.d1);
                let nd2 = norm_cdf(self.d2);
                PricingResult {
                    option_type,
                    value: clamp_value(self.fwd_spot * nd1 - self.pv_strike * nd2),
                    delta: self.div_factor * nd1,
                    gamma,
                    theta: decay - r * self.pv_strike * nd2 + q * self.fwd_spot * nd1,
                    vega,
                    rho: t * self.pv_strike * nd2,
                }
            }
            OptionType::Put => {
                let nmd1 = norm_cdf(-self.d1);
                let nmd2 = norm_cdf(-self.d2);
                PricingResult {
                    option_type,
                    value: clamp_value(self.pv_strike * nmd2 - self.fwd_spot * nmd1),
                    delta: -self.div_factor * nmd1,
                    gamma,
                    theta: decay + r * self.pv_strike * nmd2 - q * self.fwd_spot * nmd1,
                    vega,
                    rho: -t * self.pv_strike * nmd2,
                }
            }
        };

        debug_assert!(
            result.is_finite(),
            "non-finite pricing result {:?} for {:?}",
            result,
            self.params
        );
        result
    }
}

/// Floors rounding noise on deep out-of-the-money values at 0. The finiteness
/// check runs before the clamp, since `f64::max` turns NaN into 0.
fn clamp_value(raw: f64) -> f64 {
    debug_assert!(raw.is_finite(), "non-finite option value {raw}");
    raw.max(0.0)
}

/// Price one European option under Black-Scholes-Merton.
pub fn price(params: &ParameterRecord, option_type: OptionType) -> PricingResult {
    Terms::new(params).result(option_type)
}

/// Price the call and the put from a single evaluation of `d1`/`d2`.
pub fn price_pair(params: &ParameterRecord) -> (PricingResult, PricingResult) {
    let terms = Terms::new(params);
    (terms.result(OptionType::Call), terms.result(OptionType::Put))
}

/// Right-hand side of put-call parity: `S·e^{-qT} - K·e^{-rT}`.
pub fn parity_gap(params: &ParameterRecord) -> f64 {
    params.spot() * (-params.div_yield() * params.time()).exp()
        - params.strike() * (-params.rate() * params.time()).exp()
}

/// The σ → 0⁺ limit of the option value: intrinsic value of the discounted
/// forward, `max(S·e^{-qT} - K·e^{-rT}, 0)` for calls and the mirror for puts.
///
/// Reference value only; the engine never substitutes it for a priced result.
pub fn discounted_intrinsic(params: &ParameterRecord, option_type: OptionType) -> f64 {
    let gap = parity_gap(params);
    match option_type {
        OptionType::Call => gap.max(0.0),
        OptionType::Put => (-gap).max(0.0),
    }
}

/// Payoff at expiry (T = 0), `max(S-K, 0)` or `max(K-S, 0)`.
pub fn payoff_at_expiry(spot: f64, strike: f64, option_type: OptionType) -> f64 {
    option_type.payoff(spot, strike)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{validate, RawParams};

    fn params(s: f64, k: f64, t: f64, sigma: f64, r: f64, q: f64) -> ParameterRecord {
        validate(&RawParams::new(s, k, t, sigma, r).with_div_yield(q)).unwrap()
    }

    #[test]
    fn test_reference_scenario() {
        let p = params(100.0, 100.0, 1.0, 0.2, 0.05, 0.0);
        let (call, put) = price_pair(&p);

        assert!((call.value - 10.450_583_572_185_565).abs() < 1e-8);
        assert!((put.value - 5.573_526_022_256_971).abs() < 1e-8);
        assert!((call.delta - 0.636_830_651_175_619).abs() < 1e-8);
        assert!((call.gamma - 0.018_762_017_345_846_895).abs() < 1e-10);
        assert!((call.vega - 37.524_034_691_693_79).abs() < 1e-8);
        assert!((put.delta - (call.delta - 1.0)).abs() < 1e-12);
    }

    #[test]
    fn test_reference_theta_and_rho() {
        let p = params(100.0, 100.0, 1.0, 0.2, 0.05, 0.0);
        let (call, put) = price_pair(&p);

        assert!((call.theta - (-6.414_027_546_438_197)).abs() < 1e-8);
        assert!((put.theta - (-1.657_880_423_934_626)).abs() < 1e-8);
        assert!((call.rho - 53.232_481_545_376_345).abs() < 1e-8);
        assert!((put.rho - (-41.890_460_904_695_06)).abs() < 1e-8);
    }

    #[test]
    fn test_price_matches_pair() {
        let p = params(90.0, 110.0, 0.5, 0.35, 0.01, 0.02);
        let (call, put) = price_pair(&p);
        assert_eq!(price(&p, OptionType::Call), call);
        assert_eq!(price(&p, OptionType::Put), put);
    }

    #[test]
    fn test_parity_with_dividend() {
        let p = params(105.0, 95.0, 2.0, 0.3, 0.03, 0.015);
        let (call, put) = price_pair(&p);
        assert!((call.value - put.value - parity_gap(&p)).abs() < 1e-10);
        // delta parity: Δc - Δp = e^{-qT}
        assert!((call.delta - put.delta - (-0.015f64 * 2.0).exp()).abs() < 1e-12);
    }

    #[test]
    fn test_near_zero_vol_tends_to_discounted_intrinsic() {
        let itm = params(120.0, 100.0, 1.0, 1e-6, 0.05, 0.0);
        let call = price(&itm, OptionType::Call);
        let put = price(&itm, OptionType::Put);
        assert!((call.value - discounted_intrinsic(&itm, OptionType::Call)).abs() < 1e-8);
        assert!(put.value.abs() < 1e-8);

        let otm = params(80.0, 100.0, 1.0, 1e-6, 0.05, 0.0);
        let put = price(&otm, OptionType::Put);
        assert!((put.value - discounted_intrinsic(&otm, OptionType::Put)).abs() < 1e-8);
    }

    #[test]
    fn test_extreme_moneyness_is_finite() {
        for (s, k) in [(1e-4, 1e6), (1e6, 1e-4), (100.0, 100.0)] {
            for sigma in [1e-8, 0.2, 10.0] {
                for t in [1e-8, 1.0, 100.0] {
                    let p = params(s, k, t, sigma, 0.05, 0.0);
                    let (call, put) = price_pair(&p);
                    assert!(call.is_finite() && put.is_finite(), "{:?}", p);
                    assert!(call.value >= 0.0 && put.value >= 0.0);
                    assert!(call.gamma >= 0.0 && call.vega >= 0.0);
                }
            }
        }
    }

    #[test]
    fn test_value_clamp_keeps_finite_values() {
        assert_eq!(clamp_value(-1e-15), 0.0);
        assert_eq!(clamp_value(3.25), 3.25);
    }

    #[cfg(debug_assertions)]
    #[test]
    #[should_panic(expected = "non-finite option value")]
    fn test_value_clamp_does_not_hide_nan() {
        clamp_value(f64::NAN);
    }

    #[test]
    fn test_rescaled_greeks() {
        let p = params(100.0, 100.0, 1.0, 0.2, 0.05, 0.0);
        let call = price(&p, OptionType::Call);
        assert!((call.vega_per_point() - 0.375_240_346_916_937_9).abs() < 1e-10);
        assert!((call.theta_per_day() - call.theta / 365.0).abs() < 1e-15);
    }

    #[test]
    fn test_payoff_at_expiry() {
        assert_eq!(payoff_at_expiry(120.0, 100.0, OptionType::Call), 20.0);
        assert_eq!(payoff_at_expiry(80.0, 100.0, OptionType::Put), 20.0);
        assert_eq!(payoff_at_expiry(100.0, 100.0, OptionType::Call), 0.0);
    }
}
