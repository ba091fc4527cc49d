// demos/pricing_demo.rs

//! Walk through the pricer end to end
//!
//! This demo shows how to:
//! 1. Validate inputs and price a call and a put with Greeks
//! 2. See a rejected input and the field it names
//! 3. Build a value surface on the default grid and derive position P&L
//! 4. Persist a run and replay it
//!
//! Set `RUST_LOG=bsm_surface=debug` to see the library's trace events.

use anyhow::Result;
use bsm_surface::{
    default_configs, price_checked, price_checked_pair, InMemoryRepo, OptionType, PnLSurface,
    PointOptions, Position, PricingService, RawParams, SurfaceGenerator,
};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("Black-Scholes-Merton Pricing Demo");
    println!("=================================");

    let config = default_configs::standard();
    let raw = config.defaults.to_raw();

    println!("\nStep 1: Pricing the default scenario...");
    println!(
        "  S={:?} K={:?} T={:?} sigma={:?} r={:?}",
        raw.spot, raw.strike, raw.time, raw.vol, raw.rate
    );
    let (call, put) = price_checked_pair(&raw)?;
    println!(
        "  {:<6} {:>10} {:>9} {:>9} {:>10} {:>10} {:>10}",
        "", "value", "delta", "gamma", "theta/d", "vega/pt", "rho"
    );
    for r in [call, put] {
        println!(
            "  {:<6} {:>10.4} {:>9.4} {:>9.5} {:>10.4} {:>10.4} {:>10.4}",
            r.option_type.to_string(),
            r.value,
            r.delta,
            r.gamma,
            r.theta_per_day(),
            r.vega_per_point(),
            r.rho
        );
    }

    println!("\nStep 2: Rejecting bad inputs...");
    let bad = RawParams {
        vol: Some(0.0),
        ..raw
    };
    match price_checked(&bad, OptionType::Call) {
        Ok(_) => println!("  unexpectedly accepted"),
        Err(e) => println!("  rejected {}: {}", e.field(), e),
    }

    println!("\nStep 3: Building the default surface...");
    let base = bsm_surface::validate(&raw)?;
    let generator = SurfaceGenerator::new(&config);
    let surface = generator.build_default_grid(&base, OptionType::Call)?;
    let (rows, cols) = surface.shape();
    println!("  {} spot steps × {} vol steps", rows, cols);

    let (i0, j0) = surface.reference_index(base.spot(), base.vol());
    if let Some(pnl) = PnLSurface::from_reference(&surface, i0, j0, Position::Long) {
        let pnl = pnl?;
        let (lo, hi) = pnl.range();
        println!(
            "  long call, premium {:.4} (cell {}, {}): P&L from {:.2} to {:.2}",
            pnl.premium(),
            i0,
            j0,
            lo,
            hi
        );
    }

    println!("\nStep 4: Persisting and replaying a run...");
    let service = PricingService::with_config(InMemoryRepo::new(), &config);
    let run = service.run_point(&raw, OptionType::Put, PointOptions::default())?;
    let replayed = service.replay(run.run_id)?;
    println!(
        "  run {} stored {:.6}, replayed {:.6}, identical: {}",
        run.run_id,
        run.outputs.value(),
        replayed.value,
        replayed == run.outputs.result
    );

    Ok(())
}
