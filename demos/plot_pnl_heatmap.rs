// Demo: plot_pnl_heatmap.rs
// Builds a P&L surface for a long call bought at today's engine price and
// renders it as a spot × volatility heatmap.
//
// Usage:
//     cargo run --example plot_pnl_heatmap -- [call|put] [long|short]
//
// The output image will be written to pnl_heatmap.svg and the raw grid to
// pnl_heatmap.csv in the working directory.

use std::env;
use std::error::Error;
use std::fs::File;

use bsm_surface::{
    default_configs, to_pnl_with_engine_premium, validate, OptionType, Position,
    SurfaceGenerator,
};
use plotters::prelude::*;
use tracing_subscriber::EnvFilter;

/// Red for losses, green for gains, white at zero.
fn pnl_color(pnl: f64, max_abs: f64) -> RGBColor {
    let x = if max_abs > 0.0 {
        (pnl / max_abs).clamp(-1.0, 1.0)
    } else {
        0.0
    };
    let fade = |t: f64| (255.0 * (1.0 - t.abs())) as u8;
    if x < 0.0 {
        RGBColor(255, fade(x), fade(x))
    } else {
        RGBColor(fade(x), 255, fade(x))
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = env::args().collect();
    let option_type: OptionType = match args.get(1) {
        Some(s) => s.parse()?,
        None => OptionType::Call,
    };
    let position = match args.get(2).map(String::as_str) {
        None | Some("long") => Position::Long,
        Some("short") => Position::Short,
        Some(other) => return Err(format!("unknown position '{}'", other).into()),
    };

    let config = default_configs::standard();
    let base = validate(&config.defaults.to_raw())?;
    let surface = SurfaceGenerator::new(&config).build_default_grid(&base, option_type)?;
    let pnl = to_pnl_with_engine_premium(&surface, position)?;

    pnl.write_csv(File::create("pnl_heatmap.csv")?)?;

    let spots = pnl.spot_axis();
    let vols = pnl.vol_axis();
    let (lo, hi) = pnl.range();
    let max_abs = lo.abs().max(hi.abs());
    println!(
        "{:?} {} premium {:.4}: P&L in [{:.2}, {:.2}]",
        position,
        option_type,
        pnl.premium(),
        lo,
        hi
    );

    // cell edges halfway between axis points
    let half_step = |axis: &[f64]| {
        if axis.len() > 1 {
            (axis[1] - axis[0]) / 2.0
        } else {
            0.5
        }
    };
    let (ds, dv) = (half_step(spots), half_step(vols));
    let (s_min, s_max) = (spots[0] - ds, spots[spots.len() - 1] + ds);
    let (v_min, v_max) = (vols[0] - dv, vols[vols.len() - 1] + dv);

    let root = SVGBackend::new("pnl_heatmap.svg", (1280, 768)).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .margin(20)
        .caption(
            format!(
                "{:?} {} P&L | K={} T={}y premium={:.2}",
                position,
                option_type,
                base.strike(),
                base.time(),
                pnl.premium()
            ),
            ("sans-serif", 30),
        )
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(s_min..s_max, (v_min * 100.0)..(v_max * 100.0))?;

    chart
        .configure_mesh()
        .disable_mesh()
        .x_desc("Spot")
        .y_desc("Volatility (%)")
        .draw()?;

    chart.draw_series(pnl.values().iter().zip(spots).flat_map(|(row, &s)| {
        row.iter().zip(vols).map(move |(&v_pnl, &v)| {
            Rectangle::new(
                [((s - ds), (v - dv) * 100.0), ((s + ds), (v + dv) * 100.0)],
                pnl_color(v_pnl, max_abs).filled(),
            )
        })
    }))?;

    // base scenario
    chart.draw_series(std::iter::once(Circle::new(
        (base.spot(), base.vol() * 100.0),
        4,
        BLACK.filled(),
    )))?;

    root.present()?;
    println!("Chart saved to pnl_heatmap.svg, grid saved to pnl_heatmap.csv");
    Ok(())
}
