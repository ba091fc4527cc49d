
use bsm_surface::{
    pnl_surface, price, to_pnl, to_pnl_with_engine_premium, value_surface, AxisRange, Field,
    OptionType, PnLSurface, Position, PricerConfig, RawParams, SurfaceGenerator, ValidationError,
};
use test_utils::{assert_close, random_raw, reference_raw, reference_record, seeded_rng};

/// The default grid spans 50%..150% of spot and 5%..50% volatility.
#[test]
fn test_default_grid_shape_and_bounds() {
    let gen = SurfaceGenerator::default();
    let surface = gen
        .build_default_grid(&reference_record(), OptionType::Call)
        .unwrap();

    assert_eq!(surface.shape(), (50, 20));
    assert_eq!(surface.values().len(), 50);
    assert!(surface.values().iter().all(|row| row.len() == 20));
    assert_eq!(surface.spot_axis().first(), Some(&50.0));
    assert_eq!(surface.spot_axis().last(), Some(&150.0));
    assert_eq!(surface.vol_axis().first(), Some(&0.05));
    assert_eq!(surface.vol_axis().last(), Some(&0.5));
}

/// Every cell equals pricing the shocked record directly.
#[test]
fn test_cells_equal_direct_pricing() {
    let gen = SurfaceGenerator::default();
    let mut rng = seeded_rng();
    let spots = [70.0, 95.5, 100.0, 131.0];
    let vols = [0.35, 0.1, 0.6];

    for _ in 0..20 {
        let base = bsm_surface::validate(&random_raw(&mut rng)).unwrap();
        for ot in OptionType::BOTH {
            let surface = gen.build(&base, &spots, &vols, ot).unwrap();
            for (i, &s) in spots.iter().enumerate() {
                for (j, &v) in vols.iter().enumerate() {
                    let direct = price(&gen.validator().shock(&base, s, v).unwrap(), ot).value;
                    assert_eq!(surface.value_at(i, j), Some(direct), "cell ({}, {})", i, j);
                }
            }
        }
    }
}

/// A pair build produces the same matrices as two single builds.
#[test]
fn test_pair_build_matches_single_builds() {
    let gen = SurfaceGenerator::default();
    let base = reference_record();
    let spots = [80.0, 100.0, 120.0];
    let vols = [0.15, 0.25];

    let (call, put) = gen.build_pair(&base, &spots, &vols).unwrap();
    let call_single = gen.build(&base, &spots, &vols, OptionType::Call).unwrap();
    let put_single = gen.build(&base, &spots, &vols, OptionType::Put).unwrap();

    assert_eq!(call.values(), call_single.values());
    assert_eq!(put.values(), put_single.values());
    assert_eq!(call.option_type(), OptionType::Call);
    assert_eq!(put.option_type(), OptionType::Put);
}

/// One bad axis value fails the whole request; no partial surface is returned.
#[test]
fn test_bad_axes_rejected() {
    let raw = reference_raw();

    let err = value_surface(&raw, &[100.0, -1.0], &[0.2], OptionType::Call).unwrap_err();
    assert_eq!(err.field(), Field::Spot);

    let err = value_surface(&raw, &[100.0], &[0.2, f64::NAN], OptionType::Put).unwrap_err();
    assert!(matches!(
        err,
        ValidationError::NonFinite {
            field: Field::Volatility,
            ..
        }
    ));

    let err = value_surface(&raw, &[], &[0.2], OptionType::Call).unwrap_err();
    assert_eq!(err, ValidationError::EmptyAxis { field: Field::Spot });

    let long_axis: Vec<f64> = (1..=1001).map(|i| i as f64).collect();
    let err = value_surface(&raw, &long_axis, &[0.2], OptionType::Call).unwrap_err();
    assert!(matches!(err, ValidationError::AxisTooLong { len: 1001, .. }));
}

/// Axis values are held to the generator's configured bounds.
#[test]
fn test_strict_config_bounds_axes() {
    let gen = SurfaceGenerator::new(&PricerConfig::strict());
    let err = gen
        .build(&reference_record(), &[100.0], &[0.2, 2.5], OptionType::Call)
        .unwrap_err();
    assert!(matches!(
        err,
        ValidationError::OutOfRange {
            field: Field::Volatility,
            max,
            ..
        } if max == 2.0
    ));

    // the default generator accepts the same grid
    assert!(SurfaceGenerator::default()
        .build(&reference_record(), &[100.0], &[0.2, 2.5], OptionType::Call)
        .is_ok());
}

/// A base accepted under wide bounds is re-checked by a generator with tighter ones.
#[test]
fn test_strict_generator_rechecks_base() {
    let wide = bsm_surface::validate(&RawParams::new(100.0, 100.0, 50.0, 0.2, 0.5)).unwrap();
    let gen = SurfaceGenerator::new(&PricerConfig::strict());

    let err = gen
        .build(&wide, &[100.0], &[0.2], OptionType::Call)
        .unwrap_err();
    assert!(
        matches!(err, ValidationError::OutOfRange { field: Field::Time, .. }),
        "expected T out of range, got {err:?}"
    );
    assert!(gen.build_pair(&wide, &[100.0], &[0.2]).is_err());
    assert!(gen
        .build_default_grid(&wide, OptionType::Put)
        .is_err());
}

#[test]
fn test_build_from_ranges() {
    let gen = SurfaceGenerator::default();
    let surface = gen
        .build_from_ranges(
            &reference_record(),
            AxisRange::new(80.0, 120.0, 5),
            AxisRange::new(0.1, 0.3, 3),
            OptionType::Put,
        )
        .unwrap();
    assert_eq!(surface.spot_axis(), &[80.0, 90.0, 100.0, 110.0, 120.0]);
    assert_eq!(surface.shape(), (5, 3));

    let err = gen
        .build_from_ranges(
            &reference_record(),
            AxisRange::new(120.0, 80.0, 5),
            AxisRange::new(0.1, 0.3, 3),
            OptionType::Put,
        )
        .unwrap_err();
    assert_eq!(err.field(), Field::Spot);
}

/// The cell used as the premium reference nets to zero P&L.
#[test]
fn test_pnl_zero_at_reference_cell() {
    let surface = SurfaceGenerator::default()
        .build_default_grid(&reference_record(), OptionType::Call)
        .unwrap();
    let (i0, j0) = surface.reference_index(100.0, 0.2);

    for position in [Position::Long, Position::Short] {
        let pnl = PnLSurface::from_reference(&surface, i0, j0, position)
            .expect("reference cell is on the grid")
            .unwrap();
        assert_eq!(pnl.value_at(i0, j0), Some(0.0));
        assert_eq!(pnl.shape(), surface.shape());
    }
}

/// Long P&L is value minus premium; short is its negation.
#[test]
fn test_pnl_sign_convention() {
    let spots = [90.0, 110.0];
    let vols = [0.2];
    let raw = reference_raw();
    let premium = 6.0;

    let pnl = |position| {
        pnl_surface(&raw, &spots, &vols, OptionType::Put, premium, position).unwrap()
    };
    let (long, short) = (pnl(Position::Long), pnl(Position::Short));
    let values = value_surface(&raw, &spots, &vols, OptionType::Put).unwrap();

    for i in 0..2 {
        let v = values.value_at(i, 0).unwrap();
        assert_close(long.value_at(i, 0).unwrap(), v - premium, 1e-12, "long pnl");
        assert_close(short.value_at(i, 0).unwrap(), premium - v, 1e-12, "short pnl");
    }
    // the put loses value as spot rises
    assert!(long.value_at(0, 0) > long.value_at(1, 0));
}

/// Premium priced by the engine at the base record.
#[test]
fn test_engine_premium() {
    let surface =
        value_surface(&reference_raw(), &[90.0, 100.0], &[0.2, 0.3], OptionType::Call).unwrap();
    let pnl = to_pnl_with_engine_premium(&surface, Position::Long).unwrap();
    assert_close(pnl.premium(), 10.450583572185565, 1e-10, "engine premium");
    assert_eq!(pnl.value_at(1, 0), Some(0.0));
    let (lo, hi) = pnl.range();
    assert!(lo < 0.0 && hi > 0.0);
}

#[test]
fn test_negative_premium_rejected() {
    let surface = value_surface(&reference_raw(), &[100.0], &[0.2], OptionType::Call).unwrap();
    let err = to_pnl(&surface, -0.01, Position::Long).unwrap_err();
    assert_eq!(err.field(), Field::Premium);
}

/// CSV exports carry one row per cell in long format.
#[test]
fn test_csv_exports() {
    let spots = [90.0, 110.0];
    let vols = [0.1, 0.2, 0.3];
    let surface = value_surface(&reference_raw(), &spots, &vols, OptionType::Call).unwrap();
    let mut buf = Vec::new();
    surface.write_csv(&mut buf).unwrap();
    let text = String::from_utf8(buf).unwrap();
    assert_eq!(text.lines().count(), 7);

    let pnl = to_pnl(&surface, 5.0, Position::Short).unwrap();
    let mut buf = Vec::new();
    pnl.write_csv(&mut buf).unwrap();
    let text = String::from_utf8(buf).unwrap();
    assert_eq!(text.lines().next(), Some("spot,vol,pnl"));
    assert!(text.lines().nth(1).unwrap().starts_with("90,0.1,"));
}

/// Surfaces serialize with their axes and matrix.
#[test]
fn test_surface_serializes() {
    let surface = value_surface(&reference_raw(), &[100.0], &[0.2], OptionType::Call).unwrap();
    let json = serde_json::to_value(&surface).unwrap();
    assert_eq!(json["spot_axis"], serde_json::json!([100.0]));
    assert_eq!(json["values"][0].as_array().map(|r| r.len()), Some(1));
}
