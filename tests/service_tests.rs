
use bsm_surface::records::{PricingRun, SurfaceData, SurfaceSpec, Versioned};
use bsm_surface::{
    InMemoryRepo, OptionType, PointOptions, PricerConfig, PricingService, RawParams, Repo,
    RunId, SurfaceOptions, ValidationError,
};
use chrono::{TimeZone, Utc};
use test_utils::{assert_close, reference_raw};

fn fixed_options(tag: &str) -> PointOptions {
    PointOptions {
        asof_utc: Some(Utc.with_ymd_and_hms(2026, 1, 30, 0, 0, 0).unwrap()),
        tags: vec![tag.to_string()],
        ..PointOptions::default()
    }
}

/// A stored run reads back unchanged and replays to the same bits.
#[test]
fn test_replay_matches_persisted_run() {
    let svc = PricingService::new(InMemoryRepo::new());
    let run = svc
        .run_point(&reference_raw(), OptionType::Call, fixed_options("replay-test"))
        .unwrap();

    let stored = svc.repo().get_pricing_run(run.run_id).unwrap().unwrap();
    assert_eq!(stored, run);

    let replayed = svc.replay(run.run_id).unwrap();
    assert_eq!(replayed, stored.outputs.result);
    assert_close(replayed.value, 10.450583572185565, 1e-10, "replayed call value");
}

#[test]
fn test_run_point_records_metadata() {
    let svc = PricingService::new(InMemoryRepo::new());
    let raw = reference_raw().with_div_yield(0.01);
    let opts = PointOptions {
        instrument_id: Some("ACME-C-100".to_string()),
        notes: Some("desk check".to_string()),
        ..fixed_options("eod")
    };
    let run = svc.run_point(&raw, OptionType::Put, opts).unwrap();

    assert_eq!(run.inputs.run_id, run.run_id);
    assert_eq!(run.outputs.run_id, run.run_id);
    assert_eq!(run.inputs.params, raw);
    assert_eq!(run.inputs.instrument_id.as_deref(), Some("ACME-C-100"));
    assert_eq!(run.outputs.option_type, OptionType::Put);
    assert_eq!(run.outputs.engine_version, env!("CARGO_PKG_VERSION"));
    assert_close(run.outputs.d2, run.outputs.d1 - 0.2, 1e-12, "d2 = d1 - σ√T");
}

/// A run missing q is stored with q made explicit.
#[test]
fn test_stored_inputs_are_normalized() {
    let svc = PricingService::new(InMemoryRepo::new());
    let run = svc
        .run_point(&reference_raw(), OptionType::Call, PointOptions::default())
        .unwrap();
    assert_eq!(run.inputs.params.div_yield, Some(0.0));
}

/// Invalid inputs never reach storage.
#[test]
fn test_invalid_inputs_not_persisted() {
    let svc = PricingService::new(InMemoryRepo::new());
    let raw = RawParams {
        strike: None,
        ..reference_raw()
    };
    let err = svc
        .run_point(&raw, OptionType::Call, PointOptions::default())
        .unwrap_err();
    assert!(err.downcast_ref::<ValidationError>().is_some());
    assert_eq!(svc.repo().run_count().unwrap(), 0);
}

#[test]
fn test_replay_unknown_run_fails() {
    let svc = PricingService::new(InMemoryRepo::new());
    assert!(svc.replay(RunId::new()).is_err());
}

/// Listing returns newest first and honours the limit.
#[test]
fn test_list_runs_newest_first() {
    let svc = PricingService::new(InMemoryRepo::new());
    let ids: Vec<RunId> = (0..3)
        .map(|_| {
            svc.run_point(&reference_raw(), OptionType::Call, PointOptions::default())
                .unwrap()
                .run_id
        })
        .collect();

    let listed = svc.repo().list_pricing_runs(2).unwrap();
    assert_eq!(listed, vec![ids[2], ids[1]]);

    // re-saving an old run makes it the newest
    let first = svc.repo().get_pricing_run(ids[0]).unwrap().unwrap();
    svc.repo().save_pricing_run(&first).unwrap();
    assert_eq!(svc.repo().list_pricing_runs(10).unwrap(), vec![ids[0], ids[2], ids[1]]);
}

/// Surfaces are stored as call/put matrices indexed [spot][vol].
#[test]
fn test_run_surface_persists_both_matrices() {
    let svc = PricingService::new(InMemoryRepo::new());
    let spots = [90.0, 100.0, 110.0];
    let vols = [0.1, 0.2];
    let (spec, data) = svc
        .run_surface(&reference_raw(), &spots, &vols, SurfaceOptions::default())
        .unwrap();

    assert_eq!(spec.surface_id, data.surface_id);
    assert_eq!(data.call_matrix.len(), 3);
    assert_eq!(data.put_matrix[0].len(), 2);
    assert_close(data.call_matrix[1][1], 10.450583572185565, 1e-10, "ATM call cell");

    let (spec_db, data_db) = svc.repo().get_surface(spec.surface_id).unwrap().unwrap();
    assert_eq!(spec_db, spec);
    assert_eq!(data_db, data);
}

/// Surface requests obey the service's configured bounds.
#[test]
fn test_service_config_applies_to_surfaces() {
    let svc = PricingService::with_config(InMemoryRepo::new(), &PricerConfig::strict());
    let err = svc
        .run_surface(&reference_raw(), &[100.0, 600.0], &[0.2], SurfaceOptions::default())
        .unwrap_err();
    assert!(err.downcast_ref::<ValidationError>().is_some());
}

/// Records survive a JSON round trip.
#[test]
fn test_records_json_round_trip() {
    let svc = PricingService::new(InMemoryRepo::new());
    let run = svc
        .run_point(&reference_raw(), OptionType::Call, fixed_options("json"))
        .unwrap();
    let back = PricingRun::from_json(&run.to_json().unwrap()).unwrap();
    assert_eq!(back, run);

    let (spec, data) = svc
        .run_surface(&reference_raw(), &[100.0], &[0.2], SurfaceOptions::default())
        .unwrap();
    assert_eq!(SurfaceSpec::from_json(&spec.to_json().unwrap()).unwrap(), spec);
    assert_eq!(SurfaceData::from_json(&data.to_json().unwrap()).unwrap(), data);
}

/// The option type is stored with its short code.
#[test]
fn test_option_type_wire_format() {
    let svc = PricingService::new(InMemoryRepo::new());
    let run = svc
        .run_point(&reference_raw(), OptionType::Put, PointOptions::default())
        .unwrap();
    let json: serde_json::Value = serde_json::from_str(&run.to_json().unwrap()).unwrap();
    assert_eq!(json["inputs"]["option_type"], "P");
    assert_eq!(json["run_id"], run.run_id.to_string());
}
