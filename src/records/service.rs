use crate::models::bs::{price_pair, PricingResult, Terms};
use crate::models::OptionType;
use crate::params::{PricerConfig, RawParams, Validator};
use crate::records::repo::Repo;
use crate::records::types::{
    PricingInputs, PricingOutputs, PricingRun, RunId, SurfaceData, SurfaceId, SurfaceSpec,
    ENGINE_NAME, ENGINE_VERSION, SCHEMA_VERSION,
};
use crate::surface::SurfaceGenerator;
use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};

/// Caller-supplied metadata for [`PricingService::run_point`].
#[derive(Debug, Clone, Default)]
pub struct PointOptions {
    /// Fixed id; a fresh one is generated when `None`.
    pub run_id: Option<RunId>,
    pub instrument_id: Option<String>,
    /// As-of time; now when `None`.
    pub asof_utc: Option<DateTime<Utc>>,
    pub tags: Vec<String>,
    pub notes: Option<String>,
}

/// Caller-supplied metadata for [`PricingService::run_surface`].
#[derive(Debug, Clone, Default)]
pub struct SurfaceOptions {
    pub surface_id: Option<SurfaceId>,
    pub created_at_utc: Option<DateTime<Utc>>,
    pub tags: Vec<String>,
    pub notes: Option<String>,
}

/// Validates, prices and persists; the one place where pricing meets storage.
pub struct PricingService<R: Repo> {
    repo: R,
    validator: Validator,
    generator: SurfaceGenerator,
}

impl<R: Repo> PricingService<R> {
    pub fn new(repo: R) -> Self {
        Self::with_config(repo, &PricerConfig::default())
    }

    pub fn with_config(repo: R, config: &PricerConfig) -> Self {
        Self {
            repo,
            validator: Validator::new(config.bounds),
            generator: SurfaceGenerator::new(config),
        }
    }

    pub fn repo(&self) -> &R {
        &self.repo
    }

    /// Price one point and persist the run.
    ///
    /// The stored inputs are the validated values (dividend yield made
    /// explicit), so a replay sees exactly what the engine saw.
    pub fn run_point(
        &self,
        raw: &RawParams,
        option_type: OptionType,
        opts: PointOptions,
    ) -> Result<PricingRun> {
        let record = self.validator.validate(raw)?;
        let run_id = opts.run_id.unwrap_or_default();
        let asof_utc = opts.asof_utc.unwrap_or_else(Utc::now);

        let terms = Terms::new(&record);
        let result = terms.result(option_type);

        let run = PricingRun {
            schema_version: SCHEMA_VERSION,
            run_id,
            inputs: PricingInputs {
                schema_version: SCHEMA_VERSION,
                run_id,
                instrument_id: opts.instrument_id,
                asof_utc,
                params: RawParams::from(record),
                option_type,
                tags: opts.tags,
                notes: opts.notes,
            },
            outputs: PricingOutputs {
                schema_version: SCHEMA_VERSION,
                run_id,
                computed_at_utc: Utc::now(),
                option_type,
                result,
                d1: terms.d1,
                d2: terms.d2,
                engine: ENGINE_NAME.to_string(),
                engine_version: ENGINE_VERSION.to_string(),
            },
        };

        self.repo
            .save_pricing_run(&run)
            .with_context(|| format!("failed to save pricing run {run_id}"))?;
        tracing::info!(%run_id, %option_type, value = result.value, "pricing run saved");
        Ok(run)
    }

    /// Build call and put surfaces over the given axes and persist both.
    pub fn run_surface(
        &self,
        base: &RawParams,
        spot_axis: &[f64],
        vol_axis: &[f64],
        opts: SurfaceOptions,
    ) -> Result<(SurfaceSpec, SurfaceData)> {
        let record = self.validator.validate(base)?;
        let (call, put) = self.generator.build_pair(&record, spot_axis, vol_axis)?;
        let surface_id = opts.surface_id.unwrap_or_default();

        let spec = SurfaceSpec {
            schema_version: SCHEMA_VERSION,
            surface_id,
            created_at_utc: opts.created_at_utc.unwrap_or_else(Utc::now),
            spot_axis: spot_axis.to_vec(),
            vol_axis: vol_axis.to_vec(),
            base: RawParams::from(record),
            engine: ENGINE_NAME.to_string(),
            tags: opts.tags,
            notes: opts.notes,
        };
        let data = SurfaceData {
            schema_version: SCHEMA_VERSION,
            surface_id,
            computed_at_utc: Utc::now(),
            call_matrix: call.values().to_vec(),
            put_matrix: put.values().to_vec(),
            engine_version: ENGINE_VERSION.to_string(),
        };

        self.repo
            .save_surface(&spec, &data)
            .with_context(|| format!("failed to save surface {surface_id}"))?;
        let (rows, cols) = call.shape();
        tracing::info!(%surface_id, rows, cols, "surface saved");
        Ok((spec, data))
    }

    /// Recompute a stored run from its persisted inputs.
    pub fn replay(&self, run_id: RunId) -> Result<PricingResult> {
        let run = self
            .repo
            .get_pricing_run(run_id)?
            .ok_or_else(|| anyhow!("pricing run not found: {run_id}"))?;
        let record = self
            .validator
            .validate(&run.inputs.params)
            .with_context(|| format!("stored inputs of run {run_id} no longer validate"))?;
        let option_type = run.inputs.option_type;
        let fresh = Terms::new(&record).result(option_type);

        if fresh != run.outputs.result {
            tracing::warn!(
                %run_id,
                stored = run.outputs.value(),
                replayed = fresh.value,
                "replay differs from stored run"
            );
        }
        Ok(fresh)
    }

    /// Call and put results without persisting anything.
    pub fn quote(&self, raw: &RawParams) -> Result<(PricingResult, PricingResult)> {
        let record = self.validator.validate(raw)?;
        Ok(price_pair(&record))
    }
}
