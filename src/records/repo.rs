use crate::records::types::{PricingRun, RunId, SurfaceData, SurfaceId, SurfaceSpec};
use anyhow::{anyhow, Result};
use std::collections::HashMap;
use std::sync::RwLock;

/// Storage for pricing runs and surfaces.
///
/// Saving under an existing id replaces the stored record and makes it the newest.
pub trait Repo {
    fn save_pricing_run(&self, run: &PricingRun) -> Result<()>;
    fn get_pricing_run(&self, run_id: RunId) -> Result<Option<PricingRun>>;
    /// Ids of the most recent runs, newest first.
    fn list_pricing_runs(&self, limit: usize) -> Result<Vec<RunId>>;

    fn save_surface(&self, spec: &SurfaceSpec, data: &SurfaceData) -> Result<()>;
    fn get_surface(&self, surface_id: SurfaceId) -> Result<Option<(SurfaceSpec, SurfaceData)>>;
}

impl<R: Repo + ?Sized> Repo for &R {
    fn save_pricing_run(&self, run: &PricingRun) -> Result<()> {
        (**self).save_pricing_run(run)
    }

    fn get_pricing_run(&self, run_id: RunId) -> Result<Option<PricingRun>> {
        (**self).get_pricing_run(run_id)
    }

    fn list_pricing_runs(&self, limit: usize) -> Result<Vec<RunId>> {
        (**self).list_pricing_runs(limit)
    }

    fn save_surface(&self, spec: &SurfaceSpec, data: &SurfaceData) -> Result<()> {
        (**self).save_surface(spec, data)
    }

    fn get_surface(&self, surface_id: SurfaceId) -> Result<Option<(SurfaceSpec, SurfaceData)>> {
        (**self).get_surface(surface_id)
    }
}

#[derive(Debug, Default)]
struct Store {
    runs: HashMap<RunId, PricingRun>,
    /// Insertion order, oldest first.
    run_order: Vec<RunId>,
    surfaces: HashMap<SurfaceId, (SurfaceSpec, SurfaceData)>,
}

/// Process-local [`Repo`]. Safe to share between threads.
#[derive(Debug, Default)]
pub struct InMemoryRepo {
    store: RwLock<Store>,
}

impl InMemoryRepo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn run_count(&self) -> Result<usize> {
        Ok(self.read()?.runs.len())
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, Store>> {
        self.store
            .read()
            .map_err(|e| anyhow!("repo lock poisoned: {e}"))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, Store>> {
        self.store
            .write()
            .map_err(|e| anyhow!("repo lock poisoned: {e}"))
    }
}

impl Repo for InMemoryRepo {
    fn save_pricing_run(&self, run: &PricingRun) -> Result<()> {
        let mut store = self.write()?;
        if store.runs.insert(run.run_id, run.clone()).is_some() {
            store.run_order.retain(|id| *id != run.run_id);
        }
        store.run_order.push(run.run_id);
        Ok(())
    }

    fn get_pricing_run(&self, run_id: RunId) -> Result<Option<PricingRun>> {
        Ok(self.read()?.runs.get(&run_id).cloned())
    }

    fn list_pricing_runs(&self, limit: usize) -> Result<Vec<RunId>> {
        Ok(self.read()?.run_order.iter().rev().take(limit).copied().collect())
    }

    fn save_surface(&self, spec: &SurfaceSpec, data: &SurfaceData) -> Result<()> {
        if spec.surface_id != data.surface_id {
            return Err(anyhow!(
                "surface id mismatch: spec {} vs data {}",
                spec.surface_id,
                data.surface_id
            ));
        }
        self.write()?
            .surfaces
            .insert(spec.surface_id, (spec.clone(), data.clone()));
        Ok(())
    }

    fn get_surface(&self, surface_id: SurfaceId) -> Result<Option<(SurfaceSpec, SurfaceData)>> {
        Ok(self.read()?.surfaces.get(&surface_id).cloned())
    }
}
