//! Persisted pricing runs and surfaces, the storage seam, and the service
//! that ties validation, pricing and storage together.

pub mod repo;
pub mod service;
pub mod types;

pub use repo::{InMemoryRepo, Repo};
pub use service::{PointOptions, PricingService, SurfaceOptions};
pub use types::{
    PricingInputs, PricingOutputs, PricingRun, RunId, SurfaceData, SurfaceId, SurfaceSpec,
    Versioned, SCHEMA_VERSION,
};
