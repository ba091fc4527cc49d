use crate::models::bs::PricingResult;
use crate::models::OptionType;
use crate::params::RawParams;
use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Version stamped on every persisted record. Bump on breaking layout changes.
pub const SCHEMA_VERSION: u32 = 1;

/// Name recorded as the engine on stored outputs.
pub const ENGINE_NAME: &str = "bsm-closed-form";

/// Crate version recorded alongside stored outputs.
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

fn schema_version() -> u32 {
    SCHEMA_VERSION
}

macro_rules! id_newtype {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Fresh random id.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s).map(Self)
            }
        }
    };
}

id_newtype!(
    /// Identifier of one persisted pricing run.
    RunId
);
id_newtype!(
    /// Identifier of one persisted call/put surface pair.
    SurfaceId
);

/// What was asked of the engine for one point price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingInputs {
    #[serde(default = "schema_version")]
    pub schema_version: u32,
    pub run_id: RunId,
    #[serde(default)]
    pub instrument_id: Option<String>,
    pub asof_utc: DateTime<Utc>,
    pub params: RawParams,
    pub option_type: OptionType,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// What the engine returned, plus audit fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingOutputs {
    #[serde(default = "schema_version")]
    pub schema_version: u32,
    pub run_id: RunId,
    pub computed_at_utc: DateTime<Utc>,
    pub option_type: OptionType,
    pub result: PricingResult,
    pub d1: f64,
    pub d2: f64,
    pub engine: String,
    pub engine_version: String,
}

impl PricingOutputs {
    /// Option value of the run; the mark used by position P&L.
    pub fn value(&self) -> f64 {
        self.result.value
    }
}

/// One atomic computation: inputs plus outputs under a shared id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingRun {
    #[serde(default = "schema_version")]
    pub schema_version: u32,
    pub run_id: RunId,
    pub inputs: PricingInputs,
    pub outputs: PricingOutputs,
}

/// Grid and constants of a stored surface job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurfaceSpec {
    #[serde(default = "schema_version")]
    pub schema_version: u32,
    pub surface_id: SurfaceId,
    pub created_at_utc: DateTime<Utc>,
    pub spot_axis: Vec<f64>,
    pub vol_axis: Vec<f64>,
    /// Base inputs; spot and vol are overridden per cell.
    pub base: RawParams,
    pub engine: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Computed matrices of a stored surface job, indexed `[spot][vol]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurfaceData {
    #[serde(default = "schema_version")]
    pub schema_version: u32,
    pub surface_id: SurfaceId,
    pub computed_at_utc: DateTime<Utc>,
    pub call_matrix: Vec<Vec<f64>>,
    pub put_matrix: Vec<Vec<f64>>,
    pub engine_version: String,
}

/// Records that carry a schema version and travel as JSON.
pub trait Versioned: Serialize + DeserializeOwned {
    fn schema_version(&self) -> u32;

    fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).context("failed to serialize record")
    }

    /// Parse a record, refusing layouts newer than this build understands.
    fn from_json(s: &str) -> Result<Self> {
        let record: Self = serde_json::from_str(s).context("failed to parse record")?;
        if record.schema_version() > SCHEMA_VERSION {
            bail!(
                "record schema version {} is newer than supported version {}",
                record.schema_version(),
                SCHEMA_VERSION
            );
        }
        Ok(record)
    }
}

macro_rules! impl_versioned {
    ($($ty:ty),*) => {
        $(impl Versioned for $ty {
            fn schema_version(&self) -> u32 {
                self.schema_version
            }
        })*
    };
}

impl_versioned!(PricingInputs, PricingOutputs, PricingRun, SurfaceSpec, SurfaceData);
