pub mod config;
pub mod types;
pub mod validation;

pub use config::{AxisRange, Bound, DefaultParams, GridConfig, ParamBounds, PricerConfig};
pub use types::{Field, ParameterRecord, RawParams};
pub use validation::{validate, ValidationError, Validator};
