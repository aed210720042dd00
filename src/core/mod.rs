pub mod config;
pub mod error;
pub mod types;

pub use config::{Scenario, ScenarioConfig};
pub use error::{PlanError, Result};
pub use types::{CropId, Drivers, Series};
