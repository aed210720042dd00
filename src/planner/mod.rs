//! Land allocation planning

pub mod central;
pub mod output;
pub mod portfolio;

pub use central::{portion_met, CentralPlanner, PlanPhase, PlanRun, NO_WATER_NPV};
pub use output::{AllocationRecord, AllocationTable};
pub use portfolio::Portfolio;
