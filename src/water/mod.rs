//! Water resources and the bidding protocol
//!
//! Surface water is a refillable pool sold at a flat unit cost. Groundwater
//! carries a cumulative deficit and gets more expensive the deeper it is
//! drawn down. Crops price their demand against both with [`allocate`],
//! which never mutates anything; the planner delivers and pumps only after
//! it has committed a land unit.

pub mod allocation;
pub mod ground;
pub mod surface;

pub use allocation::{allocate, demand, Bid, WaterAllocation};
pub use ground::Groundwater;
pub use surface::Surfacewater;

/// Slack allowed when a committed draw is checked against a pool limit.
/// Bids are computed from the same state, so any overshoot is rounding.
pub const QUANTITY_TOLERANCE: f64 = 1e-9;

pub(crate) fn within_tolerance(excess: f64, scale: f64) -> bool {
    excess <= QUANTITY_TOLERANCE * scale.abs().max(1.0)
}
