//! Water Market - land and water allocation among competing crops
//!
//! A central planner commits land one unit at a time to whichever crop
//! (or fallow) has the highest net present value given the surface water
//! and groundwater still available. Water is bought surface first, then
//! groundwater at a cost that rises with the aquifer's cumulative deficit.

pub mod core;
pub mod crops;
pub mod numeric;
pub mod planner;
pub mod water;

pub use crate::core::error::{PlanError, Result};
