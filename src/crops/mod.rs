//! Crop models and the candidate crop set

pub mod catalog;
pub mod crop;
pub mod production;

pub use catalog::CropSet;
pub use crop::{Crop, CropKind, UnitCost, FALLOW};
pub use production::ProductionFunction;
