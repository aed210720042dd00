//! Surface-then-ground water bidding

use serde::{Deserialize, Serialize};

use crate::core::error::{PlanError, Result};
use crate::water::ground::Groundwater;
use crate::water::surface::Surfacewater;

/// Quantity a pool would deliver for a request, and what it would cost
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Bid {
    pub quantity: f64,
    pub cost: f64,
}

impl Bid {
    pub const NONE: Bid = Bid {
        quantity: 0.0,
        cost: 0.0,
    };

    pub fn new(quantity: f64, cost: f64) -> Self {
        Self { quantity, cost }
    }
}

/// Result of pricing one crop's net demand against both pools
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct WaterAllocation {
    pub surface: Bid,
    pub ground: Bid,
}

impl WaterAllocation {
    pub fn quantity(&self) -> f64 {
        self.surface.quantity + self.ground.quantity
    }

    pub fn cost(&self) -> f64 {
        self.surface.cost + self.ground.cost
    }
}

/// Crop water demand (ETc): `eto * kc`
pub fn demand(eto: f64, kc: f64) -> f64 {
    eto * kc
}

/// Price `demand - precipitation` against surface water, then groundwater
///
/// Surface water is always bid first; only the shortfall goes to
/// groundwater. Nothing is bought when precipitation covers demand. Neither
/// pool is mutated.
pub fn allocate(
    demand: f64,
    precipitation: f64,
    surface: &Surfacewater,
    ground: &Groundwater,
) -> Result<WaterAllocation> {
    if !demand.is_finite() || demand < 0.0 {
        return Err(PlanError::invalid(format!(
            "demand must be finite and non-negative, got {}",
            demand
        )));
    }
    if !precipitation.is_finite() || precipitation < 0.0 {
        return Err(PlanError::invalid(format!(
            "precipitation must be finite and non-negative, got {}",
            precipitation
        )));
    }

    let net = demand - precipitation;
    if net <= 0.0 {
        return Ok(WaterAllocation::default());
    }

    let sw = surface.bid(net);
    let shortfall = if sw.quantity < net { net - sw.quantity } else { 0.0 };
    Ok(WaterAllocation {
        surface: sw,
        ground: ground.bid(shortfall),
    })
}
