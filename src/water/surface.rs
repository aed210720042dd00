//! Surface water pool
//!
//! Re-supplied once per planning run and depleted by every committed unit.
//! Delivery is linear in quantity: there is no scarcity premium.

use serde::{Deserialize, Serialize};

use crate::core::error::{PlanError, Result};
use crate::water::allocation::Bid;
use crate::water::within_tolerance;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Surfacewater {
    available: f64,
    unit_cost: f64,
}

impl Surfacewater {
    pub fn new(available: f64, unit_cost: f64) -> Result<Self> {
        check_quantity("available", available)?;
        if !unit_cost.is_finite() || unit_cost < 0.0 {
            return Err(PlanError::invalid(format!(
                "surface water unit_cost must be finite and non-negative, got {}",
                unit_cost
            )));
        }
        Ok(Self { available, unit_cost })
    }

    /// Current deliverable quantity
    pub fn available(&self) -> f64 {
        self.available
    }

    pub fn unit_cost(&self) -> f64 {
        self.unit_cost
    }

    /// Reset availability to `q`
    pub fn supply(&mut self, q: f64) -> Result<()> {
        check_quantity("supply", q)?;
        self.available = q;
        Ok(())
    }

    /// Remove `q` from the pool
    ///
    /// Fails rather than going negative.
    pub fn deliver(&mut self, q: f64) -> Result<()> {
        check_quantity("delivery", q)?;
        let excess = q - self.available;
        if excess > 0.0 {
            if !within_tolerance(excess, self.available) {
                return Err(PlanError::invalid(format!(
                    "cannot deliver {} with only {} surface water available",
                    q, self.available
                )));
            }
            self.available = 0.0;
            return Ok(());
        }
        self.available -= q;
        Ok(())
    }

    /// Price a request of `q` against the current pool
    ///
    /// Quantity is `min(available, q)` at `unit_cost` per unit. A
    /// non-positive request buys nothing.
    pub fn bid(&self, q: f64) -> Bid {
        if q.is_nan() || q <= 0.0 {
            return Bid::NONE;
        }
        let quantity = self.available.min(q);
        Bid::new(quantity, self.unit_cost * quantity)
    }
}

impl Default for Surfacewater {
    fn default() -> Self {
        Self {
            available: 0.0,
            unit_cost: 1.0,
        }
    }
}

fn check_quantity(what: &str, q: f64) -> Result<()> {
    if !q.is_finite() || q < 0.0 {
        return Err(PlanError::invalid(format!(
            "surface water {} must be finite and non-negative, got {}",
            what, q
        )));
    }
    Ok(())
}
