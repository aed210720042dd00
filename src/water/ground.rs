//! Groundwater aquifer with a deficit-dependent pumping cost
//!
//! `deficit` is cumulative net draw-down. Negative values are a surplus
//! credit left by recharge; drawing against that credit costs the curve's
//! value at zero deficit. Beyond it, the cost of a draw is the area under the
//! marginal cost curve across the deficit range it traverses, so the same
//! quantity gets more expensive as the aquifer is drawn down.

use std::fmt;
use std::sync::Arc;

use crate::core::error::{PlanError, Result};
use crate::numeric::{Exponential, MarginalCost};
use crate::water::allocation::Bid;
use crate::water::within_tolerance;

#[derive(Clone)]
pub struct Groundwater {
    active: bool,
    deficit: f64,
    max_deficit: f64,
    sustainable_yield: f64,
    pump_cost: Arc<dyn MarginalCost>,
}

impl Groundwater {
    /// Active aquifer at zero deficit, no deficit ceiling and no recharge
    pub fn new(pump_cost: impl MarginalCost + 'static) -> Self {
        Self {
            active: true,
            deficit: 0.0,
            max_deficit: f64::INFINITY,
            sustainable_yield: 0.0,
            pump_cost: Arc::new(pump_cost),
        }
    }

    /// Pumping disabled: every bid and pump is a no-op
    pub fn inactive() -> Self {
        Self {
            active: false,
            ..Self::default()
        }
    }

    pub fn with_active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    pub fn with_deficit(mut self, deficit: f64) -> Result<Self> {
        if !deficit.is_finite() {
            return Err(PlanError::invalid(format!("deficit must be finite, got {}", deficit)));
        }
        check_ceiling(deficit, self.max_deficit)?;
        self.deficit = deficit;
        Ok(self)
    }

    /// Ceiling on the deficit. May be infinite; never below the current deficit.
    pub fn with_max_deficit(mut self, max_deficit: f64) -> Result<Self> {
        if max_deficit.is_nan() {
            return Err(PlanError::invalid("max_deficit must not be NaN"));
        }
        check_ceiling(self.deficit, max_deficit)?;
        self.max_deficit = max_deficit;
        Ok(self)
    }

    pub fn with_sustainable_yield(mut self, sustainable_yield: f64) -> Result<Self> {
        if !sustainable_yield.is_finite() || sustainable_yield < 0.0 {
            return Err(PlanError::invalid(format!(
                "sustainable_yield must be finite and non-negative, got {}",
                sustainable_yield
            )));
        }
        self.sustainable_yield = sustainable_yield;
        Ok(self)
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn deficit(&self) -> f64 {
        self.deficit
    }

    pub fn max_deficit(&self) -> f64 {
        self.max_deficit
    }

    pub fn sustainable_yield(&self) -> f64 {
        self.sustainable_yield
    }

    /// Deficit that can still be added before hitting the ceiling
    pub fn headroom(&self) -> f64 {
        (self.max_deficit - self.deficit).max(0.0)
    }

    /// Marginal pumping cost at the current deficit
    pub fn marginal_cost(&self) -> f64 {
        self.pump_cost.at(self.deficit.max(0.0))
    }

    /// Price a request of `q` against the current deficit
    ///
    /// Surplus credit is drawn first at the zero-deficit rate. The remainder
    /// is capped by the headroom left after the surplus is used and costed
    /// by integrating the pump cost curve over the deficit it adds.
    pub fn bid(&self, q: f64) -> Bid {
        if !self.active || q.is_nan() || q <= 0.0 {
            return Bid::NONE;
        }

        let surplus = if self.deficit < 0.0 { q.min(-self.deficit) } else { 0.0 };
        let start = self.deficit + surplus;
        let pumped = (q - surplus).min((self.max_deficit - start).max(0.0)).max(0.0);

        let mut cost = self.pump_cost.at(0.0) * surplus;
        if pumped > 0.0 {
            let from = start.max(0.0);
            cost += self.pump_cost.integral(from, from + pumped);
        }
        Bid::new(surplus + pumped, cost)
    }

    /// Add `q` to the deficit
    pub fn pump(&mut self, q: f64) -> Result<()> {
        if !q.is_finite() || q < 0.0 {
            return Err(PlanError::invalid(format!(
                "pumped quantity must be finite and non-negative, got {}",
                q
            )));
        }
        if !self.active {
            return Ok(());
        }
        let next = self.deficit + q;
        let excess = next - self.max_deficit;
        if excess > 0.0 {
            if !within_tolerance(excess, self.max_deficit) {
                return Err(PlanError::invalid(format!(
                    "pumping {} would take the deficit to {}, above the maximum {}",
                    q, next, self.max_deficit
                )));
            }
            self.deficit = self.max_deficit;
            return Ok(());
        }
        self.deficit = next;
        Ok(())
    }

    /// Passive recharge between periods
    ///
    /// Lowers the deficit by `sustainable_yield + excess_yield`; the deficit
    /// may go negative, which leaves a surplus credit.
    pub fn recharge(&mut self, excess_yield: f64) -> Result<()> {
        if !excess_yield.is_finite() || excess_yield < 0.0 {
            return Err(PlanError::invalid(format!(
                "excess_yield must be finite and non-negative, got {}",
                excess_yield
            )));
        }
        if self.active {
            self.deficit -= self.sustainable_yield + excess_yield;
        }
        Ok(())
    }
}

impl Default for Groundwater {
    fn default() -> Self {
        Self::new(Exponential::default())
    }
}

impl fmt::Debug for Groundwater {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Groundwater")
            .field("active", &self.active)
            .field("deficit", &self.deficit)
            .field("max_deficit", &self.max_deficit)
            .field("sustainable_yield", &self.sustainable_yield)
            .field("pump_cost", &self.pump_cost)
            .finish()
    }
}

fn check_ceiling(deficit: f64, max_deficit: f64) -> Result<()> {
    if max_deficit < deficit {
        return Err(PlanError::invalid(format!(
            "max_deficit {} is below the current deficit {}",
            max_deficit, deficit
        )));
    }
    Ok(())
}
