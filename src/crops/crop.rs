//! Crop economics: fallow, annual and perennial land uses
//!
//! All three share one capability set. They differ in the discounting
//! horizon (one period for annuals, an annuity over `life` for perennials)
//! and fallow is the degenerate case where every quantity is zero, which
//! makes it the floor any planted crop has to beat.

use serde::{Deserialize, Serialize};

use crate::core::error::{PlanError, Result};
use crate::crops::production::ProductionFunction;

/// Name given to the fallow crop by [`Crop::fallow`]
pub const FALLOW: &str = "FALLOW";

/// Per-unit-of-land costs, before discounting
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UnitCost {
    /// One-time cost paid, undiscounted, when a unit is newly planted
    pub startup_cost: f64,
    /// Recurring cost per period excluding water
    pub non_water_cost: f64,
}

impl UnitCost {
    pub fn new(startup_cost: f64, non_water_cost: f64) -> Result<Self> {
        for (name, value) in [("startup_cost", startup_cost), ("non_water_cost", non_water_cost)] {
            if !value.is_finite() || value < 0.0 {
                return Err(PlanError::invalid(format!(
                    "{} must be finite and non-negative, got {}",
                    name, value
                )));
            }
        }
        Ok(Self {
            startup_cost,
            non_water_cost,
        })
    }
}

impl Default for UnitCost {
    fn default() -> Self {
        Self {
            startup_cost: 0.0,
            non_water_cost: 1.0,
        }
    }
}

#[derive(Debug, Clone)]
pub enum CropKind {
    Fallow,
    Annual {
        costs: UnitCost,
        production: ProductionFunction,
    },
    Perennial {
        costs: UnitCost,
        production: ProductionFunction,
        /// Amortization horizon in periods, possibly infinite
        life: f64,
    },
}

/// A named land use. Immutable once built.
#[derive(Debug, Clone)]
pub struct Crop {
    name: String,
    kind: CropKind,
}

impl Crop {
    pub fn fallow() -> Self {
        Self {
            name: FALLOW.to_string(),
            kind: CropKind::Fallow,
        }
    }

    pub fn annual(name: impl Into<String>, costs: UnitCost, production: ProductionFunction) -> Self {
        Self {
            name: name.into(),
            kind: CropKind::Annual { costs, production },
        }
    }

    /// `life` must be positive; `f64::INFINITY` gives a perpetuity
    pub fn perennial(
        name: impl Into<String>,
        costs: UnitCost,
        production: ProductionFunction,
        life: f64,
    ) -> Result<Self> {
        if life.is_nan() || life <= 0.0 {
            return Err(PlanError::invalid(format!("perennial life must be positive, got {}", life)));
        }
        Ok(Self {
            name: name.into(),
            kind: CropKind::Perennial {
                costs,
                production,
                life,
            },
        })
    }

    /// Perennial with an infinite life
    pub fn perpetuity(name: impl Into<String>, costs: UnitCost, production: ProductionFunction) -> Self {
        Self {
            name: name.into(),
            kind: CropKind::Perennial {
                costs,
                production,
                life: f64::INFINITY,
            },
        }
    }

    /// Rename, keeping the economics. Mostly useful for a named fallow.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &CropKind {
        &self.kind
    }

    pub fn is_fallow(&self) -> bool {
        matches!(self.kind, CropKind::Fallow)
    }

    /// Water demand (ETc) for one unit of land
    pub fn water_demand(&self, eto: f64, kc: f64) -> f64 {
        match self.kind {
            CropKind::Fallow => 0.0,
            _ => crate::water::demand(eto, kc),
        }
    }

    /// Production for the portion of water demand met
    pub fn production(&self, portion: f64) -> f64 {
        match &self.kind {
            CropKind::Fallow => 0.0,
            CropKind::Annual { production, .. } | CropKind::Perennial { production, .. } => {
                production.evaluate(portion)
            }
        }
    }

    /// Discount factor applied to per-period values at rate `r`
    ///
    /// Annuals: `1 / (1 + r)`. Perennials: `1 / r` for an infinite life,
    /// otherwise the annuity factor `(1 - (1 + r)^-life) / r`.
    pub fn factor(&self, r: f64) -> Result<f64> {
        let life = match self.kind {
            CropKind::Fallow => return Ok(0.0),
            CropKind::Annual { .. } => None,
            CropKind::Perennial { life, .. } => Some(life),
        };

        if !r.is_finite() || r <= -1.0 {
            return Err(PlanError::invalid(format!(
                "discount rate must be finite and greater than -1, got {}",
                r
            )));
        }

        match life {
            None => Ok(1.0 / (1.0 + r)),
            Some(life) if life.is_infinite() => {
                if r <= 0.0 {
                    return Err(PlanError::invalid(format!(
                        "an infinite-life crop needs a positive discount rate, got {}",
                        r
                    )));
                }
                Ok(1.0 / r)
            }
            Some(life) if r == 0.0 => Ok(life),
            Some(life) => Ok((1.0 - (1.0 + r).powf(-life)) / r),
        }
    }

    /// Discounted marginal revenue of selling `q` at price `p`
    pub fn mr(&self, p: f64, q: f64, r: f64) -> Result<f64> {
        if self.is_fallow() {
            return Ok(0.0);
        }
        Ok(p * q * self.factor(r)?)
    }

    /// Discounted marginal cost given water cost `wc`
    ///
    /// Startup cost is added undiscounted only for `new` area.
    pub fn mc(&self, new: bool, wc: f64, r: f64) -> Result<f64> {
        let costs = match &self.kind {
            CropKind::Fallow => return Ok(0.0),
            CropKind::Annual { costs, .. } | CropKind::Perennial { costs, .. } => costs,
        };
        if !wc.is_finite() || wc < 0.0 {
            return Err(PlanError::invalid(format!(
                "water cost must be finite and non-negative, got {}",
                wc
            )));
        }
        let annuity = (costs.non_water_cost + wc) * self.factor(r)?;
        Ok(if new { costs.startup_cost + annuity } else { annuity })
    }

    pub fn npv(&self, mr: f64, mc: f64) -> f64 {
        if self.is_fallow() {
            return 0.0;
        }
        mr - mc
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn annual() -> Crop {
        Crop::annual("alfalfa", UnitCost::new(2.0, 1.0).unwrap(), ProductionFunction::default())
    }

    fn perennial(life: f64) -> Crop {
        Crop::perennial(
            "almonds",
            UnitCost::new(10.0, 1.0).unwrap(),
            ProductionFunction::default(),
            life,
        )
        .unwrap()
    }

    #[test]
    fn test_fallow_is_zero_everywhere() {
        let f = Crop::fallow();
        assert_eq!(f.name(), FALLOW);
        assert_eq!(f.water_demand(5.0, 1.0), 0.0);
        assert_eq!(f.production(1.0), 0.0);
        assert_eq!(f.factor(0.1).unwrap(), 0.0);
        assert_eq!(f.mr(10.0, 3.0, 0.1).unwrap(), 0.0);
        assert_eq!(f.mc(true, 50.0, 0.1).unwrap(), 0.0);
        assert_eq!(f.npv(10.0, 2.0), 0.0);
        // Even inputs that would be rejected for a planted crop
        assert_eq!(f.factor(-3.0).unwrap(), 0.0);
    }

    #[test]
    fn test_annual_factor_and_economics() {
        let c = annual();
        assert_eq!(c.water_demand(5.0, 0.8), 4.0);
        assert!((c.factor(0.1).unwrap() - 1.0 / 1.1).abs() < 1e-12);
        assert!((c.mr(10.0, 1.0, 0.1).unwrap() - 10.0 / 1.1).abs() < 1e-12);

        let existing = c.mc(false, 5.0, 0.1).unwrap();
        assert!((existing - 6.0 / 1.1).abs() < 1e-12);
        let new = c.mc(true, 5.0, 0.1).unwrap();
        assert!((new - existing - 2.0).abs() < 1e-12);
        assert_eq!(c.npv(9.0, 4.0), 5.0);
    }

    #[test]
    fn test_perennial_factor() {
        assert!((perennial(f64::INFINITY).factor(0.05).unwrap() - 20.0).abs() < 1e-9);

        let finite = perennial(10.0).factor(0.05).unwrap();
        let expected = (1.0 - 1.05_f64.powf(-10.0)) / 0.05;
        assert!((finite - expected).abs() < 1e-12);
        // A finite annuity is worth less than the perpetuity
        assert!(finite < 20.0);

        assert_eq!(perennial(7.0).factor(0.0).unwrap(), 7.0);
    }

    #[test]
    fn test_discount_rate_validation() {
        assert!(annual().factor(-1.0).is_err());
        assert!(annual().factor(f64::NAN).is_err());
        assert!(perennial(f64::INFINITY).factor(0.0).is_err());
        assert!(perennial(f64::INFINITY).factor(-0.5).is_err());
        assert!(perennial(10.0).factor(-0.5).is_ok());
    }

    #[test]
    fn test_construction_validation() {
        assert!(UnitCost::new(-1.0, 1.0).is_err());
        assert!(UnitCost::new(0.0, f64::INFINITY).is_err());
        assert!(Crop::perennial("x", UnitCost::default(), ProductionFunction::default(), 0.0).is_err());
        assert!(annual().mc(false, -1.0, 0.1).is_err());
    }
}
