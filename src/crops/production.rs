//! Production response to the portion of water demand met

use std::fmt;
use std::sync::Arc;

use crate::core::error::{PlanError, Result};
use crate::numeric::unit_sigmoid;

type Response = Arc<dyn Fn(f64) -> f64 + Send + Sync>;

/// Maps the portion of demanded water supplied to units of production
///
/// Below `no_production_threshold` nothing is produced. Above it the
/// response curve scales `max_production`.
#[derive(Clone)]
pub struct ProductionFunction {
    max_production: f64,
    no_production_threshold: f64,
    response: Response,
}

impl ProductionFunction {
    /// `response` should map `[0, 1]` onto `[0, 1]`
    pub fn new<F>(max_production: f64, no_production_threshold: f64, response: F) -> Result<Self>
    where
        F: Fn(f64) -> f64 + Send + Sync + 'static,
    {
        if !max_production.is_finite() || max_production < 0.0 {
            return Err(PlanError::invalid(format!(
                "max_production must be finite and non-negative, got {}",
                max_production
            )));
        }
        if !(0.0..=1.0).contains(&no_production_threshold) {
            return Err(PlanError::invalid(format!(
                "no_production_threshold must lie in [0, 1], got {}",
                no_production_threshold
            )));
        }
        Ok(Self {
            max_production,
            no_production_threshold,
            response: Arc::new(response),
        })
    }

    /// Unit-sigmoid response with steepness `k`
    pub fn sigmoid(max_production: f64, no_production_threshold: f64, k: f64) -> Result<Self> {
        if !k.is_finite() || k <= 0.0 {
            return Err(PlanError::invalid(format!("steepness must be positive, got {}", k)));
        }
        Self::new(max_production, no_production_threshold, unit_sigmoid(k))
    }

    pub fn max_production(&self) -> f64 {
        self.max_production
    }

    pub fn no_production_threshold(&self) -> f64 {
        self.no_production_threshold
    }

    /// Production for `portion` of demand met, clamped to `[0, 1]`
    pub fn evaluate(&self, portion: f64) -> f64 {
        let portion = portion.clamp(0.0, 1.0);
        if portion < self.no_production_threshold {
            return 0.0;
        }
        (self.response)(portion) * self.max_production
    }
}

impl Default for ProductionFunction {
    fn default() -> Self {
        Self {
            max_production: 1.0,
            no_production_threshold: 0.0,
            response: Arc::new(unit_sigmoid(1.0)),
        }
    }
}

impl fmt::Debug for ProductionFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProductionFunction")
            .field("max_production", &self.max_production)
            .field("no_production_threshold", &self.no_production_threshold)
            .finish_non_exhaustive()
    }
}
