//! Core type definitions used throughout the codebase

use serde::{Deserialize, Serialize};

use crate::core::error::{PlanError, Result};
use crate::numeric::expected_value;

/// Position of a crop in the planner's crop set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CropId(pub usize);

impl CropId {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// Exogenous drivers for one crop over one planning call
///
/// Values are constant across land units within a call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Drivers {
    /// Reference evapotranspiration
    pub eto: f64,
    /// Crop coefficient scaling `eto` into crop demand
    pub kc: f64,
    /// In-situ precipitation, netted against demand before buying water
    pub precipitation: f64,
    /// Price per unit of production
    pub price: f64,
    pub discount_rate: f64,
}

impl Drivers {
    pub fn new(eto: f64, kc: f64, precipitation: f64, price: f64, discount_rate: f64) -> Self {
        Self {
            eto,
            kc,
            precipitation,
            price,
            discount_rate,
        }
    }

    /// Reject drivers that would make demand negative or discounting undefined
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("eto", self.eto),
            ("kc", self.kc),
            ("precipitation", self.precipitation),
            ("price", self.price),
            ("discount_rate", self.discount_rate),
        ];
        for (name, value) in fields {
            if !value.is_finite() {
                return Err(PlanError::invalid(format!("{} must be finite, got {}", name, value)));
            }
        }
        for (name, value) in [("eto", self.eto), ("kc", self.kc), ("precipitation", self.precipitation)] {
            if value < 0.0 {
                return Err(PlanError::invalid(format!("{} must be non-negative, got {}", name, value)));
            }
        }
        if self.discount_rate <= -1.0 {
            return Err(PlanError::invalid(format!(
                "discount_rate must be greater than -1, got {}",
                self.discount_rate
            )));
        }
        Ok(())
    }
}

/// A driver given either as a single value or as a history of observations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Series {
    Scalar(f64),
    History(Vec<f64>),
}

impl Series {
    /// Collapse to one value with [`expected_value`] at decay `d`
    pub fn expected(&self, d: f64) -> Result<f64> {
        match self {
            Series::Scalar(v) => Ok(*v),
            Series::History(values) => expected_value(values, d)
                .ok_or_else(|| PlanError::invalid("driver history must not be empty")),
        }
    }
}

impl Default for Series {
    fn default() -> Self {
        Series::Scalar(0.0)
    }
}

impl From<f64> for Series {
    fn from(v: f64) -> Self {
        Series::Scalar(v)
    }
}
