//! Ordered set of candidate crops
//!
//! A crop's position in the set is its [`CropId`]; input rows, portfolio
//! areas and output records are all keyed by it.

use crate::core::error::{PlanError, Result};
use crate::core::types::CropId;
use crate::crops::crop::Crop;

#[derive(Debug, Clone)]
pub struct CropSet {
    crops: Vec<Crop>,
    fallow: CropId,
}

impl CropSet {
    /// Names must be unique ignoring case, and exactly one crop must be fallow
    pub fn new(crops: Vec<Crop>) -> Result<Self> {
        for (i, crop) in crops.iter().enumerate() {
            if crops[..i].iter().any(|c| c.name().eq_ignore_ascii_case(crop.name())) {
                return Err(PlanError::invalid(format!("duplicate crop name: {}", crop.name())));
            }
        }

        let mut fallows = crops.iter().enumerate().filter(|(_, c)| c.is_fallow());
        let fallow = match (fallows.next(), fallows.next()) {
            (Some((i, _)), None) => CropId(i),
            (None, _) => return Err(PlanError::CropNotFound("fallow".into())),
            (Some(_), Some(_)) => {
                return Err(PlanError::invalid("crop set must contain exactly one fallow crop"))
            }
        };

        Ok(Self { crops, fallow })
    }

    /// Fallow, one annual and one perennial with default economics
    pub fn with_defaults() -> Self {
        use crate::crops::crop::UnitCost;
        use crate::crops::production::ProductionFunction;

        Self {
            crops: vec![
                Crop::fallow(),
                Crop::annual("ANNUAL", UnitCost::default(), ProductionFunction::default()),
                Crop::perpetuity("PERENNIAL", UnitCost::default(), ProductionFunction::default()),
            ],
            fallow: CropId(0),
        }
    }

    /// Look up a crop id by name, ignoring case
    pub fn id(&self, name: &str) -> Result<CropId> {
        self.crops
            .iter()
            .position(|c| c.name().eq_ignore_ascii_case(name))
            .map(CropId)
            .ok_or_else(|| PlanError::CropNotFound(name.to_string()))
    }

    /// Look up a crop by name, ignoring case
    pub fn get(&self, name: &str) -> Result<&Crop> {
        let id = self.id(name)?;
        Ok(&self.crops[id.0])
    }

    pub fn crop(&self, id: CropId) -> Option<&Crop> {
        self.crops.get(id.0)
    }

    pub fn fallow(&self) -> CropId {
        self.fallow
    }

    pub fn len(&self) -> usize {
        self.crops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.crops.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (CropId, &Crop)> {
        self.crops.iter().enumerate().map(|(i, c)| (CropId(i), c))
    }

    pub fn names(&self) -> Vec<&str> {
        self.crops.iter().map(|c| c.name()).collect()
    }
}
