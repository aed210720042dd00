//! Area currently held by each crop

use serde::{Deserialize, Serialize};

use crate::core::types::CropId;

/// Units of land per crop, indexed by [`CropId`]
///
/// Decides whether a committed unit is new area, which pays startup cost.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Portfolio {
    areas: Vec<u32>,
}

impl Portfolio {
    pub fn new(areas: Vec<u32>) -> Self {
        Self { areas }
    }

    /// Held area for `crop`; crops beyond the end hold nothing
    pub fn area(&self, crop: CropId) -> u32 {
        self.areas.get(crop.0).copied().unwrap_or(0)
    }

    pub fn total_area(&self) -> u32 {
        self.areas.iter().sum()
    }

    pub fn len(&self) -> usize {
        self.areas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.areas.is_empty()
    }

    pub fn areas(&self) -> &[u32] {
        &self.areas
    }

    /// Whether `crop` has already been committed past its held area
    pub fn is_new(&self, crop: CropId, committed: u32) -> bool {
        self.area(crop) < committed
    }
}

impl From<Vec<u32>> for Portfolio {
    fn from(areas: Vec<u32>) -> Self {
        Self::new(areas)
    }
}
