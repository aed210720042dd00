//! Planner output: one record per committed land unit

use serde::{Deserialize, Serialize};

use crate::core::error::Result;
use crate::core::types::CropId;
use crate::planner::portfolio::Portfolio;

/// Economics of one crop for one land unit
///
/// Produced for every candidate while choosing, and kept for the winner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AllocationRecord {
    pub crop: CropId,
    pub demand: f64,
    /// Surface water bought
    pub surface: f64,
    /// Groundwater bought
    pub ground: f64,
    pub precipitation: f64,
    pub marginal_revenue: f64,
    pub marginal_cost: f64,
    pub npv: f64,
}

impl AllocationRecord {
    /// `[crop_id, demand, surface, ground, precipitation, mr, mc, npv]`
    pub fn to_row(&self) -> [f64; 8] {
        [
            self.crop.0 as f64,
            self.demand,
            self.surface,
            self.ground,
            self.precipitation,
            self.marginal_revenue,
            self.marginal_cost,
            self.npv,
        ]
    }
}

/// Every land unit of one planning run, in commitment order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationTable {
    crop_names: Vec<String>,
    records: Vec<AllocationRecord>,
}

impl AllocationTable {
    pub fn new(crop_names: Vec<String>, capacity: usize) -> Self {
        Self {
            crop_names,
            records: Vec::with_capacity(capacity),
        }
    }

    pub(crate) fn push(&mut self, record: AllocationRecord) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[AllocationRecord] {
        &self.records
    }

    pub fn rows(&self) -> Vec<[f64; 8]> {
        self.records.iter().map(AllocationRecord::to_row).collect()
    }

    pub fn crop_names(&self) -> &[String] {
        &self.crop_names
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Units committed to `crop`
    pub fn count(&self, crop: CropId) -> u32 {
        self.records.iter().filter(|r| r.crop == crop).count() as u32
    }

    /// Units committed per crop, indexed by crop id
    pub fn counts(&self) -> Vec<u32> {
        let mut counts = vec![0; self.crop_names.len()];
        for r in &self.records {
            if let Some(c) = counts.get_mut(r.crop.0) {
                *c += 1;
            }
        }
        counts
    }

    /// The resulting land use, usable as the next period's portfolio
    pub fn portfolio(&self) -> Portfolio {
        Portfolio::new(self.counts())
    }

    pub fn total_npv(&self) -> f64 {
        self.records.iter().map(|r| r.npv).sum()
    }

    pub fn total_surface(&self) -> f64 {
        self.records.iter().map(|r| r.surface).sum()
    }

    pub fn total_ground(&self) -> f64 {
        self.records.iter().map(|r| r.ground).sum()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn summary(&self) -> String {
        let mut out = format!(
            "{} units allocated, total NPV {:.2}, surface water {:.2}, groundwater {:.2}",
            self.len(),
            self.total_npv(),
            self.total_surface(),
            self.total_ground(),
        );
        for (name, count) in self.crop_names.iter().zip(self.counts()) {
            out.push_str(&format!("\n  {}: {}", name, count));
        }
        out
    }
}
