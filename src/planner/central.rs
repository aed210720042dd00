//! Central planner: greedy, unit-at-a-time land allocation
//!
//! For each unit of land every crop is priced against the current water
//! state, the highest-NPV crop wins (fallow unless something beats zero),
//! and the winner's water is delivered and pumped before the next unit is
//! priced. Surface water depletes and groundwater gets dearer as units are
//! committed, so marginal economics are recomputed every iteration.

use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;

use crate::core::error::{PlanError, Result};
use crate::core::types::{CropId, Drivers};
use crate::crops::{Crop, CropSet};
use crate::planner::output::{AllocationRecord, AllocationTable};
use crate::planner::portfolio::Portfolio;
use crate::water::{allocate, Groundwater, Surfacewater};

/// NPV given to a planted crop that needs water but cannot buy any.
/// Never ties with fallow at zero.
pub const NO_WATER_NPV: f64 = -1.0;

/// Portion of demand met by bought water plus precipitation, capped at 1
///
/// Zero demand counts as fully met.
pub fn portion_met(demand: f64, supplied: f64, precipitation: f64) -> f64 {
    if demand > 0.0 {
        ((supplied + precipitation) / demand).min(1.0)
    } else {
        1.0
    }
}

/// Progress of a planning run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanPhase {
    Initializing,
    Iterating { unit: u32 },
    Done,
}

/// Owns the shared water resources, the crop set and the tie-break RNG
#[derive(Debug, Clone)]
pub struct CentralPlanner {
    pub groundwater: Groundwater,
    pub surfacewater: Surfacewater,
    crops: CropSet,
    portfolio: Portfolio,
    rng: ChaCha8Rng,
}

impl CentralPlanner {
    pub fn new(
        crops: CropSet,
        portfolio: Portfolio,
        surfacewater: Surfacewater,
        groundwater: Groundwater,
        rng: ChaCha8Rng,
    ) -> Result<Self> {
        check_portfolio(&crops, &portfolio)?;
        Ok(Self {
            groundwater,
            surfacewater,
            crops,
            portfolio,
            rng,
        })
    }

    pub fn crops(&self) -> &CropSet {
        &self.crops
    }

    pub fn portfolio(&self) -> &Portfolio {
        &self.portfolio
    }

    /// Replace the held areas, e.g. with the previous run's outcome
    pub fn set_portfolio(&mut self, portfolio: Portfolio) -> Result<()> {
        check_portfolio(&self.crops, &portfolio)?;
        self.portfolio = portfolio;
        Ok(())
    }

    /// Units of land to allocate per run
    pub fn total_area(&self) -> u32 {
        self.portfolio.total_area()
    }

    pub fn id(&self, name: &str) -> Result<CropId> {
        self.crops.id(name)
    }

    pub fn crop(&self, name: &str) -> Result<&Crop> {
        self.crops.get(name)
    }

    /// Price one unit of `crop` against the current water state
    ///
    /// Read-only: nothing is delivered or pumped.
    pub fn evaluate(&self, id: CropId, drivers: &Drivers, new: bool) -> Result<AllocationRecord> {
        let crop = self
            .crops
            .crop(id)
            .ok_or_else(|| PlanError::CropNotFound(format!("crop #{}", id.0)))?;

        let demand = crop.water_demand(drivers.eto, drivers.kc);
        let water = allocate(demand, drivers.precipitation, &self.surfacewater, &self.groundwater)?;
        let portion = portion_met(demand, water.quantity(), drivers.precipitation);
        let q = crop.production(portion);
        let marginal_revenue = crop.mr(drivers.price, q, drivers.discount_rate)?;
        let marginal_cost = crop.mc(new, water.cost(), drivers.discount_rate)?;

        let starved = !crop.is_fallow() && demand - drivers.precipitation > 0.0 && water.quantity() == 0.0;
        let npv = if starved {
            NO_WATER_NPV
        } else {
            crop.npv(marginal_revenue, marginal_cost)
        };

        tracing::trace!(
            crop = crop.name(),
            demand,
            portion,
            npv,
            starved,
            "evaluated candidate"
        );

        Ok(AllocationRecord {
            crop: id,
            demand,
            surface: water.surface.quantity,
            ground: water.ground.quantity,
            precipitation: drivers.precipitation,
            marginal_revenue,
            marginal_cost,
            npv,
        })
    }

    /// Begin a run: re-supply surface water and start an empty table
    ///
    /// `inputs` holds one row per crop, in crop-set order.
    pub fn start<'a>(&'a mut self, surface_supply: f64, inputs: &'a [Drivers]) -> Result<PlanRun<'a>> {
        if inputs.len() != self.crops.len() {
            return Err(PlanError::invalid(format!(
                "expected {} input rows, one per crop, got {}",
                self.crops.len(),
                inputs.len()
            )));
        }
        for (drivers, (_, crop)) in inputs.iter().zip(self.crops.iter()) {
            if !crop.is_fallow() {
                drivers.validate()?;
                crop.factor(drivers.discount_rate)?;
            }
        }

        let mut run = PlanRun {
            table: AllocationTable::new(
                self.crops.names().into_iter().map(String::from).collect(),
                self.total_area() as usize,
            ),
            committed: vec![0; self.crops.len()],
            phase: PlanPhase::Initializing,
            planner: self,
            inputs,
        };
        run.initialize(surface_supply)?;
        Ok(run)
    }

    /// Allocate every unit of land and return one record per unit
    pub fn plan(&mut self, surface_supply: f64, inputs: &[Drivers]) -> Result<AllocationTable> {
        self.start(surface_supply, inputs)?.finish()
    }
}

/// One planning run in progress
///
/// Each [`PlanRun::step`] commits exactly one unit, so a run always
/// terminates after `total_area` steps.
pub struct PlanRun<'a> {
    planner: &'a mut CentralPlanner,
    inputs: &'a [Drivers],
    table: AllocationTable,
    committed: Vec<u32>,
    phase: PlanPhase,
}

impl<'a> PlanRun<'a> {
    fn initialize(&mut self, surface_supply: f64) -> Result<()> {
        self.planner.surfacewater.supply(surface_supply)?;
        self.phase = if self.planner.total_area() == 0 {
            PlanPhase::Done
        } else {
            PlanPhase::Iterating { unit: 0 }
        };
        Ok(())
    }

    pub fn phase(&self) -> PlanPhase {
        self.phase
    }

    pub fn table(&self) -> &AllocationTable {
        &self.table
    }

    /// Units committed to `crop` so far in this run
    pub fn committed(&self, crop: CropId) -> u32 {
        self.committed.get(crop.0).copied().unwrap_or(0)
    }

    /// Price every crop for the next unit without committing anything
    pub fn candidates(&self) -> Result<Vec<AllocationRecord>> {
        self.planner
            .crops
            .iter()
            .map(|(id, _)| {
                let new = self.planner.portfolio.is_new(id, self.committed(id));
                self.planner.evaluate(id, &self.inputs[id.0], new)
            })
            .collect()
    }

    /// Choose and commit the next unit. Returns `None` once every unit is allocated.
    pub fn step(&mut self) -> Result<Option<AllocationRecord>> {
        let unit = match self.phase {
            PlanPhase::Iterating { unit } => unit,
            PlanPhase::Initializing | PlanPhase::Done => return Ok(None),
        };

        let candidates = self.candidates()?;
        let max_npv = candidates.iter().map(|c| c.npv).fold(f64::NEG_INFINITY, f64::max);

        let chosen = if max_npv <= 0.0 {
            tracing::debug!(unit, max_npv, "no crop beats fallow");
            candidates[self.planner.crops.fallow().0]
        } else {
            let ties: Vec<&AllocationRecord> = candidates.iter().filter(|c| c.npv == max_npv).collect();
            if ties.len() == 1 {
                *ties[0]
            } else {
                **ties.choose(&mut self.planner.rng).unwrap_or(&ties[0])
            }
        };

        self.commit(unit, chosen)?;
        Ok(Some(chosen))
    }

    fn commit(&mut self, unit: u32, record: AllocationRecord) -> Result<()> {
        self.planner.surfacewater.deliver(record.surface)?;
        self.planner.groundwater.pump(record.ground)?;
        self.committed[record.crop.0] += 1;
        self.table.push(record);

        tracing::debug!(
            unit,
            crop = record.crop.0,
            npv = record.npv,
            surface = record.surface,
            ground = record.ground,
            deficit = self.planner.groundwater.deficit(),
            "committed land unit"
        );

        let next = unit + 1;
        if next >= self.planner.total_area() {
            self.phase = PlanPhase::Done;
            tracing::info!(
                area = next,
                counts = ?self.committed,
                npv = self.table.total_npv(),
                "allocation complete"
            );
        } else {
            self.phase = PlanPhase::Iterating { unit: next };
        }
        Ok(())
    }

    /// Run the remaining steps and hand back the full table
    pub fn finish(mut self) -> Result<AllocationTable> {
        while self.step()?.is_some() {}
        Ok(self.table)
    }
}

fn check_portfolio(crops: &CropSet, portfolio: &Portfolio) -> Result<()> {
    if portfolio.len() != crops.len() {
        return Err(PlanError::invalid(format!(
            "portfolio has {} entries for {} crops",
            portfolio.len(),
            crops.len()
        )));
    }
    Ok(())
}
