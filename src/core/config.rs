//! Scenario configuration loaded from TOML
//!
//! A scenario fixes everything a planning run needs at construction time:
//! the crop set and its held areas, both water pools, per-crop drivers and
//! the tie-break seed. Nothing is read from global defaults, so two runs of
//! the same file are identical.

use std::collections::BTreeMap;
use std::path::Path;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::core::error::{PlanError, Result};
use crate::core::types::{Drivers, Series};
use crate::crops::{Crop, CropSet, ProductionFunction, UnitCost};
use crate::numeric::Exponential;
use crate::planner::{AllocationTable, CentralPlanner, Portfolio};
use crate::water::{Groundwater, Surfacewater};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioConfig {
    /// Seed for tie-breaking between crops with equal NPV
    #[serde(default)]
    pub seed: u64,
    /// Planning periods to run; groundwater recharges between them
    #[serde(default = "default_periods")]
    pub periods: u32,
    /// Decay applied when a driver is given as a history (0 = mean, 1 = latest)
    #[serde(default)]
    pub information_decay: f64,
    #[serde(default)]
    pub surface_water: SurfaceWaterConfig,
    #[serde(default)]
    pub groundwater: GroundwaterConfig,
    pub crops: Vec<CropConfig>,
    /// Drivers keyed by crop name
    #[serde(default)]
    pub inputs: BTreeMap<String, InputConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SurfaceWaterConfig {
    /// Quantity supplied at the start of every run
    pub supply: f64,
    pub unit_cost: f64,
}

impl Default for SurfaceWaterConfig {
    fn default() -> Self {
        Self {
            supply: 0.0,
            unit_cost: 1.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GroundwaterConfig {
    pub active: bool,
    pub deficit: f64,
    /// Absent means no ceiling
    pub max_deficit: Option<f64>,
    pub sustainable_yield: f64,
    pub pump_cost: Exponential,
}

impl Default for GroundwaterConfig {
    fn default() -> Self {
        Self {
            active: true,
            deficit: 0.0,
            max_deficit: None,
            sustainable_yield: 0.0,
            pump_cost: Exponential::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CropConfig {
    pub name: String,
    /// `fallow`, `annual` or `perennial`, any case
    pub kind: String,
    /// Units currently held
    #[serde(default)]
    pub area: u32,
    #[serde(default)]
    pub startup_cost: f64,
    #[serde(default = "default_non_water_cost")]
    pub non_water_cost: f64,
    /// Perennial only; absent means infinite
    pub life: Option<f64>,
    #[serde(default)]
    pub production: ProductionConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductionConfig {
    pub max_production: f64,
    pub no_production_threshold: f64,
    /// Unit-sigmoid steepness; 1 is linear
    pub steepness: f64,
}

impl Default for ProductionConfig {
    fn default() -> Self {
        Self {
            max_production: 1.0,
            no_production_threshold: 0.0,
            steepness: 1.0,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InputConfig {
    pub eto: Series,
    pub kc: Series,
    #[serde(default)]
    pub precipitation: Series,
    pub price: Series,
    pub discount_rate: Series,
}

impl InputConfig {
    pub fn to_drivers(&self, decay: f64) -> Result<Drivers> {
        Ok(Drivers {
            eto: self.eto.expected(decay)?,
            kc: self.kc.expected(decay)?,
            precipitation: self.precipitation.expected(decay)?,
            price: self.price.expected(decay)?,
            discount_rate: self.discount_rate.expected(decay)?,
        })
    }
}

/// A planner ready to run, with its inputs aligned to the crop set
#[derive(Debug, Clone)]
pub struct Scenario {
    pub planner: CentralPlanner,
    pub inputs: Vec<Drivers>,
    pub surface_supply: f64,
    pub periods: u32,
}

impl Scenario {
    /// Run every period, recharging groundwater in between
    pub fn run(&mut self) -> Result<Vec<AllocationTable>> {
        let mut tables = Vec::with_capacity(self.periods as usize);
        for period in 0..self.periods {
            if period > 0 {
                self.planner.groundwater.recharge(0.0)?;
            }
            tracing::info!(period, supply = self.surface_supply, "planning period");
            tables.push(self.planner.plan(self.surface_supply, &self.inputs)?);
        }
        Ok(tables)
    }
}

fn default_periods() -> u32 {
    1
}

fn default_non_water_cost() -> f64 {
    1.0
}

impl ScenarioConfig {
    /// Load a scenario from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse a scenario from a TOML string
    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Check the scenario for internal consistency
    pub fn validate(&self) -> Result<()> {
        if self.periods == 0 {
            return Err(PlanError::invalid("periods must be at least 1"));
        }
        if !(0.0..=1.0).contains(&self.information_decay) {
            return Err(PlanError::invalid(format!(
                "information_decay must lie in [0, 1], got {}",
                self.information_decay
            )));
        }
        if self.crops.is_empty() {
            return Err(PlanError::invalid("scenario defines no crops"));
        }
        if self.crops.iter().map(|c| c.area).sum::<u32>() == 0 {
            return Err(PlanError::invalid("total area must be positive"));
        }

        for crop in &self.crops {
            let kind = crop.kind.to_lowercase();
            match kind.as_str() {
                "fallow" | "annual" | "perennial" => {}
                _ => {
                    return Err(PlanError::invalid(format!(
                        "unknown kind '{}' for crop {}",
                        crop.kind, crop.name
                    )))
                }
            }
            if crop.life.is_some() && kind != "perennial" {
                return Err(PlanError::invalid(format!("only perennial crops have a life: {}", crop.name)));
            }
            if kind != "fallow" && self.input_for(&crop.name).is_none() {
                return Err(PlanError::invalid(format!("no inputs given for crop {}", crop.name)));
            }
        }

        for name in self.inputs.keys() {
            if !self.crops.iter().any(|c| c.name.eq_ignore_ascii_case(name)) {
                return Err(PlanError::CropNotFound(name.clone()));
            }
        }
        Ok(())
    }

    fn input_for(&self, name: &str) -> Option<&InputConfig> {
        self.inputs
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v)
    }

    /// Validate and build the planner, water pools and aligned inputs
    pub fn into_scenario(self) -> Result<Scenario> {
        self.validate()?;

        let crops = self
            .crops
            .iter()
            .map(CropConfig::to_crop)
            .collect::<Result<Vec<_>>>()?;
        let crops = CropSet::new(crops)?;
        let portfolio = Portfolio::new(self.crops.iter().map(|c| c.area).collect());

        let inputs = self
            .crops
            .iter()
            .map(|c| match self.input_for(&c.name) {
                Some(input) => input.to_drivers(self.information_decay),
                None => Ok(Drivers::default()),
            })
            .collect::<Result<Vec<_>>>()?;

        let surfacewater = Surfacewater::new(self.surface_water.supply, self.surface_water.unit_cost)?;
        let groundwater = self.groundwater.to_groundwater()?;

        let planner = CentralPlanner::new(
            crops,
            portfolio,
            surfacewater,
            groundwater,
            ChaCha8Rng::seed_from_u64(self.seed),
        )?;

        Ok(Scenario {
            planner,
            inputs,
            surface_supply: self.surface_water.supply,
            periods: self.periods,
        })
    }
}

impl GroundwaterConfig {
    pub fn to_groundwater(&self) -> Result<Groundwater> {
        let curve = Exponential::new(self.pump_cost.base, self.pump_cost.rate)?;
        let mut gw = Groundwater::new(curve)
            .with_active(self.active)
            .with_sustainable_yield(self.sustainable_yield)?
            .with_deficit(self.deficit)?;
        if let Some(max) = self.max_deficit {
            gw = gw.with_max_deficit(max)?;
        }
        Ok(gw)
    }
}

impl CropConfig {
    pub fn to_crop(&self) -> Result<Crop> {
        let costs = UnitCost::new(self.startup_cost, self.non_water_cost)?;
        let production = ProductionFunction::sigmoid(
            self.production.max_production,
            self.production.no_production_threshold,
            self.production.steepness,
        )?;
        match self.kind.to_lowercase().as_str() {
            "fallow" => Ok(Crop::fallow().with_name(self.name.clone())),
            "annual" => Ok(Crop::annual(self.name.clone(), costs, production)),
            "perennial" => Crop::perennial(
                self.name.clone(),
                costs,
                production,
                self.life.unwrap_or(f64::INFINITY),
            ),
            _ => Err(PlanError::invalid(format!("unknown crop kind: {}", self.kind))),
        }
    }
}
