//! Shop policy knobs.
//!
//! Everything here is plain data deserialized from the `[shop]` table of the
//! application settings; every field has a default so an empty table is a
//! valid configuration.

use serde::{Deserialize, Serialize};

use crate::planner::{Objective, Planner, Strategy, Take};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShopConfig {
    /// Gold written by the opening balance and by `reset`.
    pub starting_gold: i64,
    pub capacity: CapacityConfig,
    pub barrels: BarrelPolicy,
    pub bottles: BottlePolicy,
    pub solver: SolverConfig,
}

impl Default for ShopConfig {
    fn default() -> Self {
        Self {
            starting_gold: 100,
            capacity: CapacityConfig::default(),
            barrels: BarrelPolicy::default(),
            bottles: BottlePolicy::default(),
            solver: SolverConfig::default(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CapacityConfig {
    pub unit_cost: i64,
    pub potions_per_unit: i64,
    pub ml_per_unit: i64,
    /// Stock level, in percent of the ceiling, at which the capacity plan buys
    /// another unit.
    pub utilization_percent: i64,
    /// Gold the capacity plan leaves untouched.
    pub reserve_gold: i64,
}

impl Default for CapacityConfig {
    fn default() -> Self {
        Self {
            unit_cost: 1000,
            potions_per_unit: 50,
            ml_per_unit: 10_000,
            utilization_percent: 50,
            reserve_gold: 0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BarrelPolicy {
    pub strategy: Strategy,
    pub take: Take,
    pub objective: Objective,
    /// Buy a channel's barrels only while fewer pure potions of that channel
    /// are in stock.
    pub restock_threshold: i64,
}

impl Default for BarrelPolicy {
    fn default() -> Self {
        Self {
            strategy: Strategy::Greedy,
            take: Take::One,
            objective: Objective::Yield,
            restock_threshold: 10,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BottlePolicy {
    pub strategy: Strategy,
    pub take: Take,
    pub objective: Objective,
    /// A recipe is bottled only while fewer units are in stock.
    pub restock_threshold: i64,
    /// No recipe is bottled beyond this many units in stock.
    pub max_stock_per_recipe: i64,
}

impl Default for BottlePolicy {
    fn default() -> Self {
        Self {
            strategy: Strategy::Optimize,
            take: Take::Max,
            objective: Objective::PROFIT_VARIETY,
            restock_threshold: 10,
            max_stock_per_recipe: 30,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    pub node_limit: u64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            node_limit: 200_000,
        }
    }
}

impl ShopConfig {
    pub(crate) fn barrel_planner(&self) -> Planner {
        Planner {
            strategy: self.barrels.strategy,
            take: self.barrels.take,
            objective: self.barrels.objective,
            node_limit: self.solver.node_limit,
        }
    }

    pub(crate) fn bottle_planner(&self) -> Planner {
        Planner {
            strategy: self.bottles.strategy,
            take: self.bottles.take,
            objective: self.bottles.objective,
            node_limit: self.solver.node_limit,
        }
    }
}
