//! Purchase and production planning.
//!
//! The planner is a pure function from a snapshot to a plan: it reads no
//! storage and keeps no state between calls. Callers describe what can be
//! bought or produced as [`Candidate`]s and what is available as [`Limits`],
//! then pick a [`Strategy`]:
//!
//! - [`Strategy::Greedy`] walks candidates in catalog order and commits
//!   first-fit, decrementing the simulated pools as it goes;
//! - [`Strategy::Optimize`] solves an integer program maximizing an
//!   [`Objective`] under the same constraints.
//!
//! Both return only strictly positive integer quantities, never select an item
//! priced above the available gold and return an empty plan when nothing is
//! affordable or needed.

use serde::{Deserialize, Serialize};

use crate::{Color, EngineError, ResultEngine};

pub(crate) mod capacity;
mod greedy;
mod optimize;
mod solver;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    #[default]
    Greedy,
    Optimize,
}

/// How many units the greedy strategy commits per candidate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Take {
    #[default]
    One,
    Max,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Objective {
    /// Total ml produced plus potions produced.
    Yield,
    /// `profit_weight * Σ value·q + variety_weight * #items with q > 0`.
    ProfitVariety {
        profit_weight: f64,
        variety_weight: f64,
    },
}

impl Objective {
    pub const PROFIT_VARIETY: Objective = Objective::ProfitVariety {
        profit_weight: 0.8,
        variety_weight: 0.2,
    };

    fn validate(&self) -> ResultEngine<()> {
        if let Self::ProfitVariety {
            profit_weight,
            variety_weight,
        } = *self
        {
            let usable = |w: f64| w.is_finite() && w >= 0.0;
            if !usable(profit_weight) || !usable(variety_weight) {
                return Err(EngineError::InvalidQuantity(
                    "objective weights must be finite and >= 0".to_string(),
                ));
            }
        }
        Ok(())
    }
}

impl Default for Objective {
    fn default() -> Self {
        Self::Yield
    }
}

/// Gate that closes a candidate once its stock reaches `threshold`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Restock {
    pub current: i64,
    pub threshold: i64,
}

impl Restock {
    pub fn is_closed(&self) -> bool {
        self.current >= self.threshold
    }
}

/// Something that can be bought or produced, per unit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    /// Sku or recipe id echoed back in the plan.
    pub key: String,
    /// Gold spent per unit.
    pub price: i64,
    /// Ml taken from stock per unit.
    pub consumes: [i64; 4],
    /// Ml added to stock per unit.
    pub yields: [i64; 4],
    /// Potions added to stock per unit.
    pub potions: i64,
    /// Sale value per unit, used by [`Objective::ProfitVariety`].
    pub value: i64,
    /// Hard cap on units (offered quantity, room below max stock).
    pub max_units: i64,
    pub restock: Option<Restock>,
}

impl Candidate {
    #[must_use]
    pub fn new(key: impl Into<String>, max_units: i64) -> Self {
        Self {
            key: key.into(),
            price: 0,
            consumes: [0; 4],
            yields: [0; 4],
            potions: 0,
            value: 0,
            max_units,
            restock: None,
        }
    }

    #[must_use]
    pub fn price(mut self, price: i64) -> Self {
        self.price = price;
        self
    }

    #[must_use]
    pub fn consumes(mut self, consumes: [i64; 4]) -> Self {
        self.consumes = consumes;
        self
    }

    #[must_use]
    pub fn yields(mut self, color: Color, ml: i64) -> Self {
        self.yields[color.index()] = ml;
        self
    }

    #[must_use]
    pub fn potions(mut self, potions: i64) -> Self {
        self.potions = potions;
        self
    }

    #[must_use]
    pub fn value(mut self, value: i64) -> Self {
        self.value = value;
        self
    }

    #[must_use]
    pub fn restock(mut self, current: i64, threshold: i64) -> Self {
        self.restock = Some(Restock { current, threshold });
        self
    }

    /// Units of output per unit bought, for [`Objective::Yield`].
    pub fn yield_units(&self) -> i64 {
        self.yields.iter().sum::<i64>() + self.potions
    }

    fn restock_closed(&self) -> bool {
        self.restock.as_ref().is_some_and(Restock::is_closed)
    }

    fn validate(&self) -> ResultEngine<()> {
        let negative = self.price < 0
            || self.potions < 0
            || self.value < 0
            || self.consumes.iter().chain(self.yields.iter()).any(|v| *v < 0);
        if negative {
            return Err(EngineError::InvalidQuantity(format!(
                "candidate {}: per-unit amounts must be >= 0",
                self.key
            )));
        }
        Ok(())
    }
}

/// Resources available to a plan.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Limits {
    pub gold: i64,
    /// Ml in stock per channel, bounds consumption.
    pub ml_available: [i64; 4],
    /// Free ml capacity per channel, bounds acquisition.
    pub ml_headroom: [i64; 4],
    /// Free potion capacity across all recipes.
    pub potion_headroom: i64,
}

impl Limits {
    /// Negative pools (stock above a reduced ceiling) behave as empty.
    fn clamped(&self) -> Self {
        Self {
            gold: self.gold.max(0),
            ml_available: self.ml_available.map(|v| v.max(0)),
            ml_headroom: self.ml_headroom.map(|v| v.max(0)),
            potion_headroom: self.potion_headroom.max(0),
        }
    }

    /// Most units of `candidate` these pools allow on their own.
    fn max_units(&self, candidate: &Candidate) -> i64 {
        let mut units = candidate.max_units.max(0);
        let mut bound = |available: i64, per_unit: i64| {
            if per_unit > 0 {
                units = units.min(available / per_unit);
            }
        };
        bound(self.gold, candidate.price);
        for i in 0..4 {
            bound(self.ml_available[i], candidate.consumes[i]);
            bound(self.ml_headroom[i], candidate.yields[i]);
        }
        bound(self.potion_headroom, candidate.potions);
        units.max(0)
    }

    fn consume(&mut self, candidate: &Candidate, quantity: i64) {
        self.gold -= candidate.price * quantity;
        for i in 0..4 {
            self.ml_available[i] -= candidate.consumes[i] * quantity;
            self.ml_headroom[i] -= candidate.yields[i] * quantity;
        }
        self.potion_headroom -= candidate.potions * quantity;
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanItem {
    pub key: String,
    pub quantity: i64,
}

/// Strategy plus its knobs.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Planner {
    pub strategy: Strategy,
    pub take: Take,
    pub objective: Objective,
    pub node_limit: u64,
}

impl Default for Planner {
    fn default() -> Self {
        Self {
            strategy: Strategy::Greedy,
            take: Take::One,
            objective: Objective::Yield,
            node_limit: 200_000,
        }
    }
}

impl Planner {
    pub fn plan(&self, candidates: &[Candidate], limits: &Limits) -> ResultEngine<Vec<PlanItem>> {
        for candidate in candidates {
            candidate.validate()?;
        }
        self.objective.validate()?;
        let limits = limits.clamped();
        let plan = match self.strategy {
            Strategy::Greedy => greedy::plan(candidates, &limits, self.take),
            Strategy::Optimize => {
                optimize::plan(candidates, &limits, self.objective, self.node_limit)
            }
        };
        tracing::debug!(strategy = ?self.strategy, items = plan.len(), "plan computed");
        Ok(plan)
    }
}
